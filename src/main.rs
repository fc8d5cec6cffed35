use clap::Parser;
use season_quiz::config::{BatchArgs, ClassifyArgs, Command, RulesArgs};
use season_quiz::utils::error::{ErrorSeverity, Result};
use season_quiz::utils::logger;
use season_quiz::{
    load_rule_table, BatchEngine, CliConfig, LocalStorage, QuizAnswerSet, ReportPipeline,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();
    let logging = config.logging();

    if logging.json.unwrap_or(false) {
        logger::init_json_logger(config.verbose, logging.level.as_deref());
    } else {
        logger::init_cli_logger(config.verbose, logging.level.as_deref());
    }

    tracing::debug!("CLI config: {:?}", config);

    let outcome = match &config.command {
        Command::Classify(args) => run_classify(args).await,
        Command::Batch(args) => run_batch(args).await,
        Command::Rules(args) => run_rules(args),
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ season-quiz failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        std::process::exit(exit_code);
    }
}

async fn run_classify(args: &ClassifyArgs) -> Result<()> {
    let mut answers = match &args.answers {
        Some(path) => {
            tracing::debug!("Reading answers from: {}", path);
            let raw = tokio::fs::read(path).await?;
            serde_json::from_slice::<QuizAnswerSet>(&raw)?
        }
        None => QuizAnswerSet::new(),
    };
    answers.extend(args.answer.iter().cloned());

    if answers.is_empty() {
        tracing::warn!("No answers given; pass --answers <file> or --answer question=answer");
    }

    let rules = load_rule_table(args.rules.as_deref())?;

    for outcome in rules.explain(&answers) {
        tracing::debug!("{:?}", outcome);
    }

    let result = rules.classify(&answers);
    match result.season_hint() {
        Some(season) => tracing::info!("✅ Classified as {} ({})", season, result.undertone),
        None => tracing::warn!(
            "⚠️ No answer matched a scoring rule; answer more questions or use the photo analysis"
        ),
    }

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", rendered);

    Ok(())
}

async fn run_batch(args: &BatchArgs) -> Result<()> {
    let settings = args.resolve()?;
    tracing::debug!("Batch settings: {:?}", settings);

    let rules = load_rule_table(settings.rules_path.as_deref())?;
    let input = std::path::absolute(&args.input)?;

    let storage = LocalStorage::new(settings.output_path.clone());
    let output_path = settings.output_path.clone();
    let pipeline = ReportPipeline::new(storage, settings, input.to_string_lossy(), rules);
    let engine = BatchEngine::new(pipeline);

    let written = engine.run().await?;
    println!("✅ Batch classification completed successfully!");
    println!("📁 Report saved to {}: {}", output_path, written);

    Ok(())
}

fn run_rules(args: &RulesArgs) -> Result<()> {
    let rules = load_rule_table(args.rules.as_deref())?;
    let questions = rules.questions();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    println!("{} questions, {} scoring rules", questions.len(), rules.len());
    for question in &questions {
        println!("  {}: {}", question.question, question.answers.join(", "));
    }

    Ok(())
}
