pub mod storage;
pub mod toml_config;

use crate::core::{ConfigProvider, RuleTable};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::borrow::Cow;

#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Loads the rule file at `path`, or hands out the built-in table.
pub fn load_rule_table(path: Option<&str>) -> Result<Cow<'static, RuleTable>> {
    match path {
        Some(path) => {
            tracing::debug!("Loading scoring rules from: {}", path);
            let table = RuleTable::from_file(path)?;
            tracing::info!("Loaded {} scoring rules from {}", table.len(), path);
            Ok(Cow::Owned(table))
        }
        None => Ok(Cow::Borrowed(RuleTable::builtin())),
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "season-quiz")]
#[command(about = "Classify color-season quiz answers into a season and undertone")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Classify a single quiz
    Classify(ClassifyArgs),
    /// Classify a file of submissions and write a season report
    Batch(BatchArgs),
    /// List the questions and answers the scoring rules recognise
    Rules(RulesArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct ClassifyArgs {
    /// JSON file holding an object of question -> answer
    #[arg(long)]
    pub answers: Option<String>,

    /// Single answer as question=answer, may be repeated
    #[arg(long = "answer", value_parser = parse_answer_pair)]
    pub answer: Vec<(String, String)>,

    /// TOML rule file replacing the built-in rules
    #[arg(long)]
    pub rules: Option<String>,

    #[arg(long)]
    pub pretty: bool,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// JSON array of {"id", "answers"} submissions
    #[arg(long)]
    pub input: String,

    /// Quiz config file; flags given on the command line win
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    #[arg(long)]
    pub rules: Option<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct RulesArgs {
    #[arg(long)]
    pub rules: Option<String>,

    /// Print the questionnaire as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Logging settings for this run: the batch `--config` file's `[logging]`
    /// section, with `--log-json` layered on top. A config file that fails to
    /// load yields defaults here; `BatchArgs::resolve` reports the error.
    pub fn logging(&self) -> toml_config::LoggingConfig {
        let mut logging = match &self.command {
            Command::Batch(BatchArgs {
                config: Some(path),
                ..
            }) => toml_config::QuizConfig::from_file(path)
                .map(|config| config.logging())
                .unwrap_or_default(),
            _ => toml_config::LoggingConfig::default(),
        };

        if self.log_json {
            logging.json = Some(true);
        }
        logging
    }
}

#[cfg(feature = "cli")]
fn parse_answer_pair(raw: &str) -> std::result::Result<(String, String), String> {
    crate::core::QuizAnswerSet::parse_pair(raw)
        .ok_or_else(|| format!("expected question=answer, got '{}'", raw))
}

/// Batch settings after merging the optional config file with CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub rules_path: Option<String>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            output_formats: vec!["csv".to_string(), "json".to_string()],
            rules_path: None,
        }
    }
}

impl BatchSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            output_path: config.output_path().to_string(),
            output_formats: config.output_formats().to_vec(),
            rules_path: config.rules_path().map(str::to_string),
        }
    }

    pub fn with_overrides(
        mut self,
        output_path: Option<&str>,
        formats: &[String],
        rules_path: Option<&str>,
    ) -> Self {
        if let Some(path) = output_path {
            self.output_path = path.to_string();
        }
        if !formats.is_empty() {
            self.output_formats = formats.to_vec();
        }
        if let Some(rules) = rules_path {
            self.rules_path = Some(rules.to_string());
        }
        self
    }
}

#[cfg(feature = "cli")]
impl BatchArgs {
    pub fn resolve(&self) -> Result<BatchSettings> {
        let base = match &self.config {
            Some(path) => {
                let config = toml_config::QuizConfig::from_file(path)?;
                config.validate()?;
                BatchSettings::from_config(&config)
            }
            None => BatchSettings::default(),
        };

        let settings =
            base.with_overrides(self.output_path.as_deref(), &self.formats, self.rules.as_deref());
        settings.validate()?;
        Ok(settings)
    }
}

impl ConfigProvider for BatchSettings {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn rules_path(&self) -> Option<&str> {
        self.rules_path.as_deref()
    }
}

impl Validate for BatchSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.output_formats)?;
        if let Some(path) = &self.rules_path {
            validation::validate_path("rules", path)?;
        }
        Ok(())
    }
}
