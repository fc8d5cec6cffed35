use anyhow::Result;
use season_quiz::config::toml_config::QuizConfig;
use season_quiz::{
    load_rule_table, BatchEngine, BatchSettings, LocalStorage, QuizError, ReportPipeline,
};
use std::borrow::Cow;
use tempfile::TempDir;

const SUBMISSIONS: &str = r#"[
    {"id": "alice", "answers": {"hair_color": "auburn", "eye_color": "hazel"}},
    {"id": "bob", "answers": {"vein_color": "blue", "jewelry": "silver"}},
    {"id": "carol", "answers": {"best_colors": "pastels", "contrast": "low"}},
    {"id": "dave", "answers": {"shoe_size": "42"}}
]"#;

fn settings(output_path: &str, formats: &[&str]) -> BatchSettings {
    BatchSettings {
        output_path: output_path.to_string(),
        output_formats: formats.iter().map(|f| f.to_string()).collect(),
        rules_path: None,
    }
}

#[tokio::test]
async fn test_end_to_end_batch_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_path = temp_dir.path().join("submissions.json");
    tokio::fs::write(&input_path, SUBMISSIONS).await?;

    let output_dir = temp_dir.path().join("reports");
    let output_path = output_dir.to_str().unwrap().to_string();

    let storage = LocalStorage::new(output_path.clone());
    let pipeline = ReportPipeline::new(
        storage,
        settings(&output_path, &["csv", "json"]),
        input_path.to_str().unwrap(),
        load_rule_table(None)?,
    );

    let written = BatchEngine::new(pipeline).run().await?;
    assert_eq!(written, "season_report.csv, season_report.json");

    let csv = tokio::fs::read_to_string(output_dir.join("season_report.csv")).await?;
    assert!(csv.starts_with("id,season,undertone,winter,summer,autumn,spring,winning_score"));
    assert!(csv.contains("alice,autumn,warm,0,0,5,1,5"));
    assert!(csv.contains("bob,winter,cool,3,3,0,0,3"));
    assert!(csv.contains("carol,summer,cool,0,5,1,0,5"));
    assert!(csv.contains("dave,indeterminate,indeterminate,0,0,0,0,0"));

    let json: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(output_dir.join("season_report.json")).await?)?;
    assert_eq!(json["total"], 4);
    assert_eq!(json["indeterminate"], 1);
    assert_eq!(json["season_counts"]["winter"], 1);
    assert_eq!(json["season_counts"]["summer"], 1);
    assert_eq!(json["season_counts"]["autumn"], 1);
    assert_eq!(json["season_counts"]["spring"], 0);
    assert_eq!(json["entries"][3]["season"], "indeterminate");

    Ok(())
}

#[tokio::test]
async fn test_batch_with_custom_rule_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let rules_path = temp_dir.path().join("rules.toml");
    tokio::fs::write(
        &rules_path,
        r#"
[[rules]]
question = "shoe_size"
answer = "42"
points = { spring = 4 }
"#,
    )
    .await?;

    let input_path = temp_dir.path().join("submissions.json");
    tokio::fs::write(&input_path, SUBMISSIONS).await?;

    let output_path = temp_dir.path().to_str().unwrap().to_string();
    let rules = load_rule_table(rules_path.to_str())?;
    assert!(matches!(rules, Cow::Owned(_)));

    let pipeline = ReportPipeline::new(
        LocalStorage::new(output_path.clone()),
        settings(&output_path, &["csv"]),
        input_path.to_str().unwrap(),
        rules,
    );
    BatchEngine::new(pipeline).run().await?;

    let csv = tokio::fs::read_to_string(temp_dir.path().join("season_report.csv")).await?;
    assert!(csv.contains("dave,spring,warm,0,0,0,4,4"));
    assert!(csv.contains("alice,indeterminate,indeterminate,0,0,0,0,0"));
    assert!(!temp_dir.path().join("season_report.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_batch_settings_from_toml_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_dir = temp_dir.path().join("out");
    let normalized = output_dir.to_str().unwrap().replace('\\', "/");

    let config = QuizConfig::from_toml_str(&format!(
        r#"
[quiz]
name = "color-season"

[output]
output_path = "{}"
output_formats = ["json"]
"#,
        normalized
    ))?;

    let settings = BatchSettings::from_config(&config);
    assert_eq!(settings.output_formats, vec!["json".to_string()]);

    let input_path = temp_dir.path().join("submissions.json");
    tokio::fs::write(&input_path, SUBMISSIONS).await?;

    let pipeline = ReportPipeline::new(
        LocalStorage::new(settings.output_path.clone()),
        settings,
        input_path.to_str().unwrap(),
        load_rule_table(None)?,
    );
    let written = BatchEngine::new(pipeline).run().await?;

    assert_eq!(written, "season_report.json");
    assert!(output_dir.join("season_report.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_missing_input_file_fails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let pipeline = ReportPipeline::new(
        LocalStorage::new(output_path.clone()),
        settings(&output_path, &["csv"]),
        "does-not-exist.json",
        load_rule_table(None)?,
    );

    let err = BatchEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, QuizError::IoError(_)));

    Ok(())
}

#[tokio::test]
async fn test_invalid_rule_file_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let rules_path = temp_dir.path().join("rules.toml");
    tokio::fs::write(
        &rules_path,
        r#"
[[rules]]
question = "jewelry"
answer = "gold"
points = { autumn = 1 }

[[rules]]
question = "jewelry"
answer = "gold"
points = { spring = 1 }
"#,
    )
    .await?;

    let err = load_rule_table(rules_path.to_str()).unwrap_err();
    assert!(matches!(err, QuizError::RuleTableError { .. }));

    Ok(())
}
