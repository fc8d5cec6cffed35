use crate::core::ConfigProvider;
use crate::utils::error::{QuizError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub quiz: QuizInfo,
    #[serde(default)]
    pub rules: RulesConfig,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizInfo {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// TOML rule file replacing the built-in questionnaire. A relative path
    /// is resolved against the directory of the config file that names it.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    #[serde(default = "default_output_formats")]
    pub output_formats: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_output_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

impl QuizConfig {
    /// Loads a config file. A relative `[rules].path` is rebased onto the
    /// file's own directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;

        if let (Some(rules), Some(base)) = (&config.rules.path, path.as_ref().parent()) {
            if Path::new(rules).is_relative() && !rules.is_empty() {
                config.rules.path = Some(base.join(rules).to_string_lossy().into_owned());
            }
        }

        Ok(config)
    }

    /// Parses a config document, substituting `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| QuizError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left in place so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("quiz.name", &self.quiz.name)?;
        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_output_formats("output.output_formats", &self.output.output_formats)?;

        if let Some(path) = &self.rules.path {
            validation::validate_path("rules.path", path)?;
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
            if !LEVELS.contains(&level) {
                return Err(QuizError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    /// The `[logging]` section, or defaults when it is absent.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}

impl ConfigProvider for QuizConfig {
    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.output_formats
    }

    fn rules_path(&self) -> Option<&str> {
        self.rules.path.as_deref()
    }
}

impl Validate for QuizConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_config() {
        let toml_content = r#"
[quiz]
name = "color-season"
version = "1.0.0"

[rules]
path = "./rules.toml"

[output]
output_path = "./reports"
output_formats = ["json"]
"#;

        let config = QuizConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.quiz.name, "color-season");
        assert_eq!(config.rules_path(), Some("./rules.toml"));
        assert_eq!(config.output_formats(), &["json".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let toml_content = r#"
[quiz]
name = "color-season"

[output]
output_path = "./reports"
"#;

        let config = QuizConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.rules_path(), None);
        assert_eq!(config.output_formats().len(), 2);
        assert_eq!(config.logging().level, None);
        assert_eq!(config.logging().json, None);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SEASON_QUIZ_TEST_OUTPUT", "/tmp/season-reports");

        let toml_content = r#"
[quiz]
name = "test"

[output]
output_path = "${SEASON_QUIZ_TEST_OUTPUT}"
"#;

        let config = QuizConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "/tmp/season-reports");

        std::env::remove_var("SEASON_QUIZ_TEST_OUTPUT");
    }

    #[test]
    fn test_unset_env_var_is_kept() {
        let toml_content = r#"
[quiz]
name = "test"

[output]
output_path = "${SEASON_QUIZ_DEFINITELY_UNSET}"
"#;

        let config = QuizConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "${SEASON_QUIZ_DEFINITELY_UNSET}");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[quiz]
name = "test"

[output]
output_path = "./output"
output_formats = ["pdf"]

[logging]
level = "debug"
"#;

        let config = QuizConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.logging().level.as_deref(), Some("debug"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let toml_content = r#"
[quiz]
name = "test"

[output]
output_path = "./output"

[logging]
level = "loud"
"#;

        let config = QuizConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[quiz]
name = "file-test"

[output]
output_path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = QuizConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.quiz.name, "file-test");
    }

    #[test]
    fn test_relative_rules_path_follows_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("quiz.toml");
        std::fs::write(
            &config_path,
            r#"
[quiz]
name = "relative-rules"

[rules]
path = "rules/seasons.toml"

[output]
output_path = "./output"

[logging]
level = "warn"
json = true
"#,
        )
        .unwrap();

        let config = QuizConfig::from_file(&config_path).unwrap();
        let expected = temp_dir.path().join("rules/seasons.toml");
        assert_eq!(config.rules_path(), Some(expected.to_string_lossy().as_ref()));
        assert_eq!(config.logging().level.as_deref(), Some("warn"));
        assert_eq!(config.logging().json, Some(true));
    }

    #[test]
    fn test_absolute_rules_path_is_kept() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let rules = temp_dir.path().join("abs-rules.toml");
        let config_path = temp_dir.path().join("quiz.toml");
        std::fs::write(
            &config_path,
            format!(
                "[quiz]\nname = \"abs\"\n\n[rules]\npath = \"{}\"\n\n[output]\noutput_path = \"./output\"\n",
                rules.to_string_lossy().replace('\\', "/")
            ),
        )
        .unwrap();

        let config = QuizConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.rules_path(),
            Some(rules.to_string_lossy().replace('\\', "/").as_str())
        );
    }
}
