use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Rule table error: {message}")]
    RuleTableError { message: String },

    #[error("Submission error: {message}")]
    SubmissionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    System,
    Configuration,
    RuleTable,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl QuizError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            QuizError::IoError(_) => ErrorCategory::System,
            QuizError::SerializationError(_) | QuizError::CsvError(_) => ErrorCategory::Input,
            QuizError::ConfigValidationError { .. }
            | QuizError::InvalidConfigValueError { .. }
            | QuizError::MissingConfigError { .. } => ErrorCategory::Configuration,
            QuizError::RuleTableError { .. } => ErrorCategory::RuleTable,
            QuizError::SubmissionError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            QuizError::IoError(_) => ErrorSeverity::Critical,
            QuizError::SubmissionError { .. } => ErrorSeverity::Medium,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            QuizError::IoError(_) => "Check that the file exists and the output directory is writable",
            QuizError::SerializationError(_) => {
                "Make sure the answers file is valid JSON (an object of question -> answer)"
            }
            QuizError::CsvError(_) => "Check that the output directory is writable",
            QuizError::ConfigValidationError { .. }
            | QuizError::InvalidConfigValueError { .. }
            | QuizError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
            QuizError::RuleTableError { .. } => {
                "Each [[rules]] entry needs a unique, non-empty question/answer pair"
            }
            QuizError::SubmissionError { .. } => {
                "The batch input must be a JSON array of {\"id\", \"answers\"} objects"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            QuizError::IoError(e) => format!("Could not access a file: {}", e),
            QuizError::SerializationError(e) => format!("Could not read JSON: {}", e),
            QuizError::CsvError(e) => format!("Could not write the CSV report: {}", e),
            QuizError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            QuizError::InvalidConfigValueError { field, value, reason } => {
                format!("'{}' is not a valid value for '{}': {}", value, field, reason)
            }
            QuizError::MissingConfigError { field } => {
                format!("Required setting '{}' is missing", field)
            }
            QuizError::RuleTableError { message } => {
                format!("The scoring rules could not be loaded: {}", message)
            }
            QuizError::SubmissionError { message } => {
                format!("The quiz submissions could not be processed: {}", message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_critical() {
        let err = QuizError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_rule_table_error_message() {
        let err = QuizError::RuleTableError {
            message: "duplicate rule vein_color/blue".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::RuleTable);
        assert!(err.to_string().contains("vein_color/blue"));
        assert!(err.user_friendly_message().contains("scoring rules"));
    }

    #[test]
    fn test_submission_errors_are_medium() {
        let err = QuizError::SubmissionError {
            message: "empty".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_every_error_fails_the_run() {
        let errors = [
            QuizError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
            QuizError::ConfigValidationError {
                field: "formats".to_string(),
                message: "empty".to_string(),
            },
            QuizError::MissingConfigError {
                field: "output_path".to_string(),
            },
            QuizError::RuleTableError {
                message: "blank id".to_string(),
            },
            QuizError::SubmissionError {
                message: "not an array".to_string(),
            },
        ];

        for err in &errors {
            assert!(err.severity() >= ErrorSeverity::Medium, "{:?}", err);
        }
    }
}
