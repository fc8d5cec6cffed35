pub mod classifier;
pub mod engine;

pub use crate::domain::model::{
    ClassificationResult, QuizAnswerSet, ReportEntry, Season, SeasonReport, SeasonScores,
    Submission, Undertone,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::domain::rules::RuleTable;
pub use crate::utils::error::Result;
