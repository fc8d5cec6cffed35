pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::report_pipeline::ReportPipeline;
pub use config::{load_rule_table, storage::LocalStorage, BatchSettings};
pub use core::{classifier::classify, engine::BatchEngine};
pub use domain::model::{ClassificationResult, QuizAnswerSet, Season, SeasonScores, Undertone};
pub use domain::rules::{RuleTable, ScoringRule};
pub use utils::error::{QuizError, Result};
