use crate::core::{
    ConfigProvider, Pipeline, ReportEntry, RuleTable, SeasonReport, SeasonScores, Storage,
    Submission,
};
use crate::utils::error::{QuizError, Result};
use std::borrow::Cow;
use std::collections::HashSet;

pub const CSV_REPORT: &str = "season_report.csv";
pub const JSON_REPORT: &str = "season_report.json";

const CSV_HEADER: [&str; 8] = [
    "id",
    "season",
    "undertone",
    "winter",
    "summer",
    "autumn",
    "spring",
    "winning_score",
];

/// Classifies a file of quiz submissions and writes a season report.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) input_path: String,
    pub(crate) rules: Cow<'static, RuleTable>,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(
        storage: S,
        config: C,
        input_path: impl Into<String>,
        rules: Cow<'static, RuleTable>,
    ) -> Self {
        Self {
            storage,
            config,
            input_path: input_path.into(),
            rules,
        }
    }

    fn render_csv(report: &SeasonReport) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for entry in &report.entries {
            let scores = &entry.result.raw_scores;
            writer.write_record([
                entry.id.clone(),
                entry.result.season_label().to_string(),
                entry.result.undertone.to_string(),
                scores.winter.to_string(),
                scores.summer.to_string(),
                scores.autumn.to_string(),
                scores.spring.to_string(),
                entry.result.winning_score().to_string(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| QuizError::IoError(e.into_error()))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Submission>> {
        tracing::debug!("Reading submissions from: {}", self.input_path);
        let raw = self.storage.read_file(&self.input_path).await?;

        let submissions: Vec<Submission> =
            serde_json::from_slice(&raw).map_err(|e| QuizError::SubmissionError {
                message: format!("{} is not a JSON array of submissions: {}", self.input_path, e),
            })?;

        if submissions.is_empty() {
            return Err(QuizError::SubmissionError {
                message: format!("{} contains no submissions", self.input_path),
            });
        }

        let mut seen = HashSet::new();
        for submission in &submissions {
            if !seen.insert(submission.id.as_str()) {
                tracing::warn!("Submission id '{}' appears more than once", submission.id);
            }
        }

        Ok(submissions)
    }

    async fn transform(&self, submissions: Vec<Submission>) -> Result<SeasonReport> {
        let mut entries = Vec::with_capacity(submissions.len());
        let mut season_counts = SeasonScores::default();
        let mut indeterminate = 0;

        for submission in submissions {
            let result = self.rules.classify(&submission.answers);

            match result.season {
                Some(season) => season_counts.credit(season, 1),
                None => {
                    indeterminate += 1;
                    tracing::warn!(
                        "Submission '{}' is indeterminate ({} answers, none recognised)",
                        submission.id,
                        submission.answers.len()
                    );
                }
            }

            if tracing::enabled!(tracing::Level::DEBUG) {
                let unmatched = self
                    .rules
                    .explain(&submission.answers)
                    .iter()
                    .filter(|m| !m.is_match())
                    .count();
                tracing::debug!(
                    "Submission '{}': {} ({} unmatched answers)",
                    submission.id,
                    result.season_label(),
                    unmatched
                );
            }

            entries.push(ReportEntry {
                id: submission.id,
                result,
            });
        }

        Ok(SeasonReport {
            generated_at: chrono::Utc::now(),
            total: entries.len(),
            indeterminate,
            season_counts,
            entries,
        })
    }

    async fn load(&self, report: SeasonReport) -> Result<String> {
        let mut written = Vec::new();

        for format in self.config.output_formats() {
            let (name, data) = match format.as_str() {
                "csv" => (CSV_REPORT, Self::render_csv(&report)?),
                "json" => (JSON_REPORT, serde_json::to_vec_pretty(&report)?),
                other => {
                    return Err(QuizError::InvalidConfigValueError {
                        field: "output.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            };

            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, &data).await?;
            written.push(name);
        }

        Ok(written.join(", "))
    }
}
