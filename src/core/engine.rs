use crate::core::Pipeline;
use crate::utils::error::Result;

/// Drives a batch pipeline through extract, transform and load.
pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting batch classification");

        tracing::debug!("Reading submissions...");
        let submissions = self.pipeline.extract().await?;
        tracing::info!("Read {} submissions", submissions.len());

        tracing::debug!("Classifying submissions...");
        let report = self.pipeline.transform(submissions).await?;
        tracing::info!(
            "Classified {} submissions ({} indeterminate)",
            report.total,
            report.indeterminate
        );

        tracing::debug!("Writing report...");
        let written = self.pipeline.load(report).await?;
        tracing::info!("Report written: {}", written);

        Ok(written)
    }
}
