pub mod report_pipeline;
