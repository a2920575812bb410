use std::sync::Arc;

use image_processor::AssetCache;
use tokio::io::AsyncRead;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::input::clipboard::ClipboardProvider;
use crate::input::{PayloadBuilder, Source};
use crate::services::{OutputMode, OutputSink, Report, Status, Transformer};

/// Drives every interaction of one invocation through the pipeline.
pub struct App<C> {
    builder: PayloadBuilder<C>,
    transformer: Transformer,
    sink: OutputSink,
}

impl<C: ClipboardProvider> App<C> {
    pub fn new(config: &AppConfig, mode: OutputMode, clipboard: C, cache: Arc<AssetCache>) -> Self {
        Self {
            builder: PayloadBuilder::new(clipboard),
            transformer: Transformer::new(config, cache),
            sink: OutputSink::new(mode),
        }
    }

    /// Process `sources` in order. A failed interaction never stops the rest.
    pub async fn run(&self, sources: &[Source], json: bool) -> Vec<Report> {
        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            let report = self.process(source, tokio::io::stdin()).await;
            emit(&report, json);
            reports.push(report);
        }
        reports
    }

    /// Process a single interaction.
    pub async fn process<R>(&self, source: &Source, stdin: R) -> Report
    where
        R: AsyncRead + Unpin,
    {
        let label = source.to_string();

        let payload = match self.builder.build(source, stdin).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(source = %label, "Failed to read input: {e}");
                return Report::failed(label, e);
            }
        };

        let rendered = match self.transformer.transform(&payload).await {
            Ok(Some(rendered)) => rendered,
            Ok(None) => {
                info!(source = %label, "No image found, nothing to do");
                return Report::not_found(label);
            }
            Err(e) => {
                warn!(source = %label, "Transform failed: {e}");
                return Report::failed(label, e);
            }
        };

        match self.sink.deliver(&rendered).await {
            Ok(delivery) => Report::delivered(label, &rendered, delivery),
            Err(e) => {
                warn!(source = %label, "Failed to deliver image: {e}");
                Report::failed(label, e)
            }
        }
    }
}

/// Whether any report in `reports` is a failure.
pub fn any_failed(reports: &[Report]) -> bool {
    reports.iter().any(|r| r.status == Status::Failed)
}

fn emit(report: &Report, json: bool) {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Failed to serialize report: {e}"),
        }
    } else if let Some(line) = report.human_line() {
        println!("{line}");
    }
}
