use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rayon::prelude::*;

use crate::{
    config::RunConfig,
    encode::gif::EncodeStats,
    foundation::error::{GifbarError, GifbarResult},
    handlers::chain::HandlerChain,
    pipeline::orchestrator::PipelineOrchestrator,
};

/// Extension of eligible batch sources (matched case-insensitively).
pub const SOURCE_EXTENSION: &str = "gif";

/// One file that could not be processed.
#[derive(Debug)]
pub struct BatchFailure {
    /// Source path.
    pub source: PathBuf,
    /// Why it failed.
    pub error: GifbarError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully written outputs, in source order.
    pub processed: Vec<EncodeStats>,
    /// Per-file failures, in source order.
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Return `true` when every eligible file was processed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of eligible files seen.
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Eligible sources in `dir`, sorted by path.
///
/// Only regular `*.gif` files count, and files already carrying the output prefix are skipped.
pub fn eligible_sources(dir: &Path, config: &RunConfig) -> GifbarResult<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("read directory '{}'", dir.display()))?;

    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read directory '{}'", dir.display()))?;
        let path = entry.path();
        let is_gif = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION));
        if !is_gif || !path.is_file() || config.is_processed_output(&path) {
            continue;
        }
        sources.push(path);
    }
    sources.sort();
    Ok(sources)
}

/// Processes every eligible file in a directory with a shared handler chain.
pub struct BatchRunner<'a> {
    dir: PathBuf,
    config: &'a RunConfig,
    handlers: &'a HandlerChain,
}

impl<'a> BatchRunner<'a> {
    /// Runner over `dir`.
    pub fn new(dir: impl Into<PathBuf>, config: &'a RunConfig, handlers: &'a HandlerChain) -> Self {
        Self {
            dir: dir.into(),
            config,
            handlers,
        }
    }

    /// Process all eligible files.
    ///
    /// Fails as a whole only on configuration errors (including an empty handler chain) or an
    /// unreadable directory. Per-file failures are collected in the report.
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()))]
    pub fn run(&self) -> GifbarResult<BatchReport> {
        if self.handlers.is_empty() {
            return Err(GifbarError::config("no frame handlers registered"));
        }

        let sources = eligible_sources(&self.dir, self.config)?;
        tracing::debug!(files = sources.len(), "batch sources");

        let results: Vec<(PathBuf, GifbarResult<EncodeStats>)> = if self.config.parallel {
            let pool = build_thread_pool(self.config.threads)?;
            pool.install(|| {
                sources
                    .par_iter()
                    .map(|src| (src.clone(), self.process_one(src)))
                    .collect()
            })
        } else {
            sources
                .iter()
                .map(|src| (src.clone(), self.process_one(src)))
                .collect()
        };

        let mut report = BatchReport::default();
        for (source, result) in results {
            match result {
                Ok(stats) => report.processed.push(stats),
                Err(e) if e.is_fatal_for_run() => return Err(e),
                Err(error) => {
                    tracing::warn!(source = %source.display(), %error, "file failed");
                    report.failed.push(BatchFailure { source, error });
                }
            }
        }
        Ok(report)
    }

    fn process_one(&self, source: &Path) -> GifbarResult<EncodeStats> {
        PipelineOrchestrator::new(source, self.config, self.handlers)?.run()
    }
}

fn build_thread_pool(threads: Option<usize>) -> GifbarResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GifbarError::resource(format!("failed to build thread pool: {e}")))
}

/// Convenience wrapper: validate `config`, build its handler chain and process `dir`.
pub fn process_dir(dir: &Path, config: &RunConfig) -> GifbarResult<BatchReport> {
    config.validate()?;
    let handlers = config.handler_chain()?;
    BatchRunner::new(dir, config, &handlers).run()
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/batch.rs"]
mod tests;
