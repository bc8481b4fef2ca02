use std::path::{Path, PathBuf};

use crate::{
    config::RunConfig,
    decode::compositor::FrameCompositor,
    decode::source::AnimatedSource,
    encode::gif::{AnimationEncoder, EncodeStats},
    foundation::error::{GifbarError, GifbarResult},
    handlers::chain::HandlerChain,
};

/// Progress of one file through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    /// Constructed, nothing read yet.
    Idle,
    /// Frames composited into a store.
    Decoded,
    /// Every handler applied.
    Handled,
    /// Output written.
    Encoded,
    /// Storage released.
    Done,
    /// A stage failed; the file was abandoned.
    Failed,
}

/// Drives one source file through decode, handlers, encode and cleanup.
pub struct PipelineOrchestrator<'a> {
    source: AnimatedSource,
    config: &'a RunConfig,
    handlers: &'a HandlerChain,
    state: PipelineState,
}

impl<'a> PipelineOrchestrator<'a> {
    /// Bind `path` to a run. Fails with [`GifbarError::SourceNotFound`] if it does not exist.
    pub fn new(
        path: impl Into<PathBuf>,
        config: &'a RunConfig,
        handlers: &'a HandlerChain,
    ) -> GifbarResult<Self> {
        Ok(Self {
            source: AnimatedSource::new(path)?,
            config,
            handlers,
            state: PipelineState::Idle,
        })
    }

    /// Source path.
    pub fn source(&self) -> &Path {
        self.source.path()
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Output path per the run's output policy.
    pub fn output_path(&self) -> PathBuf {
        self.config.output_path(self.source.path())
    }

    /// Run every stage. On failure the state becomes [`PipelineState::Failed`], temp storage is
    /// released and no output is left in place.
    #[tracing::instrument(skip_all, fields(source = %self.source.path().display()))]
    pub fn run(&mut self) -> GifbarResult<EncodeStats> {
        if self.state != PipelineState::Idle {
            return Err(GifbarError::config(format!(
                "pipeline already ran (state {:?})",
                self.state
            )));
        }
        if self.handlers.is_empty() {
            self.state = PipelineState::Failed;
            return Err(GifbarError::config("no frame handlers registered"));
        }

        let result = self.run_stages();
        if result.is_err() {
            self.state = PipelineState::Failed;
        }
        result
    }

    fn run_stages(&mut self) -> GifbarResult<EncodeStats> {
        let encoder = AnimationEncoder::new(self.config.encode)?;
        let mode = self.config.disposal.resolve(&self.source)?;

        let mut frames = FrameCompositor::new(mode).decode(&self.source, self.config.storage)?;
        self.state = PipelineState::Decoded;

        self.handlers.apply(&mut frames)?;
        self.state = PipelineState::Handled;

        let stats = encoder.encode(frames, &self.output_path())?;
        self.state = PipelineState::Encoded;

        // The encoder already released the frame storage.
        self.state = PipelineState::Done;
        tracing::info!(out = %stats.path.display(), frames = stats.frames, "processed");
        Ok(stats)
    }
}

/// Convenience wrapper: validate `config`, build its handler chain and process one file.
pub fn process_file(path: &Path, config: &RunConfig) -> GifbarResult<EncodeStats> {
    config.validate()?;
    let handlers = config.handler_chain()?;
    PipelineOrchestrator::new(path, config, &handlers)?.run()
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
