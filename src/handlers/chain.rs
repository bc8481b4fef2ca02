use crate::{foundation::error::GifbarResult, store::frames::FrameStore};

/// A registered transform over a whole frame list.
///
/// Implementations mutate frames in place through the store and never change the frame count.
pub trait FrameHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Transform every frame of `frames` in place.
    fn handle(&self, frames: &mut FrameStore) -> GifbarResult<()>;
}

/// Ordered list of frame handlers, applied in registration order.
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<Box<dyn FrameHandler>>,
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl HandlerChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the end of the chain.
    pub fn register(&mut self, handler: impl FrameHandler + 'static) -> &mut Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Append an already boxed handler.
    pub fn register_boxed(&mut self, handler: Box<dyn FrameHandler>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    /// Builder-style [`HandlerChain::register`].
    pub fn with(mut self, handler: impl FrameHandler + 'static) -> Self {
        self.register(handler);
        self
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Run every handler once, in order, over the full frame list.
    pub fn apply(&self, frames: &mut FrameStore) -> GifbarResult<()> {
        for handler in &self.handlers {
            handler.handle(frames)?;
            tracing::debug!(handler = handler.name(), frames = frames.len(), "handler applied");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handlers/chain.rs"]
mod tests;
