pub(crate) mod chain;
pub(crate) mod progress_bar;
pub(crate) mod resize;
