mod buffer;

pub use buffer::{DEFAULT_BUFFER_CAPACITY, MAX_BUFFER_CAPACITY, SequenceBuffer};
