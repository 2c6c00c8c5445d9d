//! Pipes (FIFO anônimos e nomeados)

#[allow(clippy::module_inception)]
mod pipe;

pub use pipe::{Pipe, PipeCounts, PipeError, PIPE_SIZE};
