//! # Inter-Process Communication
//!
//! Pipes bloqueantes com wait queues de leitores e escritores.
//!
//! ## 🏗️ Garantias
//! - O lock do pipe serializa todas as mutações.
//! - Check-and-block é atômico: a tarefa entra na fila sob o mesmo lock em
//!   que checou a condição, e todo `wake_all` acontece sob esse lock.
//! - Bloqueio é interrompível por sinal (`PipeError::Interrupted`).

pub mod pipe;

#[cfg(test)]
mod test;

pub use pipe::{Pipe, PipeError, PIPE_SIZE};
