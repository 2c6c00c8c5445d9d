//! # Process Syscalls
//!
//! Herança e liberação de descritores no ciclo de vida de tarefas.

pub mod lifecycle;

pub use lifecycle::*;
