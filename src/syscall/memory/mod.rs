//! # Memory Syscalls
//!
//! Heap de usuário (sbrk) sobre o mapper.

pub mod brk;

pub use brk::*;
