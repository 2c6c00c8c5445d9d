//! # Syscalls do núcleo de filesystem
//!
//! Fronteira entre a tarefa e o VFS: erros POSIX, tabela de descritores e
//! as syscalls de arquivo, processo e heap.
//!
//! # Módulos
//!
//! - `error`: Códigos de erro (SysError)
//! - `handle`: tabela de descritores por tarefa
//! - `fs`: open, close, read, write, dup, pipe, link, mount...
//! - `process`: fork, thread_create, exit
//! - `memory`: sbrk

pub mod error;
pub mod fs;
pub mod handle;
pub mod memory;
pub mod process;


pub use error::{SysError, SysResult};
pub use handle::{Fd, FileTable, MAX_FILES};
