//! # Descritores de arquivo
//!
//! Tabela por tarefa que mapeia descritores para handles abertos.

pub mod table;

pub use table::{Fd, FileTable, MAX_FILES};
