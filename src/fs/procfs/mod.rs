//! ProcFS - Process Filesystem
//!
//! Informações do sistema em /proc, geradas na leitura.
//!
//! # Entradas
//! - `version` - nome e versão do núcleo
//! - `mounts` - uma linha `"<fs> <caminho>"` por montagem
//!
//! Somente leitura: create/unlink/rmdir falham com `ReadOnly`.

mod proc;

pub use proc::ProcFs;
