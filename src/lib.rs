//! Forge VFS Core.
//!
//! Núcleo de objetos de filesystem do kernel Forge: ciclo de vida de inodes
//! e handles, pipes bloqueantes, tabela de descritores por tarefa, montagem
//! e o caminho de unmap de memória virtual com TLB shootdown.
//!
//! Alocador físico, troca de contexto do scheduler, drivers de dispositivo e
//! a CPU são colaboradores externos, acessados através de traits.

#![cfg_attr(not(test), no_std)]

// Habilitar alocação dinâmica (necessário para Vec/Box/Arc)
extern crate alloc;

// --- Infraestrutura ---
pub mod core; // Logging, halt fatal
pub mod klib; // Framework de testes
pub mod sync; // Contadores de referência

// --- Subsistemas ---
pub mod fs; // VFS, inodes, drivers ram/dev/proc
pub mod ipc; // Pipes
pub mod mm; // Endereços, page tables, TLB
pub mod sched; // Contrato do scheduler, wait queues, tarefas
pub mod syscall; // Erros, tabela de handles, syscalls de FS

pub use crate::fs::vfs::{Vfs, VfsConfig};
pub use crate::syscall::error::{SysError, SysResult};
