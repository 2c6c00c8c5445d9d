//! # Synchronization Primitives
//!
//! Contadores de referência atômicos usados pelo protocolo de ciclo de vida
//! de inodes, handles e endpoints de pipe.
//!
//! Locks vêm do crate `spin`:
//!
//! ```text
//! spin::Mutex   → Pipes, tabelas de handles, lista de montagem, address space
//! spin::RwLock  → Lock por inode (upgradeable_read = "escalate")
//! spin::Once    → Sink de log
//! ```
//!
//! ## Regras
//!
//! - **Ordem de Lock**: tabela de handles → pipe → inode
//! - Nunca bloquear (dormir) segurando um spinlock

/// Contador de referências com detecção de underflow
pub mod refcount;


pub use refcount::RefCount;
