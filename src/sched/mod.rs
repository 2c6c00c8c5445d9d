//! # Scheduling Contract, Wait Queues & Tasks
//!
//! O núcleo do VFS não troca contexto: ele consome do escalonador apenas
//! "quem sou eu", "bloqueie-me", "acorde aquela tarefa", "há sinal pendente?"
//! e "mate aquela tarefa".
//!
//! ## 🎯 Propósito e Responsabilidade
//! - **Contrato:** trait [`Scheduler`], implementado pelo escalonador real
//!   (ou por threads do host nos testes).
//! - **Wait Queues:** registro sob o lock do objeto + bloqueio fora do lock,
//!   com recheck após cada wake.
//! - **Task:** credenciais, tabela de descritores, raiz/cwd, address space e heap.
//!
//! ## 🏗️ Protocolo de bloqueio
//! 1. Sob o lock do objeto: checa a condição; se precisa esperar, registra
//!    um `Waiter` na fila.
//! 2. Solta o lock.
//! 3. `sleep()`: sinal pendente → `Interrupted`; acordado → volta ao passo 1.
//!
//! Como o registro acontece sob o mesmo lock que o `wake_all`, nenhum wake
//! entre "checar" e "bloquear" é perdido: ou o waiter já está na fila, ou a
//! condição ainda não mudou.

pub mod scheduler;
pub mod sync;
pub mod task;

#[cfg(test)]
mod test;

pub use scheduler::{Scheduler, TaskId};
pub use sync::waitqueue::{sleep, WaitOutcome, WaitQueue, Waiter};
pub use task::{Credentials, Task};
