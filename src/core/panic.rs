//! Halt Fatal.
//!
//! Violações de consistência interna (underflow de refcount, pipe liberado com
//! tarefas bloqueadas, entrada de descritor sem objeto) não são erros de
//! usuário. Continuar executando arriscaria corrupção silenciosa de dados.
//!
//! # Comportamento
//! 1. Loga o motivo na serial via `kerror!`.
//! 2. Entra em panic. O `#[panic_handler]` da imagem do kernel trava a CPU;
//!    nos testes de host o panic derruba apenas a thread da tarefa.

/// Para o sistema por violação de invariante.
#[cold]
#[inline(never)]
pub fn fatal(msg: &'static str) -> ! {
    crate::kerror!("================ FORGE VFS FATAL ================");
    crate::kerror!(msg);
    crate::kerror!("=================================================");
    panic!("fatal: {}", msg);
}
