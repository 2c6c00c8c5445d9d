// Arquivo: sync/refcount.rs
//
// Propósito: Contagem de referências atômica para objetos do VFS
// (`count`/`f_count` de inodes, `count` de file handles).
//
// Detalhes de Implementação:
// - Usa `AtomicUsize` para thread-safety.
// - Semântica Acquire/Release ao decrementar a última referência.
// - Underflow é violação de invariante: o sistema para.

//! Reference Counting

use core::sync::atomic::{AtomicUsize, Ordering};

/// Contador de referências atômico
#[derive(Debug)]
pub struct RefCount {
    count: AtomicUsize,
}

impl RefCount {
    /// Cria um novo contador com valor inicial
    pub const fn new(initial: usize) -> Self {
        Self {
            count: AtomicUsize::new(initial),
        }
    }

    /// Incrementa o contador de referências.
    /// Retorna o valor ANTERIOR.
    #[inline]
    pub fn inc(&self) -> usize {
        self.count.fetch_add(1, Ordering::AcqRel)
    }

    /// Decrementa o contador de referências.
    /// Retorna `true` se a contagem chegou a ZERO.
    #[inline]
    #[must_use]
    pub fn dec(&self) -> bool {
        let prev = self.count.fetch_sub(1, Ordering::Release);

        if prev == 0 {
            crate::core::panic::fatal("(RefCount) underflow de contador de referências");
        }

        if prev == 1 {
            // Quem destrói o objeto precisa ver todas as escritas feitas
            // por quem liberou antes.
            core::sync::atomic::fence(Ordering::Acquire);
            true
        } else {
            false
        }
    }

    /// Valor atual.
    #[inline]
    pub fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}
