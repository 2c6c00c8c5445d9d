//! # TLB Management e Shootdown
//!
//! Invalidação local e remota (via IPI) depois de limpar uma entrada de page
//! table.
//!
//! ## 🎯 Política de Shootdown
//!
//! A invalidação local (`invlpg`) é sempre feita. O broadcast para as outras
//! CPUs só acontece com a feature `tlb_shootdown` e mais de uma CPU online, e
//! apenas quando outra CPU pode ter a tradução em cache:
//!
//! - memória do kernel (metade superior, mapeada em todos os espaços);
//! - memória thread-shared de um espaço com mais de uma thread.
//!
//! `PDIR_DATA` (página "quem sou eu" da tarefa) é trocada a cada context
//! switch e NUNCA dispara broadcast.
//!
//! ## ⚠️ Ordem
//!
//! O frame antigo só pode voltar ao alocador depois de `invalidate()`
//! retornar: outra CPU ainda poderia estar usando a tradução velha.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::mm::addr::VirtAddr;
use crate::mm::aspace::AddressSpace;
use crate::mm::config::PDIR_DATA;

// =============================================================================
// BACKEND DE CPU
// =============================================================================

/// Operações de CPU consumidas pelo caminho de unmap.
pub trait TlbBackend: Send + Sync {
    /// `invlpg` na CPU atual.
    fn invalidate_local(&self, vaddr: VirtAddr);

    /// CPUs online.
    fn cpu_count(&self) -> usize;

    /// Envia o IPI de shootdown para todas as OUTRAS CPUs e espera os ACKs.
    fn send_shootdown(&self, vaddr: VirtAddr);
}

// =============================================================================
// ESTATÍSTICAS
// =============================================================================

/// Estatísticas de TLB para telemetria
pub struct TlbStats {
    pub local_invalidations: AtomicU64,
    pub shootdowns: AtomicU64,
    pub shootdowns_skipped: AtomicU64,
}

impl TlbStats {
    pub const fn new() -> Self {
        Self {
            local_invalidations: AtomicU64::new(0),
            shootdowns: AtomicU64::new(0),
            shootdowns_skipped: AtomicU64::new(0),
        }
    }
}

/// Estatísticas globais de TLB
pub static TLB_STATS: TlbStats = TlbStats::new();

// =============================================================================
// POLÍTICA
// =============================================================================

/// Outra CPU pode ter `vaddr` (do espaço `aspace`) no TLB?
pub fn needs_shootdown(vaddr: VirtAddr, aspace: &AddressSpace) -> bool {
    if vaddr.as_u64() == PDIR_DATA {
        return false;
    }
    vaddr.is_kernel() || (vaddr.is_thread_shared() && aspace.threads() > 1)
}

/// Invalida `vaddr` localmente e, se necessário, em todas as CPUs.
pub fn invalidate(tlb: &dyn TlbBackend, vaddr: VirtAddr, aspace: &AddressSpace) {
    tlb.invalidate_local(vaddr);
    TLB_STATS.local_invalidations.fetch_add(1, Ordering::Relaxed);

    #[cfg(feature = "tlb_shootdown")]
    {
        if tlb.cpu_count() > 1 && needs_shootdown(vaddr, aspace) {
            crate::ktrace!("(TLB) Shootdown vaddr=", vaddr.as_u64());
            tlb.send_shootdown(vaddr);
            TLB_STATS.shootdowns.fetch_add(1, Ordering::Relaxed);
        } else {
            TLB_STATS.shootdowns_skipped.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[cfg(not(feature = "tlb_shootdown"))]
    {
        let _ = aspace;
        TLB_STATS.shootdowns_skipped.fetch_add(1, Ordering::Relaxed);
    }
}
