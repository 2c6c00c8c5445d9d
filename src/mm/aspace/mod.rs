//! # Address Space
//!
//! Raiz das page tables de um processo, o lock que serializa modificações
//! no diretório de páginas e o número de threads que compartilham o espaço
//! (decide se a região thread-shared precisa de shootdown).

use core::sync::atomic::{AtomicUsize, Ordering};
use spin::{Mutex, MutexGuard};

use crate::mm::addr::PhysAddr;
use crate::mm::error::{MmError, MmResult};
use crate::mm::vmm::mapper::Vmm;

pub struct AddressSpace {
    pml4: PhysAddr,
    lock: Mutex<()>,
    threads: AtomicUsize,
}

/// Prova de que o lock do address space está seguro pelo chamador.
///
/// Usada para lotes de unmap (`Vmm::unmap_held`) sem re-adquirir o lock.
pub struct AspaceGuard<'a> {
    aspace: &'a AddressSpace,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> AspaceGuard<'a> {
    pub fn aspace(&self) -> &'a AddressSpace {
        self.aspace
    }
}

impl AddressSpace {
    /// Cria espaço vazio com uma PML4 zerada.
    pub fn new(vmm: &Vmm) -> MmResult<Self> {
        let pml4 = vmm.alloc_table().ok_or(MmError::OutOfMemory)?;
        crate::kdebug!("(VMM) Novo address space PML4=", pml4.as_u64());
        Ok(Self {
            pml4,
            lock: Mutex::new(()),
            threads: AtomicUsize::new(1),
        })
    }

    #[inline]
    pub fn pml4(&self) -> PhysAddr {
        self.pml4
    }

    pub fn lock(&self) -> AspaceGuard<'_> {
        AspaceGuard {
            aspace: self,
            _guard: self.lock.lock(),
        }
    }

    /// Threads que compartilham este espaço.
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads.load(Ordering::Acquire)
    }

    /// Nova thread no mesmo processo.
    pub fn add_thread(&self) {
        self.threads.fetch_add(1, Ordering::AcqRel);
    }

    /// Thread terminou. Retorna o número restante.
    pub fn remove_thread(&self) -> usize {
        let prev = self.threads.fetch_sub(1, Ordering::AcqRel);
        if prev == 0 {
            crate::core::panic::fatal("(VMM) underflow de threads do address space");
        }
        prev - 1
    }
}
