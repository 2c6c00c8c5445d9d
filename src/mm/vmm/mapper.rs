//! Page Table Mapper
//!
//! Walk de 4 níveis (PML4 → PDPT → PD → PT) sobre frames do `FrameAllocator`.
//! Toda leitura/escrita de entrada passa por `VolatilePtr`: a MMU lê essa
//! memória por fora do modelo do compilador.
//!
//! O walk de `map`/`unmap` aloca níveis intermediários ausentes (zerados,
//! `PRESENT | WRITABLE`). Assim unmap funciona em espaços esparsos sem
//! caso especial.

use alloc::sync::Arc;
use bitflags::bitflags;
use core::ptr::NonNull;
use volatile::VolatilePtr;

use super::tlb::{self, TlbBackend};
use crate::mm::addr::{PhysAddr, VirtAddr};
use crate::mm::aspace::{AddressSpace, AspaceGuard};
use crate::mm::config::{PDIR_DATA, PT_ENTRIES};
use crate::mm::error::{MmError, MmResult};
use crate::mm::pmm::FrameAllocator;

bitflags! {
    /// Bits de uma entrada de page table x86_64
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u64 {
        const PRESENT = 1 << 0;
        const WRITABLE = 1 << 1;
        const USER = 1 << 2;
        const WRITE_THROUGH = 1 << 3;
        const NO_CACHE = 1 << 4;
        const ACCESSED = 1 << 5;
        const DIRTY = 1 << 6;
        const HUGE = 1 << 7;
        const GLOBAL = 1 << 8;
        /// Copy-on-write (bit disponível para o SO)
        const COW = 1 << 9;
        const NO_EXECUTE = 1 << 63;
    }
}

/// Flags dos níveis intermediários
const TABLE_FLAGS: PageFlags = PageFlags::PRESENT.union(PageFlags::WRITABLE);

/// Contexto do VMM: alocador físico + backend de TLB.
pub struct Vmm {
    frames: Arc<dyn FrameAllocator>,
    tlb: Arc<dyn TlbBackend>,
}

impl Vmm {
    pub fn new(frames: Arc<dyn FrameAllocator>, tlb: Arc<dyn TlbBackend>) -> Self {
        Self { frames, tlb }
    }

    pub fn frames(&self) -> &dyn FrameAllocator {
        &*self.frames
    }

    // =========================================================================
    // ACESSO ÀS ENTRADAS
    // =========================================================================

    #[inline]
    fn entry(&self, table: PhysAddr, index: usize) -> VolatilePtr<'_, u64> {
        debug_assert!(index < PT_ENTRIES);
        let base = self.frames.table_ptr(table);
        // SAFETY: table_ptr aponta para PT_ENTRIES u64 alinhados que vivem
        // enquanto o frame estiver alocado; index < PT_ENTRIES.
        unsafe { VolatilePtr::new(NonNull::new_unchecked(base.as_ptr().add(index))) }
    }

    #[inline]
    fn get_table_entry(&self, table: PhysAddr, index: usize) -> u64 {
        self.entry(table, index).read()
    }

    #[inline]
    fn set_table_entry(&self, table: PhysAddr, index: usize, value: u64) {
        self.entry(table, index).write(value);
    }

    /// Aloca uma tabela zerada.
    pub(crate) fn alloc_table(&self) -> Option<PhysAddr> {
        let frame = self.frames.allocate_frame()?;
        for i in 0..PT_ENTRIES {
            self.set_table_entry(frame, i, 0);
        }
        Some(frame)
    }

    // =========================================================================
    // WALK
    // =========================================================================

    /// Desce até a PT de `vaddr`, criando PDPT/PD/PT ausentes.
    fn walk_create(&self, pml4: PhysAddr, vaddr: VirtAddr) -> MmResult<(PhysAddr, usize)> {
        let idx = vaddr.table_indices();
        let mut table = pml4;

        for &i in &idx[..3] {
            let entry = self.get_table_entry(table, i);
            table = if entry & PageFlags::PRESENT.bits() != 0 {
                PhysAddr::from_entry(entry)
            } else {
                let next = self.alloc_table().ok_or(MmError::OutOfMemory)?;
                crate::ktrace!("(VMM) Tabela intermediária criada em ", next.as_u64());
                self.set_table_entry(table, i, next.as_u64() | TABLE_FLAGS.bits());
                next
            };
        }

        Ok((table, idx[3]))
    }

    /// Walk somente-leitura. `None` se algum nível não existe.
    fn walk(&self, pml4: PhysAddr, vaddr: VirtAddr) -> Option<(PhysAddr, usize)> {
        let idx = vaddr.table_indices();
        let mut table = pml4;

        for &i in &idx[..3] {
            let entry = self.get_table_entry(table, i);
            if entry & PageFlags::PRESENT.bits() == 0 {
                return None;
            }
            table = PhysAddr::from_entry(entry);
        }

        Some((table, idx[3]))
    }

    // =========================================================================
    // MAP / TRANSLATE
    // =========================================================================

    /// Mapeia `vaddr` → `frame`. `PRESENT` é adicionado automaticamente.
    pub fn map(
        &self,
        aspace: &AddressSpace,
        vaddr: VirtAddr,
        frame: PhysAddr,
        flags: PageFlags,
    ) -> MmResult<()> {
        if !vaddr.is_page_aligned() || !frame.is_page_aligned() {
            return Err(MmError::NotAligned);
        }

        let _guard = aspace.lock();
        let (pt, i) = self.walk_create(aspace.pml4(), vaddr)?;
        if self.get_table_entry(pt, i) & PageFlags::PRESENT.bits() != 0 {
            return Err(MmError::AlreadyMapped);
        }
        self.set_table_entry(pt, i, frame.as_u64() | (flags | PageFlags::PRESENT).bits());
        Ok(())
    }

    /// Traduz endereço virtual para físico (com offset).
    pub fn translate(&self, aspace: &AddressSpace, vaddr: VirtAddr) -> Option<PhysAddr> {
        let (pt, i) = self.walk(aspace.pml4(), vaddr)?;
        let pte = self.get_table_entry(pt, i);
        if pte & PageFlags::PRESENT.bits() == 0 {
            return None;
        }
        Some(PhysAddr::new(
            PhysAddr::from_entry(pte).as_u64() | (vaddr.as_u64() & 0xFFF),
        ))
    }

    /// Flags da PTE de `vaddr`, se presente.
    pub fn flags(&self, aspace: &AddressSpace, vaddr: VirtAddr) -> Option<PageFlags> {
        let (pt, i) = self.walk(aspace.pml4(), vaddr)?;
        let pte = self.get_table_entry(pt, i);
        if pte & PageFlags::PRESENT.bits() == 0 {
            return None;
        }
        Some(PageFlags::from_bits_truncate(pte))
    }

    // =========================================================================
    // UNMAP
    // =========================================================================

    /// Desmapeia `vaddr` e libera o frame (se presente e não-COW).
    ///
    /// Adquire o lock do address space, exceto para `PDIR_DATA`.
    pub fn unmap(&self, aspace: &AddressSpace, vaddr: VirtAddr) -> MmResult<()> {
        self.unmap_locking(aspace, vaddr, true).map(|_| ())
    }

    /// Como `unmap`, com o lock já seguro pelo chamador (lotes).
    pub fn unmap_held(&self, guard: &AspaceGuard<'_>, vaddr: VirtAddr) -> MmResult<()> {
        self.do_unmap(guard.aspace(), vaddr, true).map(|_| ())
    }

    /// Desmapeia sem liberar o frame. Retorna a entrada antiga, se presente.
    pub fn unmap_only(&self, aspace: &AddressSpace, vaddr: VirtAddr) -> MmResult<Option<PhysAddr>> {
        self.unmap_locking(aspace, vaddr, false)
    }

    fn unmap_locking(
        &self,
        aspace: &AddressSpace,
        vaddr: VirtAddr,
        free: bool,
    ) -> MmResult<Option<PhysAddr>> {
        let _guard = if vaddr.as_u64() == PDIR_DATA {
            None
        } else {
            Some(aspace.lock())
        };
        self.do_unmap(aspace, vaddr, free)
    }

    /// Limpa a folha, invalida (local + remoto) e só então libera o frame.
    fn do_unmap(
        &self,
        aspace: &AddressSpace,
        vaddr: VirtAddr,
        free: bool,
    ) -> MmResult<Option<PhysAddr>> {
        if !vaddr.is_page_aligned() {
            return Err(MmError::NotAligned);
        }

        let (pt, i) = self.walk_create(aspace.pml4(), vaddr)?;
        let old = self.get_table_entry(pt, i);
        self.set_table_entry(pt, i, 0);

        tlb::invalidate(&*self.tlb, vaddr, aspace);

        let old_flags = PageFlags::from_bits_truncate(old);
        if !old_flags.contains(PageFlags::PRESENT) {
            return Ok(None);
        }

        let frame = PhysAddr::from_entry(old);
        if free && !old_flags.contains(PageFlags::COW) {
            crate::ktrace!("(VMM) Frame liberado ", frame.as_u64());
            self.frames.free_frame(frame);
        }
        Ok(Some(frame))
    }
}
