use crate::mm::config::{is_aligned, PAGE_SIZE, PTE_ADDR_MASK};
use core::fmt;

/// Endereço físico (wrapper type-safe)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PhysAddr(u64);

impl PhysAddr {
    /// Cria novo endereço físico
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Extrai o frame apontado por uma entrada de page table
    #[inline]
    pub const fn from_entry(entry: u64) -> Self {
        Self(entry & PTE_ADDR_MASK)
    }

    /// Retorna o valor interno como u64
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Está alinhado a página?
    #[inline]
    pub const fn is_page_aligned(self) -> bool {
        is_aligned(self.0, PAGE_SIZE as u64)
    }
}

impl fmt::Debug for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysAddr({:#x})", self.0)
    }
}
