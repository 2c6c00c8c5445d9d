use crate::mm::config::{
    align_down, align_up, is_aligned, KERNEL_BASE, PAGE_SIZE, THREAD_SHARED_END,
    THREAD_SHARED_START,
};
use core::fmt;

/// Endereço virtual (wrapper type-safe)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct VirtAddr(u64);

impl VirtAddr {
    /// Cria novo endereço virtual
    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Retorna o valor interno como u64
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Alinha para baixo a página
    #[inline]
    pub const fn page_floor(self) -> Self {
        Self(align_down(self.0, PAGE_SIZE as u64))
    }

    /// Alinha para cima a página
    #[inline]
    pub const fn page_ceil(self) -> Self {
        Self(align_up(self.0, PAGE_SIZE as u64))
    }

    /// Verifica alinhamento de página
    #[inline]
    pub const fn is_page_aligned(self) -> bool {
        is_aligned(self.0, PAGE_SIZE as u64)
    }

    /// Adiciona offset
    #[inline]
    pub const fn add(self, offset: u64) -> Self {
        Self(self.0 + offset)
    }

    /// Índices nos 4 níveis: [PML4, PDPT, PD, PT]
    #[inline]
    pub const fn table_indices(self) -> [usize; 4] {
        [
            ((self.0 >> 39) & 0x1FF) as usize,
            ((self.0 >> 30) & 0x1FF) as usize,
            ((self.0 >> 21) & 0x1FF) as usize,
            ((self.0 >> 12) & 0x1FF) as usize,
        ]
    }

    /// Metade superior (kernel)?
    #[inline]
    pub const fn is_kernel(self) -> bool {
        self.0 >= KERNEL_BASE
    }

    /// Dentro da região compartilhada entre threads?
    #[inline]
    pub const fn is_thread_shared(self) -> bool {
        self.0 >= THREAD_SHARED_START && self.0 < THREAD_SHARED_END
    }
}

impl fmt::Debug for VirtAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtAddr({:#x})", self.0)
    }
}
