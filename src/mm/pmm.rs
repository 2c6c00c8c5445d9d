//! Contrato do alocador físico.
//!
//! O PMM em si (bitmap, zonas) é colaborador externo. O caminho de map/unmap
//! só precisa alocar/liberar frames e enxergar uma tabela de página pelo
//! endereço físico (HHDM no kernel).

use core::ptr::NonNull;

use crate::mm::addr::PhysAddr;

pub trait FrameAllocator: Send + Sync {
    /// Aloca um frame de 4 KiB. Conteúdo indefinido.
    fn allocate_frame(&self) -> Option<PhysAddr>;

    /// Devolve um frame ao alocador.
    fn free_frame(&self, frame: PhysAddr);

    /// Ponteiro para as 512 entradas da tabela que vive em `frame`.
    fn table_ptr(&self, frame: PhysAddr) -> NonNull<u64>;
}
