//! # Memory Management (caminho de map/unmap)
//!
//! Alocador físico e manipulação de heap são colaboradores externos; aqui
//! ficam apenas o walk de page tables, o unmap seguro e a política de TLB
//! shootdown.
//!
//! ## 🏗️ Estrutura
//! - `config`: tamanhos e layout virtual
//! - `addr`: `VirtAddr`/`PhysAddr`
//! - `pmm`: contrato `FrameAllocator`
//! - `aspace`: `AddressSpace` (PML4 + lock + threads)
//! - `vmm`: mapper e TLB

pub mod addr;
pub mod aspace;
pub mod config;
pub mod error;
pub mod pmm;
pub mod vmm;


pub use addr::{PhysAddr, VirtAddr};
pub use error::{MmError, MmResult};
