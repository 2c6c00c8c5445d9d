//! Virtual Memory Manager (VMM)
//!
//! Walk de page tables, map/translate/unmap e TLB shootdown.

pub mod mapper;
pub mod tlb;

pub use mapper::{PageFlags, Vmm};
pub use tlb::TlbBackend;
