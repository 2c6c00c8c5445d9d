//! # Configuração do Módulo de Memória
//!
//! Constantes de página e layout de memória virtual usados pelo caminho de
//! map/unmap e pela política de TLB shootdown.

// =============================================================================
// CONSTANTES DE TAMANHO
// =============================================================================

/// Tamanho de uma página (4 KiB)
pub const PAGE_SIZE: usize = 4096;

/// Máscara para alinhar endereços a página
pub const PAGE_MASK: usize = !(PAGE_SIZE - 1);

/// Entradas por tabela de página (todos os 4 níveis)
pub const PT_ENTRIES: usize = 512;

// =============================================================================
// LAYOUT DE MEMÓRIA VIRTUAL
// =============================================================================

/// Início da metade superior (memória do kernel, compartilhada por todos)
pub const KERNEL_BASE: u64 = 0xFFFF_8000_0000_0000;

/// Região de memória compartilhada entre threads do mesmo processo
pub const THREAD_SHARED_START: u64 = 0x0000_6000_0000_0000;

/// Fim (exclusivo) da região compartilhada entre threads
pub const THREAD_SHARED_END: u64 = 0x0000_7000_0000_0000;

/// Página de dados por tarefa ("quem sou eu"), remapeada a cada troca de
/// contexto. Nunca dispara shootdown.
pub const PDIR_DATA: u64 = 0xFFFF_FF7F_FFFF_F000;

/// Base padrão do heap de usuário (`sbrk`)
pub const USER_HEAP_BASE: u64 = 0x0000_0000_4000_0000;

// =============================================================================
// FLAGS DE PAGE TABLE
// =============================================================================

/// Máscara para extrair endereço físico de PTE
pub const PTE_ADDR_MASK: u64 = 0x000F_FFFF_FFFF_F000;

// =============================================================================
// FUNÇÕES UTILITÁRIAS
// =============================================================================

/// Alinha valor para cima ao múltiplo de align
#[inline(always)]
pub const fn align_up(val: u64, align: u64) -> u64 {
    (val + align - 1) & !(align - 1)
}

/// Alinha valor para baixo ao múltiplo de align
#[inline(always)]
pub const fn align_down(val: u64, align: u64) -> u64 {
    val & !(align - 1)
}

/// Verifica se valor está alinhado
#[inline(always)]
pub const fn is_aligned(val: u64, align: u64) -> bool {
    val & (align - 1) == 0
}
