//! Tipos de Erro do Subsistema de Memória
//!
//! Define erros estruturados para diagnóstico preciso de falhas em MM.

/// Erros do subsistema de memória
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Sem memória física disponível (OOM)
    OutOfMemory,
    /// Endereço não alinhado a página
    NotAligned,
    /// Região já mapeada
    AlreadyMapped,
    /// Endereço inválido (fora da faixa permitida)
    InvalidAddress,
}

impl MmError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "OOM: sem frames físicos disponíveis",
            Self::NotAligned => "Endereço não alinhado a página",
            Self::AlreadyMapped => "Região já mapeada",
            Self::InvalidAddress => "Endereço inválido",
        }
    }
}

/// Resultado de operações de memória
pub type MmResult<T> = Result<T, MmError>;
