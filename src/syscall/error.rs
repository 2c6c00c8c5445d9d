//! Códigos de Erro do núcleo de filesystem
//!
//! Sistema de erros unificado para todas as syscalls.
//! Erros são retornados como valores negativos (errno POSIX).

use crate::fs::vfs::inode::FsError;
use crate::ipc::PipeError;
use crate::mm::error::MmError;

/// Enum de erros do sistema.
///
/// Valores são i32 para permitir representação negativa em isize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SysError {
    /// Operação não permitida (EPERM)
    PermissionDenied = 1,
    /// Objeto não encontrado (ENOENT)
    NotFound = 2,
    /// Sinal chegou durante espera bloqueante (EINTR)
    Interrupted = 4,
    /// Erro genérico de IO (EIO)
    IoError = 5,
    /// Descritor inválido ou sem o modo de acesso pedido (EBADF)
    BadDescriptor = 9,
    /// Sem memória disponível (ENOMEM)
    OutOfMemory = 12,
    /// Permissão de acesso negada (EACCES)
    AccessDenied = 13,
    /// Recurso ocupado (EBUSY)
    Busy = 16,
    /// Objeto já existe (EEXIST)
    AlreadyExists = 17,
    NotADirectory = 20,
    IsADirectory = 21,
    /// Argumento inválido (EINVAL)
    InvalidArgument = 22,
    /// Tabela de descritores cheia (EMFILE)
    OutOfDescriptors = 24,
    /// Escrita sem leitores (EPIPE)
    BrokenPipe = 32,
    /// Operação não suportada (ENOSYS)
    NotSupported = 38,
    /// Diretório não vazio (ENOTEMPTY)
    NotEmpty = 39,
}

impl SysError {
    /// Converte para isize negativo (formato de retorno da syscall)
    #[inline]
    pub fn as_isize(self) -> isize {
        -(self as i32 as isize)
    }

    /// Cria erro a partir de código negativo
    pub fn from_code(code: isize) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        match -code {
            1 => Some(Self::PermissionDenied),
            2 => Some(Self::NotFound),
            4 => Some(Self::Interrupted),
            5 => Some(Self::IoError),
            9 => Some(Self::BadDescriptor),
            12 => Some(Self::OutOfMemory),
            13 => Some(Self::AccessDenied),
            16 => Some(Self::Busy),
            17 => Some(Self::AlreadyExists),
            20 => Some(Self::NotADirectory),
            21 => Some(Self::IsADirectory),
            22 => Some(Self::InvalidArgument),
            24 => Some(Self::OutOfDescriptors),
            32 => Some(Self::BrokenPipe),
            38 => Some(Self::NotSupported),
            39 => Some(Self::NotEmpty),
            _ => None,
        }
    }
}

/// Resultado de syscall: Ok(valor) ou Err(SysError)
pub type SysResult<T> = Result<T, SysError>;

/// Helper para converter SysResult<usize> em isize para retorno
pub fn result_to_isize(result: SysResult<usize>) -> isize {
    match result {
        Ok(val) => val as isize,
        Err(e) => e.as_isize(),
    }
}

// =============================================================================
// CONVERSÕES
// =============================================================================

impl From<FsError> for SysError {
    fn from(e: FsError) -> Self {
        match e {
            FsError::NotFound => Self::NotFound,
            FsError::NotDirectory => Self::NotADirectory,
            FsError::IsDirectory => Self::IsADirectory,
            FsError::NotEmpty => Self::NotEmpty,
            FsError::AlreadyExists => Self::AlreadyExists,
            FsError::PermissionDenied => Self::AccessDenied,
            FsError::IoError => Self::IoError,
            FsError::ReadOnly => Self::PermissionDenied,
            FsError::NoSpace => Self::OutOfMemory,
            FsError::NotSupported => Self::NotSupported,
            FsError::InvalidName => Self::InvalidArgument,
        }
    }
}

impl From<MmError> for SysError {
    fn from(e: MmError) -> Self {
        match e {
            MmError::OutOfMemory => Self::OutOfMemory,
            MmError::NotAligned | MmError::InvalidAddress => Self::InvalidArgument,
            MmError::AlreadyMapped => Self::Busy,
        }
    }
}

impl From<PipeError> for SysError {
    fn from(e: PipeError) -> Self {
        match e {
            PipeError::BrokenPipe => Self::BrokenPipe,
            PipeError::Interrupted => Self::Interrupted,
        }
    }
}
