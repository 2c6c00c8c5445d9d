//! File handle - instância aberta (flags + posição)
//!
//! Um `File` é criado por open/dup/pipe e compartilhado por fork: `count`
//! conta as entradas de tabela de descritores que apontam para ele. Quando
//! chega a zero, o handle é fechado de verdade (`close::close_file`).

use bitflags::bitflags;
use core::sync::atomic::{AtomicU64, Ordering};

use super::inode::InodeRef;
use crate::sync::RefCount;

bitflags! {
    /// Flags para open
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Somente escrita
        const WRONLY = 1;
        /// Leitura e escrita
        const RDWR = 2;
        /// Criar se não existir
        const CREATE = 0x0100;
        /// Truncar arquivo existente
        const TRUNC = 0x0200;
        /// Append mode
        const APPEND = 0x0400;
        /// Falhar se existir (com CREATE)
        const EXCL = 0x0800;
        /// Abrir diretório
        const DIRECTORY = 0x1000;
    }
}

impl OpenFlags {
    /// Somente leitura
    pub const RDONLY: Self = Self::empty();

    pub fn can_read(&self) -> bool {
        !self.contains(Self::WRONLY) || self.contains(Self::RDWR)
    }

    pub fn can_write(&self) -> bool {
        self.intersects(Self::WRONLY | Self::RDWR)
    }
}

/// Whence para seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SeekWhence {
    /// Do início do arquivo
    Set = 0,
    /// Da posição atual
    Cur = 1,
    /// Do fim do arquivo
    End = 2,
}

impl SeekWhence {
    pub fn from_u32(val: u32) -> Option<Self> {
        match val {
            0 => Some(Self::Set),
            1 => Some(Self::Cur),
            2 => Some(Self::End),
            _ => None,
        }
    }
}

pub struct File {
    inode: InodeRef,
    flags: OpenFlags,
    pos: AtomicU64,
    /// Entradas de tabela que apontam para este handle
    pub(crate) count: RefCount,
}

impl File {
    /// Novo handle com uma entrada de tabela. Quem chama já transferiu a
    /// referência `count`/`f_count` do inode para o handle.
    pub(crate) fn new(inode: InodeRef, flags: OpenFlags, pos: u64) -> Self {
        Self {
            inode,
            flags,
            pos: AtomicU64::new(pos),
            count: RefCount::new(1),
        }
    }

    #[inline]
    pub fn inode(&self) -> &InodeRef {
        &self.inode
    }

    #[inline]
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    #[inline]
    pub fn readable(&self) -> bool {
        self.flags.can_read()
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.flags.can_write()
    }

    pub fn pos(&self) -> u64 {
        self.pos.load(Ordering::Acquire)
    }

    pub(crate) fn set_pos(&self, pos: u64) {
        self.pos.store(pos, Ordering::Release);
    }

    pub(crate) fn advance(&self, n: usize) {
        self.pos.fetch_add(n as u64, Ordering::AcqRel);
    }

    /// Entradas de tabela que compartilham este handle
    pub fn shares(&self) -> usize {
        self.count.get()
    }
}
