//! TmpFS - Temporary Filesystem
//!
//! Sistema de arquivos em RAM. É a raiz do VFS e o filesystem criado por
//! `mount_by_name(.., "tmpfs")`.
//!
//! A árvore de nomes vive no cache de filhos do VFS; o driver só guarda o
//! conteúdo dos arquivos regulares, indexado pelo número do inode.

mod tmpfs;

pub use tmpfs::{TmpFs, MAX_FILE_SIZE};
