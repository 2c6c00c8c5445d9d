//! Sistema de Arquivos Virtual (VFS).
//!
//! Submódulos:
//! - `vfs`: inodes, handles, protocolo open/close/unlink/mount.
//! - `tmpfs`: filesystem em RAM (raiz).
//! - `devfs`: nós de dispositivo (/dev).
//! - `procfs`: informações do sistema (/proc).

pub mod devfs;
pub mod procfs;
pub mod tmpfs;
pub mod vfs;

#[cfg(test)]
mod tests;
