//! # Filesystem Syscalls
//!
//! Camada de descritores sobre o VFS: traduz `fd` ↔ `File` na tabela da
//! tarefa e delega o protocolo para `fs::vfs`.
//!
//! ## Organização
//!
//! | Módulo   | Descrição                                        |
//! |----------|--------------------------------------------------|
//! | `file`   | open, close, read, write, seek, fsync, stat      |
//! | `handle` | dup, dup2, pipe, select                          |
//! | `link`   | link, unlink, rmdir, mknod, mkdir                |
//! | `mount`  | mount, umount, sync                              |
//!
//! O lock da tabela de descritores nunca fica seguro durante I/O nem
//! durante o close de um handle.

pub mod file;
pub mod handle;
pub mod link;
pub mod mount;

pub use file::*;
pub use handle::*;
pub use link::*;
pub use mount::*;

use alloc::sync::Arc;

use crate::fs::vfs::close::close_file;
use crate::fs::vfs::{File, Vfs};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};
use crate::syscall::handle::Fd;

/// Handle instalado em `fd`
pub(crate) fn file_of(task: &Task, fd: Fd) -> SysResult<Arc<File>> {
    task.files.lock().get(fd).ok_or(SysError::BadDescriptor)
}

/// Instala `file` no menor slot livre `>= start`.
///
/// Tabela cheia é falta grave: a tarefa é morta pelo escalonador, o handle
/// é fechado e o chamador recebe `OutOfDescriptors`.
pub(crate) fn install(vfs: &Vfs, task: &Task, file: Arc<File>, start: Fd) -> SysResult<Fd> {
    let result = task.files.lock().insert_from(start, file);
    match result {
        Ok(fd) => {
            crate::ktrace!("(FD) Instalado fd=", fd);
            Ok(fd)
        }
        Err(file) => {
            crate::kwarn!("(FD) Tabela de descritores cheia, matando task=", task.id);
            vfs.sched().kill(task.id);
            close_file(vfs, file);
            Err(SysError::OutOfDescriptors)
        }
    }
}
