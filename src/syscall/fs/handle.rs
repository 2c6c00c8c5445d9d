//! # Descriptor Syscalls
//!
//! dup, dup2, pipe, select

use alloc::vec::Vec;

use super::{file_of, install};
use crate::fs::vfs::close::close_file;
use crate::fs::vfs::{open, FileType, Vfs};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};
use crate::syscall::handle::{Fd, MAX_FILES};

/// Duplica `fd` no menor descritor livre.
pub fn sys_dup(vfs: &Vfs, task: &Task, fd: Fd) -> SysResult<Fd> {
    let file = file_of(task, fd)?;
    let dup = open::duplicate(vfs, &file)?;
    install(vfs, task, dup, 0)
}

/// Duplica `fd` em `target`. Um `target` ocupado é fechado.
///
/// A troca do slot é feita numa única seção da tabela; o handle antigo é
/// fechado depois, fora do lock.
pub fn sys_dup2(vfs: &Vfs, task: &Task, fd: Fd, target: Fd) -> SysResult<Fd> {
    if target >= MAX_FILES {
        return Err(SysError::BadDescriptor);
    }
    let file = file_of(task, fd)?;
    if fd == target {
        return Ok(fd);
    }

    let dup = open::duplicate(vfs, &file)?;
    let old = task.files.lock().replace(target, dup);
    if let Some(old) = old {
        crate::ktrace!("(FD) dup2 fechando alvo fd=", target);
        close_file(vfs, old);
    }

    crate::ktrace!("(FD) Instalado fd=", target);
    Ok(target)
}

/// Cria um pipe anônimo. Devolve `[leitura, escrita]`.
pub fn sys_pipe(vfs: &Vfs, task: &Task) -> SysResult<[Fd; 2]> {
    let (reader, writer) = open::open_pipe(vfs, task);

    let rfd = match install(vfs, task, reader, 0) {
        Ok(fd) => fd,
        Err(e) => {
            close_file(vfs, writer);
            return Err(e);
        }
    };
    let wfd = match install(vfs, task, writer, 0) {
        Ok(fd) => fd,
        Err(e) => {
            let reader = task.files.lock().remove(rfd);
            if let Some(reader) = reader {
                close_file(vfs, reader);
            }
            return Err(e);
        }
    };

    crate::kdebug!("(Pipe) pipe() instalado, fd leitura=", rfd);
    Ok([rfd, wfd])
}

/// Descritores prontos, sem bloquear
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub read: Vec<Fd>,
    pub write: Vec<Fd>,
}

/// Quais descritores de `read`/`write` não bloqueariam agora.
///
/// Só pipes podem bloquear; os demais estão sempre prontos.
pub fn sys_select(task: &Task, read: &[Fd], write: &[Fd]) -> SysResult<Readiness> {
    let mut ready = Readiness::default();

    for &fd in read {
        let file = file_of(task, fd)?;
        let inode = file.inode();
        let ok = match (inode.kind, inode.pipe()) {
            (FileType::Fifo, Some(pipe)) => pipe.read_ready(),
            (FileType::Fifo, None) => false,
            _ => true,
        };
        if ok && file.readable() {
            ready.read.push(fd);
        }
    }

    for &fd in write {
        let file = file_of(task, fd)?;
        let inode = file.inode();
        let ok = match (inode.kind, inode.pipe()) {
            (FileType::Fifo, Some(pipe)) => pipe.write_ready(),
            (FileType::Fifo, None) => false,
            _ => true,
        };
        if ok && file.writable() {
            ready.write.push(fd);
        }
    }

    Ok(ready)
}
