//! I/O através de um handle aberto
//!
//! Despacho por tipo de inode: FIFO → pipe, char/block → hooks de
//! dispositivo, regular → driver. A posição do handle avança pelo número
//! de bytes transferidos (pipes não têm posição).

use alloc::vec::Vec;

use super::file::{File, OpenFlags, SeekWhence};
use super::inode::{DirEntry, FileType, FsStat, Stat};
use super::lookup::lookup;
use super::Vfs;
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

pub fn read(vfs: &Vfs, file: &File, buf: &mut [u8]) -> SysResult<usize> {
    if !file.readable() {
        return Err(SysError::BadDescriptor);
    }

    let inode = file.inode();
    match inode.kind {
        FileType::Fifo => {
            let pipe = inode.pipe().ok_or(SysError::IoError)?;
            Ok(pipe.read(vfs.sched(), buf)?)
        }
        FileType::CharDevice | FileType::BlockDevice => {
            let n = vfs.devices().read(inode.dev, file.pos(), buf)?;
            file.advance(n);
            Ok(n)
        }
        FileType::Directory => Err(SysError::IsADirectory),
        FileType::Regular => {
            let n = inode.ops.read(inode, file.pos(), buf)?;
            file.advance(n);
            Ok(n)
        }
    }
}

pub fn write(vfs: &Vfs, file: &File, buf: &[u8]) -> SysResult<usize> {
    if !file.writable() {
        return Err(SysError::BadDescriptor);
    }

    let inode = file.inode();
    match inode.kind {
        FileType::Fifo => {
            let pipe = inode.pipe().ok_or(SysError::IoError)?;
            Ok(pipe.write(vfs.sched(), buf)?)
        }
        FileType::CharDevice | FileType::BlockDevice => {
            let n = vfs.devices().write(inode.dev, file.pos(), buf)?;
            file.advance(n);
            Ok(n)
        }
        FileType::Directory => Err(SysError::IsADirectory),
        FileType::Regular => {
            if file.flags().contains(OpenFlags::APPEND) {
                file.set_pos(inode.len());
            }
            let n = inode.ops.write(inode, file.pos(), buf)?;
            file.advance(n);
            Ok(n)
        }
    }
}

/// Reposiciona o handle. Devolve a nova posição.
pub fn seek(file: &File, offset: i64, whence: SeekWhence) -> SysResult<u64> {
    let inode = file.inode();
    if inode.is_fifo() {
        return Err(SysError::InvalidArgument);
    }

    let base = match whence {
        SeekWhence::Set => 0,
        SeekWhence::Cur => file.pos() as i64,
        SeekWhence::End => inode.len() as i64,
    };
    let pos = base.checked_add(offset).ok_or(SysError::InvalidArgument)?;
    if pos < 0 {
        return Err(SysError::InvalidArgument);
    }

    file.set_pos(pos as u64);
    Ok(pos as u64)
}

/// Persiste os metadados do inode no driver.
pub fn fsync(file: &File) -> SysResult<()> {
    let inode = file.inode();
    inode.ops.sync_inode(inode)?;
    Ok(())
}

pub fn fstat(file: &File) -> SysResult<Stat> {
    let inode = file.inode();
    Ok(inode.ops.stat(inode)?)
}

pub fn stat(task: &Task, path: &str) -> SysResult<Stat> {
    let inode = lookup(task, path)?;
    Ok(inode.ops.stat(&inode)?)
}

/// Estatísticas do filesystem que contém `path`.
pub fn statfs(task: &Task, path: &str) -> SysResult<FsStat> {
    let inode = lookup(task, path)?;
    Ok(inode.ops.statfs(&inode)?)
}

/// Entradas do diretório aberto em `file`.
pub fn readdir(file: &File) -> SysResult<Vec<DirEntry>> {
    let inode = file.inode();
    if !inode.is_dir() {
        return Err(SysError::NotADirectory);
    }
    Ok(inode.ops.readdir(inode)?)
}
