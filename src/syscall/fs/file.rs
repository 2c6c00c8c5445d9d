//! # Filesystem File Syscalls
//!
//! open, close, read, write, seek, fsync, stat, fstat, statfs, readdir

use alloc::vec::Vec;

use super::{file_of, install};
use crate::fs::vfs::close::close_file;
use crate::fs::vfs::{io, open, DirEntry, FileMode, FsStat, OpenFlags, SeekWhence, Stat, Vfs};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};
use crate::syscall::handle::Fd;

/// Abre `path` e instala o handle no menor descritor livre.
pub fn sys_open(vfs: &Vfs, task: &Task, path: &str, flags: OpenFlags, mode: FileMode) -> SysResult<Fd> {
    let file = open::open(vfs, task, path, flags, mode)?;
    install(vfs, task, file, 0)
}

/// Fecha `fd`. O handle só é fechado de verdade quando era a última entrada.
pub fn sys_close(vfs: &Vfs, task: &Task, fd: Fd) -> SysResult<()> {
    let file = task.files.lock().remove(fd).ok_or(SysError::BadDescriptor)?;
    close_file(vfs, file);
    crate::ktrace!("(FD) Fechado fd=", fd);
    Ok(())
}

pub fn sys_read(vfs: &Vfs, task: &Task, fd: Fd, buf: &mut [u8]) -> SysResult<usize> {
    let file = file_of(task, fd)?;
    io::read(vfs, &file, buf)
}

pub fn sys_write(vfs: &Vfs, task: &Task, fd: Fd, buf: &[u8]) -> SysResult<usize> {
    let file = file_of(task, fd)?;
    io::write(vfs, &file, buf)
}

/// `whence`: 0 = início, 1 = atual, 2 = fim
pub fn sys_seek(task: &Task, fd: Fd, offset: i64, whence: u32) -> SysResult<u64> {
    let whence = SeekWhence::from_u32(whence).ok_or(SysError::InvalidArgument)?;
    let file = file_of(task, fd)?;
    io::seek(&file, offset, whence)
}

pub fn sys_fsync(task: &Task, fd: Fd) -> SysResult<()> {
    let file = file_of(task, fd)?;
    io::fsync(&file)
}

pub fn sys_stat(task: &Task, path: &str) -> SysResult<Stat> {
    io::stat(task, path)
}

pub fn sys_fstat(task: &Task, fd: Fd) -> SysResult<Stat> {
    let file = file_of(task, fd)?;
    io::fstat(&file)
}

pub fn sys_statfs(task: &Task, path: &str) -> SysResult<FsStat> {
    io::statfs(task, path)
}

pub fn sys_readdir(task: &Task, fd: Fd) -> SysResult<Vec<DirEntry>> {
    let file = file_of(task, fd)?;
    io::readdir(&file)
}
