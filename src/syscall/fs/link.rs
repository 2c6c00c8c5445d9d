//! # Filesystem Link Syscalls
//!
//! link, unlink, rmdir, mknod, mkdir

use crate::fs::vfs::{link, FileMode, FileType};
use crate::sched::Task;
use crate::syscall::error::SysResult;

pub fn sys_unlink(task: &Task, path: &str) -> SysResult<()> {
    link::unlink(task, path)
}

pub fn sys_rmdir(task: &Task, path: &str) -> SysResult<()> {
    link::rmdir(task, path)
}

pub fn sys_link(task: &Task, old: &str, new: &str) -> SysResult<()> {
    link::link(task, old, new)
}

/// FIFO, dispositivo de caractere/bloco ou arquivo regular vazio
pub fn sys_mknod(task: &Task, path: &str, kind: FileType, mode: FileMode, dev: u32) -> SysResult<()> {
    link::mknod(task, path, kind, mode, dev)
}

pub fn sys_mkdir(task: &Task, path: &str, mode: FileMode) -> SysResult<()> {
    link::mkdir(task, path, mode)
}
