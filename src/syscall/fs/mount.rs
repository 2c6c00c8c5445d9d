//! # Filesystem Mount Syscalls
//!
//! mount, umount, sync

use crate::fs::vfs::{mount, InodeRef, Vfs};
use crate::sched::Task;
use crate::syscall::error::SysResult;

/// Monta a raiz de filesystem `root` em `target`.
pub fn sys_mount(vfs: &Vfs, task: &Task, target: &str, root: &InodeRef) -> SysResult<()> {
    mount::mount(vfs, task, target, root)
}

/// Monta `"devfs"`, `"procfs"` ou um `"tmpfs"` novo em `target`.
pub fn sys_mount_by_name(vfs: &Vfs, task: &Task, target: &str, fs_name: &str) -> SysResult<()> {
    mount::mount_by_name(vfs, task, target, fs_name)
}

pub fn sys_umount(vfs: &Vfs, task: &Task, path: &str, force: bool) -> SysResult<()> {
    mount::unmount(vfs, task, path, force)
}

pub fn sys_sync(vfs: &Vfs) -> SysResult<()> {
    vfs.sync()
}
