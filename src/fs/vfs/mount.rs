//! Mount Points - Pontos de montagem de filesystems
//!
//! Uma montagem liga um diretório alvo (`mount`) a uma raiz de filesystem
//! (`mount_parent` na raiz, referência fraca de volta). A lista global de
//! montagens é protegida por um único mutex: mount/unmount são raros.
//!
//! Cada registro segura uma referência `count` na raiz montada.

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::mem;
use spin::{Mutex, MutexGuard};

use super::inode::{iput, InodeFlags, InodeRef};
use super::lookup::{lookup, lookup_mountpoint};
use super::Vfs;
use crate::fs::tmpfs::TmpFs;
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

/// Registro de montagem
#[derive(Clone)]
pub struct MountRecord {
    /// Caminho do alvo no momento da montagem
    pub path: String,
    pub target: InodeRef,
    pub root: InodeRef,
    pub fs_name: &'static str,
}

/// Lista global de montagens
pub struct MountTable {
    list: Mutex<Vec<MountRecord>>,
}

impl MountTable {
    pub const fn new() -> Self {
        Self {
            list: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<MountRecord>> {
        self.list.lock()
    }

    /// Uma linha `"<fs> <caminho>"` por montagem (conteúdo de /proc/mounts)
    pub fn describe(&self) -> String {
        let list = self.list.lock();
        let mut out = String::new();
        for record in list.iter() {
            out.push_str(record.fs_name);
            out.push(' ');
            out.push_str(&record.path);
            out.push('\n');
        }
        out
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// MOUNT
// =============================================================================

/// Liga `root` ao diretório `target`, sem checagem de permissão.
pub(crate) fn attach(
    table: &MountTable,
    path: &str,
    target: &InodeRef,
    root: &InodeRef,
) -> SysResult<()> {
    if Arc::ptr_eq(target, root) {
        return Err(SysError::InvalidArgument);
    }

    let mut list = table.lock();
    let mut tdata = target.lock.write();
    if tdata.mount.is_some() {
        return Err(SysError::Busy);
    }
    let mut rdata = root.lock.write();
    // Uma raiz só pode estar montada em um lugar
    if rdata.mount_parent.upgrade().is_some() {
        return Err(SysError::Busy);
    }

    tdata.mount = Some(root.clone());
    rdata.mount_parent = Arc::downgrade(target);
    drop(rdata);
    drop(tdata);

    root.count.inc();
    list.push(MountRecord {
        path: String::from(path),
        target: target.clone(),
        root: root.clone(),
        fs_name: root.ops.name(),
    });

    crate::kinfo!("(Mount) Filesystem montado, sb=", root.sb_idx);
    Ok(())
}

/// Monta o filesystem de raiz `root` em `target_path`. Só root.
pub fn mount(vfs: &Vfs, task: &Task, target_path: &str, root: &InodeRef) -> SysResult<()> {
    if !task.creds.is_privileged() {
        return Err(SysError::PermissionDenied);
    }

    let target = lookup_mountpoint(task, target_path)?;
    if Arc::ptr_eq(&target, &task.root()) {
        return Err(SysError::InvalidArgument);
    }
    if !target.is_dir() {
        return Err(SysError::NotADirectory);
    }
    if !root.is_dir() {
        return Err(SysError::IoError);
    }

    attach(vfs.mounts(), target_path, &target, root)
}

/// Atalhos de montagem: `devfs` e `procfs` remontam as raízes permanentes,
/// `tmpfs` cria um filesystem em RAM novo.
pub fn mount_by_name(vfs: &Vfs, task: &Task, target_path: &str, fs_name: &str) -> SysResult<()> {
    let root = match fs_name {
        "devfs" => vfs.devfs_root().clone(),
        "procfs" => vfs.procfs_root().clone(),
        "tmpfs" => TmpFs::new_root(vfs.alloc_sb_idx()),
        _ => return Err(SysError::InvalidArgument),
    };
    mount(vfs, task, target_path, &root)
}

// =============================================================================
// UNMOUNT
// =============================================================================

/// Soma das referências `count` em toda a subárvore abaixo de `dir`,
/// incluindo raízes montadas dentro dela.
fn subtree_refs(dir: &InodeRef) -> usize {
    let (children, mounted): (Vec<InodeRef>, Option<InodeRef>) = {
        let data = dir.lock.read();
        (data.children.values().cloned().collect(), data.mount.clone())
    };

    let mut total = 0;
    for child in children.iter().chain(mounted.iter()) {
        total += child.count.get();
        if child.is_dir() {
            total += subtree_refs(child);
        }
    }
    total
}

/// Solta recursivamente os inodes em memória abaixo de `dir`.
/// Montagens aninhadas não são atravessadas.
fn release_subtree(dir: &InodeRef) {
    let children = mem::take(&mut dir.lock.write().children);
    for (_, child) in children {
        if child.is_dir() {
            release_subtree(&child);
        }
        child.lock.write().parent = Weak::new();
    }
}

/// Desmonta o filesystem montado em `path`.
///
/// Sem `force`, falha com `Busy` se algum inode da subárvore ainda tem
/// referência. Raízes pseudo (devfs, procfs) são só desligadas.
pub fn unmount(vfs: &Vfs, task: &Task, path: &str, force: bool) -> SysResult<()> {
    // A referência do próprio lookup não deve contar como uso
    let root = lookup(task, path)?.release();

    if !task.creds.is_privileged() {
        return Err(SysError::PermissionDenied);
    }
    if root.flags().contains(InodeFlags::REQUIRED) {
        return Err(SysError::Busy);
    }
    let Some(target) = root.mount_parent() else {
        return Err(SysError::NotFound);
    };

    let mut list = vfs.mounts().lock();
    if root.count.get() > 1 {
        crate::kdebug!("(Mount) Raiz ainda referenciada, count=", root.count.get());
        return Err(SysError::Busy);
    }
    if !force && subtree_refs(&root) > 0 {
        return Err(SysError::Busy);
    }

    root.ops.unmount(&root)?;

    {
        let mut tdata = target.lock.write();
        let mut rdata = root.lock.write();
        tdata.mount = None;
        rdata.mount_parent = Weak::new();
    }
    list.retain(|r| !Arc::ptr_eq(&r.root, &root));
    drop(list);

    if !vfs.is_pseudo_root(&root) {
        release_subtree(&root);
    }
    iput(&root);

    crate::kinfo!("(Mount) Filesystem desmontado, sb=", root.sb_idx);
    Ok(())
}
