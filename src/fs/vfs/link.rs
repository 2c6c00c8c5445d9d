//! Link / Unlink / Rmdir / Mknod
//!
//! A remoção de uma entrada acontece com o lock de escrita do pai e depois
//! do alvo (sempre nessa ordem), então nenhum lookup novo pode achar o nome
//! entre a checagem das contagens e a remoção.
//!
//! Deleção adiada: com `f_count > 0` o unlink só marca o inode
//! (`MARKED_FOR_DELETION`) e guarda o nome; o último close faz a remoção.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use super::inode::{iput, CountedRef, FileMode, FileType, InodeFlags, InodeRef};
use super::lookup::{child_lookup, lookup, lookup_parent};
use super::open::create_node;
use super::perm::{permitted, sticky_allows, Access};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

// =============================================================================
// UNLINK / RMDIR
// =============================================================================

/// Remove o nome `path` (não-diretório).
pub fn unlink(task: &Task, path: &str) -> SysResult<()> {
    remove(task, path, false)
}

/// Remove o diretório vazio `path`.
pub fn rmdir(task: &Task, path: &str) -> SysResult<()> {
    remove(task, path, true)
}

fn remove(task: &Task, path: &str, dir: bool) -> SysResult<()> {
    let (parent, name) = lookup_parent(task, path)?;
    let target = CountedRef::get(&child_lookup(&parent, &name)?);

    if !permitted(&parent, &task.creds, Access::WRITE | Access::EXEC) {
        return Err(SysError::AccessDenied);
    }
    if !sticky_allows(&parent, &target, &task.creds) {
        return Err(SysError::PermissionDenied);
    }
    if dir {
        if !target.is_dir() {
            return Err(SysError::NotADirectory);
        }
        if Arc::ptr_eq(&target, &task.root()) {
            return Err(SysError::Busy);
        }
    } else if target.is_dir() {
        return Err(SysError::IsADirectory);
    }

    let pipe_live = target.pipe().map_or(false, |p| p.endpoints() > 0);

    let mut pdata = parent.lock.write();
    match pdata.children.get(&name) {
        Some(child) if Arc::ptr_eq(child, &target) => {}
        _ => return Err(SysError::NotFound),
    }

    let mut tdata = target.lock.write();
    if dir {
        if tdata.mount.is_some() || tdata.mount_parent.upgrade().is_some() {
            return Err(SysError::Busy);
        }
        if !tdata.children.is_empty() {
            return Err(SysError::NotEmpty);
        }
    }

    if target.f_count.get() > 0 {
        tdata.flags.insert(InodeFlags::MARKED_FOR_DELETION);
        tdata.pending_unlinks.push((Arc::downgrade(&parent), name));
        crate::kdebug!("(VFS) Unlink adiado (inode aberto) ino=", target.num);
        return Ok(());
    }

    // Nossa própria referência de lookup é a única permitida
    if target.count.get() > 1 || pipe_live {
        return Err(SysError::Busy);
    }

    if dir {
        parent.ops.rmdir(&parent, &name, &target)?;
    } else {
        parent.ops.unlink(&parent, &name, &target)?;
    }
    pdata.children.remove(&name);
    drop(tdata);
    drop(pdata);

    target.dec_nlink();
    crate::ktrace!("(VFS) Entrada removida ino=", target.num);
    Ok(())
}

/// Remoção física adiada, chamada pelo último close.
///
/// Cada nome pendente é removido com o lock do pai e depois o do inode, e
/// `f_count` é rechecado sob os dois: um open que chegou antes fica com o
/// nome. Diretório que ganhou filhos nesse meio tempo não é removido.
///
/// Consome a referência `count` do handle que fechou.
pub(crate) fn do_unlink(inode: &InodeRef) {
    loop {
        let pending = {
            let mut data = inode.lock.write();
            // Reaberto entre o último close e aqui: continua adiado
            if inode.f_count.get() > 0 {
                break;
            }
            mem::take(&mut data.pending_unlinks)
        };

        let mut reopened = Vec::new();
        for (weak_parent, name) in pending {
            let Some(parent) = weak_parent.upgrade() else {
                continue;
            };
            if !unlink_pending(&parent, &name, inode) {
                reopened.push((weak_parent, name));
            }
        }

        let mut data = inode.lock.write();
        data.pending_unlinks.extend(reopened);
        if data.pending_unlinks.is_empty() {
            data.flags.remove(InodeFlags::MARKED_FOR_DELETION);
            crate::kdebug!("(VFS) Unlink adiado concluído ino=", inode.num);
            break;
        }
        if inode.f_count.get() > 0 {
            crate::kdebug!("(VFS) Reaberto durante unlink adiado ino=", inode.num);
            break;
        }
    }

    iput(inode);
}

/// Remove um nome pendente. `false` = o inode foi reaberto, nome mantido.
fn unlink_pending(parent: &InodeRef, name: &str, inode: &InodeRef) -> bool {
    let mut pdata = parent.lock.write();
    match pdata.children.get(name) {
        Some(child) if Arc::ptr_eq(child, inode) => {}
        _ => return true,
    }

    let tdata = inode.lock.write();
    if inode.f_count.get() > 0 {
        return false;
    }
    if inode.is_dir() && !tdata.children.is_empty() {
        crate::kwarn!("(VFS) Diretório com filhos no rmdir adiado, mantido ino=", inode.num);
        return true;
    }

    let result = if inode.is_dir() {
        parent.ops.rmdir(parent, name, inode)
    } else {
        parent.ops.unlink(parent, name, inode)
    };
    if result.is_err() {
        crate::kwarn!("(VFS) Driver recusou unlink adiado ino=", inode.num);
        return true;
    }
    pdata.children.remove(name);
    inode.dec_nlink();
    true
}

// =============================================================================
// LINK
// =============================================================================

/// Novo nome `new` para o inode de `old`. Um `new` existente é removido antes.
pub fn link(task: &Task, old: &str, new: &str) -> SysResult<()> {
    let src = lookup(task, old)?;
    if src.is_dir() {
        return Err(SysError::PermissionDenied);
    }

    let (parent, name) = lookup_parent(task, new)?;
    if !permitted(&parent, &task.creds, Access::WRITE | Access::EXEC) {
        return Err(SysError::AccessDenied);
    }
    if parent.sb_idx != src.sb_idx {
        return Err(SysError::InvalidArgument);
    }

    match child_lookup(&parent, &name) {
        Ok(existing) if Arc::ptr_eq(&existing, &src) => return Ok(()),
        Ok(_) => unlink(task, new)?,
        Err(SysError::NotFound) => {}
        Err(e) => return Err(e),
    }

    let mut pdata = parent.lock.write();
    if pdata.flags.contains(InodeFlags::MARKED_FOR_DELETION) {
        return Err(SysError::NotFound);
    }
    if pdata.children.contains_key(&name) {
        return Err(SysError::AlreadyExists);
    }
    parent.ops.link(&parent, &name, &src)?;
    pdata.children.insert(String::from(name.as_str()), (*src).clone());
    drop(pdata);

    src.inc_nlink();
    crate::ktrace!("(VFS) link ino=", src.num);
    Ok(())
}

// =============================================================================
// MKNOD / MKDIR
// =============================================================================

/// Cria FIFO, dispositivo ou arquivo regular vazio em `path`.
///
/// Dispositivos exigem privilégio.
pub fn mknod(task: &Task, path: &str, kind: FileType, mode: FileMode, dev: u32) -> SysResult<()> {
    match kind {
        FileType::Directory => return Err(SysError::InvalidArgument),
        FileType::CharDevice | FileType::BlockDevice if !task.creds.is_privileged() => {
            return Err(SysError::PermissionDenied)
        }
        _ => {}
    }
    create_node(task, path, kind, mode, dev, true).map(|_| ())
}

/// Cria o diretório `path`.
pub fn mkdir(task: &Task, path: &str, mode: FileMode) -> SysResult<()> {
    create_node(task, path, FileType::Directory, mode, 0, true).map(|_| ())
}
