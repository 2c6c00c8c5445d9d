//! Resolução de caminhos
//!
//! Anda do root (ou cwd) da tarefa componente a componente, atravessando
//! pontos de montagem. Só o inode final recebe uma referência `count`
//! (devolvida como `CountedRef`); os intermediários são mantidos vivos pelo
//! `Arc` durante o walk.

use alloc::string::{String, ToString};
use alloc::sync::Arc;

use super::inode::{CountedRef, InodeRef, INAME_LEN};
use super::path::{is_absolute, split_last, PathComponents};
use super::perm::{permitted, Access};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

/// Desce pelos pontos de montagem empilhados em `inode`.
pub(crate) fn follow_mount(mut inode: InodeRef) -> InodeRef {
    while let Some(root) = inode.mount() {
        inode = root;
    }
    inode
}

/// ".." de `dir`, sem sair da raiz da tarefa.
fn parent_of(dir: &InodeRef, root: &InodeRef) -> InodeRef {
    let mut cur = dir.clone();
    loop {
        if Arc::ptr_eq(&cur, root) {
            return cur;
        }
        // Raiz montada: ".." é o pai do ponto de montagem
        match cur.mount_parent() {
            Some(mp) => cur = mp,
            None => return cur.parent().unwrap_or(cur),
        }
    }
}

/// Filho `name` de `dir`: cache em memória ou `lookup` do driver.
///
/// Usa leitura "escalável": a maioria dos lookups acerta o cache sem
/// excluir outros leitores; o insert de uma entrada nova escala para escrita.
pub(crate) fn child_lookup(dir: &InodeRef, name: &str) -> SysResult<InodeRef> {
    if name.len() > INAME_LEN {
        return Err(SysError::InvalidArgument);
    }

    let guard = dir.lock.upgradeable_read();
    if let Some(child) = guard.children.get(name) {
        return Ok(child.clone());
    }

    let found = dir.ops.lookup(dir, name)?;
    let mut data = guard.upgrade();
    let child = data
        .children
        .entry(name.to_string())
        .or_insert_with(|| found.clone())
        .clone();
    child.lock.write().parent = Arc::downgrade(dir);
    Ok(child)
}

/// Walk completo. `follow_last` = atravessar montagem no último componente.
fn walk(task: &Task, path: &str, follow_last: bool) -> SysResult<InodeRef> {
    if path.is_empty() {
        return Err(SysError::InvalidArgument);
    }

    let root = task.root();
    let start = if is_absolute(path) { root.clone() } else { task.cwd() };
    let mut cur = follow_mount(start);

    let mut components = PathComponents::new(path).peekable();
    while let Some(name) = components.next() {
        let last = components.peek().is_none();

        if !cur.is_dir() {
            return Err(SysError::NotADirectory);
        }
        if !permitted(&cur, &task.creds, Access::EXEC) {
            return Err(SysError::AccessDenied);
        }

        if name == ".." {
            cur = parent_of(&cur, &root);
            continue;
        }

        let child = child_lookup(&cur, name)?;
        cur = if last && !follow_last {
            child
        } else {
            follow_mount(child)
        };
    }

    Ok(cur)
}

/// Resolve `path` e adquire uma referência no resultado.
pub fn lookup(task: &Task, path: &str) -> SysResult<CountedRef> {
    walk(task, path, true).map(|inode| CountedRef::get(&inode))
}

/// Como `lookup`, mas não atravessa uma montagem no último componente
/// (alvo de `mount`).
pub fn lookup_mountpoint(task: &Task, path: &str) -> SysResult<CountedRef> {
    walk(task, path, false).map(|inode| CountedRef::get(&inode))
}

/// Resolve o diretório pai de `path` e devolve o último componente.
pub fn lookup_parent(task: &Task, path: &str) -> SysResult<(CountedRef, String)> {
    if path.is_empty() {
        return Err(SysError::InvalidArgument);
    }
    let (dir, name) = split_last(path).ok_or(SysError::InvalidArgument)?;
    if name.len() > INAME_LEN {
        return Err(SysError::InvalidArgument);
    }

    let parent = lookup(task, dir)?;
    if !parent.is_dir() {
        return Err(SysError::NotADirectory);
    }
    Ok((parent, name.to_string()))
}
