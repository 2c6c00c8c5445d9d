//! Open / Duplicate / Pipe
//!
//! Caminho de abertura: resolve ou cria, checa permissão, conta o endpoint
//! de pipe, faz `f_count += 1` sob o lock de escrita do inode e devolve um
//! `File` novo. A instalação na tabela de descritores fica com a syscall.

use alloc::string::String;
use alloc::sync::Arc;

use super::file::{File, OpenFlags};
use super::inode::{
    CountedRef, FileMode, FileType, GenericOps, Inode, InodeAttrs, InodeFlags, InodeRef,
};
use super::lookup::{child_lookup, follow_mount, lookup, lookup_parent};
use super::perm::{permitted, Access};
use super::Vfs;
use crate::ipc::Pipe;
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

/// `sb_idx` dos inodes de pipes anônimos
pub const PIPE_SB_IDX: usize = usize::MAX;

// =============================================================================
// CONTAGEM DE OPEN
// =============================================================================

/// `f_count += 1` sob o lock de escrita. No primeiro open de um
/// dispositivo notifica o driver; se ele recusar, o incremento é desfeito.
pub fn acquire_for_open(vfs: &Vfs, inode: &InodeRef) -> SysResult<()> {
    let _data = inode.lock.write();
    let first = inode.f_count.inc() == 0;

    if first && inode.is_device() {
        crate::ktrace!("(VFS) Primeiro open do dispositivo dev=", inode.dev);
        if let Err(e) = vfs.devices().on_open(inode.dev) {
            let _ = inode.f_count.dec();
            return Err(e.into());
        }
    }
    Ok(())
}

// =============================================================================
// CRIAÇÃO
// =============================================================================

/// Cria `name` em `parent` pelo driver e insere no cache de filhos.
///
/// Se a entrada já existe, devolve-a (`created = false`) ou falha com
/// `AlreadyExists` quando `excl`. Não checa permissão.
pub(crate) fn create_child(
    parent: &InodeRef,
    name: &str,
    kind: FileType,
    attrs: InodeAttrs,
    excl: bool,
) -> SysResult<(InodeRef, bool)> {
    let guard = parent.lock.upgradeable_read();
    if let Some(existing) = guard.children.get(name) {
        if excl {
            return Err(SysError::AlreadyExists);
        }
        return Ok((follow_mount(existing.clone()), false));
    }
    // Diretório removido, esperando o último close
    if guard.flags.contains(InodeFlags::MARKED_FOR_DELETION) {
        return Err(SysError::NotFound);
    }

    let created = match parent.ops.create(parent, name, kind, attrs) {
        Ok(inode) => inode,
        Err(_) => {
            crate::kdebug!("(VFS) create recusado pelo driver, dir=", parent.num);
            return Err(SysError::AccessDenied);
        }
    };

    let mut data = guard.upgrade();
    data.children.insert(String::from(name), created.clone());
    created.lock.write().parent = Arc::downgrade(parent);
    drop(data);

    crate::ktrace!("(VFS) Inode criado ino=", created.num);
    Ok((created, true))
}

/// Resolve `path` criando o último componente se necessário.
///
/// Exige escrita no diretório pai para criar. O mode é mascarado pelo umask.
pub(crate) fn create_node(
    task: &Task,
    path: &str,
    kind: FileType,
    mode: FileMode,
    dev: u32,
    excl: bool,
) -> SysResult<(CountedRef, bool)> {
    let (parent, name) = lookup_parent(task, path)?;

    match child_lookup(&parent, &name) {
        Ok(existing) => {
            if excl {
                return Err(SysError::AlreadyExists);
            }
            return Ok((CountedRef::get(&follow_mount(existing)), false));
        }
        Err(SysError::NotFound) => {}
        Err(e) => return Err(e),
    }

    if !permitted(&parent, &task.creds, Access::WRITE | Access::EXEC) {
        return Err(SysError::AccessDenied);
    }

    let attrs = InodeAttrs {
        mode: FileMode::from_bits_truncate(mode.bits() & !(task.creds.umask as u32)),
        uid: task.creds.uid,
        gid: task.creds.gid,
        dev,
    };
    let (inode, created) = create_child(&parent, &name, kind, attrs, excl)?;
    Ok((CountedRef::get(&inode), created))
}

// =============================================================================
// OPEN
// =============================================================================

/// Abre `path`. Devolve um handle com uma entrada de tabela (`count = 1`).
pub fn open(vfs: &Vfs, task: &Task, path: &str, flags: OpenFlags, mode: FileMode) -> SysResult<Arc<File>> {
    if path.is_empty() {
        return Err(SysError::InvalidArgument);
    }

    let (inode, created) = if flags.contains(OpenFlags::CREATE) {
        create_node(task, path, FileType::Regular, mode, 0, flags.contains(OpenFlags::EXCL))?
    } else {
        (lookup(task, path)?, false)
    };

    if flags.contains(OpenFlags::DIRECTORY) && !inode.is_dir() {
        return Err(SysError::NotADirectory);
    }
    if inode.is_dir() && (flags.can_write() || flags.contains(OpenFlags::TRUNC)) {
        return Err(SysError::IsADirectory);
    }

    if !created {
        let mut want = Access::empty();
        if flags.can_read() {
            want |= Access::READ;
        }
        if flags.can_write() {
            want |= Access::WRITE;
        }
        if !permitted(&inode, &task.creds, want) {
            return Err(SysError::AccessDenied);
        }
    }

    // FIFO nomeado: buffer criado no primeiro open
    let pipe = if inode.is_fifo() {
        let pipe = inode
            .lock
            .write()
            .pipe
            .get_or_insert_with(|| Arc::new(Pipe::new(true)))
            .clone();
        pipe.open_endpoint(flags.can_read(), flags.can_write());
        Some(pipe)
    } else {
        None
    };

    if let Err(e) = acquire_for_open(vfs, &inode) {
        if let Some(pipe) = pipe {
            let _ = pipe.close_endpoint(vfs.sched(), flags.can_read(), flags.can_write());
        }
        return Err(e);
    }

    let file = Arc::new(File::new(inode.into_raw(), flags, 0));

    if flags.contains(OpenFlags::TRUNC) && flags.can_write() && file.inode().kind == FileType::Regular {
        let inode = file.inode();
        inode.set_len(0);
        if let Err(e) = inode.ops.sync_inode(inode) {
            crate::kwarn!("(VFS) Falha ao persistir truncamento ino=", inode.num);
            super::close::close_file(vfs, file);
            return Err(e.into());
        }
    }

    crate::ktrace!("(VFS) open ino=", file.inode().num);
    Ok(file)
}

// =============================================================================
// DUP
// =============================================================================

/// Handle novo e independente sobre o mesmo inode (`count += 1`,
/// `f_count += 1`, endpoint de pipe), com as mesmas flags e posição.
pub fn duplicate(vfs: &Vfs, file: &File) -> SysResult<Arc<File>> {
    let inode = CountedRef::get(file.inode());

    let pipe = inode.pipe();
    if let Some(pipe) = &pipe {
        pipe.open_endpoint(file.readable(), file.writable());
    }

    if let Err(e) = acquire_for_open(vfs, &inode) {
        if let Some(pipe) = pipe {
            let _ = pipe.close_endpoint(vfs.sched(), file.readable(), file.writable());
        }
        return Err(e);
    }

    Ok(Arc::new(File::new(inode.into_raw(), file.flags(), file.pos())))
}

// =============================================================================
// PIPE ANÔNIMO
// =============================================================================

/// Cria um pipe anônimo: inode dinâmico com `count = 2`, `f_count = 2`.
///
/// Devolve `(leitura, escrita)`.
pub fn open_pipe(vfs: &Vfs, task: &Task) -> (Arc<File>, Arc<File>) {
    let attrs = InodeAttrs {
        mode: FileMode::OWNER_READ | FileMode::OWNER_WRITE,
        uid: task.creds.uid,
        gid: task.creds.gid,
        dev: 0,
    };
    let inode: InodeRef = Inode::new(
        vfs.alloc_pipe_ino(),
        "pipe",
        FileType::Fifo,
        attrs,
        PIPE_SB_IDX,
        Arc::new(GenericOps),
    );
    inode.set_nlink(0);
    {
        let mut data = inode.lock.write();
        data.flags.insert(InodeFlags::DYNAMIC);
        data.pipe = Some(Pipe::anonymous());
    }

    for _ in 0..2 {
        inode.count.inc();
        inode.f_count.inc();
    }

    crate::ktrace!("(Pipe) Pipe anônimo criado ino=", inode.num);
    let reader = Arc::new(File::new(inode.clone(), OpenFlags::RDONLY, 0));
    let writer = Arc::new(File::new(inode, OpenFlags::WRONLY, 0));
    (reader, writer)
}
