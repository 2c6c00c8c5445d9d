//! DevFS - Device Filesystem
//!
//! Sistema de arquivos para nós de dispositivo (/dev).
//!
//! # Arquitetura
//!
//! O devfs só guarda os nós (tipo + número do dispositivo). O I/O e os
//! eventos de primeiro open / último close passam pelos [`DeviceHooks`]
//! registrados no `Vfs`, implementados pelos drivers reais.
//!
//! A raiz é permanente: `unmount` a desliga de `/dev` sem liberar os nós,
//! e `mount_by_name(.., "devfs")` a religa.
//!
//! [`DeviceHooks`]: crate::fs::vfs::DeviceHooks

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::fs::vfs::inode::{
    FileMode, FileType, FsError, FsResult, Inode, InodeAttrs, InodeNum, InodeOps, InodeRef,
};
use crate::fs::vfs::open::create_child;
use crate::syscall::error::SysResult;

const ROOT_INO: InodeNum = 1;

/// DevFS - Device Filesystem
pub struct DevFs {
    sb_idx: usize,
    next_ino: AtomicU64,
}

impl DevFs {
    pub fn new_root(sb_idx: usize) -> InodeRef {
        let fs = Arc::new(Self {
            sb_idx,
            next_ino: AtomicU64::new(ROOT_INO + 1),
        });
        Inode::new(
            ROOT_INO,
            "/",
            FileType::Directory,
            InodeAttrs::root_owned(FileMode::octal(0o755)),
            sb_idx,
            fs,
        )
    }

    /// Registra o nó `name` na raiz do devfs (boot e drivers).
    pub fn register(
        root: &InodeRef,
        name: &str,
        kind: FileType,
        dev: u32,
        mode: FileMode,
    ) -> SysResult<InodeRef> {
        let attrs = InodeAttrs {
            dev,
            ..InodeAttrs::root_owned(mode)
        };
        let (node, _) = create_child(root, name, kind, attrs, true)?;
        crate::kdebug!("(DevFS) Dispositivo registrado dev=", dev);
        Ok(node)
    }
}

impl InodeOps for DevFs {
    fn name(&self) -> &'static str {
        "devfs"
    }

    fn create(
        &self,
        dir: &InodeRef,
        name: &str,
        kind: FileType,
        attrs: InodeAttrs,
    ) -> FsResult<InodeRef> {
        if kind == FileType::Regular {
            return Err(FsError::NotSupported);
        }
        let ino = self.next_ino.fetch_add(1, Ordering::Relaxed);
        Ok(Inode::new(ino, name, kind, attrs, self.sb_idx, dir.ops.clone()))
    }
}
