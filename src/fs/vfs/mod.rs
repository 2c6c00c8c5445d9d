//! # Virtual File System
//!
//! Núcleo do ciclo de vida de objetos de filesystem em memória: inodes com
//! contagens explícitas, handles abertos, deleção adiada e montagens.
//!
//! ## 🎯 Propósito e Responsabilidade
//! - **Inodes:** `count` / `f_count` / `nlink` + lock leitor/escritor por inode.
//! - **Protocolo:** open, dup, close, link, unlink, rmdir, mount, unmount.
//! - **Despacho:** drivers implementam [`InodeOps`]; dispositivos, [`DeviceHooks`].
//!
//! ## 🏗️ Ordem de locks
//! tabela de descritores → pipe → inode; pai → filho; lista de montagens →
//! alvo → raiz montada. A tabela de descritores nunca fica presa enquanto
//! uma tarefa bloqueia.
//!
//! ## Contexto
//! [`Vfs`] é o único estado global: raiz, raízes de devfs/procfs, lista de
//! montagens, escalonador e hooks de dispositivo. Criado por [`Vfs::new`] e
//! destruído com `drop`.

pub mod close;
pub mod device;
pub mod file;
pub mod inode;
pub mod io;
pub mod link;
pub mod lookup;
pub mod mount;
pub mod open;
pub mod path;
pub mod perm;

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub use device::{DeviceHooks, NullDevices, DEV_NULL};
pub use file::{File, OpenFlags, SeekWhence};
pub use inode::{
    iput, CountedRef, DirEntry, FileMode, FileType, FsError, FsResult, FsStat, Inode, InodeAttrs,
    InodeFlags, InodeNum, InodeOps, InodeRef, Stat,
};
pub use mount::{MountRecord, MountTable};

use crate::fs::devfs::DevFs;
use crate::fs::procfs::ProcFs;
use crate::fs::tmpfs::TmpFs;
use crate::sched::Scheduler;
use crate::syscall::error::SysResult;

/// Superblocos fixos
pub const ROOT_SB_IDX: usize = 0;
pub const DEVFS_SB_IDX: usize = 1;
pub const PROCFS_SB_IDX: usize = 2;

/// Colaboradores externos do VFS
#[derive(Clone)]
pub struct VfsConfig {
    pub sched: Arc<dyn Scheduler>,
    pub devices: Arc<dyn DeviceHooks>,
}

impl VfsConfig {
    /// Só `/dev/null` como dispositivo.
    pub fn new(sched: Arc<dyn Scheduler>) -> Self {
        Self {
            sched,
            devices: Arc::new(NullDevices),
        }
    }

    pub fn with_devices(mut self, devices: Arc<dyn DeviceHooks>) -> Self {
        self.devices = devices;
        self
    }
}

pub struct Vfs {
    root: InodeRef,
    devfs_root: InodeRef,
    procfs_root: InodeRef,
    mounts: Arc<MountTable>,
    sched: Arc<dyn Scheduler>,
    devices: Arc<dyn DeviceHooks>,
    next_sb: AtomicUsize,
    next_pipe_ino: AtomicU64,
}

impl Vfs {
    /// Raiz tmpfs fixada, devfs em `/dev` e procfs em `/proc`.
    pub fn new(config: VfsConfig) -> SysResult<Self> {
        crate::kinfo!("(VFS) Inicializando...");

        let mounts = Arc::new(MountTable::new());

        let root = TmpFs::new_root(ROOT_SB_IDX);
        root.lock.write().flags.insert(InodeFlags::REQUIRED);
        // Referência permanente da raiz (equivale a um registro de montagem)
        root.count.inc();

        let devfs_root = DevFs::new_root(DEVFS_SB_IDX);
        DevFs::register(
            &devfs_root,
            "null",
            FileType::CharDevice,
            DEV_NULL,
            FileMode::octal(0o666),
        )?;

        let procfs_root = ProcFs::new_root(PROCFS_SB_IDX, Arc::downgrade(&mounts));

        let dir_attrs = InodeAttrs::root_owned(FileMode::octal(0o755));
        for (name, path, fs_root) in [("dev", "/dev", &devfs_root), ("proc", "/proc", &procfs_root)] {
            let (dir, _) = open::create_child(&root, name, FileType::Directory, dir_attrs, false)?;
            mount::attach(&mounts, path, &dir, fs_root)?;
        }

        crate::kinfo!("(VFS) Raiz montada, montagens=", mounts.len());
        Ok(Self {
            root,
            devfs_root,
            procfs_root,
            mounts,
            sched: config.sched,
            devices: config.devices,
            next_sb: AtomicUsize::new(PROCFS_SB_IDX + 1),
            next_pipe_ino: AtomicU64::new(1),
        })
    }

    #[inline]
    pub fn root(&self) -> &InodeRef {
        &self.root
    }

    #[inline]
    pub fn devfs_root(&self) -> &InodeRef {
        &self.devfs_root
    }

    #[inline]
    pub fn procfs_root(&self) -> &InodeRef {
        &self.procfs_root
    }

    #[inline]
    pub fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    #[inline]
    pub fn sched(&self) -> &dyn Scheduler {
        &*self.sched
    }

    #[inline]
    pub fn devices(&self) -> &dyn DeviceHooks {
        &*self.devices
    }

    /// Índice de superbloco para um filesystem novo
    pub fn alloc_sb_idx(&self) -> usize {
        self.next_sb.fetch_add(1, Ordering::Relaxed)
    }

    /// Número de inode para um pipe anônimo
    pub fn alloc_pipe_ino(&self) -> InodeNum {
        self.next_pipe_ino.fetch_add(1, Ordering::Relaxed)
    }

    /// Raiz permanente de devfs ou procfs (desligada no unmount, nunca liberada)
    pub fn is_pseudo_root(&self, inode: &InodeRef) -> bool {
        Arc::ptr_eq(inode, &self.devfs_root) || Arc::ptr_eq(inode, &self.procfs_root)
    }

    /// Flush de todos os filesystems montados e da raiz.
    pub fn sync(&self) -> SysResult<()> {
        self.root.ops.fs_sync()?;
        let roots: alloc::vec::Vec<InodeRef> =
            self.mounts.lock().iter().map(|r| r.root.clone()).collect();
        for root in roots {
            root.ops.fs_sync()?;
        }
        crate::ktrace!("(VFS) sync concluído");
        Ok(())
    }
}
