//! Task (visão do VFS)
//!
//! Apenas o estado que o núcleo de filesystem e o caminho de unmap precisam:
//! credenciais, tabela de descritores, raiz/cwd, address space e heap.
//! Contexto de CPU e estado de escalonamento ficam no escalonador.

use alloc::sync::Arc;
use spin::Mutex;

use super::scheduler::TaskId;
use crate::fs::vfs::inode::InodeRef;
use crate::mm::addr::VirtAddr;
use crate::mm::aspace::AddressSpace;
use crate::syscall::handle::table::FileTable;

/// Credenciais da tarefa
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub uid: u32,
    pub gid: u32,
    /// Bits removidos do mode de arquivos criados
    pub umask: u16,
}

impl Credentials {
    pub const ROOT: Self = Self {
        uid: 0,
        gid: 0,
        umask: 0o022,
    };

    pub const fn user(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            umask: 0o022,
        }
    }

    /// uid 0 ignora checagens de permissão
    #[inline]
    pub fn is_privileged(&self) -> bool {
        self.uid == 0
    }
}

/// Raiz e diretório corrente. Cada um segura uma referência (`count`).
pub struct FsContext {
    pub root: InodeRef,
    pub cwd: InodeRef,
}

/// Faixa do heap de usuário: `[start, brk)`
#[derive(Debug, Clone, Copy)]
pub struct HeapRange {
    pub start: VirtAddr,
    pub brk: VirtAddr,
}

pub struct Task {
    pub id: TaskId,
    pub creds: Credentials,
    /// Nunca segurar este lock enquanto bloqueia.
    pub files: Mutex<FileTable>,
    fs: Mutex<FsContext>,
    pub aspace: Arc<AddressSpace>,
    heap: Mutex<HeapRange>,
}

impl Task {
    /// Cria uma tarefa com raiz e cwd em `root`.
    pub fn new(
        id: TaskId,
        creds: Credentials,
        root: &InodeRef,
        aspace: Arc<AddressSpace>,
        heap_start: VirtAddr,
    ) -> Self {
        let heap = HeapRange {
            start: heap_start,
            brk: heap_start,
        };
        Self::with_files(id, creds, FileTable::new(), root, root, aspace, heap)
    }

    /// Monta a tarefa com uma tabela já preenchida (fork).
    pub(crate) fn with_files(
        id: TaskId,
        creds: Credentials,
        files: FileTable,
        root: &InodeRef,
        cwd: &InodeRef,
        aspace: Arc<AddressSpace>,
        heap: HeapRange,
    ) -> Self {
        root.count.inc();
        cwd.count.inc();
        Self {
            id,
            creds,
            files: Mutex::new(files),
            fs: Mutex::new(FsContext {
                root: root.clone(),
                cwd: cwd.clone(),
            }),
            aspace,
            heap: Mutex::new(heap),
        }
    }

    pub fn root(&self) -> InodeRef {
        self.fs.lock().root.clone()
    }

    pub fn cwd(&self) -> InodeRef {
        self.fs.lock().cwd.clone()
    }

    pub fn heap(&self) -> HeapRange {
        *self.heap.lock()
    }

    pub(crate) fn heap_lock(&self) -> spin::MutexGuard<'_, HeapRange> {
        self.heap.lock()
    }
}
