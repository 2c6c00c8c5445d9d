//! Inode - objeto de filesystem em memória
//!
//! Um `Inode` é compartilhado via `Arc` (segurança de memória) e carrega as
//! contagens explícitas do protocolo de ciclo de vida:
//!
//! - `count`: referências donas (handles abertos + lookups em andamento +
//!   registros de montagem). Um link de diretório NÃO conta: o mapa
//!   `children` do pai já segura o `Arc`.
//! - `f_count`: handles abertos distintos. Enquanto `f_count > 0` o inode
//!   não é removido fisicamente (deleção adiada).
//! - `nlink`: links de diretório.
//!
//! Invariante: `count >= f_count >= 0`.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use bitflags::bitflags;
use core::ops::Deref;
use core::sync::atomic::{AtomicU32, Ordering};
use spin::RwLock;

use crate::ipc::Pipe;
use crate::sync::RefCount;

/// Tamanho máximo de um componente de nome
pub const INAME_LEN: usize = 255;

/// Número de inode
pub type InodeNum = u64;

/// Referência compartilhada a um inode
pub type InodeRef = Arc<Inode>;

// =============================================================================
// TIPOS E MODO
// =============================================================================

/// Tipo de arquivo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
}

bitflags! {
    /// Bits de permissão
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileMode: u32 {
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;
        /// Em diretórios: só o dono (ou root) remove entradas
        const STICKY = 0o1000;
        const SETGID = 0o2000;
        const SETUID = 0o4000;
    }
}

impl FileMode {
    /// Modo a partir de octal (bits desconhecidos descartados)
    pub const fn octal(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

bitflags! {
    /// Estado do inode
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InodeFlags: u8 {
        /// Efêmero (endpoint de pipe anônimo): liberado direto, sem unlink do driver
        const DYNAMIC = 1 << 0;
        /// Unlink adiado: remoção física no último close
        const MARKED_FOR_DELETION = 1 << 1;
        /// Raiz fixada: nunca desmontada
        const REQUIRED = 1 << 2;
    }
}

/// Atributos iniciais fornecidos pelo VFS na criação
#[derive(Debug, Clone, Copy)]
pub struct InodeAttrs {
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,
    /// Número do dispositivo (char/block)
    pub dev: u32,
}

impl InodeAttrs {
    pub const fn root_owned(mode: FileMode) -> Self {
        Self {
            mode,
            uid: 0,
            gid: 0,
            dev: 0,
        }
    }
}

// =============================================================================
// ERROS E METADADOS
// =============================================================================

/// Erro de filesystem (drivers e VFS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    NotFound,
    NotDirectory,
    IsDirectory,
    NotEmpty,
    AlreadyExists,
    PermissionDenied,
    IoError,
    ReadOnly,
    NoSpace,
    NotSupported,
    InvalidName,
}

pub type FsResult<T> = Result<T, FsError>;

/// Entrada de diretório
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub ino: InodeNum,
    pub file_type: FileType,
}

/// Metadados (`stat`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub ino: InodeNum,
    pub file_type: FileType,
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,
    pub len: u64,
    pub nlink: u32,
    pub dev: u32,
    pub sb_idx: usize,
}

/// Metadados do filesystem (`statfs`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStat {
    pub fs_name: &'static str,
    pub sb_idx: usize,
    pub files: u64,
}

// =============================================================================
// OPERAÇÕES DE DRIVER
// =============================================================================

/// Operações de inode, uma implementação por filesystem.
///
/// Os métodos default são o comportamento genérico.
///
/// `create`, `lookup`, `link`, `unlink` e `rmdir` rodam com o lock do
/// diretório seguro (e, em `unlink`/`rmdir`, também o do alvo): o driver
/// não pode tomar esses locks. `read`, `write` e `sync_inode` rodam sem
/// lock algum; o driver pode tomar o lock do inode antes do seu.
pub trait InodeOps: Send + Sync {
    /// Nome do filesystem
    fn name(&self) -> &'static str;

    /// Ler dados
    fn read(&self, _inode: &Inode, _offset: u64, _buf: &mut [u8]) -> FsResult<usize> {
        Err(FsError::NotSupported)
    }

    /// Escrever dados. O driver atualiza `len`.
    fn write(&self, _inode: &Inode, _offset: u64, _buf: &[u8]) -> FsResult<usize> {
        Err(FsError::NotSupported)
    }

    /// Cria `name` em `dir`. O VFS insere o resultado no cache de filhos.
    fn create(
        &self,
        _dir: &InodeRef,
        _name: &str,
        _kind: FileType,
        _attrs: InodeAttrs,
    ) -> FsResult<InodeRef> {
        Err(FsError::ReadOnly)
    }

    /// Entrada que não está no cache de filhos
    fn lookup(&self, _dir: &InodeRef, _name: &str) -> FsResult<InodeRef> {
        Err(FsError::NotFound)
    }

    /// Listar diretório (default: filhos em memória)
    fn readdir(&self, dir: &Inode) -> FsResult<Vec<DirEntry>> {
        Ok(dir
            .lock
            .read()
            .children
            .iter()
            .map(|(name, child)| DirEntry {
                name: name.clone(),
                ino: child.num,
                file_type: child.kind,
            })
            .collect())
    }

    fn link(&self, _dir: &Inode, _name: &str, _target: &Inode) -> FsResult<()> {
        Ok(())
    }

    /// Remoção física de `name`. `inode.nlink()` ainda inclui este link.
    fn unlink(&self, _dir: &Inode, _name: &str, _inode: &Inode) -> FsResult<()> {
        Ok(())
    }

    fn rmdir(&self, _dir: &Inode, _name: &str, _inode: &Inode) -> FsResult<()> {
        Ok(())
    }

    /// Persiste os metadados do inode (ex.: truncamento)
    fn sync_inode(&self, _inode: &Inode) -> FsResult<()> {
        Ok(())
    }

    /// O filesystem com raiz `root` está sendo desmontado
    fn unmount(&self, _root: &Inode) -> FsResult<()> {
        Ok(())
    }

    fn stat(&self, inode: &Inode) -> FsResult<Stat> {
        Ok(inode.generic_stat())
    }

    fn statfs(&self, root: &Inode) -> FsResult<FsStat> {
        Ok(FsStat {
            fs_name: self.name(),
            sb_idx: root.sb_idx,
            files: 0,
        })
    }

    /// Flush do filesystem inteiro
    fn fs_sync(&self) -> FsResult<()> {
        Ok(())
    }
}

/// Operações genéricas (inodes sem filesystem, ex.: pipes anônimos)
pub struct GenericOps;

impl InodeOps for GenericOps {
    fn name(&self) -> &'static str {
        "pipefs"
    }
}

// =============================================================================
// INODE
// =============================================================================

/// Estado protegido pelo lock do inode
pub struct InodeData {
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,
    pub len: u64,
    pub flags: InodeFlags,
    /// Back-reference para resolução de ".." (não é posse)
    pub parent: Weak<Inode>,
    /// Entradas linkadas (ordenadas por nome)
    pub children: BTreeMap<String, InodeRef>,
    pub pipe: Option<Arc<Pipe>>,
    /// Raiz montada sobre este diretório
    pub mount: Option<InodeRef>,
    /// Em uma raiz montada: o ponto de montagem
    pub mount_parent: Weak<Inode>,
    /// Nomes a remover quando o último handle fechar
    pub pending_unlinks: Vec<(Weak<Inode>, String)>,
}

pub struct Inode {
    pub num: InodeNum,
    pub name: String,
    pub kind: FileType,
    pub dev: u32,
    pub sb_idx: usize,
    pub ops: Arc<dyn InodeOps>,
    pub count: RefCount,
    pub f_count: RefCount,
    nlink: AtomicU32,
    pub lock: RwLock<InodeData>,
}

impl Inode {
    pub fn new(
        num: InodeNum,
        name: &str,
        kind: FileType,
        attrs: InodeAttrs,
        sb_idx: usize,
        ops: Arc<dyn InodeOps>,
    ) -> InodeRef {
        Arc::new(Self {
            num,
            name: name.to_string(),
            kind,
            dev: attrs.dev,
            sb_idx,
            ops,
            count: RefCount::new(0),
            f_count: RefCount::new(0),
            nlink: AtomicU32::new(1),
            lock: RwLock::new(InodeData {
                mode: attrs.mode,
                uid: attrs.uid,
                gid: attrs.gid,
                len: 0,
                flags: InodeFlags::empty(),
                parent: Weak::new(),
                children: BTreeMap::new(),
                pipe: None,
                mount: None,
                mount_parent: Weak::new(),
                pending_unlinks: Vec::new(),
            }),
        })
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == FileType::Directory
    }

    #[inline]
    pub fn is_fifo(&self) -> bool {
        self.kind == FileType::Fifo
    }

    #[inline]
    pub fn is_device(&self) -> bool {
        matches!(self.kind, FileType::CharDevice | FileType::BlockDevice)
    }

    pub fn nlink(&self) -> u32 {
        self.nlink.load(Ordering::Acquire)
    }

    pub(crate) fn set_nlink(&self, n: u32) {
        self.nlink.store(n, Ordering::Release);
    }

    pub(crate) fn inc_nlink(&self) {
        self.nlink.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn dec_nlink(&self) {
        let _ = self
            .nlink
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    pub fn len(&self) -> u64 {
        self.lock.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_len(&self, len: u64) {
        self.lock.write().len = len;
    }

    pub fn mode(&self) -> FileMode {
        self.lock.read().mode
    }

    pub fn flags(&self) -> InodeFlags {
        self.lock.read().flags
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.flags().contains(InodeFlags::MARKED_FOR_DELETION)
    }

    pub fn pipe(&self) -> Option<Arc<Pipe>> {
        self.lock.read().pipe.clone()
    }

    pub fn parent(&self) -> Option<InodeRef> {
        self.lock.read().parent.upgrade()
    }

    /// Raiz montada sobre este diretório
    pub fn mount(&self) -> Option<InodeRef> {
        self.lock.read().mount.clone()
    }

    /// Ponto de montagem (se este inode é uma raiz montada)
    pub fn mount_parent(&self) -> Option<InodeRef> {
        self.lock.read().mount_parent.upgrade()
    }

    /// Filho em memória
    pub fn child(&self, name: &str) -> Option<InodeRef> {
        self.lock.read().children.get(name).cloned()
    }

    pub fn has_children(&self) -> bool {
        !self.lock.read().children.is_empty()
    }

    fn generic_stat(&self) -> Stat {
        let data = self.lock.read();
        Stat {
            ino: self.num,
            file_type: self.kind,
            mode: data.mode,
            uid: data.uid,
            gid: data.gid,
            len: data.len,
            nlink: self.nlink(),
            dev: self.dev,
            sb_idx: self.sb_idx,
        }
    }
}

// =============================================================================
// REFERÊNCIA CONTADA
// =============================================================================

/// Libera uma referência `count`.
///
/// Ao chegar a zero, um inode dinâmico é destruído (pipe liberado). Inodes
/// linkados continuam vivos pelo cache do diretório.
pub fn iput(inode: &InodeRef) {
    if !inode.count.dec() {
        return;
    }

    let pipe = {
        let mut data = inode.lock.write();
        if !data.flags.contains(InodeFlags::DYNAMIC) {
            return;
        }
        data.pipe.take()
    };

    crate::ktrace!("(VFS) Inode dinâmico destruído ino=", inode.num);
    drop(pipe);
}

/// Um `InodeRef` que segura uma referência `count`, devolvida com `iput`
/// no drop.
pub struct CountedRef(Option<InodeRef>);

impl CountedRef {
    /// Adquire uma referência (`count += 1`).
    pub fn get(inode: &InodeRef) -> Self {
        inode.count.inc();
        Self(Some(inode.clone()))
    }

    /// Transfere a referência para o chamador (ex.: um `File`).
    pub fn into_raw(mut self) -> InodeRef {
        match self.0.take() {
            Some(inode) => inode,
            None => crate::core::panic::fatal("(VFS) CountedRef vazio"),
        }
    }

    /// Devolve a referência agora, mantendo só o `Arc`.
    pub fn release(self) -> InodeRef {
        let inode = self.into_raw();
        iput(&inode);
        inode
    }
}

impl Deref for CountedRef {
    type Target = InodeRef;

    fn deref(&self) -> &InodeRef {
        match &self.0 {
            Some(inode) => inode,
            None => crate::core::panic::fatal("(VFS) CountedRef vazio"),
        }
    }
}

impl Drop for CountedRef {
    fn drop(&mut self) {
        if let Some(inode) = self.0.take() {
            iput(&inode);
        }
    }
}
