//! RAM disk implementation

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use spin::Mutex;

use crate::fs::vfs::inode::{
    FileMode, FileType, FsError, FsResult, FsStat, Inode, InodeAttrs, InodeNum, InodeOps, InodeRef,
};

/// Número do inode raiz
const ROOT_INO: InodeNum = 1;

/// Tamanho máximo de um arquivo (1 GiB)
pub const MAX_FILE_SIZE: usize = 1 << 30;

pub struct TmpFs {
    sb_idx: usize,
    next_ino: AtomicU64,
    /// Conteúdo dos arquivos regulares
    data: Mutex<BTreeMap<InodeNum, Vec<u8>>>,
}

impl TmpFs {
    /// Filesystem novo e vazio. Devolve a raiz.
    pub fn new_root(sb_idx: usize) -> InodeRef {
        let fs = Arc::new(Self {
            sb_idx,
            next_ino: AtomicU64::new(ROOT_INO + 1),
            data: Mutex::new(BTreeMap::new()),
        });
        crate::kdebug!("(TmpFS) Novo filesystem, sb=", sb_idx);
        Inode::new(
            ROOT_INO,
            "/",
            FileType::Directory,
            InodeAttrs::root_owned(FileMode::octal(0o755)),
            sb_idx,
            fs,
        )
    }

    /// Bytes guardados para arquivos regulares
    pub fn used_bytes(&self) -> usize {
        self.data.lock().values().map(Vec::len).sum()
    }
}

impl InodeOps for TmpFs {
    fn name(&self) -> &'static str {
        "tmpfs"
    }

    fn read(&self, inode: &Inode, offset: u64, buf: &mut [u8]) -> FsResult<usize> {
        // Limite lógico: `len` pode ser menor que o buffer antes do sync
        let meta = inode.lock.read();
        let data = self.data.lock();
        let Some(content) = data.get(&inode.num) else {
            return Ok(0);
        };

        let end = (meta.len as usize).min(content.len());
        let start = offset as usize;
        if start >= end {
            return Ok(0);
        }
        let n = buf.len().min(end - start);
        buf[..n].copy_from_slice(&content[start..start + n]);
        Ok(n)
    }

    fn write(&self, inode: &Inode, offset: u64, buf: &[u8]) -> FsResult<usize> {
        let start = usize::try_from(offset).map_err(|_| FsError::NoSpace)?;
        let end = start.checked_add(buf.len()).ok_or(FsError::NoSpace)?;
        if end > MAX_FILE_SIZE {
            crate::kwarn!("(TmpFS) Escrita além do tamanho máximo, ino=", inode.num);
            return Err(FsError::NoSpace);
        }

        // Ordem: lock do inode → lock do driver. `len` e conteúdo mudam juntos.
        let mut meta = inode.lock.write();
        let mut data = self.data.lock();
        let content = data.entry(inode.num).or_default();
        // Bytes além de `len` são restos de um truncamento ainda não sincronizado
        content.truncate(meta.len as usize);
        if content.len() < end {
            content
                .try_reserve(end - content.len())
                .map_err(|_| FsError::NoSpace)?;
            content.resize(end, 0);
        }
        content[start..end].copy_from_slice(buf);
        meta.len = meta.len.max(end as u64);
        Ok(buf.len())
    }

    fn create(
        &self,
        dir: &InodeRef,
        name: &str,
        kind: FileType,
        attrs: InodeAttrs,
    ) -> FsResult<InodeRef> {
        match kind {
            FileType::Regular | FileType::Directory | FileType::Fifo => {}
            // Nós de dispositivo vivem no devfs
            FileType::CharDevice | FileType::BlockDevice => return Err(FsError::NotSupported),
        }

        let ino = self.next_ino.fetch_add(1, Ordering::Relaxed);
        if kind == FileType::Regular {
            self.data.lock().insert(ino, Vec::new());
        }
        // `dir` pertence a este filesystem: mesmas operações
        Ok(Inode::new(ino, name, kind, attrs, self.sb_idx, dir.ops.clone()))
    }

    fn unlink(&self, _dir: &Inode, _name: &str, inode: &Inode) -> FsResult<()> {
        // Último link: o conteúdo some
        if inode.nlink() <= 1 {
            self.data.lock().remove(&inode.num);
        }
        Ok(())
    }

    fn sync_inode(&self, inode: &Inode) -> FsResult<()> {
        let meta = inode.lock.read();
        if let Some(content) = self.data.lock().get_mut(&inode.num) {
            content.truncate(meta.len as usize);
        }
        Ok(())
    }

    fn unmount(&self, _root: &Inode) -> FsResult<()> {
        self.data.lock().clear();
        crate::kdebug!("(TmpFS) Desmontado, sb=", self.sb_idx);
        Ok(())
    }

    fn statfs(&self, _root: &Inode) -> FsResult<FsStat> {
        Ok(FsStat {
            fs_name: self.name(),
            sb_idx: self.sb_idx,
            files: self.data.lock().len() as u64,
        })
    }
}
