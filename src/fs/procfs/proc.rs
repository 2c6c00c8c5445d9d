//! ProcFS implementation

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;

use crate::fs::vfs::inode::{
    DirEntry, FileMode, FileType, FsError, FsResult, Inode, InodeAttrs, InodeNum, InodeOps,
    InodeRef, Stat,
};
use crate::fs::vfs::mount::MountTable;

/// Entradas da raiz: (nome, número do inode)
const ENTRIES: [(&str, InodeNum); 2] = [("version", 2), ("mounts", 3)];

const ROOT_INO: InodeNum = 1;

pub struct ProcFs {
    sb_idx: usize,
    mounts: Weak<MountTable>,
}

impl ProcFs {
    pub fn new_root(sb_idx: usize, mounts: Weak<MountTable>) -> InodeRef {
        let fs = Arc::new(Self { sb_idx, mounts });
        Inode::new(
            ROOT_INO,
            "/",
            FileType::Directory,
            InodeAttrs::root_owned(FileMode::octal(0o555)),
            sb_idx,
            fs,
        )
    }

    /// Conteúdo gerado de uma entrada
    fn content(&self, name: &str) -> FsResult<String> {
        match name {
            "version" => Ok(String::from(concat!(
                "forge-vfs ",
                env!("CARGO_PKG_VERSION"),
                "\n"
            ))),
            "mounts" => Ok(self
                .mounts
                .upgrade()
                .map(|table| table.describe())
                .unwrap_or_default()),
            _ => Err(FsError::NotFound),
        }
    }
}

impl InodeOps for ProcFs {
    fn name(&self) -> &'static str {
        "procfs"
    }

    fn lookup(&self, dir: &InodeRef, name: &str) -> FsResult<InodeRef> {
        if dir.num != ROOT_INO {
            return Err(FsError::NotFound);
        }
        let (name, ino) = ENTRIES
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or(FsError::NotFound)?;

        Ok(Inode::new(
            *ino,
            name,
            FileType::Regular,
            InodeAttrs::root_owned(FileMode::octal(0o444)),
            self.sb_idx,
            dir.ops.clone(),
        ))
    }

    fn readdir(&self, dir: &Inode) -> FsResult<Vec<DirEntry>> {
        if dir.num != ROOT_INO {
            return Ok(Vec::new());
        }
        Ok(ENTRIES
            .iter()
            .map(|(name, ino)| DirEntry {
                name: String::from(*name),
                ino: *ino,
                file_type: FileType::Regular,
            })
            .collect())
    }

    fn read(&self, inode: &Inode, offset: u64, buf: &mut [u8]) -> FsResult<usize> {
        let content = self.content(&inode.name)?;
        let bytes = content.as_bytes();
        let start = offset as usize;
        if start >= bytes.len() {
            return Ok(0);
        }
        let n = buf.len().min(bytes.len() - start);
        buf[..n].copy_from_slice(&bytes[start..start + n]);
        Ok(n)
    }

    fn write(&self, _inode: &Inode, _offset: u64, _buf: &[u8]) -> FsResult<usize> {
        Err(FsError::ReadOnly)
    }

    fn unlink(&self, _dir: &Inode, _name: &str, _inode: &Inode) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    fn rmdir(&self, _dir: &Inode, _name: &str, _inode: &Inode) -> FsResult<()> {
        Err(FsError::ReadOnly)
    }

    fn stat(&self, inode: &Inode) -> FsResult<Stat> {
        // Gerado antes de tomar o lock do inode (mounts toma o lock da lista)
        let len = if inode.is_dir() {
            0
        } else {
            self.content(&inode.name)?.len() as u64
        };
        let data = inode.lock.read();
        Ok(Stat {
            ino: inode.num,
            file_type: inode.kind,
            mode: data.mode,
            uid: data.uid,
            gid: data.gid,
            len,
            nlink: inode.nlink(),
            dev: 0,
            sb_idx: self.sb_idx,
        })
    }
}
