//! Close
//!
//! Ordem no último close de um handle:
//! 1. endpoint do pipe (sob o lock do pipe; último endpoint de pipe anônimo
//!    libera o buffer, senão acorda as duas filas);
//! 2. `f_count -= 1` sob o lock do inode; último close de dispositivo
//!    notifica o driver;
//! 3. `f_count == 0` com deleção adiada → remoção física, senão `iput`.

use alloc::sync::Arc;

use super::file::File;
use super::inode::{iput, InodeFlags, InodeRef};
use super::link::do_unlink;
use super::Vfs;

/// Solta uma entrada de tabela de `file`. Fecha de verdade quando era a última.
pub fn close_file(vfs: &Vfs, file: Arc<File>) {
    if !file.count.dec() {
        return;
    }

    let inode = file.inode();
    if inode.is_fifo() {
        if let Some(pipe) = inode.pipe() {
            if pipe.close_endpoint(vfs.sched(), file.readable(), file.writable()) {
                inode.lock.write().pipe = None;
            }
        }
    }

    release_on_close(vfs, inode);
}

/// `f_count -= 1` e libera a referência `count` do handle.
pub fn release_on_close(vfs: &Vfs, inode: &InodeRef) {
    let (last, marked) = {
        let data = inode.lock.write();
        let last = inode.f_count.dec();
        if last && inode.is_device() {
            crate::ktrace!("(VFS) Último close do dispositivo dev=", inode.dev);
            vfs.devices().on_close(inode.dev);
        }
        (last, data.flags.contains(InodeFlags::MARKED_FOR_DELETION))
    };

    if last && marked {
        do_unlink(inode);
    } else {
        iput(inode);
    }
}
