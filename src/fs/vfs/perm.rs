//! Checagem de permissão (dono / grupo / outros)

use bitflags::bitflags;

use super::inode::{FileMode, Inode};
use crate::sched::Credentials;

bitflags! {
    /// Acesso pedido
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Access: u32 {
        const READ = 0o4;
        const WRITE = 0o2;
        const EXEC = 0o1;
    }
}

/// `creds` pode acessar `inode` com `want`? uid 0 sempre pode.
pub fn permitted(inode: &Inode, creds: &Credentials, want: Access) -> bool {
    if creds.is_privileged() {
        return true;
    }

    let data = inode.lock.read();
    let bits = data.mode.bits();
    let granted = if creds.uid == data.uid {
        (bits >> 6) & 0o7
    } else if creds.gid == data.gid {
        (bits >> 3) & 0o7
    } else {
        bits & 0o7
    };

    granted & want.bits() == want.bits()
}

/// Diretório sticky: só o dono do alvo (ou root) remove a entrada.
pub fn sticky_allows(dir: &Inode, target: &Inode, creds: &Credentials) -> bool {
    if creds.is_privileged() {
        return true;
    }
    if !dir.mode().contains(FileMode::STICKY) {
        return true;
    }
    target.lock.read().uid == creds.uid
}
