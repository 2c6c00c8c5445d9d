//! Hooks de dispositivos de caractere/bloco
//!
//! Os drivers reais (serial, console, disco) são colaboradores externos.
//! O VFS notifica o primeiro open (`f_count` 0 → 1) e o último close
//! (`f_count` 1 → 0) e encaminha I/O pelo número do dispositivo.

use super::inode::{FsError, FsResult};

pub trait DeviceHooks: Send + Sync {
    /// Primeiro handle aberto para `dev`. Erro aborta o open.
    fn on_open(&self, _dev: u32) -> FsResult<()> {
        Ok(())
    }

    /// Último handle de `dev` fechado.
    fn on_close(&self, _dev: u32) {}

    fn read(&self, dev: u32, offset: u64, buf: &mut [u8]) -> FsResult<usize>;

    fn write(&self, dev: u32, offset: u64, buf: &[u8]) -> FsResult<usize>;
}

/// Número do `/dev/null`
pub const DEV_NULL: u32 = 0x0103;

/// Só conhece `/dev/null`: leitura devolve EOF, escrita descarta.
pub struct NullDevices;

impl DeviceHooks for NullDevices {
    fn read(&self, dev: u32, _offset: u64, _buf: &mut [u8]) -> FsResult<usize> {
        match dev {
            DEV_NULL => Ok(0),
            _ => Err(FsError::NotFound),
        }
    }

    fn write(&self, dev: u32, _offset: u64, buf: &[u8]) -> FsResult<usize> {
        match dev {
            DEV_NULL => Ok(buf.len()),
            _ => Err(FsError::NotFound),
        }
    }
}
