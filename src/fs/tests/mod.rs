//! Testes para o módulo Filesystem
//!
//! Testes de host do protocolo do VFS e dos drivers, sobre o [`Fixture`]
//! do framework de testes (VFS com devfs em /dev e procfs em /proc).
//!
//! # Estrutura dos Testes
//!
//! - `vfs.rs` - open/close/dup, deleção adiada, link, permissões, montagem
//! - `tmpfs.rs` - conteúdo de arquivos, truncamento
//! - `devfs.rs` - nós de dispositivo e hooks de open/close
//! - `procfs.rs` - entradas geradas
//!
//! [`Fixture`]: crate::klib::test_framework::Fixture

#![cfg(test)]

pub mod devfs;
pub mod procfs;
pub mod tmpfs;

use std::sync::Arc;

use crate::fs::vfs::close::close_file;
use crate::fs::vfs::{io, open, File, FileMode, OpenFlags, Vfs};
use crate::sched::Task;
use crate::syscall::error::{SysError, SysResult};

/// Erro esperado de uma operação (o valor de sucesso pode não ser `Debug`).
pub fn err<T>(result: SysResult<T>) -> SysError {
    match result {
        Ok(_) => panic!("esperava erro"),
        Err(e) => e,
    }
}

pub fn open_rw(vfs: &Vfs, task: &Task, path: &str) -> Arc<File> {
    open::open(vfs, task, path, OpenFlags::RDWR, FileMode::empty()).unwrap()
}

/// Cria (ou reabre) `path` leitura/escrita com `data`.
pub fn create_with(vfs: &Vfs, task: &Task, path: &str, data: &[u8]) -> Arc<File> {
    let file = open::open(
        vfs,
        task,
        path,
        OpenFlags::RDWR | OpenFlags::CREATE,
        FileMode::octal(0o644),
    )
    .unwrap();
    assert_eq!(io::write(vfs, &file, data), Ok(data.len()));
    file
}

/// Conteúdo inteiro a partir do início.
pub fn read_all(vfs: &Vfs, file: &File) -> Vec<u8> {
    file.set_pos(0);
    let mut out = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let n = io::read(vfs, file, &mut buf).unwrap();
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&buf[..n]);
    }
}

pub fn close(vfs: &Vfs, file: Arc<File>) {
    close_file(vfs, file);
}
