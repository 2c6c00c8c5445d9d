//! # File Table
//!
//! Tabela de descritores per-task: `MAX_FILES` slots esparsos, cada um
//! apontando para um `File` compartilhado. Inserção pega o menor slot livre
//! a partir de um índice; remoções deixam buracos.
//!
//! A tabela só mexe em slots e no `count` do `File` (entradas que apontam
//! para ele). Fechar de verdade é com `fs::vfs::close::close_file`, fora
//! do lock da tabela.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::fs::vfs::file::File;

/// Descritor de arquivo (índice na tabela)
pub type Fd = usize;

/// Slots por tabela
pub const MAX_FILES: usize = 64;

pub struct FileTable {
    slots: Vec<Option<Arc<File>>>,
}

impl FileTable {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_FILES);
        slots.resize_with(MAX_FILES, || None);
        Self { slots }
    }

    /// Instala `file` no menor slot livre `>= start`.
    ///
    /// Cheia: devolve o handle para o chamador fechar.
    pub fn insert_from(&mut self, start: Fd, file: Arc<File>) -> Result<Fd, Arc<File>> {
        let Some(fd) = (start..MAX_FILES).find(|&i| self.slots[i].is_none()) else {
            return Err(file);
        };
        self.slots[fd] = Some(file);
        Ok(fd)
    }

    /// Instala no menor slot livre.
    pub fn insert(&mut self, file: Arc<File>) -> Result<Fd, Arc<File>> {
        self.insert_from(0, file)
    }

    pub fn get(&self, fd: Fd) -> Option<Arc<File>> {
        self.slots.get(fd).and_then(|slot| slot.clone())
    }

    pub fn is_open(&self, fd: Fd) -> bool {
        matches!(self.slots.get(fd), Some(Some(_)))
    }

    /// Esvazia o slot e devolve o handle (a entrada ainda conta em `count`).
    pub fn remove(&mut self, fd: Fd) -> Option<Arc<File>> {
        self.slots.get_mut(fd).and_then(Option::take)
    }

    /// Coloca `file` em `fd` e devolve o handle que ocupava o slot.
    pub fn replace(&mut self, fd: Fd, file: Arc<File>) -> Option<Arc<File>> {
        self.slots.get_mut(fd).and_then(|slot| slot.replace(file))
    }

    /// Cópia para fork: mesmos slots, mesmos `File`s (`count += 1` em cada).
    pub fn clone_shared(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|file| {
                    file.count.inc();
                    file.clone()
                })
            })
            .collect();
        Self { slots }
    }

    /// Remove todas as entradas (exit). Cada uma ainda conta em `count`.
    pub fn drain(&mut self) -> Vec<Arc<File>> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    /// Descritores abertos
    pub fn open_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for FileTable {
    fn default() -> Self {
        Self::new()
    }
}
