//! Primitivas de espera do escalonador.

pub mod waitqueue;
