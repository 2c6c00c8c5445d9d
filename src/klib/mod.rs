//! Kernel Library (KLib).
//!
//! Utilitários internos. Hoje só o framework de testes de host.

#[cfg(test)]
pub mod test_framework;
