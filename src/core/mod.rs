//! Core Module
//!
//! Infraestrutura central do núcleo: logging zero-overhead e a política de
//! halt para violações de consistência.

pub mod logging;
pub mod panic;
