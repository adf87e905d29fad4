// src/core/mod.rs

pub mod assembler;
pub mod builder;
pub mod diagnostics;
pub mod imports;
pub mod paths;
pub mod setup;
pub mod store;
pub mod template;
