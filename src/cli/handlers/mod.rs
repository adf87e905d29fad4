// src/cli/handlers/mod.rs

// One module per action; `dispatcher` decides which one runs.

pub mod cat;
pub mod commons;
pub mod delete;
pub mod edit;
pub mod export;
pub mod info;
pub mod list;
pub mod modules;
pub mod recompile;
pub mod restore;
pub mod run;
pub mod setup;
pub mod template;
