// src/util/mod.rs
pub mod fixtures;
pub mod testing;
