// src/domain/mod.rs
pub mod bookmark;
pub mod error;
pub mod favicon;
pub mod plugin;
pub mod repositories;
pub mod services;
