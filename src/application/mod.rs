// src/application/mod.rs
pub mod aggregator;
pub mod error;
pub mod registry;
pub mod services;

pub use aggregator::Aggregator;
pub use registry::PluginRegistry;
pub use services::bookmark_service_impl::BookmarkServiceImpl;
