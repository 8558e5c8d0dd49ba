pub mod bookmark_store;
pub mod favicon_repository;
