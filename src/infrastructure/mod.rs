pub mod di;
pub mod http;
pub mod icon_cache;
pub mod json;
pub mod plugins;
pub mod repositories;
