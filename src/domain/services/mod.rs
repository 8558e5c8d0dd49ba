pub mod icon_cache;
