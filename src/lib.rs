pub mod api;
pub mod config;
pub mod models;
pub mod shortener;
pub mod storage;
