pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod notify;
pub mod storage;
pub mod task_api;
