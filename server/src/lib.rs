pub mod args;
pub mod config;
pub mod error;
pub mod manager;
pub mod metrics;
pub mod network;
pub mod storage;
pub mod version;
