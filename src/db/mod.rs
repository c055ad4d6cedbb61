pub mod connection;
pub mod file;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod store;
