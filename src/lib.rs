pub mod config;
pub mod query_core;
pub mod server;
pub mod sqlite_pragma;
