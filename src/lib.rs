//! WeddingCard server and client support.
//!
//! Configuration, SQLite repositories and the HTTP API shared by the
//! `weddingcard-server` and `weddingcard` binaries.

pub mod config;
pub mod db;
pub mod server;
