// src/lib.rs

pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod persistence;
pub mod repl;
pub mod server;
