// src/llm/gemini/mod.rs
// Google Gemini generateContent client

mod client;
pub mod types;

pub use client::{GeminiClient, GeminiModel, DEFAULT_BASE_URL};
