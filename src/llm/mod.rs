// src/llm/mod.rs
// Generation service boundary.

pub mod client;

pub use client::{Generate, GenerationClient, GenerationError, Message};
