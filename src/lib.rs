// src/lib.rs

pub mod api;
pub mod config;
pub mod llm;
pub mod state;
pub mod store;
pub mod workflow;
