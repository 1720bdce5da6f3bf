// src/api/http/mod.rs

mod router;
mod turn;

pub use router::build_router;
pub use turn::{health_handler, reset_handler, turn_handler};
