//! Cross-market prediction-market opportunity detection

pub mod analysis;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod matching;
pub mod models;
pub mod workers;

pub use engine::DetectionEngine;
pub use error::{DetectionError, ValidationError};
