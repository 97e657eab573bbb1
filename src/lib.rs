//! Laptop Price ML - признаки для предсказания цены ноутбуков

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod inspection;
pub mod pipeline;
pub mod preprocessing;
pub mod query;
pub mod types;

pub use types::*;
pub use preprocessing::*;

// Re-export для удобства
pub use config::PipelineConfig;
pub use error::{ParseError, PipelineError};
pub use pipeline::{FeaturePipeline, PipelineOutput};
pub use query::LaptopQuery;
