//! Core Module - Classification Engine
//!
//! Normalizer, the three analyzers, scam detection, aggregation and the
//! classifier entry points. Everything except `service` is synchronous.

pub mod aggregator;
pub mod bands;
pub mod classifier;
pub mod economic;
pub mod normalizer;
pub mod scam_detector;
pub mod service;
pub mod social;
pub mod technical;

pub use aggregator::Aggregator;
pub use classifier::Classifier;
pub use normalizer::{normalize, NormalizedFacts};
pub use scam_detector::ScamDetector;
pub use service::ClassificationService;
