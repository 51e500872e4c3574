//! quizforge-core — Quiz generation normalizer, scoring engine, and traits.
//!
//! This crate turns untrusted completion text into validated quizzes and
//! turns a quiz plus a candidate's answers into an immutable scored result.
//! Both are pure functions; the generator and store wrap them with the
//! completion provider and persistence the rest of the system uses.

pub mod error;
pub mod generator;
pub mod model;
pub mod normalizer;
pub mod prompt;
pub mod scoring;
pub mod statistics;
pub mod store;
pub mod traits;

pub use error::{GenerationError, ProviderError, QuizError, SchemaViolation, ScoringError};
pub use normalizer::normalize;
pub use scoring::score;
