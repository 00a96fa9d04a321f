//! Layup List course engine: one quality and one difficulty vote per student
//! and course, running aggregate scores, ranked "Best Classes" and "Layups"
//! lists, and per-term grade-median summaries.

pub mod catalog;
pub mod config;
pub mod courses;
pub mod engine;
pub mod error;
pub mod grades;
pub mod medians;
pub mod ranking;
pub mod router;
pub mod store;
pub mod telemetry;
pub mod terms;
pub mod votes;

pub use engine::LayupEngine;
pub use router::layup_router;
