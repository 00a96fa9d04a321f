//! Vote casting, the unvote/replace state machine, and per-course score aggregation.

pub mod aggregator;
pub mod domain;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregator::ScoreAggregator;
pub use domain::{
    CastOutcome, CourseScore, UserVotes, VoteCategory, VoteKey, VotePolicy, VoteRecord,
    VoteTransition,
};
pub use service::{MissingEntity, RetryPolicy, VoteError, VoteService};
