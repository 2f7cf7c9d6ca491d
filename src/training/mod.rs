//! Training infrastructure: the self-play loop with periodic decay, games
//! between policies, and metrics collection.

pub mod episode;
pub mod metrics;
pub mod trainer;
