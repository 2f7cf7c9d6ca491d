//! # ML Board Games
//!
//! A research harness comparing search and learning strategies on tic-tac-toe
//! and gravity-drop "connect four" boards. Tree search and self-play learners
//! share one reversible game state, and the value approximator is trained with
//! the Burn ML framework.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, player, win detection, reversible state
//! - [`ai`] — Policy traits, minimax/alpha-beta, Q-learning, TD(λ), value network
//! - [`training`] — Self-play loop with decay, games between policies, metrics
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

#![recursion_limit = "256"]

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod training;
