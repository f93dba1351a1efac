//! Draft (pick/ban) evaluation and AI decision engine.
//!
//! The library is pure: every operation takes its inputs explicitly and
//! returns new values. Randomness only enters through an injected
//! [`rand::Rng`] when a finished draft is resolved into a winner.

pub mod analysis;
pub mod config;
pub mod display;
pub mod draft;
pub mod error;
pub mod model;

#[cfg(test)]
mod test_support;
