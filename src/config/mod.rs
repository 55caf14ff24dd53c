//! Runtime configuration for the replay tooling.

pub mod replay;
