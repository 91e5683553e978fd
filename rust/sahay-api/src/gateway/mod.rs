//! Gateway functionality - rate limiting and session state.
//!
//! This module provides the shared-state layer behind the HTTP
//! endpoints: per-client and global rate limiters, and the in-memory
//! session store holding conversation and mood history.

pub mod rate_limit;
pub mod sessions;
