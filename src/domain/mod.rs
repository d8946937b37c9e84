//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `intake` - Pet profiles, card merging, classification, dialog policy

pub mod foundation;
pub mod intake;
