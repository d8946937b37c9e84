//! Pet Triage - Conversational veterinary intake and triage
//!
//! Each owner message is classified into a handling category and urgency
//! level, facts about the pet are merged into a patient card, and a reply
//! is generated under the behavior script for that category.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use app::IntakeApp;
