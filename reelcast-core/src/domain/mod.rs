//! Core domain types
//!
//! These types describe render jobs as the client sees them. Raw backend
//! responses are converted into them at the HTTP boundary, so nothing past
//! the client layer inspects wire shapes.

pub mod job;
pub mod render;
