//! Data Transfer Objects for backend communication
//!
//! Request and response bodies of the render backend API. Status responses
//! are normalized into [`crate::domain::job::JobStatus`] here.

pub mod error;
pub mod render;
pub mod script;
