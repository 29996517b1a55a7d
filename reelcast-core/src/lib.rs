//! Reelcast Core
//!
//! Core types shared by the Reelcast client and CLI.
//!
//! This crate contains:
//! - Domain types: render jobs, their handles and observed statuses
//! - DTOs: the JSON shapes exchanged with the render backend

pub mod domain;
pub mod dto;
