//! Shelve Core Types and Definitions
//!
//! This crate provides the foundational value types shared by the Shelve
//! crates. It includes:
//!
//! - **Entities**: Named classification values substituted into path
//!   patterns ([`entity::Entities`], [`entity::EntityValue`])
//! - **Conflict policies**: What to do when a destination already exists
//!   ([`policy::ConflictPolicy`])

pub mod entity;
pub mod policy;
