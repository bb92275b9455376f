//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **media**: uploaded images on the local filesystem
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod media;
pub mod persistence;
