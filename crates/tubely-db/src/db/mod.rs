//! Database repositories for the data access layer
//!
//! `videos` holds the repository trait and its PostgreSQL implementation,
//! `memory` an in-process implementation with the same semantics.
//
// Video repositories
pub mod memory;
pub mod videos;
//
// Re-exports
pub use memory::InMemoryVideoRepository;
pub use videos::{PgVideoRepository, VideoRepository};
