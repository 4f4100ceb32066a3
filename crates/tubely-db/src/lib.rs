//! Tubely DB Library
//!
//! Video metadata persistence. The upload pipeline only sees the
//! [`VideoRepository`] trait; `PgVideoRepository` backs it with PostgreSQL and
//! `InMemoryVideoRepository` serves local runs and tests.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
