//! # parley-db
//!
//! Database layer implementing the domain repository traits with PostgreSQL
//! via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `parley-core`. It handles:
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives and entity conversions
//! - Repository implementations, including the per-entity serialization the
//!   concurrency model requires (advisory locks, row locks, status-guarded
//!   updates)

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgCallRepository, PgConversationRepository, PgMessageRepository, PgParticipantRepository,
    PgReactionRepository, PgUserRepository, PgVisibilityRepository,
};
