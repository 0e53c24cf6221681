//! # SocialFeed CLI
//!
//! Fills a SocialFeed database with fake users, posts, comments and follows
//! for local development, and wipes them again.
//!
//! ```ignore
//! use socialfeed_cli::seeder::{SeedConfig, seed_all};
//!
//! let summary = seed_all(&pool, SeedConfig::new(50)).await?;
//! ```

pub mod seeder;
