//! # reps-bootstrap
//!
//! Provisions a MongoDB server for the representatives store: a database-scoped
//! read/write user, the `reps` collection, and a unique text index on
//! `reps.address`, all inside `test_db`.
//!
//! The procedure lives in [`bootstrap::run`] and takes its connection as an
//! [`db::AdminSession`], so it can be driven by a real client or a test double.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod o11y;
