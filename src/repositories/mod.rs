//! Repository layer for database operations.
//!
//! Repositories encapsulate the queries against SeaORM entities so that the
//! storage and backend layers never build queries inline. Methods are generic
//! over [`sea_orm::ConnectionTrait`] and work with a plain connection or inside
//! a transaction.

pub mod task;

pub use task::TaskRepository;
