/*!
 * Database module for persistent storage shared across runs.
 *
 * This module provides SQLite-based persistence for:
 * - The shared tier of the translation cache (content-addressed, TTL-bound)
 * - The translation dictionary consulted before the provider
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
