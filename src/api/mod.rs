//! Access to the library backend.
//!
//! `RecordSource` is the read-only seam the dashboard depends on;
//! `ApiClient` implements it over the backend's REST API.

pub mod client;

pub use client::{ApiClient, Credentials};

use crate::error::ApiError;
use crate::models::{Book, Borrowing, User};
use async_trait::async_trait;

/// Read-only provider of the records the dashboard is built from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn get_books(&self) -> Result<Vec<Book>, ApiError>;

    async fn get_users(&self) -> Result<Vec<User>, ApiError>;

    async fn get_borrowings(&self) -> Result<Vec<Borrowing>, ApiError>;

    /// Borrowings the backend considers overdue.
    async fn get_overdue_borrowings(&self) -> Result<Vec<Borrowing>, ApiError>;
}
