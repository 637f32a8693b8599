//! # Shelfdash
//!
//! Client-side dashboard for a library management backend.
//!
//! A load fetches books, users, borrowings and overdue borrowings
//! concurrently through a [`api::RecordSource`], tolerates individual
//! source failures, and derives a [`models::DashboardSnapshot`]:
//!
//! - category distribution over a configured set of main categories
//! - headline counts (books, users, active borrowings, overdue)
//! - either a recent-activity feed or the currently-borrowed list
//!
//! ```no_run
//! use shelfdash::api::{ApiClient, Credentials};
//! use shelfdash::dashboard::{Dashboard, DashboardOptions};
//!
//! # async fn example() -> Result<(), shelfdash::error::ApiError> {
//! let client = ApiClient::new("http://localhost:8080", 30, Credentials::bearer("token"))?;
//! let mut dashboard = Dashboard::new(client, DashboardOptions::default());
//! let state = dashboard.load(chrono::Local::now().naive_local()).await;
//! println!("{} books", state.snapshot.stats.total_books);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod report;
