//! Concurrent fetch of the four dashboard sources.
//!
//! All four requests are polled together and the fetch completes only once
//! every one of them has settled. A failing source never aborts the others.

use crate::api::RecordSource;
use crate::error::ApiError;
use crate::models::{Book, Borrowing, User};
use tracing::{debug, warn};

/// Per-source results of one fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    pub books: Result<Vec<Book>, ApiError>,
    pub users: Result<Vec<User>, ApiError>,
    pub borrowings: Result<Vec<Borrowing>, ApiError>,
    pub overdue: Result<Vec<Borrowing>, ApiError>,
}

/// The four collections with failed sources replaced by empty ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub books: Vec<Book>,
    pub users: Vec<User>,
    pub borrowings: Vec<Borrowing>,
    pub overdue: Vec<Borrowing>,
    /// Names of the sources that failed.
    pub failed_sources: Vec<&'static str>,
    /// Failed sources that answered with an unexpected record shape, with the reason.
    pub malformed: Vec<(&'static str, String)>,
}

impl FetchOutcome {
    /// Number of sources that failed.
    pub fn failure_count(&self) -> usize {
        [
            self.books.is_err(),
            self.users.is_err(),
            self.borrowings.is_err(),
            self.overdue.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }

    /// Replace every failed slot with an empty collection, logging the reason.
    ///
    /// Decode failures are also kept in `malformed` so the derivation step
    /// can refuse to build a snapshot from them.
    pub fn into_collections(self) -> Collections {
        let mut collections = Collections::default();

        collections.books = collections.settle("books", self.books);
        collections.users = collections.settle("users", self.users);
        collections.borrowings = collections.settle("borrowings", self.borrowings);
        collections.overdue = collections.settle("overdue", self.overdue);

        collections
    }
}

impl Collections {
    fn settle<T>(&mut self, source: &'static str, result: Result<Vec<T>, ApiError>) -> Vec<T> {
        match result {
            Ok(records) => records,
            Err(e) => {
                warn!("{} API failed: {}", source, e);
                if e.is_unauthorized() {
                    warn!("Check the token or log in with --username/--password");
                }
                if e.is_malformed() {
                    self.malformed.push((source, e.to_string()));
                }
                self.failed_sources.push(source);
                Vec::new()
            }
        }
    }
}

/// Issue all four reads concurrently and wait for every one to settle.
pub async fn fetch_all<S>(source: &S) -> FetchOutcome
where
    S: RecordSource + ?Sized,
{
    debug!("Fetching books, users, borrowings and overdue borrowings");

    let (books, users, borrowings, overdue) = futures::join!(
        source.get_books(),
        source.get_users(),
        source.get_borrowings(),
        source.get_overdue_borrowings(),
    );

    let outcome = FetchOutcome {
        books,
        users,
        borrowings,
        overdue,
    };

    debug!("Fetch settled with {} failed sources", outcome.failure_count());
    outcome
}
