//! Dashboard load pipeline.
//!
//! A load fetches the four sources concurrently, derives a fresh
//! [`DashboardSnapshot`] from whatever came back and records the outcome in
//! [`DashboardState`]. Failed sources count as empty; a failed derivation
//! resets the snapshot and sets the user-facing error.

pub mod fetcher;

pub use fetcher::{fetch_all, Collections, FetchOutcome};

use crate::analysis::{
    category_distribution, currently_borrowed, default_categories, recent_activity,
    summary_stats, DEFAULT_BORROWED_LIMIT, DEFAULT_RECENT_LIMIT,
};
use crate::api::RecordSource;
use crate::config::DashboardConfig;
use crate::error::AggregateError;
use crate::models::{ActivityFeed, ActivityMode, DashboardSnapshot};
use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

/// Message shown when the dashboard could not be built.
pub const LOAD_ERROR_MESSAGE: &str =
    "Failed to load dashboard data. Please check your connection and try again.";

/// Policy knobs of the derivation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Main categories, in display order.
    pub categories: Vec<String>,
    /// Drop configured categories that have no books.
    pub hide_empty_categories: bool,
    pub mode: ActivityMode,
    pub recent_limit: usize,
    pub borrowed_limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            hide_empty_categories: true,
            mode: ActivityMode::Recent,
            recent_limit: DEFAULT_RECENT_LIMIT,
            borrowed_limit: DEFAULT_BORROWED_LIMIT,
        }
    }
}

impl From<&DashboardConfig> for DashboardOptions {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            categories: config.categories.clone(),
            hide_empty_categories: config.hide_empty_categories,
            mode: config.activity_mode,
            recent_limit: config.recent_limit,
            borrowed_limit: config.borrowed_limit,
        }
    }
}

/// Derive a snapshot from fetched collections.
///
/// Fails when any source answered with records of an unexpected shape or
/// when the configured categories are unusable.
pub fn build_snapshot(
    collections: &Collections,
    options: &DashboardOptions,
    now: NaiveDateTime,
) -> Result<DashboardSnapshot, AggregateError> {
    if let Some((source_name, reason)) = collections.malformed.first() {
        return Err(AggregateError::MalformedRecords {
            source_name: *source_name,
            reason: reason.clone(),
        });
    }

    let categories = category_distribution(
        &collections.books,
        &options.categories,
        options.hide_empty_categories,
    )?;

    let stats = summary_stats(
        &collections.books,
        &collections.users,
        &collections.borrowings,
        &collections.overdue,
    );

    let activity = match options.mode {
        ActivityMode::Recent => ActivityFeed::Recent(recent_activity(
            &collections.borrowings,
            now,
            options.recent_limit,
        )),
        ActivityMode::Borrowed => ActivityFeed::Borrowed(currently_borrowed(
            &collections.borrowings,
            &collections.users,
            now,
            options.borrowed_limit,
        )),
    };

    Ok(DashboardSnapshot {
        generated_at: Some(now),
        categories,
        stats,
        activity,
    })
}

/// What the presentation layer sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    /// Set for the duration of [`Dashboard::load`]. `load` borrows the
    /// dashboard mutably, so callers only ever observe `false`; progress
    /// display belongs to the caller.
    pub loading: bool,
    /// User-facing error of the last load, if it failed.
    pub error: Option<String>,
    pub snapshot: DashboardSnapshot,
    /// Sources that failed during the last load.
    pub failed_sources: Vec<&'static str>,
}

impl DashboardState {
    fn initial(mode: ActivityMode) -> Self {
        Self {
            loading: false,
            error: None,
            snapshot: DashboardSnapshot::empty(mode),
            failed_sources: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A dashboard bound to a record source.
pub struct Dashboard<S> {
    source: S,
    options: DashboardOptions,
    state: DashboardState,
}

impl<S: RecordSource> Dashboard<S> {
    pub fn new(source: S, options: DashboardOptions) -> Self {
        let state = DashboardState::initial(options.mode);
        Self {
            source,
            options,
            state,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn options(&self) -> &DashboardOptions {
        &self.options
    }

    /// Run a full load: fetch all sources, then derive a fresh snapshot.
    pub async fn load(&mut self, now: NaiveDateTime) -> &DashboardState {
        self.state.loading = true;
        self.state.error = None;
        info!("Loading dashboard data");

        let collections = fetch_all(&self.source).await.into_collections();
        if !collections.failed_sources.is_empty() {
            warn!(
                "Continuing with empty data for: {}",
                collections.failed_sources.join(", ")
            );
        }

        match build_snapshot(&collections, &self.options, now) {
            Ok(snapshot) => {
                debug!(
                    "Dashboard loaded: {} books, {} users, {} borrowings, {} categories, {} activity entries",
                    collections.books.len(),
                    collections.users.len(),
                    collections.borrowings.len(),
                    snapshot.categories.len(),
                    snapshot.activity.len()
                );
                self.state.snapshot = snapshot;
            }
            Err(e) => {
                error!("Error building dashboard: {}", e);
                self.state.error = Some(LOAD_ERROR_MESSAGE.to_string());
                self.state.snapshot = DashboardSnapshot::empty(self.options.mode);
            }
        }

        self.state.failed_sources = collections.failed_sources;
        self.state.loading = false;
        &self.state
    }

    /// Discard the previous result and load again from scratch.
    pub async fn reload(&mut self, now: NaiveDateTime) -> &DashboardState {
        info!("Retrying dashboard load");
        self.load(now).await
    }
}
