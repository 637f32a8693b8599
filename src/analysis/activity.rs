//! Activity feed and currently-borrowed projections.
//!
//! Both projections take the current time as an argument so that a
//! snapshot is fully determined by its inputs.

use crate::models::{
    ActivityEntry, ActivityKind, Borrowing, BorrowedBookView, User, NOT_AVAILABLE, UNKNOWN_USER,
};
use chrono::{Datelike, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Default number of entries in the recent-activity feed.
pub const DEFAULT_RECENT_LIMIT: usize = 6;

/// Default number of rows in the currently-borrowed view.
pub const DEFAULT_BORROWED_LIMIT: usize = 8;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Whole days from `from` to `to`, rounded up.
pub fn ceil_days(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let millis = to.signed_duration_since(from).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

/// Short numeric date, e.g. `1/10/2024`.
pub fn short_date(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(dt) => format!("{}/{}/{}", dt.month(), dt.day(), dt.year()),
        None => "unknown date".to_string(),
    }
}

/// Classify a borrowing relative to `now`.
pub fn classify(borrowing: &Borrowing, now: NaiveDateTime) -> ActivityKind {
    if borrowing.is_returned() {
        ActivityKind::Return
    } else if borrowing.due_date.is_some_and(|due| due < now) {
        ActivityKind::Overdue
    } else {
        ActivityKind::Borrow
    }
}

/// Status line shown next to an activity entry.
pub fn status_line(borrowing: &Borrowing, kind: ActivityKind, now: NaiveDateTime) -> String {
    match kind {
        ActivityKind::Return => format!("Returned on {}", short_date(borrowing.return_date)),
        ActivityKind::Overdue => {
            let days = borrowing
                .due_date
                .map(|due| ceil_days(due, now))
                .unwrap_or(0);
            format!("{} days overdue", days)
        }
        ActivityKind::Borrow => format!("Due on {}", short_date(borrowing.due_date)),
    }
}

/// Orders `Some` values before `None`, comparing present values with `cmp`.
fn missing_last<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering
where
    F: FnOnce(T, T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The `limit` most recent borrowings, newest first, classified.
pub fn recent_activity(
    borrowings: &[Borrowing],
    now: NaiveDateTime,
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut sorted: Vec<&Borrowing> = borrowings.iter().collect();
    // Stable: equal dates keep collection order.
    sorted.sort_by(|a, b| missing_last(a.activity_date(), b.activity_date(), |a, b| b.cmp(&a)));
    sorted.truncate(limit);

    sorted
        .into_iter()
        .map(|borrowing| {
            let kind = classify(borrowing, now);
            ActivityEntry {
                id: borrowing.id,
                kind,
                action: kind.action().to_string(),
                book: borrowing.book_title(),
                user: borrowing.borrower_name(),
                time: status_line(borrowing, kind, now),
            }
        })
        .collect()
}

/// The `limit` active borrowings due soonest, joined with their borrower.
pub fn currently_borrowed(
    borrowings: &[Borrowing],
    users: &[User],
    now: NaiveDateTime,
    limit: usize,
) -> Vec<BorrowedBookView> {
    let users_by_id: HashMap<i64, &User> = users.iter().map(|u| (u.id, u)).collect();

    let mut active: Vec<&Borrowing> = borrowings.iter().filter(|b| b.is_active()).collect();
    active.sort_by(|a, b| missing_last(a.due_date, b.due_date, |a, b| a.cmp(&b)));
    active.truncate(limit);

    active
        .into_iter()
        .map(|borrowing| {
            let user = borrowing.user_id.and_then(|id| users_by_id.get(&id).copied());
            let contact = |field: Option<&Option<String>>| {
                field
                    .and_then(|value| value.clone())
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };

            BorrowedBookView {
                id: borrowing.id,
                book_title: borrowing.book_title(),
                user_name: user
                    .map(|u| u.full_name())
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                email: contact(user.map(|u| &u.email)),
                phone: contact(user.map(|u| &u.phone)),
                student_id: contact(user.map(|u| &u.student_id)),
                due_date: borrowing.due_date,
                days_until_due: borrowing.due_date.map(|due| ceil_days(now, due)),
                is_overdue: borrowing.due_date.is_some_and(|due| due < now),
            }
        })
        .collect()
}
