//! Data models for the library dashboard.
//!
//! Records consumed from the backend (`Book`, `User`, `Borrowing`) and the
//! values derived from them (`CategorySummary`, `SummaryStats`, the activity
//! feed and the full `DashboardSnapshot`).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a borrowing whose book title is unknown.
pub const UNKNOWN_BOOK: &str = "Unknown Book";
/// Placeholder for a borrowing whose borrower is unknown.
pub const UNKNOWN_USER: &str = "Unknown User";
/// Placeholder for missing contact details.
pub const NOT_AVAILABLE: &str = "N/A";

/// A book as returned by `GET /books`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    /// Free-text category; compared case and whitespace insensitively.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
    #[serde(default)]
    pub total_copies: Option<u32>,
    #[serde(default)]
    pub available_copies: Option<u32>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl Book {
    /// Returns the category trimmed and lower-cased, or `uncategorized`.
    pub fn normalized_category(&self) -> String {
        normalize_category(self.category.as_deref())
    }
}

/// Normalize a raw category for bucket comparison.
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(category) if !category.is_empty() => category.to_lowercase(),
        _ => "uncategorized".to_string(),
    }
}

/// A library member as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
}

impl User {
    /// Returns "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Lifecycle state of a borrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorrowStatus::Borrowed => write!(f, "BORROWED"),
            BorrowStatus::Returned => write!(f, "RETURNED"),
            BorrowStatus::Overdue => write!(f, "OVERDUE"),
        }
    }
}

/// Nested book reference embedded in a borrowing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookRef {
    #[serde(default)]
    pub title: Option<String>,
}

/// Nested user reference embedded in a borrowing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A borrowing as returned by `GET /borrowings` and `GET /borrowings/overdue`.
///
/// Both the nested shape (`book`, `user`) and the flat DTO shape
/// (`bookTitle`, `username`) are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrowing {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub book: Option<BookRef>,
    #[serde(default)]
    pub user: Option<UserRef>,
    #[serde(default)]
    pub book_title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub status: Option<BorrowStatus>,
    #[serde(default, with = "timestamp")]
    pub borrow_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub return_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl Borrowing {
    /// Returned iff status is RETURNED or a return date is recorded.
    pub fn is_returned(&self) -> bool {
        self.status == Some(BorrowStatus::Returned) || self.return_date.is_some()
    }

    /// Active iff status is BORROWED or no return date is recorded.
    pub fn is_active(&self) -> bool {
        self.status == Some(BorrowStatus::Borrowed) || self.return_date.is_none()
    }

    /// Borrow date, falling back to the creation timestamp.
    pub fn activity_date(&self) -> Option<NaiveDateTime> {
        self.borrow_date.or(self.created_at)
    }

    /// Title of the borrowed book, or a placeholder.
    pub fn book_title(&self) -> String {
        self.book
            .as_ref()
            .and_then(|b| b.title.clone())
            .or_else(|| self.book_title.clone())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_BOOK.to_string())
    }

    /// Display name of the borrower, or a placeholder.
    pub fn borrower_name(&self) -> String {
        if let Some(ref user) = self.user {
            let name = format!(
                "{} {}",
                user.first_name.as_deref().unwrap_or_default(),
                user.last_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();
            if !name.is_empty() {
                return name;
            }
        }

        self.username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }
}

/// Response body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// One bucket of the category distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// Normalized bucket key (`other` for the catch-all bucket).
    pub key: String,
    /// Capitalized label for display.
    pub label: String,
    pub count: usize,
    /// One-decimal percentage text, or "0" when there are no books.
    pub percentage: String,
}

impl CategorySummary {
    /// Display color for this bucket.
    pub fn color(&self) -> CategoryColor {
        CategoryColor::from(self.key.as_str())
    }
}

/// Headline counts of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_books: usize,
    pub total_users: usize,
    pub books_borrowed: usize,
    pub overdue_books: usize,
}

/// Classification of a borrowing in the recent-activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Borrow,
    Return,
    Overdue,
}

impl ActivityKind {
    /// Human-readable action text.
    pub fn action(&self) -> &'static str {
        match self {
            ActivityKind::Borrow => "Book borrowed",
            ActivityKind::Return => "Book returned",
            ActivityKind::Overdue => "Book overdue",
        }
    }

    /// Display color as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            ActivityKind::Borrow => "#3B82F6",
            ActivityKind::Return => "#10B981",
            ActivityKind::Overdue => "#EF4444",
        }
    }

    /// Returns an emoji representation of the activity.
    pub fn icon(&self) -> &'static str {
        match self {
            ActivityKind::Borrow => "📖",
            ActivityKind::Return => "📈",
            ActivityKind::Overdue => "⚠️",
        }
    }
}

/// Display color of a category bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryColor {
    Fiction,
    NonFiction,
    Manga,
    Other,
    /// Any configured category without a dedicated color
    Fallback,
}

impl CategoryColor {
    /// Display color as a hex string.
    pub fn hex(&self) -> &'static str {
        match self {
            CategoryColor::Fiction => "#FF6B6B",
            CategoryColor::NonFiction => "#4ECDC4",
            CategoryColor::Manga => "#45B7D1",
            CategoryColor::Other => "#FFA07A",
            CategoryColor::Fallback => "#96CEB4",
        }
    }
}

impl From<&str> for CategoryColor {
    fn from(key: &str) -> Self {
        match key.trim().to_lowercase().as_str() {
            "fiction" => CategoryColor::Fiction,
            "non-fiction" => CategoryColor::NonFiction,
            "manga" => CategoryColor::Manga,
            "other" => CategoryColor::Other,
            _ => CategoryColor::Fallback,
        }
    }
}

/// One line of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Borrowing id, when the backend sent one.
    pub id: Option<i64>,
    pub kind: ActivityKind,
    pub action: String,
    pub book: String,
    pub user: String,
    /// Status line, e.g. "Due on 1/10/2024" or "3 days overdue".
    pub time: String,
}

/// One row of the currently-borrowed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowedBookView {
    pub id: Option<i64>,
    pub book_title: String,
    pub user_name: String,
    pub email: String,
    pub phone: String,
    pub student_id: String,
    #[serde(with = "timestamp")]
    pub due_date: Option<NaiveDateTime>,
    /// Whole days until due, rounded up; negative when overdue.
    pub days_until_due: Option<i64>,
    pub is_overdue: bool,
}

/// Which projection the activity panel shows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ActivityMode {
    /// Most recent borrow/return events
    #[default]
    Recent,
    /// Books currently out, soonest due first
    Borrowed,
}

impl fmt::Display for ActivityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityMode::Recent => write!(f, "recent"),
            ActivityMode::Borrowed => write!(f, "borrowed"),
        }
    }
}

/// The activity panel content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "entries", rename_all = "lowercase")]
pub enum ActivityFeed {
    Recent(Vec<ActivityEntry>),
    Borrowed(Vec<BorrowedBookView>),
}

impl ActivityFeed {
    /// An empty feed for the given mode.
    pub fn empty(mode: ActivityMode) -> Self {
        match mode {
            ActivityMode::Recent => ActivityFeed::Recent(Vec::new()),
            ActivityMode::Borrowed => ActivityFeed::Borrowed(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ActivityFeed::Recent(entries) => entries.len(),
            ActivityFeed::Borrowed(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the dashboard shows, derived from one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(with = "timestamp")]
    pub generated_at: Option<NaiveDateTime>,
    pub categories: Vec<CategorySummary>,
    pub stats: SummaryStats,
    pub activity: ActivityFeed,
}

impl DashboardSnapshot {
    /// The all-zero snapshot shown before a load or after a failed one.
    pub fn empty(mode: ActivityMode) -> Self {
        Self {
            generated_at: None,
            categories: Vec::new(),
            stats: SummaryStats::default(),
            activity: ActivityFeed::empty(mode),
        }
    }
}

/// Lenient (de)serialization of optional backend timestamps.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]`, the same with a
/// space separator, and RFC 3339. Values are kept as naive local times;
/// RFC 3339 values are converted to the system time zone first.
pub mod timestamp {
    use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    /// Parse a timestamp in any of the accepted forms.
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).naive_local());
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt);
            }
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(WIRE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some(" Fiction ")), "fiction");
        assert_eq!(normalize_category(Some("MANGA")), "manga");
        assert_eq!(normalize_category(Some("   ")), "uncategorized");
        assert_eq!(normalize_category(None), "uncategorized");
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(timestamp::parse("2024-01-05"), Some(date(2024, 1, 5)));
        assert_eq!(
            timestamp::parse("2024-01-05T10:30:00"),
            date(2024, 1, 5).checked_add_signed(chrono::Duration::minutes(630))
        );
        assert!(timestamp::parse("2024-01-05T10:30:00.123456").is_some());
        assert!(timestamp::parse("2024-01-05T10:30:00Z").is_some());
        assert_eq!(timestamp::parse("not a date"), None);
    }

    #[test]
    fn test_rfc3339_converted_to_system_local_time() {
        let raw = "2024-01-05T10:30:00+09:00";
        let expected = chrono::DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&chrono::Local)
            .naive_local();
        assert_eq!(timestamp::parse(raw), Some(expected));

        let utc = timestamp::parse("2024-01-05T01:30:00Z").unwrap();
        assert_eq!(timestamp::parse(raw), Some(utc));
    }

    #[test]
    fn test_borrowing_nested_shape() {
        let json = r#"{
            "id": 7,
            "status": "BORROWED",
            "book": {"title": "Dune"},
            "user": {"firstName": "Ada", "lastName": "Lovelace"},
            "borrowDate": "2024-01-02",
            "dueDate": "2024-01-16T00:00:00",
            "returnDate": null
        }"#;
        let borrowing: Borrowing = serde_json::from_str(json).unwrap();

        assert_eq!(borrowing.status, Some(BorrowStatus::Borrowed));
        assert_eq!(borrowing.book_title(), "Dune");
        assert_eq!(borrowing.borrower_name(), "Ada Lovelace");
        assert!(borrowing.is_active());
        assert!(!borrowing.is_returned());
    }

    #[test]
    fn test_borrowing_flat_dto_shape() {
        let json = r#"{
            "id": 3,
            "userId": 1,
            "username": "jdoe",
            "bookId": 9,
            "bookTitle": "Akira",
            "status": "RETURNED",
            "borrowDate": "2024-01-01T09:00:00",
            "dueDate": "2024-01-15T09:00:00",
            "returnDate": "2024-01-05T12:00:00"
        }"#;
        let borrowing: Borrowing = serde_json::from_str(json).unwrap();

        assert_eq!(borrowing.book_title(), "Akira");
        assert_eq!(borrowing.borrower_name(), "jdoe");
        assert!(borrowing.is_returned());
        assert!(!borrowing.is_active());
    }

    #[test]
    fn test_borrowing_placeholders() {
        let borrowing = Borrowing::default();
        assert_eq!(borrowing.book_title(), UNKNOWN_BOOK);
        assert_eq!(borrowing.borrower_name(), UNKNOWN_USER);
    }

    #[test]
    fn test_activity_date_falls_back_to_created_at() {
        let borrowing = Borrowing {
            created_at: Some(date(2024, 3, 1)),
            ..Default::default()
        };
        assert_eq!(borrowing.activity_date(), Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_category_color_fallback() {
        assert_eq!(CategoryColor::from("Fiction"), CategoryColor::Fiction);
        assert_eq!(CategoryColor::from("non-fiction"), CategoryColor::NonFiction);
        assert_eq!(CategoryColor::from("poetry"), CategoryColor::Fallback);
        assert_eq!(CategoryColor::Fallback.hex(), "#96CEB4");
    }

    #[test]
    fn test_activity_kind_attributes() {
        assert_eq!(ActivityKind::Overdue.color(), "#EF4444");
        assert_eq!(ActivityKind::Return.action(), "Book returned");
        assert_eq!(ActivityKind::Borrow.icon(), "📖");
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = DashboardSnapshot::empty(ActivityMode::Borrowed);
        assert_eq!(snapshot.stats, SummaryStats::default());
        assert!(snapshot.categories.is_empty());
        assert_eq!(snapshot.activity, ActivityFeed::Borrowed(Vec::new()));
    }
}
