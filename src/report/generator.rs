//! Markdown and JSON dashboard reports.
//!
//! This module renders a [`DashboardState`] as a Markdown document or as
//! pretty-printed JSON.

use crate::dashboard::DashboardState;
use crate::models::{
    ActivityEntry, ActivityFeed, BorrowedBookView, CategorySummary, DashboardSnapshot,
    SummaryStats,
};
use anyhow::Result;
use serde::Serialize;

/// Context shown in the report header.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    /// Backend the data came from.
    pub base_url: String,
    /// Logged-in user, when known.
    pub username: Option<String>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(state: &DashboardState, context: &ReportContext) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Library Dashboard\n\n");

    output.push_str(&generate_header_section(state, context));

    if let Some(ref error) = state.error {
        output.push_str(&generate_error_section(error));
        output.push_str(&generate_footer());
        return output;
    }

    output.push_str(&generate_stats_section(&state.snapshot.stats));
    output.push_str(&generate_categories_section(&state.snapshot.categories));
    output.push_str(&generate_activity_section(&state.snapshot.activity));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the header with greeting and load metadata.
fn generate_header_section(state: &DashboardState, context: &ReportContext) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "Welcome back, {}! Here's what's happening in your library.\n\n",
        context.username.as_deref().unwrap_or("User")
    ));

    section.push_str(&format!("- **Backend:** {}\n", context.base_url));
    if let Some(generated_at) = state.snapshot.generated_at {
        section.push_str(&format!(
            "- **Generated:** {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
    }
    if !state.failed_sources.is_empty() {
        section.push_str(&format!(
            "- **Unavailable sources:** {} (shown as empty)\n",
            state.failed_sources.join(", ")
        ));
    }
    section.push('\n');

    section
}

fn generate_error_section(error: &str) -> String {
    let mut section = String::new();

    section.push_str("## ⚠️ Error Loading Dashboard\n\n");
    section.push_str(error);
    section.push_str("\n\nRun shelfdash again to retry.\n\n");

    section
}

/// Generate the headline counts table.
fn generate_stats_section(stats: &SummaryStats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Total Books | Total Users | Books Borrowed | Overdue Books |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        stats.total_books, stats.total_users, stats.books_borrowed, stats.overdue_books
    ));

    section
}

/// Generate the category distribution table.
fn generate_categories_section(categories: &[CategorySummary]) -> String {
    let mut section = String::new();

    section.push_str("## Books by Category\n\n");

    if categories.is_empty() {
        section.push_str("No category data available.\n\n");
        return section;
    }

    section.push_str("| Category | Books | Share | Color |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for category in categories {
        section.push_str(&format!(
            "| {} | {} | {}% | `{}` |\n",
            category.label,
            category.count,
            category.percentage,
            category.color().hex()
        ));
    }
    section.push('\n');

    section
}

/// Generate the activity panel.
fn generate_activity_section(activity: &ActivityFeed) -> String {
    match activity {
        ActivityFeed::Recent(entries) => generate_recent_section(entries),
        ActivityFeed::Borrowed(rows) => generate_borrowed_section(rows),
    }
}

fn generate_recent_section(entries: &[ActivityEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Recent Activity\n\n");

    if entries.is_empty() {
        section.push_str("No recent activity found.\n\n");
        return section;
    }

    for entry in entries {
        section.push_str(&format!(
            "- {} **{}** - {}: \"{}\" *({})*\n",
            entry.kind.icon(),
            entry.user,
            entry.action,
            entry.book,
            entry.time
        ));
    }
    section.push('\n');

    section
}

fn generate_borrowed_section(rows: &[BorrowedBookView]) -> String {
    let mut section = String::new();

    section.push_str("## Currently Borrowed\n\n");

    if rows.is_empty() {
        section.push_str("No books are currently borrowed.\n\n");
        return section;
    }

    section.push_str("| Book | Borrower | Email | Phone | Student ID | Due | Status |\n");
    section.push_str("|:---|:---|:---|:---|:---|:---:|:---|\n");
    for row in rows {
        let due = row
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            row.book_title,
            row.user_name,
            row.email,
            row.phone,
            row.student_id,
            due,
            borrowed_status(row)
        ));
    }
    section.push('\n');

    section
}

/// Human-readable due status of a borrowed book.
fn borrowed_status(row: &BorrowedBookView) -> String {
    match row.days_until_due {
        None => "No due date".to_string(),
        Some(0) if row.is_overdue => "⚠️ Overdue today".to_string(),
        Some(days) if row.is_overdue => format!("⚠️ {} days overdue", -days),
        Some(0) => "Due today".to_string(),
        Some(1) => "Due tomorrow".to_string(),
        Some(days) => format!("Due in {} days", days),
    }
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by shelfdash*\n");

    footer
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    base_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    loading: bool,
    error: Option<&'a str>,
    failed_sources: &'a [&'static str],
    #[serde(flatten)]
    snapshot: &'a DashboardSnapshot,
}

/// Generate a JSON report.
pub fn generate_json_report(state: &DashboardState, context: &ReportContext) -> Result<String> {
    let report = JsonReport {
        base_url: &context.base_url,
        username: context.username.as_deref(),
        loading: state.loading,
        error: state.error.as_deref(),
        failed_sources: &state.failed_sources,
        snapshot: &state.snapshot,
    };

    serde_json::to_string_pretty(&report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::LOAD_ERROR_MESSAGE;
    use crate::models::{ActivityKind, ActivityMode};
    use chrono::NaiveDate;

    fn create_test_state() -> DashboardState {
        DashboardState {
            loading: false,
            error: None,
            snapshot: DashboardSnapshot {
                generated_at: NaiveDate::from_ymd_opt(2024, 3, 25)
                    .and_then(|d| d.and_hms_opt(12, 0, 0)),
                categories: vec![
                    CategorySummary {
                        key: "fiction".to_string(),
                        label: "Fiction".to_string(),
                        count: 3,
                        percentage: "75.0".to_string(),
                    },
                    CategorySummary {
                        key: "other".to_string(),
                        label: "Other".to_string(),
                        count: 1,
                        percentage: "25.0".to_string(),
                    },
                ],
                stats: SummaryStats {
                    total_books: 4,
                    total_users: 2,
                    books_borrowed: 1,
                    overdue_books: 1,
                },
                activity: ActivityFeed::Recent(vec![ActivityEntry {
                    id: Some(13),
                    kind: ActivityKind::Overdue,
                    action: "Book overdue".to_string(),
                    book: "Akira, Vol. 1".to_string(),
                    user: "Avery Lee".to_string(),
                    time: "6 days overdue".to_string(),
                }]),
            },
            failed_sources: vec!["users"],
        }
    }

    fn context() -> ReportContext {
        ReportContext {
            base_url: "http://localhost:8080".to_string(),
            username: Some("admin".to_string()),
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_state(), &context());

        assert!(markdown.contains("# Library Dashboard"));
        assert!(markdown.contains("Welcome back, admin!"));
        assert!(markdown.contains("| 4 | 2 | 1 | 1 |"));
        assert!(markdown.contains("| Fiction | 3 | 75.0% | `#FF6B6B` |"));
        assert!(markdown.contains("| Other | 1 | 25.0% | `#FFA07A` |"));
        assert!(markdown.contains("**Avery Lee** - Book overdue: \"Akira, Vol. 1\""));
        assert!(markdown.contains("Unavailable sources:** users"));
    }

    #[test]
    fn test_markdown_error_state() {
        let mut state = create_test_state();
        state.error = Some(LOAD_ERROR_MESSAGE.to_string());
        state.snapshot = DashboardSnapshot::empty(ActivityMode::Recent);

        let markdown = generate_markdown_report(&state, &ReportContext::default());

        assert!(markdown.contains("Error Loading Dashboard"));
        assert!(markdown.contains(LOAD_ERROR_MESSAGE));
        assert!(!markdown.contains("## Summary"));
        assert!(markdown.contains("Welcome back, User!"));
    }

    #[test]
    fn test_borrowed_section() {
        let rows = vec![
            BorrowedBookView {
                id: Some(1),
                book_title: "Sapiens".to_string(),
                user_name: "Unknown User".to_string(),
                email: "N/A".to_string(),
                phone: "N/A".to_string(),
                student_id: "N/A".to_string(),
                due_date: NaiveDate::from_ymd_opt(2024, 3, 19)
                    .and_then(|d| d.and_hms_opt(14, 0, 0)),
                days_until_due: Some(-5),
                is_overdue: true,
            },
            BorrowedBookView {
                id: None,
                book_title: "1984".to_string(),
                user_name: "Admin User".to_string(),
                email: "admin@library.com".to_string(),
                phone: "555-0100".to_string(),
                student_id: "ADM-001".to_string(),
                due_date: None,
                days_until_due: None,
                is_overdue: false,
            },
        ];

        let section = generate_borrowed_section(&rows);

        assert!(section.contains("## Currently Borrowed"));
        assert!(section.contains("| Sapiens | Unknown User | N/A | N/A | N/A | 2024-03-19 | ⚠️ 5 days overdue |"));
        assert!(section.contains("No due date"));
    }

    #[test]
    fn test_borrowed_status_due_earlier_today() {
        let row = BorrowedBookView {
            id: Some(3),
            book_title: "Dune".to_string(),
            user_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            student_id: "S-001".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 25)
                .and_then(|d| d.and_hms_opt(9, 0, 0)),
            days_until_due: Some(0),
            is_overdue: true,
        };

        assert_eq!(borrowed_status(&row), "⚠️ Overdue today");

        let due_later = BorrowedBookView {
            is_overdue: false,
            ..row
        };
        assert_eq!(borrowed_status(&due_later), "Due today");
    }

    #[test]
    fn test_empty_sections() {
        assert!(generate_categories_section(&[]).contains("No category data available"));
        assert!(generate_recent_section(&[]).contains("No recent activity found"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_state(), &context()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["baseUrl"], "http://localhost:8080");
        assert_eq!(value["stats"]["totalBooks"], 4);
        assert_eq!(value["categories"][0]["percentage"], "75.0");
        assert_eq!(value["activity"]["mode"], "recent");
        assert_eq!(value["activity"]["entries"][0]["kind"], "overdue");
        assert_eq!(value["failedSources"][0], "users");
        assert!(value["error"].is_null());
        assert_eq!(value["loading"], false);
    }
}
