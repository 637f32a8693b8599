//! Category distribution and summary statistics.
//!
//! Pure functions over already-fetched records. Nothing here talks to the
//! backend or keeps state between calls.

use crate::error::AggregateError;
use crate::models::{Book, Borrowing, CategorySummary, SummaryStats, User};
use std::collections::{HashMap, HashSet};

/// Bucket key of the catch-all category.
pub const OTHER_KEY: &str = "other";

/// Default main categories, in display order.
pub fn default_categories() -> Vec<String> {
    vec!["fiction", "non-fiction", "manga"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Normalize and validate the configured main categories.
///
/// The list must be non-empty, free of duplicates after normalization and
/// must not claim the reserved `other` key.
pub fn validate_categories(categories: &[String]) -> Result<Vec<String>, AggregateError> {
    if categories.is_empty() {
        return Err(AggregateError::InvalidCategories(
            "at least one main category is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(categories.len());

    for raw in categories {
        let key = raw.trim().to_lowercase();
        if key.is_empty() {
            return Err(AggregateError::InvalidCategories(
                "category names cannot be blank".to_string(),
            ));
        }
        if key == OTHER_KEY {
            return Err(AggregateError::InvalidCategories(format!(
                "'{}' is reserved for the catch-all bucket",
                OTHER_KEY
            )));
        }
        if !seen.insert(key.clone()) {
            return Err(AggregateError::InvalidCategories(format!(
                "duplicate category '{}'",
                key
            )));
        }
        normalized.push(key);
    }

    Ok(normalized)
}

/// Capitalize the first character, leave the rest as is.
pub fn category_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format a bucket share of the total as one-decimal text.
pub fn percentage_text(count: usize, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.1}", count as f64 / total as f64 * 100.0)
}

/// Compute the category distribution of `books`.
///
/// One entry per configured category in configured order, then `Other`
/// when any book fell outside the configured set. With `hide_empty` the
/// zero-count configured entries are dropped.
pub fn category_distribution(
    books: &[Book],
    categories: &[String],
    hide_empty: bool,
) -> Result<Vec<CategorySummary>, AggregateError> {
    let keys = validate_categories(categories)?;
    let total = books.len();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut other = 0;

    for book in books {
        let category = book.normalized_category();
        match keys.iter().find(|k| **k == category) {
            Some(key) => *counts.entry(key.as_str()).or_default() += 1,
            None => other += 1,
        }
    }

    let mut summaries: Vec<CategorySummary> = keys
        .iter()
        .map(|key| {
            let count = counts.get(key.as_str()).copied().unwrap_or(0);
            CategorySummary {
                key: key.clone(),
                label: category_label(key),
                count,
                percentage: percentage_text(count, total),
            }
        })
        .filter(|summary| !hide_empty || summary.count > 0)
        .collect();

    if other > 0 {
        summaries.push(CategorySummary {
            key: OTHER_KEY.to_string(),
            label: category_label(OTHER_KEY),
            count: other,
            percentage: percentage_text(other, total),
        });
    }

    Ok(summaries)
}

/// Compute the headline counts.
///
/// `overdue` is taken as reported by the backend, not recomputed.
pub fn summary_stats(
    books: &[Book],
    users: &[User],
    borrowings: &[Borrowing],
    overdue: &[Borrowing],
) -> SummaryStats {
    SummaryStats {
        total_books: books.len(),
        total_users: users.len(),
        books_borrowed: borrowings.iter().filter(|b| b.is_active()).count(),
        overdue_books: overdue.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BorrowStatus;

    fn book(id: i64, category: Option<&str>) -> Book {
        Book {
            id,
            title: format!("Book {}", id),
            author: None,
            isbn: None,
            category: category.map(String::from),
            published_year: None,
            total_copies: None,
            available_copies: None,
            created_at: None,
        }
    }

    fn sample_books() -> Vec<Book> {
        vec![
            book(1, Some("Fiction")),
            book(2, Some(" fiction ")),
            book(3, Some("Manga")),
            book(4, Some("History")),
            book(5, None),
            book(6, Some("FICTION")),
            book(7, Some("Poetry")),
        ]
    }

    #[test]
    fn test_counts_sum_to_total() {
        let books = sample_books();
        let summaries = category_distribution(&books, &default_categories(), true).unwrap();

        let sum: usize = summaries.iter().map(|s| s.count).sum();
        assert_eq!(sum, books.len());
    }

    #[test]
    fn test_order_and_other_last() {
        let summaries =
            category_distribution(&sample_books(), &default_categories(), false).unwrap();

        let keys: Vec<&str> = summaries.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["fiction", "non-fiction", "manga", "other"]);
        assert_eq!(summaries[0].count, 3);
        assert_eq!(summaries[1].count, 0);
        assert_eq!(summaries[2].count, 1);
        assert_eq!(summaries[3].count, 3);
        assert_eq!(summaries[3].label, "Other");
    }

    #[test]
    fn test_hide_empty_drops_zero_buckets() {
        let summaries =
            category_distribution(&sample_books(), &default_categories(), true).unwrap();

        assert!(summaries.iter().all(|s| s.count > 0));
        assert!(!summaries.iter().any(|s| s.key == "non-fiction"));
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let summaries =
            category_distribution(&sample_books(), &default_categories(), false).unwrap();

        let sum: f64 = summaries
            .iter()
            .map(|s| s.percentage.parse::<f64>().unwrap())
            .sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum was {}", sum);
        assert_eq!(summaries[0].percentage, "42.9");
    }

    #[test]
    fn test_empty_book_list() {
        let hidden = category_distribution(&[], &default_categories(), true).unwrap();
        assert!(hidden.is_empty());

        let shown = category_distribution(&[], &default_categories(), false).unwrap();
        assert_eq!(shown.len(), 3);
        assert!(shown.iter().all(|s| s.percentage == "0"));
    }

    #[test]
    fn test_label_casing() {
        let summaries =
            category_distribution(&[book(1, Some(" Fiction "))], &default_categories(), true)
                .unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].key, "fiction");
        assert_eq!(summaries[0].label, "Fiction");
        assert_eq!(summaries[0].percentage, "100.0");
        assert_eq!(category_label("non-fiction"), "Non-fiction");
    }

    #[test]
    fn test_invalid_categories() {
        assert!(category_distribution(&[], &[], true).is_err());

        let dupes = vec!["Fiction".to_string(), "fiction ".to_string()];
        assert!(matches!(
            validate_categories(&dupes),
            Err(AggregateError::InvalidCategories(_))
        ));

        let reserved = vec!["Other".to_string()];
        assert!(validate_categories(&reserved).is_err());
    }

    #[test]
    fn test_summary_stats_active_predicate() {
        let borrowings = vec![
            Borrowing {
                status: Some(BorrowStatus::Borrowed),
                ..Default::default()
            },
            Borrowing {
                status: Some(BorrowStatus::Returned),
                return_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 5)
                    .and_then(|d| d.and_hms_opt(0, 0, 0)),
                ..Default::default()
            },
            // No status but never returned still counts as out.
            Borrowing::default(),
        ];
        let overdue = vec![Borrowing::default()];

        let stats = summary_stats(&sample_books(), &[], &borrowings, &overdue);

        assert_eq!(stats.total_books, 7);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.books_borrowed, 2);
        assert_eq!(stats.overdue_books, 1);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let books = sample_books();
        let first = category_distribution(&books, &default_categories(), true).unwrap();
        let second = category_distribution(&books, &default_categories(), true).unwrap();
        assert_eq!(first, second);
    }
}
