//! External borrower directory crawling
//!
//! The directory is organized in two levels: each program category page
//! lists batch identifiers, each batch page lists (handle, full name) rows.
//! Transport and scraping detail is hidden behind [`DirectorySource`] so the
//! crawl logic can be exercised against fakes.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{AppError, AppResult};

pub use http::HttpDirectorySource;

/// Failure of a single directory fetch or parse
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Capability interface over the two-level paginated directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Batch identifiers referenced by a program category index page
    async fn list_batches(&self, category: &str) -> Result<Vec<String>, DirectoryError>;

    /// (handle, full name) rows of one batch page; rows with the wrong
    /// column count are already dropped at the parse layer
    async fn fetch_rows(&self, batch: &str) -> Result<Vec<(String, String)>, DirectoryError>;
}

/// One borrower candidate harvested from the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Result of one full crawl pass
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub candidates: Vec<Candidate>,
    pub failed_categories: Vec<String>,
    pub failed_batches: Vec<String>,
}

/// Split a full name into (first name, rest-joined last name)
pub fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or("").to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Run one full crawl over all configured program categories.
///
/// Category and batch failures are logged and skipped; the crawl only fails
/// as a whole when every category fails, in which case nothing usable was
/// retrieved from the directory.
pub async fn crawl(
    source: &dyn DirectorySource,
    categories: &[String],
    email_domain: &str,
) -> AppResult<CrawlOutcome> {
    let mut outcome = CrawlOutcome::default();
    let mut seen = std::collections::HashSet::new();

    for category in categories {
        let batches = match source.list_batches(category).await {
            Ok(batches) => batches,
            Err(e) => {
                tracing::error!("Failed to fetch category {}: {}", category, e);
                outcome.failed_categories.push(category.clone());
                continue;
            }
        };

        if batches.is_empty() {
            tracing::warn!("No batches found for category: {}", category);
            continue;
        }

        for batch in batches {
            let rows = match source.fetch_rows(&batch).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!("Failed to fetch batch {}: {}", batch, e);
                    outcome.failed_batches.push(batch.clone());
                    continue;
                }
            };

            for (username, full_name) in rows {
                let username = username.trim().to_string();
                let full_name = full_name.trim();

                // Malformed rows are skipped; first occurrence of a handle wins
                if username.is_empty() || full_name.is_empty() || seen.contains(&username) {
                    continue;
                }

                let (first_name, last_name) = split_name(full_name);
                let email = format!("{}@{}", username, email_domain);

                seen.insert(username.clone());
                outcome.candidates.push(Candidate {
                    username,
                    first_name,
                    last_name,
                    email,
                });
            }
        }
    }

    if !categories.is_empty() && outcome.failed_categories.len() == categories.len() {
        return Err(AppError::Upstream(
            "Directory unreachable: every category fetch failed".to_string(),
        ));
    }

    tracing::info!(
        "Crawl finished: {} candidates, {} failed categories, {} failed batches",
        outcome.candidates.len(),
        outcome.failed_categories.len(),
        outcome.failed_batches.len()
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn categories(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_name_first_token_then_rest() {
        assert_eq!(
            split_name("Srinivasa Ramanujan Iyengar"),
            ("Srinivasa".to_string(), "Ramanujan Iyengar".to_string())
        );
        assert_eq!(split_name("Madonna"), ("Madonna".to_string(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[tokio::test]
    async fn crawl_skips_malformed_rows_and_dedupes_handles() {
        let mut source = MockDirectorySource::new();
        source
            .expect_list_batches()
            .with(eq("btech"))
            .returning(|_| Ok(vec!["bt2023".to_string(), "bt2024".to_string()]));
        source.expect_fetch_rows().with(eq("bt2023")).returning(|_| {
            Ok(vec![
                ("mt1230001".to_string(), "Asha Verma".to_string()),
                ("".to_string(), "Headerless Row".to_string()),
                ("mt1230002".to_string(), "Ravi Kumar Singh".to_string()),
            ])
        });
        // Same borrower listed again on a second page: first occurrence wins
        source.expect_fetch_rows().with(eq("bt2024")).returning(|_| {
            Ok(vec![("mt1230001".to_string(), "A. Verma".to_string())])
        });

        let outcome = crawl(&source, &categories(&["btech"]), "example.edu")
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.candidates[0].username, "mt1230001");
        assert_eq!(outcome.candidates[0].first_name, "Asha");
        assert_eq!(outcome.candidates[0].last_name, "Verma");
        assert_eq!(outcome.candidates[0].email, "mt1230001@example.edu");
        assert_eq!(outcome.candidates[1].last_name, "Kumar Singh");
        assert!(outcome.failed_categories.is_empty());
    }

    #[tokio::test]
    async fn crawl_tolerates_one_failed_category() {
        let mut source = MockDirectorySource::new();
        source
            .expect_list_batches()
            .with(eq("btech"))
            .returning(|_| Err(DirectoryError::Parse("garbled index".to_string())));
        source
            .expect_list_batches()
            .with(eq("phd"))
            .returning(|_| Ok(vec!["phd2022".to_string()]));
        source.expect_fetch_rows().with(eq("phd2022")).returning(|_| {
            Ok(vec![("ph1220001".to_string(), "Neha Gupta".to_string())])
        });

        let outcome = crawl(&source, &categories(&["btech", "phd"]), "example.edu")
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.failed_categories, vec!["btech".to_string()]);
    }

    #[tokio::test]
    async fn crawl_fails_upstream_when_every_category_fails() {
        let mut source = MockDirectorySource::new();
        source
            .expect_list_batches()
            .returning(|_| Err(DirectoryError::Parse("unreachable".to_string())));

        let err = crawl(&source, &categories(&["btech", "mtech"]), "example.edu")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn crawl_skips_failed_batch_but_keeps_the_rest() {
        let mut source = MockDirectorySource::new();
        source
            .expect_list_batches()
            .with(eq("msc"))
            .returning(|_| Ok(vec!["msc2023".to_string(), "msc2024".to_string()]));
        source
            .expect_fetch_rows()
            .with(eq("msc2023"))
            .returning(|_| Err(DirectoryError::Parse("truncated page".to_string())));
        source.expect_fetch_rows().with(eq("msc2024")).returning(|_| {
            Ok(vec![("msc240001".to_string(), "Irfan Ali".to_string())])
        });

        let outcome = crawl(&source, &categories(&["msc"]), "example.edu")
            .await
            .unwrap();

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.failed_batches, vec!["msc2023".to_string()]);
        assert!(outcome.failed_categories.is_empty());
    }

    #[tokio::test]
    async fn crawl_treats_empty_category_as_skip_not_failure() {
        let mut source = MockDirectorySource::new();
        source
            .expect_list_batches()
            .with(eq("dual"))
            .returning(|_| Ok(vec![]));

        let outcome = crawl(&source, &categories(&["dual"]), "example.edu")
            .await
            .unwrap();

        assert!(outcome.candidates.is_empty());
        assert!(outcome.failed_categories.is_empty());
    }
}
