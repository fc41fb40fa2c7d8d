//! HTTP implementation of [`DirectorySource`]
//!
//! The directory is served as static `.shtml` pages containing plain HTML
//! tables. The markup is shallow enough that regex extraction of table
//! cells is reliable; responses are passed through untouched otherwise.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use super::{DirectoryError, DirectorySource};
use crate::config::DirectoryConfig;
use crate::error::{AppError, AppResult};

static TR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").unwrap());
static TD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

pub struct HttpDirectorySource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDirectorySource {
    pub fn new(config: &DirectoryConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            // The directory host serves a self-signed certificate
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_page(&self, name: &str) -> Result<String, DirectoryError> {
        let url = format!("{}/{}.shtml", self.base_url, name);
        tracing::debug!("Fetching directory page: {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Strip markup from a cell body and collapse whitespace
fn cell_text(html: &str) -> String {
    let text = TAG_RE.replace_all(html, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All non-empty table cell texts of a page
fn parse_cells(html: &str) -> Vec<String> {
    TD_RE
        .captures_iter(html)
        .map(|c| cell_text(&c[1]))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Two-column data rows of a page. The first row is always the page
/// header (the live pages render it with plain `<td>` cells) and is
/// skipped unconditionally; rows with any other column count are dropped.
fn parse_rows(html: &str) -> Vec<(String, String)> {
    TR_RE
        .captures_iter(html)
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = TD_RE
                .captures_iter(&row[1])
                .map(|c| cell_text(&c[1]))
                .collect();
            match <[String; 2]>::try_from(cells) {
                Ok([handle, name]) => Some((handle, name)),
                Err(_) => None,
            }
        })
        .collect()
}

#[async_trait]
impl DirectorySource for HttpDirectorySource {
    async fn list_batches(&self, category: &str) -> Result<Vec<String>, DirectoryError> {
        let html = self.fetch_page(category).await?;
        Ok(parse_cells(&html))
    }

    async fn fetch_rows(&self, batch: &str) -> Result<Vec<(String, String)>, DirectoryError> {
        let html = self.fetch_page(batch).await?;
        Ok(parse_rows(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH_INDEX: &str = r#"
        <html><body><table>
          <tr><td> bt2022 </td><td>bt2023</td></tr>
          <tr><td><a href="bt2024.shtml">bt2024</a></td><td></td></tr>
        </table></body></html>
    "#;

    const BATCH_PAGE: &str = r#"
        <table>
          <tr><th>Username</th><th>Name</th></tr>
          <tr><td>mt1230001</td><td>Asha  Verma</td></tr>
          <tr><td>mt1230002</td><td><b>Ravi</b> Kumar Singh</td></tr>
          <tr><td>orphan-cell</td></tr>
          <tr><td>x1</td><td>Three</td><td>Columns</td></tr>
        </table>
    "#;

    #[test]
    fn parse_cells_strips_markup_and_empties() {
        let cells = parse_cells(BATCH_INDEX);
        assert_eq!(cells, vec!["bt2022", "bt2023", "bt2024"]);
    }

    #[test]
    fn parse_rows_keeps_only_two_column_rows() {
        let rows = parse_rows(BATCH_PAGE);
        assert_eq!(
            rows,
            vec![
                ("mt1230001".to_string(), "Asha Verma".to_string()),
                ("mt1230002".to_string(), "Ravi Kumar Singh".to_string()),
            ]
        );
    }

    #[test]
    fn header_row_with_td_cells_is_skipped() {
        let rows = parse_rows(
            r#"
            <table>
              <tr><td>Username</td><td>Name</td></tr>
              <tr><td>mt1230003</td><td>Neha Gupta</td></tr>
            </table>
            "#,
        );
        assert_eq!(rows, vec![("mt1230003".to_string(), "Neha Gupta".to_string())]);
    }

    #[test]
    fn header_only_page_yields_no_rows() {
        let rows = parse_rows("<tr><th>a</th><th>b</th></tr>");
        assert!(rows.is_empty());
    }
}
