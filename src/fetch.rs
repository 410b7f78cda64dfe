use crate::archive;
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

pub struct ReportFetcher {
    client: reqwest::Client,
}

impl ReportFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Download the prize-report archive for one draw month and return the
    /// decoded text of every file inside it.
    pub async fn fetch_month(&self, url_template: &str, month: NaiveDate) -> Result<Vec<String>> {
        let url = report_url(url_template, month);
        println!("🌐 Fetching prize report from: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .with_context(|| format!("Failed to fetch URL: {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP request failed with status: {}",
                response.status()
            ));
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from: {}", url))?;

        let entries = archive::extract(&bytes)
            .with_context(|| format!("Failed to unpack archive from: {}", url))?;
        println!("   ✅ Archive contains {} file(s)", entries.len());

        Ok(entries
            .into_iter()
            .map(|entry| decode_latin1(&entry.data))
            .collect())
    }
}

/// Fill the `{month}`/`{year}` placeholders in the configured URL template.
/// Months are zero-padded to two digits, as the published archives expect.
pub fn report_url(template: &str, month: NaiveDate) -> String {
    template
        .replace("{month}", &format!("{:02}", month.month()))
        .replace("{year}", &month.year().to_string())
}

/// The published reports are ISO-8859-1; every byte maps to the scalar with
/// the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
