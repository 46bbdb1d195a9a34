use std::collections::HashMap;
use std::time::Duration;

use acis_obs::{CatalogConfig, CatalogEntry, CatalogLookup, CatalogResponse, CatalogUnavailable, ObsId};

use crate::table::{catalog_entries, sequence_exposures, sequence_numbers, ObsidRow, OcatTable};
use crate::{OcatError, Result};

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Obscat client with bounded retries.
///
/// Requests run on a runtime owned by the client, so [`CatalogLookup::lookup`]
/// blocks the caller. Do not call it from inside another Tokio runtime.
#[derive(Debug)]
pub struct OcatClient {
    base_url: String,
    client: reqwest::Client,
    tries: u32,
    retry_delay: Duration,
    runtime: tokio::runtime::Runtime,
}

impl OcatClient {
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            tries: config.tries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            runtime,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, query: &[(&str, String)]) -> Result<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("format", "text")])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OcatError::ServerError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch one table, retrying failed requests.
    async fn get_table(&self, query: &[(&str, String)]) -> Result<OcatTable> {
        let mut attempt = 1;
        let text = loop {
            match self.get_text(query).await {
                Ok(text) => break text,
                Err(e) if attempt < self.tries => {
                    log::warn!(
                        "Obscat request failed ({e}), attempt {attempt} of {}; retrying in {:?}",
                        self.tries,
                        self.retry_delay
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        };
        OcatTable::parse(&text)
    }

    /// Look up grating, count rate, and sequence exposure (ks) for `obsids`.
    pub async fn fetch(&self, obsids: &[ObsId]) -> Result<HashMap<ObsId, CatalogEntry>> {
        let table = self.get_table(&[("obsid", join(obsids))]).await?;
        let rows = ObsidRow::from_table(&table)?;
        log::debug!("Obscat returned {} of {} obsids", rows.len(), obsids.len());

        let seq_nums = sequence_numbers(&rows);
        let exposures = if seq_nums.is_empty() {
            HashMap::new()
        } else {
            let seq_table = self.get_table(&[("seqNum", join(&seq_nums))]).await?;
            sequence_exposures(&seq_table)?
        };

        Ok(catalog_entries(&rows, &exposures))
    }
}

impl CatalogLookup for OcatClient {
    fn lookup(&self, obsids: &[ObsId]) -> CatalogResponse {
        if obsids.is_empty() {
            return CatalogResponse::Unavailable(CatalogUnavailable::NoObsids);
        }
        match self.runtime.block_on(self.fetch(obsids)) {
            Ok(entries) => CatalogResponse::Available(entries),
            Err(e) => {
                log::warn!("Obscat lookup failed: {e}");
                CatalogResponse::Unavailable(CatalogUnavailable::RequestFailed(e.to_string()))
            }
        }
    }
}
