//! Market quote collaborator.
//!
//! Quotes decorate the report while the session is open; a failed fetch
//! degrades to an omitted line, never a failed tick.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::Section;
use crate::error::{Error, Result};

/// Last traded price and day change for one vendor symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
}

/// Port for whatever supplies market quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Latest quote for a vendor symbol.
    async fn quote(&self, symbol: &str) -> Result<Quote>;
}

/// Bearer-token HTTP quote endpoint.
pub struct HttpQuotes {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    data: Vec<QuoteRow>,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    last_price: f64,
    change: f64,
    change_percent: f64,
}

impl HttpQuotes {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl QuoteProvider for HttpQuotes {
    async fn quote(&self, symbol: &str) -> Result<Quote> {
        let response = self
            .http
            .get(format!("{}/quote", self.api_url))
            .bearer_auth(&self.api_key)
            .query(&[("symbols", symbol)])
            .send()
            .await?
            .error_for_status()?;

        let parsed: QuoteResponse = response.json().await?;
        let row = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::Quote(format!("no quote data for {symbol}")))?;

        Ok(Quote {
            price: row.last_price,
            change: row.change,
            change_pct: row.change_percent,
        })
    }
}

/// Format fetched quotes into a report section, omitted when empty.
#[must_use]
pub fn quote_section(quotes: &[(String, Quote)]) -> Option<Section> {
    if quotes.is_empty() {
        return None;
    }
    let lines = quotes
        .iter()
        .map(|(symbol, quote)| {
            let sign = if quote.change >= 0.0 { "+" } else { "-" };
            format!(
                "{}: {:.2} | {}{:.2}%",
                symbol,
                quote.price,
                sign,
                quote.change_pct.abs()
            )
        })
        .collect();
    Some(Section::new("Market Data", lines))
}
