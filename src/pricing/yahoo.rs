use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, NaiveDate};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info};

use super::{BenchmarkFeed, ClosePrice};
use crate::error::TrackerError;

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Meta {
    /// Exchange offset from UTC in seconds; bars are stamped at the local open
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Daily closes from the Yahoo Finance chart API
#[derive(Debug, Clone)]
pub struct YahooFeed {
    client: Client,
    base_url: String,
}

impl YahooFeed {
    pub fn new() -> Result<Self> {
        Self::with_base_url("https://query1.finance.yahoo.com")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; NetworthBot/1.0)")
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Chart endpoint for one symbol; the symbol is a single escaped path
    /// segment, so `^`, `=`, `/` and spaces cannot change the route
    fn chart_url(&self, ticker: &str, period1: i64, period2: i64) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid Yahoo base URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Yahoo base URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }
}

impl BenchmarkFeed for YahooFeed {
    async fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ClosePrice>> {
        info!("Fetching {} closes from {} to {}", ticker, start, end);

        let from_timestamp = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Invalid from date"))?
            .and_utc()
            .timestamp();
        let to_timestamp = end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| anyhow!("Invalid to date"))?
            .and_utc()
            .timestamp();

        let url = self.chart_url(ticker, from_timestamp, to_timestamp)?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request to Yahoo Finance")?;

        if !response.status().is_success() {
            return Err(TrackerError::PricingError(format!(
                "Yahoo Finance returned error status {} for {}",
                response.status(),
                ticker
            ))
            .into());
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .context("Failed to parse Yahoo Finance response")?;

        let closes = parse_chart(data)?;
        debug!("Fetched {} closes for {}", closes.len(), ticker);
        Ok(closes)
    }
}

/// Extract daily closes, dropping bars without a close (halted or partial days)
fn parse_chart(data: YahooChartResponse) -> Result<Vec<ClosePrice>> {
    if let Some(error) = data.chart.error {
        return Err(TrackerError::PricingError(format!(
            "Yahoo Finance API error: {} - {}",
            error.code, error.description
        ))
        .into());
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("No data returned from Yahoo Finance"))?;

    // An empty range comes back without timestamps
    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();
    let offset = Duration::seconds(result.meta.gmtoffset);

    let mut prices = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let Some(close) = closes.get(i).copied().flatten() else {
            continue;
        };
        let date = (DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| anyhow!("Invalid timestamp {}", timestamp))?
            + offset)
            .date_naive();
        prices.push(ClosePrice { date, close });
    }

    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);
    Ok(prices)
}
