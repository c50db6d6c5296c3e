//! Yahoo Finance API client for historical stock data.
//!
//! Provides daily OHLCV bars and the latest quote for stocks and ETFs
//! through the unofficial chart API. Requests block the calling thread
//! and are bounded by the client timeout.

use super::MarketDataSource;
use crate::error::{AppError, Result};
use crate::types::{Bar, Quote};
use chrono::DateTime;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    #[allow(dead_code)]
    symbol: String,
    regular_market_price: Option<f64>,
    regular_market_volume: Option<f64>,
    /// Exchange offset from UTC in seconds.
    #[serde(rename = "gmtoffset")]
    gmt_offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Bars plus the chart meta fields the quote fallback needs.
struct ParsedChart {
    bars: Vec<Bar>,
    market_price: Option<f64>,
    market_volume: Option<f64>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

fn parse_chart(data: YahooChartResponse) -> Result<ParsedChart> {
    // Check for API error
    if let Some(error) = data.chart.error {
        return Err(AppError::ExternalApi(format!(
            "Yahoo API error: {} - {}",
            error.code, error.description
        )));
    }

    let result = data
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| AppError::ExternalApi("No results in response".into()))?;

    let market_price = result.meta.regular_market_price;
    let market_volume = result.meta.regular_market_volume;
    let offset = result.meta.gmt_offset.unwrap_or(0);

    // A symbol with no trading history comes back without timestamps.
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next();

    let (opens, highs, lows, closes, volumes) = match quote {
        Some(q) => (
            q.open.unwrap_or_default(),
            q.high.unwrap_or_default(),
            q.low.unwrap_or_default(),
            q.close.unwrap_or_default(),
            q.volume.unwrap_or_default(),
        ),
        None => Default::default(),
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let close = closes.get(i).and_then(|v| *v).unwrap_or(0.0);

        // Skip invalid data points
        if close <= 0.0 {
            continue;
        }

        let Some(date) = DateTime::from_timestamp(timestamp + offset, 0).map(|dt| dt.date_naive())
        else {
            continue;
        };

        bars.push(Bar {
            date,
            open: opens.get(i).and_then(|v| *v).unwrap_or(close),
            high: highs.get(i).and_then(|v| *v).unwrap_or(close),
            low: lows.get(i).and_then(|v| *v).unwrap_or(close),
            close,
            volume: volumes.get(i).and_then(|v| *v).unwrap_or(0) as f64,
        });
    }

    Ok(ParsedChart {
        bars,
        market_price,
        market_volume,
    })
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;

        Ok(Self { client })
    }

    /// Fetch daily chart data for a symbol.
    ///
    /// Arguments:
    /// - symbol: Stock/ETF symbol (e.g., "AAPL", "SPY")
    /// - range: Time range ("1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max")
    fn get_chart(&self, symbol: &str, range: &str) -> Result<ParsedChart> {
        let yahoo_symbol = normalize_yahoo_symbol(symbol);
        let url = format!(
            "{}/{}?range={}&interval=1d&includePrePost=false",
            CHART_URL, yahoo_symbol, range
        );

        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Yahoo API error for {}: {}",
                yahoo_symbol,
                response.status()
            )));
        }

        let data: YahooChartResponse = response.json()?;
        parse_chart(data)
    }
}

impl MarketDataSource for YahooFinanceClient {
    fn fetch_history(&self, symbol: &str, period: &str) -> Result<Vec<Bar>> {
        let chart = self.get_chart(symbol, period)?;
        debug!("Fetched {} bars for {} ({})", chart.bars.len(), symbol, period);
        Ok(chart.bars)
    }

    fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote> {
        let chart = self.get_chart(symbol, "1d")?;

        if let Some(bar) = chart.bars.last() {
            return Ok(Quote {
                price: bar.close,
                volume: bar.volume,
            });
        }

        match (chart.market_price, chart.market_volume) {
            (Some(price), volume) => {
                warn!("No intraday bar for {}, using chart meta price", symbol);
                Ok(Quote {
                    price,
                    volume: volume.unwrap_or(0.0),
                })
            }
            _ => Err(AppError::QuoteUnavailable(format!("no quote for {}", symbol))),
        }
    }
}
