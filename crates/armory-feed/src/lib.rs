// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use armory_app::Record;
use reqwest::blocking::Client as HttpClient;
use std::time::Duration;
use time::OffsetDateTime;
use url::Url;

/// Positional column count the feed must supply per row: manufacturer,
/// model, caliber, serial number, image reference, archived flag,
/// disposition note.
pub const FEED_COLUMNS: usize = 7;

/// Built-in dataset for `--demo` runs; never touches the network.
pub const DEMO_FEED: &str = "\
Manufacturer,Model,Caliber,Serial Number,Image,Archived,Notes
Glock,19 Gen5,9mm Luger,BXwy443,https://img.example/glock19.jpg,false,
Smith & Wesson,M&P 9 Shield,9mm Luger,HNX1234,,false,
Ruger,10/22,.22 LR,0012-34567,https://img.example/ruger1022.jpg,false,
Colt,1911 Government,.45 ACP,70G12345,https://img.example/colt1911.jpg,true,Traded toward the Shield
Sig Sauer,P365,9mm Luger,66B001122,,false,
Remington,870 Wingmaster,12 Gauge,RS44721X,,true,Sold to a friend in 2019
Henry,Golden Boy,.22 LR,GB077210,https://img.example/henry.jpg,false,
";

/// Result of parsing one raw feed document. Rows that fail the structural
/// check are dropped and counted, never failing the batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedFeed {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// One fetched-and-parsed batch, stamped with the fetch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedBatch {
    pub records: Vec<Record>,
    pub skipped: usize,
    pub fetched_at: OffsetDateTime,
}

/// Pure parse of the raw feed text. The first line is a header and is
/// discarded without column-name validation; blank lines are skipped;
/// comma is a hard separator with no quoting or escaping support.
pub fn parse_feed(text: &str) -> ParsedFeed {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let _header = lines.next();

    let mut parsed = ParsedFeed::default();
    for line in lines {
        match parse_row(line) {
            Some(record) => parsed.records.push(record),
            None => parsed.skipped += 1,
        }
    }
    parsed
}

fn parse_row(line: &str) -> Option<Record> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < FEED_COLUMNS {
        return None;
    }

    // The four identity fields must all be present.
    if fields[..4].iter().any(|field| field.is_empty()) {
        return None;
    }

    Some(Record {
        manufacturer: fields[0].to_owned(),
        model: fields[1].to_owned(),
        caliber: fields[2].to_owned(),
        serial_number: fields[3].to_owned(),
        image_url: optional_field(fields[4]),
        archived: fields[5].eq_ignore_ascii_case("true"),
        disposition: optional_field(fields[6]),
    })
}

fn optional_field(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Blocking HTTP client for the remote feed. One GET per `load`, no
/// caching, no retry.
#[derive(Debug, Clone)]
pub struct FeedClient {
    url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl FeedClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            bail!("feed.url must not be empty");
        }
        let url: Url = trimmed
            .parse()
            .with_context(|| format!("invalid feed URL {trimmed:?}"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            bail!(
                "feed URL {url} must use http or https, got scheme {:?}",
                url.scheme()
            );
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { url, timeout, http })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// One blocking GET for the raw feed text. Connection failures and
    /// non-success statuses are errors; the degrade-to-empty policy
    /// belongs to the caller.
    pub fn fetch_text(&self) -> Result<String> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .map_err(|error| connection_error(&self.url, error))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "feed {} returned {} -- check that the published CSV link is still valid",
                self.url,
                status.as_u16()
            );
        }

        response.text().context("read feed body")
    }

    pub fn load(&self) -> Result<FeedBatch> {
        let text = self.fetch_text()?;
        let parsed = parse_feed(&text);
        Ok(FeedBatch {
            records: parsed.records,
            skipped: parsed.skipped,
            fetched_at: OffsetDateTime::now_utc(),
        })
    }
}

fn connection_error(url: &Url, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach feed {} -- check the network and the feed URL ({})",
        url,
        error
    )
}
