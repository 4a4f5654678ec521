// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use armory_app::Inventory;
use armory_feed::{DEMO_FEED, FeedClient, parse_feed};
use std::path::PathBuf;
use time::OffsetDateTime;

use crate::session;

/// Where inventory loads come from. `Unconfigured` carries the reason the
/// feed cannot be fetched so the view can show it instead of a bare empty
/// list.
pub enum FeedSource {
    Client(FeedClient),
    Demo,
    Unconfigured(String),
}

pub struct FeedRuntime {
    source: FeedSource,
    session_path: PathBuf,
}

impl FeedRuntime {
    pub fn new(source: FeedSource, session_path: PathBuf) -> Self {
        Self {
            source,
            session_path,
        }
    }
}

impl armory_tui::AppRuntime for FeedRuntime {
    /// Never fails: a fetch or configuration problem degrades to an empty
    /// inventory carrying the reason, so the session keeps running.
    fn load_inventory(&mut self) -> Result<Inventory> {
        let inventory = match &self.source {
            FeedSource::Demo => {
                let parsed = parse_feed(DEMO_FEED);
                Inventory::loaded(parsed.records, parsed.skipped, OffsetDateTime::now_utc())
            }
            FeedSource::Unconfigured(reason) => {
                Inventory::failed(reason.clone(), OffsetDateTime::now_utc())
            }
            FeedSource::Client(client) => match client.load() {
                Ok(batch) => Inventory::loaded(batch.records, batch.skipped, batch.fetched_at),
                Err(error) => Inventory::failed(format!("{error:#}"), OffsetDateTime::now_utc()),
            },
        };
        Ok(inventory)
    }

    fn sign_in(&mut self, user: &str) -> Result<()> {
        // Demo sessions stay in memory; no file is written.
        if matches!(self.source, FeedSource::Demo) {
            return Ok(());
        }
        session::save(&self.session_path, user)?;
        Ok(())
    }

    fn sign_out(&mut self) -> Result<()> {
        if matches!(self.source, FeedSource::Demo) {
            return Ok(());
        }
        session::clear(&self.session_path)?;
        Ok(())
    }
}
