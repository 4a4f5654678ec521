// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use armory_app::Partition;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_FEED_TIMEOUT: &str = "10s";

pub const APP_NAME: &str = "armory";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub feed: Feed,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            feed: Feed::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feed {
    pub url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_tab: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ARMORY_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ARMORY_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [feed] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(url) = &self.feed.url {
            let parsed = Url::parse(url)
                .with_context(|| format!("feed.url in {} is not a valid URL", path.display()))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                bail!(
                    "feed.url in {} must use http or https, got scheme {:?}",
                    path.display(),
                    parsed.scheme()
                );
            }
        }

        if let Some(timeout) = &self.feed.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "feed.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(tab) = &self.ui.start_tab {
            Partition::parse(tab).ok_or_else(|| {
                anyhow!(
                    "ui.start_tab in {} must be \"active\" or \"archived\", got {:?}",
                    path.display(),
                    tab
                )
            })?;
        }

        Ok(())
    }

    /// The configured feed URL, preferring the config file over the
    /// `ARMORY_FEED_URL` environment variable. `None` when neither is set.
    pub fn feed_url(&self) -> Option<String> {
        if let Some(url) = &self.feed.url {
            return Some(url.clone());
        }
        env::var("ARMORY_FEED_URL").ok().filter(|u| !u.is_empty())
    }

    pub fn feed_timeout(&self) -> Result<Duration> {
        parse_duration(self.feed.timeout.as_deref().unwrap_or(DEFAULT_FEED_TIMEOUT))
    }

    pub fn start_tab(&self) -> Partition {
        self.ui
            .start_tab
            .as_deref()
            .and_then(Partition::parse)
            .unwrap_or(Partition::Active)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# armory config\n# Place this file at: {}\n\nversion = 1\n\n[feed]\n# Published CSV link for the inventory sheet. Can also be set via ARMORY_FEED_URL.\n# url = \"https://example.com/inventory/pub?output=csv\"\ntimeout = \"{}\"\n\n[ui]\nstart_tab = \"active\"\n",
            path.display(),
            DEFAULT_FEED_TIMEOUT,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
