// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Local sign-in state. A small JSON file next to the config records who is
//! signed in; removing it signs the user out. This gates visibility only,
//! nothing in the feed is scoped per user.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub user: String,
    #[serde(with = "time::serde::rfc3339")]
    pub signed_in_at: OffsetDateTime,
}

/// The session file lives next to the config file unless
/// `ARMORY_SESSION_PATH` points elsewhere.
pub fn default_path(config_path: &Path) -> PathBuf {
    if let Some(path) = env::var_os("ARMORY_SESSION_PATH") {
        return PathBuf::from(path);
    }
    match config_path.parent() {
        Some(dir) => dir.join("session.json"),
        None => PathBuf::from("session.json"),
    }
}

pub fn load(path: &Path) -> Result<Option<SessionFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read session file {}", path.display()))?;
    let session: SessionFile = serde_json::from_str(&raw).with_context(|| {
        format!(
            "parse session file {}; run `armory --sign-out` to reset it",
            path.display()
        )
    })?;
    Ok(Some(session))
}

pub fn save(path: &Path, user: &str) -> Result<SessionFile> {
    let user = user.trim();
    if user.is_empty() {
        return Err(anyhow!("sign-in name must not be empty"));
    }
    let session = SessionFile {
        user: user.to_owned(),
        signed_in_at: OffsetDateTime::now_utc(),
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create session directory {}", dir.display()))?;
    }
    let raw = serde_json::to_string_pretty(&session).context("encode session file")?;
    fs::write(path, raw).with_context(|| format!("write session file {}", path.display()))?;
    Ok(session)
}

/// Removes the session file. Returns whether a session existed.
pub fn clear(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("remove session file {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{SessionFile, clear, default_path, load, save};
    use anyhow::Result;
    use std::path::Path;

    #[test]
    fn save_then_load_round_trips_the_user() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("session.json");

        save(&path, "erin")?;
        let loaded = load(&path)?.expect("session should exist after save");
        assert_eq!(loaded.user, "erin");
        Ok(())
    }

    #[test]
    fn load_returns_none_when_no_session_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        assert!(load(&temp.path().join("session.json"))?.is_none());
        Ok(())
    }

    #[test]
    fn save_trims_and_rejects_empty_names() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("session.json");

        let session = save(&path, "  erin  ")?;
        assert_eq!(session.user, "erin");

        let error = save(&path, "   ").expect_err("blank name should fail");
        assert!(error.to_string().contains("must not be empty"));
        Ok(())
    }

    #[test]
    fn clear_removes_the_file_and_reports_whether_it_existed() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("session.json");

        assert!(!clear(&path)?);
        save(&path, "erin")?;
        assert!(clear(&path)?);
        assert!(load(&path)?.is_none());
        Ok(())
    }

    #[test]
    fn corrupt_session_file_fails_with_reset_hint() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("session.json");
        std::fs::write(&path, "{not json")?;

        let error = load(&path).expect_err("corrupt session should fail");
        assert!(error.to_string().contains("--sign-out"));
        Ok(())
    }

    #[test]
    fn default_path_sits_next_to_the_config_file() {
        let resolved = default_path(Path::new("/home/erin/.config/armory/config.toml"));
        assert_eq!(
            resolved,
            Path::new("/home/erin/.config/armory/session.json")
        );
    }

    #[test]
    fn session_file_serializes_signed_in_at_as_rfc3339() -> Result<()> {
        let session = SessionFile {
            user: "erin".to_owned(),
            signed_in_at: time::macros::datetime!(2026-03-01 12:00 UTC),
        };
        let raw = serde_json::to_string(&session)?;
        assert!(raw.contains("2026-03-01T12:00:00Z"), "got {raw}");
        Ok(())
    }
}
