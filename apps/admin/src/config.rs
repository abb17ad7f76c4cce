use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use client_core::{Endpoints, FileStore};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSettings {
    pub registry_url: String,
    pub ledger_url: String,
    pub tally_url: String,
    pub session_path: PathBuf,
}

impl Default for AdminSettings {
    fn default() -> Self {
        let endpoints = Endpoints::default();
        Self {
            registry_url: endpoints.registry_url,
            ledger_url: endpoints.ledger_url,
            tally_url: endpoints.tally_url,
            session_path: FileStore::default_path()
                .unwrap_or_else(|| PathBuf::from(".evoting_admin_session.json")),
        }
    }
}

impl AdminSettings {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            registry_url: self.registry_url.clone(),
            ledger_url: self.ledger_url.clone(),
            tally_url: self.tally_url.clone(),
        }
    }

    /// Checks every base URL and strips trailing slashes.
    pub fn validated(mut self) -> anyhow::Result<Self> {
        for (name, value) in [
            ("registry_url", &mut self.registry_url),
            ("ledger_url", &mut self.ledger_url),
            ("tally_url", &mut self.tally_url),
        ] {
            *value = normalize_base_url(value).with_context(|| format!("invalid {name}"))?;
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    registry_url: Option<String>,
    ledger_url: Option<String>,
    tally_url: Option<String>,
    session_path: Option<PathBuf>,
}

/// Defaults, then `admin.toml` from the working directory, then environment.
pub fn load_settings() -> anyhow::Result<AdminSettings> {
    load_settings_with(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AdminSettings> {
    let mut settings = AdminSettings::default();

    match fs::read_to_string(file) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse '{}'", file.display()))?;
            if let Some(v) = file_cfg.registry_url {
                settings.registry_url = v;
            }
            if let Some(v) = file_cfg.ledger_url {
                settings.ledger_url = v;
            }
            if let Some(v) = file_cfg.tally_url {
                settings.tally_url = v;
            }
            if let Some(v) = file_cfg.session_path {
                settings.session_path = v;
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", file.display()));
        }
    }

    // The APP__ spelling wins over the plain one when both are set.
    for key in ["ELECTOR_REGISTRY_URL", "APP__REGISTRY_URL"] {
        if let Some(v) = env(key) {
            settings.registry_url = v;
        }
    }
    for key in ["VOTE_LEDGER_URL", "APP__LEDGER_URL"] {
        if let Some(v) = env(key) {
            settings.ledger_url = v;
        }
    }
    for key in ["RESULT_TALLY_URL", "APP__TALLY_URL"] {
        if let Some(v) = env(key) {
            settings.tally_url = v;
        }
    }
    for key in ["ADMIN_SESSION_PATH", "APP__SESSION_PATH"] {
        if let Some(v) = env(key) {
            settings.session_path = PathBuf::from(v);
        }
    }

    Ok(settings)
}

fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).with_context(|| format!("'{raw}' is not a url"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("'{raw}' must use http or https");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
