//! Login identity carried explicitly into API calls.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

const APP_DIR: &str = "wikitree-api";
const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_name: String,
    pub user_id: u64,
    #[serde(default)]
    pub cookies: Vec<(String, String)>,
}

impl Session {
    pub fn new(user_name: impl Into<String>, user_id: u64) -> Self {
        Self {
            user_name: user_name.into(),
            user_id,
            cookies: Vec::new(),
        }
    }

    /// Records one `Set-Cookie` value, replacing an earlier cookie of the same name.
    pub fn absorb_set_cookie(&mut self, header: &str) {
        if let Some((name, value)) = parse_set_cookie(header) {
            self.set_cookie(name, value);
        }
    }

    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value for a `Cookie` request header, if any cookies are held.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn parse_set_cookie(header: &str) -> Option<(&str, &str)> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

/// JSON file holding the last successful login.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> ApiResult<PathBuf> {
        let dir = dirs::cache_dir()
            .ok_or_else(|| ApiError::Config("cannot determine cache directory".to_string()))?;
        Ok(dir.join(APP_DIR).join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> ApiResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let session = serde_json::from_str(&text)?;
        debug!(path = %self.path.display(), "loaded stored session");
        Ok(Some(session))
    }

    pub fn save(&self, session: &Session) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        debug!(path = %self.path.display(), user = %session.user_name, "stored session");
        Ok(())
    }

    pub fn clear(&self) -> ApiResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
