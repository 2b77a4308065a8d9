use std::path::PathBuf;
use std::time::Duration;

use crate::api::API_URL;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

pub const DEFAULT_FORM_ADDR: &str = "127.0.0.1:8080";

/// Settings read from the environment (and an optional `.env` file).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub timeout: Option<Duration>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub session_file: Option<PathBuf>,
    pub form_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: API_URL.to_string(),
            timeout: None,
            email: None,
            password: None,
            session_file: None,
            form_addr: DEFAULT_FORM_ADDR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> ApiResult<Self> {
        // A missing .env is normal.
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let timeout = match get("WIKITREE_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|err| {
                    ApiError::Config(format!("WIKITREE_TIMEOUT_MS={raw:?}: {err}"))
                })?;
                Some(Duration::from_millis(ms))
            }
            None => None,
        };

        Ok(Self {
            endpoint: get("WIKITREE_API_URL").unwrap_or(defaults.endpoint),
            timeout,
            email: get("LOGIN_EMAIL"),
            password: get("LOGIN_PASSWORD"),
            session_file: get("WIKITREE_SESSION_FILE").map(PathBuf::from),
            form_addr: get("WIKITREE_FORM_ADDR").unwrap_or(defaults.form_addr),
        })
    }

    pub fn session_store(&self) -> ApiResult<SessionStore> {
        let path = match &self.session_file {
            Some(path) => path.clone(),
            None => SessionStore::default_path()?,
        };
        Ok(SessionStore::new(path))
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.email.as_deref()?, self.password.as_deref()?))
    }
}
