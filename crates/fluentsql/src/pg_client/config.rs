use crate::error::{SqlError, SqlResult};
use std::time::Duration;

/// Connection settings for [`PgAccess`](super::PgAccess).
#[derive(Debug, Clone, PartialEq)]
pub struct PgAccessConfig {
    /// `postgres://` URL or key/value connection string.
    pub url: String,
    pub connect_timeout: Option<Duration>,
    /// Reported to the server as `application_name`.
    pub application_name: Option<String>,
}

impl PgAccessConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Some(Duration::from_secs(10)),
            application_name: Some("fluentsql".to_string()),
        }
    }

    /// Read the URL from `DATABASE_URL`.
    pub fn from_env() -> SqlResult<Self> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| SqlError::Connection("DATABASE_URL is not set".to_string()))?;
        Ok(Self::new(url))
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn no_connect_timeout(mut self) -> Self {
        self.connect_timeout = None;
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub(crate) fn to_pg_config(&self) -> SqlResult<tokio_postgres::Config> {
        let mut config: tokio_postgres::Config = self
            .url
            .parse()
            .map_err(|e: tokio_postgres::Error| SqlError::Connection(e.to_string()))?;
        if let Some(timeout) = self.connect_timeout {
            config.connect_timeout(timeout);
        }
        if let Some(name) = &self.application_name {
            config.application_name(name);
        }
        Ok(config)
    }
}
