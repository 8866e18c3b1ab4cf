//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `MATCHMAKING_*` environment variables or a
//! configuration file; anything left unset falls back to the defaults below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use matchmaking::domain::ports::NotificationContact;
use matchmaking::domain::{DEFAULT_MESSAGE_BURST_LIMIT, ThrottlePolicy};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_PORT: u16 = 8080;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The host is not an IP address.
    #[error("invalid host {host:?}: expected an IP address")]
    InvalidHost { host: String },
    /// A burst limit of zero would block every message.
    #[error("message burst limit must be at least 1")]
    ZeroBurstLimit,
    /// The contacts file could not be read or parsed.
    #[error("failed to load contacts from {path}: {message}")]
    ContactsFile { path: String, message: String },
}

/// Configuration values controlling the HTTP server and throttle policy.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MATCHMAKING")]
pub struct ServerSettings {
    /// IP address to bind.
    pub host: Option<String>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// Messages a participant may send without a reply.
    pub message_burst_limit: Option<usize>,
    /// JSON array of notification contacts to preload.
    pub contacts_file: Option<PathBuf>,
}

impl ServerSettings {
    /// Return the socket address to bind, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when the host does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = match self.host.as_deref() {
            Some(raw) => raw.parse().map_err(|_| SettingsError::InvalidHost {
                host: raw.to_owned(),
            })?,
            None => DEFAULT_HOST,
        };
        Ok(SocketAddr::new(host, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Return the throttle policy, falling back to the default burst limit.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroBurstLimit`] when the limit is zero.
    pub fn throttle_policy(&self) -> Result<ThrottlePolicy, SettingsError> {
        let limit = self
            .message_burst_limit
            .unwrap_or(DEFAULT_MESSAGE_BURST_LIMIT);
        NonZeroUsize::new(limit)
            .map(ThrottlePolicy::with_message_burst_limit)
            .ok_or(SettingsError::ZeroBurstLimit)
    }

    /// Read the notification contacts named by `contacts_file`.
    ///
    /// Without a file the directory starts empty and every notification is
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ContactsFile`] when the file cannot be read or
    /// is not a JSON array of contacts.
    pub fn load_contacts(&self) -> Result<Vec<NotificationContact>, SettingsError> {
        let Some(path) = self.contacts_file.as_deref() else {
            return Ok(Vec::new());
        };
        let contacts_error = |message: String| SettingsError::ContactsFile {
            path: path.display().to_string(),
            message,
        };
        let bytes = std::fs::read(path).map_err(|err| contacts_error(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| contacts_error(err.to_string()))
    }
}
