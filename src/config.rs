//! IMAP connection configuration

use crate::error::{Error, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

const DEFAULT_HOST: &str = "imap.gmail.com";
const DEFAULT_PORT: u16 = 993;
const DEFAULT_FOLDER: &str = "INBOX";

/// Account login, fixed for the lifetime of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How the connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// TLS from the first byte (IMAPS, usually port 993).
    #[default]
    Tls,
    /// Plain TCP upgraded with the STARTTLS command.
    StartTls,
}

impl FromStr for Security {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tls" | "ssl" | "imaps" => Ok(Self::Tls),
            "starttls" => Ok(Self::StartTls),
            other => Err(Error::Config(format!(
                "Invalid IMAP_SECURITY '{other}' (expected tls or starttls)"
            ))),
        }
    }
}

/// Everything needed to open and use a session.
#[derive(Debug, Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub security: Security,
    /// Skip certificate verification (self-signed local bridges).
    pub accept_invalid_certs: bool,
    pub credentials: Credentials,
    /// Folder read when the caller does not name one.
    pub folder: String,
}

impl ImapConfig {
    /// Configuration for `host:port` over implicit TLS, reading `INBOX`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            port,
            security: Security::default(),
            accept_invalid_certs: false,
            credentials,
            folder: DEFAULT_FOLDER.to_string(),
        }
    }

    /// Load IMAP configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `IMAP_USERNAME`
    /// - `IMAP_PASSWORD` (for Gmail, an app password)
    ///
    /// Optional (with defaults):
    /// - `IMAP_HOST` (default: `imap.gmail.com`)
    /// - `IMAP_PORT` (default: `993`)
    /// - `IMAP_SECURITY` (`tls` or `starttls`, default: `tls`)
    /// - `IMAP_ACCEPT_INVALID_CERTS` (default: `false`)
    /// - `IMAP_FOLDER` (default: `INBOX`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("IMAP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("Invalid IMAP_PORT: {e}")))?,
            None => DEFAULT_PORT,
        };

        let security = match lookup("IMAP_SECURITY") {
            Some(raw) => raw.parse()?,
            None => Security::default(),
        };

        let accept_invalid_certs = match lookup("IMAP_ACCEPT_INVALID_CERTS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                Error::Config(format!("Invalid IMAP_ACCEPT_INVALID_CERTS: {raw}"))
            })?,
            None => false,
        };

        let credentials = Credentials {
            username: lookup("IMAP_USERNAME")
                .ok_or_else(|| Error::Config("IMAP_USERNAME not set".into()))?,
            password: lookup("IMAP_PASSWORD")
                .ok_or_else(|| Error::Config("IMAP_PASSWORD not set".into()))?,
        };

        Ok(Self {
            host: lookup("IMAP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            security,
            accept_invalid_certs,
            credentials,
            folder: lookup("IMAP_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
