//! Authenticated session lifecycle
//!
//! A [`Session`] starts out connected and ends logged out. Folder
//! operations live in [`crate::reader`] and [`crate::lister`]; this
//! module only tracks whether the connection is still there and tears
//! it down.

use crate::config::ImapConfig;
use crate::connection::{self, ImapSession};
use crate::error::{Error, Result};
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    LoggedOut,
}

/// One authenticated IMAP connection, owned by a single caller.
pub struct Session {
    imap: Option<ImapSession>,
    username: String,
}

impl Session {
    pub(crate) const fn new(imap: ImapSession, username: String) -> Self {
        Self {
            imap: Some(imap),
            username,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.imap.is_some() {
            SessionState::Connected
        } else {
            SessionState::LoggedOut
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.imap.is_some()
    }

    /// The account this session is logged in as.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Log out and release the connection.
    ///
    /// Calling this on a session that is already logged out does
    /// nothing. A failing LOGOUT is logged; the connection is dropped
    /// either way.
    pub async fn disconnect(&mut self) {
        let Some(mut imap) = self.imap.take() else {
            debug!("Session for {} already logged out", self.username);
            return;
        };

        match imap.logout().await {
            Ok(()) => info!("Logged out {}", self.username),
            Err(e) => warn!("LOGOUT for {} failed: {}", self.username, e),
        }
    }

    /// The live IMAP connection, or a connection error once logged out.
    pub(crate) fn imap(&mut self) -> Result<&mut ImapSession> {
        self.imap.as_mut().ok_or_else(|| {
            Error::Connection(format!("Session for {} is logged out", self.username))
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Run `f` on a fresh session and log out afterwards.
///
/// The session is released on every exit path: when `f` succeeds,
/// when it returns an error, and when connecting fails there is
/// nothing to release.
///
/// # Errors
///
/// Returns the connection error if the session cannot be opened,
/// otherwise whatever `f` returns.
pub async fn with_session<T, F>(config: &ImapConfig, f: F) -> Result<T>
where
    F: AsyncFnOnce(&mut Session) -> Result<T>,
{
    let mut session = connection::connect(config).await?;
    let result = f(&mut session).await;
    session.disconnect().await;
    result
}
