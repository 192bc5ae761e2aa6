//! Folder names tagged with their encoding
//!
//! A folder name is either in display form (UTF-8, as a person would
//! type it) or in wire form (modified UTF-7, as the server lists it).
//! Keeping the two apart means a name is never encoded twice.
//!
//! Plain strings convert to [`FolderName::Wire`] and are sent as-is,
//! so ASCII names like `INBOX` pass straight through. Callers opt
//! into encoding with [`FolderName::display`].
//!
//! # Examples
//!
//! ```
//! use mailbox_reader::FolderName;
//!
//! let inbox = FolderName::from("INBOX");
//! assert_eq!(inbox.to_wire(), "INBOX");
//!
//! let sent = FolderName::display("Elküldött levelek");
//! assert_eq!(sent.to_wire(), "Elk&APw-ld&APY-tt levelek");
//! ```

use crate::utf7::{self, DecodeError};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// An IMAP folder name in display or wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "form", content = "name", rename_all = "lowercase")]
pub enum FolderName {
    /// Human-readable UTF-8; encoded before it goes to the server.
    Display(String),
    /// Modified UTF-7 as the server uses it; sent unchanged.
    Wire(String),
}

impl FolderName {
    /// A display-form name, encoded when sent to the server.
    #[must_use]
    pub fn display(name: impl Into<String>) -> Self {
        Self::Display(name.into())
    }

    /// A wire-form name, sent to the server unchanged.
    #[must_use]
    pub fn wire(name: impl Into<String>) -> Self {
        Self::Wire(name.into())
    }

    /// The INBOX folder (RFC 3501 required, case-insensitive).
    #[must_use]
    pub fn inbox() -> Self {
        Self::Wire("INBOX".to_string())
    }

    /// The name as stored, in whichever form it is in.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Display(name) | Self::Wire(name) => name,
        }
    }

    /// The name as the server expects it.
    #[must_use]
    pub fn to_wire(&self) -> Cow<'_, str> {
        match self {
            Self::Display(name) => Cow::Owned(utf7::encode(name)),
            Self::Wire(name) => Cow::Borrowed(name),
        }
    }

    /// The name as a person would read it.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if a wire-form name carries a
    /// malformed encoded span.
    pub fn to_display(&self) -> Result<Cow<'_, str>, DecodeError> {
        match self {
            Self::Display(name) => Ok(Cow::Borrowed(name)),
            Self::Wire(name) => utf7::decode(name).map(Cow::Owned),
        }
    }

    /// Convert a wire-form name to display form.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the name cannot be decoded.
    pub fn into_display(self) -> Result<Self, DecodeError> {
        match self {
            Self::Display(_) => Ok(self),
            Self::Wire(name) => utf7::decode(&name).map(Self::Display),
        }
    }
}

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FolderName {
    fn from(s: &str) -> Self {
        Self::Wire(s.to_string())
    }
}

impl From<String> for FolderName {
    fn from(s: String) -> Self {
        Self::Wire(s)
    }
}
