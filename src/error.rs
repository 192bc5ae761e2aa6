//! Error types for mailbox-reader

use crate::utf7::DecodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Cannot access folder {folder}: {reason}")]
    FolderAccess { folder: String, reason: String },

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Email parsing error: {0}")]
    Parse(String),

    #[error("Folder name decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error ended the whole session rather than a
    /// single operation on it.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
