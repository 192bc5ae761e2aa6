//! Folder listing
//!
//! LIST returns wire-form names; they are decoded lazily as the
//! listing is iterated, so one bad name does not hide the others.

use crate::error::{Error, Result};
use crate::folder::FolderName;
use crate::session::Session;
use crate::utf7::DecodeError;
use futures::StreamExt;
use thiserror::Error;
use tracing::{info, warn};

/// A listed folder whose wire name could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot decode folder name {raw:?}: {source}")]
pub struct UndecodableFolder {
    pub raw: String,
    pub source: DecodeError,
}

/// A decoded folder name, or the raw name that failed to decode.
pub type FolderEntry = std::result::Result<FolderName, UndecodableFolder>;

/// Folder names from one LIST, decoded to display form on iteration.
#[derive(Debug, Clone)]
pub struct FolderListing {
    names: std::vec::IntoIter<String>,
}

impl FolderListing {
    /// A listing over names already in wire form.
    #[must_use]
    pub fn from_wire_names(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect::<Vec<_>>().into_iter(),
        }
    }
}

impl Iterator for FolderListing {
    type Item = FolderEntry;

    fn next(&mut self) -> Option<FolderEntry> {
        let raw = self.names.next()?;
        Some(
            FolderName::Wire(raw.clone())
                .into_display()
                .map_err(|source| UndecodableFolder { raw, source }),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl ExactSizeIterator for FolderListing {}

impl Session {
    /// List every folder on the account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the session is logged out and
    /// [`Error::Imap`] if the LIST command fails.
    pub async fn list_folders(&mut self) -> Result<FolderListing> {
        let imap = self.imap()?;

        let mut folder_stream = imap
            .list(Some(""), Some("*"))
            .await
            .map_err(|e| Error::Imap(format!("List folders failed: {e}")))?;

        let mut names = Vec::new();
        while let Some(item) = folder_stream.next().await {
            match item {
                Ok(name) => names.push(name.name().to_string()),
                Err(e) => warn!("Dropping unreadable LIST entry: {}", e),
            }
        }
        drop(folder_stream);

        info!("Listed {} folders", names.len());
        Ok(FolderListing::from_wire_names(names))
    }
}
