//! Folder message reader
//!
//! Selecting a folder captures the UIDs present at that moment;
//! [`MessageReader`] then fetches and parses them one at a time. A
//! message that cannot be fetched or parsed becomes a
//! [`SkippedMessage`] in the sequence instead of ending it.

use crate::connection::ImapSession;
use crate::error::{Error, Result};
use crate::folder::FolderName;
use crate::message::MessageRecord;
use crate::render::MessageSink;
use crate::session::Session;
use futures::StreamExt;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One processed message: a record, or the reason it was skipped.
pub type MessageOutcome = std::result::Result<MessageRecord, SkippedMessage>;

/// A message whose fetch or parse failed. Reported, not raised.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Skipped UID {uid} in {folder}: {reason}")]
pub struct SkippedMessage {
    pub uid: u32,
    pub folder: String,
    pub reason: String,
}

/// Counts from one pass over a folder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadSummary {
    pub rendered: usize,
    pub skipped: usize,
}

/// A single, non-restartable pass over the messages of one folder.
pub struct MessageReader<'s> {
    imap: &'s mut ImapSession,
    folder: String,
    uids: std::vec::IntoIter<u32>,
    total: usize,
}

impl Session {
    /// Select `folder` and prepare to read every message in it.
    ///
    /// A [`FolderName::Display`] name is encoded to modified UTF-7
    /// first; a [`FolderName::Wire`] name is sent as given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the session is logged out and
    /// [`Error::FolderAccess`] if SELECT or SEARCH fails. The session
    /// stays usable after a folder error.
    pub async fn list_messages(&mut self, folder: &FolderName) -> Result<MessageReader<'_>> {
        let name = folder.as_str().to_string();
        let wire = folder.to_wire();
        let imap = self.imap()?;

        select(imap, &wire, &name).await?;

        let found = imap
            .uid_search("ALL")
            .await
            .map_err(|e| Error::FolderAccess {
                folder: name.clone(),
                reason: format!("Search failed: {e}"),
            })?;

        let mut uids: Vec<u32> = found.into_iter().collect();
        uids.sort_unstable();

        info!("Found {} messages in {}", uids.len(), name);
        Ok(MessageReader::new(imap, name, uids))
    }
}

impl<'s> MessageReader<'s> {
    fn new(imap: &'s mut ImapSession, folder: String, uids: Vec<u32>) -> Self {
        let total = uids.len();
        Self {
            imap,
            folder,
            uids: uids.into_iter(),
            total,
        }
    }

    /// The selected folder, as the caller named it.
    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Number of messages the folder held when it was selected.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.total
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Messages not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.uids.len()
    }

    /// Fetch and parse the next message, or `None` once every UID
    /// has been visited.
    pub async fn next_message(&mut self) -> Option<MessageOutcome> {
        let uid = self.uids.next()?;

        let outcome = fetch_raw(self.imap, uid)
            .await
            .and_then(|raw| MessageRecord::parse(uid, &raw));

        Some(outcome.map_err(|e| {
            warn!("Skipping UID {} in {}: {}", uid, self.folder, e);
            SkippedMessage {
                uid,
                folder: self.folder.clone(),
                reason: e.to_string(),
            }
        }))
    }

    /// Read the remaining messages into a vector.
    pub async fn collect_all(mut self) -> Vec<MessageOutcome> {
        let mut outcomes = Vec::with_capacity(self.remaining());
        while let Some(outcome) = self.next_message().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Hand every remaining message to `sink`.
    pub async fn render_into<S: MessageSink + ?Sized>(mut self, sink: &mut S) -> ReadSummary {
        let mut summary = ReadSummary::default();

        while let Some(outcome) = self.next_message().await {
            match outcome {
                Ok(record) => {
                    sink.message(&record);
                    summary.rendered += 1;
                }
                Err(skipped) => {
                    sink.skipped(&skipped);
                    summary.skipped += 1;
                }
            }
        }

        info!(
            "Read {} of {} messages from {} ({} skipped)",
            summary.rendered, self.total, self.folder, summary.skipped
        );
        summary
    }
}

/// SELECT `wire`; errors name the folder as `name`, plus the wire
/// form when the two differ.
async fn select(imap: &mut ImapSession, wire: &str, name: &str) -> Result<()> {
    let mailbox = imap.select(wire).await.map_err(|e| Error::FolderAccess {
        folder: name.to_string(),
        reason: if wire == name {
            e.to_string()
        } else {
            format!("{e} (sent as {wire})")
        },
    })?;
    debug!("Selected {} as {} ({} messages)", name, wire, mailbox.exists);
    Ok(())
}

async fn fetch_raw(imap: &mut ImapSession, uid: u32) -> Result<Vec<u8>> {
    let uid_set = uid.to_string();
    let mut messages = imap
        .uid_fetch(&uid_set, "(UID BODY.PEEK[])")
        .await
        .map_err(|e| Error::Imap(format!("Fetch of UID {uid} failed: {e}")))?;

    // Drain the whole response so the next command starts clean.
    let mut body = None;
    while let Some(item) = messages.next().await {
        let fetch = item.map_err(|e| Error::Imap(format!("Fetch error for UID {uid}: {e}")))?;
        if body.is_none() && fetch.uid.is_none_or(|u| u == uid) {
            body = fetch.body().map(<[u8]>::to_vec);
        }
    }

    body.ok_or_else(|| Error::Imap(format!("No body found for UID {uid}")))
}
