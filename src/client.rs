//! Mailbox client facade

use crate::config::ImapConfig;
use crate::connection;
use crate::error::Result;
use crate::folder::FolderName;
use crate::lister::FolderEntry;
use crate::reader::{MessageOutcome, ReadSummary};
use crate::render::MessageSink;
use crate::session::{Session, with_session};

/// Read-only IMAP client. Every call opens its own session and logs
/// out before returning.
pub struct MailboxClient {
    config: ImapConfig,
}

impl MailboxClient {
    #[must_use]
    pub const fn new(config: ImapConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ImapConfig {
        &self.config
    }

    /// Open a session the caller manages.
    ///
    /// # Errors
    ///
    /// Returns a connection error if connecting or logging in fails.
    pub async fn connect(&self) -> Result<Session> {
        connection::connect(&self.config).await
    }

    /// Read every message in `folder` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the folder cannot
    /// be selected. Individual messages that fail are passed to the
    /// sink as skipped, not returned.
    pub async fn read_folder<S: MessageSink + ?Sized>(
        &self,
        folder: &FolderName,
        sink: &mut S,
    ) -> Result<ReadSummary> {
        with_session(&self.config, async |session| {
            let reader = session.list_messages(folder).await?;
            Ok(reader.render_into(sink).await)
        })
        .await
    }

    /// Fetch every message in `folder` as records or skip notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the folder cannot
    /// be selected.
    pub async fn fetch_folder(&self, folder: &FolderName) -> Result<Vec<MessageOutcome>> {
        with_session(&self.config, async |session| {
            let reader = session.list_messages(folder).await?;
            Ok(reader.collect_all().await)
        })
        .await
    }

    /// List all folders, decoded to display form.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or LIST command fails.
    /// Names that cannot be decoded are returned as per-item errors.
    pub async fn list_folders(&self) -> Result<Vec<FolderEntry>> {
        with_session(&self.config, async |session| {
            Ok(session.list_folders().await?.collect())
        })
        .await
    }
}
