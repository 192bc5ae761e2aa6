//! Read-only IMAP folder reader
//!
//! Connects to a mail account, selects a folder, and turns each
//! message into a [`MessageRecord`] (sender, receiver, subject, date,
//! attachment flag, and the start of the plain-text body) that a
//! [`MessageSink`] prints or collects.
//!
//! Folder names outside printable ASCII travel in IMAP modified
//! UTF-7; [`utf7`] converts between that and UTF-8, and
//! [`FolderName`] records which form a name is in.

mod client;
mod config;
mod connection;
mod error;
mod folder;
mod lister;
mod message;
mod reader;
mod render;
mod session;
pub mod utf7;

pub use client::MailboxClient;
pub use config::{Credentials, ImapConfig, Security};
pub use connection::connect;
pub use error::{Error, Result};
pub use folder::FolderName;
pub use lister::{FolderEntry, FolderListing, UndecodableFolder};
pub use message::{BODY_EXCERPT_CHARS, MessageRecord};
pub use reader::{MessageOutcome, MessageReader, ReadSummary, SkippedMessage};
pub use render::{ConsoleSink, JsonSink, MessageSink, format_record};
pub use session::{Session, SessionState, with_session};
pub use utf7::DecodeError;
