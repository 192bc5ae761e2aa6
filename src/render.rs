//! Output sinks for processed messages
//!
//! The reader hands each record (or skip note) to a [`MessageSink`].
//! [`ConsoleSink`] prints the labeled block format; [`JsonSink`]
//! writes one JSON object per line. Tests can supply their own sink.

use crate::message::MessageRecord;
use crate::reader::SkippedMessage;
use serde::Serialize;
use std::io::{self, Write};
use tracing::warn;

const RULE: &str = "----------------------------------------";
const SEPARATOR: &str =
    "***************************************************************************";

/// Receives every item a folder pass produces, in order.
pub trait MessageSink {
    fn message(&mut self, record: &MessageRecord);
    fn skipped(&mut self, skipped: &SkippedMessage);
}

/// Render a record as the labeled block used on the console.
#[must_use]
pub fn format_record(record: &MessageRecord) -> String {
    let date = record.date.map_or_else(
        || "-".to_string(),
        |d| d.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    let attachment = if record.has_attachment { "Yes" } else { "No" };
    let ellipsis = if record.body_truncated { "..." } else { "" };

    format!(
        "{RULE}\n\
         Sender: {sender}\n\
         Receiver: {receiver}\n\
         Date: {date}\n\
         Has attachment: {attachment}\n\
         {RULE}\n\
         Subject: {subject}\n\
         {RULE}\n\
         Body:\n\
         -----\n\
         {body}{ellipsis}\n\
         {RULE}\n",
        sender = record.sender,
        receiver = record.receiver,
        subject = record.subject,
        body = record.body_excerpt,
    )
}

/// Prints records as labeled blocks separated by a line of stars.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let written = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!("Could not write to output: {}", e);
        }
    }
}

impl<W: Write> MessageSink for ConsoleSink<W> {
    fn message(&mut self, record: &MessageRecord) {
        let block = format_record(record);
        self.emit(&format!("\n{block}\n{SEPARATOR}\n"));
    }

    fn skipped(&mut self, skipped: &SkippedMessage) {
        self.emit(&format!(
            "\nERROR: Failed to read UID {} in {}: {}\n",
            skipped.uid, skipped.folder, skipped.reason
        ));
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum JsonLine<'a> {
    Message(&'a MessageRecord),
    Skipped(&'a SkippedMessage),
}

/// Writes one JSON object per item, tagged with `"kind"`.
pub struct JsonSink<W: Write> {
    out: W,
}

impl JsonSink<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonSink<W> {
    #[must_use]
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, line: &JsonLine<'_>) {
        if let Err(e) = write_json_line(&mut self.out, line) {
            warn!("Could not write JSON output: {}", e);
        }
    }
}

fn write_json_line<W: Write>(out: &mut W, line: &JsonLine<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, line)?;
    out.write_all(b"\n")?;
    out.flush()
}

impl<W: Write> MessageSink for JsonSink<W> {
    fn message(&mut self, record: &MessageRecord) {
        self.emit(&JsonLine::Message(record));
    }

    fn skipped(&mut self, skipped: &SkippedMessage) {
        self.emit(&JsonLine::Skipped(skipped));
    }
}
