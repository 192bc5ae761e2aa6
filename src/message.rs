//! Normalized message records
//!
//! Turns the raw RFC 5322 bytes of a fetched message into a
//! [`MessageRecord`]: the addressing headers as sent, the decoded
//! subject, the parsed date, whether anything is attached, and the
//! start of the plain-text body.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use mailparse::{DispositionType, MailHeaderMap, ParsedMail};
use serde::Serialize;
use tracing::{debug, warn};

/// How many characters of the body a record keeps.
pub const BODY_EXCERPT_CHARS: usize = 5000;

/// One message, reduced to what gets printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub uid: u32,
    pub sender: String,
    pub receiver: String,
    pub subject: String,
    /// `None` when the Date header is missing or unparseable.
    pub date: Option<DateTime<FixedOffset>>,
    pub has_attachment: bool,
    pub body_excerpt: String,
    /// Whether the body was longer than [`BODY_EXCERPT_CHARS`].
    pub body_truncated: bool,
}

impl MessageRecord {
    /// Parse a raw message fetched under `uid`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the bytes are not a parseable
    /// message. A missing plain-text part is not an error; the body is
    /// empty.
    pub fn parse(uid: u32, raw: &[u8]) -> Result<Self> {
        let mail = mailparse::parse_mail(raw)
            .map_err(|e| Error::Parse(format!("UID {uid}: {e}")))?;

        let (body, has_attachment) = extract_body(uid, &mail);
        let (body_excerpt, body_truncated) = excerpt(&body);

        Ok(Self {
            uid,
            sender: verbatim_header(&mail, "From"),
            receiver: verbatim_header(&mail, "To"),
            subject: mail.headers.get_first_value("Subject").unwrap_or_default(),
            date: parse_date(uid, &mail),
            has_attachment,
            body_excerpt,
            body_truncated,
        })
    }
}

/// The header value as sent, with line folding removed.
fn verbatim_header(mail: &ParsedMail<'_>, name: &str) -> String {
    mail.headers
        .get_first_header(name)
        .map(|header| {
            String::from_utf8_lossy(header.get_value_raw())
                .replace("\r\n", "")
                .replace('\n', "")
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

fn parse_date(uid: u32, mail: &ParsedMail<'_>) -> Option<DateTime<FixedOffset>> {
    let raw = mail.headers.get_first_value("Date")?;
    let value = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date);
    }

    // mailparse tolerates obsolete zone names and missing weekdays.
    match mailparse::dateparse(value) {
        Ok(ts) => DateTime::from_timestamp(ts, 0).map(|d| d.fixed_offset()),
        Err(e) => {
            debug!("UID {}: unparseable Date {:?}: {}", uid, value, e);
            None
        }
    }
}

fn extract_body(uid: u32, mail: &ParsedMail<'_>) -> (String, bool) {
    if mail.subparts.is_empty() {
        let body = decode_text(mail).unwrap_or_else(|e| {
            warn!("UID {}: could not decode body: {}", uid, e);
            String::new()
        });
        return (body, false);
    }

    let mut parts = Vec::new();
    walk(mail, &mut parts);

    let has_attachment = parts.iter().any(|part| is_attachment(part));
    let body = parts
        .iter()
        .filter(|part| part.ctype.mimetype == "text/plain" && !is_attachment(part))
        .find_map(|part| match decode_text(part) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("UID {}: could not decode text part: {}", uid, e);
                None
            }
        })
        .unwrap_or_default();

    (body, has_attachment)
}

/// Every part of the tree, depth first, containers included.
fn walk<'a>(part: &'a ParsedMail<'a>, out: &mut Vec<&'a ParsedMail<'a>>) {
    out.push(part);
    for sub in &part.subparts {
        walk(sub, out);
    }
}

fn is_attachment(part: &ParsedMail<'_>) -> bool {
    part.get_content_disposition().disposition == DispositionType::Attachment
}

/// Decode a part's payload under its declared charset.
///
/// mailparse reports `us-ascii` when no charset is declared; that and
/// UTF-8 are both read as UTF-8.
fn decode_text(part: &ParsedMail<'_>) -> std::result::Result<String, mailparse::MailParseError> {
    let charset = part.ctype.charset.as_str();
    if charset.eq_ignore_ascii_case("us-ascii") || charset.eq_ignore_ascii_case("utf-8") {
        let raw = part.get_body_raw()?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    } else {
        part.get_body()
    }
}

fn excerpt(body: &str) -> (String, bool) {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((cut, _)) => (body[..cut].to_string(), true),
        None => (body.to_string(), false),
    }
}
