//! IMAP modified UTF-7 folder-name codec
//!
//! Servers report folder names containing characters outside
//! printable ASCII as base64 of their UTF-16BE text, bracketed by `&`
//! and `-`, with `,` standing in for the base64 `/`. Gmail's Hungarian
//! "Sent Mail" folder, for example, is listed as
//! `Elk&APw-ld&APY-tt levelek`.
//!
//! Both directions share one span-replacement routine: a pattern
//! picks out the spans to convert, everything between them is copied
//! through a literal transform.
//!
//! The decoder rewrites `&` and `,` across the whole name before it
//! looks for spans. A printable `,` therefore reads back as `/`, a
//! printable `&` as `+`, and a printable `+` written just before an
//! encoded run merges with that run's marker. Such names do not
//! survive a round trip.
//!
//! ```
//! use mailbox_reader::utf7;
//!
//! assert_eq!(utf7::encode("Entwürfe"), "Entw&APw-rfe");
//! assert_eq!(utf7::decode("Entw&APw-rfe").unwrap(), "Entwürfe");
//! assert_eq!(utf7::decode("INBOX").unwrap(), "INBOX");
//! ```

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use regex::{Captures, Regex};
use std::convert::Infallible;
use std::sync::LazyLock;
use thiserror::Error;

/// A wire folder name whose encoded span cannot be turned back into
/// text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid base64 payload {payload:?}: {reason}")]
    InvalidBase64 { payload: String, reason: String },

    #[error("payload {payload:?} decodes to {len} bytes, not whole UTF-16 code units")]
    OddLength { payload: String, len: usize },

    #[error("payload {payload:?} is not valid UTF-16BE text")]
    InvalidUtf16 { payload: String },
}

/// `+payload-` after the `&`/`,` substitution. Redundant `=` padding
/// left by lenient encoders is accepted and dropped.
static ENCODED_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+([A-Za-z0-9+/]+)=*-").expect("encoded span pattern is valid")
});

static NON_PRINTABLE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\x20-\x7E]+").expect("non-printable run pattern is valid")
});

/// Decode a wire folder name into its display form.
///
/// `&` and `,` are first rewritten to `+` and `/` across the whole
/// name, then every `+payload-` span is replaced by the UTF-16BE text
/// its base64 payload carries.
///
/// # Errors
///
/// Returns a [`DecodeError`] if a payload is not valid base64, does
/// not decode to whole UTF-16 code units, or contains unpaired
/// surrogates.
pub fn decode(wire: &str) -> Result<String, DecodeError> {
    let substituted = wire.replace('&', "+").replace(',', "/");
    replace_spans(
        &substituted,
        &ENCODED_SPAN,
        str::to_string,
        |caps| decode_payload(&caps[1]),
    )
}

/// Encode a display folder name into its wire form.
///
/// Every maximal run of characters outside `0x20..=0x7E` becomes one
/// `&payload-` span. Every `+`, printable or base64, is written as `&`;
/// the decoder reads either back.
#[must_use]
pub fn encode(display: &str) -> String {
    let Ok(wire) = replace_spans::<Infallible>(
        display,
        &NON_PRINTABLE_RUN,
        |text| text.replace('+', "&"),
        |caps| Ok(encode_run(&caps[0])),
    );
    wire
}

/// Whether the name contains anything the wire form would encode.
#[must_use]
pub fn needs_encoding(display: &str) -> bool {
    NON_PRINTABLE_RUN.is_match(display)
}

fn replace_spans<E>(
    input: &str,
    pattern: &Regex,
    literal: impl Fn(&str) -> String,
    mut span: impl FnMut(&Captures<'_>) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for caps in pattern.captures_iter(input) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&literal(&input[last..whole.start()]));
        out.push_str(&span(&caps)?);
        last = whole.end();
    }

    out.push_str(&literal(&input[last..]));
    Ok(out)
}

fn decode_payload(payload: &str) -> Result<String, DecodeError> {
    let mut padded = payload.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = STANDARD
        .decode(&padded)
        .map_err(|e| DecodeError::InvalidBase64 {
            payload: payload.to_string(),
            reason: e.to_string(),
        })?;

    if bytes.len() % 2 != 0 {
        return Err(DecodeError::OddLength {
            payload: payload.to_string(),
            len: bytes.len(),
        });
    }

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16 {
        payload: payload.to_string(),
    })
}

fn encode_run(run: &str) -> String {
    let bytes: Vec<u8> = run.encode_utf16().flat_map(u16::to_be_bytes).collect();
    let payload = STANDARD_NO_PAD
        .encode(bytes)
        .replace('/', ",")
        .replace('+', "&");
    format!("&{payload}-")
}
