//! SELECT command handler.
//!
//! Opens a folder and responds with metadata. The key pieces are:
//!
//! - `* N EXISTS` -- total number of messages in the folder.
//! - `* OK [UIDVALIDITY V]` -- a value that changes if the folder's
//!   UID space is reset.
//!
//! Folder names are matched in wire form, so a client that forgets to
//! encode a non-ASCII name gets `NO Folder not found`.

use crate::fake_imap::io::{respond, write_line};
use crate::fake_imap::mailbox::Mailbox;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the SELECT command. Returns the selected folder name.
pub async fn handle_select<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    folder_name: &str,
    mailbox: &Mailbox,
    stream: &mut BufReader<S>,
) -> Option<String> {
    let Some(folder) = mailbox.get_folder(folder_name) else {
        let _ = respond(stream, tag, "NO Folder not found").await;
        return None;
    };

    // RFC 3501 Section 6.3.1: required FLAGS, EXISTS and RECENT
    let _ = write_line(
        stream,
        "* FLAGS (\\Seen \\Answered \\Flagged \\Deleted \\Draft)\r\n",
    )
    .await;
    let exists = format!("* {} EXISTS\r\n", folder.emails.len());
    let _ = write_line(stream, &exists).await;
    let _ = write_line(stream, "* 0 RECENT\r\n").await;

    let _ = write_line(stream, "* OK [UIDVALIDITY 1]\r\n").await;

    let uidnext = folder
        .emails
        .iter()
        .map(|e| e.uid)
        .max()
        .map_or(1, |max| max + 1);
    let _ = write_line(stream, &format!("* OK [UIDNEXT {uidnext}]\r\n")).await;

    let _ = respond(stream, tag, "OK [READ-WRITE] SELECT completed").await;
    Some(folder_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    fn make_raw_email() -> Vec<u8> {
        b"From: a@b.com\r\nSubject: Test\r\n\r\nBody".to_vec()
    }

    async fn run(tag: &str, folder_name: &str, mailbox: &Mailbox) -> (String, Option<String>) {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        let selected = handle_select(tag, folder_name, mailbox, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        (String::from_utf8(buf).unwrap(), selected)
    }

    #[tokio::test]
    async fn selects_existing_folder() {
        let raw = make_raw_email();
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(1, &raw)
            .email(2, &raw)
            .build();

        let (output, selected) = run("A1", "INBOX", &mailbox).await;

        assert_eq!(selected, Some("INBOX".to_string()));
        assert!(output.contains("* 2 EXISTS"));
        assert!(output.contains("UIDVALIDITY"));
        assert!(output.contains("* OK [UIDNEXT 3]"));
        assert!(output.contains("A1 OK"));
    }

    #[tokio::test]
    async fn returns_none_for_missing_folder() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let (output, selected) = run("A1", "NoSuchFolder", &mailbox).await;

        assert!(selected.is_none());
        assert!(output.contains("A1 NO Folder not found"));
    }

    #[tokio::test]
    async fn matches_wire_form_only() {
        let mailbox = MailboxBuilder::new()
            .folder("Elk&APw-ld&APY-tt levelek")
            .build();

        let (_, encoded) = run("A1", "Elk&APw-ld&APY-tt levelek", &mailbox).await;
        let (output, raw) = run("A2", "Elküldött levelek", &mailbox).await;

        assert!(encoded.is_some());
        assert!(raw.is_none());
        assert!(output.contains("A2 NO"));
    }
}
