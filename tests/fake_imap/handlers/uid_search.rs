//! UID SEARCH command handler.
//!
//! The reader only ever asks for `ALL`, so that is the only key the
//! fake server evaluates. Anything else is refused with `NO`, which
//! also lets tests drive the search-failure path.
//!
//! The response format (RFC 3501 Section 7.2.5):
//!
//! ```text
//! * SEARCH 1 2 3
//! A0003 OK SEARCH completed
//! ```

use crate::fake_imap::io::{respond, write_line};
use crate::fake_imap::mailbox::Mailbox;
use imap_codec::imap_types::search::SearchKey;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle the UID SEARCH command. Returns every UID in the selected
/// folder, in stored order.
pub async fn handle_uid_search<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    criteria: &[SearchKey<'_>],
    mailbox: &Mailbox,
    selected_folder: Option<&str>,
    stream: &mut BufReader<S>,
) {
    let Some(folder_name) = selected_folder else {
        let _ = respond(stream, tag, "BAD No folder selected").await;
        return;
    };

    let Some(folder) = mailbox.get_folder(folder_name) else {
        let _ = respond(stream, tag, "BAD Folder not found").await;
        return;
    };

    if !criteria.iter().all(|key| matches!(key, SearchKey::All)) {
        let _ = respond(stream, tag, "NO Unsupported search criteria").await;
        return;
    }

    // An empty folder still gets a bare "* SEARCH".
    let uids: String = folder
        .emails
        .iter()
        .map(|e| format!(" {}", e.uid))
        .collect();
    let search_line = format!("* SEARCH{uids}\r\n");
    let _ = write_line(stream, &search_line).await;
    let _ = respond(stream, tag, "OK SEARCH completed").await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    fn make_raw_email() -> Vec<u8> {
        b"From: a@b.com\r\nSubject: Test\r\n\r\nBody".to_vec()
    }

    async fn run(
        tag: &str,
        criteria: &[SearchKey<'_>],
        mailbox: &Mailbox,
        selected: Option<&str>,
    ) -> String {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        handle_uid_search(tag, criteria, mailbox, selected, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn search_all_returns_all_uids() {
        let raw = make_raw_email();
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(1, &raw)
            .broken_email(2, &raw)
            .email(5, &raw)
            .build();

        let output = run("A1", &[SearchKey::All], &mailbox, Some("INBOX")).await;

        assert!(output.contains("* SEARCH 1 2 5\r\n"));
        assert!(output.contains("A1 OK SEARCH completed"));
    }

    #[tokio::test]
    async fn other_criteria_are_refused() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let output = run("A1", &[SearchKey::Unseen], &mailbox, Some("INBOX")).await;

        assert!(output.contains("A1 NO Unsupported search criteria"));
        assert!(!output.contains("* SEARCH"));
    }

    #[tokio::test]
    async fn no_folder_selected_returns_bad() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let output = run("A1", &[SearchKey::All], &mailbox, None).await;

        assert!(output.contains("A1 BAD No folder selected"));
    }

    #[tokio::test]
    async fn missing_folder_returns_bad() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let output = run("A1", &[SearchKey::All], &mailbox, Some("Gone")).await;

        assert!(output.contains("A1 BAD Folder not found"));
    }

    #[tokio::test]
    async fn empty_folder_returns_empty_search() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let output = run("A1", &[SearchKey::All], &mailbox, Some("INBOX")).await;

        assert!(output.contains("* SEARCH\r\n"));
        assert!(output.contains("A1 OK SEARCH completed"));
    }
}
