#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for reading an IMAP folder (read-only)

use clap::{Parser, Subcommand};
use mailbox_reader::{
    ConsoleSink, FolderName, ImapConfig, JsonSink, MailboxClient, ReadSummary, utf7,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mailbox-reader")]
#[command(about = "Read-only IMAP folder reader")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print every message in a folder
    Messages {
        /// Folder to read (default: IMAP_FOLDER, else INBOX)
        #[arg(long)]
        folder: Option<String>,

        /// The folder name contains non-ASCII characters; encode it
        /// to modified UTF-7 before selecting
        #[arg(long)]
        utf7: bool,
    },

    /// List available IMAP folders
    Folders,

    /// Encode a folder name to modified UTF-7 (offline)
    Encode {
        /// Display folder name
        name: String,
    },

    /// Decode a modified UTF-7 folder name (offline)
    Decode {
        /// Wire folder name
        name: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match &args.command {
        Command::Encode { name } => {
            println!("{}", utf7::encode(name));
        }
        Command::Decode { name } => {
            println!("{}", utf7::decode(name)?);
        }
        Command::Messages { folder, utf7 } => {
            let client = MailboxClient::new(ImapConfig::from_env()?);
            cmd_messages(&client, &args, folder.as_deref(), *utf7).await?;
        }
        Command::Folders => {
            let client = MailboxClient::new(ImapConfig::from_env()?);
            cmd_folders(&client, &args).await?;
        }
    }

    Ok(())
}

async fn cmd_messages(
    client: &MailboxClient,
    args: &Args,
    folder: Option<&str>,
    encode: bool,
) -> anyhow::Result<()> {
    let name = folder.unwrap_or(&client.config().folder);
    let folder = if encode {
        FolderName::display(name)
    } else {
        FolderName::wire(name)
    };

    let summary = if args.json {
        client.read_folder(&folder, &mut JsonSink::stdout()).await?
    } else {
        client.read_folder(&folder, &mut ConsoleSink::stdout()).await?
    };

    if !args.json {
        print_summary(&folder, summary);
    }

    Ok(())
}

async fn cmd_folders(client: &MailboxClient, args: &Args) -> anyhow::Result<()> {
    let entries = client.list_folders().await?;

    if args.json {
        let rows: Vec<serde_json::Value> = entries
            .iter()
            .map(|entry| match entry {
                Ok(name) => serde_json::json!({ "name": name.as_str() }),
                Err(bad) => serde_json::json!({
                    "raw": bad.raw,
                    "error": bad.source.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for entry in &entries {
            match entry {
                Ok(name) => println!("{name}"),
                Err(bad) => println!("{} (undecodable: {})", bad.raw, bad.source),
            }
        }
    }

    Ok(())
}

fn print_summary(folder: &FolderName, summary: ReadSummary) {
    println!(
        "\n{} message(s) read from {}, {} skipped",
        summary.rendered, folder, summary.skipped
    );
}
