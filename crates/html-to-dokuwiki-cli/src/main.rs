//! Thin integration adapter around the conversion engine.
//!
//! Stands in for the host editor's paste button: the HTML payload comes
//! from a file or stdin instead of the platform clipboard, and the
//! converted markup goes to stdout or a file instead of the caret.

use std::error::Error;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use html_to_dokuwiki_rs::{convert_clipboard, ClipboardItem, HttpUploader, MediaUploader, MemoryItem, NoUploader, HTML_TYPE};

/// Convert clipboard-flavoured HTML into DokuWiki markup.
#[derive(Debug, Parser)]
#[command(name = "html-to-dokuwiki", version, about)]
struct Cli {
    /// Input HTML file; reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write the markup here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// DokuWiki media endpoint (e.g. `https://wiki/lib/exe/ajax.php`).
    /// Without it, embedded images degrade to comment fragments.
    #[arg(long, value_name = "URL")]
    upload_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let html = read_input(cli.input.as_deref())?;

    // The file/stdin payload is presented to the engine as a one-item
    // clipboard with a single text/html representation.
    let item = MemoryItem::new().with(HTML_TYPE, html);
    let items: Vec<&dyn ClipboardItem> = vec![&item];

    let uploader: Box<dyn MediaUploader> = match cli.upload_url {
        Some(url) => Box::new(HttpUploader::new(url)),
        None => Box::new(NoUploader),
    };

    let markup = convert_clipboard(&items, uploader.as_ref()).await?;

    match cli.output {
        Some(path) => std::fs::write(path, format!("{markup}\n"))?,
        None => println!("{markup}"),
    }
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> Result<String, Box<dyn Error>> {
    match path {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}
