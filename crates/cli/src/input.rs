//! Terminal input — stdin lines delivered over a channel.
//!
//! The reader runs as its own task so the chat loop can await provider
//! replies without blocking on the terminal.

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

/// Lines that end the interactive session.
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

pub fn is_exit(line: &str) -> bool {
    EXIT_COMMANDS.contains(&line)
}

/// Read trimmed, non-empty lines from stdin until EOF or an exit command.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    spawn_reader(BufReader::new(io::stdin()))
}

/// Feed lines from `reader` into a channel; the channel closes on EOF,
/// an exit command, a read error, or when the receiver is dropped.
pub fn spawn_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if is_exit(line) {
                        break;
                    }
                    if tx.send(line.to_string()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read from stdin");
                    break;
                }
            }
        }
    });

    rx
}
