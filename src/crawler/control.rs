//! Line-oriented control channel
//!
//! An operator stops a running crawl by typing one of the stop tokens on
//! standard input. The listener cancels the shared token, and the engine
//! leaves its loop after the iteration in flight.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Literal lines that request a stop
pub const STOP_TOKENS: [&str; 4] = ["close", "exit", "cl", "ex"];

/// A command read from the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Stop,
}

/// Parses one control line
///
/// Matching is case-sensitive after trimming surrounding whitespace.
/// Anything that is not a stop token is ignored.
pub fn parse_command(line: &str) -> Option<ControlCommand> {
    let line = line.trim();
    STOP_TOKENS
        .contains(&line)
        .then_some(ControlCommand::Stop)
}

/// Forwards lines from standard input into a channel
///
/// Reading happens on a dedicated OS thread so a blocked read never holds
/// up runtime shutdown. The channel closes at end of input.
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    rx
}

/// Spawns a task that cancels `cancel` when a stop command arrives
///
/// The task ends after the first stop command, when `lines` closes, or when
/// the token is cancelled elsewhere. Closing the input does not stop the
/// crawl.
pub fn spawn_control_listener(
    mut lines: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.recv() => match line {
                    Some(line) => {
                        if let Some(ControlCommand::Stop) = parse_command(&line) {
                            tracing::info!("Stop command received, finishing current iteration");
                            cancel.cancel();
                            break;
                        }
                        tracing::debug!("Ignoring control input: {:?}", line);
                    }
                    None => {
                        tracing::debug!("Control input closed");
                        break;
                    }
                },
            }
        }
    })
}
