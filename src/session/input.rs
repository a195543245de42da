use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// A single user action inside an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Tap,
    Undo,
    Quit,
}

impl SessionEvent {
    /// Maps one line of session input. Unrecognized input maps to nothing.
    fn parse(line: &str) -> Option<SessionEvent> {
        match line.trim() {
            "" | "+" | "t" | "tap" => Some(SessionEvent::Tap),
            "-" | "u" | "undo" => Some(SessionEvent::Undo),
            "q" | "quit" | "exit" => Some(SessionEvent::Quit),
            _ => None,
        }
    }
}

/// Reads session commands from the console and forwards them as events.
pub struct InputCollector {
    next: mpsc::Sender<SessionEvent>,
    shutdown: CancellationToken,
}

impl InputCollector {
    pub fn new(next: mpsc::Sender<SessionEvent>, shutdown: CancellationToken) -> Self {
        Self { next, shutdown }
    }

    /// Executes the collector event loop. Ends when input closes, the session
    /// stops listening, or the session is cancelled.
    pub async fn run(self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        return Ok(());
                    };
                    match SessionEvent::parse(&line) {
                        Some(event) => {
                            debug!("Sending event {event:?}");
                            if self.next.send(event).await.is_err() {
                                error!("Session stopped receiving events");
                                return Ok(());
                            }
                        }
                        None => println!("Commands: Enter or + to tap, - to undo, q to quit"),
                    }
                }
            }
        }
    }
}
