use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    app::AppState,
    storage::blob_store::{BlobStore, FileBlobStore},
    utils::{
        clock::{Clock, DefaultClock},
        time::date_to_readable,
        units::format_count,
    },
};

use input::{InputCollector, SessionEvent};

pub mod input;
pub mod shutdown;

/// How often the session re-reads the calendar date. Rollover is detected at
/// the first check after midnight, not at midnight itself.
const ROLLOVER_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Represents the starting point for an interactive tap session.
pub async fn start_session(dir: PathBuf) -> Result<()> {
    let clock = DefaultClock;
    let blobs = FileBlobStore::new(dir)?;
    let state = AppState::load(blobs, clock.today()).await?;

    let shutdown_token = CancellationToken::new();
    let (sender, receiver) = mpsc::channel::<SessionEvent>(10);

    let collector = InputCollector::new(sender, shutdown_token.clone());
    let session = SessionLoop::new(state, receiver, shutdown_token.clone(), Box::new(clock));

    let (_, collector_result, session_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        collector.run(),
        session.run(),
    );

    if let Err(collector_result) = collector_result {
        error!("Input collector got an error {:?}", collector_result);
    }

    session_result?;
    Ok(())
}

/// Owns the application state for the duration of a session: applies tap
/// events as they arrive and keeps the active day in sync with the clock.
pub struct SessionLoop<S: BlobStore> {
    state: AppState<S>,
    receiver: mpsc::Receiver<SessionEvent>,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
}

impl<S: BlobStore> SessionLoop<S> {
    pub fn new(
        state: AppState<S>,
        receiver: mpsc::Receiver<SessionEvent>,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            state,
            receiver,
            shutdown,
            clock,
        }
    }

    /// Executes the session event loop. Returns the final state so callers
    /// can inspect it after shutdown.
    pub async fn run(mut self) -> Result<AppState<S>> {
        self.print_banner();
        let mut poll_point = self.clock.instant() + ROLLOVER_POLL_INTERVAL;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = self.receiver.recv() => {
                    match event {
                        None | Some(SessionEvent::Quit) => break,
                        Some(event) => self.apply(event).await,
                    }
                }
                _ = self.clock.sleep_until(poll_point) => {
                    poll_point += ROLLOVER_POLL_INTERVAL;
                    self.check_rollover();
                }
            }
        }

        self.receiver.close();
        // Lets the collector and the signal listener wind down as well.
        self.shutdown.cancel();
        Ok(self.state)
    }

    async fn apply(&mut self, event: SessionEvent) {
        let delta = match event {
            SessionEvent::Tap => 1,
            SessionEvent::Undo => -1,
            // Handled by the loop itself.
            SessionEvent::Quit => return,
        };
        match self.state.record(delta).await {
            Ok(count) => println!("{}", format_count(count, self.state.settings())),
            Err(e) => error!("Error persisting tap {e:?}"),
        }
    }

    fn check_rollover(&mut self) {
        if !self.clock.has_rolled_over(self.state.today()) {
            return;
        }
        let today = self.clock.today();
        if self.state.roll_to(today) {
            println!();
            println!("A new day: {}", date_to_readable(today));
            println!(
                "{}",
                format_count(self.state.todays_count(), self.state.settings())
            );
        }
    }

    fn print_banner(&self) {
        println!("TapTrack session - {}", date_to_readable(self.state.today()));
        println!("Enter or + to tap, - to undo, q to quit");
        println!("{}", format_count(self.state.todays_count(), self.state.settings()));
    }
}
