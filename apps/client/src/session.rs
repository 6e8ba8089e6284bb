//! Session: drives an `UploadController` with real timers and a real analyzer.
//!
//! Timer ticks, request completions and hold expiries all arrive as events on one
//! channel and are applied to the controller one at a time, so the controller is
//! only ever touched from the task that owns the session. Every event carries the
//! generation it was issued for; the controller drops the ones that no longer
//! match.
//!
//! Ordering rule: the ticker task is aborted in the same call that applies a
//! settle or a reset, so no tick is produced after the request state has moved
//! on. Ticks already queued at that point are stale and change nothing.
//!
//! At most one request task exists at a time. A reset or a new submission
//! aborts the previous one, and the generation check still drops any response
//! that was already queued.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info};

use crate::analyzer_client::Analyzer;
use crate::config::ProgressTiming;
use crate::controller::{
    Generation, RequestState, SettleOutcome, SubmitOutcome, UploadController,
};
use crate::errors::AnalysisError;
use crate::models::{Report, SelectedFile};
use crate::progress::RandomSource;

#[derive(Debug)]
enum SessionEvent {
    Tick(Generation),
    Settled(Generation, Result<Report, AnalysisError>),
    HoldElapsed(Generation),
}

/// What applying one event did to the visible state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionUpdate {
    Progressed(f64),
    Settled(RequestState),
    HoldReleased,
    /// The event belonged to a reset or superseded submission.
    Stale,
}

pub struct Session {
    controller: UploadController,
    analyzer: Arc<dyn Analyzer>,
    random: Box<dyn RandomSource>,
    timing: ProgressTiming,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    request: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    hold: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        random: Box<dyn RandomSource>,
        timing: ProgressTiming,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller: UploadController::new(),
            analyzer,
            random,
            timing,
            tx,
            rx,
            request: None,
            ticker: None,
            hold: None,
        }
    }

    pub fn controller(&self) -> &UploadController {
        &self.controller
    }

    pub fn is_busy(&self) -> bool {
        self.controller.is_busy()
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.controller.select_file(file);
    }

    /// Submits the selected file. Returns `Ok(false)` when a request is already
    /// in flight and nothing new was sent.
    pub fn submit(&mut self) -> Result<bool, AnalysisError> {
        let submission = match self.controller.submit()? {
            SubmitOutcome::Started(submission) => submission,
            SubmitOutcome::AlreadyInFlight | SubmitOutcome::NotSelecting(_) => return Ok(false),
        };

        self.abort_request();
        self.stop_timers();
        self.ticker = Some(self.spawn_ticker(submission.generation));

        let analyzer = Arc::clone(&self.analyzer);
        let tx = self.tx.clone();
        let generation = submission.generation;
        self.request = Some(tokio::spawn(async move {
            let result = analyzer.analyze(&submission.file).await;
            // The session may be gone; nothing else to do with the result then.
            let _ = tx.send(SessionEvent::Settled(generation, result));
        }));
        Ok(true)
    }

    pub fn reset(&mut self) {
        self.abort_request();
        self.stop_timers();
        self.controller.reset();
    }

    #[allow(dead_code)]
    pub fn dismiss_notice(&mut self) {
        self.controller.dismiss_notice();
    }

    /// Waits for the next event and applies it. Cancel-safe: an event is either
    /// received and applied in full or left in the queue.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let event = self.rx.recv().await?;
        Some(self.apply(event))
    }

    /// Applies events until nothing is in flight and no hold is pending.
    #[cfg(test)]
    pub async fn run_until_idle(&mut self) {
        while self.is_busy() {
            if self.next_update().await.is_none() {
                break;
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> SessionUpdate {
        match event {
            SessionEvent::Tick(generation) => {
                match self.controller.tick(generation, self.random.as_mut()) {
                    Some(value) => SessionUpdate::Progressed(value),
                    None => SessionUpdate::Stale,
                }
            }
            SessionEvent::Settled(generation, result) => {
                match self.controller.settle(generation, result) {
                    SettleOutcome::Applied { state, hold } => {
                        self.request = None;
                        self.stop_timers();
                        if hold {
                            self.hold = Some(self.spawn_hold(generation));
                        }
                        SessionUpdate::Settled(state)
                    }
                    SettleOutcome::Discarded => SessionUpdate::Stale,
                }
            }
            SessionEvent::HoldElapsed(generation) => {
                if self.controller.release_hold(generation) {
                    self.hold = None;
                    SessionUpdate::HoldReleased
                } else {
                    SessionUpdate::Stale
                }
            }
        }
    }

    fn spawn_ticker(&self, generation: Generation) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let period = self.timing.tick;
        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(SessionEvent::Tick(generation)).is_err() {
                    break;
                }
            }
        })
    }

    fn spawn_hold(&self, generation: Generation) -> JoinHandle<()> {
        let tx = self.tx.clone();
        let hold = self.timing.hold;
        debug!("Holding finished progress for {}ms", hold.as_millis());
        tokio::spawn(async move {
            sleep(hold).await;
            let _ = tx.send(SessionEvent::HoldElapsed(generation));
        })
    }

    fn abort_request(&mut self) {
        if let Some(request) = self.request.take() {
            if !request.is_finished() {
                info!("Aborting in-flight analysis request");
            }
            request.abort();
        }
    }

    fn stop_timers(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        if let Some(hold) = self.hold.take() {
            info!("Cancelled pending progress hold");
            hold.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.abort_request();
        self.stop_timers();
    }
}
