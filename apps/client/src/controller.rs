//! Upload Controller: owns the selected file, the request lifecycle and the
//! progress simulator.
//!
//! Purely synchronous: it never performs I/O. `submit` hands back a `Submission`
//! ticket and the caller performs the request, then reports the outcome through
//! `settle` with the ticket's generation. A settle, tick or hold release whose
//! generation is not the current one is discarded, which is what keeps late
//! responses and stray timer events from a reset or superseded submission out of
//! the visible state.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AnalysisError;
use crate::models::{Report, SelectedFile};
use crate::progress::{ProgressSimulator, RandomSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    #[default]
    Idle,
    Selecting,
    Submitting,
    Succeeded,
    Failed,
}

/// Identifies one submission. Bumped by every accepted `submit` and every `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Everything the caller needs to run one analysis request.
#[derive(Debug, Clone)]
pub struct Submission {
    pub generation: Generation,
    pub file: SelectedFile,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Started(Submission),
    /// A request is already in flight; nothing was sent.
    AlreadyInFlight,
    /// Submitting needs a fresh selection first (after a success or a
    /// failure); nothing was sent.
    NotSelecting(RequestState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The result was stored. `hold` asks the caller to keep the finished bar
    /// visible before calling `release_hold`.
    Applied { state: RequestState, hold: bool },
    /// The result belonged to a reset or superseded submission.
    Discarded,
}

#[derive(Debug, Default)]
pub struct UploadController {
    state: RequestState,
    file: Option<SelectedFile>,
    report: Option<Report>,
    failure: Option<AnalysisError>,
    blocking: Option<AnalysisError>,
    progress: ProgressSimulator,
    generation: u64,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// The dismissible failure notice, if one is showing.
    pub fn failure(&self) -> Option<&AnalysisError> {
        self.failure.as_ref()
    }

    /// The blocking message raised by submitting without a file.
    pub fn blocking_message(&self) -> Option<&AnalysisError> {
        self.blocking.as_ref()
    }

    pub fn progress(&self) -> &ProgressSimulator {
        &self.progress
    }

    #[cfg(test)]
    pub fn generation(&self) -> Generation {
        Generation(self.generation)
    }

    /// The primary action is live only while a freshly chosen file waits.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && self.state == RequestState::Selecting
    }

    /// True while a request is in flight or the finished bar is still on hold.
    pub fn is_busy(&self) -> bool {
        self.state == RequestState::Submitting || !self.progress.is_idle()
    }

    // ── transitions ─────────────────────────────────────────────────────────

    /// Replaces the selected file. Outside of a submission this also moves to
    /// `Selecting` and clears any notice; a previous report stays visible until
    /// the next submit.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!("Selected {} ({})", file.name, file.size_label());
        self.file = Some(file);
        self.blocking = None;
        if self.state != RequestState::Submitting {
            self.failure = None;
            self.state = RequestState::Selecting;
        }
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome, AnalysisError> {
        if self.state == RequestState::Submitting {
            debug!("Submit ignored: generation {} still in flight", self.generation);
            return Ok(SubmitOutcome::AlreadyInFlight);
        }
        let Some(file) = self.file.clone() else {
            self.blocking = Some(AnalysisError::NoFileSelected);
            return Err(AnalysisError::NoFileSelected);
        };
        if self.state != RequestState::Selecting {
            debug!("Submit ignored in {:?}: select a file first", self.state);
            return Ok(SubmitOutcome::NotSelecting(self.state));
        }

        self.generation += 1;
        self.state = RequestState::Submitting;
        self.report = None;
        self.failure = None;
        self.blocking = None;
        self.progress.start();

        info!(
            "Submitting {} ({} bytes) as generation {}",
            file.name,
            file.size(),
            self.generation
        );
        Ok(SubmitOutcome::Started(Submission {
            generation: Generation(self.generation),
            file,
        }))
    }

    /// Applies one simulator tick for `generation`. Returns the new value, or
    /// `None` when the tick is stale.
    pub fn tick(&mut self, generation: Generation, random: &mut dyn RandomSource) -> Option<f64> {
        if !self.is_current(generation) || self.state != RequestState::Submitting {
            return None;
        }
        self.progress.tick(random)
    }

    /// Stores the outcome of the request identified by `generation`.
    ///
    /// Success keeps the bar at 100% for a display hold; failures skip the hold
    /// and surface the notice immediately.
    pub fn settle(
        &mut self,
        generation: Generation,
        result: Result<Report, AnalysisError>,
    ) -> SettleOutcome {
        if !self.is_current(generation) || self.state != RequestState::Submitting {
            warn!(
                "Discarding response for generation {} (current {}, state {:?})",
                generation.0, self.generation, self.state
            );
            return SettleOutcome::Discarded;
        }

        self.progress.complete();
        match result {
            Ok(report) => {
                info!("Analysis succeeded with score {}", report.score);
                self.report = Some(report);
                self.state = RequestState::Succeeded;
                SettleOutcome::Applied {
                    state: self.state,
                    hold: true,
                }
            }
            Err(err) => {
                warn!("Analysis failed [{}]: {}", err.code(), err);
                self.progress.finish_hold();
                self.failure = Some(err);
                self.state = RequestState::Failed;
                SettleOutcome::Applied {
                    state: self.state,
                    hold: false,
                }
            }
        }
    }

    /// Ends the display hold that followed a successful settle.
    pub fn release_hold(&mut self, generation: Generation) -> bool {
        self.is_current(generation) && self.progress.finish_hold()
    }

    /// Back to `Idle` from anywhere. Any in-flight request is orphaned: its
    /// generation is no longer current, so its response will be discarded.
    pub fn reset(&mut self) {
        if self.state == RequestState::Submitting {
            info!("Reset while generation {} in flight", self.generation);
        }
        self.generation += 1;
        self.progress.stop();
        self.file = None;
        self.report = None;
        self.failure = None;
        self.blocking = None;
        self.state = RequestState::Idle;
    }

    /// Dismisses the failure notice or blocking message without changing state.
    pub fn dismiss_notice(&mut self) {
        self.failure = None;
        self.blocking = None;
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }
}
