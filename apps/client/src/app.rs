//! One command-line run: select, submit, show progress, print the outcome.

use std::future::Future;
use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::controller::RequestState;
use crate::models::file::ACCEPT_HINT;
use crate::models::SelectedFile;
use crate::session::{Session, SessionUpdate};
use crate::view::terminal::{render_text, LoadingBar};
use crate::view::{render, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Reported,
    Failed,
    NoFileSelected,
    Cancelled,
}

impl RunOutcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            RunOutcome::Reported => ExitCode::SUCCESS,
            RunOutcome::Failed => ExitCode::from(1),
            RunOutcome::NoFileSelected => ExitCode::from(2),
            RunOutcome::Cancelled => ExitCode::from(130),
        }
    }
}

enum Step {
    Update(Option<SessionUpdate>),
    Cancel,
}

/// Runs one analysis. `cancel` resolving while the request is in flight resets
/// the session (Ctrl-C in the binary).
pub async fn run<F, W>(session: &mut Session, args: &Cli, cancel: F, out: &mut W) -> Result<RunOutcome>
where
    F: Future<Output = ()>,
    W: Write,
{
    if let Some(path) = &args.file {
        let file = SelectedFile::from_path(path).await?;
        if !file.has_suggested_extension() {
            warn!(
                "{} is not one of the suggested formats ({}); submitting anyway",
                file.name, ACCEPT_HINT
            );
        }
        session.select_file(file);
    }

    if let Err(err) = session.submit() {
        info!("Nothing submitted: {}", err);
        write_screen(session, args, out)?;
        return Ok(RunOutcome::NoFileSelected);
    }

    let bar = if args.json || !std::io::stderr().is_terminal() {
        LoadingBar::hidden()
    } else {
        LoadingBar::new()
    };

    tokio::pin!(cancel);
    while session.is_busy() {
        let step = tokio::select! {
            update = session.next_update() => Step::Update(update),
            () = &mut cancel => Step::Cancel,
        };
        match step {
            Step::Cancel => {
                session.reset();
                bar.finish();
                writeln!(out, "Analysis cancelled.")?;
                return Ok(RunOutcome::Cancelled);
            }
            Step::Update(None) => break,
            Step::Update(Some(_)) => {
                if let Screen::Loading { loading, .. } = render(session.controller()) {
                    bar.update(&loading);
                }
            }
        }
    }
    bar.finish();

    write_screen(session, args, out)?;
    Ok(match session.controller().state() {
        RequestState::Succeeded => RunOutcome::Reported,
        _ => RunOutcome::Failed,
    })
}

fn write_screen<W: Write>(session: &Session, args: &Cli, out: &mut W) -> Result<()> {
    let controller = session.controller();
    if args.json {
        match controller.report() {
            Some(report) => serde_json::to_writer_pretty(&mut *out, report)?,
            None => serde_json::to_writer_pretty(&mut *out, &render(controller))?,
        }
        writeln!(out)?;
    } else {
        write!(out, "{}", render_text(&render(controller)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::analyzer_client::testing::ScriptedAnalyzer;
    use crate::config::ProgressTiming;
    use crate::controller::fixtures::scenario_report;
    use crate::errors::AnalysisError;
    use crate::models::Report;
    use crate::progress::testing::Sequence;

    fn cli(file: Option<std::path::PathBuf>, json: bool) -> Cli {
        Cli {
            file,
            endpoint: None,
            json,
        }
    }

    fn resume_on_disk(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, vec![b'x'; 120 * 1024]).unwrap();
        path
    }

    fn session(analyzer: Arc<ScriptedAnalyzer>) -> Session {
        Session::new(
            analyzer,
            Box::new(Sequence::constant(7.0)),
            ProgressTiming::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_prints_report() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = ScriptedAnalyzer::new(Duration::from_secs(2), Ok(scenario_report()));
        let mut session = session(analyzer.clone());
        let mut out = Vec::new();

        let outcome = run(
            &mut session,
            &cli(Some(resume_on_disk(&dir, "resume.pdf")), false),
            std::future::pending(),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(outcome, RunOutcome::Reported);
        assert_eq!(analyzer.calls(), 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("72/100"), "{text}");
        assert!(text.contains("Add a summary section"), "{text}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_json_prints_report_object() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = ScriptedAnalyzer::new(Duration::from_millis(300), Ok(scenario_report()));
        let mut session = session(analyzer);
        let mut out = Vec::new();

        run(
            &mut session,
            &cli(Some(resume_on_disk(&dir, "resume.pdf")), true),
            std::future::pending(),
            &mut out,
        )
        .await
        .unwrap();

        let parsed: Report = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, scenario_report());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_without_file_sends_nothing() {
        let analyzer = ScriptedAnalyzer::new(Duration::from_millis(10), Ok(scenario_report()));
        let mut session = session(analyzer.clone());
        let mut out = Vec::new();

        let outcome = run(&mut session, &cli(None, false), std::future::pending(), &mut out)
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::NoFileSelected);
        assert_eq!(analyzer.calls(), 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Please select a resume file"), "{text}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_reports_rejection_detail() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = ScriptedAnalyzer::new(
            Duration::from_millis(500),
            Err(AnalysisError::Rejected {
                status: 500,
                detail: "unsupported file type".to_string(),
            }),
        );
        let mut session = session(analyzer);
        let mut out = Vec::new();

        let outcome = run(
            &mut session,
            &cli(Some(resume_on_disk(&dir, "resume.rtf")), false),
            std::future::pending(),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(outcome, RunOutcome::Failed);
        assert!(session.controller().report().is_none());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unsupported file type"), "{text}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_resets_and_aborts_request() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = ScriptedAnalyzer::new(Duration::from_secs(10), Ok(scenario_report()));
        let mut session = session(analyzer.clone());
        let mut out = Vec::new();

        let outcome = run(
            &mut session,
            &cli(Some(resume_on_disk(&dir, "resume.pdf")), false),
            tokio::time::sleep(Duration::from_millis(1_300)),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(session.controller().state(), RequestState::Idle);

        // The request was aborted, so no response ever arrives.
        let late = tokio::time::timeout(Duration::from_secs(30), session.next_update()).await;
        assert!(late.is_err(), "{late:?}");
        assert_eq!(analyzer.in_flight(), 0);
        assert_eq!(analyzer.max_in_flight(), 1);
        assert!(session.controller().report().is_none());
        assert_eq!(session.controller().state(), RequestState::Idle);
    }
}
