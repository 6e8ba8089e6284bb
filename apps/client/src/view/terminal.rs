//! Terminal output for rendered screens.

use std::fmt::Write;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use super::{
    FailureNotice, LoadingView, ReportCard, Screen, ScoreBand, SelectionView, FOOTER,
};
use crate::progress::MilestoneStatus;

/// Formats a screen as plain terminal text (with ANSI colors when enabled).
pub fn render_text(screen: &Screen) -> String {
    let mut out = String::new();
    match screen {
        Screen::Selection {
            selection,
            previous_report,
            ..
        } => {
            write_selection(&mut out, selection);
            if let Some(card) = previous_report {
                out.push('\n');
                write_report(&mut out, card);
            }
        }
        Screen::Loading { loading, .. } => write_loading(&mut out, loading),
        Screen::Report { report, .. } => write_report(&mut out, report),
        Screen::Failure {
            selection, notice, ..
        } => {
            if let Some(notice) = notice {
                write_notice(&mut out, notice);
            }
            write_selection(&mut out, selection);
        }
    }
    out
}

fn write_selection(out: &mut String, selection: &SelectionView) {
    match &selection.file {
        Some(file) => {
            let _ = writeln!(out, "{} ({})", file.name.bold(), file.size_label);
        }
        None => {
            let _ = writeln!(
                out,
                "Choose your resume file ({})",
                selection.format_hint
            );
        }
    }
    if let Some(message) = &selection.blocking_message {
        let _ = writeln!(out, "{}", message.red().bold());
    }
}

fn write_loading(out: &mut String, loading: &LoadingView) {
    let target = loading.file.as_ref().map_or("resume", |f| f.name.as_str());
    let _ = writeln!(out, "Analyzing {target}... {}%", loading.percent);
    for milestone in &loading.milestones {
        let mark = match milestone.status {
            MilestoneStatus::Completed => "✔".green(),
            MilestoneStatus::Active => "…".yellow(),
            MilestoneStatus::Pending => "·".dimmed(),
        };
        let _ = writeln!(out, "  {mark} {}", milestone.label);
    }
}

fn write_notice(out: &mut String, notice: &FailureNotice) {
    let _ = writeln!(out, "{} {}", "Error:".red().bold(), notice.message);
}

fn write_report(out: &mut String, card: &ReportCard) {
    let _ = writeln!(
        out,
        "Overall Resume Score: {} ({})",
        banded(&format!("{}/100", card.score), card.band),
        card.band.as_str()
    );

    let _ = writeln!(
        out,
        "\n{} ({}/{} present)",
        "Resume Sections".bold(),
        card.sections_present,
        card.sections.len()
    );
    for row in &card.sections {
        let mark = if row.present {
            "✔ present".green()
        } else {
            "✘ missing".red()
        };
        let _ = writeln!(out, "  {:<22}{mark}", row.label);
    }

    let _ = writeln!(out, "\n{}", "Content Metrics".bold());
    for metric in &card.metrics {
        let _ = writeln!(out, "  {:<22}{}", metric.label, metric.value);
    }

    if let Some(suggestions) = &card.suggestions {
        let _ = writeln!(out, "\n{}", "Improvement Suggestions".bold());
        for (idx, suggestion) in suggestions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {suggestion}", idx + 1);
        }
    }

    let _ = writeln!(out, "\n{}", FOOTER.dimmed());
}

fn banded(text: &str, band: ScoreBand) -> ColoredString {
    match band {
        ScoreBand::Good => text.green().bold(),
        ScoreBand::Warning => text.yellow().bold(),
        ScoreBand::Poor => text.red().bold(),
    }
}

/// Live progress bar for the loading screen.
pub struct LoadingBar {
    bar: ProgressBar,
}

impl LoadingBar {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(100))
    }

    /// A bar that draws nothing; used when stderr is not a terminal.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_length(100);
        let style = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{wide_bar:.cyan/blue}] {pos}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar }
    }

    pub fn update(&self, loading: &LoadingView) {
        self.bar.set_position(u64::from(loading.percent));
        let step = loading.active_step.unwrap_or("Analyzing resume");
        self.bar.set_message(step.to_string());
    }

    #[cfg(test)]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for LoadingBar {
    fn default() -> Self {
        Self::new()
    }
}
