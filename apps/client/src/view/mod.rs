//! Report View: a pure projection from controller state to what the user sees.
//!
//! `render` reads the controller and builds a `Screen`; it performs no I/O and
//! never changes state. Output formats (terminal text, JSON) consume the
//! `Screen`, not the controller.

pub mod terminal;

use serde::Serialize;

use crate::controller::{RequestState, UploadController};
use crate::models::file::{ACCEPT_HINT, FORMAT_HINT};
use crate::models::{Report, SelectedFile};
use crate::progress::{active_label, project_milestones, Milestone, MilestoneStatus};

pub const FOOTER: &str =
    "Designed to give general guidance — for best results, pair with human review";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Good,
    Warning,
    Poor,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            s if s >= 80 => ScoreBand::Good,
            s if s >= 60 => ScoreBand::Warning,
            _ => ScoreBand::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Warning => "warning",
            ScoreBand::Poor => "poor",
        }
    }

    pub fn color_hex(&self) -> &'static str {
        match self {
            ScoreBand::Good => "#10b981",
            ScoreBand::Warning => "#f59e0b",
            ScoreBand::Poor => "#ef4444",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size_label: String,
}

impl From<&SelectedFile> for FileSummary {
    fn from(file: &SelectedFile) -> Self {
        Self {
            name: file.name.clone(),
            size_label: file.size_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    pub submit_enabled: bool,
    pub reset_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView {
    pub file: Option<FileSummary>,
    pub accept: &'static str,
    pub format_hint: &'static str,
    /// Shown after a submit attempt without a file.
    pub blocking_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneView {
    pub label: &'static str,
    pub status: MilestoneStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadingView {
    pub file: Option<FileSummary>,
    pub percent: u8,
    /// Label of the milestone in progress, if any.
    pub active_step: Option<&'static str>,
    pub milestones: Vec<MilestoneView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRow {
    pub key: &'static str,
    pub label: &'static str,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportCard {
    pub score: u8,
    pub band: ScoreBand,
    pub color: &'static str,
    /// Filled portion of the score ring.
    pub arc_degrees: f64,
    pub sections: Vec<SectionRow>,
    pub sections_present: usize,
    pub metrics: Vec<MetricRow>,
    /// `None` when there is nothing to suggest; the block is omitted entirely.
    pub suggestions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureNotice {
    pub code: &'static str,
    pub message: String,
    pub dismissible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Screen {
    Selection {
        selection: SelectionView,
        /// A report from an earlier submission stays visible while choosing a new file.
        previous_report: Option<ReportCard>,
        controls: Controls,
    },
    Loading {
        loading: LoadingView,
        controls: Controls,
    },
    Report {
        selection: SelectionView,
        report: ReportCard,
        controls: Controls,
    },
    Failure {
        selection: SelectionView,
        notice: Option<FailureNotice>,
        controls: Controls,
    },
}

/// Display labels in `SectionChecklist::entries` order.
const SECTION_LABELS: [&str; 5] = [
    "Contact Information",
    "Summary/Objective",
    "Skills",
    "Work Experience",
    "Education",
];

pub fn render(controller: &UploadController) -> Screen {
    let controls = Controls {
        submit_enabled: controller.can_submit(),
        reset_enabled: true,
    };
    let selection = selection_view(controller);

    // The finished bar stays up through the display hold, even though the
    // request has already settled.
    if let Some(value) = controller.progress().value() {
        return Screen::Loading {
            loading: loading_view(controller, value),
            controls: Controls {
                submit_enabled: false,
                reset_enabled: true,
            },
        };
    }

    match controller.state() {
        RequestState::Idle | RequestState::Selecting => Screen::Selection {
            selection,
            previous_report: controller.report().map(report_card),
            controls,
        },
        RequestState::Submitting => Screen::Loading {
            loading: loading_view(controller, 0.0),
            controls,
        },
        RequestState::Succeeded => match controller.report() {
            Some(report) => Screen::Report {
                selection,
                report: report_card(report),
                controls,
            },
            None => Screen::Selection {
                selection,
                previous_report: None,
                controls,
            },
        },
        RequestState::Failed => Screen::Failure {
            selection,
            notice: controller.failure().map(|err| FailureNotice {
                code: err.code(),
                message: err.user_message(),
                dismissible: !err.is_blocking(),
            }),
            controls,
        },
    }
}

pub fn report_card(report: &Report) -> ReportCard {
    let sections = report
        .sections
        .entries()
        .into_iter()
        .zip(SECTION_LABELS)
        .map(|((key, present), label)| SectionRow { key, label, present })
        .collect();

    let metrics = vec![
        MetricRow {
            label: "Action Verbs",
            value: report.action_verb_count.to_string(),
        },
        MetricRow {
            label: "Total Words",
            value: report.token_count.to_string(),
        },
        MetricRow {
            label: "Readability Score",
            value: format!("{}/100", report.readability_score),
        },
    ];

    let band = ScoreBand::for_score(report.score);
    ReportCard {
        score: report.score,
        band,
        color: band.color_hex(),
        arc_degrees: f64::from(report.score) / 100.0 * 360.0,
        sections,
        sections_present: report.sections.present_count(),
        metrics,
        suggestions: (!report.suggestions.is_empty()).then(|| report.suggestions.clone()),
    }
}

fn selection_view(controller: &UploadController) -> SelectionView {
    SelectionView {
        file: controller.selected_file().map(FileSummary::from),
        accept: ACCEPT_HINT,
        format_hint: FORMAT_HINT,
        blocking_message: controller.blocking_message().map(|e| e.user_message()),
    }
}

fn loading_view(controller: &UploadController, value: f64) -> LoadingView {
    LoadingView {
        file: controller.selected_file().map(FileSummary::from),
        percent: value.floor().clamp(0.0, 100.0) as u8,
        active_step: active_label(value),
        milestones: project_milestones(value)
            .into_iter()
            .map(|(Milestone { label, .. }, status)| MilestoneView { label, status })
            .collect(),
    }
}
