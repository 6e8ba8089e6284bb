use serde::Serialize;

use super::COMPLETE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Active,
    Completed,
}

/// A named step shown under the progress bar. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub label: &'static str,
    /// The milestone lights up once the value is strictly above this threshold.
    /// The final milestone uses 100 and lights up only at exactly 100.
    pub threshold: u8,
}

pub const MILESTONES: [Milestone; 5] = [
    Milestone { label: "Uploading resume", threshold: 10 },
    Milestone { label: "Extracting text", threshold: 30 },
    Milestone { label: "Analyzing sections", threshold: 60 },
    Milestone { label: "Scoring content", threshold: 85 },
    Milestone { label: "Preparing suggestions", threshold: 100 },
];

fn reached(milestone: &Milestone, value: f64) -> bool {
    if f64::from(milestone.threshold) >= COMPLETE {
        value >= COMPLETE
    } else {
        value > f64::from(milestone.threshold)
    }
}

/// Projects a progress value onto the milestone list. A milestone is completed
/// once the next one has been reached, active while it is the latest reached,
/// and pending before that. Every status only moves forward as the value grows.
pub fn project_milestones(value: f64) -> Vec<(Milestone, MilestoneStatus)> {
    MILESTONES
        .iter()
        .enumerate()
        .map(|(idx, milestone)| {
            let next_reached = MILESTONES
                .get(idx + 1)
                .map_or(value >= COMPLETE, |next| reached(next, value));
            let status = if next_reached {
                MilestoneStatus::Completed
            } else if reached(milestone, value) {
                MilestoneStatus::Active
            } else {
                MilestoneStatus::Pending
            };
            (*milestone, status)
        })
        .collect()
}

/// Label of the milestone currently in progress, if any.
pub fn active_label(value: f64) -> Option<&'static str> {
    project_milestones(value)
        .into_iter()
        .find(|(_, status)| *status == MilestoneStatus::Active)
        .map(|(m, _)| m.label)
}

#[cfg(test)]
mod tests {
    use super::MilestoneStatus::{Active as A, Completed as C, Pending as P};
    use super::*;

    fn statuses(value: f64) -> Vec<MilestoneStatus> {
        project_milestones(value).into_iter().map(|(_, s)| s).collect()
    }

    #[test]
    fn test_all_pending_at_start() {
        assert_eq!(statuses(0.0), vec![P, P, P, P, P]);
        assert_eq!(statuses(10.0), vec![P, P, P, P, P]);
        assert_eq!(active_label(0.0), None);
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(statuses(10.5), vec![A, P, P, P, P]);
        assert_eq!(statuses(30.0), vec![A, P, P, P, P]);
        assert_eq!(statuses(31.0), vec![C, A, P, P, P]);
        assert_eq!(statuses(61.0), vec![C, C, A, P, P]);
        assert_eq!(statuses(89.5), vec![C, C, C, A, P]);
        assert_eq!(active_label(42.0), Some("Extracting text"));
    }

    #[test]
    fn test_all_completed_at_hundred() {
        assert_eq!(statuses(100.0), vec![C, C, C, C, C]);
        assert_eq!(active_label(100.0), None);
    }

    #[test]
    fn test_statuses_never_regress() {
        let rank = |s: MilestoneStatus| match s {
            P => 0,
            A => 1,
            C => 2,
        };
        let mut previous = statuses(0.0);
        for step in 1..=200 {
            let current = statuses(f64::from(step) * 0.5);
            for (before, after) in previous.iter().zip(&current) {
                assert!(rank(*after) >= rank(*before), "regressed at {}", step);
            }
            previous = current;
        }
    }
}
