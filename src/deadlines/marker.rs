//! Colors of the calendar markers

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use chrono::NaiveDate;
use csscolorparser::Color;

use crate::deadlines::DeadlineMap;
use crate::task::{TaskId, TaskStatus};
use crate::theme::ThemeColors;

/// How the marker of a date with deadlines is colored
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerPolicy {
    /// A date with at least one completed task uses the "done" color
    StatusAware,
    /// Every date uses the "pending" color, regardless of task statuses
    AlwaysPending,
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        MarkerPolicy::StatusAware
    }
}

impl FromStr for MarkerPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" | "status-aware" => Ok(MarkerPolicy::StatusAware),
            "pending" | "always-pending" => Ok(MarkerPolicy::AlwaysPending),
            other => Err(format!("Unknown marker policy {:?}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerColors {
    pub pending: Color,
    pub done: Color,
}

impl MarkerColors {
    pub fn from_theme(colors: &ThemeColors) -> Self {
        Self {
            pending: colors.primary.clone(),
            done: colors.secondary.clone(),
        }
    }

    /// The color of the marker for `date`.
    ///
    /// `statuses` is the latest known status of each task. Tasks that are missing from it count as pending.
    pub fn marker_color(&self, policy: MarkerPolicy, map: &DeadlineMap, date: NaiveDate, statuses: &HashMap<TaskId, TaskStatus>) -> Color {
        if policy == MarkerPolicy::AlwaysPending {
            return self.pending.clone();
        }

        let any_done = map.tasks_for(date).iter()
            .any(|id| statuses.get(id).map(|s| s.is_completed()).unwrap_or(false));
        if any_done {
            self.done.clone()
        } else {
            self.pending.clone()
        }
    }

    /// The marker color of every date that has deadlines
    pub fn markers(&self, policy: MarkerPolicy, map: &DeadlineMap, statuses: &HashMap<TaskId, TaskStatus>) -> BTreeMap<NaiveDate, Color> {
        map.dates()
            .map(|date| (*date, self.marker_color(policy, map, *date, statuses)))
            .collect()
    }
}

impl Default for MarkerColors {
    fn default() -> Self {
        Self::from_theme(&ThemeColors::default())
    }
}
