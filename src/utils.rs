//! Some utility functions

use std::collections::BTreeMap;

use chrono::NaiveDate;
use csscolorparser::Color;

use crate::deadlines::{DeadlineMap, DATE_FORMAT};
use crate::task::Task;

/// A debug utility that pretty-prints a task, and its deadline
pub fn print_task(task: &Task, deadline: Option<NaiveDate>) {
    println!("{}", format_task(task, deadline));
}

pub fn format_task(task: &Task, deadline: Option<NaiveDate>) -> String {
    let completion = if task.completed() { "✓" } else { " " };
    let due = match deadline {
        Some(date) => format!(" (due {})", date.format(DATE_FORMAT)),
        None => String::new(),
    };
    format!("    {} {}\t{}{}", completion, task.id(), task.title(), due)
}

/// A debug utility that pretty-prints every task, in the order of their deadlines
pub fn print_task_list(tasks: &[Task], deadlines: &DeadlineMap) {
    let mut sorted: Vec<(Option<NaiveDate>, &Task)> = tasks.iter()
        .map(|t| (deadlines.deadline_for(t.id()), t))
        .collect();
    // Tasks without a deadline go last
    sorted.sort_by_key(|(date, _)| (date.is_none(), *date));
    for (date, task) in sorted {
        print_task(task, date);
    }
}

/// A debug utility that pretty-prints a deadline map, with the colors of its calendar markers
pub fn print_deadline_map(deadlines: &DeadlineMap, markers: &BTreeMap<NaiveDate, Color>) {
    for (date, ids) in deadlines.iter() {
        let color = markers.get(date).map(|c| c.to_hex_string()).unwrap_or_default();
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        println!("{} {}\t{}", date.format(DATE_FORMAT), color, ids.join(", "));
    }
}
