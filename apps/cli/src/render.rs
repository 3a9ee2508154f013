use std::fmt::Write as _;

use rust_decimal::prelude::ToPrimitive;
use savetrack_core::goals::{format_currency, Goal, GoalSummary, SortCriteria};

const BAR_WIDTH: u32 = 15;

fn sort_label(criteria: &SortCriteria) -> String {
    criteria.to_string().replace('_', " ").to_uppercase()
}

fn progress_cell(goal: &Goal) -> String {
    let percent = goal.progress_percent().floor().to_u32().unwrap_or(0);
    let filled = (percent * BAR_WIDTH / 100) as usize;
    let empty = BAR_WIDTH as usize - filled;
    format!("[{}{}] {percent}%", "#".repeat(filled), "-".repeat(empty))
}

/// Renders goals as an aligned text table, in the order given.
pub fn goals_table(owner: &str, criteria: &SortCriteria, goals: &[Goal]) -> String {
    if goals.is_empty() {
        return format!("No goals found for user {owner}. Use 'add' to create one.");
    }

    let headers = [
        "ID", "Name", "Priority", "Target", "Saved", "Remaining", "Progress", "Added",
    ];
    let rows: Vec<[String; 8]> = goals
        .iter()
        .map(|goal| {
            let name = if goal.is_complete() {
                format!("{} [COMPLETED]", goal.name)
            } else {
                goal.name.clone()
            };
            [
                goal.id.clone(),
                name,
                goal.priority.as_str().to_uppercase(),
                format_currency(goal.target),
                format_currency(goal.current),
                format_currency(goal.remaining()),
                progress_cell(goal),
                goal.added_date.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    // Amount columns are right-aligned.
    let right_aligned = |col: usize| (3..=5).contains(&col);

    let mut out = format!(
        "Goals for {owner} (sorted by {})\n",
        sort_label(criteria)
    );
    let push_row = |out: &mut String, cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let width = widths[col];
                if right_aligned(col) {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row);
    }
    out.trim_end().to_string()
}

pub fn summary(owner: &str, summary: &GoalSummary) -> String {
    format!(
        "Goal summary for {owner}\n\
         ---------------------------------\n\
         Total goals:     {} ({} complete, {} in progress)\n\
         Priorities:      {} high / {} medium / {} low\n\
         Total saved:     {}\n\
         Total target:    {}\n\
         Total remaining: {}",
        summary.total_goals,
        summary.completed_goals,
        summary.incomplete_goals,
        summary.high_priority,
        summary.medium_priority,
        summary.low_priority,
        format_currency(summary.total_saved),
        format_currency(summary.total_target),
        format_currency(summary.total_remaining),
    )
}

pub fn goal_detail(goal: &Goal) -> String {
    format!(
        "'{}' (ID: {}) priority {}: saved {} of {}, {} remaining",
        goal.name,
        goal.id,
        goal.priority.as_str().to_uppercase(),
        format_currency(goal.current),
        format_currency(goal.target),
        format_currency(goal.remaining()),
    )
}
