//! Prompt text for entry analysis.

use std::fmt::Write;

use chrono::NaiveDate;
use stride_core::entities::{ActiveGoal, Entry};
use stride_core::enums::ReframeKind;

const SYSTEM_PREAMBLE: &str = "You read short journal entries and report, for each of the \
user's active goals, whether the entry shows progress on it that day.

Activity levels:
- none: the entry says nothing about the goal, or only mentions it without doing anything
- partial: some effort toward the goal, below what the current phase expects
- full: the goal's expected effort for the day was met

Momentum describes the entry overall: none, low, medium or high.
List short risk flags for patterns that threaten the goals (skipped sessions, \
exhaustion, avoidance). Add one concrete suggestion when it would help.
Use only the goal ids you are given. Report every goal, using none when unsure.";

/// System prompt, including the reframe kinds the model may choose from.
#[must_use]
pub fn system_prompt() -> String {
    let mut prompt = String::from(SYSTEM_PREAMBLE);
    prompt.push_str(
        "\n\nSet reframe only when a goal itself looks wrong for the user right now. Kinds:",
    );
    for kind in ReframeKind::ALL {
        let _ = write!(prompt, "\n- {}: {}", kind.as_str(), kind.describe());
    }
    prompt.push_str("\nOtherwise set reframe to null.");
    prompt
}

/// User prompt: the day, the goals with their phase context, then the entry.
#[must_use]
pub fn user_prompt(entry: &Entry, day: NaiveDate, goals: &[ActiveGoal]) -> String {
    let mut prompt = format!("Date: {day}\n\nActive goals:\n");
    for active in goals {
        let goal = &active.goal;
        let _ = write!(prompt, "- id: {}\n  name: {}\n", goal.id, goal.name);
        if let Some(description) = goal.description.as_deref() {
            let _ = writeln!(prompt, "  description: {description}");
        }
        if let Some(phase) = &active.phase {
            let _ = write!(
                prompt,
                "  phase: {} ({} intensity",
                phase.name,
                phase.intensity.as_str()
            );
            if let Some(frequency) = phase.frequency.as_deref() {
                let _ = write!(prompt, ", {frequency}");
            }
            prompt.push_str(")\n");
        }
        if entry.linked_goal_ids.iter().any(|id| id == &goal.id) {
            prompt.push_str("  linked by the user to this entry\n");
        }
    }
    let _ = write!(prompt, "\nEntry:\n{}", entry.text.trim());
    prompt
}
