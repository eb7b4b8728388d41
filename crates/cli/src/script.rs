//! Event scripts for `tagcalc run`.
//!
//! One event per line, replayed against a mounted controller exactly as
//! the TUI would deliver them:
//!
//! ```text
//! # comment
//! type wat            set the input text (rest of line, may be empty)
//! down | up | enter   navigation keys
//! key +               a single key press
//! click-tag 2         re-open tag 2 for editing
//! remove-tag 1        remove tag 1
//! click-suggestion 0  fill the input from dropdown row 0
//! replace-tag 0 Salt  replace tag 0 with a new label
//! ```

use serde::Serialize;
use tagcalc_engine::{InteractionController, Key, KeyOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEvent {
    Type(String),
    Key(Key),
    ClickTag(usize),
    RemoveTag(usize),
    ClickSuggestion(usize),
    ReplaceTag(usize, String),
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptEvent>, String> {
    let mut events = Vec::new();

    for (line_no, raw) in source.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (command, rest) = match trimmed.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest),
            None => (trimmed, ""),
        };
        let err = |msg: &str| format!("line {}: {}", line_no + 1, msg);

        let event = match command {
            "type" => ScriptEvent::Type(rest.to_string()),
            "down" => ScriptEvent::Key(Key::ArrowDown),
            "up" => ScriptEvent::Key(Key::ArrowUp),
            "enter" => ScriptEvent::Key(Key::Enter),
            "key" => {
                let mut chars = rest.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => ScriptEvent::Key(Key::Char(c)),
                    _ => return Err(err("key expects exactly one character")),
                }
            }
            "click-tag" => ScriptEvent::ClickTag(parse_index(rest).map_err(|e| err(&e))?),
            "remove-tag" => ScriptEvent::RemoveTag(parse_index(rest).map_err(|e| err(&e))?),
            "click-suggestion" => {
                ScriptEvent::ClickSuggestion(parse_index(rest).map_err(|e| err(&e))?)
            }
            "replace-tag" => {
                let (index, label) = rest
                    .trim()
                    .split_once(' ')
                    .ok_or_else(|| err("replace-tag expects an index and a label"))?;
                ScriptEvent::ReplaceTag(parse_index(index).map_err(|e| err(&e))?, label.trim().to_string())
            }
            other => return Err(err(&format!("unknown event '{}'", other))),
        };
        events.push(event);
    }

    Ok(events)
}

fn parse_index(s: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("invalid index '{}'", s.trim()))
}

/// Deliver one event. Returns the key outcome for key events.
pub fn apply(controller: &mut InteractionController, event: &ScriptEvent) -> Option<KeyOutcome> {
    match event {
        ScriptEvent::Type(text) => {
            controller.on_query_change(text);
            None
        }
        ScriptEvent::Key(key) => {
            let outcome = controller.on_key(*key);
            if let (KeyOutcome::PassThrough, Key::Char(c)) = (outcome, key) {
                // Default text-field behavior: the character lands in the input
                let mut query = controller.query().to_string();
                query.push(*c);
                controller.on_query_change(&query);
            }
            Some(outcome)
        }
        ScriptEvent::ClickTag(index) => {
            controller.on_tag_click(*index);
            None
        }
        ScriptEvent::RemoveTag(index) => {
            controller.on_tag_remove(*index);
            None
        }
        ScriptEvent::ClickSuggestion(index) => {
            controller.on_suggestion_click(*index);
            None
        }
        ScriptEvent::ReplaceTag(index, label) => {
            controller.replace_tag(*index, label);
            None
        }
    }
}

/// Final state after a script run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub formula: Vec<String>,
    pub calculation: String,
    pub result: String,
    pub error: bool,
    /// Enter / operator presses that did not add a tag
    pub rejected: usize,
}

pub fn run_script(controller: &mut InteractionController, events: &[ScriptEvent]) -> RunReport {
    let mut rejected = 0;
    for event in events {
        let outcome = apply(controller, event);
        if outcome == Some(KeyOutcome::Handled)
            && matches!(event, ScriptEvent::Key(Key::Enter) | ScriptEvent::Key(Key::Char(_)))
        {
            rejected += 1;
        }
        // No surface to act on effects here
        controller.take_effects();
    }

    let view = controller.view();
    RunReport {
        formula: view.chips.into_iter().map(|chip| chip.label).collect(),
        calculation: controller.calculation().to_string(),
        result: view.result,
        error: view.result_is_error,
        rejected,
    }
}
