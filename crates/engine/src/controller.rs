//! Interaction controller for the formula input.
//!
//! Owns the transient state of one mounted input (query text, filtered
//! suggestions, highlighted row, calculation string) and turns key and
//! pointer events into formula store mutations. Hosts feed it events,
//! render `view()`, and drain `take_effects()` after each event.
//!
//! # Consistency rules
//!
//! - Every committed operand or operator appends exactly one token to the
//!   store and one fragment to the calculation string.
//! - Any path that takes a tag out of the formula (remove control, click to
//!   re-open, replace) rebuilds the calculation string from the store, so the
//!   two never drift apart.
//! - `highlighted` is either `None` or a valid index into `filtered`.

use log::{debug, warn};

use crate::calc::{self, OperatorPolicy};
use crate::events::{ScrollBehavior, ScrollBlock, UiEffect};
use crate::formula::{evaluate, format_number, EvalResult, Glyph};
use crate::store::SharedStore;
use crate::suggestion::{Suggestion, SuggestionCache};

/// Keys the controller intercepts. Hosts translate their own key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    /// Any printable character. Operator glyphs are consumed; everything
    /// else passes through to the text field.
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not ours: the host applies its default text editing
    PassThrough,
    /// Handled without changing the formula
    Handled,
    /// A tag was appended to the formula
    Committed,
}

impl KeyOutcome {
    /// Whether the host must suppress the key's default effect.
    pub fn suppresses_default(self) -> bool {
        self != KeyOutcome::PassThrough
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    pub operator_policy: OperatorPolicy,
}

/// One tag chip as rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct TagChip {
    pub index: usize,
    pub label: String,
}

/// One dropdown row as rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct DropdownRow {
    pub name: String,
    pub category: String,
    pub highlighted: bool,
}

/// Everything a host needs to draw the input.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaView {
    pub chips: Vec<TagChip>,
    pub query: String,
    /// Result text: a number, "Error", or empty for a blank calculation
    pub result: String,
    pub result_is_error: bool,
    /// Present only while there are filtered suggestions to show
    pub dropdown: Option<Vec<DropdownRow>>,
    pub loading: bool,
}

pub struct InteractionController {
    store: SharedStore,
    options: ControllerOptions,
    suggestions: SuggestionCache,
    query: String,
    filtered: Vec<Suggestion>,
    highlighted: Option<usize>,
    calculation: String,
    effects: Vec<UiEffect>,
}

impl InteractionController {
    /// Mount a new input over `store`. The calculation starts from whatever
    /// the store already holds.
    pub fn new(store: SharedStore, options: ControllerOptions) -> Self {
        let mut controller = Self {
            store,
            options,
            suggestions: SuggestionCache::Idle,
            query: String::new(),
            filtered: Vec::new(),
            highlighted: None,
            calculation: String::new(),
            effects: Vec::new(),
        };
        controller.resync_calculation();
        controller
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered(&self) -> &[Suggestion] {
        &self.filtered
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn calculation(&self) -> &str {
        &self.calculation
    }

    pub fn suggestions(&self) -> &SuggestionCache {
        &self.suggestions
    }

    // ── Suggestion loading ──────────────────────────────────────────

    /// Mark the mount-time fetch as outstanding.
    pub fn begin_loading(&mut self) {
        self.suggestions = SuggestionCache::Loading;
    }

    pub fn load_suggestions(&mut self, list: Vec<Suggestion>) {
        debug!("loaded {} suggestions", list.len());
        self.suggestions = SuggestionCache::Ready(list);
        // Typed ahead while the fetch was in flight
        let query = self.query.clone();
        self.refilter(&query);
        self.resync_calculation();
    }

    /// Record a failed fetch. The cache stays empty: operators still work,
    /// but no text can be committed.
    pub fn suggestions_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("suggestion fetch failed: {}", message);
        self.suggestions = SuggestionCache::Failed(message);
        self.filtered.clear();
        self.set_highlight(None);
    }

    // ── Text and keys ───────────────────────────────────────────────

    pub fn on_query_change(&mut self, value: &str) {
        self.query = value.to_string();
        self.refilter(value);
    }

    pub fn on_key(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::ArrowDown => {
                self.highlight_next();
                KeyOutcome::Handled
            }
            Key::ArrowUp => {
                self.highlight_prev();
                KeyOutcome::Handled
            }
            Key::Enter => {
                if self.confirm() {
                    KeyOutcome::Committed
                } else {
                    KeyOutcome::Handled
                }
            }
            Key::Char(c) => match Glyph::from_char(c) {
                Some(glyph) => {
                    if self.push_operator(glyph) {
                        KeyOutcome::Committed
                    } else {
                        KeyOutcome::Handled
                    }
                }
                None => KeyOutcome::PassThrough,
            },
        }
    }

    fn highlight_next(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let last = self.filtered.len() - 1;
        let next = match self.highlighted {
            None => 0,
            Some(i) => (i + 1).min(last),
        };
        self.set_highlight(Some(next));
    }

    fn highlight_prev(&mut self) {
        if let Some(i) = self.highlighted {
            self.set_highlight(Some(i.saturating_sub(1)));
        }
    }

    /// Enter: commit the highlighted suggestion, or the suggestion whose
    /// name matches the typed query. Returns true if a tag was added.
    fn confirm(&mut self) -> bool {
        let highlighted = self.highlighted.and_then(|i| self.filtered.get(i).cloned());
        if let Some(suggestion) = highlighted {
            return self.commit_operand(suggestion);
        }

        let typed = self.query.trim().to_string();
        if typed.is_empty() {
            return false;
        }
        match self.suggestions.find_by_name(&typed).cloned() {
            Some(suggestion) => self.commit_operand(suggestion),
            None => {
                debug!("no suggestion named {:?}; not committed", typed);
                false
            }
        }
    }

    fn commit_operand(&mut self, suggestion: Suggestion) -> bool {
        if !calc::operand_allowed(&self.calculation) {
            debug!(
                "rejected {:?}: calculation {:?} does not end in an operator",
                suggestion.name, self.calculation
            );
            return false;
        }

        self.store.borrow_mut().add_tag(suggestion.name.clone());
        self.calculation.push_str(&format_number(suggestion.value));
        debug!("committed {:?} => {:?}", suggestion.name, self.calculation);

        self.query.clear();
        self.filtered.clear();
        self.set_highlight(None);
        true
    }

    /// Append an operator glyph. Returns false only under the strict
    /// operator policy.
    pub fn push_operator(&mut self, glyph: Glyph) -> bool {
        if !calc::operator_allowed(self.options.operator_policy, &self.calculation, glyph) {
            debug!("rejected operator {} after {:?}", glyph, self.calculation);
            return false;
        }

        self.store.borrow_mut().add_tag(glyph.to_string());
        self.calculation.push(glyph.as_char());
        self.on_query_change("");
        true
    }

    // ── Pointer ─────────────────────────────────────────────────────

    /// Clicking a tag re-opens it for editing: its label goes back into the
    /// input and it leaves the formula.
    pub fn on_tag_click(&mut self, index: usize) {
        let Some(label) = self.store.borrow().get(index).map(str::to_string) else {
            return;
        };
        self.effects.push(UiEffect::FocusInput);
        self.on_query_change(&label);
        self.remove_and_resync(index);
    }

    /// The tag's remove control.
    pub fn on_tag_remove(&mut self, index: usize) {
        self.remove_and_resync(index);
    }

    /// Clicking a dropdown row fills the input with its name; it does not
    /// commit.
    pub fn on_suggestion_click(&mut self, index: usize) {
        if let Some(name) = self.filtered.get(index).map(|s| s.name.clone()) {
            self.on_query_change(&name);
        }
    }

    /// Replace the tag at `index` with `label` and rebuild the calculation.
    pub fn replace_tag(&mut self, index: usize, label: &str) {
        if self.store.borrow_mut().update_tag(index, label).is_some() {
            self.resync_calculation();
        }
    }

    fn remove_and_resync(&mut self, index: usize) {
        if self.store.borrow_mut().remove_tag(index).is_some() {
            self.resync_calculation();
        }
    }

    fn resync_calculation(&mut self) {
        self.calculation = calc::synthesize(self.store.borrow().tokens(), &self.suggestions);
    }

    // ── Output ──────────────────────────────────────────────────────

    /// Evaluate the calculation as it stands. Not cached.
    pub fn result(&self) -> EvalResult {
        evaluate(&self.calculation)
    }

    pub fn view(&self) -> FormulaView {
        let chips = self
            .store
            .borrow()
            .tokens()
            .iter()
            .enumerate()
            .map(|(index, label)| TagChip { index, label: label.clone() })
            .collect();

        let dropdown = if self.filtered.is_empty() {
            None
        } else {
            Some(
                self.filtered
                    .iter()
                    .enumerate()
                    .map(|(i, s)| DropdownRow {
                        name: s.name.clone(),
                        category: s.category.clone(),
                        highlighted: self.highlighted == Some(i),
                    })
                    .collect(),
            )
        };

        let result = self.result();
        FormulaView {
            chips,
            query: self.query.clone(),
            result: result.to_display(),
            result_is_error: result.is_error(),
            dropdown,
            loading: self.suggestions.is_loading(),
        }
    }

    /// Effects queued since the last call, oldest first.
    pub fn take_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.effects)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn refilter(&mut self, query: &str) {
        self.filtered = self.suggestions.filter(query);
        self.set_highlight(None);
    }

    fn set_highlight(&mut self, highlighted: Option<usize>) {
        if highlighted == self.highlighted {
            return;
        }
        self.highlighted = highlighted;
        if let Some(index) = highlighted {
            self.effects.push(UiEffect::ScrollIntoView {
                index,
                behavior: ScrollBehavior::Smooth,
                block: ScrollBlock::Nearest,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FormulaStore;
    use proptest::prelude::*;

    fn suggestions() -> Vec<Suggestion> {
        vec![
            Suggestion::new("Water", "solvent", 18.0, "1"),
            Suggestion::new("Salt", "mineral", 58.0, "2"),
            Suggestion::new("Sodium Chloride", "salt", 58.44, "3"),
            Suggestion::new("Chlorine", "element", 35.45, "4"),
        ]
    }

    fn mounted() -> InteractionController {
        let mut c = InteractionController::new(FormulaStore::shared(), ControllerOptions::default());
        c.begin_loading();
        c.load_suggestions(suggestions());
        c
    }

    fn formula(c: &InteractionController) -> Vec<String> {
        c.store().borrow().tokens().to_vec()
    }

    /// Type a name and press Enter with nothing highlighted.
    fn commit(c: &mut InteractionController, name: &str) -> KeyOutcome {
        c.on_query_change(name);
        c.on_key(Key::Enter)
    }

    #[test]
    fn test_query_filters_case_insensitively() {
        let mut c = mounted();
        c.on_query_change("chlor");
        let names: Vec<&str> = c.filtered().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Sodium Chloride", "Chlorine"]);

        c.on_query_change("zinc");
        assert!(c.filtered().is_empty());
    }

    #[test]
    fn test_blank_query_clears_list_and_highlight() {
        let mut c = mounted();
        c.on_query_change("a");
        c.on_key(Key::ArrowDown);
        assert_eq!(c.highlighted(), Some(0));

        c.on_query_change("  ");
        assert!(c.filtered().is_empty());
        assert_eq!(c.highlighted(), None);
    }

    #[test]
    fn test_query_change_resets_highlight() {
        let mut c = mounted();
        c.on_query_change("l");
        c.on_key(Key::ArrowDown);
        c.on_key(Key::ArrowDown);
        c.on_query_change("lo");
        assert_eq!(c.highlighted(), None);
    }

    #[test]
    fn test_arrow_navigation_clamps() {
        let mut c = mounted();
        c.on_query_change("chlor"); // 2 matches
        c.on_key(Key::ArrowUp);
        assert_eq!(c.highlighted(), None);

        for _ in 0..5 {
            c.on_key(Key::ArrowDown);
        }
        assert_eq!(c.highlighted(), Some(1));

        for _ in 0..5 {
            c.on_key(Key::ArrowUp);
        }
        assert_eq!(c.highlighted(), Some(0));
    }

    #[test]
    fn test_arrow_down_on_empty_list() {
        let mut c = mounted();
        c.on_key(Key::ArrowDown);
        assert_eq!(c.highlighted(), None);
        assert!(c.take_effects().is_empty());
    }

    #[test]
    fn test_enter_commits_highlighted() {
        let mut c = mounted();
        c.on_query_change("chlor");
        c.on_key(Key::ArrowDown);
        c.on_key(Key::ArrowDown);

        assert_eq!(c.on_key(Key::Enter), KeyOutcome::Committed);
        assert_eq!(formula(&c), vec!["Chlorine"]);
        assert_eq!(c.calculation(), "35.45");
        assert_eq!(c.query(), "");
        assert!(c.filtered().is_empty());
        assert_eq!(c.highlighted(), None);
    }

    #[test]
    fn test_enter_commits_exact_typed_name() {
        let mut c = mounted();
        assert_eq!(commit(&mut c, "  water "), KeyOutcome::Committed);
        assert_eq!(formula(&c), vec!["Water"]);
        assert_eq!(c.calculation(), "18");
        assert_eq!(c.query(), "");
        assert_eq!(c.highlighted(), None);
    }

    #[test]
    fn test_enter_ignores_unknown_text() {
        let mut c = mounted();
        assert_eq!(commit(&mut c, "Wat"), KeyOutcome::Handled);
        assert!(formula(&c).is_empty());
        assert_eq!(c.query(), "Wat");
    }

    #[test]
    fn test_adjacency_gate_rejects_second_operand() {
        let mut c = mounted();
        assert_eq!(commit(&mut c, "Water"), KeyOutcome::Committed);
        assert_eq!(commit(&mut c, "Salt"), KeyOutcome::Handled);
        assert_eq!(formula(&c), vec!["Water"]);
        assert_eq!(c.calculation(), "18");
        // Rejected entry stays in the input
        assert_eq!(c.query(), "Salt");

        // Highlighted path is gated the same way
        c.on_query_change("sal");
        c.on_key(Key::ArrowDown);
        assert_eq!(c.on_key(Key::Enter), KeyOutcome::Handled);
        assert_eq!(c.highlighted(), Some(0));
    }

    #[test]
    fn test_operator_keys() {
        let mut c = mounted();
        commit(&mut c, "Water");
        c.on_query_change("sa");

        let outcome = c.on_key(Key::Char('+'));
        assert!(outcome.suppresses_default());
        assert_eq!(c.query(), "");
        assert!(c.filtered().is_empty());

        commit(&mut c, "Salt");
        assert_eq!(formula(&c), vec!["Water", "+", "Salt"]);
        assert_eq!(c.calculation(), "18+58");
        assert_eq!(c.result(), EvalResult::Number(76.0));
    }

    #[test]
    fn test_plain_chars_pass_through() {
        let mut c = mounted();
        assert_eq!(c.on_key(Key::Char('w')), KeyOutcome::PassThrough);
        assert!(!KeyOutcome::PassThrough.suppresses_default());
        assert!(formula(&c).is_empty());
    }

    #[test]
    fn test_consecutive_operators_permitted_by_default() {
        let mut c = mounted();
        commit(&mut c, "Water");
        c.on_key(Key::Char('+'));
        c.on_key(Key::Char('+'));
        assert_eq!(c.calculation(), "18++");
        assert_eq!(c.view().result, "Error");
    }

    #[test]
    fn test_strict_operator_policy() {
        let options = ControllerOptions { operator_policy: OperatorPolicy::Strict };
        let mut c = InteractionController::new(FormulaStore::shared(), options);
        c.load_suggestions(suggestions());

        assert_eq!(c.on_key(Key::Char('*')), KeyOutcome::Handled);
        commit(&mut c, "Water");
        assert_eq!(c.on_key(Key::Char('+')), KeyOutcome::Committed);
        assert_eq!(c.on_key(Key::Char('+')), KeyOutcome::Handled);
        assert_eq!(formula(&c), vec!["Water", "+"]);
    }

    #[test]
    fn test_remove_operator_inserts_separator() {
        let mut c = mounted();
        commit(&mut c, "Water");
        c.on_key(Key::Char('+'));
        commit(&mut c, "Salt");
        assert_eq!(c.calculation(), "18+58");

        c.on_tag_remove(1);
        assert_eq!(formula(&c), vec!["Water", "Salt"]);
        assert_eq!(c.calculation(), "18+58");
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut c = mounted();
        commit(&mut c, "Water");
        c.on_tag_remove(4);
        assert_eq!(formula(&c), vec!["Water"]);
        assert_eq!(c.calculation(), "18");
    }

    #[test]
    fn test_tag_click_reopens_without_drift() {
        let mut c = mounted();
        commit(&mut c, "Water");
        c.on_key(Key::Char('*'));
        commit(&mut c, "Salt");
        c.take_effects();

        c.on_tag_click(2);
        assert_eq!(formula(&c), vec!["Water", "*"]);
        assert_eq!(c.calculation(), "18*");
        assert_eq!(c.query(), "Salt");
        assert_eq!(c.take_effects(), vec![UiEffect::FocusInput]);
        // Filter reflects the re-opened label
        assert_eq!(c.filtered().len(), 1);

        // Re-confirming restores the formula
        assert_eq!(c.on_key(Key::Enter), KeyOutcome::Committed);
        assert_eq!(c.calculation(), "18*58");
        assert_eq!(c.result(), EvalResult::Number(1044.0));
    }

    #[test]
    fn test_suggestion_click_sets_query_only() {
        let mut c = mounted();
        c.on_query_change("chlor");
        c.on_suggestion_click(1);
        assert_eq!(c.query(), "Chlorine");
        assert!(formula(&c).is_empty());
        c.on_suggestion_click(9);
        assert_eq!(c.query(), "Chlorine");
    }

    #[test]
    fn test_replace_tag_resyncs() {
        let mut c = mounted();
        commit(&mut c, "Water");
        c.on_key(Key::Char('-'));
        commit(&mut c, "Salt");

        c.replace_tag(2, "Chlorine");
        assert_eq!(formula(&c), vec!["Water", "-", "Chlorine"]);
        assert_eq!(c.calculation(), "18-35.45");
    }

    #[test]
    fn test_scroll_effects_on_highlight_change() {
        let mut c = mounted();
        c.on_query_change("chlor");
        c.on_key(Key::ArrowDown);
        c.on_key(Key::ArrowDown);
        c.on_key(Key::ArrowDown); // clamped, no change

        let scroll = |index| UiEffect::ScrollIntoView {
            index,
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Nearest,
        };
        assert_eq!(c.take_effects(), vec![scroll(0), scroll(1)]);
        assert!(c.take_effects().is_empty());
    }

    #[test]
    fn test_runaway_parentheses_render_error() {
        let mut c = mounted();
        for _ in 0..30_000 {
            assert!(c.push_operator(Glyph::LParen));
        }
        assert_eq!(commit(&mut c, "Water"), KeyOutcome::Committed);

        let view = c.view();
        assert_eq!(view.chips.len(), 30_001);
        assert_eq!(view.result, "Error");
        assert!(view.result_is_error);
    }

    #[test]
    fn test_fetch_failure_keeps_operators_working() {
        let mut c = InteractionController::new(FormulaStore::shared(), ControllerOptions::default());
        c.begin_loading();
        assert!(c.view().loading);
        c.suggestions_failed("connection refused");

        c.on_query_change("Water");
        assert!(c.filtered().is_empty());
        assert_eq!(c.on_key(Key::Enter), KeyOutcome::Handled);
        assert_eq!(c.on_key(Key::Char('(')), KeyOutcome::Committed);
        assert_eq!(formula(&c), vec!["("]);
        assert!(!c.view().loading);
    }

    #[test]
    fn test_late_suggestions_refilter_typed_query() {
        let mut c = InteractionController::new(FormulaStore::shared(), ControllerOptions::default());
        c.begin_loading();
        c.on_query_change("wat");
        assert!(c.filtered().is_empty());

        c.load_suggestions(suggestions());
        assert_eq!(c.filtered().len(), 1);
    }

    #[test]
    fn test_view_model() {
        let mut c = mounted();
        assert_eq!(c.view().result, "");
        assert!(c.view().dropdown.is_none());

        commit(&mut c, "Water");
        c.on_key(Key::Char('+'));
        c.on_query_change("chlor");
        c.on_key(Key::ArrowDown);

        let view = c.view();
        assert_eq!(view.chips.len(), 2);
        assert_eq!(view.chips[1], TagChip { index: 1, label: "+".into() });
        assert_eq!(view.result, "Error");
        assert!(view.result_is_error);
        let rows = view.dropdown.unwrap();
        assert_eq!(rows[0].category, "salt");
        assert!(rows[0].highlighted);
        assert!(!rows[1].highlighted);
    }

    #[test]
    fn test_mount_over_existing_store() {
        let store = FormulaStore::shared();
        store.borrow_mut().add_tag("Water");
        store.borrow_mut().add_tag("+");
        let mut c = InteractionController::new(store.clone(), ControllerOptions::default());
        // Names are unresolved until suggestions arrive
        assert_eq!(c.calculation(), "Water+");
        c.load_suggestions(suggestions());
        assert_eq!(c.calculation(), "18+");
    }

    proptest! {
        #[test]
        fn prop_arrow_down_clamps(presses in 0usize..12) {
            let mut c = mounted();
            c.on_query_change("l"); // Salt, Sodium Chloride, Chlorine
            let len = c.filtered().len();
            for _ in 0..presses {
                c.on_key(Key::ArrowDown);
            }
            if presses == 0 {
                prop_assert_eq!(c.highlighted(), None);
            } else {
                prop_assert_eq!(c.highlighted(), Some((presses - 1).min(len - 1)));
            }
            for _ in 0..presses {
                c.on_key(Key::ArrowUp);
                if presses > 0 {
                    prop_assert!(c.highlighted().is_some());
                }
            }
        }

        #[test]
        fn prop_highlight_always_in_range(keys in prop::collection::vec(0u8..6, 0..40)) {
            let mut c = mounted();
            for k in keys {
                match k {
                    0 => c.on_query_change("l"),
                    1 => c.on_query_change("chlor"),
                    2 => { c.on_key(Key::ArrowDown); }
                    3 => { c.on_key(Key::ArrowUp); }
                    4 => { c.on_key(Key::Enter); }
                    _ => { c.on_key(Key::Char('+')); }
                }
                if let Some(i) = c.highlighted() {
                    prop_assert!(i < c.filtered().len());
                }
            }
        }
    }
}
