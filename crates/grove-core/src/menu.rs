//! Menu model: two fixed option lists with wraparound selection.
//!
//! The timer presets sit on the left of the screen, the feature presets on
//! the right; both share a single `selected`/`hide_at` pair and only one is
//! active at a time. The menu shows itself on any navigation and hides five
//! seconds after the last touch.

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_SEC;
use crate::error::ConfigError;

/// How long the menu stays up after the last navigation.
pub const HIDE_DELAY_MS: u64 = 5 * MS_PER_SEC;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuList {
    Timer,
    Feature,
}

#[derive(Debug, Clone)]
pub struct MenuModel {
    timer_items: Vec<String>,
    feature_items: Vec<String>,
    active: MenuList,
    selected: usize,
    visible: bool,
    hide_at: u64,
}

impl MenuModel {
    /// Empty lists are a configuration error, not a runtime case -- every
    /// navigation below may assume `len >= 1`.
    pub fn new(timer_items: Vec<String>, feature_items: Vec<String>) -> Result<Self, ConfigError> {
        if timer_items.is_empty() {
            return Err(ConfigError::EmptyList("timer".into()));
        }
        if feature_items.is_empty() {
            return Err(ConfigError::EmptyList("feature".into()));
        }
        Ok(Self {
            timer_items,
            feature_items,
            active: MenuList::Timer,
            selected: 0,
            visible: false,
            hide_at: 0,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn active_list(&self) -> MenuList {
        self.active
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn items(&self, list: MenuList) -> &[String] {
        match list {
            MenuList::Timer => &self.timer_items,
            MenuList::Feature => &self.feature_items,
        }
    }

    fn active_len(&self) -> usize {
        self.items(self.active).len()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Make `list` the visible active list. Switching lists resets the
    /// selection to the top so the index is always in the new list's range.
    pub fn show(&mut self, list: MenuList, now_ms: u64) {
        if self.active != list {
            self.active = list;
            self.selected = 0;
        }
        self.visible = true;
        self.hide_at = now_ms + HIDE_DELAY_MS;
    }

    /// Shift the selection by `delta`, wrapping modulo the active list
    /// length. Also re-arms the hide deadline: navigating keeps the menu up.
    pub fn move_selection(&mut self, delta: i64, now_ms: u64) {
        let len = self.active_len() as i64;
        self.selected = (self.selected as i64 + delta).rem_euclid(len) as usize;
        self.visible = true;
        self.hide_at = now_ms + HIDE_DELAY_MS;
    }

    /// The selected entry. Visibility is the caller's to manage -- starting
    /// a timer hides the menu, switching lists does not.
    pub fn confirm(&self) -> (MenuList, usize) {
        (self.active, self.selected)
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn tick(&mut self, now_ms: u64) {
        if self.visible && now_ms >= self.hide_at {
            self.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model() -> MenuModel {
        MenuModel::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["x".into(), "y".into()],
        )
        .unwrap()
    }

    #[test]
    fn empty_list_is_a_config_error() {
        assert!(matches!(
            MenuModel::new(vec![], vec!["x".into()]),
            Err(ConfigError::EmptyList(_))
        ));
    }

    #[test]
    fn wraps_in_both_directions() {
        let mut m = model();
        m.move_selection(-1, 0);
        assert_eq!(m.selected(), 2);
        m.move_selection(1, 0);
        assert_eq!(m.selected(), 0);
        m.move_selection(7, 0);
        assert_eq!(m.selected(), 1);
    }

    #[test]
    fn switching_lists_resets_selection() {
        let mut m = model();
        m.show(MenuList::Timer, 0);
        m.move_selection(2, 0);
        assert_eq!(m.selected(), 2);
        m.show(MenuList::Feature, 0);
        assert_eq!(m.selected(), 0);
        assert_eq!(m.active_list(), MenuList::Feature);
        // Index 2 would be out of range for the two-entry feature list.
        assert!(m.selected() < m.items(MenuList::Feature).len());
    }

    #[test]
    fn hides_after_deadline() {
        let mut m = model();
        m.show(MenuList::Timer, 1_000);
        m.tick(1_000 + HIDE_DELAY_MS - 1);
        assert!(m.is_visible());
        m.tick(1_000 + HIDE_DELAY_MS);
        assert!(!m.is_visible());
    }

    #[test]
    fn confirm_does_not_touch_visibility() {
        let mut m = model();
        m.show(MenuList::Timer, 0);
        let (list, idx) = m.confirm();
        assert_eq!((list, idx), (MenuList::Timer, 0));
        assert!(m.is_visible());
    }

    proptest! {
        // move(k) then move(-k) is the identity on the selection.
        #[test]
        fn move_is_a_group_action(k in -1000i64..1000, start in 0usize..3) {
            let mut m = model();
            m.move_selection(start as i64, 0);
            let before = m.selected();
            m.move_selection(k, 0);
            m.move_selection(-k, 0);
            prop_assert_eq!(m.selected(), before);
        }

        #[test]
        fn selection_stays_in_bounds(deltas in proptest::collection::vec(-50i64..50, 0..32)) {
            let mut m = model();
            for d in deltas {
                m.move_selection(d, 0);
                prop_assert!(m.selected() < 3);
            }
        }
    }
}
