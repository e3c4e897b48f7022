//! Input aggregation
//!
//! Folds key presses and on-screen button presses into a single
//! [`ControlFlags`] value. Each control is asserted while any source holds
//! it:
//! - keys: any held key bound to the control (many keys may share a control)
//! - buttons: a per-control reference count of pointers pressing it

use egui::Key;
use log::debug;
use simcore::{Control, ControlFlags};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// Key name (as understood by [`Key::from_name`]) to control.
pub type BindingTable = BTreeMap<String, Control>;

#[derive(Debug, Error)]
#[error("unknown key name `{0}`")]
pub struct UnknownKey(pub String);

/// Static mapping from physical keys to controls.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMap {
    bindings: HashMap<Key, Control>,
}

impl KeyMap {
    pub fn arrows() -> Vec<(Key, Control)> {
        vec![
            (Key::ArrowUp, Control::Throttle),
            (Key::ArrowDown, Control::Brake),
            (Key::ArrowLeft, Control::Left),
            (Key::ArrowRight, Control::Right),
        ]
    }

    pub fn letters() -> Vec<(Key, Control)> {
        vec![
            (Key::W, Control::Throttle),
            (Key::S, Control::Brake),
            (Key::A, Control::Left),
            (Key::D, Control::Right),
            (Key::R, Control::Reverse),
        ]
    }

    /// Merges tables in order; a key bound twice keeps its last binding.
    pub fn from_bindings(tables: impl IntoIterator<Item = Vec<(Key, Control)>>) -> Self {
        KeyMap {
            bindings: tables.into_iter().flatten().collect(),
        }
    }

    pub fn from_tables(tables: &[BindingTable]) -> Result<Self, UnknownKey> {
        let mut parsed = Vec::with_capacity(tables.len());
        for table in tables {
            let entries = table
                .iter()
                .map(|(name, control)| {
                    Key::from_name(name)
                        .map(|key| (key, *control))
                        .ok_or_else(|| UnknownKey(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            parsed.push(entries);
        }
        Ok(Self::from_bindings(parsed))
    }

    pub fn control_for(&self, key: Key) -> Option<Control> {
        self.bindings.get(&key).copied()
    }

    /// Keys bound to `control`, sorted for display.
    pub fn keys_for(&self, control: Control) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(_, c)| **c == control)
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        keys
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_bindings([Self::arrows(), Self::letters()])
    }
}

/// Identity of a pointer that can press on-screen buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

/// Single source of truth for what the driver is commanding right now.
#[derive(Debug, Clone, Default)]
pub struct InputAggregator {
    keymap: KeyMap,
    held_keys: HashSet<Key>,
    button_counts: HashMap<Control, u32>,
    pointers: HashMap<PointerId, Control>,
    flags: ControlFlags,
}

impl InputAggregator {
    pub fn new(keymap: KeyMap) -> Self {
        InputAggregator {
            keymap,
            ..Default::default()
        }
    }

    pub fn flags(&self) -> ControlFlags {
        self.flags
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Returns whether the key is bound. Unbound keys change nothing.
    pub fn key_down(&mut self, key: Key) -> bool {
        let Some(control) = self.keymap.control_for(key) else {
            return false;
        };
        self.held_keys.insert(key);
        self.refresh(control);
        true
    }

    pub fn key_up(&mut self, key: Key) -> bool {
        let Some(control) = self.keymap.control_for(key) else {
            return false;
        };
        self.held_keys.remove(&key);
        self.refresh(control);
        true
    }

    pub fn button_down(&mut self, control: Control) {
        *self.button_counts.entry(control).or_insert(0) += 1;
        self.refresh(control);
    }

    pub fn button_up(&mut self, control: Control) {
        if let Some(count) = self.button_counts.get_mut(&control) {
            *count = count.saturating_sub(1);
        }
        self.refresh(control);
    }

    /// Releases every on-screen button at once. Keys are unaffected.
    pub fn cancel_buttons(&mut self) {
        if !self.pointers.is_empty() || self.button_counts.values().any(|c| *c > 0) {
            debug!("cancelling all control buttons");
        }
        self.pointers.clear();
        self.button_counts.clear();
        for control in Control::ALL {
            self.refresh(control);
        }
    }

    /// A pointer went down; `target` is the button under it, if any.
    pub fn pointer_down(&mut self, pointer: PointerId, target: Option<Control>) {
        let Some(control) = target else { return };
        if self.pointers.contains_key(&pointer) {
            return;
        }
        self.pointers.insert(pointer, control);
        self.button_down(control);
    }

    /// A pointer went up; `target` is the button under it, if any. Lifting a
    /// pointer anywhere but on the button it pressed cancels every button.
    pub fn pointer_up(&mut self, pointer: PointerId, target: Option<Control>) {
        match self.pointers.remove(&pointer) {
            Some(pressed) if target == Some(pressed) => self.button_up(pressed),
            Some(_) => self.cancel_buttons(),
            None if target.is_none() => self.cancel_buttons(),
            None => {}
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.cancel_buttons();
    }

    /// Page hidden or window unfocused: nothing can be held any more.
    pub fn visibility_lost(&mut self) {
        if self.flags.any() {
            debug!("focus lost, releasing {:?}", self.flags);
        }
        self.held_keys.clear();
        self.pointers.clear();
        self.button_counts.clear();
        self.flags.clear();
    }

    fn refresh(&mut self, control: Control) {
        let by_key = self
            .held_keys
            .iter()
            .any(|k| self.keymap.control_for(*k) == Some(control));
        let by_button = self.button_counts.get(&control).copied().unwrap_or(0) > 0;
        let active = by_key || by_button;
        if self.flags.get(control) != active {
            debug!("{} {}", control.name(), if active { "on" } else { "off" });
            self.flags.set(control, active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_keys_for_left() -> InputAggregator {
        InputAggregator::new(KeyMap::from_bindings([
            vec![(Key::ArrowLeft, Control::Left)],
            vec![(Key::A, Control::Left), (Key::W, Control::Throttle)],
        ]))
    }

    #[test]
    fn test_press_and_release() {
        let mut input = InputAggregator::new(KeyMap::default());
        assert!(input.key_down(Key::ArrowUp));
        assert!(input.flags().throttle);
        assert!(input.key_up(Key::ArrowUp));
        assert!(!input.flags().throttle);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.key_down(Key::W);
        let before = input.flags();
        assert!(!input.key_down(Key::Q));
        assert!(!input.key_up(Key::Q));
        assert_eq!(input.flags(), before);
    }

    #[test]
    fn test_shared_control_needs_all_keys_released() {
        let mut input = two_keys_for_left();
        input.key_down(Key::ArrowLeft);
        input.key_down(Key::A);
        input.key_up(Key::ArrowLeft);
        assert!(input.flags().left, "A still holds left");
        input.key_up(Key::A);
        assert!(!input.flags().left);
    }

    #[test]
    fn test_key_repeat_does_not_stack() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.key_down(Key::D);
        input.key_down(Key::D);
        input.key_up(Key::D);
        assert!(!input.flags().right);
    }

    #[test]
    fn test_button_reference_count() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.pointer_down(PointerId::Touch(1), Some(Control::Brake));
        input.pointer_down(PointerId::Touch(2), Some(Control::Brake));
        input.pointer_up(PointerId::Touch(1), Some(Control::Brake));
        assert!(input.flags().brake);
        input.pointer_up(PointerId::Touch(2), Some(Control::Brake));
        assert!(!input.flags().brake);
    }

    #[test]
    fn test_button_count_saturates_at_zero() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.button_up(Control::Left);
        input.button_down(Control::Left);
        assert!(input.flags().left);
        input.button_up(Control::Left);
        assert!(!input.flags().left);
    }

    #[test]
    fn test_release_outside_cancels_all_buttons() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.pointer_down(PointerId::Touch(1), Some(Control::Throttle));
        input.pointer_down(PointerId::Touch(2), Some(Control::Left));
        input.pointer_up(PointerId::Touch(1), None);
        assert!(!input.flags().throttle);
        assert!(!input.flags().left);
    }

    #[test]
    fn test_touch_cancel_keeps_keys() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.key_down(Key::ArrowRight);
        input.pointer_down(PointerId::Mouse, Some(Control::Throttle));
        input.pointer_cancel();
        assert!(!input.flags().throttle);
        assert!(input.flags().right);
    }

    #[test]
    fn test_key_and_button_combine() {
        let mut input = InputAggregator::new(KeyMap::default());
        input.key_down(Key::W);
        input.pointer_down(PointerId::Mouse, Some(Control::Throttle));
        input.key_up(Key::W);
        assert!(input.flags().throttle);
        input.pointer_up(PointerId::Mouse, Some(Control::Throttle));
        assert!(!input.flags().throttle);
    }

    #[test]
    fn test_visibility_loss_releases_everything() {
        let mut input = two_keys_for_left();
        input.key_down(Key::A);
        input.key_down(Key::W);
        input.pointer_down(PointerId::Touch(9), Some(Control::Reverse));
        input.visibility_lost();
        assert_eq!(input.flags(), ControlFlags::default());
        // a stale key-up after refocus must not resurrect anything
        input.key_up(Key::A);
        assert_eq!(input.flags(), ControlFlags::default());
    }

    #[test]
    fn test_keymap_from_named_tables() {
        let mut table = BindingTable::new();
        table.insert("ArrowUp".into(), Control::Throttle);
        table.insert("Space".into(), Control::Brake);
        let map = KeyMap::from_tables(&[table]).unwrap();
        assert_eq!(map.control_for(Key::Space), Some(Control::Brake));
        assert_eq!(map.control_for(Key::W), None);
    }

    #[test]
    fn test_keymap_rejects_unknown_name() {
        let mut table = BindingTable::new();
        table.insert("NotAKey".into(), Control::Left);
        let err = KeyMap::from_tables(&[table]).unwrap_err();
        assert_eq!(err.0, "NotAKey");
    }

    #[test]
    fn test_default_map_has_both_layouts() {
        let map = KeyMap::default();
        assert_eq!(map.keys_for(Control::Left).len(), 2);
        assert_eq!(map.keys_for(Control::Reverse), vec![Key::R]);
    }
}
