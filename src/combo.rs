// Copyright (C) 2025 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: (Apache-2.0 OR MIT)

//! Combo definitions and their per-instance mutable matching state.

use crate::key::Coord;
use crate::key::KeyRef;


/// The two supported combo families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComboKind {
  /// All configured keys pressed together, in any order, within one
  /// timeout window.
  Chord,
  /// Configured keys pressed in order, each within a per-key timeout
  /// of the previous.
  Sequence,
}


/// The state a single combo can be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComboState {
  /// The current attempt was abandoned; the engine will re-prime this
  /// combo back to [`Matching`][ComboState::Matching] via
  /// `reset_combos`.
  Reset,
  /// Zero or more, but not all, of the combo's members are currently
  /// held; this combo contributes to `match_count`.
  Matching,
  /// The combo has fully matched and committed; its `result` key is
  /// currently held downstream.
  Active,
  /// Externally disabled. Never entered or left by internal engine
  /// logic.
  Idle,
}


/// A configured combo: an immutable definition plus the mutable
/// matching state the engine advances as events arrive.
///
/// Each `Combo` owns its own `remaining`/`pressed` storage,
/// initialized freshly by [`Combo::reset`]; none of it is ever shared
/// between combo instances.
#[derive(Clone, Debug)]
pub struct Combo<K> {
  match_list: Vec<KeyRef<K>>,
  /// The logical key emitted when this combo activates.
  pub result: K,
  /// On release while [`Active`][ComboState::Active], whether to reset
  /// to the initial matching state (`true`) or fall back to
  /// [`Matching`][ComboState::Matching] with partial progress retained
  /// (`false`).
  pub fast_reset: bool,
  /// Whether `timeout` applies between successive keys (`true`) or
  /// from the first key of the combo (`false`).
  pub per_key_timeout: bool,
  /// Maximum allowed gap, in milliseconds, before this combo's
  /// current attempt is abandoned.
  pub timeout: u32,
  /// Which combo family this is; determines `matches`/`uses_match`
  /// dispatch.
  pub kind: ComboKind,
  remaining: Vec<KeyRef<K>>,
  pressed: Vec<KeyRef<K>>,
  state: ComboState,
}

impl<K> Combo<K>
where
  K: Copy + Eq,
{
  /// Construct an unordered chord: `timeout = 50`, `fast_reset =
  /// false`, `per_key_timeout = false`.
  pub fn chord(match_list: Vec<KeyRef<K>>, result: K) -> Self {
    Self::new(ComboKind::Chord, match_list, result, false, false, 50)
  }

  /// Construct an ordered sequence: `timeout = 1000`, `fast_reset =
  /// true`, `per_key_timeout = true`.
  pub fn sequence(match_list: Vec<KeyRef<K>>, result: K) -> Self {
    Self::new(ComboKind::Sequence, match_list, result, true, true, 1000)
  }

  fn new(
    kind: ComboKind,
    match_list: Vec<KeyRef<K>>,
    result: K,
    fast_reset: bool,
    per_key_timeout: bool,
    timeout: u32,
  ) -> Self {
    let remaining = match_list.clone();
    Self {
      match_list,
      result,
      fast_reset,
      per_key_timeout,
      timeout,
      kind,
      remaining,
      pressed: Vec::new(),
      state: ComboState::Reset,
    }
  }

  /// Override `fast_reset`.
  #[must_use]
  pub fn with_fast_reset(mut self, fast_reset: bool) -> Self {
    self.fast_reset = fast_reset;
    self
  }

  /// Override `per_key_timeout`.
  #[must_use]
  pub fn with_per_key_timeout(mut self, per_key_timeout: bool) -> Self {
    self.per_key_timeout = per_key_timeout;
    self
  }

  /// Override `timeout`, in milliseconds.
  #[must_use]
  pub fn with_timeout(mut self, timeout: u32) -> Self {
    self.timeout = timeout;
    self
  }

  /// The combo's configured `match` list, in order.
  pub fn match_list(&self) -> &[KeyRef<K>] {
    &self.match_list
  }

  /// Whether this combo matches by physical coordinate (`true`) or by
  /// logical key (`false`). Derived from, and consistent across, every
  /// entry of `match_list`.
  pub fn match_coord(&self) -> bool {
    self.match_list.first().is_some_and(KeyRef::is_coord)
  }

  /// The combo's current state.
  pub fn state(&self) -> ComboState {
    self.state
  }

  /// Transition to `new_state`, maintaining `match_count`: entering
  /// [`Matching`][ComboState::Matching] increments it, leaving it
  /// decrements it. Self-transitions are no-ops.
  pub(crate) fn set_state(&mut self, new_state: ComboState, match_count: &mut usize) {
    if self.state == new_state {
      return;
    }
    if new_state == ComboState::Matching {
      *match_count += 1;
    }
    if self.state == ComboState::Matching {
      *match_count -= 1;
    }
    self.state = new_state;
  }

  /// Attempt to consume `(key, coord)` against `remaining`.
  ///
  /// For a [`Chord`][ComboKind::Chord], succeeds if the reference
  /// appears anywhere in `remaining` and removes it. For a
  /// [`Sequence`][ComboKind::Sequence], succeeds only if the reference
  /// equals `remaining[0]`, popping the head and appending it to
  /// `pressed`.
  pub(crate) fn matches(&mut self, key: K, coord: Coord) -> bool {
    match self.kind {
      ComboKind::Chord => {
        if let Some(pos) = self.remaining.iter().position(|r| r.is_satisfied_by(key, coord)) {
          self.remaining.remove(pos);
          true
        } else {
          false
        }
      },
      ComboKind::Sequence => {
        if self.remaining.first().is_some_and(|r| r.is_satisfied_by(key, coord)) {
          let head = self.remaining.remove(0);
          self.pressed.push(head);
          true
        } else {
          false
        }
      },
    }
  }

  /// Whether `remaining` is fully consumed, i.e. the combo has
  /// completed its match.
  pub(crate) fn is_complete(&self) -> bool {
    self.remaining.is_empty()
  }

  /// True if `(key, coord)` appears anywhere in the combo's original
  /// `match` list.
  pub(crate) fn has_match(&self, key: K, coord: Coord) -> bool {
    self.match_list.iter().any(|r| r.is_satisfied_by(key, coord))
  }

  /// True if this specific held key is presently part of this combo's
  /// activity. Equals [`has_match`][Combo::has_match] for a
  /// [`Chord`][ComboKind::Chord]; for a [`Sequence`][ComboKind::Sequence]
  /// additionally requires the reference to currently be in `pressed`.
  pub(crate) fn uses_match(&self, key: K, coord: Coord) -> bool {
    match self.kind {
      ComboKind::Chord => self.has_match(key, coord),
      ComboKind::Sequence => {
        self.has_match(key, coord) && self.pressed.iter().any(|r| r.is_satisfied_by(key, coord))
      },
    }
  }

  /// Remove `(key, coord)` from `pressed`, e.g. when a
  /// [`Sequence`][ComboKind::Sequence] member is released mid-attempt.
  pub(crate) fn unpress(&mut self, key: K, coord: Coord) {
    if let Some(pos) = self.pressed.iter().position(|r| r.is_satisfied_by(key, coord)) {
      self.pressed.remove(pos);
    }
  }

  /// Reset this combo's attempt: `remaining` is restored to a fresh
  /// copy of `match_list`, `pressed` is cleared, and `state` becomes
  /// [`Matching`][ComboState::Matching].
  pub(crate) fn reset(&mut self, match_count: &mut usize) {
    self.remaining = self.match_list.clone();
    self.pressed.clear();
    self.set_state(ComboState::Matching, match_count);
  }
}
