// Copyright (C) 2025 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: (Apache-2.0 OR MIT)

//! The combo decision engine: press/release arbitration, the event
//! buffer, and the flush protocol.

use std::fmt::Debug;

use crate::buffer::balance;
use crate::buffer::BufferedEvent;
use crate::combo::Combo;
use crate::combo::ComboState;
use crate::error::ConfigError;
use crate::host::DebugEvent;
use crate::host::HostKeyboard;
use crate::host::TimeoutToken;
use crate::key::Coord;


/// The combo decision engine.
///
/// Owns a fixed, ordered registry of [`Combo`]s plus the transient
/// state (`key_buffer`, `pending_combos`, `match_count`,
/// `start_timepoint`, `active_timeout`) needed to arbitrate between
/// them. Driven entirely through [`ComboEngine::process_key`] (or its
/// constituent [`on_press`][ComboEngine::on_press] /
/// [`on_release`][ComboEngine::on_release]) and
/// [`ComboEngine::on_timeout`].
#[derive(Debug)]
pub struct ComboEngine<K> {
  combos: Vec<Combo<K>>,
  key_buffer: Vec<BufferedEvent<K>>,
  pending_combos: Vec<usize>,
  match_count: usize,
  start_timepoint: Option<u32>,
  active_timeout: Option<TimeoutToken>,
}

impl<K> ComboEngine<K>
where
  K: Copy + Eq,
{
  /// Validate `combos` and build an engine from them.
  ///
  /// # Errors
  /// Returns [`ConfigError`] if any combo has an empty `match` list, a
  /// non-positive `timeout`, mixes key and coordinate references, or
  /// duplicates another combo's `(kind, match_coord, match)` triple.
  pub fn new(combos: Vec<Combo<K>>) -> Result<Self, ConfigError> {
    for (index, combo) in combos.iter().enumerate() {
      if combo.match_list().is_empty() {
        return Err(ConfigError::EmptyMatch { index });
      }
      if combo.timeout == 0 {
        return Err(ConfigError::NonPositiveTimeout { index });
      }
      let all_coord = combo.match_list().iter().all(|r| r.is_coord());
      let all_key = combo.match_list().iter().all(|r| !r.is_coord());
      if !all_coord && !all_key {
        return Err(ConfigError::MixedMatchMode { index });
      }
    }
    for first in 0..combos.len() {
      for second in (first + 1)..combos.len() {
        let a = &combos[first];
        let b = &combos[second];
        if a.kind == b.kind && a.match_coord() == b.match_coord() && a.match_list() == b.match_list() {
          return Err(ConfigError::DuplicateCombo { first, second });
        }
      }
    }

    Ok(Self {
      combos,
      key_buffer: Vec::new(),
      pending_combos: Vec::new(),
      match_count: 0,
      start_timepoint: None,
      active_timeout: None,
    })
  }

  /// The number of combos currently in
  /// [`ComboState::Matching`]. Maintained as an engine-wide invariant
  /// equal to the count of combos whose state field is `Matching`.
  pub fn matching_count(&self) -> usize {
    self.match_count
  }

  /// The current state of the combo at `index` in registry order.
  pub fn combo_state(&self, index: usize) -> ComboState {
    self.combos[index].state()
  }

  /// Externally disable the combo at `index`, moving it to
  /// [`ComboState::Idle`]. A disabled combo is never matched against
  /// incoming events and does not contribute to `matching_count`.
  ///
  /// Disabling a combo that is currently [`ComboState::Active`] does
  /// not by itself release its held `result` key downstream; callers
  /// disabling an active combo are responsible for releasing it first.
  pub fn disable_combo(&mut self, index: usize) {
    self.combos[index].set_state(ComboState::Idle, &mut self.match_count);
  }

  /// Re-enable a combo previously disabled via
  /// [`disable_combo`][ComboEngine::disable_combo], returning it to
  /// [`ComboState::Matching`] with a fresh attempt. A no-op if the
  /// combo isn't currently [`ComboState::Idle`].
  pub fn enable_combo(&mut self, index: usize) {
    if self.combos[index].state() == ComboState::Idle {
      self.combos[index].reset(&mut self.match_count);
    }
  }

  /// Prime the registry. Call once, from the host's boot sequence,
  /// before any key events are delivered.
  pub fn during_bootup<H>(&mut self, _keyboard: &mut H)
  where
    H: HostKeyboard<K>,
  {
    self.reset_combos();
  }

  /// No-op hooks present for protocol conformance with the
  /// surrounding keyboard firmware's module lifecycle.
  pub fn before_matrix_scan<H: HostKeyboard<K>>(&mut self, _keyboard: &mut H) {}

  /// See [`before_matrix_scan`][ComboEngine::before_matrix_scan].
  pub fn after_matrix_scan<H: HostKeyboard<K>>(&mut self, _keyboard: &mut H) {}

  /// See [`before_matrix_scan`][ComboEngine::before_matrix_scan].
  pub fn before_hid_send<H: HostKeyboard<K>>(&mut self, _keyboard: &mut H) {}

  /// See [`before_matrix_scan`][ComboEngine::before_matrix_scan].
  pub fn after_hid_send<H: HostKeyboard<K>>(&mut self, _keyboard: &mut H) {}

  /// See [`before_matrix_scan`][ComboEngine::before_matrix_scan].
  pub fn on_powersave_enable<H: HostKeyboard<K>>(&mut self, _keyboard: &mut H) {}

  /// See [`before_matrix_scan`][ComboEngine::before_matrix_scan].
  pub fn on_powersave_disable<H: HostKeyboard<K>>(&mut self, _keyboard: &mut H) {}

  /// The sole input path for key events: dispatches to
  /// [`on_press`][ComboEngine::on_press] or
  /// [`on_release`][ComboEngine::on_release].
  pub fn process_key<H>(&mut self, keyboard: &mut H, key: K, is_pressed: bool, coord: Coord)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    if is_pressed {
      self.on_press(keyboard, key, coord);
    } else {
      self.on_release(keyboard, key, coord);
    }
  }

  /// Handle a key press.
  pub fn on_press<H>(&mut self, keyboard: &mut H, key: K, coord: Coord)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    if let Some(token) = self.active_timeout.take() {
      keyboard.cancel_timeout(token);
    }

    let now = keyboard.clock_ms();
    let start = *self.start_timepoint.get_or_insert(now);
    let last = self.key_buffer.last().map_or(start, |event| event.timestamp_ms);
    let d_last = now.wrapping_sub(last);
    let d_start = now.wrapping_sub(start);

    self.pending_combos.clear();
    let mut longest_timeout = 0u32;
    let mut matching_unfinished = 0usize;

    for index in 0..self.combos.len() {
      if self.combos[index].state() != ComboState::Matching {
        continue;
      }

      let consumed = self.combos[index].matches(key, coord);
      let within = if self.combos[index].per_key_timeout {
        d_last < self.combos[index].timeout
      } else {
        d_start < self.combos[index].timeout
      };

      if consumed && within {
        if self.combos[index].is_complete() {
          self.pending_combos.push(index);
        } else {
          matching_unfinished += 1;
        }
        longest_timeout = longest_timeout.max(self.combos[index].timeout);
      } else {
        self.combos[index].reset(&mut self.match_count);
        self.combos[index].set_state(ComboState::Reset, &mut self.match_count);
      }
    }

    if self.match_count == 0 {
      if !self.pending_combos.is_empty() || !self.key_buffer.is_empty() {
        self.flush_buffers(keyboard);
        self.start_timepoint = Some(now);
        self.on_press(keyboard, key, coord);
      } else {
        keyboard.resume_process_key(key, true, Some(coord));
        self.reset_combos();
      }
      return;
    }

    self.key_buffer.push(BufferedEvent::new(coord, key, true, now));

    if matching_unfinished == 0 {
      self.send_pending_combos(keyboard);
      return;
    }

    self.active_timeout = Some(keyboard.set_timeout(longest_timeout));
  }

  /// Handle a key release.
  pub fn on_release<H>(&mut self, keyboard: &mut H, key: K, coord: Coord)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    if let Some(token) = self.active_timeout.take() {
      keyboard.cancel_timeout(token);
    }

    let now = keyboard.clock_ms();
    let mut longest_timeout = 0u32;
    let mut propagate_release = true;

    for index in 0..self.combos.len() {
      if !self.combos[index].uses_match(key, coord) {
        continue;
      }

      if self.combos[index].state() == ComboState::Active {
        self.deactivate(keyboard, index);
        propagate_release = false;
        if self.combos[index].fast_reset {
          self.combos[index].reset(&mut self.match_count);
        } else {
          self.combos[index].set_state(ComboState::Matching, &mut self.match_count);
        }
      }

      if self.combos[index].state() == ComboState::Matching {
        if self.combos[index].fast_reset {
          longest_timeout = longest_timeout.max(self.combos[index].timeout);
          propagate_release = false;
          self.combos[index].unpress(key, coord);
        } else {
          self.combos[index].reset(&mut self.match_count);
        }
      }
    }

    if balance(&self.key_buffer, key, coord) > 0 {
      self.key_buffer.push(BufferedEvent::new(coord, key, false, now));
      propagate_release = false;
    }

    if self.match_count == 0 {
      self.reset_combos();
      self.key_buffer.clear();
    } else if longest_timeout > 0 {
      self.active_timeout = Some(keyboard.set_timeout(longest_timeout));
    } else {
      self.flush_buffers(keyboard);
    }

    if propagate_release {
      keyboard.resume_process_key(key, false, Some(coord));
    }
  }

  /// Commit every combo recorded in `pending_combos`, in registry
  /// order, then clear the decision window.
  fn send_pending_combos<H>(&mut self, keyboard: &mut H)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    let pending = std::mem::take(&mut self.pending_combos);

    for index in pending {
      self.activate(keyboard, index);
      self.combos[index].set_state(ComboState::Active, &mut self.match_count);

      let mut already_released = false;
      let mut seen: Vec<(Coord, K)> = Vec::new();
      for event in &self.key_buffer {
        if seen.contains(&(event.coord, event.key)) {
          continue;
        }
        seen.push((event.coord, event.key));
        if self.combos[index].has_match(event.key, event.coord)
          && balance(&self.key_buffer, event.key, event.coord) <= 0
        {
          already_released = true;
          break;
        }
      }

      if already_released {
        self.deactivate(keyboard, index);
        self.combos[index].set_state(ComboState::Reset, &mut self.match_count);
      }
    }

    self.pending_combos.clear();
    self.key_buffer.clear();
    self.reset_combos();
    self.start_timepoint = None;
  }

  /// Resolve the current decision window: commit pending combos if
  /// any completed, otherwise replay the buffer downstream in order.
  fn flush_buffers<H>(&mut self, keyboard: &mut H)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    if !self.pending_combos.is_empty() {
      self.send_pending_combos(keyboard);
      return;
    }

    if self.key_buffer.is_empty() {
      return;
    }
    keyboard.debug(DebugEvent::Flushed {
      event_count: self.key_buffer.len(),
    });

    while !self.key_buffer.is_empty() {
      let event = self.key_buffer.remove(0);
      keyboard.resume_process_key(event.key, event.is_pressed, Some(event.coord));

      if event.is_pressed {
        self.reset_combos();
        self.start_timepoint = Some(event.timestamp_ms);
        let old_buffer = std::mem::take(&mut self.key_buffer);

        for tail in old_buffer {
          let already_emitted =
            !tail.is_pressed && tail.key == event.key && tail.coord == event.coord;
          if already_emitted {
            keyboard.resume_process_key(tail.key, false, Some(tail.coord));
          } else {
            self.process_key(keyboard, tail.key, tail.is_pressed, tail.coord);
          }
        }
      }
    }
  }

  /// The timer callback. The host must invoke this once the deadline
  /// returned by the most recent `set_timeout` call is reached.
  pub fn on_timeout<H>(&mut self, keyboard: &mut H)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    self.active_timeout = None;
    self.start_timepoint = None;
    self.flush_buffers(keyboard);
  }

  /// Reset every combo not currently [`ComboState::Active`] or
  /// externally [`ComboState::Idle`] back to [`ComboState::Matching`]
  /// with a fresh `remaining`/`pressed`.
  fn reset_combos(&mut self) {
    for combo in &mut self.combos {
      if !matches!(combo.state(), ComboState::Active | ComboState::Idle) {
        combo.reset(&mut self.match_count);
      }
    }
  }

  fn activate<H>(&mut self, keyboard: &mut H, index: usize)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    let result = self.combos[index].result;
    keyboard.debug(DebugEvent::Activated {
      index,
      result: &result,
    });
    keyboard.resume_process_key(result, true, None);
  }

  fn deactivate<H>(&mut self, keyboard: &mut H, index: usize)
  where
    H: HostKeyboard<K>,
    K: Debug,
  {
    let result = self.combos[index].result;
    keyboard.debug(DebugEvent::Deactivated {
      index,
      result: &result,
    });
    keyboard.resume_process_key(result, false, None);
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::host::LeaderKey;
  use crate::key::KeyRef;

  type Key = char;

  /// A deterministic, explicitly-clocked stand-in for the host
  /// keyboard: records every downstream event and hands out
  /// monotonically increasing timeout tokens without ever actually
  /// firing them; tests fire `on_timeout` themselves.
  #[derive(Debug, Default)]
  struct FakeHost {
    now: u32,
    next_token: u64,
    emitted: Vec<(Key, bool, Option<Coord>)>,
  }

  impl FakeHost {
    fn new() -> Self {
      Self::default()
    }
  }

  impl HostKeyboard<Key> for FakeHost {
    fn resume_process_key(&mut self, key: Key, is_pressed: bool, coord: Option<Coord>) {
      self.emitted.push((key, is_pressed, coord));
    }

    fn set_timeout(&mut self, _delay_ms: u32) -> TimeoutToken {
      self.next_token += 1;
      TimeoutToken(self.next_token)
    }

    fn cancel_timeout(&mut self, _token: TimeoutToken) {}

    fn clock_ms(&self) -> u32 {
      self.now
    }
  }

  fn coord_of(key: Key) -> Coord {
    match key {
      'A' => 1,
      'B' => 2,
      'C' => 3,
      _ => 0,
    }
  }

  fn press(engine: &mut ComboEngine<Key>, host: &mut FakeHost, key: Key, at: u32) {
    host.now = at;
    engine.process_key(host, key, true, coord_of(key));
  }

  fn release(engine: &mut ComboEngine<Key>, host: &mut FakeHost, key: Key, at: u32) {
    host.now = at;
    engine.process_key(host, key, false, coord_of(key));
  }

  fn chord_ab_to_x() -> Combo<Key> {
    Combo::chord(vec![KeyRef::Key('A'), KeyRef::Key('B')], 'X')
  }

  fn sequence_abc_to_y() -> Combo<Key> {
    Combo::sequence(vec![KeyRef::Key('A'), KeyRef::Key('B'), KeyRef::Key('C')], 'Y')
  }

  /// Captures the `tracing` events the default
  /// [`HostKeyboard::debug`] forwards, so a test can assert on them
  /// instead of just on downstream key events.
  fn with_traced<R>(f: impl FnOnce() -> R) -> (R, String) {
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Buf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Buf {
      fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
      }

      fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
      }
    }

    impl<'a> MakeWriter<'a> for Buf {
      type Writer = Buf;

      fn make_writer(&'a self) -> Self::Writer {
        self.clone()
      }
    }

    let buf = Buf::default();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(buf.clone())
      .with_ansi(false)
      .with_max_level(tracing::Level::DEBUG)
      .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logged = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    (result, logged)
  }


  #[test]
  fn chord_activates_and_deactivates_cleanly() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);
    assert_eq!(engine.matching_count(), 1);

    press(&mut engine, &mut host, 'A', 0);
    press(&mut engine, &mut host, 'B', 10);
    assert_eq!(engine.combo_state(0), ComboState::Active);
    release(&mut engine, &mut host, 'A', 30);
    assert_eq!(engine.combo_state(0), ComboState::Matching);
    release(&mut engine, &mut host, 'B', 40);

    assert_eq!(
      host.emitted,
      vec![('X', true, None), ('X', false, None)],
    );
    assert_eq!(engine.matching_count(), 1);
  }

  #[test]
  fn abandoned_chord_key_not_in_any_combo_replays_in_order() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'A', 0);
    press(&mut engine, &mut host, 'C', 5);

    assert_eq!(
      host.emitted,
      vec![
        ('A', true, Some(coord_of('A'))),
        ('C', true, Some(coord_of('C'))),
      ],
    );
    assert_eq!(engine.matching_count(), 2);
  }

  #[test]
  fn chord_times_out_and_flushes_raw_once_sequence_also_gives_up() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'A', 0);
    press(&mut engine, &mut host, 'B', 80);
    assert!(host.emitted.is_empty());

    host.now = 1080;
    engine.on_timeout(&mut host);

    assert_eq!(
      host.emitted,
      vec![
        ('A', true, Some(coord_of('A'))),
        ('B', true, Some(coord_of('B'))),
      ],
    );
    assert_eq!(engine.matching_count(), 2);
  }

  #[test]
  fn mid_window_release_of_a_committed_chord_member_yields_a_neutral_tap() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'A', 0);
    press(&mut engine, &mut host, 'B', 10);
    release(&mut engine, &mut host, 'A', 15);
    release(&mut engine, &mut host, 'B', 40);
    assert!(host.emitted.is_empty());

    host.now = 1040;
    engine.on_timeout(&mut host);

    assert_eq!(host.emitted, vec![('X', true, None), ('X', false, None)]);
    assert_eq!(engine.matching_count(), 2);
  }

  #[test]
  fn sequence_completes_as_an_instant_tap_when_members_already_released() {
    let mut engine = ComboEngine::new(vec![sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'A', 0);
    release(&mut engine, &mut host, 'A', 20);
    press(&mut engine, &mut host, 'B', 100);
    release(&mut engine, &mut host, 'B', 120);
    press(&mut engine, &mut host, 'C', 200);

    assert_eq!(host.emitted, vec![('Y', true, None), ('Y', false, None)]);

    release(&mut engine, &mut host, 'C', 220);
    assert_eq!(
      host.emitted,
      vec![
        ('Y', true, None),
        ('Y', false, None),
        ('C', false, Some(coord_of('C'))),
      ],
    );
    assert_eq!(engine.matching_count(), 1);
  }

  #[test]
  fn sequence_broken_by_out_of_order_key_replays_raw() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'A', 0);
    release(&mut engine, &mut host, 'A', 20);
    press(&mut engine, &mut host, 'C', 100);

    assert_eq!(
      host.emitted,
      vec![
        ('A', true, Some(coord_of('A'))),
        ('A', false, Some(coord_of('A'))),
        ('C', true, Some(coord_of('C'))),
      ],
    );
  }

  #[test]
  fn replay_equivalence_for_unrelated_keys() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'C', 0);
    release(&mut engine, &mut host, 'C', 5);

    assert_eq!(
      host.emitted,
      vec![
        ('C', true, Some(coord_of('C'))),
        ('C', false, Some(coord_of('C'))),
      ],
    );
  }

  #[test]
  fn reset_combos_is_idempotent_on_an_idle_engine() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);
    assert_eq!(engine.matching_count(), 2);

    engine.reset_combos();
    engine.reset_combos();
    assert_eq!(engine.matching_count(), 2);
    assert_eq!(engine.combo_state(0), ComboState::Matching);
    assert_eq!(engine.combo_state(1), ComboState::Matching);
  }

  #[test]
  fn disabled_combo_is_skipped_until_re_enabled() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);
    assert_eq!(engine.matching_count(), 1);

    engine.disable_combo(0);
    assert_eq!(engine.combo_state(0), ComboState::Idle);
    assert_eq!(engine.matching_count(), 0);

    press(&mut engine, &mut host, 'A', 0);
    press(&mut engine, &mut host, 'B', 10);
    assert!(host.emitted.iter().all(|(key, ..)| *key != 'X'));
    assert_eq!(
      host.emitted,
      vec![
        ('A', true, Some(coord_of('A'))),
        ('B', true, Some(coord_of('B'))),
      ],
    );

    engine.enable_combo(0);
    assert_eq!(engine.combo_state(0), ComboState::Matching);
    assert_eq!(engine.matching_count(), 1);

    press(&mut engine, &mut host, 'A', 20);
    press(&mut engine, &mut host, 'B', 30);
    assert_eq!(engine.combo_state(0), ComboState::Active);
  }

  #[test]
  fn at_most_one_timer_outstanding_across_overlapping_presses() {
    let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    press(&mut engine, &mut host, 'A', 0);
    assert_eq!(host.next_token, 1);
    press(&mut engine, &mut host, 'B', 10);
    // `on_release`/`on_press` cancel the prior timer before arming a
    // new one; since the old token is never reused, the counter having
    // advanced again shows a fresh, single timer was armed.
    release(&mut engine, &mut host, 'A', 15);
    assert!(host.next_token >= 2);
  }

  #[test]
  fn debug_events_are_forwarded_to_tracing() {
    let (_, logged) = with_traced(|| {
      let mut engine = ComboEngine::new(vec![chord_ab_to_x(), sequence_abc_to_y()]).unwrap();
      let mut host = FakeHost::new();
      engine.during_bootup(&mut host);

      press(&mut engine, &mut host, 'A', 0);
      press(&mut engine, &mut host, 'B', 80);
      host.now = 1080;
      engine.on_timeout(&mut host);
    });

    assert!(logged.contains("combo buffer flushed"), "{logged}");
  }

  #[test]
  fn rejects_empty_match_list() {
    let empty: Combo<Key> = Combo::chord(vec![], 'X');
    let err = ComboEngine::new(vec![empty]).unwrap_err();
    assert_eq!(err, ConfigError::EmptyMatch { index: 0 });
  }

  #[test]
  fn rejects_non_positive_timeout() {
    let combo = chord_ab_to_x().with_timeout(0);
    let err = ComboEngine::new(vec![combo]).unwrap_err();
    assert_eq!(err, ConfigError::NonPositiveTimeout { index: 0 });
  }

  #[test]
  fn rejects_mixed_match_mode() {
    let combo: Combo<Key> = Combo::chord(vec![KeyRef::Key('A'), KeyRef::Coord(2)], 'X');
    let err = ComboEngine::new(vec![combo]).unwrap_err();
    assert_eq!(err, ConfigError::MixedMatchMode { index: 0 });
  }

  #[test]
  fn rejects_duplicate_combos() {
    let err = ComboEngine::new(vec![chord_ab_to_x(), chord_ab_to_x()]).unwrap_err();
    assert_eq!(err, ConfigError::DuplicateCombo { first: 0, second: 1 });
  }

  #[test]
  fn combos_can_match_by_physical_coordinate() {
    let combo: Combo<Key> = Combo::chord(vec![KeyRef::Coord(1), KeyRef::Coord(2)], 'X');
    let mut engine = ComboEngine::new(vec![combo]).unwrap();
    let mut host = FakeHost::new();
    engine.during_bootup(&mut host);

    // Two different logical keys reported at the combo's configured
    // coordinates still complete the chord.
    host.now = 0;
    engine.process_key(&mut host, 'Q', true, 1);
    host.now = 5;
    engine.process_key(&mut host, 'W', true, 2);

    assert_eq!(host.emitted, vec![('X', true, None)]);
  }

  #[test]
  fn leader_key_combo_builds_and_primes_like_any_other() {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Sym {
      Leader,
      A,
      B,
    }

    impl LeaderKey for Sym {
      fn leader() -> Self {
        Sym::Leader
      }
    }

    #[derive(Debug, Default)]
    struct SymHost {
      now: u32,
      next_token: u64,
      emitted: Vec<(Sym, bool, Option<Coord>)>,
    }

    impl HostKeyboard<Sym> for SymHost {
      fn resume_process_key(&mut self, key: Sym, is_pressed: bool, coord: Option<Coord>) {
        self.emitted.push((key, is_pressed, coord));
      }

      fn set_timeout(&mut self, _delay_ms: u32) -> TimeoutToken {
        self.next_token += 1;
        TimeoutToken(self.next_token)
      }

      fn cancel_timeout(&mut self, _token: TimeoutToken) {}

      fn clock_ms(&self) -> u32 {
        self.now
      }
    }

    let leader_seq = Combo::sequence(vec![KeyRef::Key(Sym::leader()), KeyRef::Key(Sym::A)], Sym::B);
    let mut engine = ComboEngine::new(vec![leader_seq]).unwrap();
    let mut host = SymHost::default();
    engine.during_bootup(&mut host);
    assert_eq!(engine.matching_count(), 1);

    host.now = 0;
    engine.process_key(&mut host, Sym::Leader, true, 0);
    host.now = 10;
    engine.process_key(&mut host, Sym::A, true, 1);

    assert_eq!(host.emitted, vec![(Sym::B, true, None)]);
  }
}
