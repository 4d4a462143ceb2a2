// Copyright (C) 2025 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: (Apache-2.0 OR MIT)

//! The interface the engine consumes from the surrounding keyboard
//! firmware: event dispatch, timer scheduling, and the clock.

use crate::key::Coord;


/// An opaque handle to an outstanding one-shot timer.
///
/// The engine treats this as entirely opaque; it only ever stores at
/// most one and hands it back verbatim to
/// [`HostKeyboard::cancel_timeout`]. The host is responsible for
/// invoking [`ComboEngine::on_timeout`][crate::ComboEngine::on_timeout]
/// once the corresponding deadline is reached; the engine does not
/// itself own or invoke a callback closure (see the crate's design
/// notes on avoiding a self-referential timer closure).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeoutToken(pub u64);


/// A structured diagnostic emitted on combo activation, deactivation,
/// and buffer flush/abandon transitions.
///
/// Hosts do not need to do anything with these directly: the engine
/// reports them via `tracing` at `debug` level internally. The type is
/// exposed so that a host wanting additional, engine-specific
/// observability can match on it from its own `tracing` subscriber.
#[derive(Clone, Copy, Debug)]
pub enum DebugEvent<'a, K> {
  /// A combo has been committed and its `result` key pressed
  /// downstream.
  Activated {
    /// Index of the combo in registry order.
    index: usize,
    /// The key emitted downstream.
    result: &'a K,
  },
  /// A combo's `result` key has been released downstream, either
  /// because the user released a held member or because the combo
  /// was abandoned immediately after activation.
  Deactivated {
    /// Index of the combo in registry order.
    index: usize,
    /// The key released downstream.
    result: &'a K,
  },
  /// The event buffer was drained because no combo could complete.
  Flushed {
    /// Number of raw events replayed downstream.
    event_count: usize,
  },
}

/// Capabilities the host keyboard firmware must provide for the
/// engine to operate.
///
/// Implementations own the matrix scan, the timer facility, the clock,
/// and the downstream key-processing pipeline; the engine calls back
/// into this trait rather than owning any of those resources itself.
pub trait HostKeyboard<K> {
  /// Forward a key event to the host's downstream processing,
  /// bypassing the combo engine.
  ///
  /// `coord` is `None` for synthetic events (a combo's `result` key),
  /// and `Some` for raw events the engine is replaying verbatim.
  ///
  /// This method must be synchronous and must not recursively re-enter
  /// the engine for the same event.
  fn resume_process_key(&mut self, key: K, is_pressed: bool, coord: Option<Coord>);

  /// Arm a one-shot timer that fires no sooner than `delay_ms`
  /// milliseconds from now.
  ///
  /// The engine guarantees it never has more than one outstanding
  /// timer: every call is preceded by a [`cancel_timeout`] of any
  /// previous token still held.
  ///
  /// [`cancel_timeout`]: HostKeyboard::cancel_timeout
  fn set_timeout(&mut self, delay_ms: u32) -> TimeoutToken;

  /// Cancel a previously armed timer. Canceling a timer that has
  /// already fired (or a stale token) must be a harmless no-op.
  fn cancel_timeout(&mut self, token: TimeoutToken);

  /// The current value of a monotonic millisecond counter.
  ///
  /// Deltas between two calls must be computed with wrapping
  /// subtraction at the counter's native width so that wrap-around is
  /// invisible for deltas below half that width.
  fn clock_ms(&self) -> u32;

  /// Receive a structured diagnostic event. The default implementation
  /// forwards it to `tracing` at `debug` level; hosts with their own
  /// debug sink may override this.
  fn debug(&self, event: DebugEvent<'_, K>)
  where
    K: std::fmt::Debug,
  {
    match event {
      DebugEvent::Activated { index, result } => {
        tracing::debug!(index, ?result, "combo activated");
      },
      DebugEvent::Deactivated { index, result } => {
        tracing::debug!(index, ?result, "combo deactivated");
      },
      DebugEvent::Flushed { event_count } => {
        tracing::debug!(event_count, "combo buffer flushed");
      },
    }
  }
}


/// Marker trait implemented by a host's key type to expose the
/// sentinel `LEADER` (alias `LDR`) symbol so that user configurations
/// can build "leader key" combos.
///
/// The sentinel has no special handling inside the engine: it behaves
/// like any other member of a combo's `match` list. Hosts that don't
/// need a leader key simply don't implement this trait.
pub trait LeaderKey: Sized {
  /// The sentinel leader key value, registered by the host under both
  /// the names `LEADER` and `LDR`.
  fn leader() -> Self;
}
