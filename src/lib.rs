// Copyright (C) 2025 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: (Apache-2.0 OR MIT)

//! A library implementing multi-key **combo** recognition for keyboard
//! firmware: unordered **chords** and ordered **sequences** of key
//! presses that, when performed within configured timing constraints,
//! substitute a different logical key output.
//!
//! # Background
//! Keyboard firmware frequently wants to let a handful of physical
//! keys, pressed together or in a short sequence, stand in for a key
//! that doesn't otherwise have room on the matrix. Doing this
//! correctly requires buffering ambiguous events, since a key press
//! may turn out to be the first key of a combo or may turn out to be
//! an ordinary, unrelated key press that just happens to share keys
//! with a combo definition.
//!
//! This crate implements that decision engine as a small state
//! machine, [`ComboEngine`], driven by raw press/release events from
//! the host's matrix scan and emitting resolved events (either a
//! combo's `result` key, or the buffered raw events replayed
//! verbatim) back to the host via the [`HostKeyboard`] trait.
//!
//! The engine itself does not scan a matrix, does not talk to a timer
//! or a USB stack, and does not persist anything across restarts; all
//! of that is provided by the host through [`HostKeyboard`].

mod buffer;
mod combo;
mod engine;
mod error;
mod host;
mod key;

pub use combo::Combo;
pub use combo::ComboKind;
pub use combo::ComboState;
pub use engine::ComboEngine;
pub use error::ConfigError;
pub use host::DebugEvent;
pub use host::HostKeyboard;
pub use host::LeaderKey;
pub use host::TimeoutToken;
pub use key::Coord;
pub use key::KeyRef;
