// Copyright (C) 2025 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: (Apache-2.0 OR MIT)

//! Construction-time configuration errors.

use thiserror::Error;


/// An error describing why a combo registry could not be turned into
/// a [`ComboEngine`][crate::ComboEngine].
///
/// All variants are reported at construction time; the engine's hot
/// path (`on_press`/`on_release`/`on_timeout`) operates on an
/// already-validated registry and cannot fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  /// A combo's `match` list was empty.
  #[error("combo #{index} has an empty `match` list")]
  EmptyMatch {
    /// The index of the offending combo in registry order.
    index: usize,
  },
  /// A combo's `timeout` was zero (or, in spirit, negative).
  #[error("combo #{index} has a non-positive timeout")]
  NonPositiveTimeout {
    /// The index of the offending combo in registry order.
    index: usize,
  },
  /// A combo mixed key references and coordinate references in a
  /// single `match` list.
  #[error("combo #{index} mixes key and coordinate references")]
  MixedMatchMode {
    /// The index of the offending combo in registry order.
    index: usize,
  },
  /// Two combos were configured with an identical `(kind,
  /// match_coord, match)` triple.
  #[error("combo #{first} and combo #{second} are exact duplicates")]
  DuplicateCombo {
    /// The index of the first occurrence, in registry order.
    first: usize,
    /// The index of the duplicate, in registry order.
    second: usize,
  },
}
