// Copyright (C) 2025 Daniel Mueller <deso@posteo.net>
// SPDX-License-Identifier: (Apache-2.0 OR MIT)

//! Key and coordinate references used to describe a combo's members.

/// An integer identifying a physical matrix position.
///
/// Used when a combo is configured to match by physical location
/// (`match_coord = true`) rather than by logical key symbol.
pub type Coord = u16;


/// A single member of a combo's `match` list: either a logical key
/// symbol or a physical matrix coordinate.
///
/// A combo fixes its match mode (`match_coord`) at construction time
/// and is validated to use only one variant of [`KeyRef`] throughout
/// its `match` list; the two are never mixed within a single combo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyRef<K> {
  /// Match against the logical key symbol emitted by the host.
  Key(K),
  /// Match against the physical matrix coordinate the event occurred
  /// at, irrespective of what logical key it currently maps to.
  Coord(Coord),
}

impl<K> KeyRef<K>
where
  K: Copy + Eq,
{
  /// Check whether this reference is satisfied by an observed
  /// `(key, coord)` pair.
  pub(crate) fn is_satisfied_by(&self, key: K, coord: Coord) -> bool {
    match self {
      Self::Key(want) => *want == key,
      Self::Coord(want) => *want == coord,
    }
  }

  /// Report whether this reference is the [`Coord`][KeyRef::Coord]
  /// variant.
  pub(crate) fn is_coord(&self) -> bool {
    matches!(self, Self::Coord(_))
  }
}
