//! Transition pattern classification.
//!
//! A pattern names which of the eight neighbours of a cell carry a given
//! adjacent terrain. Sides (N, S, E, W) dominate the corners they touch: a
//! diagonal only counts as an inner corner when neither of its two adjacent
//! sides is present.

use crate::state::Directions;

/// Classified shape of the directions in which an adjacent terrain appears.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TransitionPattern {
    // One side
    North,
    South,
    West,
    East,
    // Two adjacent sides (outer corners)
    NorthwestOuter,
    NortheastOuter,
    SouthwestOuter,
    SoutheastOuter,
    // Outer corner plus the opposite inner corner
    NorthwestOuterSoutheastInner,
    NortheastOuterSouthwestInner,
    SouthwestOuterNortheastInner,
    SoutheastOuterNorthwestInner,
    // Diagonals only
    NorthwestInner,
    NortheastInner,
    SouthwestInner,
    SoutheastInner,
    NorthwestNortheastInner,
    SouthwestSoutheastInner,
    NorthwestSouthwestInner,
    NortheastSoutheastInner,
    NorthwestSoutheastInner,
    NortheastSouthwestInner,
    NorthwestNortheastSouthwestInner,
    NorthwestNortheastSoutheastInner,
    NorthwestSouthwestSoutheastInner,
    NortheastSouthwestSoutheastInner,
    NorthwestNortheastSouthwestSoutheastInner,
    // One side plus inner corners on the far side
    NorthSouthwestInner,
    NorthSoutheastInner,
    NorthSouthwestInnerSoutheastInner,
    SouthNorthwestInner,
    SouthNortheastInner,
    SouthNorthwestInnerNortheastInner,
    WestNortheastInner,
    WestSoutheastInner,
    WestNortheastInnerSoutheastInner,
    EastNorthwestInner,
    EastSouthwestInner,
    EastNorthwestInnerSouthwestInner,
    // Opposite sides; legal only for terrains that allow single tiles
    Single,
    NorthSingle,
    SouthSingle,
    WestSingle,
    EastSingle,
    NorthSouth,
    WestEast,
}

impl TransitionPattern {
    /// Classifies a direction set. Returns `None` for an empty set, and for
    /// sets with two opposite sides when `allow_single` is false (those cells
    /// are irregular and left for the corrector).
    pub fn classify(directions: Directions, allow_single: bool) -> Option<Self> {
        use TransitionPattern::*;

        if directions.is_empty() {
            return None;
        }

        let n = directions.contains(Directions::NORTH);
        let s = directions.contains(Directions::SOUTH);
        let w = directions.contains(Directions::WEST);
        let e = directions.contains(Directions::EAST);
        let nw = directions.contains(Directions::NORTHWEST) && !n && !w;
        let ne = directions.contains(Directions::NORTHEAST) && !n && !e;
        let sw = directions.contains(Directions::SOUTHWEST) && !s && !w;
        let se = directions.contains(Directions::SOUTHEAST) && !s && !e;

        let single_sided = match (n, s, w, e) {
            (true, true, true, true) => Some(Single),
            (true, false, true, true) => Some(NorthSingle),
            (false, true, true, true) => Some(SouthSingle),
            (true, true, true, false) => Some(WestSingle),
            (true, true, false, true) => Some(EastSingle),
            (true, true, false, false) => Some(NorthSouth),
            (false, false, true, true) => Some(WestEast),
            _ => None,
        };
        if let Some(pattern) = single_sided {
            return allow_single.then_some(pattern);
        }

        let pattern = match (n, s, w, e) {
            (true, false, true, false) if se => NorthwestOuterSoutheastInner,
            (true, false, true, false) => NorthwestOuter,
            (true, false, false, true) if sw => NortheastOuterSouthwestInner,
            (true, false, false, true) => NortheastOuter,
            (false, true, true, false) if ne => SouthwestOuterNortheastInner,
            (false, true, true, false) => SouthwestOuter,
            (false, true, false, true) if nw => SoutheastOuterNorthwestInner,
            (false, true, false, true) => SoutheastOuter,
            (true, false, false, false) => match (sw, se) {
                (true, true) => NorthSouthwestInnerSoutheastInner,
                (true, false) => NorthSouthwestInner,
                (false, true) => NorthSoutheastInner,
                (false, false) => North,
            },
            (false, true, false, false) => match (nw, ne) {
                (true, true) => SouthNorthwestInnerNortheastInner,
                (true, false) => SouthNorthwestInner,
                (false, true) => SouthNortheastInner,
                (false, false) => South,
            },
            (false, false, true, false) => match (ne, se) {
                (true, true) => WestNortheastInnerSoutheastInner,
                (true, false) => WestNortheastInner,
                (false, true) => WestSoutheastInner,
                (false, false) => West,
            },
            (false, false, false, true) => match (nw, sw) {
                (true, true) => EastNorthwestInnerSouthwestInner,
                (true, false) => EastNorthwestInner,
                (false, true) => EastSouthwestInner,
                (false, false) => East,
            },
            _ => Self::classify_diagonals(nw, ne, sw, se)?,
        };
        Some(pattern)
    }

    fn classify_diagonals(nw: bool, ne: bool, sw: bool, se: bool) -> Option<Self> {
        use TransitionPattern::*;

        let pattern = match (nw, ne, sw, se) {
            (false, false, false, false) => return None,
            (true, false, false, false) => NorthwestInner,
            (false, true, false, false) => NortheastInner,
            (false, false, true, false) => SouthwestInner,
            (false, false, false, true) => SoutheastInner,
            (true, true, false, false) => NorthwestNortheastInner,
            (false, false, true, true) => SouthwestSoutheastInner,
            (true, false, true, false) => NorthwestSouthwestInner,
            (false, true, false, true) => NortheastSoutheastInner,
            (true, false, false, true) => NorthwestSoutheastInner,
            (false, true, true, false) => NortheastSouthwestInner,
            (true, true, true, false) => NorthwestNortheastSouthwestInner,
            (true, true, false, true) => NorthwestNortheastSoutheastInner,
            (true, false, true, true) => NorthwestSouthwestSoutheastInner,
            (false, true, true, true) => NortheastSouthwestSoutheastInner,
            (true, true, true, true) => NorthwestNortheastSouthwestSoutheastInner,
        };
        Some(pattern)
    }

    /// Patterns that only occur for terrains with `allow_single`.
    pub const fn requires_allow_single(self) -> bool {
        use TransitionPattern::*;
        matches!(
            self,
            Single | NorthSingle | SouthSingle | WestSingle | EastSingle | NorthSouth | WestEast
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use strum::{EnumCount, IntoEnumIterator};

    use super::*;

    #[test]
    fn fully_surrounded_is_single() {
        assert_eq!(
            TransitionPattern::classify(Directions::all(), true),
            Some(TransitionPattern::Single)
        );
        assert_eq!(TransitionPattern::classify(Directions::all(), false), None);
    }

    #[test]
    fn sides_absorb_touching_corners() {
        let set = Directions::NORTH | Directions::NORTHWEST | Directions::NORTHEAST;
        assert_eq!(
            TransitionPattern::classify(set, false),
            Some(TransitionPattern::North)
        );

        let set = Directions::NORTH | Directions::SOUTHEAST;
        assert_eq!(
            TransitionPattern::classify(set, false),
            Some(TransitionPattern::NorthSoutheastInner)
        );
    }

    #[test]
    fn outer_corner_keeps_opposite_inner_corner() {
        let set = Directions::NORTH | Directions::WEST | Directions::NORTHWEST | Directions::SOUTHEAST;
        assert_eq!(
            TransitionPattern::classify(set, false),
            Some(TransitionPattern::NorthwestOuterSoutheastInner)
        );
    }

    #[test]
    fn opposite_sides_need_allow_single() {
        let strip = Directions::WEST | Directions::EAST;
        assert_eq!(TransitionPattern::classify(strip, false), None);
        assert_eq!(
            TransitionPattern::classify(strip, true),
            Some(TransitionPattern::WestEast)
        );

        let peninsula = Directions::NORTH | Directions::WEST | Directions::EAST;
        assert_eq!(
            TransitionPattern::classify(peninsula, true),
            Some(TransitionPattern::NorthSingle)
        );
    }

    #[test]
    fn every_pattern_is_reachable() {
        let reached: BTreeSet<_> = (1..=u8::MAX)
            .filter_map(|bits| {
                TransitionPattern::classify(Directions::from_bits_truncate(bits), true)
            })
            .collect();
        assert_eq!(reached.len(), TransitionPattern::COUNT);
        for pattern in TransitionPattern::iter() {
            assert!(reached.contains(&pattern), "{pattern} unreachable");
        }
    }

    #[test]
    fn non_empty_sets_always_classify_with_allow_single() {
        for bits in 1..=u8::MAX {
            let set = Directions::from_bits_truncate(bits);
            assert!(TransitionPattern::classify(set, true).is_some(), "{set:?}");
        }
    }

    #[test]
    fn without_allow_single_only_single_patterns_vanish() {
        for bits in 1..=u8::MAX {
            let set = Directions::from_bits_truncate(bits);
            let relaxed = TransitionPattern::classify(set, true).unwrap();
            let strict = TransitionPattern::classify(set, false);
            assert_eq!(strict.is_none(), relaxed.requires_allow_single());
        }
    }

    #[test]
    fn parses_snake_case_names() {
        assert_eq!(
            "northwest_outer".parse::<TransitionPattern>(),
            Ok(TransitionPattern::NorthwestOuter)
        );
        assert_eq!(TransitionPattern::WestEast.as_ref(), "west_east");
    }
}
