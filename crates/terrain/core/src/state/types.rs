use std::fmt;

/// Index of a layer (plane, world, or z-level) inside a [`TileGrid`](super::TileGrid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerId(pub u16);

impl LayerId {
    pub const SURFACE: Self = Self(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}", self.0)
    }
}

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position one step in `direction`.
    #[inline]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Size of a layer, fixed when the layer is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && i64::from(position.x) < i64::from(self.width)
            && i64::from(position.y) < i64::from(self.height)
    }

    pub const fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Region covering the whole layer, or `None` for an empty layer.
    pub fn full_region(&self) -> Option<Region> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        // Positions are i32, so wider layers are addressable up to i32::MAX.
        let last = |extent: u32| i32::try_from(extent - 1).unwrap_or(i32::MAX);
        Some(Region::new(
            Position::ORIGIN,
            Position::new(last(self.width), last(self.height)),
        ))
    }
}

/// Rectangular area of a layer; both corners are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Region {
    pub min: Position,
    pub max: Position,
}

impl Region {
    pub const fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    pub const fn single(position: Position) -> Self {
        Self::new(position, position)
    }

    /// Square of `radius` tiles around `center`.
    pub const fn around(center: Position, radius: i32) -> Self {
        Self::new(
            center.offset(-radius, -radius),
            center.offset(radius, radius),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.max.x - self.min.x + 1) as u32
        }
    }

    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            (self.max.y - self.min.y + 1) as u32
        }
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min.x
            && position.x <= self.max.x
            && position.y >= self.min.y
            && position.y <= self.max.y
    }

    pub fn intersects(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Smallest region containing both.
    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Region::new(
            Position::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Position::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Grows the region by `margin` tiles on every side.
    pub fn expand(&self, margin: i32) -> Region {
        Region::new(
            self.min.offset(-margin, -margin),
            self.max.offset(margin, margin),
        )
    }

    /// Intersection with the layer bounds, `None` when nothing overlaps.
    pub fn clamp_to(&self, dimensions: MapDimensions) -> Option<Region> {
        let full = dimensions.full_region()?;
        let clamped = Region::new(
            Position::new(self.min.x.max(full.min.x), self.min.y.max(full.min.y)),
            Position::new(self.max.x.min(full.max.x), self.max.y.min(full.max.y)),
        );
        (!clamped.is_empty()).then_some(clamped)
    }

    /// Positions in row-major order (y outer, x inner).
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| Position::new(x, y)))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One of the eight neighbour directions. North is `-y`.
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
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Northwest,
    North,
    Northeast,
    West,
    East,
    Southwest,
    South,
    Southeast,
}

impl Direction {
    /// All directions in row-major order of their offsets.
    pub const ALL: [Direction; 8] = [
        Direction::Northwest,
        Direction::North,
        Direction::Northeast,
        Direction::West,
        Direction::East,
        Direction::Southwest,
        Direction::South,
        Direction::Southeast,
    ];

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Northwest => (-1, -1),
            Direction::North => (0, -1),
            Direction::Northeast => (1, -1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::Southwest => (-1, 1),
            Direction::South => (0, 1),
            Direction::Southeast => (1, 1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Northwest => Direction::Southeast,
            Direction::North => Direction::South,
            Direction::Northeast => Direction::Southwest,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::Southwest => Direction::Northeast,
            Direction::South => Direction::North,
            Direction::Southeast => Direction::Northwest,
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::Northwest | Direction::Northeast | Direction::Southwest | Direction::Southeast
        )
    }

    pub const fn bit(self) -> Directions {
        match self {
            Direction::Northwest => Directions::NORTHWEST,
            Direction::North => Directions::NORTH,
            Direction::Northeast => Directions::NORTHEAST,
            Direction::West => Directions::WEST,
            Direction::East => Directions::EAST,
            Direction::Southwest => Directions::SOUTHWEST,
            Direction::South => Directions::SOUTH,
            Direction::Southeast => Directions::SOUTHEAST,
        }
    }
}

bitflags::bitflags! {
    /// Set of neighbour directions, used as the input of pattern classification.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Directions: u8 {
        const NORTH     = 1 << 0;
        const NORTHEAST = 1 << 1;
        const EAST      = 1 << 2;
        const SOUTHEAST = 1 << 3;
        const SOUTH     = 1 << 4;
        const SOUTHWEST = 1 << 5;
        const WEST      = 1 << 6;
        const NORTHWEST = 1 << 7;

        const CARDINALS = Self::NORTH.bits() | Self::EAST.bits() | Self::SOUTH.bits() | Self::WEST.bits();
        const DIAGONALS = Self::NORTHEAST.bits() | Self::SOUTHEAST.bits() | Self::SOUTHWEST.bits() | Self::NORTHWEST.bits();
    }
}

impl From<Direction> for Directions {
    fn from(direction: Direction) -> Self {
        direction.bit()
    }
}

impl FromIterator<Direction> for Directions {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Directions::empty(), |acc, direction| acc | direction.bit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_beyond_i32_do_not_wrap() {
        let wide = MapDimensions::new(u32::MAX, 3);
        assert!(wide.contains(Position::new(5, 1)));
        assert!(wide.contains(Position::new(i32::MAX, 2)));
        assert!(!wide.contains(Position::new(0, 3)));
        assert!(!wide.contains(Position::new(-1, 0)));
        assert_eq!(
            wide.full_region(),
            Some(Region::new(Position::ORIGIN, Position::new(i32::MAX, 2)))
        );
    }

    #[test]
    fn region_positions_are_row_major() {
        let region = Region::new(Position::new(1, 1), Position::new(2, 2));
        let positions: Vec<_> = region.positions().collect();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(1, 2),
                Position::new(2, 2),
            ]
        );
        assert_eq!(region.area(), 4);
    }

    #[test]
    fn region_clamps_to_layer_bounds() {
        let dims = MapDimensions::new(4, 3);
        let region = Region::around(Position::new(0, 0), 1);
        assert_eq!(
            region.clamp_to(dims),
            Some(Region::new(Position::new(0, 0), Position::new(1, 1)))
        );
        let outside = Region::single(Position::new(10, 10));
        assert_eq!(outside.clamp_to(dims), None);
    }

    #[test]
    fn inverted_region_is_empty() {
        let region = Region::new(Position::new(3, 3), Position::new(1, 1));
        assert!(region.is_empty());
        assert_eq!(region.area(), 0);
    }

    #[test]
    fn opposite_directions_cancel_offsets() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            let (ox, oy) = direction.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn direction_set_collects_bits() {
        let set: Directions = [Direction::North, Direction::Southwest].into_iter().collect();
        assert_eq!(set, Directions::NORTH | Directions::SOUTHWEST);
    }
}
