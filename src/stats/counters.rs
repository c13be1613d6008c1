use super::classify::{Dimension, Resolution};
use strum::{Display, EnumIter, IntoEnumIterator};

/// A reported counter column within a bucket.
///
/// The enum order is the report column order, matching the classic layout:
/// merged, closed, unresolved, then the opened total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Merged,
    Closed,
    Unresolved,
    Opened,
}

impl Direction {
    const fn index(self) -> usize {
        self as usize
    }
}

impl From<Resolution> for Direction {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Merged => Self::Merged,
            Resolution::Closed => Self::Closed,
            Resolution::Unresolved => Self::Unresolved,
        }
    }
}

impl Dimension {
    const fn index(self) -> usize {
        self as usize
    }
}

/// Typed counter table for one bucket: one non-negative count per
/// `(direction, dimension)` pair. Absent buckets are implicitly all-zero;
/// the aggregator materializes them on first touch via `Default`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketCounters {
    counts: [[u64; 2]; 4],
}

impl BucketCounters {
    /// Current count for a `(direction, dimension)` pair.
    #[must_use]
    pub const fn get(&self, direction: Direction, dimension: Dimension) -> u64 {
        self.counts[direction.index()][dimension.index()]
    }

    /// Add `amount` to a `(direction, dimension)` pair.
    pub const fn add(&mut self, direction: Direction, dimension: Dimension, amount: u64) {
        self.counts[direction.index()][dimension.index()] += amount;
    }

    /// Check the snapshot invariant: for each dimension,
    /// `opened == merged + closed + unresolved`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        Dimension::iter().all(|dim| {
            let components = self.get(Direction::Merged, dim) + self.get(Direction::Closed, dim) + self.get(Direction::Unresolved, dim);
            self.get(Direction::Opened, dim) == components
        })
    }
}

/// The ordered column set for a run: the cross product of directions and the
/// run's dimensions, direction-major.
#[must_use]
pub fn columns(dimension: Option<Dimension>) -> Vec<(Direction, Dimension)> {
    let dims: Vec<Dimension> = match dimension {
        Some(dim) => vec![dim],
        None => Dimension::iter().collect(),
    };

    Direction::iter().flat_map(|direction| dims.iter().map(move |&dim| (direction, dim))).collect()
}

/// Display label for a counter column, e.g. `merged external`.
#[must_use]
pub fn column_label(direction: Direction, dimension: Dimension) -> String {
    format!("{direction} {dimension}")
}
