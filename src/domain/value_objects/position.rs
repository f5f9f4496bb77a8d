//! Position value object - A point on the delivery grid

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::errors::PositionError;

pub const MIN_COORD: i32 = 1;
pub const MAX_COORD: i32 = 10;

/// Grid axis, reported by range validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Immutable grid coordinate with both axes in `MIN_COORD..=MAX_COORD`
///
/// Fields are private so an out-of-range position can never be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Result<Self, PositionError> {
        check_axis(Axis::X, x)?;
        check_axis(Axis::Y, y)?;
        Ok(Self { x, y })
    }

    /// Uniformly random position inside the grid
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            x: rng.gen_range(MIN_COORD..=MAX_COORD),
            y: rng.gen_range(MIN_COORD..=MAX_COORD),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Manhattan distance
    pub fn distance_to(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Move at most `budget` Manhattan units toward `target`, x axis first
    ///
    /// The x displacement is clamped to the budget and whatever remains is
    /// spent on y. Lands exactly on `target` when it is within reach.
    pub fn step_toward(&self, target: &Position, budget: i32) -> Position {
        let budget = budget.max(0);
        let dx = (target.x - self.x).clamp(-budget, budget);
        let remaining = budget - dx.abs();
        let dy = (target.y - self.y).clamp(-remaining, remaining);

        // Both axes land between two valid coordinates, so the result is in range.
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

fn check_axis(axis: Axis, value: i32) -> Result<(), PositionError> {
    if (MIN_COORD..=MAX_COORD).contains(&value) {
        Ok(())
    } else {
        Err(PositionError::OutOfRange {
            axis,
            value,
            min: MIN_COORD,
            max: MAX_COORD,
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// Deserialization goes through the validating constructor.
impl<'de> Deserialize<'de> for Position {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            x: i32,
            y: i32,
        }

        let raw = Raw::deserialize(deserializer)?;
        Position::new(raw.x, raw.y).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_in_range_coordinate_is_accepted() {
        for x in MIN_COORD..=MAX_COORD {
            for y in MIN_COORD..=MAX_COORD {
                assert!(Position::new(x, y).is_ok(), "({x}, {y}) should be valid");
            }
        }
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        assert_eq!(
            Position::new(0, 5),
            Err(PositionError::OutOfRange {
                axis: Axis::X,
                value: 0,
                min: MIN_COORD,
                max: MAX_COORD
            })
        );
        assert!(matches!(
            Position::new(5, 11),
            Err(PositionError::OutOfRange { axis: Axis::Y, value: 11, .. })
        ));
        assert!(Position::new(-3, -3).is_err());
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(1, 1).unwrap();
        let b = Position::new(5, 3).unwrap();
        assert_eq!(a.distance_to(&b), 6);
        assert_eq!(b.distance_to(&a), 6);
        assert_eq!(a.distance_to(&a), 0);
    }

    #[test]
    fn test_step_toward_spends_x_budget_first() {
        let from = Position::new(1, 1).unwrap();
        let target = Position::new(5, 5).unwrap();

        assert_eq!(from.step_toward(&target, 2), Position::new(3, 1).unwrap());
        assert_eq!(from.step_toward(&target, 6), Position::new(5, 3).unwrap());
        assert_eq!(from.step_toward(&target, 100), target);
        assert_eq!(from.step_toward(&target, 0), from);
    }

    #[test]
    fn test_step_toward_handles_negative_directions() {
        let from = Position::new(8, 9).unwrap();
        let target = Position::new(7, 2).unwrap();

        assert_eq!(from.step_toward(&target, 3), Position::new(7, 7).unwrap());
    }

    #[test]
    fn test_step_toward_never_overshoots_and_always_progresses() {
        for speed in 1..=5 {
            for tx in MIN_COORD..=MAX_COORD {
                for ty in MIN_COORD..=MAX_COORD {
                    let from = Position::new(4, 7).unwrap();
                    let target = Position::new(tx, ty).unwrap();
                    let next = from.step_toward(&target, speed);

                    assert!(from.distance_to(&next) <= speed);
                    if from != target {
                        assert!(next.distance_to(&target) < from.distance_to(&target));
                    }
                }
            }
        }
    }

    #[test]
    fn test_random_position_stays_in_range() {
        for _ in 0..200 {
            let p = Position::random();
            assert!((MIN_COORD..=MAX_COORD).contains(&p.x()));
            assert!((MIN_COORD..=MAX_COORD).contains(&p.y()));
        }
    }

    #[test]
    fn test_deserialize_validates_range() {
        let ok: Position = serde_json::from_str(r#"{"x":2,"y":9}"#).unwrap();
        assert_eq!(ok, Position::new(2, 9).unwrap());

        let bad: Result<Position, _> = serde_json::from_str(r#"{"x":2,"y":42}"#);
        assert!(bad.is_err());
    }
}
