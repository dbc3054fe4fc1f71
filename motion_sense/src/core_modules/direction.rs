// THEORY:
// Direction is the only piece of "memory" the system reports on. It compares the
// merged motion centroid of this frame against the one from the previous frame
// and names the dominant axis shifts.
//
// Each axis is judged independently against a fixed margin, so small jitter of the
// centroid (which moves a few pixels even for a still scene with flicker) is never
// reported. When either centroid is missing there is nothing to compare and the
// answer is simply empty.

use crate::core_modules::region::Centroid;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Up,
    Down,
}

/// Coarse movement between two centroids. Either component may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Direction {
    pub horizontal: Option<Horizontal>,
    pub vertical: Option<Vertical>,
}

impl Direction {
    /// Derives the direction of travel from `prev` to `cur`.
    pub fn between(cur: Centroid, prev: Centroid, margin: i32) -> Self {
        let dx = cur.x - prev.x;
        let dy = cur.y - prev.y;

        let horizontal = (dx.abs() > margin).then(|| if dx > 0 { Horizontal::Right } else { Horizontal::Left });
        let vertical = (dy.abs() > margin).then(|| if dy > 0 { Vertical::Down } else { Vertical::Up });

        Self { horizontal, vertical }
    }

    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(h) = self.horizontal {
            f.write_str(match h {
                Horizontal::Left => "Left",
                Horizontal::Right => "Right",
            })?;
        }
        if let Some(v) = self.vertical {
            if self.horizontal.is_some() {
                f.write_str("-")?;
            }
            f.write_str(match v {
                Vertical::Up => "Up",
                Vertical::Down => "Down",
            })?;
        }
        Ok(())
    }
}

/// Names the movement from `prev` to `cur`, or returns an empty string when either
/// centroid is missing or neither axis moved past `margin`.
pub fn classify(cur: Option<Centroid>, prev: Option<Centroid>, margin: i32) -> String {
    match (cur, prev) {
        (Some(cur), Some(prev)) => Direction::between(cur, prev, margin).to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGIN: i32 = 15;

    fn at(x: i32, y: i32) -> Option<Centroid> {
        Some(Centroid::new(x, y))
    }

    #[test]
    fn needs_both_centroids() {
        assert_eq!(classify(None, at(0, 0), MARGIN), "");
        assert_eq!(classify(at(100, 100), None, MARGIN), "");
        assert_eq!(classify(None, None, MARGIN), "");
    }

    #[test]
    fn margin_is_exclusive() {
        assert_eq!(classify(at(115, 100), at(100, 100), MARGIN), "");
        assert_eq!(classify(at(116, 100), at(100, 100), MARGIN), "Right");
        assert_eq!(classify(at(84, 100), at(100, 100), MARGIN), "Left");
        assert_eq!(classify(at(100, 115), at(100, 100), MARGIN), "");
        assert_eq!(classify(at(100, 84), at(100, 100), MARGIN), "Up");
    }

    #[test]
    fn diagonal_moves_join_with_one_hyphen() {
        assert_eq!(classify(at(116, 116), at(100, 100), MARGIN), "Right-Down");
        assert_eq!(classify(at(84, 84), at(100, 100), MARGIN), "Left-Up");
        assert_eq!(classify(at(100, 130), at(100, 100), MARGIN), "Down");
    }

    #[test]
    fn empty_direction_displays_nothing() {
        let still = Direction::between(Centroid::new(5, 5), Centroid::new(0, 0), MARGIN);
        assert!(still.is_empty());
        assert_eq!(still.to_string(), "");
    }
}
