// THEORY:
// A `Region` is one connected patch of "changed" pixels, reduced to the two facts
// the rest of the system cares about: how much area it encloses and where its
// centre is.
//
// Key principles:
// 1.  **Enclosed area, not pixel count**: the area is the area of the traced outer
//     border polygon, computed from image moments (Green's theorem). A ring-shaped
//     change therefore counts its hole, and a concave silhouette is measured by the
//     shape it outlines.
// 2.  **Optional centre**: a contour that collapses to a point or a line has a zero
//     zeroth moment and no meaningful centroid; it still has (zero) area.
// 3.  **Dumb data container**: like the blobs it replaces, a `Region` belongs to a
//     single frame comparison and has no memory of earlier frames.

use imageproc::point::Point;

/// A point in image coordinates, truncated to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Centroid {
    pub x: i32,
    pub y: i32,
}

impl Centroid {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Running pairwise average: the result sits halfway between `self` and `other`,
    /// rounded toward negative infinity.
    pub fn merge(self, other: Centroid) -> Centroid {
        Centroid {
            x: (self.x + other.x).div_euclid(2),
            y: (self.y + other.y).div_euclid(2),
        }
    }
}

/// Spatial moments of a closed polygon up to first order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    /// Integrates the moments over the polygon described by `points`, closing it
    /// implicitly from the last vertex back to the first. The sign of the result
    /// follows the winding order and is normalized so `m00` is non-negative.
    pub fn from_points(points: &[Point<i32>]) -> Self {
        if points.len() < 3 {
            return Self::default();
        }

        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;

        let next = points.iter().cycle().skip(1);
        for (p, q) in points.iter().zip(next) {
            let (x0, y0) = (p.x as f64, p.y as f64);
            let (x1, y1) = (q.x as f64, q.y as f64);
            let cross = x0 * y1 - x1 * y0;
            m00 += cross;
            m10 += cross * (x0 + x1);
            m01 += cross * (y0 + y1);
        }

        let moments = Self {
            m00: m00 / 2.0,
            m10: m10 / 6.0,
            m01: m01 / 6.0,
        };

        if moments.m00 < 0.0 {
            Self {
                m00: -moments.m00,
                m10: -moments.m10,
                m01: -moments.m01,
            }
        } else {
            moments
        }
    }

    pub fn centroid(&self) -> Option<Centroid> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Centroid {
            x: (self.m10 / self.m00) as i32,
            y: (self.m01 / self.m00) as i32,
        })
    }
}

/// One external contour of the change mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Area enclosed by the contour, in square pixels.
    pub area: f64,
    /// Centre of the enclosed area, if the contour encloses any.
    pub centroid: Option<Centroid>,
}

impl Region {
    pub fn new(area: f64, centroid: Option<Centroid>) -> Self {
        Self { area, centroid }
    }

    pub fn from_contour(points: &[Point<i32>]) -> Self {
        let moments = PolygonMoments::from_points(points);
        Self {
            area: moments.m00,
            centroid: moments.centroid(),
        }
    }
}
