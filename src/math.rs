//! Geometric math utilities.
//!
//! Distances, cross products and line intersection used by the stroker, the
//! dasher and the curve flattener.

// ============================================================================
// Constants
// ============================================================================

/// Coinciding points maximal distance (epsilon).
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

/// Epsilon for intersection calculations.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

// ============================================================================
// Cross product
// ============================================================================

/// Cross product of vectors (x2-x1, y2-y1) and (x-x2, y-y2).
/// The sign indicates which side of the line (x1,y1)→(x2,y2) the point (x,y) is on.
#[inline]
pub fn cross_product(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> f64 {
    (x - x2) * (y2 - y1) - (y - y2) * (x2 - x1)
}

// ============================================================================
// Distance calculations
// ============================================================================

/// Euclidean distance between two points.
#[inline]
pub fn calc_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Squared Euclidean distance between two points.
#[inline]
pub fn calc_sq_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

// ============================================================================
// Intersection
// ============================================================================

/// Intersection point of the infinite lines through (ax,ay)→(bx,by) and
/// (cx,cy)→(dx,dy). Returns `None` if they are parallel.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn calc_intersection(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    dx: f64,
    dy: f64,
) -> Option<(f64, f64)> {
    let num = (ay - cy) * (dx - cx) - (ax - cx) * (dy - cy);
    let den = (bx - ax) * (dy - cy) - (by - ay) * (dx - cx);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some((ax + r * (bx - ax), ay + r * (by - ay)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_product_sides() {
        // Points on either side of the x axis have opposite signs.
        let left = cross_product(0.0, 0.0, 10.0, 0.0, 5.0, 5.0);
        let right = cross_product(0.0, 0.0, 10.0, 0.0, 5.0, -5.0);
        assert!(left * right < 0.0);
        assert_eq!(cross_product(0.0, 0.0, 10.0, 0.0, 20.0, 0.0), 0.0);
    }

    #[test]
    fn test_distances() {
        assert!((calc_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-12);
        assert!((calc_sq_distance(0.0, 0.0, 3.0, 4.0) - 25.0).abs() < 1e-12);
        assert_eq!(calc_distance(1.0, 1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_intersection() {
        let (x, y) = calc_intersection(0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0)
            .expect("diagonals intersect");
        assert!((x - 5.0).abs() < 1e-12);
        assert!((y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_intersection_parallel() {
        assert!(calc_intersection(0.0, 0.0, 10.0, 0.0, 0.0, 1.0, 10.0, 1.0).is_none());
    }
}
