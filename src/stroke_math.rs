//! Cap and join geometry for the stroke generator.
//!
//! Every shape offsets the centerline by the half-width `w`. For a segment
//! `v0 -> v1` of length `d` the offset vector is
//! `(w * (v1.y - v0.y) / d, w * (v1.x - v0.x) / d)`; the forward outline runs
//! along `(v.x + dx, v.y - dy)`. Output points are appended, never cleared.

use core::f64::consts::PI;

use crate::basics::PointD;
use crate::curves::MAX_CURVE_STEPS;
use crate::math::{calc_distance, calc_intersection, cross_product};

/// Smallest ratio of inner miter length to half-width accepted at inner
/// corners before falling back to a bevel pair.
const INNER_MITER_LIMIT: f64 = 1.01;

// ============================================================================
// Traits
// ============================================================================

/// Closing geometry at a free end of an open contour.
///
/// `v0` is the end point, `v1` its neighbour on the contour and `d` the
/// distance between them. The shape starts on the left of `v0 -> v1` and ends
/// on its right.
pub trait Cap {
    fn calc(&self, output: &mut Vec<PointD>, w: f64, v0: &PointD, d: f64, v1: &PointD);
}

/// Corner geometry at `v1`, between `v0 -> v1` (length `d01`) and
/// `v1 -> v2` (length `d12`).
pub trait Join {
    #[allow(clippy::too_many_arguments)]
    fn calc(
        &self,
        output: &mut Vec<PointD>,
        w: f64,
        v0: &PointD,
        d01: f64,
        v1: &PointD,
        d12: f64,
        v2: &PointD,
    );
}

// ============================================================================
// Style enums
// ============================================================================

/// Line cap style for the free ends of open subpaths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum LineCap {
    #[default]
    Butt,
    Square,
    Round,
}

/// Line join style at interior vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// The cap and join currently selected by a stroker, with the parameters the
/// round and miter shapes need.
///
/// Dispatches to `ButtCap`, `SquareCap`, `RoundCap`, `MiterJoin`, `RoundJoin`
/// and `BevelJoin`. Replacing a style is a plain field store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub approximation_scale: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            approximation_scale: 1.0,
        }
    }
}

impl Cap for StrokeStyle {
    fn calc(&self, output: &mut Vec<PointD>, w: f64, v0: &PointD, d: f64, v1: &PointD) {
        match self.line_cap {
            LineCap::Butt => ButtCap.calc(output, w, v0, d, v1),
            LineCap::Square => SquareCap.calc(output, w, v0, d, v1),
            LineCap::Round => RoundCap::new(self.approximation_scale).calc(output, w, v0, d, v1),
        }
    }
}

impl Join for StrokeStyle {
    fn calc(
        &self,
        output: &mut Vec<PointD>,
        w: f64,
        v0: &PointD,
        d01: f64,
        v1: &PointD,
        d12: f64,
        v2: &PointD,
    ) {
        match self.line_join {
            LineJoin::Miter => {
                MiterJoin::new(self.miter_limit).calc(output, w, v0, d01, v1, d12, v2)
            }
            LineJoin::Round => {
                RoundJoin::new(self.approximation_scale).calc(output, w, v0, d01, v1, d12, v2)
            }
            LineJoin::Bevel => {
                BevelJoin::new(self.approximation_scale).calc(output, w, v0, d01, v1, d12, v2)
            }
        }
    }
}

// ============================================================================
// Caps
// ============================================================================

/// Ends flush with the end point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtCap;

/// Extends past the end point by the half-width.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareCap;

/// Half-circle around the end point.
#[derive(Debug, Clone, Copy)]
pub struct RoundCap {
    approximation_scale: f64,
}

impl RoundCap {
    pub fn new(approximation_scale: f64) -> Self {
        Self {
            approximation_scale,
        }
    }
}

impl Default for RoundCap {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Cap for ButtCap {
    fn calc(&self, output: &mut Vec<PointD>, w: f64, v0: &PointD, d: f64, v1: &PointD) {
        let dx = w * (v1.y - v0.y) / d;
        let dy = w * (v1.x - v0.x) / d;
        output.push(PointD::new(v0.x - dx, v0.y + dy));
        output.push(PointD::new(v0.x + dx, v0.y - dy));
    }
}

impl Cap for SquareCap {
    fn calc(&self, output: &mut Vec<PointD>, w: f64, v0: &PointD, d: f64, v1: &PointD) {
        let dx = w * (v1.y - v0.y) / d;
        let dy = w * (v1.x - v0.x) / d;
        output.push(PointD::new(v0.x - dx - dy, v0.y + dy - dx));
        output.push(PointD::new(v0.x + dx - dy, v0.y - dy - dx));
    }
}

impl Cap for RoundCap {
    fn calc(&self, output: &mut Vec<PointD>, w: f64, v0: &PointD, d: f64, v1: &PointD) {
        let dx = w * (v1.y - v0.y) / d;
        let dy = w * (v1.x - v0.x) / d;

        let n = arc_steps(PI, arc_step(w, self.approximation_scale));
        let da = PI / (n + 1) as f64;

        output.push(PointD::new(v0.x - dx, v0.y + dy));
        let mut a = dy.atan2(-dx) + da;
        for _ in 0..n {
            output.push(PointD::new(v0.x + a.cos() * w, v0.y + a.sin() * w));
            a += da;
        }
        output.push(PointD::new(v0.x + dx, v0.y - dy));
    }
}

// ============================================================================
// Joins
// ============================================================================

/// Extends both offset edges to their intersection, truncating the corner
/// once it is longer than `limit` half-widths.
#[derive(Debug, Clone, Copy)]
pub struct MiterJoin {
    limit: f64,
}

impl MiterJoin {
    pub fn new(limit: f64) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }
}

impl Default for MiterJoin {
    fn default() -> Self {
        Self::new(4.0)
    }
}

/// Circular arc around the corner.
#[derive(Debug, Clone, Copy)]
pub struct RoundJoin {
    approximation_scale: f64,
}

impl RoundJoin {
    pub fn new(approximation_scale: f64) -> Self {
        Self {
            approximation_scale,
        }
    }
}

impl Default for RoundJoin {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Straight edge across the corner.
#[derive(Debug, Clone, Copy)]
pub struct BevelJoin {
    approximation_scale: f64,
}

impl BevelJoin {
    /// `approximation_scale` decides when a shallow corner is drawn as a
    /// single point instead of a bevel.
    pub fn new(approximation_scale: f64) -> Self {
        Self {
            approximation_scale,
        }
    }
}

impl Default for BevelJoin {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Offset vectors of both segments meeting at a corner.
#[derive(Debug, Clone, Copy)]
struct Corner {
    dx1: f64,
    dy1: f64,
    dx2: f64,
    dy2: f64,
}

impl Corner {
    fn new(w: f64, v0: &PointD, d01: f64, v1: &PointD, d12: f64, v2: &PointD) -> Self {
        Self {
            dx1: w * (v1.y - v0.y) / d01,
            dy1: w * (v1.x - v0.x) / d01,
            dx2: w * (v2.y - v1.y) / d12,
            dy2: w * (v2.x - v1.x) / d12,
        }
    }

    /// End of the incoming offset edge.
    fn first(&self, v1: &PointD) -> PointD {
        PointD::new(v1.x + self.dx1, v1.y - self.dy1)
    }

    /// Start of the outgoing offset edge.
    fn second(&self, v1: &PointD) -> PointD {
        PointD::new(v1.x + self.dx2, v1.y - self.dy2)
    }

    fn bevel(&self, output: &mut Vec<PointD>, v1: &PointD) {
        output.push(self.first(v1));
        output.push(self.second(v1));
    }

    /// Intersection of the two offset edges, if they are not parallel.
    fn intersection(&self, v0: &PointD, v1: &PointD, v2: &PointD) -> Option<(f64, f64)> {
        calc_intersection(
            v0.x + self.dx1,
            v0.y - self.dy1,
            v1.x + self.dx1,
            v1.y - self.dy1,
            v1.x + self.dx2,
            v1.y - self.dy2,
            v2.x + self.dx2,
            v2.y - self.dy2,
        )
    }

    /// Distance from `v1` to the middle of the bevel edge.
    fn bevel_distance(&self) -> f64 {
        let dx = (self.dx1 + self.dx2) / 2.0;
        let dy = (self.dy1 + self.dy2) / 2.0;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Handle the corner if it turns toward the offset side. Returns `false` for
/// outer corners, which are left to the selected join.
fn inner_join(
    output: &mut Vec<PointD>,
    w: f64,
    corner: &Corner,
    (v0, d01): (&PointD, f64),
    v1: &PointD,
    (v2, d12): (&PointD, f64),
) -> bool {
    let cp = cross_product(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
    if cp == 0.0 || (cp > 0.0) != (w > 0.0) {
        return false;
    }
    let limit = (d01.min(d12) / w).max(INNER_MITER_LIMIT);
    if !miter(output, w, corner, v0, v1, v2, limit) {
        corner.bevel(output, v1);
    }
    true
}

/// Emit the miter point at `v1`. Returns `false`, emitting nothing, when the
/// miter is longer than `limit` half-widths; the caller picks the fallback.
/// When the edges are parallel and point the same way a single offset point
/// is emitted.
fn miter(
    output: &mut Vec<PointD>,
    w: f64,
    corner: &Corner,
    v0: &PointD,
    v1: &PointD,
    v2: &PointD,
    limit: f64,
) -> bool {
    match corner.intersection(v0, v1, v2) {
        Some((xi, yi)) => {
            if calc_distance(v1.x, v1.y, xi, yi) <= w * limit {
                output.push(PointD::new(xi, yi));
                return true;
            }
            false
        }
        None => {
            let p = corner.first(v1);
            if (cross_product(v0.x, v0.y, v1.x, v1.y, p.x, p.y) < 0.0)
                == (cross_product(v1.x, v1.y, v2.x, v2.y, p.x, p.y) < 0.0)
            {
                output.push(p);
                return true;
            }
            false
        }
    }
}

impl Join for MiterJoin {
    fn calc(
        &self,
        output: &mut Vec<PointD>,
        w: f64,
        v0: &PointD,
        d01: f64,
        v1: &PointD,
        d12: f64,
        v2: &PointD,
    ) {
        let corner = Corner::new(w, v0, d01, v1, d12, v2);
        if inner_join(output, w, &corner, (v0, d01), v1, (v2, d12)) {
            return;
        }
        if miter(output, w, &corner, v0, v1, v2, self.limit) {
            return;
        }
        let dbevel = corner.bevel_distance();

        // Truncate the miter at `limit` half-widths from the corner.
        let lim = w * self.limit;
        match corner.intersection(v0, v1, v2) {
            Some((xi, yi)) => {
                let di = calc_distance(v1.x, v1.y, xi, yi);
                let k = (lim - dbevel) / (di - dbevel);
                let p1 = corner.first(v1);
                let p2 = corner.second(v1);
                output.push(PointD::new(p1.x + (xi - p1.x) * k, p1.y + (yi - p1.y) * k));
                output.push(PointD::new(p2.x + (xi - p2.x) * k, p2.y + (yi - p2.y) * k));
            }
            None => {
                // The contour doubles back on itself.
                let Corner { dx1, dy1, dx2, dy2 } = corner;
                let m = self.limit;
                output.push(PointD::new(v1.x + dx1 + dy1 * m, v1.y - dy1 + dx1 * m));
                output.push(PointD::new(v1.x + dx2 - dy2 * m, v1.y - dy2 - dx2 * m));
            }
        }
    }
}

impl Join for RoundJoin {
    fn calc(
        &self,
        output: &mut Vec<PointD>,
        w: f64,
        v0: &PointD,
        d01: f64,
        v1: &PointD,
        d12: f64,
        v2: &PointD,
    ) {
        let corner = Corner::new(w, v0, d01, v1, d12, v2);
        if inner_join(output, w, &corner, (v0, d01), v1, (v2, d12)) {
            return;
        }
        if nearly_straight(output, w, self.approximation_scale, &corner, v0, v1, v2) {
            return;
        }
        calc_arc(
            output,
            w,
            self.approximation_scale,
            v1,
            (corner.dx1, -corner.dy1),
            (corner.dx2, -corner.dy2),
        );
    }
}

impl Join for BevelJoin {
    fn calc(
        &self,
        output: &mut Vec<PointD>,
        w: f64,
        v0: &PointD,
        d01: f64,
        v1: &PointD,
        d12: f64,
        v2: &PointD,
    ) {
        let corner = Corner::new(w, v0, d01, v1, d12, v2);
        if inner_join(output, w, &corner, (v0, d01), v1, (v2, d12)) {
            return;
        }
        if nearly_straight(output, w, self.approximation_scale, &corner, v0, v1, v2) {
            return;
        }
        corner.bevel(output, v1);
    }
}

/// An outer corner whose bevel would deviate from the arc by less than
/// `w / 1024` collapses to a single point.
fn nearly_straight(
    output: &mut Vec<PointD>,
    w: f64,
    approximation_scale: f64,
    corner: &Corner,
    v0: &PointD,
    v1: &PointD,
    v2: &PointD,
) -> bool {
    if approximation_scale * (w - corner.bevel_distance()) >= w / 1024.0 {
        return false;
    }
    match corner.intersection(v0, v1, v2) {
        Some((xi, yi)) => output.push(PointD::new(xi, yi)),
        None => output.push(corner.first(v1)),
    }
    true
}

// ============================================================================
// Arcs
// ============================================================================

/// Angular step that keeps an arc of radius `w` within `0.125 / scale` of
/// the true circle.
fn arc_step(w: f64, approximation_scale: f64) -> f64 {
    (w / (w + 0.125 / approximation_scale)).acos() * 2.0
}

/// Number of intermediate points for a sweep of `angle` radians.
fn arc_steps(angle: f64, da: f64) -> usize {
    let n = angle / da;
    if n.is_finite() && n > 0.0 {
        (n as usize).min(MAX_CURVE_STEPS as usize)
    } else {
        0
    }
}

/// Counter-clockwise arc around `center` from offset `d1` to offset `d2`,
/// both endpoints included.
fn calc_arc(
    output: &mut Vec<PointD>,
    w: f64,
    approximation_scale: f64,
    center: &PointD,
    d1: (f64, f64),
    d2: (f64, f64),
) {
    let mut a1 = d1.1.atan2(d1.0);
    let mut a2 = d2.1.atan2(d2.0);
    if a1 > a2 {
        a2 += 2.0 * PI;
    }

    output.push(PointD::new(center.x + d1.0, center.y + d1.1));
    let n = arc_steps(a2 - a1, arc_step(w, approximation_scale));
    let da = (a2 - a1) / (n + 1) as f64;
    a1 += da;
    for _ in 0..n {
        output.push(PointD::new(center.x + a1.cos() * w, center.y + a1.sin() * w));
        a1 += da;
    }
    output.push(PointD::new(center.x + d2.0, center.y + d2.1));
}

// ============================================================================
// Tests
// ============================================================================
