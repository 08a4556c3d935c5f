//! Bezier curve flattening (quadratic and cubic).
//!
//! A curve segment is an immutable value; `iterate()` hands out a lazy,
//! non-restartable vertex source that walks it in uniform parametric steps.
//! The step fraction comes from the ratio between the longest allowed
//! straight segment and an estimate of the curve's arc length, so larger
//! tolerances produce fewer, longer segments.
//!
//! Every iterator emits `MoveTo(start)`, a run of `LineTo` at interior
//! parameters, a final `LineTo` at the exact end point, then `Stop` forever.
//! Independent iterators over the same segment never interfere.

use crate::basics::{PathCommand, PointD, VertexSource};
use crate::math::calc_distance;

// ============================================================================
// Constants
// ============================================================================

/// Default longest straight segment used to approximate a curve.
pub const DEFAULT_SEGMENT_LENGTH: f64 = 1.0;

/// Upper bound on the number of segments a single curve is split into.
pub const MAX_CURVE_STEPS: u32 = 4096;

/// Absorbs rounding in `1 / step` so exact fractions (0.2, 0.25, ...) do not
/// gain a spurious extra segment.
const STEP_EPSILON: f64 = 1e-9;

/// Number of segments for a parametric step, and the step actually used.
fn subdivision(step: f64) -> (u32, f64) {
    if step.is_nan() || step >= 1.0 {
        return (1, 1.0);
    }
    let min_step = 1.0 / MAX_CURVE_STEPS as f64;
    if step <= min_step {
        return (MAX_CURVE_STEPS, min_step);
    }
    let steps = (1.0 / step - STEP_EPSILON).ceil() as u32;
    (steps.clamp(1, MAX_CURVE_STEPS), step)
}

fn sanitize_segment_length(len: f64) -> f64 {
    if len.is_finite() && len > 0.0 {
        len
    } else {
        log::warn!(
            "invalid curve segment length {}, using {}",
            len,
            DEFAULT_SEGMENT_LENGTH
        );
        DEFAULT_SEGMENT_LENGTH
    }
}

/// Parametric step for a curve of `length` split into `segment_length` chunks.
/// Zero-length (fully degenerate) curves get a single segment.
fn step_for(segment_length: f64, length: f64) -> f64 {
    if length > 0.0 && length.is_finite() {
        segment_length / length
    } else {
        1.0
    }
}

// ============================================================================
// Progress
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Param {
    Start,
    At(f64),
    End,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Progress {
    step: f64,
    steps: u32,
    index: u32,
}

impl Progress {
    fn new(step: f64) -> Self {
        let (steps, step) = subdivision(step);
        Self {
            step,
            steps,
            index: 0,
        }
    }

    fn advance(&mut self) -> Param {
        let i = self.index;
        if i > self.steps {
            return Param::Done;
        }
        self.index += 1;
        if i == 0 {
            Param::Start
        } else if i < self.steps {
            Param::At(i as f64 * self.step)
        } else {
            Param::End
        }
    }
}

// ============================================================================
// Quadratic Bezier
// ============================================================================

/// Quadratic Bezier segment: start, control and end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    pub from: PointD,
    pub ctrl: PointD,
    pub to: PointD,
    segment_length: f64,
}

impl QuadraticBezier {
    pub fn new(from: PointD, ctrl: PointD, to: PointD) -> Self {
        Self {
            from,
            ctrl,
            to,
            segment_length: DEFAULT_SEGMENT_LENGTH,
        }
    }

    /// Build a segment that flattens into pieces no longer than
    /// `segment_length` (measured along the approximate arc length).
    pub fn with_segment_length(from: PointD, ctrl: PointD, to: PointD, segment_length: f64) -> Self {
        Self {
            from,
            ctrl,
            to,
            segment_length: sanitize_segment_length(segment_length),
        }
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Average of the chord and the control polygon length.
    ///
    /// Collinear control points make both terms equal, so a straight
    /// "curve" measures exactly its chord.
    pub fn approximate_length(&self) -> f64 {
        let chord = calc_distance(self.from.x, self.from.y, self.to.x, self.to.y);
        let polygon = calc_distance(self.from.x, self.from.y, self.ctrl.x, self.ctrl.y)
            + calc_distance(self.ctrl.x, self.ctrl.y, self.to.x, self.to.y);
        0.5 * (chord + polygon)
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn sample(&self, t: f64) -> PointD {
        quadratic_at(self.from, self.ctrl, self.to, t)
    }

    pub fn iterate(&self) -> QuadraticIter {
        QuadraticIter::new(
            self.from,
            self.ctrl,
            self.to,
            step_for(self.segment_length, self.approximate_length()),
        )
    }
}

#[inline]
fn quadratic_at(b: PointD, c: PointD, e: PointD, t: f64) -> PointD {
    let mt = 1.0 - t;
    let k0 = mt * mt;
    let k1 = 2.0 * t * mt;
    let k2 = t * t;
    PointD::new(
        k0 * b.x + k1 * c.x + k2 * e.x,
        k0 * b.y + k1 * c.y + k2 * e.y,
    )
}

/// Vertex source over a quadratic segment.
///
/// `rewind` is a no-op: the iterator cannot be restarted; ask the segment for
/// a new one instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticIter {
    from: PointD,
    ctrl: PointD,
    to: PointD,
    progress: Progress,
}

impl QuadraticIter {
    /// Iterate with an explicit parametric `step` in `(0, 1]`.
    pub fn new(from: PointD, ctrl: PointD, to: PointD, step: f64) -> Self {
        Self {
            from,
            ctrl,
            to,
            progress: Progress::new(step),
        }
    }

    /// Number of straight segments this iterator produces in total.
    pub fn steps(&self) -> u32 {
        self.progress.steps
    }
}

impl VertexSource for QuadraticIter {
    fn rewind(&mut self, _path_id: u32) {}

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        let p = match self.progress.advance() {
            Param::Start => {
                *x = self.from.x;
                *y = self.from.y;
                return PathCommand::MoveTo;
            }
            Param::At(t) => quadratic_at(self.from, self.ctrl, self.to, t),
            Param::End => self.to,
            Param::Done => return PathCommand::Stop,
        };
        *x = p.x;
        *y = p.y;
        PathCommand::LineTo
    }
}

// ============================================================================
// Cubic Bezier
// ============================================================================

/// Cubic Bezier segment: start, two control points and end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub from: PointD,
    pub ctrl1: PointD,
    pub ctrl2: PointD,
    pub to: PointD,
    segment_length: f64,
}

impl CubicBezier {
    pub fn new(from: PointD, ctrl1: PointD, ctrl2: PointD, to: PointD) -> Self {
        Self {
            from,
            ctrl1,
            ctrl2,
            to,
            segment_length: DEFAULT_SEGMENT_LENGTH,
        }
    }

    pub fn with_segment_length(
        from: PointD,
        ctrl1: PointD,
        ctrl2: PointD,
        to: PointD,
        segment_length: f64,
    ) -> Self {
        Self {
            from,
            ctrl1,
            ctrl2,
            to,
            segment_length: sanitize_segment_length(segment_length),
        }
    }

    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Average of the chord and the control polygon length.
    pub fn approximate_length(&self) -> f64 {
        let chord = calc_distance(self.from.x, self.from.y, self.to.x, self.to.y);
        let polygon = calc_distance(self.from.x, self.from.y, self.ctrl1.x, self.ctrl1.y)
            + calc_distance(self.ctrl1.x, self.ctrl1.y, self.ctrl2.x, self.ctrl2.y)
            + calc_distance(self.ctrl2.x, self.ctrl2.y, self.to.x, self.to.y);
        0.5 * (chord + polygon)
    }

    pub fn sample(&self, t: f64) -> PointD {
        cubic_at(self.from, self.ctrl1, self.ctrl2, self.to, t)
    }

    pub fn iterate(&self) -> CubicIter {
        CubicIter::new(
            self.from,
            self.ctrl1,
            self.ctrl2,
            self.to,
            step_for(self.segment_length, self.approximate_length()),
        )
    }
}

#[inline]
fn cubic_at(b: PointD, c1: PointD, c2: PointD, e: PointD, t: f64) -> PointD {
    let mt = 1.0 - t;
    let k0 = mt * mt * mt;
    let k1 = 3.0 * t * mt * mt;
    let k2 = 3.0 * t * t * mt;
    let k3 = t * t * t;
    PointD::new(
        k0 * b.x + k1 * c1.x + k2 * c2.x + k3 * e.x,
        k0 * b.y + k1 * c1.y + k2 * c2.y + k3 * e.y,
    )
}

/// Vertex source over a cubic segment. Not restartable, like
/// [`QuadraticIter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicIter {
    from: PointD,
    ctrl1: PointD,
    ctrl2: PointD,
    to: PointD,
    progress: Progress,
}

impl CubicIter {
    pub fn new(from: PointD, ctrl1: PointD, ctrl2: PointD, to: PointD, step: f64) -> Self {
        Self {
            from,
            ctrl1,
            ctrl2,
            to,
            progress: Progress::new(step),
        }
    }

    pub fn steps(&self) -> u32 {
        self.progress.steps
    }
}

impl VertexSource for CubicIter {
    fn rewind(&mut self, _path_id: u32) {}

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        let p = match self.progress.advance() {
            Param::Start => {
                *x = self.from.x;
                *y = self.from.y;
                return PathCommand::MoveTo;
            }
            Param::At(t) => cubic_at(self.from, self.ctrl1, self.ctrl2, self.to, t),
            Param::End => self.to,
            Param::Done => return PathCommand::Stop,
        };
        *x = p.x;
        *y = p.y;
        PathCommand::LineTo
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::point;

    fn collect<VS: VertexSource>(vs: &mut VS) -> Vec<(f64, f64, PathCommand)> {
        let mut result = Vec::new();
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = vs.vertex(&mut x, &mut y);
            if cmd.is_stop() {
                break;
            }
            result.push((x, y, cmd));
        }
        result
    }

    fn commands<VS: VertexSource>(vs: &mut VS) -> Vec<PathCommand> {
        collect(vs).into_iter().map(|v| v.2).collect()
    }

    fn assert_points(actual: &[(f64, f64, PathCommand)], expected: &[(f64, f64, PathCommand)]) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert_eq!(a.2, e.2);
            assert!((a.0 - e.0).abs() < 1e-5, "x {} != {}", a.0, e.0);
            assert!((a.1 - e.1).abs() < 1e-5, "y {} != {}", a.1, e.1);
        }
    }

    use PathCommand::{LineTo as L, MoveTo as M};

    #[test]
    fn test_first_vertex_is_move_to_start() {
        let b = QuadraticBezier::new(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0));
        let mut i = b.iterate();
        let (mut x, mut y) = (11.0, 13.0);
        assert_eq!(i.vertex(&mut x, &mut y), PathCommand::MoveTo);
        assert_eq!((x, y), (0.0, 0.0));
    }

    #[test]
    fn test_coarse_quadratic_produces_line() {
        let b1 = QuadraticBezier::with_segment_length(
            point(0.0, 0.0),
            point(1.0, 1.0),
            point(2.0, 0.0),
            100.0,
        );
        assert_points(&collect(&mut b1.iterate()), &[(0.0, 0.0, M), (2.0, 0.0, L)]);

        let b2 = QuadraticBezier::with_segment_length(
            point(10.0, 11.0),
            point(1.0, 1.0),
            point(13.0, 17.0),
            100.0,
        );
        assert_points(&collect(&mut b2.iterate()), &[(10.0, 11.0, M), (13.0, 17.0, L)]);
    }

    #[test]
    fn test_degenerate_quadratic_length_is_chord() {
        let b1 = QuadraticBezier::new(point(-1.0, 0.0), point(0.5, 0.25), point(2.0, 0.5));
        assert!((b1.approximate_length() - 3.041381).abs() < 1e-5);

        let b2 = QuadraticBezier::new(point(-3.0, -4.0), point(-0.3, -0.4), point(0.0, 0.0));
        assert!((b2.approximate_length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_quadratic_length_averages_chord_and_polygon() {
        let b1 = QuadraticBezier::new(point(-1.0, 0.0), point(0.0, 0.0), point(3.0, 4.0));
        assert!((b1.approximate_length() - 5.828427).abs() < 1e-5);

        // 0.5 * (13.6014705 + 5 + 8.9442719)
        let b2 = QuadraticBezier::new(point(-1.0, 2.0), point(3.0, 5.0), point(7.0, 13.0));
        assert!((b2.approximate_length() - 13.772871).abs() < 1e-5);
    }

    #[test]
    fn test_quadratic_vertex_count_follows_step() {
        let mut i1 = QuadraticIter::new(point(0.0, 0.0), point(0.5, 0.6), point(1.0, 2.0), 0.5);
        assert_eq!(commands(&mut i1), vec![M, L, L]);

        let mut i2 = QuadraticIter::new(point(0.0, 0.0), point(0.5, 0.6), point(1.0, 2.0), 0.2);
        assert_eq!(commands(&mut i2), vec![M, L, L, L, L, L]);
    }

    #[test]
    fn test_quadratic_expected_vertices() {
        let mut i1 = QuadraticIter::new(point(-3.5, 7.4), point(1.0, 2.0), point(10.1, 3.8), 0.111);
        assert_points(
            &collect(&mut i1),
            &[
                (-3.5, 7.4, M),
                (-2.44432354, 6.28991079, L),
                (-1.27529359, 5.35724497, L),
                (0.00708937645, 4.60200071, L),
                (1.40282583, 4.02417898, L),
                (2.91191530, 3.62378001, L),
                (4.53435755, 3.40080309, L),
                (6.27015400, 3.35524869, L),
                (8.11930275, 3.48711658, L),
                (10.0818052, 3.79640722, L),
                (10.1, 3.8, L),
            ],
        );

        let mut i2 = QuadraticIter::new(point(1.0, 1.0), point(0.0, 0.0), point(-1.0, 1.0), 0.3);
        assert_points(
            &collect(&mut i2),
            &[
                (1.0, 1.0, M),
                (0.4, 0.58, L),
                (-0.2, 0.52, L),
                (-0.8, 0.82, L),
                (-1.0, 1.0, L),
            ],
        );
    }

    #[test]
    fn test_cubic_vertex_count_follows_step() {
        let mut i1 = CubicIter::new(
            point(0.0, 0.0),
            point(0.5, 0.6),
            point(0.0, 0.0),
            point(1.0, 2.0),
            0.5,
        );
        assert_eq!(commands(&mut i1), vec![M, L, L]);

        let mut i2 = CubicIter::new(
            point(0.0, 0.0),
            point(0.5, 0.6),
            point(0.0, 0.0),
            point(1.0, 2.0),
            0.2,
        );
        assert_eq!(commands(&mut i2), vec![M, L, L, L, L, L]);
    }

    #[test]
    fn test_cubic_expected_vertices() {
        let mut i1 = CubicIter::new(
            point(-3.5, 7.4),
            point(1.0, 2.0),
            point(0.2, 0.3),
            point(10.1, 3.8),
            0.111,
        );
        assert_points(
            &collect(&mut i1),
            &[
                (-3.5, 7.4, M),
                (-2.17552185, 5.74061489, L),
                (-1.11155891, 4.36706400, L),
                (-0.176818520, 3.2916567, L),
                (0.759991825, 2.52670193, L),
                (1.83016467, 2.08450842, L),
                (3.16499233, 1.97738409, L),
                (4.89576817, 2.21763802, L),
                (7.15378380, 2.81757903, L),
                (10.0703335, 3.78951573, L),
                (10.1, 3.8, L),
            ],
        );

        let mut i2 = CubicIter::new(
            point(1.0, 1.0),
            point(0.0, 0.0),
            point(0.8, 0.7),
            point(-1.0, 1.0),
            0.3,
        );
        assert_points(
            &collect(&mut i2),
            &[
                (1.0, 1.0, M),
                (0.4672, 0.5023, L),
                (0.1936, 0.5824, L),
                (-0.5336, 0.9001, L),
                (-1.0, 1.0, L),
            ],
        );
    }

    #[test]
    fn test_endpoints_are_exact_for_any_tolerance() {
        let from = point(-3.25, 7.125);
        let to = point(10.1, 3.8);
        for &len in &[0.01, 0.3, 1.0, 7.0, 1000.0] {
            let q = QuadraticBezier::with_segment_length(from, point(1.0, 2.0), to, len);
            let c = CubicBezier::with_segment_length(from, point(1.0, 2.0), point(5.0, -4.0), to, len);
            for verts in [collect(&mut q.iterate()), collect(&mut c.iterate())] {
                let first = verts.first().unwrap();
                let last = verts.last().unwrap();
                assert_eq!((first.0, first.1, first.2), (from.x, from.y, M));
                assert_eq!((last.0, last.1, last.2), (to.x, to.y, L));
            }
        }
    }

    #[test]
    fn test_refinement_is_monotonic() {
        let q = |len| {
            QuadraticBezier::with_segment_length(point(0.0, 0.0), point(50.0, 80.0), point(100.0, 0.0), len)
        };
        let c = |len| {
            CubicBezier::with_segment_length(
                point(0.0, 0.0),
                point(0.0, 80.0),
                point(100.0, 80.0),
                point(100.0, 0.0),
                len,
            )
        };
        let mut prev_q = 0;
        let mut prev_c = 0;
        let mut len = 200.0;
        while len > 0.01 {
            let nq = collect(&mut q(len).iterate()).len();
            let nc = collect(&mut c(len).iterate()).len();
            assert!(nq >= prev_q, "len={} {} < {}", len, nq, prev_q);
            assert!(nc >= prev_c, "len={} {} < {}", len, nc, prev_c);
            prev_q = nq;
            prev_c = nc;
            len *= 0.7;
        }
        assert!(prev_q > 100);
    }

    #[test]
    fn test_fully_degenerate_curve_is_single_segment() {
        let p = point(4.0, 5.0);
        let mut q = QuadraticBezier::new(p, p, p).iterate();
        assert_points(&collect(&mut q), &[(4.0, 5.0, M), (4.0, 5.0, L)]);

        let mut c = CubicBezier::with_segment_length(p, p, p, p, 0.001).iterate();
        assert_points(&collect(&mut c), &[(4.0, 5.0, M), (4.0, 5.0, L)]);
    }

    #[test]
    fn test_stop_is_sticky_and_rewind_does_not_restart() {
        let mut i = QuadraticIter::new(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0), 1.0);
        assert_eq!(collect(&mut i).len(), 2);
        i.rewind(0);
        let (mut x, mut y) = (0.0, 0.0);
        assert_eq!(i.vertex(&mut x, &mut y), PathCommand::Stop);
        assert_eq!(i.vertex(&mut x, &mut y), PathCommand::Stop);
    }

    #[test]
    fn test_independent_iterators() {
        let b = CubicBezier::with_segment_length(
            point(0.0, 0.0),
            point(0.0, 10.0),
            point(10.0, 10.0),
            point(10.0, 0.0),
            2.0,
        );
        let mut a = b.iterate();
        let mut c = b.iterate();
        let (mut x, mut y) = (0.0, 0.0);
        a.vertex(&mut x, &mut y);
        a.vertex(&mut x, &mut y);
        assert_eq!(collect(&mut c).len(), collect(&mut b.iterate()).len());
        assert_eq!(collect(&mut a).len() + 2, collect(&mut b.iterate()).len());
    }

    #[test]
    fn test_step_clamping() {
        assert_eq!(subdivision(5.0), (1, 1.0));
        assert_eq!(subdivision(f64::NAN), (1, 1.0));
        assert_eq!(subdivision(0.0).0, MAX_CURVE_STEPS);
        assert_eq!(subdivision(-1.0).0, MAX_CURVE_STEPS);
        assert_eq!(subdivision(0.25).0, 4);
        assert_eq!(subdivision(0.111).0, 10);
    }

    #[test]
    fn test_invalid_segment_length_falls_back_to_default() {
        let q = QuadraticBezier::with_segment_length(point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0), -1.0);
        assert_eq!(q.segment_length(), DEFAULT_SEGMENT_LENGTH);
        let c = CubicBezier::with_segment_length(
            point(0.0, 0.0),
            point(1.0, 1.0),
            point(1.0, 1.0),
            point(2.0, 0.0),
            f64::NAN,
        );
        assert_eq!(c.segment_length(), DEFAULT_SEGMENT_LENGTH);
    }

    #[test]
    fn test_sample_matches_endpoints() {
        let c = CubicBezier::new(point(1.0, 2.0), point(3.0, 4.0), point(5.0, 6.0), point(7.0, 0.0));
        assert_eq!(c.sample(0.0), point(1.0, 2.0));
        assert_eq!(c.sample(1.0), point(7.0, 0.0));
        let q = QuadraticBezier::new(point(0.0, 0.0), point(1.0, 2.0), point(2.0, 0.0));
        assert_eq!(q.sample(0.5), point(1.0, 1.0));
    }
}
