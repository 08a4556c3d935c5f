//! Stroke generator.
//!
//! Turns one buffered centerline subpath into the outline of a stroke of the
//! configured width. An open subpath becomes a single ring: start cap, the
//! forward side, end cap, then the backward side. A closed subpath with at
//! least three distinct points becomes two independent rings, one per side.
//!
//! Joins and caps are computed a corner at a time into a small output buffer
//! that `vertex` drains before moving on, so the generator never holds more
//! than the current subpath and one corner's geometry.

use crate::basics::{PathCommand, PointD};
use crate::error::Result;
use crate::options::StrokeOptions;
use crate::stroke_math::{Cap, Join, LineCap, LineJoin, StrokeStyle};
use crate::subpath_adapter::Generator;
use crate::vertex_sequence::{VertexDist, VertexSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    StartCap,
    OpenOutlineForward,
    ClosedOutlineForward,
    EndPoly1,
    EndCap,
    OutlineBackward,
    EndPoly,
    Stop,
}

/// Outline generator for a single subpath.
///
/// Feed it through [`Generator`] (usually from a
/// [`SubpathAdapter`](crate::subpath_adapter::SubpathAdapter)), then pull the
/// outline. Every ring starts with `MoveTo` and ends with a `Close` that
/// carries the ring's first point.
#[derive(Debug, Clone)]
pub struct Stroke {
    input: VertexSequence,
    output: Vec<PointD>,
    out_idx: usize,
    src: usize,
    style: StrokeStyle,
    half_width: f64,
    stage: Stage,
    closed: bool,
    move_to: bool,
    ready: bool,
    ring_start: PointD,
}

impl Stroke {
    pub fn new() -> Self {
        Self {
            input: VertexSequence::new(),
            output: Vec::new(),
            out_idx: 0,
            src: 0,
            style: StrokeStyle::default(),
            half_width: StrokeOptions::DEFAULT_WIDTH * 0.5,
            stage: Stage::Stop,
            closed: false,
            move_to: false,
            ready: false,
            ring_start: PointD::default(),
        }
    }

    /// Build a stroker from validated options.
    pub fn with_options(options: &StrokeOptions) -> Result<Self> {
        let mut stroke = Self::new();
        stroke.apply_options(options)?;
        Ok(stroke)
    }

    /// Validate `options` and apply all of them. On error nothing changes.
    pub fn apply_options(&mut self, options: &StrokeOptions) -> Result<()> {
        options.validate()?;
        self.set_width(options.width);
        self.style = StrokeStyle {
            line_cap: options.line_cap,
            line_join: options.line_join,
            miter_limit: options.miter_limit,
            approximation_scale: options.approximation_scale,
        };
        Ok(())
    }

    /// Current configuration as options.
    pub fn options(&self) -> StrokeOptions {
        StrokeOptions {
            width: self.width(),
            line_cap: self.style.line_cap,
            line_join: self.style.line_join,
            miter_limit: self.style.miter_limit,
            approximation_scale: self.style.approximation_scale,
        }
    }

    /// Set the full stroke width. Negative widths are taken by absolute
    /// value; zero or non-finite widths produce no outline.
    pub fn set_width(&mut self, w: f64) {
        self.half_width = if w.is_finite() { w.abs() * 0.5 } else { 0.0 };
        if self.half_width == 0.0 {
            log::warn!("stroke width {w} produces no outline");
        }
    }

    pub fn width(&self) -> f64 {
        self.half_width * 2.0
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.style.line_cap = cap;
    }

    pub fn line_cap(&self) -> LineCap {
        self.style.line_cap
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.style.line_join = join;
    }

    pub fn line_join(&self) -> LineJoin {
        self.style.line_join
    }

    /// Limits below 1 or non-finite are ignored with a warning.
    pub fn set_miter_limit(&mut self, limit: f64) {
        if limit.is_finite() && limit >= 1.0 {
            self.style.miter_limit = limit;
        } else {
            log::warn!(
                "invalid miter limit {limit}, keeping {}",
                self.style.miter_limit
            );
        }
    }

    pub fn miter_limit(&self) -> f64 {
        self.style.miter_limit
    }

    /// Non-positive or non-finite scales are ignored with a warning.
    pub fn set_approximation_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.style.approximation_scale = scale;
        } else {
            log::warn!(
                "invalid approximation scale {scale}, keeping {}",
                self.style.approximation_scale
            );
        }
    }

    pub fn approximation_scale(&self) -> f64 {
        self.style.approximation_scale
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Reserve room for `additional` centerline vertices.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.input.try_reserve(additional)
    }

    /// Finalise the buffered subpath. Runs once per subpath.
    fn prepare(&mut self) {
        self.input.close(self.closed);
        self.closed = self.input.is_closed() && self.input.size() >= 3;
        self.ready = true;
        log::trace!(
            "stroking {} {} vertices",
            if self.closed { "closed" } else { "open" },
            self.input.size()
        );
    }

    fn calc_cap(&mut self, end: usize, neighbour: usize, d: f64) {
        let v0 = self.input[end].point();
        let v1 = self.input[neighbour].point();
        Cap::calc(&self.style, &mut self.output, self.half_width, &v0, d, &v1);
    }

    fn calc_join(&mut self, v0: VertexDist, v1: VertexDist, v2: VertexDist, d01: f64, d12: f64) {
        Join::calc(
            &self.style,
            &mut self.output,
            self.half_width,
            &v0.point(),
            d01,
            &v1.point(),
            d12,
            &v2.point(),
        );
    }

    fn close_ring(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        *x = self.ring_start.x;
        *y = self.ring_start.y;
        PathCommand::Close
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Stroke {
    fn remove_all(&mut self) {
        self.input.remove_all();
        self.output.clear();
        self.out_idx = 0;
        self.closed = false;
        self.ready = false;
        self.stage = Stage::Stop;
    }

    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        self.ready = false;
        match cmd {
            PathCommand::MoveTo => self.input.modify_last(VertexDist::new(x, y, cmd)),
            PathCommand::LineTo => self.input.add(VertexDist::new(x, y, cmd)),
            PathCommand::Close => self.closed = true,
            PathCommand::Stop => {}
        }
    }

    fn rewind(&mut self, _path_id: u32) {
        if !self.ready {
            self.prepare();
        }
        self.output.clear();
        self.out_idx = 0;
        self.src = 0;
        self.move_to = true;
        self.stage = if self.input.size() < 2 || self.half_width == 0.0 {
            Stage::Stop
        } else if self.closed {
            Stage::ClosedOutlineForward
        } else {
            Stage::StartCap
        };
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        if !self.ready {
            Generator::rewind(self, 0);
        }
        loop {
            if let Some(&p) = self.output.get(self.out_idx) {
                self.out_idx += 1;
                *x = p.x;
                *y = p.y;
                if self.move_to {
                    self.move_to = false;
                    self.ring_start = p;
                    return PathCommand::MoveTo;
                }
                return PathCommand::LineTo;
            }
            self.output.clear();
            self.out_idx = 0;

            let n = self.input.size();
            match self.stage {
                Stage::StartCap => {
                    let d = self.input[0].dist;
                    self.calc_cap(0, 1, d);
                    self.src = 1;
                    self.stage = Stage::OpenOutlineForward;
                }
                Stage::OpenOutlineForward => {
                    if self.src + 1 >= n {
                        self.stage = Stage::EndCap;
                        continue;
                    }
                    let i = self.src;
                    let (v0, v1, v2) = (self.input[i - 1], self.input[i], self.input[i + 1]);
                    self.calc_join(v0, v1, v2, v0.dist, v1.dist);
                    self.src += 1;
                }
                Stage::ClosedOutlineForward => {
                    if self.src >= n {
                        self.stage = Stage::EndPoly1;
                        continue;
                    }
                    let i = self.src;
                    let (v0, v1, v2) = (*self.input.prev(i), self.input[i], *self.input.next(i));
                    self.calc_join(v0, v1, v2, v0.dist, v1.dist);
                    self.src += 1;
                }
                Stage::EndPoly1 => {
                    self.stage = Stage::OutlineBackward;
                    self.move_to = true;
                    self.src = n;
                    return self.close_ring(x, y);
                }
                Stage::EndCap => {
                    let d = self.input[n - 2].dist;
                    self.calc_cap(n - 1, n - 2, d);
                    self.src = n - 1;
                    self.stage = Stage::OutlineBackward;
                }
                Stage::OutlineBackward => {
                    let last = if self.closed { 0 } else { 1 };
                    if self.src <= last {
                        self.stage = Stage::EndPoly;
                        continue;
                    }
                    self.src -= 1;
                    let i = self.src;
                    let (v0, v1, v2) = (*self.input.next(i), self.input[i], *self.input.prev(i));
                    self.calc_join(v0, v1, v2, v1.dist, v2.dist);
                }
                Stage::EndPoly => {
                    self.stage = Stage::Stop;
                    return self.close_ring(x, y);
                }
                Stage::Stop => return PathCommand::Stop,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::VertexD;

    fn feed(stroke: &mut Stroke, points: &[(f64, f64)], closed: bool) {
        stroke.remove_all();
        for (i, &(x, y)) in points.iter().enumerate() {
            let cmd = if i == 0 {
                PathCommand::MoveTo
            } else {
                PathCommand::LineTo
            };
            stroke.add_vertex(x, y, cmd);
        }
        if closed {
            stroke.add_vertex(0.0, 0.0, PathCommand::Close);
        }
    }

    fn drain(stroke: &mut Stroke) -> Vec<VertexD> {
        Generator::rewind(stroke, 0);
        let mut out = Vec::new();
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            let cmd = Generator::vertex(stroke, &mut x, &mut y);
            if cmd.is_stop() {
                return out;
            }
            out.push(VertexD::new(x, y, cmd));
        }
    }

    fn stroke_points(points: &[(f64, f64)], closed: bool, width: f64) -> Vec<VertexD> {
        let mut stroke = Stroke::new();
        stroke.set_width(width);
        feed(&mut stroke, points, closed);
        drain(&mut stroke)
    }

    fn cmds(out: &[VertexD]) -> Vec<PathCommand> {
        out.iter().map(|v| v.cmd).collect()
    }

    fn assert_points(out: &[VertexD], expected: &[(f64, f64)]) {
        assert_eq!(out.len(), expected.len());
        for (v, &(x, y)) in out.iter().zip(expected) {
            assert!(
                (v.x - x).abs() < 1e-9 && (v.y - y).abs() < 1e-9,
                "({}, {}) != ({x}, {y})",
                v.x,
                v.y
            );
        }
    }

    fn ring_area(ring: &[VertexD]) -> f64 {
        let n = ring.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum();
        (twice / 2.0).abs()
    }

    #[test]
    fn test_defaults() {
        let stroke = Stroke::new();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.line_cap(), LineCap::Butt);
        assert_eq!(stroke.line_join(), LineJoin::Miter);
        assert_eq!(stroke.miter_limit(), 4.0);
        assert_eq!(stroke.approximation_scale(), 1.0);
    }

    #[test]
    fn test_butt_line_is_rectangle() {
        let out = stroke_points(&[(0.0, 0.0), (10.0, 0.0)], false, 2.0);
        assert_eq!(
            cmds(&out),
            vec![
                PathCommand::MoveTo,
                PathCommand::LineTo,
                PathCommand::LineTo,
                PathCommand::LineTo,
                PathCommand::Close
            ]
        );
        assert_points(
            &out[..4],
            &[(0.0, 1.0), (0.0, -1.0), (10.0, -1.0), (10.0, 1.0)],
        );
        assert_eq!((out[4].x, out[4].y), (0.0, 1.0));
    }

    #[test]
    fn test_square_cap_extends_ends() {
        let mut stroke = Stroke::new();
        stroke.set_width(2.0);
        stroke.set_line_cap(LineCap::Square);
        feed(&mut stroke, &[(0.0, 0.0), (10.0, 0.0)], false);
        let out = drain(&mut stroke);
        assert_points(
            &out[..4],
            &[(-1.0, 1.0), (-1.0, -1.0), (11.0, -1.0), (11.0, 1.0)],
        );
    }

    #[test]
    fn test_round_cap_adds_vertices() {
        let mut stroke = Stroke::new();
        stroke.set_width(10.0);
        stroke.set_line_cap(LineCap::Round);
        feed(&mut stroke, &[(0.0, 0.0), (100.0, 0.0)], false);
        let out = drain(&mut stroke);
        assert!(out.len() > 5);
        assert_eq!(out.iter().filter(|v| v.cmd.is_move_to()).count(), 1);
        assert_eq!(out.last().map(|v| v.cmd), Some(PathCommand::Close));
    }

    #[test]
    fn test_open_polyline_joins() {
        let out = stroke_points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], false, 2.0);
        assert_eq!(out.len(), 7);
        assert_points(
            &out[..6],
            &[
                (0.0, 1.0),
                (0.0, -1.0),
                (11.0, -1.0),
                (11.0, 10.0),
                (9.0, 10.0),
                (9.0, 1.0),
            ],
        );
        assert!(out[6].cmd.is_close());
    }

    #[test]
    fn test_closed_triangle_two_rings() {
        let out = stroke_points(&[(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)], true, 2.0);
        use PathCommand::*;
        assert_eq!(
            cmds(&out),
            vec![MoveTo, LineTo, LineTo, Close, MoveTo, LineTo, LineTo, Close]
        );
        let (outer, inner) = (&out[..3], &out[4..7]);
        assert!(ring_area(outer) > ring_area(inner));
        assert_eq!((out[3].x, out[3].y), (outer[0].x, outer[0].y));
        assert_eq!((out[7].x, out[7].y), (inner[0].x, inner[0].y));
    }

    #[test]
    fn test_closed_square_offsets() {
        let out = stroke_points(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            true,
            2.0,
        );
        assert_eq!(out.len(), 10);
        assert_points(
            &out[..4],
            &[(-1.0, -1.0), (11.0, -1.0), (11.0, 11.0), (-1.0, 11.0)],
        );
        assert_points(
            &out[5..9],
            &[(1.0, 9.0), (9.0, 9.0), (9.0, 1.0), (1.0, 1.0)],
        );
    }

    #[test]
    fn test_closed_two_points_strokes_as_open() {
        let out = stroke_points(&[(0.0, 0.0), (10.0, 0.0)], true, 2.0);
        assert_eq!(out.len(), 5);
        assert_eq!(out.iter().filter(|v| v.cmd.is_close()).count(), 1);
    }

    #[test]
    fn test_degenerate_input_is_empty() {
        assert!(stroke_points(&[], false, 2.0).is_empty());
        assert!(stroke_points(&[(5.0, 5.0)], false, 2.0).is_empty());
        assert!(stroke_points(&[(5.0, 5.0), (5.0, 5.0)], false, 2.0).is_empty());
        assert!(stroke_points(&[(5.0, 5.0)], true, 2.0).is_empty());
    }

    #[test]
    fn test_zero_width_is_empty() {
        assert!(stroke_points(&[(0.0, 0.0), (10.0, 0.0)], false, 0.0).is_empty());
        assert!(stroke_points(&[(0.0, 0.0), (10.0, 0.0)], false, f64::NAN).is_empty());
    }

    #[test]
    fn test_negative_width_uses_absolute_value() {
        let pos = stroke_points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], false, 3.0);
        let neg = stroke_points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], false, -3.0);
        assert_eq!(pos, neg);
    }

    #[test]
    fn test_rewind_replays_outline() {
        let mut stroke = Stroke::new();
        feed(&mut stroke, &[(0.0, 0.0), (10.0, 5.0), (20.0, 0.0)], false);
        let a = drain(&mut stroke);
        let b = drain(&mut stroke);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stop_is_sticky() {
        let mut stroke = Stroke::new();
        feed(&mut stroke, &[(0.0, 0.0), (10.0, 0.0)], false);
        drain(&mut stroke);
        let (mut x, mut y) = (0.0, 0.0);
        assert!(Generator::vertex(&mut stroke, &mut x, &mut y).is_stop());
    }

    #[test]
    fn test_repeated_move_to_keeps_last() {
        let mut stroke = Stroke::new();
        stroke.set_width(2.0);
        stroke.remove_all();
        stroke.add_vertex(50.0, 50.0, PathCommand::MoveTo);
        stroke.add_vertex(0.0, 0.0, PathCommand::MoveTo);
        stroke.add_vertex(10.0, 0.0, PathCommand::LineTo);
        let out = drain(&mut stroke);
        assert_points(
            &out[..4],
            &[(0.0, 1.0), (0.0, -1.0), (10.0, -1.0), (10.0, 1.0)],
        );
    }

    #[test]
    fn test_apply_options() {
        let mut stroke = Stroke::new();
        let opts = StrokeOptions::new(6.0)
            .with_line_cap(LineCap::Round)
            .with_line_join(LineJoin::Bevel)
            .with_miter_limit(2.0);
        stroke.apply_options(&opts).unwrap();
        assert_eq!(stroke.options(), opts);

        let bad = StrokeOptions::new(1.0).with_miter_limit(0.0);
        assert!(stroke.apply_options(&bad).is_err());
        assert_eq!(stroke.width(), 6.0);
        assert_eq!(stroke.line_join(), LineJoin::Bevel);
    }

    #[test]
    fn test_invalid_miter_limit_and_scale_are_ignored() {
        let mut stroke = Stroke::new();
        stroke.set_width(2.0);
        for limit in [f64::NAN, f64::INFINITY, 0.5] {
            stroke.set_miter_limit(limit);
        }
        for scale in [f64::NAN, 0.0, -1.0] {
            stroke.set_approximation_scale(scale);
        }
        assert_eq!(stroke.miter_limit(), 4.0);
        assert_eq!(stroke.approximation_scale(), 1.0);

        for join in [LineJoin::Miter, LineJoin::Round] {
            stroke.set_line_join(join);
            feed(&mut stroke, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)], false);
            let out = drain(&mut stroke);
            assert!(!out.is_empty());
            assert!(out.iter().all(|v| v.x.is_finite() && v.y.is_finite()), "{out:?}");
        }
    }

    #[test]
    fn test_reuse_keeps_buffers() {
        let mut stroke = Stroke::new();
        stroke.try_reserve(256).unwrap();
        for k in 0..4 {
            let pts: Vec<(f64, f64)> = (0..50).map(|i| (i as f64, (i * k) as f64)).collect();
            feed(&mut stroke, &pts, false);
            assert!(!drain(&mut stroke).is_empty());
        }
        assert!(stroke.input.capacity() >= 256);
    }
}
