//! Dash generator.
//!
//! Splits one buffered subpath into the "on" runs of a cyclic dash pattern.
//! Each run is emitted as a `MoveTo` followed by one `LineTo` per centerline
//! vertex it crosses and a final `LineTo` where it ends. Gaps produce no
//! output.

use crate::basics::{PathCommand, PointD};
use crate::error::{Error, Result};
use crate::options::DashPattern;
use crate::subpath_adapter::Generator;
use crate::vertex_sequence::{VertexDist, VertexSequence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Initial,
    Move,
    Generate,
    Complete,
}

/// Dash generator for a single subpath.
///
/// The pattern is only changed by the editing methods. Generation works on a
/// cycle position that is re-seeded from the pattern's `dash_start` each time
/// a subpath is started, so every subpath begins at the same phase.
#[derive(Debug, Clone)]
pub struct Dash {
    pattern: DashPattern,
    input: VertexSequence,
    closed: bool,
    status: Status,

    // Cycle position: index into the flattened [dash, gap, dash, ...] list
    // and the length of that element already consumed.
    curr_dash: usize,
    curr_dash_start: f64,

    // Walk position: current segment, length left on it, current point.
    seg: usize,
    curr_rest: f64,
    pos: PointD,

    solid: bool,
    warned: bool,
    ready: bool,
    // Pattern elements ended in a row without moving along the subpath.
    stalled: usize,
}

impl Dash {
    pub fn new() -> Self {
        Self {
            pattern: DashPattern::new(),
            input: VertexSequence::new(),
            closed: false,
            status: Status::Initial,
            curr_dash: 0,
            curr_dash_start: 0.0,
            seg: 0,
            curr_rest: 0.0,
            pos: PointD::default(),
            solid: false,
            warned: false,
            ready: false,
            stalled: 0,
        }
    }

    /// Build a dasher from a validated pattern.
    pub fn with_pattern(pattern: DashPattern) -> Result<Self> {
        let mut dash = Self::new();
        dash.set_pattern(pattern)?;
        Ok(dash)
    }

    /// Append a `(dash, gap)` pair to the pattern.
    pub fn add_dash(&mut self, dash_length: f64, gap_length: f64) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        if !valid(dash_length) || !valid(gap_length) {
            return Err(Error::InvalidDash {
                index: self.pattern.dashes.len(),
                dash: dash_length,
                gap: gap_length,
            });
        }
        self.pattern.add_dash(dash_length, gap_length);
        self.pattern_changed();
        Ok(())
    }

    /// Clear the pattern. Subpaths are then passed through undashed.
    pub fn remove_all_dashes(&mut self) {
        self.pattern.remove_all();
        self.pattern_changed();
    }

    /// Set the phase every subpath starts at. Values outside one cycle wrap
    /// around; negative values shift the pattern backward.
    pub fn set_dash_start(&mut self, dash_start: f64) -> Result<()> {
        if !dash_start.is_finite() {
            return Err(Error::InvalidDashStart(dash_start));
        }
        self.pattern.dash_start = dash_start;
        self.pattern_changed();
        Ok(())
    }

    pub fn dash_start(&self) -> f64 {
        self.pattern.dash_start
    }

    /// Replace the whole pattern. On error the current pattern is kept.
    pub fn set_pattern(&mut self, pattern: DashPattern) -> Result<()> {
        pattern.validate()?;
        self.pattern = pattern;
        self.pattern_changed();
        Ok(())
    }

    pub fn pattern(&self) -> &DashPattern {
        &self.pattern
    }

    /// Reserve room for `additional` centerline vertices.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.input.try_reserve(additional)
    }

    fn pattern_changed(&mut self) {
        self.warned = false;
        self.status = Status::Initial;
        log::debug!(
            "dash pattern: {} pairs, cycle length {}, start {}",
            self.pattern.dashes.len(),
            self.pattern.total_length(),
            self.pattern.dash_start
        );
    }

    /// Length of element `k` of the flattened pattern.
    fn element(&self, k: usize) -> f64 {
        let (dash, gap) = self.pattern.dashes[k / 2];
        if k % 2 == 0 {
            dash
        } else {
            gap
        }
    }

    fn elements(&self) -> usize {
        self.pattern.dashes.len() * 2
    }

    /// Length left in the current element. Undashed subpaths are one
    /// endless "on" element.
    fn dash_rest(&self) -> f64 {
        if self.solid {
            f64::INFINITY
        } else {
            self.element(self.curr_dash) - self.curr_dash_start
        }
    }

    fn is_on(&self) -> bool {
        self.solid || self.curr_dash % 2 == 0
    }

    fn next_dash(&mut self) {
        self.curr_dash = (self.curr_dash + 1) % self.elements();
        self.curr_dash_start = 0.0;
    }

    /// Record an element that ended without moving the walk. Once a whole
    /// cycle does so, the pattern is too fine to resolve here and the rest
    /// of the subpath is emitted solid.
    fn stall(&mut self) {
        self.stalled += 1;
        if !self.solid && self.stalled >= self.elements() {
            if !self.warned {
                log::warn!(
                    "dash pattern too short for segment length {}, dashing stopped",
                    self.curr_rest
                );
                self.warned = true;
            }
            self.solid = true;
        }
    }

    /// Move the cycle position to `dash_start`.
    fn calc_dash_start(&mut self) {
        self.curr_dash = 0;
        self.curr_dash_start = 0.0;
        if self.solid {
            return;
        }
        let mut ds = self.pattern.dash_start.rem_euclid(self.pattern.total_length());
        for _ in 0..self.elements() {
            let len = self.element(self.curr_dash);
            if ds < len {
                break;
            }
            ds -= len;
            self.next_dash();
        }
        self.curr_dash_start = ds.max(0.0);
    }

    fn segments(&self) -> usize {
        if self.closed {
            self.input.size()
        } else {
            self.input.size().saturating_sub(1)
        }
    }

    fn segment_end(&self) -> &VertexDist {
        self.input.next(self.seg)
    }

    /// Walk `curr_rest` back from the end of the current segment.
    fn cut_point(&self) -> PointD {
        let v1 = &self.input[self.seg];
        let v2 = self.segment_end();
        PointD::new(
            v2.x - (v2.x - v1.x) * self.curr_rest / v1.dist,
            v2.y - (v2.y - v1.y) * self.curr_rest / v1.dist,
        )
    }

    /// Consume the current element up to where it ends or the current
    /// segment ends, whichever comes first, and move `pos` there. Returns
    /// `true` if the element ended.
    fn advance(&mut self) -> bool {
        let dash_rest = self.dash_rest();
        if self.curr_rest > dash_rest {
            let before = self.curr_rest;
            self.curr_rest -= dash_rest;
            self.next_dash();
            if self.curr_rest == before {
                self.stall();
            } else {
                self.stalled = 0;
            }
            self.pos = self.cut_point();
            true
        } else {
            self.stalled = 0;
            self.curr_dash_start += self.curr_rest;
            self.pos = self.segment_end().point();
            self.seg += 1;
            if self.seg < self.segments() {
                self.curr_rest = self.input[self.seg].dist;
            }
            false
        }
    }

    /// Finalise the buffered subpath. Runs once per subpath.
    fn prepare(&mut self) {
        self.input.close(self.closed);
        self.closed = self.input.is_closed();
        self.ready = true;
    }

    /// Seed the cycle position and put the walk at the first vertex.
    fn start(&mut self) {
        self.solid = self.pattern.is_degenerate();
        if self.solid && !self.warned {
            log::warn!("dash pattern has zero length, subpaths are not dashed");
            self.warned = true;
        }
        self.calc_dash_start();
        self.stalled = 0;

        self.seg = 0;
        if let Some(first) = self.input.first() {
            self.pos = first.point();
            self.curr_rest = first.dist;
        }
        self.status = if self.input.size() < 2 {
            Status::Complete
        } else {
            Status::Move
        };
    }
}

impl Default for Dash {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Dash {
    fn remove_all(&mut self) {
        self.input.remove_all();
        self.closed = false;
        self.ready = false;
        self.status = Status::Initial;
    }

    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        self.ready = false;
        self.status = Status::Initial;
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
        self.start();
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        loop {
            match self.status {
                Status::Initial => Generator::rewind(self, 0),
                Status::Move => {
                    if self.seg >= self.segments() {
                        self.status = Status::Complete;
                    } else if self.dash_rest() <= 0.0 {
                        self.next_dash();
                        self.stall();
                    } else if self.is_on() {
                        *x = self.pos.x;
                        *y = self.pos.y;
                        self.status = Status::Generate;
                        return PathCommand::MoveTo;
                    } else {
                        self.advance();
                    }
                }
                Status::Generate => {
                    if self.seg >= self.segments() {
                        self.status = Status::Complete;
                    } else if self.dash_rest() <= 0.0 {
                        self.status = Status::Move;
                    } else {
                        if self.advance() {
                            self.status = Status::Move;
                        }
                        *x = self.pos.x;
                        *y = self.pos.y;
                        return PathCommand::LineTo;
                    }
                }
                Status::Complete => return PathCommand::Stop,
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
