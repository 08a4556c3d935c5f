//! Path storage, the upstream vertex source of the pipeline.
//!
//! Stores path elements (lines, quadratic and cubic curves, closes) and
//! exposes them as a `VertexSource`. Curves are flattened lazily while the
//! path is walked: only the iterator of the curve currently being emitted is
//! held, never a flattened copy of the path.
//!
//! Several paths can share one storage; `start_new_path` returns the id to
//! pass to `rewind`.

use crate::basics::{PathCommand, PointD, VertexSource};
use crate::curves::{CubicBezier, CubicIter, QuadraticBezier, QuadraticIter};
use crate::error::{Error, Result};
use crate::options::FlattenOptions;

/// One stored path element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathElement {
    MoveTo(PointD),
    LineTo(PointD),
    QuadTo { ctrl: PointD, to: PointD },
    CubicTo { ctrl1: PointD, ctrl2: PointD, to: PointD },
    Close,
    /// Separates independent paths inside one storage.
    Stop,
}

#[derive(Debug, Clone, Copy)]
enum CurveState {
    None,
    Quadratic(QuadraticIter),
    Cubic(CubicIter),
}

/// The main vertex container.
///
/// `rewind(path_id)` restarts iteration at the path whose id was returned by
/// [`start_new_path`](PathStorage::start_new_path); id 0 is the first path.
/// Iteration stops at the end of that path.
#[derive(Debug, Clone)]
pub struct PathStorage {
    elements: Vec<PathElement>,
    flatten: FlattenOptions,

    // Construction state.
    subpath_start: PointD,
    open: bool,

    // Iteration state.
    iterator: usize,
    start: PointD,
    last: PointD,
    curve: CurveState,
}

impl PathStorage {
    /// Create an empty path storage.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            flatten: FlattenOptions::default(),
            subpath_start: PointD::default(),
            open: false,
            iterator: 0,
            start: PointD::default(),
            last: PointD::default(),
            curve: CurveState::None,
        }
    }

    /// Remove all elements (keeps allocated memory).
    pub fn remove_all(&mut self) {
        self.elements.clear();
        self.subpath_start = PointD::default();
        self.open = false;
        self.rewind(0);
    }

    /// Reserve room for `additional` elements.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.elements.try_reserve(additional)?;
        Ok(())
    }

    pub fn set_flatten_options(&mut self, options: FlattenOptions) -> Result<()> {
        options.validate()?;
        self.flatten = options;
        Ok(())
    }

    pub fn flatten_options(&self) -> FlattenOptions {
        self.flatten
    }

    pub fn total_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    // ---------------------------------------------------------------
    // Path construction
    // ---------------------------------------------------------------

    /// Begin a new independent path and return its id for `rewind`.
    ///
    /// Fails without touching the storage once the id no longer fits `u32`.
    pub fn start_new_path(&mut self) -> Result<u32> {
        let separate = !matches!(self.elements.last(), None | Some(PathElement::Stop));
        let id = path_id(self.elements.len() + usize::from(separate))?;
        if separate {
            self.elements.push(PathElement::Stop);
        }
        self.subpath_start = PointD::default();
        self.open = false;
        Ok(id)
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = PointD::new(x, y);
        self.elements.push(PathElement::MoveTo(p));
        self.subpath_start = p;
        self.open = true;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.ensure_move_to();
        self.elements.push(PathElement::LineTo(PointD::new(x, y)));
    }

    /// Quadratic curve from the current point.
    pub fn quad_to(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.ensure_move_to();
        self.elements.push(PathElement::QuadTo {
            ctrl: PointD::new(x_ctrl, y_ctrl),
            to: PointD::new(x_to, y_to),
        });
    }

    /// Cubic curve from the current point.
    #[allow(clippy::too_many_arguments)]
    pub fn cubic_to(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.ensure_move_to();
        self.elements.push(PathElement::CubicTo {
            ctrl1: PointD::new(x_ctrl1, y_ctrl1),
            ctrl2: PointD::new(x_ctrl2, y_ctrl2),
            to: PointD::new(x_to, y_to),
        });
    }

    /// Close the current subpath. Drawing afterwards starts a new subpath at
    /// the closed subpath's starting point.
    pub fn close_polygon(&mut self) {
        if self.open {
            self.elements.push(PathElement::Close);
            self.open = false;
        }
    }

    fn ensure_move_to(&mut self) {
        if !self.open {
            self.elements.push(PathElement::MoveTo(self.subpath_start));
            self.open = true;
        }
    }

    // ---------------------------------------------------------------
    // Iteration helpers
    // ---------------------------------------------------------------

    fn emit(&mut self, p: PointD, x: &mut f64, y: &mut f64) {
        *x = p.x;
        *y = p.y;
        self.last = p;
    }
}

fn path_id(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| Error::PathIdOverflow(index))
}

impl Default for PathStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for PathStorage {
    fn rewind(&mut self, path_id: u32) {
        self.iterator = path_id as usize;
        self.start = PointD::default();
        self.last = PointD::default();
        self.curve = CurveState::None;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        let pending = match &mut self.curve {
            CurveState::None => PathCommand::Stop,
            CurveState::Quadratic(it) => it.vertex(x, y),
            CurveState::Cubic(it) => it.vertex(x, y),
        };
        if pending.is_line_to() {
            self.last = PointD::new(*x, *y);
            return PathCommand::LineTo;
        }
        self.curve = CurveState::None;

        let Some(&element) = self.elements.get(self.iterator) else {
            return PathCommand::Stop;
        };

        match element {
            PathElement::Stop => PathCommand::Stop,
            PathElement::MoveTo(p) => {
                self.iterator += 1;
                self.start = p;
                self.emit(p, x, y);
                PathCommand::MoveTo
            }
            PathElement::LineTo(p) => {
                self.iterator += 1;
                self.emit(p, x, y);
                PathCommand::LineTo
            }
            PathElement::QuadTo { ctrl, to } => {
                self.iterator += 1;
                let mut it = QuadraticBezier::with_segment_length(
                    self.last,
                    ctrl,
                    to,
                    self.flatten.segment_length,
                )
                .iterate();
                // The leading MoveTo repeats the current point.
                it.vertex(x, y);
                it.vertex(x, y);
                self.curve = CurveState::Quadratic(it);
                self.last = PointD::new(*x, *y);
                PathCommand::LineTo
            }
            PathElement::CubicTo { ctrl1, ctrl2, to } => {
                self.iterator += 1;
                let mut it = CubicBezier::with_segment_length(
                    self.last,
                    ctrl1,
                    ctrl2,
                    to,
                    self.flatten.segment_length,
                )
                .iterate();
                it.vertex(x, y);
                it.vertex(x, y);
                self.curve = CurveState::Cubic(it);
                self.last = PointD::new(*x, *y);
                PathCommand::LineTo
            }
            PathElement::Close => {
                self.iterator += 1;
                let start = self.start;
                self.emit(start, x, y);
                PathCommand::Close
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
