//! Foundation types shared by every pipeline stage.
//!
//! Path commands, points, and the `VertexSource` pull contract that curves,
//! paths, dashers, strokers and the subpath adapter all implement.

// ============================================================================
// Path commands
// ============================================================================

/// Command attached to every vertex produced by a [`VertexSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PathCommand {
    /// End of the vertex stream. Not a drawable point.
    #[default]
    Stop,
    /// Starts a new contour.
    MoveTo,
    /// Extends the current contour.
    LineTo,
    /// Closes the current contour back to its start.
    Close,
}

impl PathCommand {
    /// Returns `true` for the stream terminator.
    #[inline]
    pub fn is_stop(self) -> bool {
        self == PathCommand::Stop
    }

    /// Returns `true` if the command carries a drawable point
    /// (`MoveTo` or `LineTo`).
    #[inline]
    pub fn is_vertex(self) -> bool {
        matches!(self, PathCommand::MoveTo | PathCommand::LineTo)
    }

    #[inline]
    pub fn is_move_to(self) -> bool {
        self == PathCommand::MoveTo
    }

    #[inline]
    pub fn is_line_to(self) -> bool {
        self == PathCommand::LineTo
    }

    #[inline]
    pub fn is_close(self) -> bool {
        self == PathCommand::Close
    }
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

pub type PointD = PointBase<f64>;

/// Shorthand constructor for [`PointD`].
#[inline]
pub fn point(x: f64, y: f64) -> PointD {
    PointD::new(x, y)
}

// ============================================================================
// Vertex
// ============================================================================

/// A vertex with coordinates and a path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexD {
    pub x: f64,
    pub y: f64,
    pub cmd: PathCommand,
}

impl VertexD {
    pub fn new(x: f64, y: f64, cmd: PathCommand) -> Self {
        Self { x, y, cmd }
    }
}

// ============================================================================
// VertexSource trait
// ============================================================================

/// The pull contract every pipeline stage implements.
///
/// Each call to [`vertex`](VertexSource::vertex) writes the next coordinate
/// pair and returns its command; [`PathCommand::Stop`] ends the stream.
/// Every implementation in this crate keeps returning `Stop` once it has been
/// reached, until an explicit `rewind`.
///
/// What `rewind` restarts differs per implementation and is documented on
/// each one: curve iterators cannot be restarted at all, paths restart at the
/// path id they were given, adapters forward the rewind upstream.
///
/// This is intentionally not `Iterator`: the stream is restartable by id and
/// produces commands with out-of-band terminator semantics.
pub trait VertexSource {
    /// Reset the source to the beginning of the path identified by `path_id`.
    fn rewind(&mut self, path_id: u32);

    /// Return the next vertex. Writes coordinates to `x` and `y`, returns the
    /// command. Returns [`PathCommand::Stop`] when iteration is complete.
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand;
}

/// Lets a pipeline stage borrow its upstream instead of owning it.
impl<T: VertexSource + ?Sized> VertexSource for &mut T {
    fn rewind(&mut self, path_id: u32) {
        (**self).rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        (**self).vertex(x, y)
    }
}

/// Lets heterogeneous stages be chained through `Box<dyn VertexSource>`.
impl<T: VertexSource + ?Sized> VertexSource for Box<T> {
    fn rewind(&mut self, path_id: u32) {
        (**self).rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        (**self).vertex(x, y)
    }
}

/// Drain `vs` from `path_id` into `out`, stopping at the first `Stop`.
///
/// `out` is cleared first and its allocation reused. The terminating `Stop`
/// is not stored.
pub fn collect_into<VS: VertexSource + ?Sized>(vs: &mut VS, path_id: u32, out: &mut Vec<VertexD>) {
    out.clear();
    vs.rewind(path_id);
    loop {
        let (mut x, mut y) = (0.0, 0.0);
        let cmd = vs.vertex(&mut x, &mut y);
        if cmd.is_stop() {
            break;
        }
        out.push(VertexD::new(x, y, cmd));
    }
}

// ============================================================================
// Tests
// ============================================================================
