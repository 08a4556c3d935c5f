//! Subpath buffer shared by the dash and stroke generators.
//!
//! A `VertexSequence` holds exactly one subpath at a time: it is filled with
//! `add`, finalised with `close`, walked in either direction, and cleared with
//! `remove_all` (which keeps the allocation for the next subpath).

use crate::basics::{PathCommand, PointD};
use crate::error::Result;
use crate::math::{calc_distance, VERTEX_DIST_EPSILON};

// ============================================================================
// VertexDist
// ============================================================================

/// A buffered vertex with the distance to the vertex that follows it and the
/// command it arrived with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDist {
    pub x: f64,
    pub y: f64,
    pub dist: f64,
    pub cmd: PathCommand,
}

impl VertexDist {
    pub fn new(x: f64, y: f64, cmd: PathCommand) -> Self {
        Self {
            x,
            y,
            dist: 0.0,
            cmd,
        }
    }

    pub fn point(&self) -> PointD {
        PointD::new(self.x, self.y)
    }

    /// Calculate distance to `val` and store it. Returns `true` if the
    /// points are not coincident (distance > VERTEX_DIST_EPSILON).
    /// If coincident, sets dist to `1.0 / VERTEX_DIST_EPSILON`.
    pub fn calc_dist(&mut self, val: &VertexDist) -> bool {
        self.dist = calc_distance(self.x, self.y, val.x, val.y);
        let ret = self.dist > VERTEX_DIST_EPSILON;
        if !ret {
            self.dist = 1.0 / VERTEX_DIST_EPSILON;
        }
        ret
    }
}

// ============================================================================
// VertexSequence
// ============================================================================

/// A sequence of vertices that filters coincident points.
///
/// When a vertex is added, the previous pair is checked; if the last vertex
/// coincides with the one before it, it is dropped. The check is lazy: a
/// coincident pair is only cleaned up when the next vertex arrives or when
/// the sequence is closed.
#[derive(Debug, Clone, Default)]
pub struct VertexSequence {
    vertices: Vec<VertexDist>,
    closed: bool,
}

impl VertexSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether the last `close` call closed the contour.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn add(&mut self, val: VertexDist) {
        let len = self.vertices.len();
        if len > 1 {
            let last = self.vertices[len - 1];
            if !self.vertices[len - 2].calc_dist(&last) {
                self.vertices.pop();
            }
        }
        self.vertices.push(val);
    }

    /// Replace the last vertex.
    pub fn modify_last(&mut self, val: VertexDist) {
        self.vertices.pop();
        self.add(val);
    }

    /// Finalise the sequence.
    ///
    /// Removes trailing coincident vertices and fills in every `dist`. For a
    /// closed contour the last vertex is also dropped while it coincides with
    /// the first, and its `dist` measures the closing segment.
    pub fn close(&mut self, closed: bool) {
        while self.vertices.len() > 1 {
            let len = self.vertices.len();
            let last = self.vertices[len - 1];
            if self.vertices[len - 2].calc_dist(&last) {
                break;
            }
            self.vertices.pop();
            self.modify_last(last);
        }

        if closed {
            while self.vertices.len() > 1 {
                let first = self.vertices[0];
                let len = self.vertices.len();
                if self.vertices[len - 1].calc_dist(&first) {
                    break;
                }
                self.vertices.pop();
            }
        }

        if let Some(last) = self.vertices.last_mut() {
            last.dist = 0.0;
        }
        self.closed = closed && self.vertices.len() > 1;
        if self.closed {
            let first = self.vertices[0];
            let len = self.vertices.len();
            self.vertices[len - 1].calc_dist(&first);
        }
    }

    /// Clear the sequence, keeping its allocation.
    pub fn remove_all(&mut self) {
        self.vertices.clear();
        self.closed = false;
    }

    /// Reserve room for `additional` vertices, reporting allocation failure
    /// instead of aborting.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.vertices.try_reserve(additional)?;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.vertices.capacity()
    }

    pub fn first(&self) -> Option<&VertexDist> {
        self.vertices.first()
    }

    pub fn last(&self) -> Option<&VertexDist> {
        self.vertices.last()
    }

    /// Vertex before `idx`, wrapping to the last vertex.
    pub fn prev(&self, idx: usize) -> &VertexDist {
        let len = self.vertices.len();
        &self.vertices[(idx + len - 1) % len]
    }

    pub fn curr(&self, idx: usize) -> &VertexDist {
        &self.vertices[idx]
    }

    /// Vertex after `idx`, wrapping to the first vertex.
    pub fn next(&self, idx: usize) -> &VertexDist {
        &self.vertices[(idx + 1) % self.vertices.len()]
    }

    /// Double-ended iterator over the buffered vertices.
    pub fn iter(&self) -> core::slice::Iter<'_, VertexDist> {
        self.vertices.iter()
    }

    pub fn as_slice(&self) -> &[VertexDist] {
        &self.vertices
    }
}

impl core::ops::Index<usize> for VertexSequence {
    type Output = VertexDist;

    fn index(&self, i: usize) -> &VertexDist {
        &self.vertices[i]
    }
}

impl<'a> IntoIterator for &'a VertexSequence {
    type Item = &'a VertexDist;
    type IntoIter = core::slice::Iter<'a, VertexDist>;

    fn into_iter(self) -> Self::IntoIter {
        self.vertices.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
