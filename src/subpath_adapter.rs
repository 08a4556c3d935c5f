//! Adapter connecting a vertex source to a subpath generator.
//!
//! The dash and stroke generators need a whole subpath before they can place
//! joins, caps or dash boundaries. `SubpathAdapter` buffers one subpath at a
//! time from its upstream into the generator, replays the generator's output,
//! and repeats until the upstream is exhausted. The full path is never
//! materialised.

use crate::basics::{PathCommand, VertexSource};

// ============================================================================
// Generator trait
// ============================================================================

/// A stage that consumes one buffered subpath and re-emits it.
///
/// The adapter drives it as: `remove_all`, `add_vertex` for every vertex of
/// the subpath (starting with a `MoveTo`, possibly ending with a `Close`),
/// `rewind`, then `vertex` until `Stop`.
pub trait Generator {
    /// Forget the buffered subpath, keeping allocations for reuse.
    fn remove_all(&mut self);
    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand);
    /// Restart emission over the buffered subpath.
    fn rewind(&mut self, path_id: u32);
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand;
}

impl<G: Generator + ?Sized> Generator for &mut G {
    fn remove_all(&mut self) {
        (**self).remove_all();
    }
    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        (**self).add_vertex(x, y, cmd);
    }
    fn rewind(&mut self, path_id: u32) {
        (**self).rewind(path_id);
    }
    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        (**self).vertex(x, y)
    }
}

// ============================================================================
// SubpathAdapter
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Initial,
    Accumulate,
    Generate,
}

/// Pulls subpaths from `source` through `generator`.
///
/// `rewind` forwards to the source and resets the adapter, so the adapter is
/// restartable exactly when its source is.
pub struct SubpathAdapter<VS: VertexSource, Gen: Generator> {
    source: VS,
    generator: Gen,
    status: Status,
    complete: bool,
    start_x: f64,
    start_y: f64,
    subpaths: usize,
}

impl<VS: VertexSource, Gen: Generator> SubpathAdapter<VS, Gen> {
    pub fn new(source: VS, generator: Gen) -> Self {
        Self {
            source,
            generator,
            status: Status::Initial,
            complete: false,
            start_x: 0.0,
            start_y: 0.0,
            subpaths: 0,
        }
    }

    pub fn generator(&self) -> &Gen {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut Gen {
        &mut self.generator
    }

    pub fn source(&self) -> &VS {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }

    /// Number of subpaths accumulated since the last rewind.
    pub fn subpaths(&self) -> usize {
        self.subpaths
    }

    /// Whether the upstream source has been exhausted.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn into_inner(self) -> (VS, Gen) {
        (self.source, self.generator)
    }

    /// Feed the generator one subpath, starting at the pending start point.
    fn accumulate(&mut self) {
        self.generator.remove_all();
        self.generator
            .add_vertex(self.start_x, self.start_y, PathCommand::MoveTo);
        self.subpaths += 1;

        let mut added = 1usize;
        loop {
            let (mut x, mut y) = (0.0, 0.0);
            match self.source.vertex(&mut x, &mut y) {
                PathCommand::MoveTo => {
                    self.start_x = x;
                    self.start_y = y;
                    break;
                }
                PathCommand::Stop => {
                    self.complete = true;
                    break;
                }
                cmd => {
                    self.generator.add_vertex(x, y, cmd);
                    added += 1;
                }
            }
        }
        log::trace!(
            "subpath #{}: {} vertices buffered{}",
            self.subpaths,
            added,
            if self.complete { ", source exhausted" } else { "" }
        );
        self.generator.rewind(0);
    }
}

impl<VS: VertexSource, Gen: Generator> VertexSource for SubpathAdapter<VS, Gen> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
        self.status = Status::Initial;
        self.complete = false;
        self.subpaths = 0;
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        loop {
            match self.status {
                Status::Initial => {
                    let cmd = self.source.vertex(&mut self.start_x, &mut self.start_y);
                    self.complete = cmd.is_stop();
                    self.status = Status::Accumulate;
                }
                Status::Accumulate => {
                    if self.complete {
                        return PathCommand::Stop;
                    }
                    self.accumulate();
                    self.status = Status::Generate;
                }
                Status::Generate => {
                    let cmd = self.generator.vertex(x, y);
                    if !cmd.is_stop() {
                        return cmd;
                    }
                    self.status = Status::Accumulate;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
