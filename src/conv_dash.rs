//! Dash stage for vertex sources.
//!
//! `ConvDash` pairs a [`SubpathAdapter`] with a [`Dash`] generator so any
//! vertex source can be dashed subpath by subpath.

use crate::basics::{PathCommand, VertexSource};
use crate::dash::Dash;
use crate::error::Result;
use crate::options::DashPattern;
use crate::subpath_adapter::SubpathAdapter;

// ============================================================================
// ConvDash
// ============================================================================

/// Splits every subpath of `VS` into dashes.
///
/// With an empty pattern the subpaths pass through undashed.
pub struct ConvDash<VS: VertexSource> {
    base: SubpathAdapter<VS, Dash>,
}

impl<VS: VertexSource> ConvDash<VS> {
    pub fn new(source: VS) -> Self {
        Self {
            base: SubpathAdapter::new(source, Dash::new()),
        }
    }

    pub fn with_pattern(source: VS, pattern: DashPattern) -> Result<Self> {
        Ok(Self {
            base: SubpathAdapter::new(source, Dash::with_pattern(pattern)?),
        })
    }

    pub fn add_dash(&mut self, dash_length: f64, gap_length: f64) -> Result<()> {
        self.base.generator_mut().add_dash(dash_length, gap_length)
    }

    pub fn remove_all_dashes(&mut self) {
        self.base.generator_mut().remove_all_dashes();
    }

    pub fn set_dash_start(&mut self, dash_start: f64) -> Result<()> {
        self.base.generator_mut().set_dash_start(dash_start)
    }

    pub fn set_pattern(&mut self, pattern: DashPattern) -> Result<()> {
        self.base.generator_mut().set_pattern(pattern)
    }

    pub fn pattern(&self) -> &DashPattern {
        self.base.generator().pattern()
    }

    pub fn source(&self) -> &VS {
        self.base.source()
    }

    pub fn source_mut(&mut self) -> &mut VS {
        self.base.source_mut()
    }

    /// Subpaths dashed since the last rewind.
    pub fn subpaths(&self) -> usize {
        self.base.subpaths()
    }

    pub fn into_source(self) -> VS {
        self.base.into_inner().0
    }
}

impl<VS: VertexSource> VertexSource for ConvDash<VS> {
    fn rewind(&mut self, path_id: u32) {
        self.base.rewind(path_id);
    }

    fn vertex(&mut self, x: &mut f64, y: &mut f64) -> PathCommand {
        self.base.vertex(x, y)
    }
}

// ============================================================================
// Tests
// ============================================================================
