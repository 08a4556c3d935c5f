//! Stroke stage for vertex sources.
//!
//! `ConvStroke` pairs a [`SubpathAdapter`] with a [`Stroke`] generator so any
//! vertex source can be stroked subpath by subpath.

use crate::basics::{PathCommand, VertexSource};
use crate::error::Result;
use crate::options::StrokeOptions;
use crate::stroke::Stroke;
use crate::stroke_math::{LineCap, LineJoin};
use crate::subpath_adapter::SubpathAdapter;

// ============================================================================
// ConvStroke
// ============================================================================

/// Outlines every subpath of `VS`.
///
/// Restartable whenever `VS` is: `rewind` is forwarded upstream.
pub struct ConvStroke<VS: VertexSource> {
    base: SubpathAdapter<VS, Stroke>,
}

impl<VS: VertexSource> ConvStroke<VS> {
    pub fn new(source: VS) -> Self {
        Self {
            base: SubpathAdapter::new(source, Stroke::new()),
        }
    }

    pub fn with_options(source: VS, options: &StrokeOptions) -> Result<Self> {
        Ok(Self {
            base: SubpathAdapter::new(source, Stroke::with_options(options)?),
        })
    }

    pub fn apply_options(&mut self, options: &StrokeOptions) -> Result<()> {
        self.base.generator_mut().apply_options(options)
    }

    pub fn options(&self) -> StrokeOptions {
        self.base.generator().options()
    }

    // Parameter forwarding
    pub fn set_width(&mut self, w: f64) {
        self.base.generator_mut().set_width(w);
    }
    pub fn width(&self) -> f64 {
        self.base.generator().width()
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.base.generator_mut().set_line_cap(cap);
    }
    pub fn line_cap(&self) -> LineCap {
        self.base.generator().line_cap()
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.base.generator_mut().set_line_join(join);
    }
    pub fn line_join(&self) -> LineJoin {
        self.base.generator().line_join()
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.base.generator_mut().set_miter_limit(limit);
    }
    pub fn miter_limit(&self) -> f64 {
        self.base.generator().miter_limit()
    }

    pub fn set_approximation_scale(&mut self, scale: f64) {
        self.base.generator_mut().set_approximation_scale(scale);
    }
    pub fn approximation_scale(&self) -> f64 {
        self.base.generator().approximation_scale()
    }

    pub fn source(&self) -> &VS {
        self.base.source()
    }

    pub fn source_mut(&mut self) -> &mut VS {
        self.base.source_mut()
    }

    /// Subpaths stroked since the last rewind.
    pub fn subpaths(&self) -> usize {
        self.base.subpaths()
    }

    pub fn into_source(self) -> VS {
        self.base.into_inner().0
    }
}

impl<VS: VertexSource> VertexSource for ConvStroke<VS> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::{collect_into, VertexD};
    use crate::path_storage::PathStorage;

    fn count(out: &[VertexD], cmd: PathCommand) -> usize {
        out.iter().filter(|v| v.cmd == cmd).count()
    }

    #[test]
    fn test_empty_path() {
        let mut stroke = ConvStroke::new(PathStorage::new());
        let mut out = Vec::new();
        collect_into(&mut stroke, 0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_simple_line() {
        let mut path = PathStorage::new();
        path.move_to(10.0, 50.0);
        path.line_to(90.0, 50.0);
        let mut stroke = ConvStroke::new(path);
        stroke.set_width(10.0);
        let mut out = Vec::new();
        collect_into(&mut stroke, 0, &mut out);
        assert_eq!(out.len(), 5);
        let min_y = out.iter().map(|v| v.y).fold(f64::INFINITY, f64::min);
        let max_y = out.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);
        assert!((min_y - 45.0).abs() < 1e-9);
        assert!((max_y - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_each_subpath_stroked() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0);
        path.move_to(0.0, 20.0);
        path.line_to(10.0, 20.0);
        path.line_to(10.0, 30.0);
        path.close_polygon();
        path.move_to(50.0, 50.0);
        path.line_to(60.0, 60.0);

        let mut stroke = ConvStroke::new(path);
        let mut out = Vec::new();
        collect_into(&mut stroke, 0, &mut out);
        assert_eq!(stroke.subpaths(), 3);
        // Open, closed (two rings), open.
        assert_eq!(count(&out, PathCommand::MoveTo), 4);
        assert_eq!(count(&out, PathCommand::Close), 4);
    }

    #[test]
    fn test_curve_is_flattened_then_stroked() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.quad_to(50.0, 100.0, 100.0, 0.0);
        let mut stroke = ConvStroke::new(path);
        stroke.set_width(4.0);
        stroke.set_line_join(LineJoin::Round);
        let mut out = Vec::new();
        collect_into(&mut stroke, 0, &mut out);
        assert!(out.len() > 20);
        assert_eq!(count(&out, PathCommand::MoveTo), 1);
    }

    #[test]
    fn test_parameter_forwarding() {
        let mut stroke = ConvStroke::new(PathStorage::new());
        stroke.set_width(3.0);
        stroke.set_line_cap(LineCap::Square);
        stroke.set_line_join(LineJoin::Bevel);
        stroke.set_miter_limit(6.0);
        stroke.set_approximation_scale(2.0);
        assert_eq!(stroke.width(), 3.0);
        assert_eq!(stroke.line_cap(), LineCap::Square);
        assert_eq!(stroke.line_join(), LineJoin::Bevel);
        assert_eq!(stroke.miter_limit(), 6.0);
        assert_eq!(stroke.approximation_scale(), 2.0);

        let opts = StrokeOptions::new(8.0).with_line_cap(LineCap::Round);
        stroke.apply_options(&opts).unwrap();
        assert_eq!(stroke.options(), opts);
    }

    #[test]
    fn test_borrowed_source() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0);
        let mut out = Vec::new();
        {
            let mut stroke = ConvStroke::new(&mut path);
            collect_into(&mut stroke, 0, &mut out);
        }
        assert_eq!(out.len(), 5);
        path.line_to(10.0, 10.0);
        assert_eq!(path.total_elements(), 3);
    }
}
