//! Configuration for the pipeline stages.
//!
//! Plain-data option structs with defaults and validation. Generators take
//! them through `apply_options` / `set_pattern`, which validate before
//! touching any state. With the `serialization` feature they can be loaded
//! from any serde format.

use crate::curves::DEFAULT_SEGMENT_LENGTH;
use crate::error::{Error, Result};
use crate::stroke_math::{LineCap, LineJoin};

// ============================================================================
// StrokeOptions
// ============================================================================

/// Parameters of the stroke generator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct StrokeOptions {
    /// Full stroke width (not the half-width).
    ///
    /// Default value: `StrokeOptions::DEFAULT_WIDTH`.
    pub width: f64,

    /// Cap applied at both free ends of open subpaths.
    ///
    /// Default value: `LineCap::Butt`.
    pub line_cap: LineCap,

    /// Join applied at interior vertices.
    ///
    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// Maximum miter length, in multiples of the half-width.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f64,

    /// Density of the arcs produced by round caps and joins. Larger values
    /// produce more vertices.
    ///
    /// Default value: 1.0.
    pub approximation_scale: f64,
}

impl StrokeOptions {
    pub const DEFAULT_WIDTH: f64 = 1.0;
    pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.width.is_finite() {
            return Err(Error::InvalidWidth(self.width));
        }
        if !self.miter_limit.is_finite() || self.miter_limit < 1.0 {
            return Err(Error::InvalidMiterLimit(self.miter_limit));
        }
        if !self.approximation_scale.is_finite() || self.approximation_scale <= 0.0 {
            return Err(Error::InvalidApproximationScale(self.approximation_scale));
        }
        Ok(())
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: Self::DEFAULT_MITER_LIMIT,
            approximation_scale: 1.0,
        }
    }
}

// ============================================================================
// DashPattern
// ============================================================================

/// Cyclic on/off pattern used by the dash generator.
///
/// The pattern is only changed through the editing methods; generating
/// vertices works on a copy of the cycle position seeded from `dash_start`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct DashPattern {
    /// `(dash_length, gap_length)` pairs, applied in order and repeated.
    pub dashes: Vec<(f64, f64)>,
    /// Offset into the cycle at which every subpath starts.
    pub dash_start: f64,
}

impl DashPattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
        let pattern = Self {
            dashes: pairs.to_vec(),
            dash_start: 0.0,
        };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn add_dash(&mut self, dash_length: f64, gap_length: f64) {
        self.dashes.push((dash_length, gap_length));
    }

    pub fn remove_all(&mut self) {
        self.dashes.clear();
        self.dash_start = 0.0;
    }

    pub fn with_dash_start(mut self, dash_start: f64) -> Self {
        self.dash_start = dash_start;
        self
    }

    /// Length of one full cycle.
    pub fn total_length(&self) -> f64 {
        self.dashes.iter().map(|&(d, g)| d + g).sum()
    }

    /// A pattern that cannot split anything: no pairs or zero cycle length.
    /// Only meaningful for a pattern that passes `validate`.
    pub fn is_degenerate(&self) -> bool {
        self.total_length() <= 0.0
    }

    pub fn validate(&self) -> Result<()> {
        for (index, &(dash, gap)) in self.dashes.iter().enumerate() {
            let valid = |v: f64| v.is_finite() && v >= 0.0;
            if !valid(dash) || !valid(gap) {
                return Err(Error::InvalidDash { index, dash, gap });
            }
        }
        if !self.dash_start.is_finite() {
            return Err(Error::InvalidDashStart(self.dash_start));
        }
        Ok(())
    }
}

// ============================================================================
// FlattenOptions
// ============================================================================

/// Curve flattening tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct FlattenOptions {
    /// Longest straight segment, in path units, a curve is approximated with.
    /// Smaller values produce more vertices.
    ///
    /// Default value: `DEFAULT_SEGMENT_LENGTH`.
    pub segment_length: f64,
}

impl FlattenOptions {
    pub fn new(segment_length: f64) -> Self {
        Self { segment_length }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.segment_length.is_finite() || self.segment_length <= 0.0 {
            return Err(Error::InvalidSegmentLength(self.segment_length));
        }
        Ok(())
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            segment_length: DEFAULT_SEGMENT_LENGTH,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_defaults() {
        let o = StrokeOptions::default();
        assert_eq!(o.width, 1.0);
        assert_eq!(o.line_cap, LineCap::Butt);
        assert_eq!(o.line_join, LineJoin::Miter);
        assert_eq!(o.miter_limit, 4.0);
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_stroke_validation() {
        assert_eq!(
            StrokeOptions::new(f64::INFINITY).validate(),
            Err(Error::InvalidWidth(f64::INFINITY))
        );
        assert_eq!(
            StrokeOptions::new(2.0).with_miter_limit(0.5).validate(),
            Err(Error::InvalidMiterLimit(0.5))
        );
        // Zero and negative widths are accepted; the stroker degrades them.
        assert!(StrokeOptions::new(0.0).validate().is_ok());
        assert!(StrokeOptions::new(-3.0).validate().is_ok());
    }

    #[test]
    fn test_dash_pattern() {
        let mut p = DashPattern::from_pairs(&[(2.0, 1.0)]).unwrap();
        p.add_dash(0.0, 3.0);
        assert_eq!(p.total_length(), 6.0);
        assert!(!p.is_degenerate());

        p.remove_all();
        assert!(p.is_degenerate());
        assert!(DashPattern::from_pairs(&[(0.0, 0.0)]).unwrap().is_degenerate());
    }

    #[test]
    fn test_dash_pattern_validation() {
        assert_eq!(
            DashPattern::from_pairs(&[(1.0, 1.0), (-1.0, 2.0)]),
            Err(Error::InvalidDash {
                index: 1,
                dash: -1.0,
                gap: 2.0
            })
        );
        let p = DashPattern::from_pairs(&[(1.0, 1.0)])
            .unwrap()
            .with_dash_start(f64::NAN);
        assert!(matches!(p.validate(), Err(Error::InvalidDashStart(_))));
    }

    #[test]
    fn test_flatten_options() {
        assert!(FlattenOptions::default().validate().is_ok());
        assert_eq!(
            FlattenOptions::new(0.0).validate(),
            Err(Error::InvalidSegmentLength(0.0))
        );
        assert!(FlattenOptions::new(-1.0).validate().is_err());
    }
}
