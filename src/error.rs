//! Crate error type.
//!
//! Vertex generation itself never fails: degenerate geometry degrades to
//! minimal output. Errors are limited to configuration validation and to
//! explicit, fallible buffer reservation.

use std::collections::TryReserveError;

use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    #[error("failed to grow vertex buffer: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("stroke width must be finite, got {0}")]
    InvalidWidth(f64),
    #[error("flattening segment length must be finite and positive, got {0}")]
    InvalidSegmentLength(f64),
    #[error("dash #{index} must have finite, non-negative lengths, got dash={dash} gap={gap}")]
    InvalidDash { index: usize, dash: f64, gap: f64 },
    #[error("dash start must be finite, got {0}")]
    InvalidDashStart(f64),
    #[error("miter limit must be finite and at least 1.0, got {0}")]
    InvalidMiterLimit(f64),
    #[error("approximation scale must be finite and positive, got {0}")]
    InvalidApproximationScale(f64),
    #[error("path storage holds {0} elements, too many to address a new path")]
    PathIdOverflow(usize),
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = Error::InvalidDash {
            index: 2,
            dash: -1.0,
            gap: 3.0,
        };
        assert_eq!(
            e.to_string(),
            "dash #2 must have finite, non-negative lengths, got dash=-1 gap=3"
        );
        assert_eq!(
            Error::InvalidWidth(f64::NAN).to_string(),
            "stroke width must be finite, got NaN"
        );
    }

    #[test]
    fn test_allocation_from_try_reserve() {
        let mut v: Vec<u64> = Vec::new();
        let err = v.try_reserve(usize::MAX).unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Allocation(_)));
    }
}
