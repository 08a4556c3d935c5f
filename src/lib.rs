//! # vertex-pipeline
//!
//! The vertex-generation half of a 2D vector renderer: it turns a path made
//! of lines and quadratic/cubic Bézier curves into a flattened, optionally
//! dashed, optionally stroked stream of line segments ready for scan
//! conversion.
//!
//! ## Architecture
//!
//! Every stage implements [`VertexSource`] and pulls from its upstream only
//! when asked for a vertex:
//!
//! 1. **Path** ([`PathStorage`]) flattens curves lazily with
//!    [`QuadraticIter`] / [`CubicIter`]
//! 2. **Dash** ([`ConvDash`]) splits each subpath into pattern runs
//! 3. **Stroke** ([`ConvStroke`]) outlines each subpath with caps and joins
//!
//! Dash and stroke need a whole subpath at a time. [`SubpathAdapter`]
//! buffers one subpath into a [`Generator`], replays the result and moves on,
//! so the full path is never materialised.
//!
//! ```
//! use vertex_pipeline::{collect_into, ConvDash, ConvStroke, PathStorage};
//!
//! let mut path = PathStorage::new();
//! path.move_to(0.0, 0.0);
//! path.quad_to(50.0, 80.0, 100.0, 0.0);
//!
//! let mut dash = ConvDash::new(path);
//! dash.add_dash(10.0, 5.0).unwrap();
//! let mut stroke = ConvStroke::new(dash);
//! stroke.set_width(2.0);
//!
//! let mut out = Vec::new();
//! collect_into(&mut stroke, 0, &mut out);
//! assert!(!out.is_empty());
//! ```

pub mod basics;
pub mod error;
pub mod math;
pub mod options;

pub mod curves;
pub mod path_storage;
pub mod vertex_sequence;

pub mod subpath_adapter;

pub mod dash;
pub mod stroke;
pub mod stroke_math;

pub mod conv_dash;
pub mod conv_stroke;

pub use basics::{collect_into, point, PathCommand, PointD, VertexD, VertexSource};
pub use conv_dash::ConvDash;
pub use conv_stroke::ConvStroke;
pub use curves::{CubicBezier, CubicIter, QuadraticBezier, QuadraticIter};
pub use dash::Dash;
pub use error::{Error, Result};
pub use options::{DashPattern, FlattenOptions, StrokeOptions};
pub use path_storage::PathStorage;
pub use stroke::Stroke;
pub use stroke_math::{Cap, Join, LineCap, LineJoin};
pub use subpath_adapter::{Generator, SubpathAdapter};
