use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Every variant reflects a structural precondition violation, not a
/// transient fault; callers must surface them immediately rather than retry.
/// Messages carry the offending shapes and bounds so grid-mismatch problems
/// stay debuggable.
#[derive(Error, Debug)]
pub enum SwtError {
    #[error("shape mismatch ({context}): {left:?} vs {right:?}")]
    ShapeMismatch {
        context: String,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    #[error("target {axis} {value} outside source range [{min}, {max}]; refusing to extrapolate")]
    OutOfDomain {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("cannot form {requested} clusters from {samples} samples")]
    InsufficientData { requested: usize, samples: usize },

    #[error("variable '{name}' has unsupported shape {shape:?}; expected 3-D (time, lat, lon) or 4-D (time, level, lat, lon)")]
    UnsupportedShape { name: String, shape: Vec<usize> },

    #[error("{}: {what}", .path.display())]
    SchemaMismatch { path: PathBuf, what: String },

    #[error("invalid date '{value}': expected YYYY-MM")]
    InvalidDate { value: String },

    #[error("clustering failed: {0}")]
    Cluster(String),

    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwtError {
    pub(crate) fn shape_mismatch(context: impl Into<String>, left: &[usize], right: &[usize]) -> Self {
        SwtError::ShapeMismatch {
            context: context.into(),
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}
