//! Cast plans: the per-column type coercion requested at upload time.
//!
//! A plan holds exactly one [`CastSpec`] per header. A `CastSpec` is a tagged
//! union keyed by the target type, so a refinement can only exist where
//! the type supports one (bit width for numbers, format for datetimes).
//!
//! ```ignore
//! let mut plan = CastPlan::new(["A", "B"]);
//! plan.set_type("A", CastType::Int)?;
//! plan.set_option("A", "int32")?;
//! assert_eq!(plan.directives()[0].value, "int32");
//! ```

mod cast;
mod plan;

use thiserror::Error;

pub use cast::{CastSpec, CastType, FloatWidth, IntWidth, UintWidth};
pub use plan::{Assignment, CastPlan, ColumnCast, Directive, DIRECTIVE_PREFIX};

/// Errors from building or editing a plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown column '{0}'")]
    UnknownHeader(String),

    #[error("unknown cast type '{0}'")]
    UnknownType(String),

    #[error("cast type '{0}' takes no option")]
    OptionNotSupported(CastType),

    #[error("'{value}' is not a valid option for '{cast_type}'")]
    InvalidOption { cast_type: CastType, value: String },

    #[error("invalid cast assignment '{0}' (expected COLUMN=TYPE[:OPTION])")]
    InvalidAssignment(String),

    #[error("plan file: {0}")]
    Json(#[from] serde_json::Error),
}
