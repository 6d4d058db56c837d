//! Constraint matching over a bundle's index and table.

mod constraint;
mod matcher;
mod pagination;

pub use constraint::{format_param, Constraint, Constraints};
pub use matcher::{
    apply_restrict, determine_matches, is_date, is_partial_match, is_range_match, materialize,
    Operator, Query,
};
pub use pagination::{paginate, Pagination};
