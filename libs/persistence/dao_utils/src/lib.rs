pub mod pagination;
pub mod query_helpers;

pub use pagination::PaginationParams;
pub use query_helpers::{PgParam, PgParamBox, PgParamVec, SqlParams};
