//! Value objects: strong-typed ids and small immutable data shapes shared
//! across entities and ports.

mod ids;
mod search;

pub use ids::{JobId, JobRunId, OrgId, ProjectId};
pub use search::{tokenize, ParsedQuery, SearchFilters};
