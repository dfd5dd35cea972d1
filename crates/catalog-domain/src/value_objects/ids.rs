//! Strong-typed UUID identifiers for the catalog's domain entities.

define_id!(ProjectId, "Strong typed identifier for a project");
define_id!(JobId, "Strong typed identifier for a job");
define_id!(JobRunId, "Strong typed identifier for a job run");
define_id!(OrgId, "Strong typed identifier for an organization (tenant isolation)");
