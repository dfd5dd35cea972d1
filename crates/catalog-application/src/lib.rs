//! Application layer: catalog use cases built on top of `catalog-domain`
//! ports. Pure orchestration logic, no concrete infrastructure.

pub mod discovery;
pub mod embedding;
pub mod jobs;
pub mod manifest;
pub mod quality;
pub mod search;

pub use discovery::{DiscoveredProject, DiscoveryOptions, ProjectDiscovery};
pub use embedding::{EmbeddingConfig, EmbeddingService, SimilaritySearchFilter};
pub use jobs::{
    EmbeddingIndexHandler, HealthCheckHandler, JobHandler, LlmAnalysisHandler,
    QualityAssessmentHandler, RefreshHandler, ScanHandler,
};
pub use manifest::ManifestReader;
pub use quality::{assess_quality, health_score, scan_quality_indicators, QualityAssessment};
pub use search::{HybridSearchEngine, NlQueryParser, SearchResult, SearchWeights};
