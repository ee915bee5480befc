//! Data model shared by every ScholarNet stage
//!
//! All entities are recomputed from the publication records on each run and
//! never mutated after construction.

mod author;
mod prediction;
mod publication;

pub use author::{AuthorStats, ClusterAssignment, FeatureColumn, FeatureVector, NetworkMetricRow, ScoredAuthor};
pub use prediction::{FeatureImportance, ModelFailure, ModelKind, PredictionResult};
pub use publication::{parse_citation_count, ExternalIds, PublicationRecord};
