//! ScholarNet Analytics
//!
//! Author-level analysis on top of the collaboration network:
//! - Publication cleaning and bibliometric statistics
//! - Feature table assembly and standardization
//! - Composite influence scoring
//! - Citation prediction with model comparison
//! - Author clustering with a 2-D projection

pub mod bibliometrics;
pub mod clustering;
pub mod features;
pub mod prediction;
pub mod scaler;
pub mod scoring;

pub use bibliometrics::{author_statistics, clean_publications, top_authors, StatsRanking};
pub use clustering::{AuthorClusterer, ClusteringResult, ProjectedAuthor};
pub use features::FeatureAssembler;
pub use prediction::{CitationPredictor, PredictionReport, PredictorConfig, Regressor};
pub use scaler::Standardizer;
pub use scoring::{top_influential, InfluenceScorer};
