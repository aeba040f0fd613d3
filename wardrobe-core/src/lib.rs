pub mod ai;
pub mod error;
pub mod types;

pub use error::{ErrorKind, PipelineError};
pub use types::{
    GarmentAttributes, GarmentCandidate, GarmentCategory, PipelineOutcome,
    RecommendationConstraints, RecommendationResult, Season, SeasonSet,
};
