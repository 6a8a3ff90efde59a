pub mod criteria;
pub mod date;
pub mod filter;
pub mod module;
pub mod score;
pub mod trial;

mod error;

pub use criteria::{CategorizedCriteria, CriteriaBuckets, CriteriaItem, CriteriaSide, StructuredTag};
pub use date::TrialDate;
pub use error::{Error, Result};
pub use filter::{CountryLogic, Filters};
pub use module::{Module, ModuleScores, SimilarityWeights};
pub use score::ScoreBreakdown;
pub use trial::{AdverseEventGroup, DropoutReason, TrialDocument};
