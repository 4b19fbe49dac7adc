//! Record fusion for PowerWatch builds.
//!
//! [`FusionEngine`] admits plants into the canonical dataset tier by tier:
//! national feeds, WRI with its concordance fallbacks, GEO for GEO-routed
//! countries, then the SourceWatch overlay. Everything that goes wrong along
//! the way is recoverable and lands in the [`RunLog`](pw_model::RunLog).

pub mod dump;
pub mod engine;
pub mod estimate;
pub mod strategy;
pub mod tally;

pub use dump::{DumpStats, tag_dump};
pub use engine::{DEFAULT_MIN_CAPACITY_MW, FusionConfig, FusionEngine, FusionOutcome};
pub use estimate::{
    CapacityFactorEstimator, DEFAULT_CAPACITY_FACTORS, GenerationEstimator, HOURS_PER_YEAR,
};
pub use strategy::{
    CarmaConcordance, ClaimedSet, FallbackContext, GeoConcordance, LocationStrategy,
    OwnCoordinates, Resolution, ResolvedLocation, default_strategies,
};
pub use tally::{Tally, TallyKey, TallyReport, TallyRow};
