//! Core types shared by every PowerWatch build stage.

pub mod concordance;
pub mod country;
pub mod error;
pub mod issue;
pub mod plant;
pub mod source;

pub use concordance::{ConcordanceEntry, ConcordanceIndex};
pub use country::{CountryPolicy, CountryPolicyTable, CountryRoute, parse_flag};
pub use error::{ModelError, Result};
pub use issue::{IssueKind, IssueSeverity, RunIssue, RunLog};
pub use plant::{AuditLabel, CoordSource, Generation, Location, PlantMap, PlantRecord};
pub use source::{MalformedRecord, PlantSource, SourceId, SourceSet};
