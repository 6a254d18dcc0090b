pub mod canonical;
pub mod clock;
pub mod config;
pub mod error;
pub mod extractors;
pub mod ingestion;
pub mod normalizer;
pub mod reconciler;
pub mod routine;
pub mod service;
pub mod traits;

pub use canonical::models::{ExerciseEntry, RecordContainer, Series, Workload};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use normalizer::{ExerciseDictionary, NameNormalizer};
pub use reconciler::DailyStatusView;
pub use routine::RoutineMap;
pub use service::{Outcome, WorkoutTracker};
pub use traits::{Generation, TextGenerator};
