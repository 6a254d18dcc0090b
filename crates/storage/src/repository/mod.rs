pub mod exercise_log;
pub mod routine;

pub use exercise_log::{ExerciseLogRepository, PgLogBatch};
pub use routine::RoutineRepository;
