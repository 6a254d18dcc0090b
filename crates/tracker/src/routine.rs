use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use storage::RoutineDayStore;
use storage::models::PlannedDay;
use tracing::{debug, info};

use crate::Result;
use crate::normalizer::NameNormalizer;

/// Weekday number (1 = Monday) → planned exercise names, in order.
pub type RoutineMap = BTreeMap<u8, Vec<String>>;

/// Per-weekday routine persistence with replace-on-save semantics.
pub struct RoutineStore<S> {
    store: Arc<S>,
    normalizer: NameNormalizer,
}

impl<S: RoutineDayStore> RoutineStore<S> {
    pub fn new(store: Arc<S>, normalizer: NameNormalizer) -> Self {
        Self { store, normalizer }
    }

    /// Replaces the user's routine with the valid days of `routine`.
    ///
    /// Keys that are not a weekday number in 1..=7 and values that are not
    /// lists are skipped rather than failing the save. Names are stored
    /// canonicalized so they compare equal to logged exercise names.
    pub async fn save(&self, user_id: &str, routine: &Map<String, Value>) -> Result<usize> {
        let days = self.parse_days(routine);

        self.store.replace_routine(user_id, &days).await?;

        info!(
            "Saved routine for user {} ({} of {} day(s))",
            user_id,
            days.len(),
            routine.len()
        );
        Ok(days.len())
    }

    pub async fn load(&self, user_id: &str) -> Result<RoutineMap> {
        let days = self.store.load_routine(user_id).await?;

        Ok(days
            .into_iter()
            .filter_map(|day| {
                let weekday = u8::try_from(day.weekday).ok()?;
                Some((weekday, day.exercises.0))
            })
            .collect())
    }

    /// Planned names for one weekday, if that day has a routine.
    pub async fn planned_for(&self, user_id: &str, weekday: u8) -> Result<Option<Vec<String>>> {
        Ok(self.load(user_id).await?.remove(&weekday))
    }

    fn parse_days(&self, routine: &Map<String, Value>) -> Vec<PlannedDay> {
        let mut days = RoutineMap::new();

        for (key, value) in routine {
            let Some(weekday) = parse_weekday(key) else {
                debug!("Skipping routine key '{}': not a weekday number", key);
                continue;
            };
            let Some(items) = value.as_array() else {
                debug!("Skipping routine day {}: value is not a list", weekday);
                continue;
            };

            let exercises = items
                .iter()
                .filter_map(Value::as_str)
                .map(|name| self.normalizer.canonicalize(name))
                .filter(|name| !name.is_empty())
                .collect();

            // "1" and "01" name the same day; the later key wins.
            days.insert(weekday, exercises);
        }

        days.into_iter()
            .map(|(weekday, exercises)| PlannedDay {
                weekday: i16::from(weekday),
                exercises,
            })
            .collect()
    }
}

fn parse_weekday(key: &str) -> Option<u8> {
    key.trim()
        .parse::<u8>()
        .ok()
        .filter(|weekday| (1..=7).contains(weekday))
}
