use serde_json::{Map, Value};
use tracing::warn;

use super::models::{ExerciseEntry, RecordContainer, Series, Workload};
use crate::normalizer::NameNormalizer;
use crate::{Result, TrackerError};

const NAME_KEYS: &[&str] = &["name", "ejercicio", "exercise", "nombre"];
const SERIES_KEYS: &[&str] = &["series", "sets"];
const DURATION_KEYS: &[&str] = &["duration_minutes", "duracion_minutos", "duracion", "duration"];
const COMMENT_KEYS: &[&str] = &["comments", "comentarios", "notes", "notas"];
const EFFORT_KEYS: &[&str] = &["effort_reserve", "rir"];
const REPETITION_KEYS: &[&str] = &["repetitions", "repeticiones", "reps"];
const WEIGHT_KEYS: &[&str] = &["weight", "peso"];

/// Turns a coerced model response into validated entries.
///
/// One bad entry fails the whole batch: a response that is inconsistent
/// anywhere is not trusted anywhere.
pub struct RecordValidator {
    normalizer: NameNormalizer,
}

#[derive(Debug)]
pub struct ValidatedRecords {
    pub entries: Vec<ExerciseEntry>,
    pub report: ValidationReport,
}

impl RecordValidator {
    pub fn new(normalizer: NameNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn validate(&self, container: &RecordContainer) -> Result<ValidatedRecords> {
        let mut report = ValidationReport::default();
        let mut entries = Vec::with_capacity(container.registro.len());

        for (idx, raw) in container.registro.iter().enumerate() {
            if let Some(entry) = self.validate_entry(idx + 1, raw, &mut report) {
                entries.push(entry);
            }
        }

        if !report.errors.is_empty() {
            Err(TrackerError::Validation(format!(
                "Validation failed with {} error(s): {}",
                report.errors.len(),
                report.errors.join("; ")
            )))
        } else {
            Ok(ValidatedRecords { entries, report })
        }
    }

    fn validate_entry(
        &self,
        position: usize,
        raw: &Value,
        report: &mut ValidationReport,
    ) -> Option<ExerciseEntry> {
        let Some(object) = raw.as_object() else {
            report
                .errors
                .push(format!("Entry {} is not an object: {}", position, raw));
            return None;
        };

        let name = match field(object, NAME_KEYS).and_then(Value::as_str) {
            Some(raw_name) => self.normalizer.canonicalize(raw_name),
            None => String::new(),
        };
        if name.is_empty() {
            report
                .errors
                .push(format!("Entry {} has no exercise name", position));
            return None;
        }
        let label = format!("{}. {}", position, name);
        let errors_before = report.errors.len();

        let series_field = field(object, SERIES_KEYS);
        let series = match series_field {
            None => None,
            Some(Value::Array(items)) if items.is_empty() => None,
            Some(Value::Array(items)) => Some(self.validate_series(&label, items, report)),
            Some(other) => {
                report.errors.push(format!(
                    "Exercise '{}': field 'series' must be a list, got {}",
                    label, other
                ));
                None
            }
        };

        let duration = field(object, DURATION_KEYS)
            .map(|value| coerce_int(value, "duration_minutes"))
            .transpose()
            .unwrap_or_else(|e| {
                report.errors.push(format!("Exercise '{}': {}", label, e));
                None
            });

        let effort_reserve = field(object, EFFORT_KEYS)
            .map(|value| coerce_int(value, "effort_reserve"))
            .transpose()
            .unwrap_or_else(|e| {
                report.errors.push(format!("Exercise '{}': {}", label, e));
                None
            });

        let comments = field(object, COMMENT_KEYS)
            .map(|value| coerce_text(value, "comments"))
            .transpose()
            .unwrap_or_else(|e| {
                report.errors.push(format!("Exercise '{}': {}", label, e));
                None
            })
            .flatten();

        if duration.is_some_and(|d| d < 0) {
            report.errors.push(format!(
                "Exercise '{}': duration_minutes must be >= 0",
                label
            ));
        }
        if effort_reserve.is_some_and(|r| r < 0) {
            report.errors.push(format!(
                "Exercise '{}': effort_reserve must be >= 0",
                label
            ));
        }

        let workload = match (series, duration) {
            // An empty series list still counts as a second workload.
            (None, Some(_)) if series_field.is_some_and(Value::is_array) => {
                report.errors.push(format!(
                    "Exercise '{}' has both series and duration_minutes",
                    label
                ));
                None
            }
            (Some(_), Some(_)) => {
                report.errors.push(format!(
                    "Exercise '{}' has both series and duration_minutes",
                    label
                ));
                None
            }
            (Some(series), None) => Some(Workload::Series(series)),
            (None, Some(minutes)) => Some(Workload::DurationMinutes(minutes)),
            (None, None) => {
                if series_field.is_none() || report.errors.len() == errors_before {
                    report.errors.push(format!(
                        "Exercise '{}' has neither series nor duration_minutes",
                        label
                    ));
                }
                None
            }
        };

        if report.errors.len() > errors_before {
            return None;
        }

        let entry = ExerciseEntry {
            name,
            workload: workload?,
            comments,
            effort_reserve,
        };

        if let Some(series) = entry.series() {
            if series.iter().all(|s| s.weight == 0.0) {
                report.warnings.push(format!(
                    "Exercise '{}' has no weight on any set, logged as bodyweight",
                    label
                ));
            }
            if entry.effort_reserve.is_some() && series.iter().all(|s| s.effort_reserve.is_some()) {
                report.warnings.push(format!(
                    "Exercise '{}' has an entry RIR and a RIR on every set",
                    label
                ));
            }
        }

        Some(entry)
    }

    fn validate_series(
        &self,
        label: &str,
        items: &[Value],
        report: &mut ValidationReport,
    ) -> Vec<Series> {
        let mut series = Vec::with_capacity(items.len());

        for (idx, item) in items.iter().enumerate() {
            let set_label = format!("Exercise '{}', set {}", label, idx + 1);
            let Some(object) = item.as_object() else {
                report
                    .errors
                    .push(format!("{}: expected an object, got {}", set_label, item));
                continue;
            };

            let repetitions = match field(object, REPETITION_KEYS) {
                Some(value) => coerce_int(value, "repetitions"),
                None => Err("missing field 'repetitions'".to_string()),
            };
            let weight = field(object, WEIGHT_KEYS)
                .map(|value| coerce_float(value, "weight"))
                .unwrap_or(Ok(0.0));
            let effort_reserve = field(object, EFFORT_KEYS)
                .map(|value| coerce_int(value, "effort_reserve"))
                .transpose();

            match (repetitions, weight, effort_reserve) {
                (Ok(repetitions), Ok(weight), Ok(effort_reserve)) => {
                    if repetitions < 0 {
                        report
                            .errors
                            .push(format!("{}: repetitions must be >= 0", set_label));
                    }
                    if weight < 0.0 {
                        report
                            .errors
                            .push(format!("{}: negative weight", set_label));
                    }
                    if effort_reserve.is_some_and(|r| r < 0) {
                        report
                            .errors
                            .push(format!("{}: effort_reserve must be >= 0", set_label));
                    }
                    series.push(Series {
                        repetitions,
                        weight,
                        effort_reserve,
                    });
                }
                (repetitions, weight, effort_reserve) => {
                    for e in [repetitions.err(), weight.err(), effort_reserve.err()]
                        .into_iter()
                        .flatten()
                    {
                        report.errors.push(format!("{}: {}", set_label, e));
                    }
                }
            }
        }

        series
    }
}

/// First present, non-null value among the accepted spellings of a key.
fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn coerce_int(value: &Value, name: &str) -> std::result::Result<i32, String> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.replace(',', ".")
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    };

    parsed
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| format!("field '{}' is not an integer: {}", name, value))
}

fn coerce_float(value: &Value, name: &str) -> std::result::Result<f64, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            let s = s
                .strip_suffix("kg")
                .or_else(|| s.strip_suffix("KG"))
                .or_else(|| s.strip_suffix("Kg"))
                .unwrap_or(s);
            s.trim().replace(',', ".").parse::<f64>().ok()
        }
        _ => None,
    };

    parsed
        .filter(|f| f.is_finite())
        .ok_or_else(|| format!("field '{}' is not a number: {}", name, value))
}

fn coerce_text(value: &Value, name: &str) -> std::result::Result<Option<String>, String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Value::Number(_) | Value::Bool(_) => Ok(Some(value.to_string())),
        _ => Err(format!("field '{}' is not text: {}", name, value)),
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}
