mod common;

use serde_json::json;
use storage::ExerciseLogStore;
use storage::memory::MemoryStore;
use storage::models::SeriesDetail;

use common::{ScriptedGenerator, USER, at, logged, monday_evening, tracker_with};

const BENCH_RESPONSE: &str = r#"Claro, aquí tienes:
```json
[
  {"name": "Press de banca", "series": [
    {"repetitions": 5, "weight": 75},
    {"repetitions": 7, "weight": 70},
    {"repetitions": 8, "weight": 60, "effort_reserve": 2}
  ]}
]
```"#;

#[tokio::test]
async fn test_submit_log_records_totals_and_series() {
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(BENCH_RESPONSE), store.clone());

    let outcome = tracker
        .submit_log(USER, "press de banca 5x75, 7x70, 8x60 rir 2")
        .await;
    assert!(outcome.success, "{}", outcome.message);

    let logs = store.all_logs();
    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.exercise_name, "press banca");
    assert_eq!(log.total_repetitions, Some(20));
    assert_eq!(log.duration_minutes, None);
    assert_eq!(log.logged_at, monday_evening());

    let series = log.series_detail.as_ref().and_then(SeriesDetail::series).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series[2].effort_reserve, Some(2));
}

#[tokio::test]
async fn test_submit_log_falls_back_without_series_detail_column() {
    let store = MemoryStore::without_series_detail();
    let tracker = tracker_with(ScriptedGenerator::replying(BENCH_RESPONSE), store.clone());

    let outcome = tracker.submit_log(USER, "banca 5x75 7x70 8x60").await;
    assert!(outcome.success, "{}", outcome.message);

    let logs = store.all_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].total_repetitions, Some(20));
    assert!(logs[0].series_detail.is_none());
}

#[tokio::test]
async fn test_mixed_series_and_duration_batch() {
    let response = r#"[
        {"ejercicio": "dominadas", "series": [{"repeticiones": 8}, {"repeticiones": "6"}]},
        {"ejercicio": "Correr", "duracion_minutos": 30, "comentarios": "suave"}
    ]"#;
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(response), store.clone());

    let outcome = tracker
        .submit_log(USER, "dominadas 8 y 6, luego 30 min corriendo")
        .await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.data.as_ref().map(Vec::len), Some(2));

    let logs = store.all_logs();
    let pull_ups = logs.iter().find(|l| l.exercise_name == "dominadas").unwrap();
    assert_eq!(pull_ups.total_repetitions, Some(14));

    let run = logs.iter().find(|l| l.exercise_name == "correr").unwrap();
    assert_eq!(run.duration_minutes, Some(30));
    assert_eq!(run.total_repetitions, None);
    assert_eq!(run.comments.as_deref(), Some("suave"));
}

#[tokio::test]
async fn test_rejected_insert_rolls_back_whole_batch() {
    let response = r#"[
        {"name": "sentadilla", "series": [{"repetitions": 5, "weight": 100}]},
        {"name": "peso muerto", "series": [{"repetitions": 3, "weight": 140}]}
    ]"#;
    let store = MemoryStore::new();
    store.reject_exercise("peso muerto");
    let tracker = tracker_with(ScriptedGenerator::replying(response), store.clone());

    let outcome = tracker.submit_log(USER, "sentadilla 5x100, peso muerto 3x140").await;
    assert!(!outcome.success);
    assert!(outcome.data.is_none());
    assert_eq!(store.count_logs(USER).await.unwrap(), 0);
}

#[tokio::test]
async fn test_response_without_json_leaves_logs_untouched() {
    let store = MemoryStore::new();
    store.seed_log(logged("remo", at(2025, 3, 9, 10, 0)));
    let tracker = tracker_with(
        ScriptedGenerator::replying("Lo siento, no entendí el entrenamiento."),
        store.clone(),
    );

    let outcome = tracker.submit_log(USER, "hice algo").await;
    assert!(!outcome.success);
    assert_eq!(store.count_logs(USER).await.unwrap(), 1);
}

#[tokio::test]
async fn test_empty_record_list_is_a_failure() {
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying("[]"), store.clone());

    let outcome = tracker.submit_log(USER, "nada").await;
    assert!(!outcome.success);
    assert_eq!(store.count_logs(USER).await.unwrap(), 0);
}

#[tokio::test]
async fn test_entry_with_series_and_duration_fails_validation() {
    let response = r#"[{"name": "remo", "series": [{"repetitions": 10}], "duration_minutes": 5}]"#;
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(response), store.clone());

    let outcome = tracker.submit_log(USER, "remo").await;
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("The workout could not be recorded"));
    assert_eq!(store.count_logs(USER).await.unwrap(), 0);
}

#[tokio::test]
async fn test_generator_error_becomes_failure_outcome() {
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::failing("timed out"), store.clone());

    let outcome = tracker.submit_log(USER, "press banca 5x75").await;
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Could not understand"));
}

#[tokio::test]
async fn test_blank_text_is_rejected_before_extraction() {
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), MemoryStore::new());

    let outcome = tracker.submit_log(USER, "   ").await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Nothing to log");
}

#[tokio::test]
async fn test_preview_does_not_persist() {
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(BENCH_RESPONSE), store.clone());

    let outcome = tracker.preview_log("press de banca 5x75, 7x70, 8x60").await;
    assert!(outcome.success);
    let entries = outcome.data.unwrap();
    assert_eq!(entries[0].total_repetitions(), Some(20));
    assert!(store.all_logs().is_empty());
}

#[tokio::test]
async fn test_today_status_marks_logged_exercises() {
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(BENCH_RESPONSE), store.clone());

    let saved = tracker
        .save_routine(USER, &json!({"1": ["Press de Banca", "dominadas"]}))
        .await;
    assert!(saved.success);

    store.seed_log(logged("press banca", at(2025, 3, 10, 8, 0)));
    // Yesterday's pull-ups do not count for today.
    store.seed_log(logged("dominadas", at(2025, 3, 9, 20, 0)));

    let status = tracker.get_today_status(USER).await;
    assert!(status.success);
    let view = status.data.unwrap();
    assert_eq!(view.weekday, 1);
    assert_eq!(view.weekday_name, "Lunes");

    let planned: Vec<(&str, bool)> = view
        .planned
        .iter()
        .map(|p| (p.exercise_name.as_str(), p.completed))
        .collect();
    assert_eq!(planned, vec![("press banca", true), ("dominadas", false)]);
}

#[tokio::test]
async fn test_reset_today_clears_completion() {
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(BENCH_RESPONSE), store.clone());
    tracker
        .save_routine(USER, &json!({"1": ["press banca", "dominadas"]}))
        .await;

    assert!(tracker.submit_log(USER, "banca 5x75 7x70 8x60").await.success);
    store.seed_log(logged("remo", at(2025, 3, 9, 10, 0)));

    let reset = tracker.reset_today(USER).await;
    assert_eq!(reset.data, Some(1));

    let view = tracker.get_today_status(USER).await.data.unwrap();
    assert!(view.planned.iter().all(|p| !p.completed));
    // Earlier days are kept.
    assert_eq!(store.count_logs(USER).await.unwrap(), 1);
}

#[tokio::test]
async fn test_save_routine_skips_invalid_days() {
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), MemoryStore::new());

    let saved = tracker
        .save_routine(USER, &json!({"1": ["correr"], "9": ["invalido"], "martes": ["remo"]}))
        .await;
    assert_eq!(saved.data, Some(1));

    let routine = tracker.get_routine(USER).await.data.unwrap();
    assert_eq!(routine.len(), 1);
    assert_eq!(routine.get(&1), Some(&vec!["correr".to_string()]));
}

#[tokio::test]
async fn test_save_routine_replaces_previous_plan() {
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), MemoryStore::new());

    tracker
        .save_routine(USER, &json!({"1": ["remo"], "3": ["sentadilla"]}))
        .await;
    tracker.save_routine(USER, &json!({"5": ["peso muerto"]})).await;

    let routine = tracker.get_routine(USER).await.data.unwrap();
    assert_eq!(routine.keys().copied().collect::<Vec<_>>(), vec![5]);
}

#[tokio::test]
async fn test_save_routine_requires_an_object() {
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), MemoryStore::new());

    let saved = tracker.save_routine(USER, &json!(["correr"])).await;
    assert!(!saved.success);
}

#[tokio::test]
async fn test_today_without_routine_is_not_an_error() {
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), MemoryStore::new());

    let status = tracker.get_today_status(USER).await;
    assert!(status.success);
    let view = status.data.unwrap();
    assert!(view.planned.is_empty());
    assert!(view.message.is_some());
    assert_eq!(status.message, view.message.unwrap());
}

#[tokio::test]
async fn test_get_logs_covers_calendar_days() {
    let store = MemoryStore::new();
    store.seed_log(logged("remo", at(2025, 3, 10, 7, 0)));
    store.seed_log(logged("sentadilla", at(2025, 3, 4, 0, 0)));
    store.seed_log(logged("peso muerto", at(2025, 3, 3, 23, 59)));
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), store);

    let week = tracker.get_logs(USER, 7).await.data.unwrap();
    let names: Vec<&str> = week.iter().map(|l| l.exercise_name.as_str()).collect();
    assert_eq!(names, vec!["remo", "sentadilla"]);

    let today = tracker.get_logs(USER, 1).await.data.unwrap();
    assert_eq!(today.len(), 1);

    let other_user = tracker.get_logs("someone-else", 7).await.data.unwrap();
    assert!(other_user.is_empty());
}

#[tokio::test]
async fn test_get_logs_with_huge_window_returns_everything() {
    let store = MemoryStore::new();
    store.seed_log(logged("remo", at(2025, 3, 10, 7, 0)));
    store.seed_log(logged("sentadilla", at(1999, 1, 1, 12, 0)));
    let tracker = tracker_with(ScriptedGenerator::failing("unused"), store);

    let outcome = tracker.get_logs(USER, u32::MAX).await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.data.map(|logs| logs.len()), Some(2));
}

#[tokio::test]
async fn test_empty_series_next_to_duration_fails_validation() {
    let response = r#"[{"name": "remo", "series": [], "duration_minutes": 5}]"#;
    let store = MemoryStore::new();
    let tracker = tracker_with(ScriptedGenerator::replying(response), store.clone());

    let outcome = tracker.submit_log(USER, "remo 5 minutos").await;
    assert!(!outcome.success);
    assert_eq!(store.count_logs(USER).await.unwrap(), 0);
}
