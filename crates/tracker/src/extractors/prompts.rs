use crate::canonical::models::{ExerciseRecordSchema, Series};

/// Builds the extraction prompt. The instruction block is rendered once at
/// construction and reused for every request.
#[derive(Debug, Clone)]
pub struct ExtractionPromptBuilder {
    instructions: String,
}

impl ExtractionPromptBuilder {
    pub fn new() -> Self {
        Self {
            instructions: Self::render_instructions(),
        }
    }

    /// Uses caller-provided instructions instead of the built-in ones.
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn build_prompt(&self, raw_text: &str) -> String {
        format!(
            "{}\n\nWorkout to convert:\n\"\"\"\n{}\n\"\"\"\n\nJSON:",
            self.instructions,
            raw_text.trim()
        )
    }

    fn render_instructions() -> String {
        format!(
            r#"You convert free-text gym and cardio logs (usually in Spanish) into structured JSON.

Output a JSON list. Each element describes one exercise with this schema:
{schema}

Rules:
1. Exercises:
   - "name" is the exercise as the user wrote it, without sets or weights
   - A strength exercise has "series" and no "duration_minutes"
   - A cardio exercise has "duration_minutes" and no "series"

2. Sets and weights:
   - "RxW" (e.g. "5x75") is one set of R repetitions with W kg
   - "RxRxR" with no weight (e.g. "10x10x8") is one set per number, all at the same weight
   - "SxR con W" (e.g. "3x8 con 100kg") is S sets of R repetitions with W kg
   - Bodyweight exercises (dominadas, fondos, flexiones, plancha) use weight 0 unless extra load is given
   - If no weight is given for a loaded exercise, use weight 0

3. Effort reserve (RIR):
   - A general "rir N" for the exercise goes in the exercise's "effort_reserve"
   - A RIR that refers only to the last set goes in that set's "effort_reserve"
   - "al fallo" means RIR 0

4. Output:
   - Return ONLY the JSON list, no explanations, no markdown, no code fences
   - Use null for missing optional values
   - Keep any remarks ("me dolió el hombro") in "comments"

Examples:
{examples}"#,
            schema = Self::schema_example(),
            examples = Self::worked_examples(),
        )
    }

    fn schema_example() -> String {
        let example = vec![
            ExerciseRecordSchema {
                name: "press banca".to_string(),
                series: Some(vec![
                    Series {
                        repetitions: 5,
                        weight: 75.0,
                        effort_reserve: None,
                    },
                    Series {
                        repetitions: 8,
                        weight: 60.0,
                        effort_reserve: Some(1),
                    },
                ]),
                duration_minutes: None,
                comments: Some("optional remark".to_string()),
                effort_reserve: Some(2),
            },
            ExerciseRecordSchema {
                name: "correr".to_string(),
                series: None,
                duration_minutes: Some(30),
                comments: None,
                effort_reserve: None,
            },
        ];

        serde_json::to_string_pretty(&example).unwrap_or_default()
    }

    fn worked_examples() -> String {
        let examples: [(&str, &str); 4] = [
            (
                "press banca 5x75, 7x70, 8x60 rir 2",
                r#"[{"name": "press banca", "series": [{"repetitions": 5, "weight": 75, "effort_reserve": null}, {"repetitions": 7, "weight": 70, "effort_reserve": null}, {"repetitions": 8, "weight": 60, "effort_reserve": null}], "effort_reserve": 2}]"#,
            ),
            (
                "dominadas 10x10x8, la última al fallo",
                r#"[{"name": "dominadas", "series": [{"repetitions": 10, "weight": 0, "effort_reserve": null}, {"repetitions": 10, "weight": 0, "effort_reserve": null}, {"repetitions": 8, "weight": 0, "effort_reserve": 0}]}]"#,
            ),
            (
                "sentadilla 3x8 con 100kg y luego 30 min de bici",
                r#"[{"name": "sentadilla", "series": [{"repetitions": 8, "weight": 100, "effort_reserve": null}, {"repetitions": 8, "weight": 100, "effort_reserve": null}, {"repetitions": 8, "weight": 100, "effort_reserve": null}]}, {"name": "bici", "duration_minutes": 30}]"#,
            ),
            (
                "correr 45 minutos, me dolió la rodilla",
                r#"[{"name": "correr", "duration_minutes": 45, "comments": "me dolió la rodilla"}]"#,
            ),
        ];

        examples
            .iter()
            .map(|(input, output)| format!("Input: {}\nOutput: {}", input, output))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for ExtractionPromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
