use std::sync::Arc;

use crate::canonical::validator::{RecordValidator, ValidatedRecords};
use crate::extractors::prompts::ExtractionPromptBuilder;
use crate::extractors::response::{coerce_to_record_container, extract_json};
use crate::traits::TextGenerator;
use crate::{Result, TrackerError};

/// Free text → prompt → model → recovered JSON → validated entries.
pub struct LogExtractor<G> {
    generator: Arc<G>,
    prompt_builder: ExtractionPromptBuilder,
    validator: RecordValidator,
}

impl<G: TextGenerator> LogExtractor<G> {
    pub fn new(
        generator: Arc<G>,
        prompt_builder: ExtractionPromptBuilder,
        validator: RecordValidator,
    ) -> Self {
        Self {
            generator,
            prompt_builder,
            validator,
        }
    }

    pub fn prompt_builder(&self) -> &ExtractionPromptBuilder {
        &self.prompt_builder
    }

    pub async fn extract(&self, raw_text: &str) -> Result<ValidatedRecords> {
        let prompt = self.prompt_builder.build_prompt(raw_text);
        let generation = self.generator.generate(&prompt).await?;

        let json = extract_json(&generation.content).ok_or_else(|| {
            TrackerError::Extraction("no JSON found in model response".to_string())
        })?;
        let container = coerce_to_record_container(json).ok_or_else(|| {
            TrackerError::Extraction("model response is not a list of exercises".to_string())
        })?;

        let validated = self.validator.validate(&container)?;
        validated.report.log_warnings();
        Ok(validated)
    }
}
