//! Exercise name normalization.
//!
//! Free-text names are reduced to a lowercase, accent-free form and then
//! matched against an [`ExerciseDictionary`] of canonical spellings. Names
//! carrying a known variant suffix ("en máquina", "con barra", ...) are
//! canonicalized on their base and keep the suffix, so "press militar en
//! maquina" stays distinct from "press militar". Unknown names pass through
//! normalized but otherwise untouched.

use std::collections::HashMap;
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::{Result, TrackerError};

const VARIANT_SUFFIXES: &[&str] = &[
    " en maquina",
    " en máquina",
    " con mancuernas",
    " con barra",
    " con polea",
    " asistidas",
    " lastradas",
];

const DEFAULT_ENTRIES: &[(&str, &str)] = &[
    ("press banca", "press banca"),
    ("press de banca", "press banca"),
    ("press banca plano", "press banca"),
    ("press plano", "press banca"),
    ("banca", "press banca"),
    ("bench press", "press banca"),
    ("press inclinado", "press inclinado"),
    ("press banca inclinado", "press inclinado"),
    ("press militar", "press militar"),
    ("press de hombros", "press militar"),
    ("press hombro", "press militar"),
    ("military press", "press militar"),
    ("sentadilla", "sentadilla"),
    ("sentadillas", "sentadilla"),
    ("sentadilla trasera", "sentadilla"),
    ("squat", "sentadilla"),
    ("peso muerto", "peso muerto"),
    ("deadlift", "peso muerto"),
    ("peso muerto rumano", "peso muerto rumano"),
    ("rumano", "peso muerto rumano"),
    ("dominadas", "dominadas"),
    ("dominada", "dominadas"),
    ("pull ups", "dominadas"),
    ("pull up", "dominadas"),
    ("pullups", "dominadas"),
    ("fondos", "fondos"),
    ("fondos en paralelas", "fondos"),
    ("dips", "fondos"),
    ("remo", "remo"),
    ("row", "remo"),
    ("curl biceps", "curl biceps"),
    ("curl de biceps", "curl biceps"),
    ("curl", "curl biceps"),
    ("extension de triceps", "extension de triceps"),
    ("extension triceps", "extension de triceps"),
    ("triceps", "extension de triceps"),
    ("jalon al pecho", "jalon al pecho"),
    ("jalon", "jalon al pecho"),
    ("lat pulldown", "jalon al pecho"),
    ("hip thrust", "hip thrust"),
    ("empuje de cadera", "hip thrust"),
    ("zancadas", "zancadas"),
    ("zancada", "zancadas"),
    ("lunges", "zancadas"),
    ("prensa", "prensa"),
    ("prensa de piernas", "prensa"),
    ("leg press", "prensa"),
    ("elevaciones laterales", "elevaciones laterales"),
    ("laterales", "elevaciones laterales"),
    ("face pull", "face pull"),
    ("face pulls", "face pull"),
    ("plancha", "plancha"),
    ("plank", "plancha"),
    ("flexiones", "flexiones"),
    ("flexion", "flexiones"),
    ("push ups", "flexiones"),
    ("lagartijas", "flexiones"),
    ("correr", "correr"),
    ("carrera", "correr"),
    ("running", "correr"),
    ("trotar", "correr"),
    ("bicicleta", "bicicleta"),
    ("bici", "bicicleta"),
    ("ciclismo", "bicicleta"),
    ("spinning", "bicicleta"),
    ("eliptica", "eliptica"),
    ("natacion", "natacion"),
    ("nadar", "natacion"),
    ("caminar", "caminar"),
    ("caminata", "caminar"),
];

/// Lowercases, strips accents and collapses whitespace.
pub fn normalize(raw: &str) -> String {
    let stripped: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized name → canonical name. Immutable once built.
#[derive(Debug, Clone)]
pub struct ExerciseDictionary {
    entries: HashMap<String, String>,
}

impl ExerciseDictionary {
    /// Builds a dictionary, normalizing both keys and canonical values.
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (normalize(k.as_ref()), normalize(v.as_ref())))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();

        Self { entries }
    }

    /// Parses a JSON object of `"variant spelling": "canonical name"` pairs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: HashMap<String, String> = serde_json::from_str(json).map_err(|e| {
            TrackerError::Config(format!("invalid exercise dictionary: {}", e))
        })?;

        if map.is_empty() {
            return Err(TrackerError::Config(
                "exercise dictionary is empty".to_string(),
            ));
        }

        Ok(Self::from_entries(map))
    }

    pub fn get(&self, normalized: &str) -> Option<&str> {
        self.entries.get(normalized).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExerciseDictionary {
    fn default() -> Self {
        Self::from_entries(DEFAULT_ENTRIES.iter().copied())
    }
}

#[derive(Debug, Clone)]
pub struct NameNormalizer {
    dictionary: Arc<ExerciseDictionary>,
    suffixes: Vec<String>,
}

impl NameNormalizer {
    pub fn new(dictionary: Arc<ExerciseDictionary>) -> Self {
        let mut suffixes: Vec<String> = VARIANT_SUFFIXES
            .iter()
            .map(|s| format!(" {}", normalize(s)))
            .collect();
        // Longest first so overlapping suffixes resolve the same way every time.
        suffixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        suffixes.dedup();

        Self {
            dictionary,
            suffixes,
        }
    }

    pub fn dictionary(&self) -> &ExerciseDictionary {
        &self.dictionary
    }

    pub fn variant_suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Resolves an already normalized name to its canonical spelling.
    pub fn match_variant(&self, normalized: &str) -> String {
        if let Some(canonical) = self.dictionary.get(normalized) {
            return canonical.to_string();
        }

        for suffix in &self.suffixes {
            if let Some(base) = normalized.strip_suffix(suffix.as_str()) {
                if let Some(canonical) = self.dictionary.get(base) {
                    return format!("{}{}", canonical, suffix);
                }
                break;
            }
        }

        normalized.to_string()
    }

    pub fn canonicalize(&self, raw: &str) -> String {
        self.match_variant(&normalize(raw))
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(ExerciseDictionary::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize("  Press  MILITAR en Máquina "), "press militar en maquina");
        assert_eq!(normalize("Natación"), "natacion");
        assert_eq!(normalize("Extensión de TRÍCEPS"), "extension de triceps");
    }

    #[test]
    fn test_exact_key_returns_canonical() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.canonicalize("Press de Banca"), "press banca");
        assert_eq!(normalizer.canonicalize("Dominada"), "dominadas");
    }

    #[test]
    fn test_variant_suffix_is_preserved() {
        let normalizer = NameNormalizer::default();
        assert_eq!(
            normalizer.canonicalize("Press de hombros en máquina"),
            "press militar en maquina"
        );
        assert_eq!(
            normalizer.canonicalize("dominada asistidas"),
            "dominadas asistidas"
        );
        assert_ne!(
            normalizer.canonicalize("press militar en maquina"),
            normalizer.canonicalize("press militar")
        );
    }

    #[test]
    fn test_unknown_name_passes_through_normalized() {
        let normalizer = NameNormalizer::default();
        assert_eq!(normalizer.canonicalize("Burpees Rápidos"), "burpees rapidos");
        assert_eq!(
            normalizer.canonicalize("burpees con barra"),
            "burpees con barra"
        );
    }

    #[test]
    fn test_every_key_maps_to_its_canonical_form() {
        let normalizer = NameNormalizer::default();
        for key in normalizer.dictionary().keys() {
            let expected = normalizer.dictionary().get(key).unwrap();
            assert_eq!(normalizer.canonicalize(key), expected, "key '{}'", key);
        }
    }

    #[test]
    fn test_every_key_with_every_suffix_keeps_the_suffix() {
        let normalizer = NameNormalizer::default();
        for key in normalizer.dictionary().keys() {
            let canonical = normalizer.dictionary().get(key).unwrap();
            for suffix in normalizer.variant_suffixes() {
                let name = format!("{}{}", key, suffix);
                assert_eq!(
                    normalizer.canonicalize(&name),
                    format!("{}{}", canonical, suffix),
                    "name '{}'",
                    name
                );
            }
        }
    }

    #[test]
    fn test_accented_suffixes_collapse() {
        let normalizer = NameNormalizer::default();
        let suffixes = normalizer.variant_suffixes();
        assert_eq!(
            suffixes.iter().filter(|s| s.as_str() == " en maquina").count(),
            1
        );
        assert_eq!(suffixes[0], " con mancuernas");
    }

    #[test]
    fn test_dictionary_from_json() {
        let dictionary =
            ExerciseDictionary::from_json_str(r#"{"Jalón": "Jalón al pecho"}"#).unwrap();
        assert_eq!(dictionary.get("jalon"), Some("jalon al pecho"));
        assert!(ExerciseDictionary::from_json_str("{}").is_err());
        assert!(ExerciseDictionary::from_json_str("[1, 2]").is_err());
    }
}
