//! Validation and type coercion of model output.
//!
//! Model text is parsed as a JSON object, checked for required fields, and
//! then coerced into typed values. Coercion is lenient where a sensible value
//! can be recovered (numeric strings, unknown season tokens) and strict only
//! where nothing usable would remain.

use serde_json::{Map, Value};

use super::prompts::outfit::OUTFIT_REQUIRED_FIELDS;
use super::prompts::vision::VISION_FIELDS;
use crate::error::PipelineError;
use crate::types::{GarmentCategory, PipelineOutcome, Season, SeasonSet};

pub type JsonObject = Map<String, Value>;

/// Parse `raw` as a JSON object holding every name in `required_fields`.
///
/// Missing fields are all reported together, in `required_fields` order.
pub fn parse_json_object(raw: &str, required_fields: &[&str]) -> PipelineOutcome<JsonObject> {
    let Ok(value) = serde_json::from_str::<Value>(raw.trim()) else {
        return PipelineOutcome::failure(PipelineError::InvalidJson, Some(raw.to_string()));
    };

    let Value::Object(object) = value else {
        return PipelineOutcome::failure(PipelineError::NotAnObject, Some(raw.to_string()));
    };

    let missing: Vec<String> = required_fields
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return PipelineOutcome::failure(
            PipelineError::MissingFields(missing),
            Some(raw.to_string()),
        );
    }

    PipelineOutcome::success(object, raw)
}

/// Typed result of a garment classification.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionFields {
    pub category: GarmentCategory,
    pub color: String,
    pub seasons: SeasonSet,
    pub style: String,
    /// Confidence as a fraction (raw value / 100). Not range-checked here.
    pub confidence: Option<f64>,
}

/// Parse a garment classification response.
pub fn parse_vision_response(raw: &str) -> PipelineOutcome<VisionFields> {
    parse_json_object(raw, &VISION_FIELDS).map(|object| {
        let category = text_field(&object, "category").unwrap_or_default();
        VisionFields {
            category: GarmentCategory::from_label(&category),
            color: text_field(&object, "color").unwrap_or_default(),
            seasons: object.get("season").map(coerce_seasons).unwrap_or_default(),
            style: text_field(&object, "style").unwrap_or_default(),
            confidence: object.get("confidence").and_then(coerce_confidence),
        }
    })
}

/// Typed result of an outfit recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutfitFields {
    pub name: Option<String>,
    /// Ids in the model's order. Never empty.
    pub clothes_ids: Vec<i64>,
    pub style: Option<String>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub reasoning: Option<String>,
}

/// Parse an outfit response requiring `name` and `clothes_ids`.
pub fn parse_outfit_response(raw: &str) -> PipelineOutcome<OutfitFields> {
    parse_outfit_response_with(raw, &OUTFIT_REQUIRED_FIELDS)
}

/// Parse an outfit response with a caller-chosen set of required fields.
///
/// `clothes_ids` elements that are not integers are dropped; if none remain
/// the response fails with [`PipelineError::NoValidClothesIds`].
pub fn parse_outfit_response_with(
    raw: &str,
    required_fields: &[&str],
) -> PipelineOutcome<OutfitFields> {
    parse_json_object(raw, required_fields).and_then(|object, raw| {
        let clothes_ids = object
            .get("clothes_ids")
            .map(coerce_ids)
            .unwrap_or_default();

        if clothes_ids.is_empty() {
            return PipelineOutcome::failure(PipelineError::NoValidClothesIds, Some(raw));
        }

        let fields = OutfitFields {
            name: text_field(&object, "name"),
            clothes_ids,
            style: text_field(&object, "style"),
            season: text_field(&object, "season"),
            occasion: text_field(&object, "occasion"),
            reasoning: text_field(&object, "reasoning"),
        };
        PipelineOutcome::success(fields, raw)
    })
}

/// Non-empty text of a field. Numbers and booleans are rendered as text;
/// arrays of strings are comma-joined.
fn text_field(object: &JsonObject, name: &str) -> Option<String> {
    let text = match object.get(name)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Seasons from `"spring,summer"` or `["spring", "summer"]`.
fn coerce_seasons(value: &Value) -> SeasonSet {
    match value {
        Value::String(s) => SeasonSet::parse_list(s),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Season::from_label)
            .collect(),
        _ => SeasonSet::new(),
    }
}

/// A 0-100 confidence (number or numeric string) as a fraction.
fn coerce_confidence(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    raw.is_finite().then_some(raw / 100.0)
}

fn coerce_ids(value: &Value) -> Vec<i64> {
    match value {
        Value::Array(items) => items.iter().filter_map(coerce_id).collect(),
        scalar => coerce_id(scalar).into_iter().collect(),
    }
}

fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `f` as an integer when it is whole and inside the `i64` range.
fn whole_number(f: f64) -> Option<i64> {
    // 2^63, the first float past i64::MAX.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then_some(f as i64)
}
