//! Outfit recommendation from a user's own garments.

use std::collections::{HashMap, HashSet};

use super::gateway::ModelGateway;
use super::prompts::outfit::{render_outfit_prompts, OUTFIT_PROMPT_NAME};
use super::types::{ChatMessage, ChatRequest};
use super::validate::{parse_outfit_response, OutfitFields};
use crate::error::PipelineError;
use crate::types::{
    GarmentCandidate, PipelineOutcome, RecommendationConstraints, RecommendationResult,
};

/// Name used when the model does not name the outfit.
pub const DEFAULT_OUTFIT_NAME: &str = "AI outfit recommendation";

/// Reasoning used when the model gives none.
pub const DEFAULT_REASONING: &str = "Outfit recommendation generated automatically";

/// Chooses an outfit from a candidate pool.
///
/// The pool is only read. Every garment in a successful result is available,
/// not excluded, and present in the pool passed to [`recommend`](Self::recommend).
pub struct RecommendationPipeline {
    gateway: ModelGateway,
}

impl RecommendationPipeline {
    pub fn new(gateway: ModelGateway) -> Self {
        Self { gateway }
    }

    pub async fn recommend(
        &self,
        pool: &[GarmentCandidate],
        constraints: &RecommendationConstraints,
    ) -> PipelineOutcome<RecommendationResult> {
        let constraints = &normalize_constraints(constraints);
        let eligible = eligible_candidates(pool, constraints);
        if eligible.is_empty() {
            tracing::debug!(pool = pool.len(), "No eligible candidates");
            return PipelineOutcome::failure(PipelineError::NoCandidates, None);
        }

        let preferred = preferred_candidates(&eligible, constraints);
        tracing::debug!(
            pool = pool.len(),
            eligible = eligible.len(),
            preferred = preferred.len(),
            "Filtered candidate pool"
        );

        let (system_prompt, user_prompt) = render_outfit_prompts(&preferred, constraints);
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(system_prompt),
                ChatMessage::user(user_prompt),
            ],
            max_tokens: Some(2048),
            temperature: Some(0.7),
            top_p: Some(1.0),
            frequency_penalty: None,
            json_response: true,
        };

        self.gateway
            .call(OUTFIT_PROMPT_NAME, request)
            .await
            .and_then(|content, _| parse_outfit_response(&content))
            .and_then(|fields, raw| match build_result(fields, &eligible, constraints) {
                Some(result) => PipelineOutcome::success(result, raw),
                None => PipelineOutcome::failure(
                    PipelineError::RecommendedGarmentsUnavailable,
                    Some(raw),
                ),
            })
    }
}

/// Blank text constraints count as absent.
fn normalize_constraints(constraints: &RecommendationConstraints) -> RecommendationConstraints {
    fn non_blank(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    RecommendationConstraints {
        occasion: non_blank(&constraints.occasion),
        style_preference: non_blank(&constraints.style_preference),
        weather: non_blank(&constraints.weather),
        ..constraints.clone()
    }
}

/// Available candidates that the caller did not exclude.
fn eligible_candidates(
    pool: &[GarmentCandidate],
    constraints: &RecommendationConstraints,
) -> Vec<GarmentCandidate> {
    pool.iter()
        .filter(|c| c.available && !constraints.excluded_ids.contains(&c.id))
        .cloned()
        .collect()
}

/// Candidates matching the season and style preferences. Falls back to all
/// of `eligible` when the preferences would leave nothing.
fn preferred_candidates(
    eligible: &[GarmentCandidate],
    constraints: &RecommendationConstraints,
) -> Vec<GarmentCandidate> {
    let style = constraints
        .style_preference
        .as_deref()
        .map(str::to_lowercase);

    let preferred: Vec<GarmentCandidate> = eligible
        .iter()
        .filter(|c| match constraints.season {
            Some(season) => c.seasons.contains(season),
            None => true,
        })
        .filter(|c| match &style {
            Some(style) => c
                .style
                .as_deref()
                .is_some_and(|cs| cs.to_lowercase().contains(style.as_str())),
            None => true,
        })
        .cloned()
        .collect();

    if preferred.is_empty() {
        tracing::warn!(
            eligible = eligible.len(),
            "No candidates match season/style preferences, using all eligible garments"
        );
        return eligible.to_vec();
    }
    preferred
}

/// Keep the model's ids that exist in `eligible`, in the model's order and
/// without duplicates, and resolve the descriptive fields. `None` when no id
/// survives.
fn build_result(
    fields: OutfitFields,
    eligible: &[GarmentCandidate],
    constraints: &RecommendationConstraints,
) -> Option<RecommendationResult> {
    let known: HashMap<i64, &GarmentCandidate> = eligible.iter().map(|c| (c.id, c)).collect();

    let mut seen = HashSet::new();
    let clothes_ids: Vec<i64> = fields
        .clothes_ids
        .iter()
        .copied()
        .filter(|id| known.contains_key(id))
        .filter(|id| seen.insert(*id))
        .collect();

    let dropped: Vec<i64> = fields
        .clothes_ids
        .iter()
        .copied()
        .filter(|id| !known.contains_key(id))
        .collect();
    if !dropped.is_empty() {
        tracing::warn!(?dropped, "Model recommended garments outside the pool");
    }

    if clothes_ids.is_empty() {
        return None;
    }

    Some(RecommendationResult {
        name: fields
            .name
            .unwrap_or_else(|| DEFAULT_OUTFIT_NAME.to_string()),
        clothes_ids,
        style: constraints.style_preference.clone().or(fields.style),
        season: constraints
            .season
            .map(|s| s.as_str().to_string())
            .or(fields.season),
        occasion: constraints.occasion.clone().or(fields.occasion),
        reasoning: fields
            .reasoning
            .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GarmentCategory, Season, SeasonSet};

    fn candidate(id: i64, seasons: &str, style: &str) -> GarmentCandidate {
        GarmentCandidate {
            id,
            name: None,
            category: GarmentCategory::Top,
            color: Some("black".to_string()),
            seasons: SeasonSet::parse_list(seasons),
            style: Some(style.to_string()),
            available: true,
        }
    }

    fn fields(ids: Vec<i64>) -> OutfitFields {
        OutfitFields {
            name: None,
            clothes_ids: ids,
            style: Some("street".to_string()),
            season: Some("summer".to_string()),
            occasion: Some("party".to_string()),
            reasoning: None,
        }
    }

    #[test]
    fn test_eligible_excludes_unavailable_and_excluded() {
        let mut pool = vec![
            candidate(1, "spring", "casual"),
            candidate(2, "spring", "casual"),
            candidate(3, "spring", "casual"),
        ];
        pool[0].available = false;
        let constraints = RecommendationConstraints {
            excluded_ids: [2].into_iter().collect(),
            ..Default::default()
        };

        let ids: Vec<i64> = eligible_candidates(&pool, &constraints)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_soft_filters_match_season_and_style() {
        let pool = vec![
            candidate(1, "winter", "Casual Chic"),
            candidate(2, "summer", "casual"),
            candidate(3, "winter", "formal"),
        ];
        let constraints = RecommendationConstraints {
            season: Some(Season::Winter),
            style_preference: Some("casual".to_string()),
            ..Default::default()
        };

        let ids: Vec<i64> = preferred_candidates(&pool, &constraints)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_soft_filters_relax_when_empty() {
        let pool = vec![
            candidate(1, "summer", "casual"),
            candidate(2, "summer", "formal"),
        ];
        let constraints = RecommendationConstraints {
            season: Some(Season::Winter),
            ..Default::default()
        };

        assert_eq!(preferred_candidates(&pool, &constraints), pool);
    }

    #[test]
    fn test_build_result_dedupes_and_keeps_order() {
        let pool = vec![
            candidate(1, "", "x"),
            candidate(2, "", "x"),
            candidate(3, "", "x"),
        ];
        let result = build_result(
            fields(vec![3, 99, 1, 3]),
            &pool,
            &RecommendationConstraints::default(),
        )
        .unwrap();

        assert_eq!(result.clothes_ids, vec![3, 1]);
        assert_eq!(result.name, DEFAULT_OUTFIT_NAME);
        assert_eq!(result.reasoning, DEFAULT_REASONING);
        assert_eq!(result.style.as_deref(), Some("street"));
    }

    #[test]
    fn test_caller_constraints_win_over_model() {
        let pool = vec![candidate(1, "", "x")];
        let constraints = RecommendationConstraints {
            occasion: Some("wedding".to_string()),
            season: Some(Season::Autumn),
            style_preference: Some("formal".to_string()),
            ..Default::default()
        };

        let result = build_result(fields(vec![1]), &pool, &constraints).unwrap();

        assert_eq!(result.occasion.as_deref(), Some("wedding"));
        assert_eq!(result.season.as_deref(), Some("autumn"));
        assert_eq!(result.style.as_deref(), Some("formal"));
    }

    #[test]
    fn test_build_result_none_when_nothing_known() {
        let pool = vec![candidate(1, "", "x")];
        let constraints = RecommendationConstraints::default();
        let result = build_result(fields(vec![5, 6]), &pool, &constraints);
        assert!(result.is_none());
    }

    #[test]
    fn test_blank_constraints_are_absent() {
        let constraints = normalize_constraints(&RecommendationConstraints {
            occasion: Some(" date night ".to_string()),
            style_preference: Some("  ".to_string()),
            weather: Some(String::new()),
            temperature: Some(-3.0),
            ..Default::default()
        });

        assert_eq!(constraints.occasion.as_deref(), Some("date night"));
        assert_eq!(constraints.style_preference, None);
        assert_eq!(constraints.weather, None);
        assert_eq!(constraints.temperature, Some(-3.0));
    }
}
