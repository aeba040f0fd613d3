//! Prompt templates for assembling an outfit from a garment pool.

use std::fmt::Write;

use crate::types::{GarmentCandidate, GarmentCategory, RecommendationConstraints};

/// Prompt name for logs.
pub const OUTFIT_PROMPT_NAME: &str = "outfit_recommend";

/// Fields the model must return for the response to be usable.
pub const OUTFIT_REQUIRED_FIELDS: [&str; 2] = ["name", "clothes_ids"];

pub fn render_outfit_system_prompt() -> String {
    "You are a professional outfit stylist. You choose garments from the user's own wardrobe \
     and combine them into a single outfit that looks good and suits the occasion.\n\
     Your answer must be a JSON object containing the outfit name, the list of chosen \
     garment ids and the reasoning behind the choice."
        .to_string()
}

/// Render the user message listing constraints and candidates.
///
/// Constraints that are absent are left out entirely. The output depends only
/// on the arguments.
pub fn render_outfit_user_prompt(
    candidates: &[GarmentCandidate],
    constraints: &RecommendationConstraints,
) -> String {
    let mut prompt = String::from(
        "Choose garments from my wardrobe to make one outfit for the following conditions:\n\n",
    );

    if let Some(occasion) = &constraints.occasion {
        let _ = writeln!(prompt, "Occasion: {occasion}");
    }
    if let Some(season) = constraints.season {
        let _ = writeln!(prompt, "Season: {season}");
    }
    if let Some(style) = &constraints.style_preference {
        let _ = writeln!(prompt, "Style preference: {style}");
    }
    if let Some(weather) = &constraints.weather {
        let _ = writeln!(prompt, "Weather: {weather}");
    }
    if let Some(temperature) = constraints.temperature {
        let _ = writeln!(prompt, "Temperature: {temperature}°C");
    }

    prompt.push_str("\nGarments available in my wardrobe:\n");

    for (i, candidate) in candidates.iter().enumerate() {
        let mut details = vec![format!("category: {}", candidate.category)];
        if let Some(color) = candidate.color.as_deref().filter(|c| !c.is_empty()) {
            details.push(format!("color: {color}"));
        }
        if !candidate.seasons.is_empty() {
            details.push(format!("seasons: {}", candidate.seasons));
        }
        if let Some(style) = candidate.style.as_deref().filter(|s| !s.is_empty()) {
            details.push(format!("style: {style}"));
        }

        let _ = writeln!(
            prompt,
            "{}. ID: {} - {} ({})",
            i + 1,
            candidate.id,
            candidate.display_name(),
            details.join(", ")
        );
    }

    prompt.push_str(
        r#"
Return the result as JSON with the following fields:
1. name: the outfit name
2. clothes_ids: array of the chosen garment IDs
3. style: the outfit style
4. season: the suitable season
5. occasion: the suitable occasion
6. reasoning: why these garments work together
"#,
    );

    if let Some(rule) = required_categories_rule(candidates) {
        prompt.push('\n');
        prompt.push_str(&rule);
    }

    prompt.push_str(
        "\nOnly use IDs from the list above. Return ONLY the JSON object, no other text.",
    );
    prompt
}

/// "Must include" instruction for the top/bottom categories present in the pool.
fn required_categories_rule(candidates: &[GarmentCandidate]) -> Option<String> {
    let has = |category| candidates.iter().any(|c| c.category == category);

    match (has(GarmentCategory::Top), has(GarmentCategory::Bottom)) {
        (true, true) => {
            Some("The outfit must include at least one top and one bottom.".to_string())
        }
        (true, false) => Some("The outfit must include at least one top.".to_string()),
        (false, true) => Some("The outfit must include at least one bottom.".to_string()),
        (false, false) => None,
    }
}

/// System prompt and user prompt, in that order.
pub fn render_outfit_prompts(
    candidates: &[GarmentCandidate],
    constraints: &RecommendationConstraints,
) -> (String, String) {
    (
        render_outfit_system_prompt(),
        render_outfit_user_prompt(candidates, constraints),
    )
}
