use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use wardrobe_core::ai::{ModelGateway, RecommendationPipeline};
use wardrobe_core::{GarmentCandidate, PipelineOutcome, RecommendationConstraints, Season};

pub struct RecommendArgs {
    pub pool: PathBuf,
    pub occasion: Option<String>,
    pub season: Option<String>,
    pub style: Option<String>,
    pub weather: Option<String>,
    pub temperature: Option<f64>,
    pub exclude: Vec<i64>,
}

/// "auto" means the season of today's date.
fn resolve_season(season: Option<&str>) -> Result<Option<Season>> {
    match season {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("auto") => {
            Ok(Some(Season::for_date(chrono::Local::now().date_naive())))
        }
        Some(s) => Season::from_label(s)
            .map(Some)
            .ok_or_else(|| anyhow!("Unknown season: {}", s)),
    }
}

pub async fn recommend(gateway: ModelGateway, args: RecommendArgs) -> Result<()> {
    let path = args.pool.display();
    let content =
        fs::read_to_string(&args.pool).with_context(|| format!("Failed to read {}", path))?;
    let pool: Vec<GarmentCandidate> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse garment pool {}", path))?;

    let constraints = RecommendationConstraints {
        occasion: args.occasion,
        season: resolve_season(args.season.as_deref())?,
        style_preference: args.style,
        weather: args.weather,
        temperature: args.temperature,
        excluded_ids: args.exclude.into_iter().collect(),
    };

    let pipeline = RecommendationPipeline::new(gateway);
    match pipeline.recommend(&pool, &constraints).await {
        PipelineOutcome::Success { value, .. } => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        PipelineOutcome::Failure {
            error,
            raw_response,
        } => {
            if let Some(raw) = raw_response {
                tracing::debug!(
                    raw_response = %raw,
                    "Model output for failed recommendation"
                );
            }
            bail!("Recommendation failed: {}", error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_season() {
        assert_eq!(resolve_season(None).unwrap(), None);
        assert_eq!(
            resolve_season(Some("Winter")).unwrap(),
            Some(Season::Winter)
        );
        assert!(resolve_season(Some("auto")).unwrap().is_some());
        assert!(resolve_season(Some("monsoon")).is_err());
    }
}
