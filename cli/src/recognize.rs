use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wardrobe_core::ai::{image_check, DefaultAttributeGenerator, ModelGateway, RecognitionPipeline};

fn pipeline(gateway: ModelGateway, seed: Option<u64>) -> RecognitionPipeline {
    let defaults = match seed {
        Some(seed) => DefaultAttributeGenerator::new(StdRng::seed_from_u64(seed)),
        None => DefaultAttributeGenerator::from_os_rng(),
    };
    RecognitionPipeline::new(gateway, defaults)
}

pub async fn recognize(
    gateway: ModelGateway,
    urls: &[String],
    check_url: bool,
    seed: Option<u64>,
) -> Result<()> {
    let mut accepted = Vec::with_capacity(urls.len());

    if check_url {
        let client = reqwest::Client::new();
        for url in urls {
            if image_check::is_valid_image_url(&client, url).await {
                accepted.push(url.clone());
            } else {
                tracing::warn!(url = %url, "Skipping URL that is not a reachable image");
            }
        }
    } else {
        accepted.extend(urls.iter().cloned());
    }

    let batch = pipeline(gateway, seed)
        .recognize_batch(accepted.as_slice())
        .await;
    tracing::info!(
        ai = batch.ai_count,
        fallback = batch.fallback_count,
        skipped = urls.len() - accepted.len(),
        "Recognition finished"
    );

    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}

pub async fn reanalyze(gateway: ModelGateway, url: &str, seed: Option<u64>) -> Result<()> {
    let attributes = pipeline(gateway, seed).reanalyze(url).await;
    println!("{}", serde_json::to_string_pretty(&attributes)?);
    Ok(())
}
