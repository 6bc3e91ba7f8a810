use sabzi_core::{AppEvent, PriceComparison};
use sabzi_types::ToastKind;

use crate::detect_context::DetectContext;
use crate::events::catalog::ensure_catalog;

pub async fn handle_compare(ctx: &DetectContext) -> anyhow::Result<()> {
    let results = ctx.state.session.lock().await.results().cloned();
    let set = match results {
        Some(set) if !set.is_empty() => set,
        _ => {
            ctx.notify("Detect some vegetables first", ToastKind::Warning)
                .await?;
            return Ok(());
        }
    };

    if !ensure_catalog(ctx).await? {
        return Ok(());
    }
    let locations = ctx.state.catalog.read().await.locations.clone();
    if locations.is_empty() {
        ctx.notify("No locations to compare", ToastKind::Warning)
            .await?;
        return Ok(());
    }

    ctx.notify("Loading price comparison...", ToastKind::Info)
        .await?;

    let mut vegetables: Vec<&str> = Vec::new();
    for item in set.items() {
        if !vegetables.contains(&item.vegetable_name()) {
            vegetables.push(item.vegetable_name());
        }
    }

    let mut comparisons = Vec::with_capacity(vegetables.len());
    for vegetable in vegetables {
        let mut quotes = Vec::with_capacity(locations.len());
        for location in &locations {
            let quote = match ctx.state.pricing().price(vegetable, location).await {
                Ok(price) => Some(price),
                Err(e) => {
                    tracing::warn!("[COMPARE] No price for {} at {}: {}", vegetable, location, e);
                    None
                }
            };
            quotes.push((location.clone(), quote));
        }
        comparisons.push(PriceComparison {
            vegetable: vegetable.to_string(),
            quotes,
        });
    }

    ctx.send(AppEvent::ShowComparison(comparisons)).await
}
