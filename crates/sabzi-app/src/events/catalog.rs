use sabzi_client::PricingError;
use sabzi_core::AppEvent;
use sabzi_types::{Location, ToastKind};

use crate::detect_context::DetectContext;
use crate::state::AppState;

/// Fill the catalog from the pricing service
pub async fn refresh_catalog(state: &AppState) -> Result<(), PricingError> {
    let vegetables = state.pricing().vegetables().await?;
    let locations = state.pricing().locations().await?;

    let locations: Vec<Location> = locations
        .locations
        .iter()
        .filter_map(|name| Location::parse(name))
        .collect();

    tracing::info!(
        "[CATALOG] {} vegetables, {} locations",
        vegetables.len(),
        locations.len()
    );

    let mut catalog = state.catalog.write().await;
    catalog.vegetables = vegetables;
    catalog.locations = locations;
    Ok(())
}

/// Load the catalog if startup could not
pub(crate) async fn ensure_catalog(ctx: &DetectContext) -> anyhow::Result<bool> {
    let loaded = {
        let catalog = ctx.state.catalog.read().await;
        !catalog.locations.is_empty() || !catalog.vegetables.is_empty()
    };
    if loaded {
        return Ok(true);
    }

    match refresh_catalog(&ctx.state).await {
        Ok(()) => Ok(true),
        Err(e) => {
            tracing::warn!("[CATALOG] Could not load catalog: {}", e);
            ctx.notify("Pricing service unavailable", ToastKind::Warning)
                .await?;
            Ok(false)
        }
    }
}

pub async fn handle_set_location(ctx: &DetectContext, name: &str) -> anyhow::Result<()> {
    let Some(requested) = Location::parse(name) else {
        ctx.notify("Usage: location <name>", ToastKind::Warning)
            .await?;
        return Ok(());
    };

    let location = {
        let catalog = ctx.state.catalog.read().await;
        if catalog.locations.is_empty() {
            Some(requested)
        } else {
            catalog.find_location(requested.as_str()).cloned()
        }
    };

    let Some(location) = location else {
        let known = ctx
            .state
            .catalog
            .read()
            .await
            .locations
            .iter()
            .map(Location::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        ctx.notify(
            format!("Unknown location '{name}'. Known: {known}"),
            ToastKind::Warning,
        )
        .await?;
        return Ok(());
    };

    tracing::info!("[CATALOG] Location set to {}", location);
    ctx.state.session.lock().await.set_location(location.clone());
    ctx.notify(format!("Location set to {location}"), ToastKind::Success)
        .await
}

pub async fn handle_list_locations(ctx: &DetectContext) -> anyhow::Result<()> {
    if !ensure_catalog(ctx).await? {
        return Ok(());
    }

    let current = ctx.state.session.lock().await.location().clone();
    let text = {
        let catalog = ctx.state.catalog.read().await;
        let mut text = String::from("Locations:");
        for location in &catalog.locations {
            let marker = if *location == current { "*" } else { " " };
            text.push_str(&format!("\n {marker} {location}"));
        }
        text
    };

    ctx.send(AppEvent::ShowText(text)).await
}

pub async fn handle_list_vegetables(ctx: &DetectContext) -> anyhow::Result<()> {
    if !ensure_catalog(ctx).await? {
        return Ok(());
    }

    let text = {
        let catalog = ctx.state.catalog.read().await;
        if catalog.vegetables.is_empty() {
            "No vegetables listed by the pricing service.".to_string()
        } else {
            format!("Vegetables: {}", catalog.vegetables.join(", "))
        }
    };

    ctx.send(AppEvent::ShowText(text)).await
}
