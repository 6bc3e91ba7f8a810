use std::collections::BTreeSet;

use sabzi_core::AppEvent;
use sabzi_types::{PriceHistoryPoint, ToastKind};

use crate::detect_context::DetectContext;

/// Dates down, vegetables across. Missing cells are `-`.
pub fn history_table(points: &[PriceHistoryPoint]) -> String {
    if points.is_empty() {
        return "No price history available.".to_string();
    }

    let vegetables: BTreeSet<&str> = points
        .iter()
        .flat_map(|p| p.prices.keys().map(String::as_str))
        .collect();

    let mut table = format!("{:<12}", "date");
    for vegetable in &vegetables {
        table.push_str(&format!("{vegetable:>10}"));
    }

    for point in points {
        table.push_str(&format!("\n{:<12}", point.date));
        for vegetable in &vegetables {
            match point.prices.get(*vegetable) {
                Some(price) => table.push_str(&format!("{price:>10.2}")),
                None => table.push_str(&format!("{:>10}", "-")),
            }
        }
    }

    table
}

pub async fn handle_price_history(ctx: &DetectContext) -> anyhow::Result<()> {
    match ctx.state.pricing().price_history().await {
        Ok(points) => {
            tracing::debug!("[HISTORY] {} points", points.len());
            ctx.send(AppEvent::ShowText(history_table(&points))).await
        }
        Err(e) => {
            tracing::warn!("[HISTORY] Could not load price history: {}", e);
            ctx.notify("Could not load price history", ToastKind::Warning)
                .await
        }
    }
}
