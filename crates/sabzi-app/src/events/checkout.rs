use sabzi_core::AppEvent;
use sabzi_types::ToastKind;
use sabzi_ui::results::rupees;

use crate::detect_context::DetectContext;

pub async fn handle_checkout(ctx: &DetectContext) -> anyhow::Result<()> {
    let results = ctx.state.session.lock().await.results().cloned();

    let set = match results {
        Some(set) if !set.is_empty() => set,
        _ => {
            ctx.notify("Cart is empty", ToastKind::Warning).await?;
            return Ok(());
        }
    };

    let totals = set.totals();
    tracing::info!(
        "[CHECKOUT] {} items, total {:.2} at {}",
        set.len(),
        totals.total,
        set.location()
    );

    ctx.notify("Redirecting to checkout...", ToastKind::Info)
        .await?;
    ctx.send(AppEvent::ShowText(format!(
        "Checkout: {} items, total {} ({})",
        set.len(),
        rupees(totals.total),
        set.location()
    )))
    .await
}
