use sabzi_core::pricing::round2;
use sabzi_core::{DetectionItem, ResultSet};

pub const NOTHING_DETECTED: &str = "No vegetables detected.";

pub fn rupees(amount: f64) -> String {
    format!("₹{:.2}", round2(amount))
}

/// Up to two decimals without trailing zeros: `2`, `1.5`, `0.25`; small
/// amounts keep their first significant digit (`0.004`)
pub fn format_quantity(quantity: f64) -> String {
    // Tiny non-zero amounts get more digits instead of rounding to "0"
    for precision in 2..=6 {
        let text = format!("{quantity:.precision$}");
        let text = text.trim_end_matches('0').trim_end_matches('.');
        if quantity == 0.0 || text != "0" {
            return text.to_string();
        }
    }
    format!("{quantity:.1e}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
    pub confidence: String,
}

impl From<&DetectionItem> for ResultRow {
    fn from(item: &DetectionItem) -> Self {
        Self {
            name: item.vegetable_name().to_string(),
            quantity: format!("{} {}", format_quantity(item.quantity()), item.unit()),
            unit_price: format!("{}/{}", rupees(item.price_per_kg()), item.unit()),
            line_total: rupees(item.line_total()),
            confidence: format!("{:.1}%", item.confidence_percent()),
        }
    }
}

/// What the results area currently shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultsView {
    #[default]
    Hidden,
    Empty,
    Items {
        rows: Vec<ResultRow>,
        subtotal: String,
        tax: String,
        total: String,
        location: String,
        has_annotated_image: bool,
    },
}

impl ResultsView {
    pub fn from_result_set(set: &ResultSet) -> Self {
        if set.is_empty() {
            return ResultsView::Empty;
        }

        let totals = set.totals();
        ResultsView::Items {
            rows: set.items().iter().map(ResultRow::from).collect(),
            subtotal: rupees(totals.subtotal),
            tax: rupees(totals.tax),
            total: rupees(totals.total),
            location: set.location().to_string(),
            has_annotated_image: set.annotated_image().is_some(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ResultsView::Items { rows, .. } => rows.len(),
            _ => 0,
        }
    }

    pub fn render(&self) -> String {
        match self {
            ResultsView::Hidden => String::new(),
            ResultsView::Empty => format!("{NOTHING_DETECTED}\n"),
            ResultsView::Items {
                rows,
                subtotal,
                tax,
                total,
                location,
                ..
            } => {
                let mut out = String::new();
                out.push_str(&format!(
                    "{:<16} {:>10} {:>14} {:>12} {:>10}\n",
                    "Vegetable", "Quantity", "Price", "Total", "Confidence"
                ));
                for row in rows {
                    out.push_str(&format!(
                        "{:<16} {:>10} {:>14} {:>12} {:>10}\n",
                        row.name, row.quantity, row.unit_price, row.line_total, row.confidence
                    ));
                }
                out.push_str(&format!("{:>54}: {:>10}\n", "Subtotal", subtotal));
                out.push_str(&format!("{:>54}: {:>10}\n", "Tax (10%)", tax));
                out.push_str(&format!("{:>54}: {:>10}\n", "Total", total));
                out.push_str(&format!("Prices for {location}\n"));
                out
            }
        }
    }
}

/// Holds the one visible view; every update replaces it wholesale
#[derive(Debug, Default)]
pub struct ResultsPanel {
    view: ResultsView,
}

impl ResultsPanel {
    pub fn show(&mut self, set: &ResultSet) -> &ResultsView {
        self.view = ResultsView::from_result_set(set);
        &self.view
    }

    pub fn clear(&mut self) {
        self.view = ResultsView::Hidden;
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use sabzi_core::UnitPrice;
    use sabzi_types::{DetectionRecord, Location};

    use super::*;

    fn set(records: &[(&str, f64, f64, f64)]) -> ResultSet {
        let items = records
            .iter()
            .enumerate()
            .map(|(i, (name, quantity, price, confidence))| {
                let record = DetectionRecord {
                    vegetable: name.to_string(),
                    quantity: *quantity,
                    confidence: *confidence,
                    price_per_kg: Some(*price),
                    live_price: None,
                    unit: None,
                };
                DetectionItem::new(i, &record, UnitPrice::fixed(*price)).unwrap()
            })
            .collect();
        ResultSet::new(items, None, Location::default())
    }

    #[test]
    fn tomato_row_and_totals() {
        let view = ResultsView::from_result_set(&set(&[("tomato", 2.0, 30.0, 0.95)]));
        let ResultsView::Items {
            rows,
            subtotal,
            tax,
            total,
            location,
            has_annotated_image,
        } = &view
        else {
            panic!("expected items, got {view:?}");
        };

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "tomato");
        assert_eq!(rows[0].quantity, "2 kg");
        assert_eq!(rows[0].unit_price, "₹30.00/kg");
        assert_eq!(rows[0].line_total, "₹60.00");
        assert_eq!(rows[0].confidence, "95.0%");
        assert_eq!(subtotal, "₹60.00");
        assert_eq!(tax, "₹6.00");
        assert_eq!(total, "₹66.00");
        assert_eq!(location, "Delhi");
        assert!(!has_annotated_image);
    }

    #[test]
    fn empty_set_renders_nothing_detected() {
        let view = ResultsView::from_result_set(&set(&[]));
        assert_eq!(view, ResultsView::Empty);
        assert_eq!(view.render(), "No vegetables detected.\n");
    }

    #[test]
    fn rows_keep_backend_order() {
        let view = ResultsView::from_result_set(&set(&[
            ("potato", 1.0, 25.0, 0.8),
            ("onion", 0.5, 35.0, 0.9),
            ("garlic", 0.25, 200.0, 0.7),
        ]));
        let rendered = view.render();
        let potato = rendered.find("potato").unwrap();
        let onion = rendered.find("onion").unwrap();
        let garlic = rendered.find("garlic").unwrap();
        assert!(potato < onion && onion < garlic);
        assert_eq!(view.row_count(), 3);
    }

    #[test]
    fn showing_twice_is_idempotent() {
        let results = set(&[("carrot", 1.5, 40.0, 0.9)]);
        let mut panel = ResultsPanel::default();
        let first = panel.show(&results).render();
        let second = panel.show(&results).render();
        assert_eq!(first, second);
        assert_eq!(panel.view().row_count(), 1);
    }

    #[test]
    fn new_results_replace_old_rows() {
        let mut panel = ResultsPanel::default();
        panel.show(&set(&[("a", 1.0, 1.0, 0.5), ("b", 1.0, 1.0, 0.5)]));
        panel.show(&set(&[("c", 1.0, 1.0, 0.5)]));
        assert_eq!(panel.view().row_count(), 1);

        panel.clear();
        assert_eq!(panel.view(), &ResultsView::Hidden);
    }

    #[test]
    fn quantity_formatting() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.5), "1.5");
        assert_eq!(format_quantity(0.25), "0.25");
        assert_eq!(format_quantity(0.1 + 0.2), "0.3");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn tiny_quantities_are_not_shown_as_zero() {
        assert_eq!(format_quantity(0.004), "0.004");
        assert_eq!(format_quantity(0.0042), "0.004");
        assert_eq!(format_quantity(0.00018), "0.0002");
        assert_eq!(format_quantity(2e-9), "2.0e-9");
    }
}
