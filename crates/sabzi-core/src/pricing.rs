//! Turns backend detections into a priced bill.
//!
//! Line totals are fixed when an item is built; subtotal, tax and total are
//! derived from the whole item list every time a [`ResultSet`] is built and
//! never adjusted afterwards.

use sabzi_types::{DetectionRecord, Location};

use crate::error::InvalidRecord;

/// Flat sales tax applied to the subtotal
pub const TAX_RATE: f64 = 0.10;

pub const DEFAULT_UNIT: &str = "kg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// Quoted by the pricing service for the current location
    Live,
    /// Static per-kg price carried in the detection record
    Static,
    /// Pricing service unreachable, configured default used
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPrice {
    pub value: f64,
    pub source: PriceSource,
}

impl UnitPrice {
    pub fn live(value: f64) -> Self {
        Self {
            value,
            source: PriceSource::Live,
        }
    }

    pub fn fixed(value: f64) -> Self {
        Self {
            value,
            source: PriceSource::Static,
        }
    }

    pub fn fallback(value: f64) -> Self {
        Self {
            value,
            source: PriceSource::Fallback,
        }
    }
}

/// Whether a record carries no price of its own and must be quoted
pub fn needs_quote(record: &DetectionRecord) -> bool {
    record.live_price.is_none() && record.price_per_kg.is_none()
}

/// Live price beats the record's static price, a fresh quote beats the fallback
pub fn resolve_unit_price(record: &DetectionRecord, quote: Option<f64>, fallback: f64) -> UnitPrice {
    if let Some(price) = record.live_price {
        UnitPrice::live(price)
    } else if let Some(price) = record.price_per_kg {
        UnitPrice::fixed(price)
    } else if let Some(price) = quote {
        UnitPrice::live(price)
    } else {
        UnitPrice::fallback(fallback)
    }
}

/// One priced line of the bill
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionItem {
    vegetable_name: String,
    quantity: f64,
    unit: String,
    confidence: f64,
    price_per_kg: f64,
    line_total: f64,
    price_source: PriceSource,
}

impl DetectionItem {
    pub fn new(
        index: usize,
        record: &DetectionRecord,
        price: UnitPrice,
    ) -> Result<Self, InvalidRecord> {
        let vegetable_name = record.vegetable.trim().to_string();
        if vegetable_name.is_empty() {
            return Err(InvalidRecord::MissingName { index });
        }

        if !(record.quantity.is_finite() && record.quantity > 0.0) {
            return Err(InvalidRecord::Quantity {
                index,
                vegetable: vegetable_name,
                quantity: record.quantity,
            });
        }

        if !(0.0..=1.0).contains(&record.confidence) {
            return Err(InvalidRecord::Confidence {
                index,
                vegetable: vegetable_name,
                confidence: record.confidence,
            });
        }

        if !(price.value.is_finite() && price.value >= 0.0) {
            return Err(InvalidRecord::Price {
                index,
                vegetable: vegetable_name,
                price: price.value,
            });
        }

        let unit = record
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_UNIT)
            .to_string();

        Ok(Self {
            vegetable_name,
            quantity: record.quantity,
            unit,
            confidence: record.confidence,
            price_per_kg: price.value,
            line_total: record.quantity * price.value,
            price_source: price.source,
        })
    }

    pub fn vegetable_name(&self) -> &str {
        &self.vegetable_name
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }

    pub fn price_per_kg(&self) -> f64 {
        self.price_per_kg
    }

    pub fn line_total(&self) -> f64 {
        self.line_total
    }

    pub fn price_source(&self) -> PriceSource {
        self.price_source
    }
}

/// Build line items in backend order; `prices[i]` prices `records[i]`
pub fn price_items(
    records: &[DetectionRecord],
    prices: &[UnitPrice],
) -> Result<Vec<DetectionItem>, InvalidRecord> {
    records
        .iter()
        .zip(prices)
        .enumerate()
        .map(|(index, (record, price))| DetectionItem::new(index, record, *price))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    pub fn of(items: &[DetectionItem]) -> Self {
        let subtotal: f64 = items.iter().map(DetectionItem::line_total).sum();
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

/// Round to whole paise for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The complete outcome of one detection request
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    items: Vec<DetectionItem>,
    totals: Totals,
    annotated_image: Option<Vec<u8>>,
    location: Location,
}

impl ResultSet {
    pub fn new(items: Vec<DetectionItem>, annotated_image: Option<Vec<u8>>, location: Location) -> Self {
        let totals = Totals::of(&items);
        Self {
            items,
            totals,
            annotated_image,
            location,
        }
    }

    pub fn items(&self) -> &[DetectionItem] {
        &self.items
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// JPEG bytes of the backend's annotated image
    pub fn annotated_image(&self) -> Option<&[u8]> {
        self.annotated_image.as_deref()
    }

    /// Location the prices were quoted for
    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// Successful detection plus whether any price fell back to the default
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub result_set: ResultSet,
    pub pricing_unavailable: bool,
}

/// One vegetable's price across locations
#[derive(Debug, Clone, PartialEq)]
pub struct PriceComparison {
    pub vegetable: String,
    pub quotes: Vec<(Location, Option<f64>)>,
}

impl PriceComparison {
    /// Cheapest location that actually quoted a price
    pub fn cheapest(&self) -> Option<(&Location, f64)> {
        self.quotes
            .iter()
            .filter_map(|(location, price)| price.map(|p| (location, p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}
