//! Brand/price bar chart, emitted as a Vega-Lite document.

use std::collections::HashMap;

use catalog_core::config::ChartConfig;
use catalog_core::ProductRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub color: String,
    pub opacity: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from(&ChartConfig::default())
    }
}

impl From<&ChartConfig> for ChartStyle {
    fn from(cfg: &ChartConfig) -> Self {
        Self {
            color: cfg.color.clone(),
            opacity: cfg.opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandPriceBar {
    pub brand: String,
    pub price: f64,
    /// Listings sharing this brand and price.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandPriceChart {
    pub title: String,
    pub bars: Vec<BrandPriceBar>,
}

impl BrandPriceChart {
    /// Group records by `(brand, price)` in first-seen order. Records
    /// missing either value are not plotted.
    pub fn from_records<'a, I>(title: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = &'a ProductRecord>,
    {
        let mut bars: Vec<BrandPriceBar> = Vec::new();
        let mut positions: HashMap<(String, u64), usize> = HashMap::new();

        for record in records {
            let (Some(brand), Some(price)) = (record.brand.as_deref(), record.price) else {
                continue;
            };
            let key = (brand.to_string(), price.to_bits());
            match positions.get(&key) {
                Some(&pos) => bars[pos].count += 1,
                None => {
                    positions.insert(key, bars.len());
                    bars.push(BrandPriceBar {
                        brand: brand.to_string(),
                        price,
                        count: 1,
                    });
                }
            }
        }

        Self {
            title: title.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bar mark with brand on x and unstacked price on y; occurrence count
    /// drives opacity and shows in the tooltip.
    pub fn to_vega_lite(&self, style: &ChartStyle) -> serde_json::Value {
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": self.title,
            "data": { "values": self.bars },
            "mark": "bar",
            "encoding": {
                "x": { "field": "brand", "type": "nominal" },
                "y": { "field": "price", "type": "quantitative", "stack": null },
                "opacity": { "field": "count", "type": "quantitative" },
                "tooltip": [
                    { "field": "price", "type": "quantitative" },
                    { "field": "count", "type": "quantitative" }
                ]
            },
            "config": {
                "mark": { "color": style.color, "opacity": style.opacity }
            }
        })
    }
}
