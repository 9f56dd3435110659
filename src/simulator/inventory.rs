//! Inventory data behind simulated answers.
//!
//! Every report block is a pure function of the item list so answers stay
//! consistent with whatever catalogue the simulator was built with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Days of supply below which an item counts as fast-moving.
const FAST_MOVER_DAYS: f64 = 14.0;
/// Days of supply above which an item counts as slow-moving.
const SLOW_MOVER_DAYS: f64 = 90.0;

/// A single stock-keeping unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub stock: u32,
    pub reorder_point: u32,
    /// Average units sold per day.
    pub daily_sales: f64,
    pub unit_cost: f64,
}

impl InventoryItem {
    pub fn new(
        sku: &str,
        name: &str,
        category: &str,
        stock: u32,
        reorder_point: u32,
        daily_sales: f64,
        unit_cost: f64,
    ) -> Self {
        Self {
            sku: sku.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            stock,
            reorder_point,
            daily_sales,
            unit_cost,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_point
    }

    /// Units needed to get back to twice the reorder point.
    pub fn restock_quantity(&self) -> u32 {
        self.reorder_point.saturating_mul(2).saturating_sub(self.stock)
    }

    /// How long current stock lasts at the current sales rate.
    pub fn days_of_supply(&self) -> Option<f64> {
        (self.daily_sales > 0.0).then(|| self.stock as f64 / self.daily_sales)
    }

    /// Annualised turnover; `None` when nothing is on hand.
    pub fn annual_turnover(&self) -> Option<f64> {
        (self.stock > 0).then(|| self.daily_sales * 365.0 / self.stock as f64)
    }
}

/// The catalogue the simulator reasons about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    /// Demo catalogue matching the dashboard's mock data.
    pub fn sample() -> Self {
        Self::new(vec![
            InventoryItem::new("EL-1001", "Wireless Mouse", "Electronics", 5, 20, 3.2, 12.50),
            InventoryItem::new("EL-1002", "USB-C Hub", "Electronics", 8, 15, 1.8, 24.00),
            InventoryItem::new("EL-1003", "Mechanical Keyboard", "Electronics", 42, 15, 1.1, 58.00),
            InventoryItem::new("EL-1004", "27\" Monitor", "Electronics", 12, 10, 0.6, 189.00),
            InventoryItem::new("FU-2001", "Office Chair", "Furniture", 3, 8, 0.4, 145.00),
            InventoryItem::new("FU-2002", "Standing Desk", "Furniture", 18, 6, 0.25, 320.00),
            InventoryItem::new("FU-2003", "Desk Lamp", "Furniture", 60, 10, 0.15, 29.00),
            InventoryItem::new("OS-3001", "A4 Paper (500 sheets)", "Office Supplies", 140, 100, 9.5, 4.20),
            InventoryItem::new("OS-3002", "Gel Pens (12-pack)", "Office Supplies", 25, 40, 2.7, 6.80),
        ])
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    /// Items at or below their reorder point, most urgent first.
    pub fn low_stock(&self) -> Vec<&InventoryItem> {
        let mut low: Vec<_> = self.items.iter().filter(|i| i.is_low_stock()).collect();
        low.sort_by(|a, b| {
            let ra = a.stock as f64 / a.reorder_point.max(1) as f64;
            let rb = b.stock as f64 / b.reorder_point.max(1) as f64;
            ra.total_cmp(&rb)
        });
        low
    }

    pub fn low_stock_report(&self) -> String {
        let low = self.low_stock();
        if low.is_empty() {
            return "- Every product is above its reorder point.".to_string();
        }
        low.iter()
            .map(|i| {
                format!(
                    "- {} ({}): {} units left (reorder point {})",
                    i.name, i.sku, i.stock, i.reorder_point
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Restock lines and their total cost.
    pub fn restock_plan(&self) -> (String, f64) {
        let mut total = 0.0;
        let lines: Vec<_> = self
            .low_stock()
            .into_iter()
            .filter(|i| i.restock_quantity() > 0)
            .map(|i| {
                let qty = i.restock_quantity();
                let cost = qty as f64 * i.unit_cost;
                total += cost;
                format!("- {}: order {} units (~{})", i.name, qty, currency(cost))
            })
            .collect();

        if lines.is_empty() {
            ("- No purchase orders needed right now.".to_string(), 0.0)
        } else {
            (lines.join("\n"), total)
        }
    }

    pub fn turnover_report(&self) -> String {
        let mut fast = Vec::new();
        let mut slow = Vec::new();
        for item in &self.items {
            match item.days_of_supply() {
                Some(days) if days < FAST_MOVER_DAYS => fast.push((item, days)),
                Some(days) if days > SLOW_MOVER_DAYS => slow.push((item, days)),
                None if item.stock > 0 => slow.push((item, f64::INFINITY)),
                _ => {}
            }
        }

        let mut out = Vec::new();
        out.push("Fast movers (under two weeks of supply):".to_string());
        if fast.is_empty() {
            out.push("- none".to_string());
        }
        for (item, days) in fast {
            out.push(format!(
                "- {}: {:.0} days of supply, turnover {:.1}x/year",
                item.name,
                days,
                item.annual_turnover().unwrap_or_default()
            ));
        }
        out.push("Slow movers (over 90 days of supply):".to_string());
        if slow.is_empty() {
            out.push("- none".to_string());
        }
        for (item, days) in slow {
            let supply = if days.is_finite() {
                format!("{:.0} days of supply", days)
            } else {
                "no recent sales".to_string()
            };
            out.push(format!(
                "- {}: {}, {} tied up in stock",
                item.name,
                supply,
                currency(item.stock as f64 * item.unit_cost)
            ));
        }
        out.join("\n")
    }

    /// Category sales trend lines and the leading category.
    pub fn trend_report(&self) -> (String, String) {
        let mut by_category: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
        for item in &self.items {
            let entry = by_category.entry(item.category.as_str()).or_default();
            entry.0 += item.daily_sales;
            entry.1 += item.daily_sales * item.unit_cost;
        }

        let mut ranked: Vec<_> = by_category.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .1.total_cmp(&a.1 .1));

        let top = ranked
            .first()
            .map(|(c, _)| c.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let lines = ranked
            .iter()
            .map(|(category, (units, revenue))| {
                format!(
                    "- {}: {:.1} units/day (~{}/day)",
                    category,
                    units,
                    currency(*revenue)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        (lines, top)
    }

    /// Expected demand over `horizon_days`, largest shortfall first.
    pub fn demand_forecast(&self, horizon_days: u32) -> String {
        let mut rows: Vec<_> = self
            .items
            .iter()
            .map(|i| {
                let demand = (i.daily_sales * horizon_days as f64).round() as u32;
                (i, demand, demand.saturating_sub(i.stock))
            })
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| b.1.cmp(&a.1)));

        let lines: Vec<_> = rows
            .iter()
            .filter(|(_, demand, _)| *demand > 0)
            .take(5)
            .map(|(item, demand, shortfall)| {
                if *shortfall > 0 {
                    format!(
                        "- {}: ~{} units needed, {} in stock (short by {})",
                        item.name, demand, item.stock, shortfall
                    )
                } else {
                    format!(
                        "- {}: ~{} units needed, {} in stock (covered)",
                        item.name, demand, item.stock
                    )
                }
            })
            .collect();

        if lines.is_empty() {
            "- No demand expected over this period.".to_string()
        } else {
            lines.join("\n")
        }
    }

    pub fn summary(&self) -> String {
        let units: u64 = self.items.iter().map(|i| i.stock as u64).sum();
        let value: f64 = self
            .items
            .iter()
            .map(|i| i.stock as f64 * i.unit_cost)
            .sum();
        format!(
            "{} products, {} units on hand worth {}, {} at or below reorder point",
            self.items.len(),
            units,
            currency(value),
            self.low_stock().len()
        )
    }
}

fn currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_sorted_by_urgency() {
        let inventory = Inventory::sample();
        let names: Vec<_> = inventory.low_stock().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Wireless Mouse", "Office Chair", "USB-C Hub", "Gel Pens (12-pack)"]
        );
    }

    #[test]
    fn test_low_stock_report_lists_units() {
        let report = Inventory::sample().low_stock_report();
        assert!(report.contains("Wireless Mouse (EL-1001): 5 units left"));
        assert_eq!(report.lines().count(), 4);
    }

    #[test]
    fn test_restock_plan_totals() {
        let inventory = Inventory::new(vec![InventoryItem::new(
            "X-1", "Widget", "Parts", 4, 10, 1.0, 2.5,
        )]);
        let (plan, total) = inventory.restock_plan();
        assert_eq!(plan, "- Widget: order 16 units (~$40.00)");
        assert_eq!(total, 40.0);
    }

    #[test]
    fn test_turnover_classification() {
        let report = Inventory::sample().turnover_report();
        let (fast, slow) = report.split_once("Slow movers").unwrap();
        assert!(fast.contains("Wireless Mouse"));
        assert!(slow.contains("Desk Lamp"));
        assert!(!slow.contains("Standing Desk"));
    }

    #[test]
    fn test_trend_report_top_category() {
        let (lines, top) = Inventory::sample().trend_report();
        assert_eq!(top, "Electronics");
        assert_eq!(lines.lines().count(), 3);
    }

    #[test]
    fn test_forecast_shortfall_first() {
        let forecast = Inventory::sample().demand_forecast(30);
        let first = forecast.lines().next().unwrap();
        assert_eq!(
            first,
            "- A4 Paper (500 sheets): ~285 units needed, 140 in stock (short by 145)"
        );
        assert!(forecast.contains("- Wireless Mouse: ~96 units needed, 5 in stock (short by 91)"));
    }

    #[test]
    fn test_empty_inventory() {
        let inventory = Inventory::default();
        assert_eq!(inventory.low_stock_report(), "- Every product is above its reorder point.");
        assert_eq!(inventory.restock_plan().1, 0.0);
        assert_eq!(inventory.trend_report().1, "n/a");
        assert!(inventory.summary().starts_with("0 products"));
        assert_eq!(inventory.demand_forecast(30), "- No demand expected over this period.");
    }

    #[test]
    fn test_forecast_without_sales() {
        let inventory = Inventory::new(vec![InventoryItem::new(
            "OF-9", "Archive Box", "Office", 40, 10, 0.0, 3.5,
        )]);
        assert_eq!(inventory.demand_forecast(30), "- No demand expected over this period.");
    }

    #[test]
    fn test_restock_quantity_saturates() {
        let item = InventoryItem::new("XX-1", "Bulk Bolt", "Hardware", 0, u32::MAX, 1.0, 0.1);
        assert_eq!(item.restock_quantity(), u32::MAX);
    }
}
