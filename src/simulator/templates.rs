//! Response templates and placeholder rendering.
//!
//! Each intent owns a fixed family of templates. Placeholders use the
//! `{name}` form; `{{` and `}}` are literal braces.

use std::collections::HashMap;

use thiserror::Error;

use crate::simulator::types::Intent;

/// Malformed template data. Always a programming error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder '{{{0}}}'")]
    UnknownPlaceholder(String),

    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    #[error("no templates defined for intent '{0}'")]
    EmptyFamily(&'static str),
}

const LOW_STOCK: &[&str] = &[
    "Here are the products running low on stock ({low_stock_count} in total):\n\n{low_stock_items}\n\nI'd prioritise the items at the top of this list; they are furthest below their reorder points.",
    "{low_stock_count} products are at or below their reorder point:\n\n{low_stock_items}\n\nWant me to draft purchase orders for these low-stock items?",
    "Low stock alert. These items need attention soon:\n\n{low_stock_items}\n\nRestocking them now avoids stockouts over the coming week.",
];

const RESTOCK: &[&str] = &[
    "Based on current stock levels, here is my restocking recommendation:\n\n{restock_plan}\n\nEstimated total cost: {restock_total}.",
    "To bring inventory back to safe levels I suggest ordering:\n\n{restock_plan}\n\nThat comes to roughly {restock_total}.",
    "Restock plan (target: twice the reorder point):\n\n{restock_plan}\n\nBudget needed: {restock_total}.",
];

const OPTIMIZE: &[&str] = &[
    "Here is how your inventory is turning over:\n\n{turnover_report}\n\nConsider discounting slow movers and raising safety stock on fast movers.",
    "Inventory optimisation overview:\n\n{turnover_report}\n\nFreeing up capital from slow movers would let you carry more of the fast sellers.",
    "I looked at turnover across the catalogue:\n\n{turnover_report}",
];

const ANALYZE: &[&str] = &[
    "Sales trends by category:\n\n{trend_report}\n\n{top_category} is currently your strongest category.",
    "Here is what the recent sales data shows:\n\n{trend_report}\n\nMost revenue is coming from {top_category}.",
    "Category analysis:\n\n{trend_report}\n\nI'd keep a close eye on stock depth in {top_category}.",
];

const PREDICT: &[&str] = &[
    "Demand forecast for the next {horizon_days} days:\n\n{demand_forecast}\n\nThese projections assume recent sales rates hold.",
    "Looking {horizon_days} days ahead, expected demand is:\n\n{demand_forecast}",
    "Projected demand over {horizon_days} days:\n\n{demand_forecast}\n\nItems marked short will need an order before the period ends.",
];

const GENERAL: &[&str] = &[
    "I can help with stock levels, restocking, turnover, sales trends and demand forecasts. Right now you have {inventory_summary}.",
    "Here's a quick snapshot of your inventory: {inventory_summary}. Ask me about low stock, restocking or demand forecasts.",
    "Your inventory at a glance: {inventory_summary}. What would you like to dig into?",
];

/// The fixed template family for `intent`.
pub fn templates_for(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::LowStock => LOW_STOCK,
        Intent::Restock => RESTOCK,
        Intent::Optimize => OPTIMIZE,
        Intent::Analyze => ANALYZE,
        Intent::Predict => PREDICT,
        Intent::General => GENERAL,
    }
}

/// Replace every `{name}` in `template` with `values[name]`.
pub fn render(template: &str, values: &HashMap<&str, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
            offset += pos + 2;
            continue;
        }
        if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
            offset += pos + 2;
            continue;
        }
        if tail.starts_with('}') {
            return Err(TemplateError::Unclosed(offset + pos));
        }

        let end = tail[1..]
            .find('}')
            .ok_or(TemplateError::Unclosed(offset + pos))?;
        let name = &tail[1..=end];
        let value = values
            .get(name)
            .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
        out.push_str(value);

        rest = &tail[end + 2..];
        offset += pos + end + 2;
    }
    out.push_str(rest);
    Ok(out)
}
