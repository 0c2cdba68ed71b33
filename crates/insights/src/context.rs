//! Grounding context rendering.
//!
//! The rendered text is the only signal the completion endpoint receives
//! about the shop, so the format is part of the contract: fixed section
//! order, headers always present, values at their stored precision, dates
//! as plain calendar dates.

use stockpilot_core::Product;

use crate::aggregates::AnalystSnapshot;

/// Render the snapshot into the textual brief fed to the analyst.
pub fn build_context(snapshot: &AnalystSnapshot) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=== High-level Summary ===".to_string());
    lines.push(format!(
        "- Total products: {}",
        snapshot.totals.total_products
    ));
    lines.push(format!("- Total orders: {}", snapshot.totals.total_orders));
    lines.push(format!(
        "- Total revenue (all time): {}",
        snapshot.totals.total_revenue
    ));
    lines.push(String::new());

    lines.push("=== Top Best-Selling Items (by quantity) ===".to_string());
    if snapshot.best_sellers.is_empty() {
        lines.push("- No best-seller data available yet.".to_string());
    } else {
        for row in &snapshot.best_sellers {
            lines.push(format!(
                "- {} | Qty sold: {} | Revenue: {}",
                row.title, row.total_quantity_sold, row.total_revenue
            ));
        }
    }
    lines.push(String::new());

    lines.push("=== Low Stock Alerts (near out of stock) ===".to_string());
    if snapshot.low_stock.is_empty() {
        lines.push("- No low-stock products under threshold.".to_string());
    } else {
        for product in &snapshot.low_stock {
            lines.push(format!(
                "- {} | Inventory: {}{}",
                product.title,
                product.total_inventory,
                sale_suffix(product)
            ));
        }
    }
    lines.push(String::new());

    lines.push("=== Near Expiry (next 30 days) ===".to_string());
    if snapshot.near_expiry.is_empty() {
        lines.push("- No products close to expiry.".to_string());
    } else {
        for product in &snapshot.near_expiry {
            let date = product
                .expiry_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            lines.push(format!(
                "- {} | Expiry: {} | Stock: {}{}",
                product.title,
                date,
                product.total_inventory,
                sale_suffix(product)
            ));
        }
    }
    lines.push(String::new());

    lines.push("=== On-Sale Items & Discounts ===".to_string());
    if snapshot.on_sale.is_empty() {
        lines.push("- No discounted items.".to_string());
    } else {
        for product in &snapshot.on_sale {
            lines.push(format!(
                "- {} | Discount: {}% | Stock: {}",
                product.title, product.discount_percent, product.total_inventory
            ));
        }
    }

    lines.join("\n")
}

fn sale_suffix(product: &Product) -> String {
    if product.is_on_sale {
        format!(" | On sale: {}%", product.discount_percent)
    } else {
        String::new()
    }
}
