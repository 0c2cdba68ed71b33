use serde::{Deserialize, Serialize};

use stockpilot_insights::Dashboard;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct AnalyseRequest {
    pub question: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub author: String,
}

impl DashboardResponse {
    pub fn new(dashboard: Dashboard, author: String) -> Self {
        Self { dashboard, author }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn analyse_request_deserializes() {
        let req: AnalyseRequest =
            serde_json::from_str(r#"{"question": "How is stock?"}"#).unwrap();
        assert_eq!(req.question, "How is stock?");
    }

    #[test]
    fn dashboard_response_flattens_aggregates_next_to_author() {
        let response = DashboardResponse::new(
            Dashboard {
                total_products: 1,
                total_orders: 2,
                total_revenue: Decimal::ZERO,
                today_sales_total: Decimal::ZERO,
                today_orders_count: 0,
                best_sellers: vec![],
                low_stock_alerts: vec![],
                near_expiry_alerts: vec![],
                on_sale_items: vec![],
                recent_transactions: vec![],
            },
            "stockpilot".to_string(),
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["total_products"], 1);
        assert_eq!(value["total_orders"], 2);
        assert_eq!(value["author"], "stockpilot");
        assert!(value["best_sellers"].as_array().unwrap().is_empty());
    }
}
