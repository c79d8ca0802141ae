// Brand drill-down domain model
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandTopModel {
    pub model: String,
    pub sales_count: i64,
    pub avg_price: f64,
}

/// Summary returned for a single brand selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandMetrics {
    pub brand: String,
    pub total_vehicles: i64,
    pub average_price: f64,
    pub total_sales_30_days: i64,
    pub avg_days_to_sell: f64,
    #[serde(default)]
    pub top_models: Vec<BrandTopModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandBasicMetrics {
    pub total_vehicles: i64,
    pub average_price: f64,
    pub total_sales_30_days: i64,
    pub total_revenue_30_days: f64,
    pub avg_days_to_sell: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSales {
    pub model: String,
    pub sales_count: i64,
    pub avg_price: f64,
    pub total_revenue: f64,
    pub avg_days_to_sell: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub price_range: String,
    pub inventory_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySales {
    #[serde(default)]
    pub week_start: Option<String>,
    pub sales_count: i64,
    pub avg_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryAge {
    pub age_group: String,
    pub inventory_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedBrandAnalysis {
    pub brand: String,
    pub basic_metrics: BrandBasicMetrics,
    #[serde(default)]
    pub sales_by_model: Vec<ModelSales>,
    #[serde(default)]
    pub price_distribution: Vec<PriceBucket>,
    #[serde(default)]
    pub sales_trend: Vec<WeeklySales>,
    #[serde(default)]
    pub inventory_age: Vec<InventoryAge>,
}
