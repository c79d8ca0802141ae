// Dashboard snapshot domain model
use serde::{Deserialize, Serialize};

/// Headline scalars shown on the KPI cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpis {
    pub total_active_inventory: i64,
    pub total_sales_today: i64,
    pub average_days_to_sell: f64,
    pub average_sale_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySalesTrend {
    pub date: String,
    pub sales_count: i64,
    pub total_sales_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryByPriceRange {
    pub price_range: String,
    pub inventory_count: i64,
    #[serde(default)]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesByBrand {
    pub brand: String,
    pub sales_count: i64,
    #[serde(default)]
    pub percentage: f64,
    pub avg_sale_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaysOnLotByPriceRange {
    pub price_range: String,
    pub avg_days_on_lot: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSellingModel {
    pub manufacturer: String,
    pub model: String,
    pub brand: String,
    pub units_sold: i64,
    pub avg_sale_price: f64,
    pub avg_days_to_sell: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlowMovingVehicle {
    pub vin: String,
    pub manufacturer: String,
    pub model: String,
    pub brand: String,
    pub days_on_lot: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSale {
    pub sale_date: String,
    pub vin: String,
    pub manufacturer: String,
    pub model: String,
    pub brand: String,
    pub sale_price: f64,
    pub days_to_sell: i64,
}

/// One complete payload of the dashboard endpoint.
///
/// A snapshot is never patched in place: the fetch controller swaps the
/// whole value (behind an `Arc`) when a newer fetch lands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub kpis: DashboardKpis,
    #[serde(default)]
    pub daily_sales_trend: Vec<DailySalesTrend>,
    #[serde(default)]
    pub inventory_by_price_range: Vec<InventoryByPriceRange>,
    #[serde(default)]
    pub sales_by_brand: Vec<SalesByBrand>,
    #[serde(default)]
    pub days_on_lot_by_price_range: Vec<DaysOnLotByPriceRange>,
    #[serde(default)]
    pub top_selling_models: Vec<TopSellingModel>,
    #[serde(default)]
    pub slow_moving_inventory: Vec<SlowMovingVehicle>,
    #[serde(default)]
    pub recent_sales: Vec<RecentSale>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
