// Overview service - Use case for turning fetch state into display views
use crate::application::analytics_api::FetchError;
use crate::application::brand_controller::BrandController;
use crate::application::dashboard_controller::{DashboardController, DashboardState};
use crate::application::fetch_state::FetchState;
use crate::domain::brand::{BrandMetrics, DetailedBrandAnalysis};
use crate::domain::dashboard::{
    DailySalesTrend, DashboardKpis, DashboardSnapshot, DaysOnLotByPriceRange, RecentSale,
    SlowMovingVehicle, TopSellingModel,
};
use crate::domain::metrics::{
    filter_by, format_last_updated, is_aged, relative_to_max, safe_ratio, shares, top_n, SellSpeed,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const BRAND_CHART_SLICES: usize = 6;
const TOP_MODEL_ROWS: usize = 10;
const BRAND_RANKING_ROWS: usize = 10;
const SALES_WINDOW_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Loading,
    Ready,
    ConnectionError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRow {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedModel {
    #[serde(flatten)]
    pub model: TopSellingModel,
    pub speed: SellSpeed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewView {
    pub status: ConnectionStatus,
    pub error_message: Option<String>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_label: String,
    pub kpis: Option<DashboardKpis>,
    pub daily_sales_trend: Vec<DailySalesTrend>,
    pub brand_shares: Vec<ShareRow>,
    pub price_range_shares: Vec<ShareRow>,
    pub days_on_lot_by_price_range: Vec<DaysOnLotByPriceRange>,
    pub top_models: Vec<RatedModel>,
}

pub fn connection_status<T>(state: &FetchState<T>) -> ConnectionStatus {
    if state.error.is_some() {
        ConnectionStatus::ConnectionError
    } else if state.data.is_none() {
        ConnectionStatus::Loading
    } else {
        ConnectionStatus::Ready
    }
}

pub fn build_overview(state: &DashboardState, now: DateTime<Utc>, stale_after: Duration) -> OverviewView {
    let snapshot = state.data.as_deref();

    OverviewView {
        status: connection_status(state),
        error_message: state.error.as_ref().map(FetchError::user_message),
        is_loading: state.is_loading(),
        is_fetching: state.is_fetching(),
        is_stale: state.is_stale(now, stale_after),
        last_updated: state.last_updated,
        last_updated_label: format_last_updated(now, state.last_updated),
        kpis: snapshot.map(|s| s.kpis.clone()),
        daily_sales_trend: snapshot
            .map(|s| s.daily_sales_trend.clone())
            .unwrap_or_default(),
        brand_shares: snapshot.map(brand_shares).unwrap_or_default(),
        price_range_shares: snapshot.map(price_range_shares).unwrap_or_default(),
        days_on_lot_by_price_range: snapshot
            .map(|s| s.days_on_lot_by_price_range.clone())
            .unwrap_or_default(),
        top_models: snapshot
            .map(|s| rate_models(&top_n(&s.top_selling_models, TOP_MODEL_ROWS, |m| m.units_sold as f64)))
            .unwrap_or_default(),
    }
}

/// Largest brands by sales, share computed over the whole brand list
fn brand_shares(snapshot: &DashboardSnapshot) -> Vec<ShareRow> {
    let brands = &snapshot.sales_by_brand;
    let percentages = shares(brands, |b| b.sales_count as f64);
    let rows: Vec<ShareRow> = brands
        .iter()
        .zip(percentages)
        .map(|(b, percentage)| ShareRow {
            label: b.brand.clone(),
            value: b.sales_count as f64,
            percentage,
        })
        .collect();
    top_n(&rows, BRAND_CHART_SLICES, |r| r.value)
}

fn price_range_shares(snapshot: &DashboardSnapshot) -> Vec<ShareRow> {
    let ranges = &snapshot.inventory_by_price_range;
    ranges
        .iter()
        .zip(shares(ranges, |r| r.inventory_count as f64))
        .map(|(r, percentage)| ShareRow {
            label: r.price_range.clone(),
            value: r.inventory_count as f64,
            percentage,
        })
        .collect()
}

fn rate_models(models: &[TopSellingModel]) -> Vec<RatedModel> {
    models
        .iter()
        .map(|m| RatedModel {
            model: m.clone(),
            speed: SellSpeed::classify(m.avg_days_to_sell),
        })
        .collect()
}

/// One bar of the brand leaderboard, width relative to the leader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandRankRow {
    pub rank: usize,
    pub brand: String,
    pub sales_count: i64,
    pub width_percent: f64,
}

pub fn build_brand_ranking(snapshot: &DashboardSnapshot) -> Vec<BrandRankRow> {
    let leaders = top_n(&snapshot.sales_by_brand, BRAND_RANKING_ROWS, |b| b.sales_count as f64);
    leaders
        .iter()
        .enumerate()
        .map(|(i, b)| BrandRankRow {
            rank: i + 1,
            brand: b.brand.clone(),
            sales_count: b.sales_count,
            width_percent: relative_to_max(b.sales_count as f64, &leaders, |x| x.sales_count as f64),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTable {
    TopSelling,
    SlowMoving,
    RecentSales,
}

impl FromStr for DashboardTable {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-selling" => Ok(DashboardTable::TopSelling),
            "slow-moving" => Ok(DashboardTable::SlowMoving),
            "recent-sales" => Ok(DashboardTable::RecentSales),
            other => Err(ViewError::UnknownTable(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("cannot search on field: {0}")]
    UnknownField(String),

    #[error("dashboard data not loaded yet")]
    NotLoaded,
}

#[derive(Debug, Clone, Default)]
pub struct TableQuery {
    pub search: Option<String>,
    pub field: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowMovingRow {
    #[serde(flatten)]
    pub vehicle: SlowMovingVehicle,
    pub aged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSaleRow {
    #[serde(flatten)]
    pub sale: RecentSale,
    pub speed: SellSpeed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "table", content = "rows", rename_all = "kebab-case")]
pub enum TableView {
    TopSelling(Vec<RatedModel>),
    SlowMoving(Vec<SlowMovingRow>),
    RecentSales(Vec<RecentSaleRow>),
}

fn text_field<'a>(
    field: &str,
    vin: Option<&'a str>,
    manufacturer: &'a str,
    model: &'a str,
    brand: &'a str,
) -> Option<&'a str> {
    match field {
        "brand" => Some(brand),
        "model" => Some(model),
        "manufacturer" => Some(manufacturer),
        "vin" => vin,
        _ => None,
    }
}

fn filter_rows<T, F>(rows: &[T], query: &TableQuery, pick: F) -> Result<Vec<T>, ViewError>
where
    T: Clone,
    F: for<'a> Fn(&str, &'a T) -> Option<&'a str>,
{
    let field = query.field.as_deref().unwrap_or("brand");
    if let Some(first) = rows.first() {
        if pick(field, first).is_none() {
            return Err(ViewError::UnknownField(field.to_string()));
        }
    }
    let term = query.search.as_deref().unwrap_or("");
    let mut hits = filter_by(rows, term, |row| pick(field, row).unwrap_or(""));
    if let Some(limit) = query.limit {
        hits.truncate(limit);
    }
    Ok(hits)
}

pub fn build_table(
    snapshot: &DashboardSnapshot,
    table: DashboardTable,
    query: &TableQuery,
) -> Result<TableView, ViewError> {
    match table {
        DashboardTable::TopSelling => {
            let rows = filter_rows(&snapshot.top_selling_models, query, |field, m| {
                text_field(field, None, &m.manufacturer, &m.model, &m.brand)
            })?;
            Ok(TableView::TopSelling(rate_models(&rows)))
        }
        DashboardTable::SlowMoving => {
            let rows = filter_rows(&snapshot.slow_moving_inventory, query, |field, v| {
                text_field(field, Some(v.vin.as_str()), &v.manufacturer, &v.model, &v.brand)
            })?;
            Ok(TableView::SlowMoving(
                rows.into_iter()
                    .map(|vehicle| SlowMovingRow {
                        aged: is_aged(vehicle.days_on_lot),
                        vehicle,
                    })
                    .collect(),
            ))
        }
        DashboardTable::RecentSales => {
            let rows = filter_rows(&snapshot.recent_sales, query, |field, s| {
                text_field(field, Some(s.vin.as_str()), &s.manufacturer, &s.model, &s.brand)
            })?;
            Ok(TableView::RecentSales(
                rows.into_iter()
                    .map(|sale| RecentSaleRow {
                        speed: SellSpeed::classify(sale.days_to_sell as f64),
                        sale,
                    })
                    .collect(),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandView {
    pub brand: String,
    pub status: ConnectionStatus,
    pub error_message: Option<String>,
    pub is_fetching: bool,
    pub metrics: Option<BrandMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBreakdownRow {
    pub model: String,
    pub sales_count: i64,
    pub avg_price: f64,
    pub total_revenue: f64,
    pub sales_share: f64,
    pub revenue_share: f64,
    pub speed: SellSpeed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBar {
    pub week_start: Option<String>,
    pub sales_count: i64,
    pub avg_price: f64,
    pub width_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandAnalysisView {
    pub brand: String,
    pub total_vehicles: i64,
    pub average_price: f64,
    pub total_sales_30_days: i64,
    pub total_revenue_30_days: f64,
    pub avg_days_to_sell: f64,
    pub avg_revenue_per_sale: f64,
    pub daily_sales_rate: f64,
    pub top_selling_model: Option<String>,
    pub sales_by_model: Vec<ModelBreakdownRow>,
    pub price_distribution: Vec<ShareRow>,
    pub inventory_age: Vec<ShareRow>,
    pub sales_trend: Vec<TrendBar>,
}

/// Whole sales per day over the 30-day window; no sales reads as 0
fn daily_sales_rate(total_sales_30_days: i64) -> f64 {
    if total_sales_30_days <= 0 {
        return 0.0;
    }
    (total_sales_30_days as f64 / SALES_WINDOW_DAYS).round()
}

pub fn build_brand_analysis(analysis: &DetailedBrandAnalysis) -> BrandAnalysisView {
    let basic = &analysis.basic_metrics;
    let models = &analysis.sales_by_model;
    let sales_shares = shares(models, |m| m.sales_count as f64);
    let revenue_shares = shares(models, |m| m.total_revenue);

    let sales_by_model = models
        .iter()
        .zip(sales_shares.into_iter().zip(revenue_shares))
        .map(|(m, (sales_share, revenue_share))| ModelBreakdownRow {
            model: m.model.clone(),
            sales_count: m.sales_count,
            avg_price: m.avg_price,
            total_revenue: m.total_revenue,
            sales_share,
            revenue_share,
            speed: SellSpeed::classify(m.avg_days_to_sell),
        })
        .collect();

    let price_distribution = analysis
        .price_distribution
        .iter()
        .zip(shares(&analysis.price_distribution, |p| p.inventory_count as f64))
        .map(|(p, percentage)| ShareRow {
            label: p.price_range.clone(),
            value: p.inventory_count as f64,
            percentage,
        })
        .collect();

    let inventory_age = analysis
        .inventory_age
        .iter()
        .zip(shares(&analysis.inventory_age, |a| a.inventory_count as f64))
        .map(|(a, percentage)| ShareRow {
            label: a.age_group.clone(),
            value: a.inventory_count as f64,
            percentage,
        })
        .collect();

    let sales_trend = analysis
        .sales_trend
        .iter()
        .map(|w| TrendBar {
            week_start: w.week_start.clone(),
            sales_count: w.sales_count,
            avg_price: w.avg_price,
            width_percent: relative_to_max(w.sales_count as f64, &analysis.sales_trend, |x| {
                x.sales_count as f64
            }),
        })
        .collect();

    BrandAnalysisView {
        brand: analysis.brand.clone(),
        total_vehicles: basic.total_vehicles,
        average_price: basic.average_price,
        total_sales_30_days: basic.total_sales_30_days,
        total_revenue_30_days: basic.total_revenue_30_days,
        avg_days_to_sell: basic.avg_days_to_sell,
        avg_revenue_per_sale: safe_ratio(
            basic.total_revenue_30_days,
            basic.total_sales_30_days as f64,
        ),
        daily_sales_rate: daily_sales_rate(basic.total_sales_30_days),
        top_selling_model: models.first().map(|m| m.model.clone()),
        sales_by_model,
        price_distribution,
        inventory_age,
        sales_trend,
    }
}

/// Entry point for the HTTP layer: reads the controllers, never mutates
/// state except through their refresh/select operations
#[derive(Clone)]
pub struct OverviewService {
    dashboard: Arc<DashboardController>,
    brands: Arc<BrandController>,
}

impl OverviewService {
    pub fn new(dashboard: Arc<DashboardController>, brands: Arc<BrandController>) -> Self {
        Self { dashboard, brands }
    }

    pub fn overview(&self) -> OverviewView {
        build_overview(
            &self.dashboard.current(),
            Utc::now(),
            self.dashboard.policy().stale_after,
        )
    }

    /// Manual refresh. Failures are part of the returned view.
    pub async fn refresh(&self) -> OverviewView {
        let _ = self.dashboard.refresh().await;
        self.overview()
    }

    pub fn table(&self, table: DashboardTable, query: &TableQuery) -> Result<TableView, ViewError> {
        let state = self.dashboard.current();
        let snapshot = state.data.as_deref().ok_or(ViewError::NotLoaded)?;
        build_table(snapshot, table, query)
    }

    pub fn brand_ranking(&self) -> Result<Vec<BrandRankRow>, ViewError> {
        let state = self.dashboard.current();
        let snapshot = state.data.as_deref().ok_or(ViewError::NotLoaded)?;
        Ok(build_brand_ranking(snapshot))
    }

    /// Select `brand` and describe this request's own outcome. A failed
    /// fetch falls back to the brand's cached metrics.
    pub async fn brand(&self, brand: &str) -> BrandView {
        let result = self.brands.select_brand(brand).await;
        let selection = self.brands.current();
        let is_fetching =
            selection.brand.as_deref() == Some(brand) && selection.state.is_fetching();

        match result {
            Ok(metrics) => BrandView {
                brand: brand.to_string(),
                status: ConnectionStatus::Ready,
                error_message: None,
                is_fetching,
                metrics: Some(metrics.as_ref().clone()),
            },
            Err(e) => BrandView {
                brand: brand.to_string(),
                status: ConnectionStatus::ConnectionError,
                error_message: Some(e.user_message()),
                is_fetching,
                metrics: self.brands.cached(brand).map(|m| m.as_ref().clone()),
            },
        }
    }

    pub fn clear_brand(&self) {
        self.brands.clear_selection();
    }

    pub async fn brand_analysis(&self, brand: &str) -> Result<BrandAnalysisView, FetchError> {
        let analysis = self.brands.detailed_analysis(brand).await?;
        Ok(build_brand_analysis(&analysis))
    }
}
