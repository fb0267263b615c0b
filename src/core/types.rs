use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInput {
    pub monthly_deposit: f64,
    pub annual_rate_percent: f64,
    pub horizon_months: u32,
    pub annual_inflation_percent: f64,
}

impl ProjectionInput {
    pub fn new(monthly_deposit: f64, annual_rate_percent: f64, horizon_months: u32) -> Self {
        Self {
            monthly_deposit,
            annual_rate_percent,
            horizon_months,
            annual_inflation_percent: 0.0,
        }
    }

    pub fn with_inflation(mut self, annual_inflation_percent: f64) -> Self {
        self.annual_inflation_percent = annual_inflation_percent;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub future_value: f64,
    pub total_contributions: f64,
    pub total_gain: f64,
    pub real_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub year: u32,
    pub invested: f64,
    pub saved: f64,
    pub real_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondYearPoint {
    pub year: u32,
    pub nominal: f64,
    pub invested: f64,
}
