use serde::Serialize;

use super::engine::{MONTHS_PER_YEAR, compute_year_by_year_bond_accrual};
use super::error::Result;
use super::types::BondYearPoint;
use super::wizard::WizardStep;

pub const DEFAULT_INFLATION_PERCENT: f64 = 2.5;
pub const DEFAULT_MONTHLY_DEPOSIT: f64 = 800.0;
pub const DEFAULT_SIMULATION_YEARS: u32 = 18;

/// Inflation-indexed treasury bonds: a fixed rate in the first year, then
/// inflation plus a margin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BondProduct {
    Ros,
    Rod,
    Coi,
    Edo,
}

impl BondProduct {
    pub const ALL: [BondProduct; 4] = [
        BondProduct::Ros,
        BondProduct::Rod,
        BondProduct::Coi,
        BondProduct::Edo,
    ];

    pub fn code(self) -> &'static str {
        match self {
            BondProduct::Ros => "ROS",
            BondProduct::Rod => "ROD",
            BondProduct::Coi => "COI",
            BondProduct::Edo => "EDO",
        }
    }

    pub fn first_year_rate(self) -> f64 {
        match self {
            BondProduct::Ros => 5.20,
            BondProduct::Rod => 5.85,
            BondProduct::Coi => 5.00,
            BondProduct::Edo => 5.60,
        }
    }

    pub fn margin(self) -> f64 {
        match self {
            BondProduct::Ros => 2.00,
            BondProduct::Rod => 2.50,
            BondProduct::Coi => 1.50,
            BondProduct::Edo => 2.00,
        }
    }

    pub fn maturity_years(self) -> u32 {
        match self {
            BondProduct::Ros => 6,
            BondProduct::Rod => 12,
            BondProduct::Coi => 4,
            BondProduct::Edo => 10,
        }
    }

    // ROS and ROD are sold only to households receiving the 800+ benefit.
    pub fn family_only(self) -> bool {
        matches!(self, BondProduct::Ros | BondProduct::Rod)
    }

    /// The product whose simulator a wizard result step opens with.
    pub fn simulator_for(step: WizardStep) -> Option<BondProduct> {
        match step {
            WizardStep::ResultFamilyBonds => Some(BondProduct::Rod),
            WizardStep::ResultStandardBonds => Some(BondProduct::Edo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondSimulationParams {
    pub first_year_rate: f64,
    pub margin: f64,
    pub inflation: f64,
    pub monthly_deposit: f64,
    pub years: u32,
}

impl BondSimulationParams {
    pub fn for_product(product: BondProduct) -> Self {
        Self {
            first_year_rate: product.first_year_rate(),
            margin: product.margin(),
            inflation: DEFAULT_INFLATION_PERCENT,
            monthly_deposit: DEFAULT_MONTHLY_DEPOSIT,
            years: DEFAULT_SIMULATION_YEARS,
        }
    }

    pub fn subsequent_rate(&self) -> f64 {
        self.inflation + self.margin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondSimulation {
    pub points: Vec<BondYearPoint>,
    pub final_nominal: f64,
    pub total_deposited: f64,
    pub profit: f64,
}

pub fn simulate_bond(params: &BondSimulationParams) -> Result<BondSimulation> {
    let subsequent_rate = params.subsequent_rate();
    let points = compute_year_by_year_bond_accrual(
        params.first_year_rate,
        |_| subsequent_rate,
        params.monthly_deposit,
        params.years,
    )?;

    let final_nominal = points.last().map_or(0.0, |p| p.nominal);
    let total_deposited = params.monthly_deposit * MONTHS_PER_YEAR as f64 * params.years as f64;

    Ok(BondSimulation {
        points,
        final_nominal,
        total_deposited,
        profit: final_nominal - total_deposited,
    })
}
