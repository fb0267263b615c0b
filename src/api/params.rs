use std::ops::RangeInclusive;

use clap::{Args, ValueEnum};
use serde::Deserialize;

use crate::core::{
    ADULTHOOD_AGE, BondProduct, BondSimulationParams, ConsentLevel, DEFAULT_INFLATION_PERCENT,
    DEFAULT_MONTHLY_DEPOSIT, DEFAULT_SAFETY_PERCENT, DEFAULT_SIMULATION_YEARS, ProjectionInput,
    horizon_months_until_adulthood,
};

const DEPOSIT_RANGE: RangeInclusive<f64> = 100.0..=2_000.0;
const RATE_RANGE: RangeInclusive<f64> = 0.0..=12.0;
const FIRST_YEAR_RATE_RANGE: RangeInclusive<f64> = 0.0..=10.0;
const MARGIN_RANGE: RangeInclusive<f64> = 0.0..=5.0;
const INFLATION_RANGE: RangeInclusive<f64> = 0.0..=15.0;
const ALLOCATION_AMOUNT_RANGE: RangeInclusive<f64> = 0.0..=1_000_000.0;
const MAX_SERIES_YEAR: u32 = 50;
const MAX_BOND_YEARS: u32 = 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliBondProduct {
    Ros,
    Rod,
    Coi,
    Edo,
}

impl From<CliBondProduct> for BondProduct {
    fn from(value: CliBondProduct) -> Self {
        match value {
            CliBondProduct::Ros => BondProduct::Ros,
            CliBondProduct::Rod => BondProduct::Rod,
            CliBondProduct::Coi => BondProduct::Coi,
            CliBondProduct::Edo => BondProduct::Edo,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ApiBondProduct {
    #[serde(alias = "ROS")]
    Ros,
    #[serde(alias = "ROD")]
    Rod,
    #[serde(alias = "COI")]
    Coi,
    #[serde(alias = "EDO")]
    Edo,
}

impl From<ApiBondProduct> for CliBondProduct {
    fn from(value: ApiBondProduct) -> Self {
        match value {
            ApiBondProduct::Ros => CliBondProduct::Ros,
            ApiBondProduct::Rod => CliBondProduct::Rod,
            ApiBondProduct::Coi => CliBondProduct::Coi,
            ApiBondProduct::Edo => CliBondProduct::Edo,
        }
    }
}

pub fn parse_consent_level(raw: &str) -> Result<ConsentLevel, String> {
    ConsentLevel::parse(raw).ok_or_else(|| format!("unknown consent level '{raw}'"))
}

#[derive(Args, Debug, Clone)]
pub struct CalculatorArgs {
    #[arg(long, default_value_t = 0, help = "Child's current age in years (0-17)")]
    pub child_age: u32,
    #[arg(long, default_value_t = 800.0, help = "Monthly deposit (100-2000)")]
    pub monthly_deposit: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return in percent (0-12)"
    )]
    pub annual_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Expected annual inflation in percent (0-15); 0 skips the real value"
    )]
    pub inflation: f64,
}

impl Default for CalculatorArgs {
    fn default() -> Self {
        Self {
            child_age: 0,
            monthly_deposit: DEFAULT_MONTHLY_DEPOSIT,
            annual_rate: 7.0,
            inflation: 0.0,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SeriesArgs {
    #[arg(long, default_value_t = 0)]
    pub start_year: u32,
    #[arg(long, default_value_t = 18)]
    pub end_year: u32,
    #[arg(long, default_value_t = 2, help = "Sampling step in years")]
    pub step_years: u32,
    #[arg(long, default_value_t = 800.0, help = "Monthly deposit (100-2000)")]
    pub monthly_deposit: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Annual return of the invested line in percent (0-12)"
    )]
    pub annual_rate: f64,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Annual inflation eroding the saved line in percent (0-15)"
    )]
    pub inflation: f64,
}

impl Default for SeriesArgs {
    fn default() -> Self {
        Self {
            start_year: 0,
            end_year: ADULTHOOD_AGE,
            step_years: 2,
            monthly_deposit: DEFAULT_MONTHLY_DEPOSIT,
            annual_rate: 7.0,
            inflation: DEFAULT_INFLATION_PERCENT,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BondArgs {
    #[arg(long, value_enum, default_value_t = CliBondProduct::Edo)]
    pub product: CliBondProduct,
    #[arg(
        long,
        help = "First-year rate in percent (0-10), defaults to the product's offer"
    )]
    pub first_year_rate: Option<f64>,
    #[arg(
        long,
        help = "Margin over inflation in percent (0-5), defaults to the product's offer"
    )]
    pub margin: Option<f64>,
    #[arg(
        long,
        default_value_t = 2.5,
        help = "Average inflation after the first year in percent (0-15)"
    )]
    pub inflation: f64,
    #[arg(long, default_value_t = 800.0, help = "Monthly deposit (100-2000)")]
    pub monthly_deposit: f64,
    #[arg(long, default_value_t = 18, help = "Years to simulate (1-30)")]
    pub years: u32,
}

impl Default for BondArgs {
    fn default() -> Self {
        Self {
            product: CliBondProduct::Edo,
            first_year_rate: None,
            margin: None,
            inflation: DEFAULT_INFLATION_PERCENT,
            monthly_deposit: DEFAULT_MONTHLY_DEPOSIT,
            years: DEFAULT_SIMULATION_YEARS,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AllocationArgs {
    #[arg(long, default_value_t = 800.0, help = "Amount invested each month")]
    pub monthly_amount: f64,
    #[arg(
        long,
        default_value_t = 40,
        help = "Bond share of the non-gold part in percent (0-100)"
    )]
    pub safety_percent: u32,
    #[arg(long, help = "Set aside 10% for gold")]
    pub include_gold: bool,
}

impl Default for AllocationArgs {
    fn default() -> Self {
        Self {
            monthly_amount: DEFAULT_MONTHLY_DEPOSIT,
            safety_percent: DEFAULT_SAFETY_PERCENT,
            include_gold: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ProjectionPayload {
    child_age: Option<u32>,
    monthly_deposit: Option<f64>,
    annual_rate: Option<f64>,
    inflation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct SeriesPayload {
    start_year: Option<u32>,
    end_year: Option<u32>,
    step_years: Option<u32>,
    monthly_deposit: Option<f64>,
    annual_rate: Option<f64>,
    inflation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct BondPayload {
    product: Option<ApiBondProduct>,
    first_year_rate: Option<f64>,
    margin: Option<f64>,
    inflation: Option<f64>,
    monthly_deposit: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AllocationPayload {
    monthly_amount: Option<f64>,
    safety_percent: Option<u32>,
    include_gold: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct WizardPayload {
    pub(crate) step: Option<String>,
    pub(crate) option: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionRequest {
    pub child_age: u32,
    pub input: ProjectionInput,
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesRequest {
    pub start_year: u32,
    pub end_year: u32,
    pub step_years: u32,
    pub monthly_deposit: f64,
    pub annual_rate: f64,
    pub inflation: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BondRequest {
    pub product: BondProduct,
    pub params: BondSimulationParams,
}

#[derive(Debug, Clone, Copy)]
pub struct AllocationRequest {
    pub monthly_amount: f64,
    pub safety_percent: u32,
    pub include_gold: bool,
}

fn check_range(name: &str, value: f64, range: RangeInclusive<f64>) -> Result<(), String> {
    if !value.is_finite() || !range.contains(&value) {
        return Err(format!(
            "{name} must be between {} and {}",
            range.start(),
            range.end()
        ));
    }
    Ok(())
}

pub fn build_projection_request(args: &CalculatorArgs) -> Result<ProjectionRequest, String> {
    if args.child_age >= ADULTHOOD_AGE {
        return Err(format!(
            "--child-age must be between 0 and {}",
            ADULTHOOD_AGE - 1
        ));
    }
    check_range("--monthly-deposit", args.monthly_deposit, DEPOSIT_RANGE)?;
    check_range("--annual-rate", args.annual_rate, RATE_RANGE)?;
    check_range("--inflation", args.inflation, INFLATION_RANGE)?;

    let horizon_months = horizon_months_until_adulthood(args.child_age).map_err(|e| e.to_string())?;

    Ok(ProjectionRequest {
        child_age: args.child_age,
        input: ProjectionInput::new(args.monthly_deposit, args.annual_rate, horizon_months)
            .with_inflation(args.inflation),
    })
}

pub fn build_series_request(args: &SeriesArgs) -> Result<SeriesRequest, String> {
    if args.step_years == 0 {
        return Err("--step-years must be > 0".to_string());
    }
    if args.end_year > MAX_SERIES_YEAR {
        return Err(format!("--end-year must be <= {MAX_SERIES_YEAR}"));
    }
    if args.start_year > args.end_year {
        return Err("--start-year must be <= --end-year".to_string());
    }
    check_range("--monthly-deposit", args.monthly_deposit, DEPOSIT_RANGE)?;
    check_range("--annual-rate", args.annual_rate, RATE_RANGE)?;
    check_range("--inflation", args.inflation, INFLATION_RANGE)?;

    Ok(SeriesRequest {
        start_year: args.start_year,
        end_year: args.end_year,
        step_years: args.step_years,
        monthly_deposit: args.monthly_deposit,
        annual_rate: args.annual_rate,
        inflation: args.inflation,
    })
}

pub fn build_bond_request(args: &BondArgs) -> Result<BondRequest, String> {
    let product = BondProduct::from(args.product);
    let defaults = BondSimulationParams::for_product(product);
    let first_year_rate = args.first_year_rate.unwrap_or(defaults.first_year_rate);
    let margin = args.margin.unwrap_or(defaults.margin);

    check_range("--first-year-rate", first_year_rate, FIRST_YEAR_RATE_RANGE)?;
    check_range("--margin", margin, MARGIN_RANGE)?;
    check_range("--inflation", args.inflation, INFLATION_RANGE)?;
    check_range("--monthly-deposit", args.monthly_deposit, DEPOSIT_RANGE)?;
    if !(1..=MAX_BOND_YEARS).contains(&args.years) {
        return Err(format!("--years must be between 1 and {MAX_BOND_YEARS}"));
    }

    Ok(BondRequest {
        product,
        params: BondSimulationParams {
            first_year_rate,
            margin,
            inflation: args.inflation,
            monthly_deposit: args.monthly_deposit,
            years: args.years,
        },
    })
}

pub fn build_allocation_request(args: &AllocationArgs) -> Result<AllocationRequest, String> {
    check_range("--monthly-amount", args.monthly_amount, ALLOCATION_AMOUNT_RANGE)?;
    if args.safety_percent > 100 {
        return Err("--safety-percent must be between 0 and 100".to_string());
    }

    Ok(AllocationRequest {
        monthly_amount: args.monthly_amount,
        safety_percent: args.safety_percent,
        include_gold: args.include_gold,
    })
}

pub(crate) fn projection_request_from_payload(
    payload: ProjectionPayload,
) -> Result<ProjectionRequest, String> {
    let mut args = CalculatorArgs::default();
    if let Some(v) = payload.child_age {
        args.child_age = v;
    }
    if let Some(v) = payload.monthly_deposit {
        args.monthly_deposit = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }
    build_projection_request(&args)
}

pub(crate) fn series_request_from_payload(payload: SeriesPayload) -> Result<SeriesRequest, String> {
    let mut args = SeriesArgs::default();
    if let Some(v) = payload.start_year {
        args.start_year = v;
    }
    if let Some(v) = payload.end_year {
        args.end_year = v;
    }
    if let Some(v) = payload.step_years {
        args.step_years = v;
    }
    if let Some(v) = payload.monthly_deposit {
        args.monthly_deposit = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }
    build_series_request(&args)
}

pub(crate) fn bond_request_from_payload(payload: BondPayload) -> Result<BondRequest, String> {
    let mut args = BondArgs::default();
    if let Some(v) = payload.product {
        args.product = v.into();
    }
    if let Some(v) = payload.first_year_rate {
        args.first_year_rate = Some(v);
    }
    if let Some(v) = payload.margin {
        args.margin = Some(v);
    }
    if let Some(v) = payload.inflation {
        args.inflation = v;
    }
    if let Some(v) = payload.monthly_deposit {
        args.monthly_deposit = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    build_bond_request(&args)
}

pub(crate) fn allocation_request_from_payload(
    payload: AllocationPayload,
) -> Result<AllocationRequest, String> {
    let mut args = AllocationArgs::default();
    if let Some(v) = payload.monthly_amount {
        args.monthly_amount = v;
    }
    if let Some(v) = payload.safety_percent {
        args.safety_percent = v;
    }
    if let Some(v) = payload.include_gold {
        args.include_gold = v;
    }
    build_allocation_request(&args)
}
