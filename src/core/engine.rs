use super::error::{EngineError, Result};
use super::types::{BondYearPoint, ProjectionInput, ProjectionResult, SeriesPoint};

pub const MONTHS_PER_YEAR: u32 = 12;
pub const ADULTHOOD_AGE: u32 = 18;

pub fn compute_future_value(input: &ProjectionInput) -> Result<ProjectionResult> {
    ensure_non_negative("monthly_deposit", input.monthly_deposit)?;
    ensure_non_negative("annual_rate_percent", input.annual_rate_percent)?;
    ensure_non_negative("annual_inflation_percent", input.annual_inflation_percent)?;

    let future_value = annuity_due_value(
        input.monthly_deposit,
        input.annual_rate_percent,
        input.horizon_months,
    );
    let total_contributions = input.monthly_deposit * input.horizon_months as f64;

    let real_value = if input.annual_inflation_percent > 0.0 {
        let years = input.horizon_months as f64 / MONTHS_PER_YEAR as f64;
        Some(compute_real_value(
            future_value,
            input.annual_inflation_percent,
            years,
        )?)
    } else {
        None
    };

    Ok(ProjectionResult {
        future_value,
        total_contributions,
        total_gain: future_value - total_contributions,
        real_value,
    })
}

pub fn compute_real_value(
    nominal_amount: f64,
    annual_inflation_percent: f64,
    years: f64,
) -> Result<f64> {
    if !nominal_amount.is_finite() {
        return Err(EngineError::invalid_input(
            "nominal_amount",
            "must be finite",
        ));
    }
    ensure_non_negative("annual_inflation_percent", annual_inflation_percent)?;
    ensure_non_negative("years", years)?;

    Ok(nominal_amount / (1.0 + annual_inflation_percent / 100.0).powf(years))
}

pub fn compute_series(
    start_year: u32,
    end_year: u32,
    step_years: u32,
    monthly_deposit: f64,
    annual_rate_percent: f64,
    annual_inflation_percent: f64,
) -> Result<Vec<SeriesPoint>> {
    if step_years == 0 {
        return Err(EngineError::invalid_input("step_years", "must be > 0"));
    }
    if end_year < start_year {
        return Err(EngineError::invalid_input(
            "end_year",
            format!("must be >= start_year ({start_year})"),
        ));
    }
    ensure_non_negative("monthly_deposit", monthly_deposit)?;
    ensure_non_negative("annual_rate_percent", annual_rate_percent)?;
    ensure_non_negative("annual_inflation_percent", annual_inflation_percent)?;

    (start_year..=end_year)
        .step_by(step_years as usize)
        .map(|year| -> Result<SeriesPoint> {
            let months = year
                .checked_mul(MONTHS_PER_YEAR)
                .ok_or_else(|| EngineError::invalid_input("end_year", "horizon too large"))?;
            let saved = monthly_deposit * months as f64;
            Ok(SeriesPoint {
                year,
                invested: annuity_due_value(monthly_deposit, annual_rate_percent, months),
                saved,
                real_value: compute_real_value(saved, annual_inflation_percent, year as f64)?,
            })
        })
        .collect()
}

/// Accrues monthly deposits year by year, adding each deposit before that
/// month's compounding step. Year 1 earns `initial_rate`; every later year
/// earns whatever `subsequent_rate` returns for it.
///
/// The returned sequence begins with the zero point for year 0.
pub fn compute_year_by_year_bond_accrual(
    initial_rate: f64,
    subsequent_rate: impl Fn(u32) -> f64,
    monthly_deposit: f64,
    years: u32,
) -> Result<Vec<BondYearPoint>> {
    ensure_non_negative("initial_rate", initial_rate)?;
    ensure_non_negative("monthly_deposit", monthly_deposit)?;

    let mut points = vec![BondYearPoint {
        year: 0,
        nominal: 0.0,
        invested: 0.0,
    }];

    let mut balance = 0.0;
    for year in 1..=years {
        let annual_rate = if year == 1 {
            initial_rate
        } else {
            subsequent_rate(year)
        };
        ensure_non_negative("subsequent_rate", annual_rate)?;

        let monthly_rate = annual_rate / 100.0 / MONTHS_PER_YEAR as f64;
        for _ in 0..MONTHS_PER_YEAR {
            balance += monthly_deposit;
            balance *= 1.0 + monthly_rate;
        }

        points.push(BondYearPoint {
            year,
            nominal: balance,
            invested: monthly_deposit * MONTHS_PER_YEAR as f64 * year as f64,
        });
    }

    Ok(points)
}

pub fn horizon_months_until_adulthood(child_age: u32) -> Result<u32> {
    if child_age >= ADULTHOOD_AGE {
        return Err(EngineError::invalid_input(
            "child_age",
            format!("must be < {ADULTHOOD_AGE}"),
        ));
    }
    Ok((ADULTHOOD_AGE - child_age) * MONTHS_PER_YEAR)
}

// Annuity-due: every deposit compounds for the month it is paid in.
fn annuity_due_value(monthly_deposit: f64, annual_rate_percent: f64, months: u32) -> f64 {
    let r = annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64;
    if r > 0.0 {
        let growth = (months as f64 * r.ln_1p()).exp_m1();
        monthly_deposit * (growth / r) * (1.0 + r)
    } else {
        monthly_deposit * months as f64
    }
}

fn ensure_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(EngineError::invalid_input(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(EngineError::invalid_input(field, "must be >= 0"));
    }
    Ok(())
}
