mod allocation;
mod bonds;
mod consent;
mod engine;
mod error;
mod types;
mod wizard;

pub use allocation::{Allocation, DEFAULT_SAFETY_PERCENT, GOLD_SHARE_PERCENT, split_portfolio};
pub use bonds::{
    BondProduct, BondSimulation, BondSimulationParams, DEFAULT_INFLATION_PERCENT,
    DEFAULT_MONTHLY_DEPOSIT, DEFAULT_SIMULATION_YEARS, simulate_bond,
};
pub use consent::{ConsentLevel, SessionConfig};
pub use engine::{
    ADULTHOOD_AGE, MONTHS_PER_YEAR, compute_future_value, compute_real_value, compute_series,
    compute_year_by_year_bond_accrual, horizon_months_until_adulthood,
};
pub use error::{EngineError, Result};
pub use types::{BondYearPoint, ProjectionInput, ProjectionResult, SeriesPoint};
pub use wizard::{
    BackTarget, NavigatorEvent, Transition, WizardNavigator, WizardOption, WizardStep, advance,
    back,
};
