mod engine;
mod heart_rate;
mod inflation;
mod solver;
mod types;

pub use engine::{
    annuity_future_value, compound_maturity, contribution_period_rate, contributions_to_date,
    effective_annual_rate, future_value_at, present_value, project, recurring_deposit_maturity,
    yearly_breakdown,
};
pub use heart_rate::{
    HeartRateProfile, HeartRateZone, MaxHeartRateFormula, heart_rate_reserve, karvonen_target,
    karvonen_zones,
};
pub use inflation::{
    DEFAULT_INFLATION_RATE, InflationRate, adjust_with, average_historical_rate, historical_rate,
    inflation_adjust, inflation_adjust_between, real_value,
};
pub use solver::{GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, solve_goal};
pub use types::{
    AnnuityTiming, CompoundingFrequency, PresentValue, PresentValueInput, PresentValueMode,
    ProjectionInput, ProjectionResult, YearlyProjectionRow,
};
