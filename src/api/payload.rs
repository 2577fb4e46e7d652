use clap::{Args, ValueEnum};
use serde::{Deserialize, Deserializer, Serialize};

use super::clamp;
use crate::core::{
    AnnuityTiming, CompoundingFrequency, GoalSolveConfig, GoalType, HeartRateProfile,
    InflationRate, MaxHeartRateFormula, PresentValue, PresentValueInput, PresentValueMode,
    ProjectionInput, ProjectionResult, YearlyProjectionRow, adjust_with, annuity_future_value,
    compound_maturity, effective_annual_rate, karvonen_target, karvonen_zones, present_value,
    project, real_value, recurring_deposit_maturity, solve_goal,
};
use crate::error::Result;

pub trait Calculation {
    const NAME: &'static str;
    type Output: Serialize;

    fn run(self) -> Result<Self::Output>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiFrequency {
    #[serde(alias = "annual", alias = "yearly")]
    Annually,
    #[serde(alias = "semiAnnually", alias = "semi_annually", alias = "semiannually")]
    SemiAnnually,
    Quarterly,
    Monthly,
    Daily,
}

impl From<ApiFrequency> for CompoundingFrequency {
    fn from(value: ApiFrequency) -> Self {
        match value {
            ApiFrequency::Annually => CompoundingFrequency::Annually,
            ApiFrequency::SemiAnnually => CompoundingFrequency::SemiAnnually,
            ApiFrequency::Quarterly => CompoundingFrequency::Quarterly,
            ApiFrequency::Monthly => CompoundingFrequency::Monthly,
            ApiFrequency::Daily => CompoundingFrequency::Daily,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiTiming {
    #[serde(alias = "end")]
    Ordinary,
    #[serde(alias = "start", alias = "beginning")]
    Due,
}

impl From<ApiTiming> for AnnuityTiming {
    fn from(value: ApiTiming) -> Self {
        match value {
            ApiTiming::Ordinary => AnnuityTiming::Ordinary,
            ApiTiming::Due => AnnuityTiming::Due,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiPresentValueMode {
    #[serde(alias = "lump-sum", alias = "lumpSum")]
    Single,
    Annuity,
    Perpetuity,
}

impl From<ApiPresentValueMode> for PresentValueMode {
    fn from(value: ApiPresentValueMode) -> Self {
        match value {
            ApiPresentValueMode::Single => PresentValueMode::Single,
            ApiPresentValueMode::Annuity => PresentValueMode::Annuity,
            ApiPresentValueMode::Perpetuity => PresentValueMode::Perpetuity,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiInflationSource {
    Custom,
    Historical,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiGoalType {
    #[serde(alias = "contribution", alias = "requiredContribution")]
    RequiredContribution,
    #[serde(alias = "rate", alias = "requiredRate")]
    RequiredRate,
}

impl From<ApiGoalType> for GoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::RequiredContribution => GoalType::RequiredContribution,
            ApiGoalType::RequiredRate => GoalType::RequiredRate,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiHeartRateFormula {
    #[serde(alias = "haskell-fox")]
    Classic,
    Tanaka,
}

impl From<ApiHeartRateFormula> for MaxHeartRateFormula {
    fn from(value: ApiHeartRateFormula) -> Self {
        match value {
            ApiHeartRateFormula::Classic => MaxHeartRateFormula::Classic,
            ApiHeartRateFormula::Tanaka => MaxHeartRateFormula::Tanaka,
        }
    }
}

// Unparsable values become NaN and the clamp layer floors them.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(v)) => Some(v),
        Some(Raw::Text(s)) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '_').collect();
            Some(cleaned.trim().parse::<f64>().unwrap_or(f64::NAN))
        }
        Some(Raw::Other(_)) => Some(f64::NAN),
    })
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct CompoundPayload {
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub principal: Option<f64>,
    #[arg(long, help = "Annual rate in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_rate: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub term_years: Option<f64>,
    #[arg(long, value_enum)]
    pub compounding: Option<ApiFrequency>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResponse {
    pub principal: f64,
    pub annual_rate: f64,
    pub term_years: u32,
    pub compounding: CompoundingFrequency,
    pub maturity_value: f64,
    pub interest_earned: f64,
    pub effective_rate: f64,
    pub rows: Vec<YearlyProjectionRow>,
}

impl Calculation for CompoundPayload {
    const NAME: &'static str = "compound";
    type Output = CompoundResponse;

    fn run(self) -> Result<CompoundResponse> {
        let principal = clamp::money("principal", self.principal, 25_000.0);
        let annual_rate = clamp::rate_percent("annualRate", self.annual_rate, 5.0);
        let term_years =
            clamp::whole_number("termYears", self.term_years, 5, 1, clamp::MAX_YEARS);
        let compounding: CompoundingFrequency =
            self.compounding.unwrap_or(ApiFrequency::Quarterly).into();

        let maturity_value = compound_maturity(principal, annual_rate, term_years as f64, compounding);
        let projection = project(&ProjectionInput {
            principal,
            periodic_contribution: 0.0,
            contribution_frequency: compounding,
            contribution_timing: AnnuityTiming::Ordinary,
            annual_rate,
            term_years,
            compounding,
            inflation_rate: None,
            tax_rate: None,
        });

        Ok(CompoundResponse {
            principal,
            annual_rate,
            term_years,
            compounding,
            maturity_value,
            interest_earned: maturity_value - principal,
            effective_rate: effective_annual_rate(annual_rate, compounding),
            rows: projection.rows,
        })
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct RecurringDepositPayload {
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub monthly_installment: Option<f64>,
    #[arg(long, help = "Annual rate in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_rate: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub months: Option<f64>,
    #[arg(long, value_enum)]
    pub compounding: Option<ApiFrequency>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringDepositResponse {
    pub monthly_installment: f64,
    pub annual_rate: f64,
    pub months: u32,
    pub compounding: CompoundingFrequency,
    pub total_deposited: f64,
    pub maturity_value: f64,
    pub interest_earned: f64,
}

impl Calculation for RecurringDepositPayload {
    const NAME: &'static str = "recurring-deposit";
    type Output = RecurringDepositResponse;

    fn run(self) -> Result<RecurringDepositResponse> {
        let installment = clamp::money("monthlyInstallment", self.monthly_installment, 5_000.0);
        let annual_rate = clamp::rate_percent("annualRate", self.annual_rate, 6.5);
        let months = clamp::whole_number("months", self.months, 12, 1, clamp::MAX_MONTHS);
        let compounding: CompoundingFrequency =
            self.compounding.unwrap_or(ApiFrequency::Quarterly).into();

        let maturity_value = recurring_deposit_maturity(installment, annual_rate, months, compounding);
        let total_deposited = installment * months as f64;
        Ok(RecurringDepositResponse {
            monthly_installment: installment,
            annual_rate,
            months,
            compounding,
            total_deposited,
            maturity_value,
            interest_earned: maturity_value - total_deposited,
        })
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnuityPayload {
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub payment: Option<f64>,
    #[arg(long, help = "Annual rate in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_rate: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub periods: Option<f64>,
    #[arg(long, value_enum)]
    pub frequency: Option<ApiFrequency>,
    #[arg(long, value_enum)]
    pub timing: Option<ApiTiming>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnuityResponse {
    pub payment: f64,
    pub annual_rate: f64,
    pub periods: u32,
    pub frequency: CompoundingFrequency,
    pub timing: AnnuityTiming,
    pub future_value: f64,
    pub total_paid: f64,
    pub interest_earned: f64,
}

impl Calculation for AnnuityPayload {
    const NAME: &'static str = "annuity";
    type Output = AnnuityResponse;

    fn run(self) -> Result<AnnuityResponse> {
        let payment = clamp::money("payment", self.payment, 500.0);
        let annual_rate = clamp::rate_percent("annualRate", self.annual_rate, 8.0);
        let frequency: CompoundingFrequency =
            self.frequency.unwrap_or(ApiFrequency::Monthly).into();
        let periods =
            clamp::whole_number("periods", self.periods, 240, 1, clamp::max_periods(frequency));
        let timing: AnnuityTiming = self.timing.unwrap_or(ApiTiming::Ordinary).into();

        let future_value = annuity_future_value(payment, annual_rate, periods, frequency, timing);
        let total_paid = payment * periods as f64;
        Ok(AnnuityResponse {
            payment,
            annual_rate,
            periods,
            frequency,
            timing,
            future_value,
            total_paid,
            interest_earned: future_value - total_paid,
        })
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct PresentValuePayload {
    #[arg(long, value_enum)]
    pub mode: Option<ApiPresentValueMode>,
    #[arg(long, help = "Future value for single mode, per-period cash flow otherwise")]
    #[serde(deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[arg(long, help = "Annual discount rate in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub discount_rate: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub years: Option<f64>,
    #[arg(long, value_enum)]
    pub frequency: Option<ApiFrequency>,
    #[arg(long, value_enum)]
    pub timing: Option<ApiTiming>,
    #[arg(long, help = "Perpetuity growth rate in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentValueResponse {
    pub mode: PresentValueMode,
    pub amount: f64,
    pub discount_rate: f64,
    pub years: u32,
    pub present_value: PresentValue,
}

impl Calculation for PresentValuePayload {
    const NAME: &'static str = "present-value";
    type Output = PresentValueResponse;

    fn run(self) -> Result<PresentValueResponse> {
        let mode: PresentValueMode = self.mode.unwrap_or(ApiPresentValueMode::Single).into();
        let amount = clamp::money("amount", self.amount, 10_000.0);
        let discount_rate = clamp::rate_percent("discountRate", self.discount_rate, 5.0);
        let years = clamp::whole_number("years", self.years, 10, 1, clamp::MAX_YEARS);
        let growth_rate = clamp::rate_percent("growthRate", self.growth_rate, 0.0);

        let present_value = present_value(PresentValueInput {
            mode,
            amount,
            annual_discount_rate: discount_rate,
            years: years as f64,
            frequency: self.frequency.unwrap_or(ApiFrequency::Annually).into(),
            timing: self.timing.unwrap_or(ApiTiming::Ordinary).into(),
            growth_rate,
        });

        Ok(PresentValueResponse {
            mode,
            amount,
            discount_rate,
            years,
            present_value,
        })
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct InflationPayload {
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[arg(long, value_enum)]
    pub source: Option<ApiInflationSource>,
    #[arg(long, help = "Annual inflation in percent, custom source only")]
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_rate: Option<f64>,
    #[arg(long, help = "First calendar year, historical source only")]
    #[serde(deserialize_with = "lenient_f64")]
    pub from_year: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub years: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationResponse {
    pub amount: f64,
    pub source: ApiInflationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_year: Option<i32>,
    pub years: u32,
    pub annual_rate: f64,
    pub adjusted_amount: f64,
    pub purchasing_power: f64,
}

impl Calculation for InflationPayload {
    const NAME: &'static str = "inflation";
    type Output = InflationResponse;

    fn run(self) -> Result<InflationResponse> {
        let amount = clamp::money("amount", self.amount, 1_000.0);
        let years = clamp::whole_number("years", self.years, 10, 0, clamp::MAX_YEARS);
        let source = self.source.unwrap_or(ApiInflationSource::Custom);
        let (rate, from_year) = match source {
            ApiInflationSource::Custom => (
                InflationRate::Custom(clamp::rate_percent("annualRate", self.annual_rate, 3.0)),
                None,
            ),
            ApiInflationSource::Historical => {
                let from_year = clamp::calendar_year("fromYear", self.from_year, 2000);
                (InflationRate::Historical { from_year }, Some(from_year))
            }
        };

        let (adjusted_amount, annual_rate) = adjust_with(amount, rate, years);
        Ok(InflationResponse {
            amount,
            source,
            from_year,
            years,
            annual_rate,
            adjusted_amount,
            purchasing_power: real_value(amount, annual_rate, years as f64),
        })
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionPayload {
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub principal: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub contribution: Option<f64>,
    #[arg(long, value_enum)]
    pub contribution_frequency: Option<ApiFrequency>,
    #[arg(long, value_enum)]
    pub contribution_timing: Option<ApiTiming>,
    #[arg(long, help = "Annual rate in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub annual_rate: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub term_years: Option<f64>,
    #[arg(long, value_enum)]
    pub compounding: Option<ApiFrequency>,
    #[arg(long, help = "Annual inflation in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub inflation_rate: Option<f64>,
    #[arg(long, help = "Tax on growth in percent")]
    #[serde(deserialize_with = "lenient_f64")]
    pub tax_rate: Option<f64>,
}

impl ProjectionPayload {
    pub fn into_input(self) -> ProjectionInput {
        let compounding: CompoundingFrequency =
            self.compounding.unwrap_or(ApiFrequency::Monthly).into();
        ProjectionInput {
            principal: clamp::money("principal", self.principal, 10_000.0),
            periodic_contribution: clamp::money("contribution", self.contribution, 500.0),
            contribution_frequency: self
                .contribution_frequency
                .map(CompoundingFrequency::from)
                .unwrap_or(compounding),
            contribution_timing: self
                .contribution_timing
                .unwrap_or(ApiTiming::Ordinary)
                .into(),
            annual_rate: clamp::rate_percent("annualRate", self.annual_rate, 7.0),
            term_years: clamp::whole_number("termYears", self.term_years, 20, 1, clamp::MAX_YEARS),
            compounding,
            inflation_rate: clamp::optional_rate_percent("inflationRate", self.inflation_rate),
            tax_rate: clamp::optional_rate_percent("taxRate", self.tax_rate)
                .map(|rate| rate.min(1.0)),
        }
    }
}

impl Calculation for ProjectionPayload {
    const NAME: &'static str = "projection";
    type Output = ProjectionResult;

    fn run(self) -> Result<ProjectionResult> {
        Ok(project(&self.into_input()))
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalPayload {
    #[arg(long, value_enum)]
    pub goal: Option<ApiGoalType>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub target_balance: Option<f64>,
    #[arg(long, help = "Lower search bound; percent for the rate goal")]
    #[serde(deserialize_with = "lenient_f64")]
    pub search_min: Option<f64>,
    #[arg(long, help = "Upper search bound; percent for the rate goal")]
    #[serde(deserialize_with = "lenient_f64")]
    pub search_max: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub tolerance: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub max_iterations: Option<f64>,
    #[command(flatten)]
    #[serde(flatten)]
    pub projection: ProjectionPayload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalIterationResponse {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub balance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub goal: &'static str,
    pub target_balance: f64,
    // Periodic contribution, or annual rate in percent for the rate goal.
    pub solved_value: Option<f64>,
    pub achieved_balance: Option<f64>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
    pub iterations: Vec<GoalIterationResponse>,
}

impl Calculation for GoalPayload {
    const NAME: &'static str = "goal";
    type Output = GoalResponse;

    fn run(self) -> Result<GoalResponse> {
        let goal_type: GoalType = self.goal.unwrap_or(ApiGoalType::RequiredContribution).into();
        let target_balance = clamp::money("targetBalance", self.target_balance, 1_000_000.0);
        // Rate bounds travel as percent, contribution bounds as money.
        let scale = match goal_type {
            GoalType::RequiredContribution => 1.0,
            GoalType::RequiredRate => 100.0,
        };
        let (search_min, search_max, tolerance) = match goal_type {
            GoalType::RequiredContribution => (
                clamp::money("searchMin", self.search_min, 0.0),
                clamp::money("searchMax", self.search_max, target_balance.max(1.0)),
                clamp::money("tolerance", self.tolerance, 0.01),
            ),
            GoalType::RequiredRate => (
                clamp::rate_percent("searchMin", self.search_min, 0.0),
                clamp::rate_percent("searchMax", self.search_max, clamp::MAX_RATE_PERCENT),
                clamp::money("tolerance", self.tolerance, 1e-4) / scale,
            ),
        };
        let config = GoalSolveConfig {
            goal_type,
            target_balance,
            search_min,
            search_max,
            tolerance,
            max_iterations: clamp::whole_number("maxIterations", self.max_iterations, 100, 1, 1_000),
        };

        let result = solve_goal(&self.projection.into_input(), config)?;
        Ok(GoalResponse {
            goal: match result.goal_type {
                GoalType::RequiredContribution => "required-contribution",
                GoalType::RequiredRate => "required-rate",
            },
            target_balance: result.target_balance,
            solved_value: result.solved_value.map(|value| value * scale),
            achieved_balance: result.achieved_balance,
            converged: result.converged,
            feasible: result.feasible,
            message: result.message,
            iterations: result
                .iterations
                .iter()
                .map(|it| GoalIterationResponse {
                    iteration: it.iteration,
                    lower_bound: it.lower_bound * scale,
                    upper_bound: it.upper_bound * scale,
                    candidate_value: it.candidate_value * scale,
                    balance: it.balance,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Args)]
#[serde(default, rename_all = "camelCase")]
pub struct HeartRatePayload {
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub age: Option<f64>,
    #[arg(long)]
    #[serde(deserialize_with = "lenient_f64")]
    pub resting_heart_rate: Option<f64>,
    #[arg(long, value_enum)]
    pub formula: Option<ApiHeartRateFormula>,
    #[arg(long, help = "Training intensity in percent of heart-rate reserve")]
    #[serde(deserialize_with = "lenient_f64")]
    pub intensity: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateResponse {
    #[serde(flatten)]
    pub profile: HeartRateProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_heart_rate: Option<f64>,
}

impl Calculation for HeartRatePayload {
    const NAME: &'static str = "heart-rate";
    type Output = HeartRateResponse;

    fn run(self) -> Result<HeartRateResponse> {
        let age = clamp::whole_number("age", self.age, 30, 1, 120);
        let resting = clamp::bounded("restingHeartRate", self.resting_heart_rate, 70.0, 30.0, 220.0);
        let formula: MaxHeartRateFormula =
            self.formula.unwrap_or(ApiHeartRateFormula::Classic).into();
        let intensity = self
            .intensity
            .map(|v| clamp::bounded("intensity", Some(v), 0.0, 0.0, 100.0) / 100.0);

        let profile = karvonen_zones(age, resting, formula)?;
        Ok(HeartRateResponse {
            profile,
            target_heart_rate: intensity.map(|i| karvonen_target(age, resting, i, formula)),
        })
    }
}
