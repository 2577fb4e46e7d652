use serde::{Serialize, Serializer};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundingFrequency {
    Annually,
    SemiAnnually,
    Quarterly,
    Monthly,
    Daily,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Annually => 1,
            CompoundingFrequency::SemiAnnually => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
            CompoundingFrequency::Daily => 365,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnuityTiming {
    Ordinary,
    Due,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentValueMode {
    Single,
    Annuity,
    Perpetuity,
}

// Rates are fractions (0.05 = 5%).
#[derive(Debug, Clone)]
pub struct ProjectionInput {
    pub principal: f64,
    pub periodic_contribution: f64,
    pub contribution_frequency: CompoundingFrequency,
    pub contribution_timing: AnnuityTiming,
    pub annual_rate: f64,
    pub term_years: u32,
    pub compounding: CompoundingFrequency,
    pub inflation_rate: Option<f64>,
    pub tax_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyProjectionRow {
    pub year: u32,
    pub contributions_to_date: f64,
    pub growth_for_period: f64,
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_tax_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub final_balance: f64,
    pub total_contributed: f64,
    pub total_growth: f64,
    pub effective_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_real_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_after_tax_value: Option<f64>,
    pub rows: Vec<YearlyProjectionRow>,
}

#[derive(Debug, Clone, Copy)]
pub struct PresentValueInput {
    pub mode: PresentValueMode,
    pub amount: f64,
    pub annual_discount_rate: f64,
    pub years: f64,
    pub frequency: CompoundingFrequency,
    pub timing: AnnuityTiming,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresentValue {
    Finite(f64),
    NotFinite,
}

impl PresentValue {
    pub const NOT_FINITE_LABEL: &'static str = "not finite";

    pub fn from_raw(value: f64) -> Self {
        if value.is_finite() {
            PresentValue::Finite(value)
        } else {
            PresentValue::NotFinite
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            PresentValue::Finite(v) => Some(v),
            PresentValue::NotFinite => None,
        }
    }

    pub fn is_finite(self) -> bool {
        matches!(self, PresentValue::Finite(_))
    }
}

impl Serialize for PresentValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PresentValue::Finite(v) => serializer.serialize_f64(*v),
            PresentValue::NotFinite => serializer.serialize_str(Self::NOT_FINITE_LABEL),
        }
    }
}
