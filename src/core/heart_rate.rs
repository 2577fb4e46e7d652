use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaxHeartRateFormula {
    Classic,
    Tanaka,
}

impl MaxHeartRateFormula {
    pub fn max_heart_rate(self, age: u32) -> f64 {
        let age = age as f64;
        match self {
            MaxHeartRateFormula::Classic => 220.0 - age,
            MaxHeartRateFormula::Tanaka => 208.0 - 0.7 * age,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateZone {
    pub zone: u8,
    pub name: &'static str,
    pub min_intensity: f64,
    pub max_intensity: f64,
    pub min_bpm: f64,
    pub max_bpm: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRateProfile {
    pub age: u32,
    pub resting_heart_rate: f64,
    pub formula: MaxHeartRateFormula,
    pub max_heart_rate: f64,
    pub heart_rate_reserve: f64,
    pub zones: Vec<HeartRateZone>,
}

const ZONES: [(&str, f64, f64); 5] = [
    ("Recovery", 0.50, 0.60),
    ("Aerobic base", 0.60, 0.70),
    ("Aerobic", 0.70, 0.80),
    ("Threshold", 0.80, 0.90),
    ("Maximum", 0.90, 1.00),
];

pub fn heart_rate_reserve(age: u32, resting_heart_rate: f64, formula: MaxHeartRateFormula) -> f64 {
    formula.max_heart_rate(age) - resting_heart_rate
}

pub fn karvonen_target(
    age: u32,
    resting_heart_rate: f64,
    intensity: f64,
    formula: MaxHeartRateFormula,
) -> f64 {
    resting_heart_rate + heart_rate_reserve(age, resting_heart_rate, formula) * intensity
}

pub fn karvonen_zones(
    age: u32,
    resting_heart_rate: f64,
    formula: MaxHeartRateFormula,
) -> Result<HeartRateProfile> {
    let max_heart_rate = formula.max_heart_rate(age);
    if !resting_heart_rate.is_finite() || resting_heart_rate <= 0.0 {
        return Err(Error::InvalidInput(
            "resting heart rate must be > 0".to_string(),
        ));
    }
    if resting_heart_rate >= max_heart_rate {
        return Err(Error::InvalidInput(format!(
            "resting heart rate {resting_heart_rate} must be below max heart rate {max_heart_rate}"
        )));
    }

    let zones = ZONES
        .iter()
        .enumerate()
        .map(|(idx, &(name, lo, hi))| HeartRateZone {
            zone: idx as u8 + 1,
            name,
            min_intensity: lo,
            max_intensity: hi,
            min_bpm: karvonen_target(age, resting_heart_rate, lo, formula),
            max_bpm: karvonen_target(age, resting_heart_rate, hi, formula),
        })
        .collect();

    Ok(HeartRateProfile {
        age,
        resting_heart_rate,
        formula,
        max_heart_rate,
        heart_rate_reserve: max_heart_rate - resting_heart_rate,
        zones,
    })
}
