pub const DEFAULT_INFLATION_RATE: f64 = 0.032;

const FIRST_HISTORICAL_YEAR: i32 = 2000;

// CPI-U annual average change, 2000..=2024.
const HISTORICAL_RATES: [f64; 25] = [
    0.034, 0.028, 0.016, 0.023, 0.027, 0.034, 0.032, 0.028, 0.038, -0.004, 0.016, 0.032, 0.021,
    0.015, 0.016, 0.001, 0.013, 0.021, 0.024, 0.018, 0.012, 0.047, 0.080, 0.041, 0.029,
];

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InflationRate {
    Custom(f64),
    Historical { from_year: i32 },
}

pub fn inflation_adjust(amount: f64, annual_rate: f64, years: f64) -> f64 {
    amount * (1.0 + annual_rate).powf(years)
}

pub fn real_value(amount: f64, annual_rate: f64, years: f64) -> f64 {
    amount / (1.0 + annual_rate).powf(years)
}

pub fn historical_rate(year: i32) -> f64 {
    year.checked_sub(FIRST_HISTORICAL_YEAR)
        .and_then(|offset| usize::try_from(offset).ok())
        .and_then(|idx| HISTORICAL_RATES.get(idx).copied())
        .unwrap_or(DEFAULT_INFLATION_RATE)
}

pub fn inflation_adjust_between(amount: f64, from_year: i32, to_year: i32) -> f64 {
    if to_year >= from_year {
        (from_year..to_year).fold(amount, |acc, year| acc * (1.0 + historical_rate(year)))
    } else {
        (to_year..from_year).fold(amount, |acc, year| acc / (1.0 + historical_rate(year)))
    }
}

pub fn average_historical_rate(from_year: i32, to_year: i32) -> f64 {
    let (start, end) = if from_year <= to_year {
        (from_year, to_year)
    } else {
        (to_year, from_year)
    };
    if start == end {
        return historical_rate(start);
    }
    let growth = inflation_adjust_between(1.0, start, end);
    growth.powf(1.0 / (end - start) as f64) - 1.0
}

pub fn adjust_with(amount: f64, rate: InflationRate, years: u32) -> (f64, f64) {
    match rate {
        InflationRate::Custom(annual_rate) => (
            inflation_adjust(amount, annual_rate, years as f64),
            annual_rate,
        ),
        InflationRate::Historical { from_year } => {
            let to_year = from_year.saturating_add(i32::try_from(years).unwrap_or(i32::MAX));
            (
                inflation_adjust_between(amount, from_year, to_year),
                average_historical_rate(from_year, to_year),
            )
        }
    }
}
