use super::inflation::real_value;
use super::types::{
    AnnuityTiming, CompoundingFrequency, PresentValue, PresentValueInput, PresentValueMode,
    ProjectionInput, ProjectionResult, YearlyProjectionRow,
};

const ZERO_RATE_EPS: f64 = 1e-12;

pub fn compound_maturity(
    principal: f64,
    annual_rate: f64,
    term_years: f64,
    compounding: CompoundingFrequency,
) -> f64 {
    let n = compounding.periods_per_year() as f64;
    principal * (1.0 + annual_rate / n).powf(n * term_years)
}

pub fn annuity_future_value(
    payment: f64,
    annual_rate: f64,
    total_periods: u32,
    frequency: CompoundingFrequency,
    timing: AnnuityTiming,
) -> f64 {
    let periodic_rate = annual_rate / frequency.periods_per_year() as f64;
    annuity_fv_at_rate(payment, periodic_rate, total_periods as f64, timing)
}

pub fn effective_annual_rate(annual_rate: f64, compounding: CompoundingFrequency) -> f64 {
    let n = compounding.periods_per_year() as f64;
    (n * (annual_rate / n).ln_1p()).exp_m1()
}

pub fn contribution_period_rate(
    annual_rate: f64,
    compounding: CompoundingFrequency,
    contributions_per_year: u32,
) -> f64 {
    let n = compounding.periods_per_year() as f64;
    let m = contributions_per_year.max(1) as f64;
    (n / m * (annual_rate / n).ln_1p()).exp_m1()
}

pub fn recurring_deposit_maturity(
    installment: f64,
    annual_rate: f64,
    months: u32,
    compounding: CompoundingFrequency,
) -> f64 {
    let monthly_rate = contribution_period_rate(annual_rate, compounding, 12);
    annuity_fv_at_rate(installment, monthly_rate, months as f64, AnnuityTiming::Due)
}

pub fn present_value(input: PresentValueInput) -> PresentValue {
    let n = input.frequency.periods_per_year() as f64;
    let i = input.annual_discount_rate / n;
    let periods = n * input.years;

    let raw = match input.mode {
        PresentValueMode::Single => input.amount / (1.0 + i).powf(periods),
        PresentValueMode::Annuity => {
            let ordinary = if i.abs() <= ZERO_RATE_EPS {
                input.amount * periods
            } else {
                -input.amount * (-periods * i.ln_1p()).exp_m1() / i
            };
            match input.timing {
                AnnuityTiming::Ordinary => ordinary,
                AnnuityTiming::Due => ordinary * (1.0 + i),
            }
        }
        PresentValueMode::Perpetuity => {
            let spread = i - input.growth_rate / n;
            if spread <= ZERO_RATE_EPS {
                return PresentValue::NotFinite;
            }
            let ordinary = input.amount / spread;
            match input.timing {
                AnnuityTiming::Ordinary => ordinary,
                AnnuityTiming::Due => ordinary * (1.0 + i),
            }
        }
    };

    PresentValue::from_raw(raw)
}

pub fn future_value_at(input: &ProjectionInput, years: u32) -> f64 {
    let principal_part = compound_maturity(
        input.principal,
        input.annual_rate,
        years as f64,
        input.compounding,
    );
    let m = input.contribution_frequency.periods_per_year();
    let rate = contribution_period_rate(input.annual_rate, input.compounding, m);
    let contribution_part = annuity_fv_at_rate(
        input.periodic_contribution,
        rate,
        (m * years) as f64,
        input.contribution_timing,
    );
    principal_part + contribution_part
}

pub fn contributions_to_date(input: &ProjectionInput, years: u32) -> f64 {
    let m = input.contribution_frequency.periods_per_year() as f64;
    input.principal + input.periodic_contribution * m * years as f64
}

// Each row comes from the closed form, not the previous row.
pub fn yearly_breakdown(input: &ProjectionInput) -> Vec<YearlyProjectionRow> {
    let yearly_contribution =
        input.periodic_contribution * input.contribution_frequency.periods_per_year() as f64;
    let mut rows = Vec::with_capacity(input.term_years as usize);
    let mut previous_balance = future_value_at(input, 0);

    for year in 1..=input.term_years {
        let balance = future_value_at(input, year);
        let contributed = contributions_to_date(input, year);
        rows.push(YearlyProjectionRow {
            year,
            contributions_to_date: contributed,
            growth_for_period: balance - previous_balance - yearly_contribution,
            balance,
            real_value: input
                .inflation_rate
                .map(|rate| real_value(balance, rate, year as f64)),
            after_tax_value: input
                .tax_rate
                .map(|rate| after_tax_balance(balance, contributed, rate)),
        });
        previous_balance = balance;
    }

    rows
}

pub fn project(input: &ProjectionInput) -> ProjectionResult {
    let rows = yearly_breakdown(input);
    let final_balance = rows
        .last()
        .map(|row| row.balance)
        .unwrap_or_else(|| future_value_at(input, input.term_years));
    let total_contributed = contributions_to_date(input, input.term_years);
    let final_real_value = rows.last().and_then(|row| row.real_value).or_else(|| {
        input
            .inflation_rate
            .map(|rate| real_value(final_balance, rate, input.term_years as f64))
    });
    let final_after_tax_value = input
        .tax_rate
        .map(|rate| after_tax_balance(final_balance, total_contributed, rate));

    ProjectionResult {
        final_balance,
        total_contributed,
        total_growth: final_balance - total_contributed,
        effective_rate: effective_annual_rate(input.annual_rate, input.compounding),
        final_real_value,
        final_after_tax_value,
        rows,
    }
}

fn after_tax_balance(balance: f64, contributed: f64, tax_rate: f64) -> f64 {
    let gain = (balance - contributed).max(0.0);
    balance - gain * tax_rate
}

fn annuity_fv_at_rate(payment: f64, periodic_rate: f64, periods: f64, timing: AnnuityTiming) -> f64 {
    if periodic_rate.abs() <= ZERO_RATE_EPS {
        return payment * periods;
    }
    // exp_m1/ln_1p keeps tiny rates from cancelling against the leading 1.
    let ordinary = payment * (periods * periodic_rate.ln_1p()).exp_m1() / periodic_rate;
    match timing {
        AnnuityTiming::Ordinary => ordinary,
        AnnuityTiming::Due => ordinary * (1.0 + periodic_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_oneof, proptest, Just, Strategy};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_input() -> ProjectionInput {
        ProjectionInput {
            principal: 10_000.0,
            periodic_contribution: 200.0,
            contribution_frequency: CompoundingFrequency::Monthly,
            contribution_timing: AnnuityTiming::Ordinary,
            annual_rate: 0.07,
            term_years: 20,
            compounding: CompoundingFrequency::Monthly,
            inflation_rate: Some(0.025),
            tax_rate: Some(0.15),
        }
    }

    fn pv_input(mode: PresentValueMode, amount: f64, rate: f64, years: f64) -> PresentValueInput {
        PresentValueInput {
            mode,
            amount,
            annual_discount_rate: rate,
            years,
            frequency: CompoundingFrequency::Annually,
            timing: AnnuityTiming::Ordinary,
            growth_rate: 0.0,
        }
    }

    fn frequency_strategy() -> impl Strategy<Value = CompoundingFrequency> {
        prop_oneof![
            Just(CompoundingFrequency::Annually),
            Just(CompoundingFrequency::SemiAnnually),
            Just(CompoundingFrequency::Quarterly),
            Just(CompoundingFrequency::Monthly),
            Just(CompoundingFrequency::Daily),
        ]
    }

    fn timing_strategy() -> impl Strategy<Value = AnnuityTiming> {
        prop_oneof![Just(AnnuityTiming::Ordinary), Just(AnnuityTiming::Due)]
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_rate_leaves_principal_unchanged(
            principal in 0.0f64..10_000_000.0,
            term in 1u32..60,
            frequency in frequency_strategy(),
        ) {
            let value = compound_maturity(principal, 0.0, term as f64, frequency);
            prop_assert!(value == principal, "expected {principal}, got {value}");
        }

        #[test]
        fn prop_last_row_matches_closed_form_maturity(
            principal in 0.0f64..1_000_000.0,
            contribution in 0.0f64..5_000.0,
            rate in 0.0f64..0.25,
            term in 1u32..50,
            frequency in frequency_strategy(),
            timing in timing_strategy(),
        ) {
            let input = ProjectionInput {
                principal,
                periodic_contribution: contribution,
                contribution_frequency: frequency,
                contribution_timing: timing,
                annual_rate: rate,
                term_years: term,
                compounding: frequency,
                inflation_rate: None,
                tax_rate: None,
            };
            let rows = yearly_breakdown(&input);
            prop_assert!(rows.len() == term as usize);
            let last = rows.last().expect("rows for term >= 1");
            let periods = term * frequency.periods_per_year();
            let expected = compound_maturity(principal, rate, term as f64, frequency)
                + annuity_future_value(contribution, rate, periods, frequency, timing);
            prop_assert!(
                (last.balance - expected).abs() <= expected.max(1.0) * 1e-9,
                "expected {expected}, got {}", last.balance
            );
            prop_assert!(project(&input).final_balance == last.balance);
        }

        #[test]
        fn prop_present_value_round_trips_through_compounding(
            future in 1.0f64..10_000_000.0,
            rate in 0.0f64..0.30,
            term in 1u32..40,
            frequency in frequency_strategy(),
        ) {
            let pv = present_value(PresentValueInput {
                frequency,
                ..pv_input(PresentValueMode::Single, future, rate, term as f64)
            })
            .value()
            .expect("single-sum present value is finite");
            let back = compound_maturity(pv, rate, term as f64, frequency);
            prop_assert!(
                (back - future).abs() <= future * 1e-9,
                "expected {future}, got {back}"
            );
        }

        #[test]
        fn prop_balances_never_decrease_with_non_negative_rate(
            principal in 0.0f64..1_000_000.0,
            contribution in 0.0f64..5_000.0,
            rate in 0.0f64..0.20,
            term in 1u32..40,
        ) {
            let mut input = sample_input();
            input.principal = principal;
            input.periodic_contribution = contribution;
            input.annual_rate = rate;
            input.term_years = term;
            let rows = yearly_breakdown(&input);
            let mut previous = principal;
            for row in &rows {
                prop_assert!(row.balance + 1e-9 >= previous);
                prop_assert!(row.growth_for_period >= -1e-6);
                previous = row.balance;
            }
        }
    }

    #[test]
    fn compound_maturity_quarterly_matches_hand_calculation() {
        let value = compound_maturity(25_000.0, 0.05, 5.0, CompoundingFrequency::Quarterly);
        // 25000 * 1.0125^20
        assert_approx_tol(value, 32_050.93, 0.01);
    }

    #[test]
    fn compound_maturity_zero_term_is_identity() {
        let value = compound_maturity(1_234.5, 0.09, 0.0, CompoundingFrequency::Monthly);
        assert_approx(value, 1_234.5);
    }

    #[test]
    fn annuity_future_value_monthly_ordinary_and_due() {
        let ordinary = annuity_future_value(
            500.0,
            0.08,
            240,
            CompoundingFrequency::Monthly,
            AnnuityTiming::Ordinary,
        );
        let due = annuity_future_value(
            500.0,
            0.08,
            240,
            CompoundingFrequency::Monthly,
            AnnuityTiming::Due,
        );
        assert_approx_tol(ordinary, 294_510.21, 0.01);
        assert_approx_tol(due, 296_473.61, 0.01);
    }

    #[test]
    fn annuity_future_value_zero_rate_is_payment_times_periods() {
        let value = annuity_future_value(
            250.0,
            0.0,
            36,
            CompoundingFrequency::Monthly,
            AnnuityTiming::Due,
        );
        assert_approx(value, 9_000.0);
    }

    #[test]
    fn effective_rate_of_quarterly_five_percent() {
        assert_approx(
            effective_annual_rate(0.05, CompoundingFrequency::Quarterly),
            1.0125f64.powi(4) - 1.0,
        );
        assert_approx(effective_annual_rate(0.05, CompoundingFrequency::Annually), 0.05);
    }

    #[test]
    fn recurring_deposit_matches_monthly_sum() {
        let value = recurring_deposit_maturity(1_000.0, 0.07, 12, CompoundingFrequency::Quarterly);
        let expected: f64 = (1..=12)
            .map(|k| 1_000.0 * (1.0f64 + 0.07 / 4.0).powf(4.0 * k as f64 / 12.0))
            .sum();
        assert_approx_tol(value, expected, 1e-6);
        assert_approx_tol(value, 12_462.13, 0.01);
    }

    #[test]
    fn present_value_single_sum() {
        let pv = present_value(pv_input(PresentValueMode::Single, 10_000.0, 0.05, 10.0));
        assert_approx_tol(pv.value().expect("finite"), 6_139.13, 0.01);
    }

    #[test]
    fn present_value_annuity_ordinary_and_zero_rate() {
        let pv = present_value(pv_input(PresentValueMode::Annuity, 100.0, 0.05, 10.0));
        assert_approx_tol(pv.value().expect("finite"), 772.17, 0.01);

        let flat = present_value(pv_input(PresentValueMode::Annuity, 100.0, 0.0, 10.0));
        assert_approx(flat.value().expect("finite"), 1_000.0);
    }

    #[test]
    fn present_value_perpetuity_at_zero_rate_is_not_finite() {
        let pv = present_value(pv_input(PresentValueMode::Perpetuity, 500.0, 0.0, 1.0));
        assert_eq!(pv, PresentValue::NotFinite);
        assert!(!pv.is_finite());
        let json = serde_json::to_string(&pv).expect("serializes");
        assert_eq!(json, "\"not finite\"");
    }

    #[test]
    fn present_value_growing_perpetuity() {
        let mut input = pv_input(PresentValueMode::Perpetuity, 500.0, 0.08, 1.0);
        input.growth_rate = 0.03;
        assert_approx(present_value(input).value().expect("finite"), 10_000.0);

        input.growth_rate = 0.08;
        assert_eq!(present_value(input), PresentValue::NotFinite);
    }

    #[test]
    fn present_value_annuity_due_shifts_one_period() {
        let mut input = pv_input(PresentValueMode::Annuity, 100.0, 0.05, 10.0);
        input.timing = AnnuityTiming::Due;
        let due = present_value(input).value().expect("finite");
        // 100 + 100 * (1 - 1.05^-9) / 0.05
        let expected = 100.0 + 100.0 * (1.0 - 1.05f64.powi(-9)) / 0.05;
        assert_approx(due, expected);
        assert_approx_tol(due, 810.78, 0.01);
    }

    #[test]
    fn present_value_growing_perpetuity_due() {
        let mut input = pv_input(PresentValueMode::Perpetuity, 100.0, 0.10, 1.0);
        input.growth_rate = 0.05;
        assert_approx(present_value(input).value().expect("finite"), 2_000.0);

        input.timing = AnnuityTiming::Due;
        assert_approx(present_value(input).value().expect("finite"), 2_200.0);

        input.growth_rate = 0.0;
        assert_approx(present_value(input).value().expect("finite"), 1_100.0);
    }

    #[test]
    fn due_contributions_projection_matches_closed_form() {
        let mut input = sample_input();
        input.contribution_timing = AnnuityTiming::Due;
        input.tax_rate = None;
        let result = project(&input);
        let expected = compound_maturity(10_000.0, 0.07, 20.0, CompoundingFrequency::Monthly)
            + annuity_future_value(
                200.0,
                0.07,
                240,
                CompoundingFrequency::Monthly,
                AnnuityTiming::Due,
            );
        assert_approx_tol(result.final_balance, expected, 1e-6);

        let ordinary = project(&sample_input());
        assert!(result.final_balance > ordinary.final_balance);
    }

    #[test]
    fn project_reports_real_and_after_tax_values() {
        let input = sample_input();
        let result = project(&input);
        let last = result.rows.last().expect("rows");

        assert_approx(result.total_contributed, 10_000.0 + 200.0 * 12.0 * 20.0);
        assert_approx(result.total_growth, result.final_balance - result.total_contributed);
        assert_approx(
            result.final_real_value.expect("real value"),
            result.final_balance / 1.025f64.powi(20),
        );
        let gain = result.final_balance - result.total_contributed;
        assert_approx(
            result.final_after_tax_value.expect("after tax"),
            result.final_balance - 0.15 * gain,
        );
        assert_eq!(last.real_value, result.final_real_value);
        assert_eq!(last.after_tax_value, result.final_after_tax_value);
    }

    #[test]
    fn yearly_growth_plus_contributions_reconciles_balances() {
        let input = sample_input();
        let rows = yearly_breakdown(&input);
        let mut previous = input.principal;
        for row in &rows {
            assert_approx(previous + 2_400.0 + row.growth_for_period, row.balance);
            previous = row.balance;
        }
    }

    #[test]
    fn after_tax_value_never_taxes_losses() {
        assert_approx(after_tax_balance(900.0, 1_000.0, 0.3), 900.0);
    }
}
