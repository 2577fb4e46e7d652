use super::{ProjectionInput, future_value_at};
use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GoalType {
    RequiredContribution,
    RequiredRate,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub target_balance: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub balance: f64,
}

#[derive(Debug, Clone)]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub target_balance: f64,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub achieved_balance: Option<f64>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

pub fn solve_goal(input: &ProjectionInput, config: GoalSolveConfig) -> Result<GoalSolveResult> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_balance = evaluate_candidate(input, config.goal_type, config.search_min);
    let high_balance = evaluate_candidate(input, config.goal_type, config.search_max);

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_balance + 1e-9 >= config.target_balance {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at lower search bound.".to_string();
    } else if high_balance + 1e-9 < config.target_balance {
        feasible = false;
        message = match config.goal_type {
            GoalType::RequiredContribution => {
                "No feasible contribution found within the search bounds.".to_string()
            }
            GoalType::RequiredRate => "No feasible rate found within the search bounds.".to_string(),
        };
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let balance = evaluate_candidate(input, config.goal_type, mid);
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                balance,
            });

            if balance + 1e-9 >= config.target_balance {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                solved_value = Some(hi);
                break;
            }
        }
        if solved_value.is_none() {
            solved_value = Some(hi);
        }
        feasible = true;
        message = if converged {
            match config.goal_type {
                GoalType::RequiredContribution => "Solved required contribution.".to_string(),
                GoalType::RequiredRate => "Solved required rate.".to_string(),
            }
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    let achieved_balance =
        solved_value.map(|value| evaluate_candidate(input, config.goal_type, value));

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        target_balance: config.target_balance,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        achieved_balance,
        iterations,
        converged,
        feasible,
        message,
    })
}

fn evaluate_candidate(base_input: &ProjectionInput, goal_type: GoalType, candidate: f64) -> f64 {
    let mut input = base_input.clone();
    match goal_type {
        GoalType::RequiredContribution => input.periodic_contribution = candidate.max(0.0),
        GoalType::RequiredRate => input.annual_rate = candidate.max(0.0),
    }
    future_value_at(&input, input.term_years)
}

fn validate_config(config: GoalSolveConfig) -> Result<()> {
    if !config.target_balance.is_finite() || config.target_balance < 0.0 {
        return Err(Error::InvalidInput(
            "target_balance must be finite and >= 0".to_string(),
        ));
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(Error::InvalidInput("search bounds must be finite".to_string()));
    }
    if config.search_min < 0.0 {
        return Err(Error::InvalidInput("search_min must be >= 0".to_string()));
    }
    if config.search_max <= config.search_min {
        return Err(Error::InvalidInput(
            "search_max must be greater than search_min".to_string(),
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(Error::InvalidInput("tolerance must be > 0".to_string()));
    }
    if config.max_iterations == 0 {
        return Err(Error::InvalidInput("max_iterations must be > 0".to_string()));
    }
    Ok(())
}
