//! Mining-globals configuration snapshot.
//!
//! One immutable snapshot is taken per simulation call; missions never see a
//! half-updated config. Field defaults mirror the shipped balance data so a
//! `{}` document deserializes into a playable configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-wide simulation constants, loaded from the config store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningGlobals {
    /// Fraction of hourly mining power usable on the best element.
    #[serde(default = "MiningGlobals::default_max_element_percentage")]
    pub max_element_percentage: f64,
    /// Weight multiplier for Platinum/Gold deposits.
    #[serde(default = "MiningGlobals::default_commodity_factor_platinum_gold")]
    pub commodity_factor_platinum_gold: f64,
    /// Weight multiplier for the remaining tracked commodities.
    #[serde(default = "MiningGlobals::default_commodity_factor_other")]
    pub commodity_factor_other: f64,
    /// Weight applied to elements with no market listing.
    #[serde(default = "MiningGlobals::default_non_commodity_weight")]
    pub non_commodity_weight: f64,
    /// Operating cost accrued for every simulated mission day.
    #[serde(default = "MiningGlobals::default_daily_mission_cost")]
    pub daily_mission_cost: i64,
    /// Fine per day past the scheduled mission duration.
    #[serde(default = "MiningGlobals::default_deadline_overrun_fine_per_day")]
    pub deadline_overrun_fine_per_day: i64,
    /// Profit floor below which investor financing kicks in.
    #[serde(default = "MiningGlobals::default_minimum_funding")]
    pub minimum_funding: i64,
    /// Fixed principal of an emergency investor loan.
    #[serde(default = "MiningGlobals::default_investor_loan_amount")]
    pub investor_loan_amount: i64,
    /// Repayment multipliers indexed by the user's prior loan count.
    #[serde(default = "MiningGlobals::default_loan_interest_rates")]
    pub loan_interest_rates: Vec<f64>,
    /// Sticker price of a new mining ship.
    #[serde(default = "MiningGlobals::default_ship_cost")]
    pub ship_cost: i64,
    /// Budget discount applied when a ship flies a repeat mission.
    #[serde(default = "MiningGlobals::default_ship_reuse_discount")]
    pub ship_reuse_discount: f64,
}

impl MiningGlobals {
    const fn default_max_element_percentage() -> f64 {
        0.5
    }

    const fn default_commodity_factor_platinum_gold() -> f64 {
        2.0
    }

    const fn default_commodity_factor_other() -> f64 {
        1.5
    }

    const fn default_non_commodity_weight() -> f64 {
        0.5
    }

    const fn default_daily_mission_cost() -> i64 {
        500_000
    }

    const fn default_deadline_overrun_fine_per_day() -> i64 {
        1_000_000
    }

    const fn default_minimum_funding() -> i64 {
        50_000_000
    }

    const fn default_investor_loan_amount() -> i64 {
        100_000_000
    }

    fn default_loan_interest_rates() -> Vec<f64> {
        vec![1.05, 1.10, 1.20, 1.35, 1.50]
    }

    const fn default_ship_cost() -> i64 {
        150_000_000
    }

    const fn default_ship_reuse_discount() -> f64 {
        0.75
    }

    /// Interest rate for a user's next loan, clamped to the worst tier.
    #[must_use]
    pub fn loan_rate_for(&self, loan_count: u32) -> f64 {
        let idx = (loan_count as usize).min(self.loan_interest_rates.len().saturating_sub(1));
        self.loan_interest_rates.get(idx).copied().unwrap_or(1.0)
    }

    /// Validate configuration invariants before use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_element_percentage", self.max_element_percentage),
            (
                "commodity_factor_platinum_gold",
                self.commodity_factor_platinum_gold,
            ),
            ("commodity_factor_other", self.commodity_factor_other),
            ("non_commodity_weight", self.non_commodity_weight),
            ("ship_reuse_discount", self.ship_reuse_discount),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveFactor { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.max_element_percentage) {
            return Err(ConfigError::RangeViolation {
                field: "max_element_percentage",
                min: 0.0,
                max: 1.0,
                value: self.max_element_percentage,
            });
        }
        for (field, value) in [
            ("daily_mission_cost", self.daily_mission_cost),
            (
                "deadline_overrun_fine_per_day",
                self.deadline_overrun_fine_per_day,
            ),
            ("investor_loan_amount", self.investor_loan_amount),
            ("ship_cost", self.ship_cost),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeAmount { field, value });
            }
        }
        if self.loan_interest_rates.is_empty() {
            return Err(ConfigError::EmptyLoanRates);
        }
        for &rate in &self.loan_interest_rates {
            if !rate.is_finite() || rate < 1.0 {
                return Err(ConfigError::InvalidLoanRate { rate });
            }
        }
        Ok(())
    }

    /// Clamp out-of-band values back into usable ranges.
    pub fn sanitize(&mut self) {
        if !self.max_element_percentage.is_finite() || self.max_element_percentage <= 0.0 {
            self.max_element_percentage = Self::default_max_element_percentage();
        }
        self.max_element_percentage = self.max_element_percentage.min(1.0);
        for value in [
            &mut self.commodity_factor_platinum_gold,
            &mut self.commodity_factor_other,
            &mut self.non_commodity_weight,
        ] {
            if !value.is_finite() || *value <= 0.0 {
                *value = 1.0;
            }
        }
        if !self.ship_reuse_discount.is_finite() || self.ship_reuse_discount <= 0.0 {
            self.ship_reuse_discount = Self::default_ship_reuse_discount();
        }
        self.ship_reuse_discount = self.ship_reuse_discount.min(1.0);
        self.daily_mission_cost = self.daily_mission_cost.max(0);
        self.deadline_overrun_fine_per_day = self.deadline_overrun_fine_per_day.max(0);
        self.investor_loan_amount = self.investor_loan_amount.max(0);
        self.ship_cost = self.ship_cost.max(0);
        if self.loan_interest_rates.is_empty() {
            self.loan_interest_rates = Self::default_loan_interest_rates();
        }
        for rate in &mut self.loan_interest_rates {
            if !rate.is_finite() || *rate < 1.0 {
                *rate = 1.0;
            }
        }
    }
}

impl Default for MiningGlobals {
    fn default() -> Self {
        Self {
            max_element_percentage: Self::default_max_element_percentage(),
            commodity_factor_platinum_gold: Self::default_commodity_factor_platinum_gold(),
            commodity_factor_other: Self::default_commodity_factor_other(),
            non_commodity_weight: Self::default_non_commodity_weight(),
            daily_mission_cost: Self::default_daily_mission_cost(),
            deadline_overrun_fine_per_day: Self::default_deadline_overrun_fine_per_day(),
            minimum_funding: Self::default_minimum_funding(),
            investor_loan_amount: Self::default_investor_loan_amount(),
            loan_interest_rates: Self::default_loan_interest_rates(),
            ship_cost: Self::default_ship_cost(),
            ship_reuse_discount: Self::default_ship_reuse_discount(),
        }
    }
}

/// Errors raised when mining-globals invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("mining_globals configuration document is missing")]
    Missing,
    #[error("{field} must be positive (got {value})")]
    NonPositiveFactor { field: &'static str, value: f64 },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: &'static str, value: i64 },
    #[error("loan_interest_rates must not be empty")]
    EmptyLoanRates,
    #[error("loan interest rate {rate} below 1.0")]
    InvalidLoanRate { rate: f64 },
}
