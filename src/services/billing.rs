// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-payment proration.
//!
//! The first charge at the end of the trial covers the rest of the current
//! month plus one full month in advance. The rest of the current month is
//! billed at the half-month price when 15 or fewer days remain, otherwise
//! at the full monthly price. Amounts are whole currency units.

use chrono::{Datelike, NaiveDate};

use crate::models::BillingQuote;
use crate::time_utils::days_in_month;

/// Remaining days at or below which the half-month price applies.
pub const HALF_MONTH_THRESHOLD_DAYS: u32 = 15;

/// Highest accepted monthly price.
pub const MAX_MONTHLY_PRICE: u32 = 1_000_000;

/// Rejected price tiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricePlanError {
    #[error("half-month price ({half_month}) must be lower than monthly price ({monthly})")]
    HalfNotBelowMonthly { monthly: u32, half_month: u32 },

    #[error("monthly price ({0}) must not exceed 1000000")]
    TooHigh(u32),
}

/// The two fixed price tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePlan {
    monthly: u32,
    half_month: u32,
}

impl PricePlan {
    /// Create a plan. The half-month price must be below the monthly price,
    /// which is capped at [`MAX_MONTHLY_PRICE`].
    pub fn new(monthly: u32, half_month: u32) -> Result<Self, PricePlanError> {
        if monthly > MAX_MONTHLY_PRICE {
            return Err(PricePlanError::TooHigh(monthly));
        }
        if half_month >= monthly {
            return Err(PricePlanError::HalfNotBelowMonthly {
                monthly,
                half_month,
            });
        }
        Ok(Self {
            monthly,
            half_month,
        })
    }

    pub fn monthly(&self) -> u32 {
        self.monthly
    }

    pub fn half_month(&self) -> u32 {
        self.half_month
    }

    /// Quote the first payment for a signup on `today`.
    pub fn quote(&self, today: NaiveDate) -> BillingQuote {
        let days_left = days_in_month(today) - today.day();
        let half_month_applied = days_left <= HALF_MONTH_THRESHOLD_DAYS;
        let current_period_price = if half_month_applied {
            self.half_month
        } else {
            self.monthly
        };

        BillingQuote {
            days_left,
            half_month_applied,
            current_period_price,
            next_month_price: self.monthly,
            first_payment: current_period_price + self.monthly,
        }
    }
}

/// Convenience wrapper returning only the amount.
pub fn first_payment(today: NaiveDate, plan: &PricePlan) -> u32 {
    plan.quote(today).first_payment
}
