// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup-time billing models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Payment method chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Vipps,
    Paypal,
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "vipps" => Ok(PaymentMethod::Vipps),
            "paypal" => Ok(PaymentMethod::Paypal),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

/// Payment selection sent along with the signup request. Never persisted
/// by the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingSelection {
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_token: Option<String>,
}

/// Result of the first-payment calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct BillingQuote {
    /// Days left in the current month after today
    pub days_left: u32,
    /// Whether the current partial month is billed at the half-month price
    pub half_month_applied: bool,
    /// Price for the rest of the current month
    pub current_period_price: u32,
    /// Price for the upcoming full month, billed in advance
    pub next_month_price: u32,
    /// Amount charged when the trial ends
    pub first_payment: u32,
}
