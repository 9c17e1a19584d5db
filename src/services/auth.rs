// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login and signup forms.
//!
//! All checks run before any request is sent; a failing form never reaches
//! the API.

use validator::Validate;

use crate::error::{ClientError, Result};
use crate::models::{BillingSelection, PaymentMethod};
use crate::services::api::SignupRequest;

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: normalize_email(email),
            password: password.to_string(),
        }
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Validate)]
pub struct SignupForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Repeated password, when the form asks for it
    pub password_confirmation: Option<String>,
    /// Optional display name; blank means none
    pub display_name: Option<String>,
    /// Payment method chosen at signup
    pub billing: Option<BillingSelection>,
}

impl SignupForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: normalize_email(email),
            password: password.to_string(),
            password_confirmation: None,
            display_name: None,
            billing: None,
        }
    }

    pub fn with_confirmation(mut self, confirmation: &str) -> Self {
        self.password_confirmation = Some(confirmation.to_string());
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        let name = name.trim();
        self.display_name = (!name.is_empty()).then(|| name.to_string());
        self
    }

    pub fn with_billing(mut self, billing: BillingSelection) -> Self {
        self.billing = Some(billing);
        self
    }

    /// Field rules plus the cross-field ones.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if let Some(confirmation) = &self.password_confirmation {
            if confirmation != &self.password {
                return Err(ClientError::Validation("Passwords do not match".to_string()));
            }
        }

        if let Some(billing) = &self.billing {
            let has_token = billing
                .payment_method_token
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty());
            if billing.payment_method == PaymentMethod::Card && !has_token {
                return Err(ClientError::Validation(
                    "Card details are required to pay by card".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Build the request body. Call [`SignupForm::check`] first.
    pub fn to_request(&self) -> SignupRequest {
        SignupRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            display_name: self.display_name.clone(),
            billing: self.billing.clone(),
        }
    }
}
