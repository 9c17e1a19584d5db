// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Hercules client: nutrition, training and coaching on top of the Hercules API
//!
//! This crate provides the client-side domain logic (day totals, calorie
//! budget, billing proration, role-based access, the coach assignment
//! workflow) together with a typed client for the remote REST API and an
//! explicit session context.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use error::Result;
use services::{FileSessionStore, HerculesClient, SessionContext};

/// Everything a front end needs, created once at startup.
pub struct AppContext {
    pub config: Config,
    pub client: HerculesClient,
    pub session: SessionContext,
}

impl AppContext {
    /// Build the API client and a file-backed session from `config`.
    ///
    /// The session is not restored yet; call
    /// [`SessionContext::restore`] before relying on it.
    pub fn new(config: Config) -> Result<Self> {
        let client = HerculesClient::new(config.api_url.clone(), config.http_timeout)?;
        let session = SessionContext::new(Box::new(FileSessionStore::new(
            config.session_path.clone(),
        )));
        Ok(Self {
            config,
            client,
            session,
        })
    }

    /// Restore the persisted session against the API.
    pub async fn restore_session(&mut self) -> Result<()> {
        self.session.restore(&self.client).await?;
        Ok(())
    }
}
