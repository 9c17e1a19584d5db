// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-based access to dashboard views.
//!
//! Pure mapping from `(session present, role)` to what a view should do.
//! The role is already known from the session, so no request is made.
//! Every navigation ends in exactly one of: redirect to login, redirect to
//! the default view, or render.

use serde::Serialize;

use crate::models::Role;

/// What a role may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub customer_dashboard: bool,
    pub coach_dashboard: bool,
    pub admin_dashboard: bool,
}

impl Capabilities {
    /// Capabilities for a role; `None` means no session.
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            None => Self::default(),
            Some(role) => Self {
                customer_dashboard: true,
                coach_dashboard: matches!(role, Role::Admin | Role::CustomerAndCoach),
                admin_dashboard: role == Role::Admin,
            },
        }
    }
}

/// Who a view is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Anyone
    Public,
    /// Only visitors without a session (login, signup)
    GuestOnly,
    /// Any authenticated user
    Customer,
    /// Coaches and admins
    Coach,
    /// Admins only
    Admin,
}

/// Views of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum View {
    Home,
    Login,
    Signup,
    CustomerDashboard,
    Calories,
    Analysis,
    Integrations,
    Workouts,
    CoachPage,
    CoachDetail { coach_id: String },
    CoachDashboard,
    AdminDashboard,
}

impl View {
    pub fn audience(&self) -> Audience {
        match self {
            View::Home => Audience::Public,
            View::Login | View::Signup => Audience::GuestOnly,
            View::CustomerDashboard
            | View::Calories
            | View::Analysis
            | View::Integrations
            | View::Workouts
            | View::CoachPage
            | View::CoachDetail { .. } => Audience::Customer,
            View::CoachDashboard => Audience::Coach,
            View::AdminDashboard => Audience::Admin,
        }
    }

    /// Route path of the view.
    pub fn path(&self) -> String {
        match self {
            View::Home => "/".to_string(),
            View::Login => "/login".to_string(),
            View::Signup => "/signup".to_string(),
            View::CustomerDashboard => "/dashboard".to_string(),
            View::Calories => "/dashboard/calories".to_string(),
            View::Analysis => "/dashboard/analyse".to_string(),
            View::Integrations => "/dashboard/integrations".to_string(),
            View::Workouts => "/dashboard/workouts".to_string(),
            View::CoachPage => "/dashboard/coach-side".to_string(),
            View::CoachDetail { coach_id } => format!("/dashboard/coach-side/coach/{}", coach_id),
            View::CoachDashboard => "/dashboard/coach".to_string(),
            View::AdminDashboard => "/dashboard/admin".to_string(),
        }
    }

    /// Resolve a route path. Unknown paths return `None` (not found).
    pub fn from_path(path: &str) -> Option<View> {
        let trimmed = path.trim();
        let path = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };

        let view = match path {
            "/" | "" => View::Home,
            "/login" => View::Login,
            "/signup" => View::Signup,
            "/dashboard" => View::CustomerDashboard,
            "/dashboard/calories" => View::Calories,
            "/dashboard/analyse" => View::Analysis,
            "/dashboard/integrations" => View::Integrations,
            "/dashboard/workouts" => View::Workouts,
            "/dashboard/coach-side" => View::CoachPage,
            "/dashboard/coach" => View::CoachDashboard,
            "/dashboard/admin" => View::AdminDashboard,
            other => {
                let coach_id = other.strip_prefix("/dashboard/coach-side/coach/")?;
                if coach_id.is_empty() || coach_id.contains('/') {
                    return None;
                }
                View::CoachDetail {
                    coach_id: coach_id.to_string(),
                }
            }
        };
        Some(view)
    }

    /// Where to send a user who may not see this view.
    pub fn fallback(&self) -> View {
        match self.audience() {
            Audience::GuestOnly => View::Home,
            _ => View::CustomerDashboard,
        }
    }
}

/// Access state of a view for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessState {
    Unauthenticated,
    AuthorizedNoAccess,
    Authorized,
}

/// Terminal outcome of one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    RedirectToLogin,
    RedirectToDefault(View),
    RenderView(View),
}

/// Evaluate the access state of `view`.
///
/// `role` must be `Some` whenever a session is present; a session without a
/// role is treated like no session.
pub fn access_state(role: Option<Role>, view: &View) -> AccessState {
    let caps = Capabilities::for_role(role);
    let authenticated = role.is_some();

    match view.audience() {
        Audience::Public => AccessState::Authorized,
        Audience::GuestOnly if authenticated => AccessState::AuthorizedNoAccess,
        Audience::GuestOnly => AccessState::Authorized,
        _ if !authenticated => AccessState::Unauthenticated,
        Audience::Customer if caps.customer_dashboard => AccessState::Authorized,
        Audience::Coach if caps.coach_dashboard => AccessState::Authorized,
        Audience::Admin if caps.admin_dashboard => AccessState::Authorized,
        _ => AccessState::AuthorizedNoAccess,
    }
}

/// Decide what a navigation to `view` renders.
pub fn resolve(role: Option<Role>, view: View) -> AccessDecision {
    let state = access_state(role, &view);
    tracing::debug!(?role, path = %view.path(), ?state, "Resolved view access");

    match state {
        AccessState::Unauthenticated => AccessDecision::RedirectToLogin,
        AccessState::AuthorizedNoAccess => AccessDecision::RedirectToDefault(view.fallback()),
        AccessState::Authorized => AccessDecision::RenderView(view),
    }
}

/// An entry in the dashboard switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: String,
}

/// Dashboard switcher entries visible to a role.
pub fn navigation(role: Option<Role>) -> Vec<NavEntry> {
    let caps = Capabilities::for_role(role);
    let candidates = [
        (caps.customer_dashboard, "Customer", View::CustomerDashboard),
        (caps.coach_dashboard, "Coach", View::CoachDashboard),
        (caps.admin_dashboard, "Admin", View::AdminDashboard),
    ];

    candidates
        .into_iter()
        .filter(|(visible, _, _)| *visible)
        .map(|(_, label, view)| NavEntry {
            label,
            path: view.path(),
        })
        .collect()
}
