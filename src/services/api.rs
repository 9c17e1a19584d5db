// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hercules API client.
//!
//! Thin typed wrapper over the REST API. Every authenticated call takes the
//! bearer token from the session; nothing is cached here. Non-success
//! responses are turned into [`ClientError`] with the server's `detail`
//! message when it sent one.

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::models::{
    AssignCoachRequest, AuthResponse, BillingSelection, Coach, CoachRelationship, CoachRequest,
    DayWeight, FoodProduct, MealRecord, NewFoodProduct, NewMeal, Profile, Recipe, Role,
    WeightEntry,
};
use crate::time_utils::format_api_date;

/// Hercules API client.
#[derive(Clone)]
pub struct HerculesClient {
    http: reqwest::Client,
    base_url: String,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "navn", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub billing: Option<BillingSelection>,
}

#[derive(Debug, Serialize)]
struct SetRoleRequest {
    rolle: Role,
}

impl HerculesClient {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hercules-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("HTTP client setup: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bind a bearer token for calls made on behalf of one user.
    pub fn authorized(&self, access_token: impl Into<String>) -> AuthorizedClient {
        AuthorizedClient {
            client: self.clone(),
            access_token: access_token.into(),
        }
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let request = self
            .request(Method::POST, "/api/auth/login", None)
            .json(&LoginRequest { email, password });
        match self.send_json(request, "login").await {
            // A 401 here means bad credentials, not an expired session
            Err(ClientError::Unauthorized { message }) => Err(ClientError::Api {
                status: 401,
                message: message.or_else(|| Some("Incorrect email or password".to_string())),
            }),
            other => other,
        }
    }

    /// Create an account. New accounts always get the customer role.
    pub async fn signup(&self, body: &SignupRequest) -> Result<AuthResponse> {
        let request = self
            .request(Method::POST, "/api/auth/signup", None)
            .json(body);
        self.send_json(request, "signup").await
    }

    /// Current user's profile; also used to verify a restored token.
    pub async fn me(&self, access_token: &str) -> Result<Profile> {
        self.get_json("/api/me", access_token, &[]).await
    }

    /// Ask an admin to approve the current user as a coach.
    pub async fn request_coach_role(&self, access_token: &str) -> Result<()> {
        let request = self.request(Method::POST, "/api/me/request-coach", Some(access_token));
        self.send(request, "coach request").await
    }

    // ─── Admin ───────────────────────────────────────────────────────────────

    pub async fn coach_requests(&self, access_token: &str) -> Result<Vec<CoachRequest>> {
        self.get_json("/api/admin/coach-requests", access_token, &[])
            .await
    }

    pub async fn approve_coach_request(&self, access_token: &str, user_id: &str) -> Result<()> {
        let path = format!(
            "/api/admin/coach-requests/{}/approve",
            urlencoding::encode(user_id)
        );
        let request = self.request(Method::POST, &path, Some(access_token));
        self.send(request, "coach request").await
    }

    pub async fn set_user_role(&self, access_token: &str, user_id: &str, role: Role) -> Result<()> {
        if role == Role::Unknown {
            return Err(ClientError::Validation("Unknown role".to_string()));
        }
        let path = format!("/api/admin/users/{}/role", urlencoding::encode(user_id));
        let request = self
            .request(Method::POST, &path, Some(access_token))
            .json(&SetRoleRequest { rolle: role });
        self.send(request, "user").await
    }

    // ─── Meals & food ────────────────────────────────────────────────────────

    /// Meals logged on `date`, with per-meal totals.
    pub async fn meals(&self, access_token: &str, date: NaiveDate) -> Result<Vec<MealRecord>> {
        self.get_json("/api/meals", access_token, &[("date", format_api_date(date))])
            .await
    }

    pub async fn create_meal(&self, access_token: &str, meal: &NewMeal) -> Result<()> {
        if meal.entries.is_empty() {
            return Err(ClientError::Validation(
                "Add at least one recipe or product.".to_string(),
            ));
        }
        let request = self
            .request(Method::POST, "/api/meals", Some(access_token))
            .json(meal);
        self.send(request, "meal").await
    }

    pub async fn delete_meal(&self, access_token: &str, meal_id: &str) -> Result<()> {
        let path = format!("/api/meals/{}", urlencoding::encode(meal_id));
        let request = self.request(Method::DELETE, &path, Some(access_token));
        self.send(request, "meal").await
    }

    /// Food products, optionally filtered by a search string.
    pub async fn food_products(
        &self,
        access_token: &str,
        query: Option<&str>,
    ) -> Result<Vec<FoodProduct>> {
        let query: Vec<(&str, String)> = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| vec![("q", q.to_string())])
            .unwrap_or_default();
        self.get_json("/api/food-products", access_token, &query)
            .await
    }

    /// Look up a product by barcode. Unknown barcodes return `Ok(None)`.
    pub async fn product_by_barcode(
        &self,
        access_token: &str,
        barcode: &str,
    ) -> Result<Option<FoodProduct>> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Err(ClientError::Validation("Barcode is required".to_string()));
        }
        match self
            .get_json(
                "/api/food/by-barcode",
                access_token,
                &[("barcode", barcode.to_string())],
            )
            .await
        {
            Ok(product) => Ok(Some(product)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a user-owned food product.
    pub async fn create_food_product(
        &self,
        access_token: &str,
        product: NewFoodProduct,
    ) -> Result<FoodProduct> {
        use validator::Validate;

        let product = product.normalized();
        product.validate()?;
        let request = self
            .request(Method::POST, "/api/food", Some(access_token))
            .json(&product);
        self.send_json(request, "food product").await
    }

    pub async fn recipes(&self, access_token: &str) -> Result<Vec<Recipe>> {
        self.get_json("/api/recipes", access_token, &[]).await
    }

    // ─── Weight ──────────────────────────────────────────────────────────────

    /// Weight logged on `date`, if any.
    pub async fn weight(&self, access_token: &str, date: NaiveDate) -> Result<Option<f64>> {
        let day: DayWeight = self
            .get_json("/api/weight", access_token, &[("date", format_api_date(date))])
            .await?;
        Ok(day.weight_kg)
    }

    /// Save the weight for a day. Saving the same date again overwrites.
    pub async fn save_weight(&self, access_token: &str, entry: &WeightEntry) -> Result<()> {
        let request = self
            .request(Method::POST, "/api/weight", Some(access_token))
            .json(entry);
        self.send(request, "weight").await
    }

    /// Weight history between two dates (inclusive), oldest first.
    pub async fn weight_history(
        &self,
        access_token: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeightEntry>> {
        let mut entries: Vec<WeightEntry> = self
            .get_json(
                "/api/weight/history",
                access_token,
                &[
                    ("from_date", format_api_date(from)),
                    ("to_date", format_api_date(to)),
                ],
            )
            .await?;
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    // ─── Coaching ────────────────────────────────────────────────────────────

    /// Current coaching relationship, or `None` if the user never had one.
    pub async fn my_coach(&self, access_token: &str) -> Result<Option<CoachRelationship>> {
        self.get_json("/api/me/coach", access_token, &[]).await
    }

    pub async fn coaches(&self, access_token: &str) -> Result<Vec<Coach>> {
        self.get_json("/api/coaches", access_token, &[]).await
    }

    pub async fn coach(&self, access_token: &str, coach_id: &str) -> Result<Coach> {
        let path = format!("/api/coaches/{}", urlencoding::encode(coach_id));
        self.get_json(&path, access_token, &[]).await
    }

    pub async fn assign_coach(&self, access_token: &str, body: &AssignCoachRequest) -> Result<()> {
        let request = self
            .request(Method::POST, "/api/me/coach", Some(access_token))
            .json(body);
        self.send(request, "coach").await
    }

    /// End coach access. The relationship record and all logs are kept.
    pub async fn end_coach_access(&self, access_token: &str) -> Result<()> {
        let request = self.request(Method::POST, "/api/me/coach/avslutt", Some(access_token));
        self.send(request, "coach").await
    }

    // ─── Plumbing ────────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path, "API request");

        let builder = self.http.request(method, url);
        match access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let request = self
            .request(Method::GET, path, Some(access_token))
            .query(query);
        self.send_json(request, path).await
    }

    /// Send and check the status, ignoring the body.
    async fn send(&self, request: RequestBuilder, resource: &str) -> Result<()> {
        let response = request.send().await?;
        check_status(response, resource).await?;
        Ok(())
    }

    /// Send, check the status and parse the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response, resource).await?;
        let body = response.text().await?;

        // Some endpoints answer an empty body where they mean null
        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(body)
            .map_err(|e| ClientError::Decode(format!("{}: {}", resource, e)))
    }
}

/// Check response status and return an error if not successful.
async fn check_status(response: reqwest::Response, resource: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        tracing::warn!(status = status.as_u16(), resource, "API server error");
    } else {
        tracing::debug!(status = status.as_u16(), resource, "API request rejected");
    }
    Err(ClientError::from_status(status.as_u16(), &body, resource))
}

/// A client bound to one user's bearer token.
#[derive(Clone)]
pub struct AuthorizedClient {
    client: HerculesClient,
    access_token: String,
}

impl AuthorizedClient {
    pub fn inner(&self) -> &HerculesClient {
        &self.client
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Coaching operations the assignment workflow depends on.
pub trait CoachApi {
    fn my_coach(&self) -> impl Future<Output = Result<Option<CoachRelationship>>> + Send;
    fn coaches(&self) -> impl Future<Output = Result<Vec<Coach>>> + Send;
    fn coach(&self, coach_id: &str) -> impl Future<Output = Result<Coach>> + Send;
    fn assign_coach(&self, body: &AssignCoachRequest) -> impl Future<Output = Result<()>> + Send;
    fn end_coach_access(&self) -> impl Future<Output = Result<()>> + Send;
}

impl CoachApi for AuthorizedClient {
    async fn my_coach(&self) -> Result<Option<CoachRelationship>> {
        self.client.my_coach(&self.access_token).await
    }

    async fn coaches(&self) -> Result<Vec<Coach>> {
        self.client.coaches(&self.access_token).await
    }

    async fn coach(&self, coach_id: &str) -> Result<Coach> {
        self.client.coach(&self.access_token, coach_id).await
    }

    async fn assign_coach(&self, body: &AssignCoachRequest) -> Result<()> {
        self.client.assign_coach(&self.access_token, body).await
    }

    async fn end_coach_access(&self) -> Result<()> {
        self.client.end_coach_access(&self.access_token).await
    }
}
