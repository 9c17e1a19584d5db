// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the Hercules API for integration tests.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use hercules_client::services::HerculesClient;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CUSTOMER_EMAIL: &str = "ola@example.no";
pub const CUSTOMER_PASSWORD: &str = "hemmelig1";
pub const CUSTOMER_TOKEN: &str = "token-ola";
pub const ADMIN_TOKEN: &str = "token-admin";

pub type Shared = Arc<Mutex<MockState>>;

/// Server-side state of the mock.
pub struct MockState {
    /// token -> user JSON
    pub sessions: HashMap<String, Value>,
    pub meals: Vec<Value>,
    pub products: Vec<Value>,
    pub recipes: Vec<Value>,
    /// date -> kg
    pub weights: BTreeMap<String, f64>,
    pub relationship: Option<Value>,
    pub coaches: Vec<Value>,
    pub coach_requests: Vec<Value>,
    pub role_changes: Vec<(String, String)>,
    pub last_signup: Option<Value>,
    pub assign_calls: u32,
    pub fail_assign: bool,
    pub fail_coach_list: bool,
    pub next_id: u32,
}

impl MockState {
    fn seeded() -> Self {
        let mut sessions = HashMap::new();
        sessions.insert(
            CUSTOMER_TOKEN.to_string(),
            json!({"id": "u1", "email": CUSTOMER_EMAIL, "rolle": "kunde", "navn": "Ola"}),
        );
        sessions.insert(
            ADMIN_TOKEN.to_string(),
            json!({"id": "u0", "email": "admin@example.no", "rolle": "admin", "navn": "Admin"}),
        );

        Self {
            sessions,
            meals: vec![json!({
                "id": "m1",
                "log_date": "2025-05-01",
                "name": "Frokost",
                "time_slot": "08:00",
                "entries": [{
                    "id": "e1", "name": "Havregryn", "type": "product",
                    "food_product_id": "p1", "amount_gram": 60.0,
                    "kcal": 225.0, "protein": 8.1, "carbs": 36.0, "fat": 4.2
                }],
                "totals": {"kcal": 225.0, "protein": 8.1, "carbs": 36.0, "fat": 4.2}
            })],
            products: vec![
                json!({
                    "id": "p1", "name": "Havregryn", "barcode": "7038010000010", "brand": "Axa",
                    "kcal_per_100": 375.0, "protein_per_100": 13.5,
                    "carbs_per_100": 60.0, "fat_per_100": 7.0
                }),
                json!({
                    "id": "p2", "name": "Lettmelk", "barcode": null, "brand": "Tine",
                    "kcal_per_100": 46.0, "protein_per_100": 3.5,
                    "carbs_per_100": 4.7, "fat_per_100": 1.5
                }),
            ],
            recipes: vec![json!({
                "id": "r1", "name": "Kyllingwok", "description": "Rask middag",
                "totals": {"kcal": 520.0, "protein": 42.0, "carbs": 48.0, "fat": 16.0}
            })],
            weights: BTreeMap::new(),
            relationship: None,
            coaches: vec![
                json!({
                    "id": "c1", "navn": "Kari Nordmann", "email": "kari@example.no",
                    "coach_beskrivelse": "Styrke og kosthold", "coach_spesialiseringer": "Styrke",
                    "coach_bilde": null, "program_lengder": [8, 12]
                }),
                json!({
                    "id": "c2", "navn": "Per Hansen", "email": "per@example.no",
                    "coach_beskrivelse": "", "coach_spesialiseringer": "Kondisjon",
                    "program_lengder": []
                }),
            ],
            coach_requests: vec![json!({
                "id": "u7", "email": "coach@example.no", "navn": "Siri", "opprettet": "2025-04-30"
            })],
            role_changes: Vec::new(),
            last_signup: None,
            assign_calls: 0,
            fail_assign: false,
            fail_coach_list: false,
            next_id: 100,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }
}

/// A running mock server.
pub struct MockApi {
    pub url: String,
    pub state: Shared,
}

impl MockApi {
    pub fn client(&self) -> HerculesClient {
        HerculesClient::new(self.url.clone(), Duration::from_secs(5)).unwrap()
    }

    #[allow(dead_code)]
    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

/// Start the mock on an ephemeral port.
pub async fn spawn_mock_api() -> MockApi {
    let state: Shared = Arc::new(Mutex::new(MockState::seeded()));
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi {
        url: format!("http://{}", addr),
        state,
    }
}

/// Base URL nothing listens on.
#[allow(dead_code)]
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup))
        .route("/api/me", get(me))
        .route("/api/me/request-coach", post(request_coach))
        .route("/api/me/coach", get(my_coach).post(assign_coach))
        .route("/api/me/coach/avslutt", post(end_coach))
        .route("/api/coaches", get(coaches))
        .route("/api/coaches/{id}", get(coach))
        .route("/api/admin/coach-requests", get(coach_requests))
        .route("/api/admin/coach-requests/{id}/approve", post(approve))
        .route("/api/admin/users/{id}/role", post(set_role))
        .route("/api/meals", get(meals).post(create_meal))
        .route("/api/meals/{id}", delete(delete_meal))
        .route("/api/food-products", get(food_products))
        .route("/api/food/by-barcode", get(by_barcode))
        .route("/api/food", post(create_food))
        .route("/api/recipes", get(recipes))
        .route("/api/weight", get(weight).post(save_weight))
        .route("/api/weight/history", get(weight_history))
        .with_state(state)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn authenticate(state: &MockState, headers: &HeaderMap) -> Result<Value, Response> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| state.sessions.get(token).cloned())
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Ikke autentisert"))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = state.lock().unwrap();
    if body["email"] == CUSTOMER_EMAIL && body["password"] == CUSTOMER_PASSWORD {
        let user = state.sessions[CUSTOMER_TOKEN].clone();
        Json(json!({"access_token": CUSTOMER_TOKEN, "token_type": "bearer", "user": user}))
            .into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Feil e-post eller passord")
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.last_signup = Some(body.clone());

    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.sessions.values().any(|u| u["email"] == email.as_str()) {
        return detail(StatusCode::BAD_REQUEST, "E-post er allerede registrert");
    }

    let id = state.next_id("u");
    let name = body["navn"].as_str().unwrap_or(&email).to_string();
    let user = json!({"id": id, "email": email, "rolle": "kunde", "navn": name});
    let token = format!("token-{}", id);
    state.sessions.insert(token.clone(), user.clone());
    Json(json!({"access_token": token, "token_type": "bearer", "user": user})).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    match authenticate(&state, &headers) {
        Ok(mut user) => {
            user["coach_sokt"] = json!(false);
            user["coach_godkjent"] = json!(false);
            let can_switch = user["rolle"] != "kunde";
            user["kan_bytte_view"] = json!(can_switch);
            Json(user).into_response()
        }
        Err(resp) => resp,
    }
}

async fn request_coach(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    state.coach_requests.push(json!({
        "id": user["id"], "email": user["email"], "navn": user["navn"], "opprettet": null
    }));
    Json(json!({"ok": true})).into_response()
}

async fn my_coach(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    Json(state.relationship.clone().unwrap_or(Value::Null)).into_response()
}

async fn assign_coach(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    state.assign_calls += 1;
    if state.fail_assign {
        return detail(StatusCode::BAD_REQUEST, "Coachen tar ikke imot nye kunder");
    }

    let coach_id = body["coach_id"].as_str().unwrap_or_default();
    let Some(coach) = state.coaches.iter().find(|c| c["id"] == coach_id).cloned() else {
        return detail(StatusCode::NOT_FOUND, "Coach ikke funnet");
    };
    let weeks = body["lengde_uker"].as_u64().unwrap_or(12);
    let end = chrono::NaiveDate::from_ymd_opt(2025, 5, 1)
        .unwrap()
        .checked_add_days(chrono::Days::new(weeks * 7))
        .unwrap();
    state.relationship = Some(json!({
        "id": "rel1",
        "coach_id": coach_id,
        "coach_navn": coach["navn"],
        "coach_email": coach["email"],
        "coach_beskrivelse": coach["coach_beskrivelse"],
        "coach_spesialiseringer": coach["coach_spesialiseringer"],
        "coach_bilde": null,
        "start_dato": "2025-05-01T09:30:00+00:00",
        "slutt_dato": end.format("%Y-%m-%d").to_string(),
        "har_tilgang": true
    }));
    Json(json!({"ok": true})).into_response()
}

async fn end_coach(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    match state.relationship.as_mut() {
        Some(rel) => {
            rel["har_tilgang"] = json!(false);
            Json(json!({"ok": true})).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Ingen aktiv coach"),
    }
}

async fn coaches(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    if state.fail_coach_list {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(state.coaches.clone()).into_response()
}

async fn coach(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    match state.coaches.iter().find(|c| c["id"] == id.as_str()) {
        Some(coach) => Json(coach.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Coach ikke funnet"),
    }
}

fn require_admin(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let user = authenticate(state, headers)?;
    if user["rolle"] == "admin" {
        Ok(())
    } else {
        Err(detail(StatusCode::FORBIDDEN, "Kun for admin"))
    }
}

async fn coach_requests(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = require_admin(&state, &headers) {
        return resp;
    }
    Json(state.coach_requests.clone()).into_response()
}

async fn approve(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = require_admin(&state, &headers) {
        return resp;
    }
    state.coach_requests.retain(|r| r["id"] != id.as_str());
    state.role_changes.push((id, "kunde_og_coach".to_string()));
    // Empty body on success
    StatusCode::OK.into_response()
}

async fn set_role(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = require_admin(&state, &headers) {
        return resp;
    }
    let role = body["rolle"].as_str().unwrap_or_default().to_string();
    state.role_changes.push((id, role));
    Json(json!({"ok": true})).into_response()
}

async fn meals(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let date = query.get("date").cloned().unwrap_or_default();
    let meals: Vec<Value> = state
        .meals
        .iter()
        .filter(|m| m["log_date"] == date.as_str())
        .cloned()
        .collect();
    Json(meals).into_response()
}

async fn create_meal(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }

    let mut totals = [0.0f64; 4];
    let mut entries = Vec::new();
    for entry in body["entries"].as_array().cloned().unwrap_or_default() {
        let (name, values, source) = if let Some(pid) = entry["food_product_id"].as_str() {
            let Some(p) = state.products.iter().find(|p| p["id"] == pid) else {
                return detail(StatusCode::BAD_REQUEST, "Ukjent produkt");
            };
            let grams = entry["amount_gram"].as_f64().unwrap_or_default();
            let scale = |key: &str| p[key].as_f64().unwrap_or_default() * grams / 100.0;
            (
                p["name"].clone(),
                [
                    scale("kcal_per_100"),
                    scale("protein_per_100"),
                    scale("carbs_per_100"),
                    scale("fat_per_100"),
                ],
                json!({"type": "product", "food_product_id": pid, "amount_gram": grams}),
            )
        } else {
            let rid = entry["recipe_id"].as_str().unwrap_or_default();
            let Some(r) = state.recipes.iter().find(|r| r["id"] == rid) else {
                return detail(StatusCode::BAD_REQUEST, "Ukjent oppskrift");
            };
            let portions = entry["portions"].as_f64().unwrap_or_default();
            let t = &r["totals"];
            let scale = |key: &str| t[key].as_f64().unwrap_or_default() * portions;
            (
                r["name"].clone(),
                [scale("kcal"), scale("protein"), scale("carbs"), scale("fat")],
                json!({"type": "recipe", "recipe_id": rid, "portions": portions}),
            )
        };

        for (sum, v) in totals.iter_mut().zip(values) {
            *sum += v;
        }
        let mut line = source;
        line["id"] = json!(format!("e{}", entries.len() + 1));
        line["name"] = name;
        line["kcal"] = json!(values[0]);
        line["protein"] = json!(values[1]);
        line["carbs"] = json!(values[2]);
        line["fat"] = json!(values[3]);
        entries.push(line);
    }

    let id = state.next_id("m");
    let meal = json!({
        "id": id,
        "log_date": body["log_date"],
        "name": body["name"],
        "time_slot": body["time_slot"],
        "entries": entries,
        "totals": {"kcal": totals[0], "protein": totals[1], "carbs": totals[2], "fat": totals[3]}
    });
    state.meals.push(meal.clone());
    (StatusCode::CREATED, Json(meal)).into_response()
}

async fn delete_meal(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let before = state.meals.len();
    state.meals.retain(|m| m["id"] != id.as_str());
    if state.meals.len() == before {
        return detail(StatusCode::NOT_FOUND, "Måltid ikke funnet");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn food_products(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let q = query.get("q").map(|q| q.to_lowercase());
    let products: Vec<Value> = state
        .products
        .iter()
        .filter(|p| match &q {
            Some(q) => p["name"]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(q.as_str())),
            None => true,
        })
        .cloned()
        .collect();
    Json(products).into_response()
}

async fn by_barcode(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let barcode = query.get("barcode").cloned().unwrap_or_default();
    match state.products.iter().find(|p| p["barcode"] == barcode.as_str()) {
        Some(p) => Json(p.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Produkt ikke funnet"),
    }
}

async fn create_food(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user = match authenticate(&state, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    body["id"] = json!(state.next_id("p"));
    body["user_id"] = user["id"].clone();
    body["source"] = json!("user");
    state.products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn recipes(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    Json(state.recipes.clone()).into_response()
}

async fn weight(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let date = query.get("date").cloned().unwrap_or_default();
    Json(json!({ "weight_kg": state.weights.get(&date) })).into_response()
}

async fn save_weight(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let (Some(date), Some(kg)) = (body["date"].as_str(), body["weight_kg"].as_f64()) else {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "Ugyldig vekt");
    };
    state.weights.insert(date.to_string(), kg);
    Json(json!({"ok": true})).into_response()
}

async fn weight_history(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if let Err(resp) = authenticate(&state, &headers) {
        return resp;
    }
    let from = query.get("from_date").cloned().unwrap_or_default();
    let to = query.get("to_date").cloned().unwrap_or_default();
    // Newest first, the client sorts
    let entries: Vec<Value> = state
        .weights
        .iter()
        .rev()
        .filter(|(d, _)| d.as_str() >= from.as_str() && d.as_str() <= to.as_str())
        .map(|(d, kg)| json!({"date": d, "weight_kg": kg}))
        .collect();
    Json(entries).into_response()
}
