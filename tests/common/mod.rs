#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::net::TcpListener;

const PASSWORD: &str = "password123";

/// In-process stand-in for the marketplace API. Responses follow the shapes
/// the Flask backend produces, including its bare `{email, role}` profile.
pub struct Backend {
    users: Mutex<HashMap<String, Value>>,
    /// token -> email
    tokens: Mutex<HashMap<String, String>>,
    issued: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub unauthorized: AtomicUsize,
    /// `/auth/profile` answers 503 while set.
    pub profile_outage: AtomicBool,
    /// Last JSON body received by a write endpoint.
    pub last_body: Mutex<Option<Value>>,
    /// Last query string parameters received.
    pub last_query: Mutex<HashMap<String, String>>,
}

impl Default for Backend {
    fn default() -> Self {
        let users = [
            json!({"id": 1, "first_name": "Test", "last_name": "Traveler", "email": "traveler@test.com", "role": "traveler"}),
            json!({"id": 2, "name": "Wanjiru Kamau", "email": "guide@kenya.com", "role": "guide"}),
            json!({"id": 3, "name": "Admin", "email": "admin@digitalguides.com", "role": "admin"}),
        ]
        .into_iter()
        .map(|user| (user["email"].as_str().unwrap().to_string(), user))
        .collect();

        Self {
            users: Mutex::new(users),
            tokens: Mutex::new(HashMap::new()),
            issued: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            unauthorized: AtomicUsize::new(0),
            profile_outage: AtomicBool::new(false),
            last_body: Mutex::new(None),
            last_query: Mutex::new(HashMap::new()),
        }
    }
}

impl Backend {
    pub fn revoke_all(&self) {
        self.tokens.lock().unwrap().clear();
    }

    pub fn last_body(&self) -> Value {
        self.last_body.lock().unwrap().clone().unwrap_or(Value::Null)
    }

    pub fn last_query(&self, name: &str) -> Option<String> {
        self.last_query.lock().unwrap().get(name).cloned()
    }

    fn record(&self, body: &Value) {
        *self.last_body.lock().unwrap() = Some(body.clone());
    }

    fn issue(&self, email: &str) -> String {
        let id = self.users.lock().unwrap()[email]["id"].clone();
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        let token = format!("jwt-{id}-{n}");
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), email.to_string());
        token
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<Value> {
        let token = headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let email = self.tokens.lock().unwrap().get(token).cloned()?;
        self.users.lock().unwrap().get(&email).cloned()
    }

    fn reject(&self) -> Response {
        self.unauthorized.fetch_add(1, Ordering::SeqCst);
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Token has expired"})),
        )
            .into_response()
    }

    /// The caller's user record if it has `role` (admins pass every check).
    fn require(&self, headers: &HeaderMap, role: &str) -> Result<Value, Response> {
        match self.user_for(headers) {
            Some(user) if user["role"] == role || user["role"] == "admin" => Ok(user),
            Some(_) => Err(forbidden()),
            None => Err(self.reject()),
        }
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}

fn fixtures() -> Vec<Value> {
    vec![
        json!({"id": 1, "title": "Maasai Mara Game Drive", "description": "Big five at dawn",
               "price": 120.0, "location": "Narok", "category": "wildlife", "guide_id": 2,
               "duration": "6 hours", "max_people": 6}),
        json!({"id": 2, "title": "Lamu Dhow Sunset", "price": 45.0, "location": "Lamu",
               "category": "culture", "guide_id": 9}),
    ]
}

type Shared = Arc<Backend>;

async fn login(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let user = backend.users.lock().unwrap().get(email).cloned();

    match user {
        Some(user) if password == PASSWORD => {
            let token = backend.issue(email);
            // older deployments name the field access_token
            Json(json!({"access_token": token, "user": user})).into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response(),
    }
}

async fn register(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    backend.record(&body);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if backend.users.lock().unwrap().contains_key(&email) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Email already registered"})),
        )
            .into_response();
    }

    let user = {
        let mut users = backend.users.lock().unwrap();
        let user = json!({
            "id": 100 + users.len(),
            "first_name": body["first_name"],
            "last_name": body["last_name"],
            "email": email,
            "role": body["role"],
        });
        users.insert(email.clone(), user.clone());
        user
    };
    let token = backend.issue(&email);
    (StatusCode::CREATED, Json(json!({"token": token, "user": user}))).into_response()
}

async fn profile(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    backend.profile_calls.fetch_add(1, Ordering::SeqCst);
    if backend.profile_outage.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response();
    }
    match backend.user_for(&headers) {
        Some(user) => Json(json!({"email": user["email"], "role": user["role"]})).into_response(),
        None => backend.reject(),
    }
}

async fn set_role(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let Some(user) = backend.user_for(&headers) else {
        return backend.reject();
    };
    let role = body["role"].clone();
    // admin rights need approval
    if role == "admin" {
        return Json(json!({"role": user["role"], "pending": true})).into_response();
    }

    let email = user["email"].as_str().unwrap().to_string();
    backend.users.lock().unwrap().get_mut(&email).unwrap()["role"] = role.clone();
    Json(json!({"message": "Role updated", "role": role})).into_response()
}

async fn experiences(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if headers.contains_key(AUTHORIZATION) && backend.user_for(&headers).is_none() {
        return backend.reject();
    }
    Json(fixtures()).into_response()
}

async fn create_experience(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = backend.require(&headers, "guide") {
        return response;
    }
    backend.record(&body);
    (
        StatusCode::CREATED,
        Json(json!({"id": 3, "message": "Experience created successfully"})),
    )
        .into_response()
}

async fn experience(Path(id): Path<u64>) -> Response {
    match fixtures().into_iter().find(|experience| experience["id"] == id) {
        Some(experience) => Json(experience).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Experience not found"})),
        )
            .into_response(),
    }
}

async fn availability(
    State(backend): State<Shared>,
    Path(_id): Path<u64>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *backend.last_query.lock().unwrap() = query.clone();
    let dates: Vec<&String> = [query.get("start_date"), query.get("end_date")]
        .into_iter()
        .flatten()
        .collect();
    Json(json!({"available_dates": dates})).into_response()
}

async fn search(
    State(backend): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *backend.last_query.lock().unwrap() = query.clone();
    let max_price = query
        .get("max_price")
        .and_then(|price| price.parse::<f64>().ok())
        .unwrap_or(f64::MAX);
    let matches: Vec<Value> = fixtures()
        .into_iter()
        .filter(|e| query.get("category").map_or(true, |c| e["category"] == c.as_str()))
        .filter(|e| e["price"].as_f64().unwrap() <= max_price)
        .collect();
    Json(matches).into_response()
}

async fn my_experiences(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    match backend.require(&headers, "guide") {
        Ok(user) => Json(
            fixtures()
                .into_iter()
                .filter(|e| e["guide_id"] == user["id"])
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(response) => response,
    }
}

fn booking_row() -> Value {
    json!({"id": 5, "experience_title": "Lamu Dhow Sunset", "traveler_name": "Test Traveler",
           "tour_date": "2025-08-01", "guest_count": 2, "total_amount": 90.0, "status": "confirmed"})
}

async fn create_booking(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if backend.user_for(&headers).is_none() {
        return backend.reject();
    }
    backend.record(&body);
    (
        StatusCode::CREATED,
        Json(json!({"message": "Booking created successfully", "booking_id": 12})),
    )
        .into_response()
}

async fn my_bookings(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    if backend.user_for(&headers).is_none() {
        return backend.reject();
    }
    Json(vec![booking_row()]).into_response()
}

async fn guide_bookings(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(guide_id): Path<u64>,
) -> Response {
    match backend.user_for(&headers) {
        Some(user) if user["id"] == guide_id || user["role"] == "admin" => {
            Json(vec![booking_row()]).into_response()
        }
        Some(_) => forbidden(),
        None => backend.reject(),
    }
}

async fn update_status(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = backend.require(&headers, "guide") {
        return response;
    }
    backend.record(&body);
    Json(json!({
        "message": "Booking status updated successfully",
        "booking": {"id": id, "status": body["status"]}
    }))
    .into_response()
}

async fn cancel_booking(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(_id): Path<u64>,
) -> Response {
    if backend.user_for(&headers).is_none() {
        return backend.reject();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn all_bookings(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    match backend.require(&headers, "admin") {
        Ok(_) => Json(vec![booking_row(), booking_row()]).into_response(),
        Err(response) => response,
    }
}

async fn admin_users(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    match backend.require(&headers, "admin") {
        Ok(_) => {
            let users = backend.users.lock().unwrap();
            let mut listed: Vec<Value> = users.values().cloned().collect();
            listed.sort_by_key(|user| user["id"].as_u64());
            Json(json!({"users": listed})).into_response()
        }
        Err(_) if backend.user_for(&headers).is_some() => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Admin access required"})),
        )
            .into_response(),
        Err(response) => response,
    }
}

async fn statistics(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    match backend.require(&headers, "admin") {
        Ok(_) => Json(json!({"total_users": 3, "total_bookings": 1, "revenue": 90.0})).into_response(),
        Err(response) => response,
    }
}

async fn guides(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    match backend.require(&headers, "admin") {
        Ok(_) => Json(json!({"success": true, "guides": [
            {"id": 2, "name": "Wanjiru Kamau", "email": "guide@kenya.com", "phone": "+254700000000",
             "location": "Nairobi", "is_approved": false}
        ]}))
        .into_response(),
        Err(response) => response,
    }
}

async fn approve_guide(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if let Err(response) = backend.require(&headers, "admin") {
        return response;
    }
    if id != 2 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "Guide not found"})),
        )
            .into_response();
    }
    Json(json!({
        "success": true,
        "message": "Guide approved successfully",
        "guide": {"id": 2, "name": "Wanjiru Kamau", "email": "guide@kenya.com", "is_approved": true}
    }))
    .into_response()
}

async fn reviews(Path(experience_id): Path<u64>) -> Response {
    let listed = if experience_id == 1 {
        vec![json!({"id": 1, "rating": 5, "comment": "Saw a leopard!", "created_at": "2025-06-02T10:00:00"})]
    } else {
        Vec::new()
    };
    Json(listed).into_response()
}

async fn create_review(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if backend.user_for(&headers).is_none() {
        return backend.reject();
    }
    backend.record(&body);
    (StatusCode::CREATED, Json(json!({"id": 31}))).into_response()
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub backend: Arc<Backend>,
}

impl TestServer {
    pub async fn start() -> Self {
        let backend = Arc::new(Backend::default());
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/profile", get(profile))
            .route("/api/auth/set-role", post(set_role))
            .route("/api/experiences", get(experiences).post(create_experience))
            .route("/api/experiences/search", get(search))
            .route("/api/experiences/my-experiences", get(my_experiences))
            .route("/api/experiences/:id", get(experience))
            .route("/api/experiences/:id/availability", get(availability))
            .route("/api/bookings", post(create_booking))
            .route("/api/bookings/my-bookings", get(my_bookings))
            .route("/api/bookings/guide/:id", get(guide_bookings))
            .route("/api/bookings/:id", delete(cancel_booking))
            .route("/api/bookings/:id/status", put(update_status))
            .route("/api/admin/bookings", get(all_bookings))
            .route("/api/admin/users", get(admin_users))
            .route("/api/admin/statistics", get(statistics))
            .route("/api/admin/guides", get(guides))
            .route("/api/admin/guides/:id/approve", put(approve_guide))
            .route("/api/reviews", post(create_review))
            .route("/api/reviews/:id", get(reviews))
            .with_state(backend.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, backend }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_api_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}
