use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskList {
    pub items: Vec<Task>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Default)]
pub struct Store {
    /// email -> (user, password)
    users: HashMap<String, (User, String)>,
    /// bearer token -> user id
    tokens: HashMap<String, Uuid>,
    tasks: HashMap<Uuid, Task>,
}

pub type Db = Arc<RwLock<Store>>;

/// Error body shaped the way the client reads it: `{ "message": ... }`.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    fn task_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Task not found")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", post(sign_out))
        .route("/auth/me", get(me))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/toggle", put(toggle_task))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock backend listening on {addr}");
    }
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn authenticate(db: &Db, headers: &HeaderMap) -> Result<Uuid, AppError> {
    let token = bearer(headers).ok_or_else(AppError::unauthorized)?;
    db.read()
        .await
        .tokens
        .get(token)
        .copied()
        .ok_or_else(AppError::unauthorized)
}

fn issue_token(store: &mut Store, user: &User) -> AuthResponse {
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user.id);
    AuthResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: user.clone(),
    }
}

async fn sign_up(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let mut store = db.write().await;
    if store.users.contains_key(&input.email) {
        return Err(AppError::new(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let user = User {
        id: Uuid::new_v4(),
        email: input.email.clone(),
    };
    store
        .users
        .insert(input.email, (user.clone(), input.password));
    debug!("registered {}", user.email);
    Ok((StatusCode::CREATED, Json(issue_token(&mut store, &user))))
}

async fn sign_in(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<AuthResponse>, AppError> {
    let mut store = db.write().await;
    let user = match store.users.get(&input.email) {
        Some((user, password)) if *password == input.password => user.clone(),
        _ => {
            return Err(AppError::new(
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ))
        }
    };
    Ok(Json(issue_token(&mut store, &user)))
}

async fn sign_out(State(db): State<Db>, headers: HeaderMap) -> Result<StatusCode, AppError> {
    authenticate(&db, &headers).await?;
    if let Some(token) = bearer(&headers) {
        db.write().await.tokens.remove(token);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, AppError> {
    let user_id = authenticate(&db, &headers).await?;
    let store = db.read().await;
    store
        .users
        .values()
        .map(|(user, _)| user)
        .find(|u| u.id == user_id)
        .cloned()
        .map(Json)
        .ok_or_else(AppError::unauthorized)
}

async fn list_tasks(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskList>, AppError> {
    let user_id = authenticate(&db, &headers).await?;
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let store = db.read().await;
    let mut owned: Vec<&Task> = store
        .tasks
        .values()
        .filter(|t| t.user_id == user_id)
        .collect();
    owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let total = owned.len() as u64;
    let total_pages = (owned.len() as u32).div_ceil(page_size).max(1);
    // Pages past the end yield an empty slice.
    let offset = (page as usize - 1).saturating_mul(page_size as usize);
    let items = owned
        .into_iter()
        .skip(offset)
        .take(page_size as usize)
        .cloned()
        .collect();

    Ok(Json(TaskList {
        items,
        total,
        page,
        page_size,
        total_pages,
    }))
}

async fn create_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let user_id = authenticate(&db, &headers).await?;
    if input.title.trim().is_empty() {
        return Err(AppError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Title is required",
        ));
    }
    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        completed: false,
        created_at: now,
        updated_at: now,
        user_id,
    };
    db.write().await.tasks.insert(task.id, task.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let user_id = authenticate(&db, &headers).await?;
    let store = db.read().await;
    store
        .tasks
        .get(&id)
        .filter(|t| t.user_id == user_id)
        .cloned()
        .map(Json)
        .ok_or_else(AppError::task_not_found)
}

async fn update_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Task>, AppError> {
    let user_id = authenticate(&db, &headers).await?;
    let mut store = db.write().await;
    let task = store
        .tasks
        .get_mut(&id)
        .filter(|t| t.user_id == user_id)
        .ok_or_else(AppError::task_not_found)?;
    if let Some(title) = input.title {
        task.title = title;
    }
    if let Some(description) = input.description {
        task.description = Some(description);
    }
    if let Some(completed) = input.completed {
        task.completed = completed;
    }
    task.updated_at = Utc::now();
    Ok(Json(task.clone()))
}

async fn toggle_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, AppError> {
    let user_id = authenticate(&db, &headers).await?;
    let mut store = db.write().await;
    let task = store
        .tasks
        .get_mut(&id)
        .filter(|t| t.user_id == user_id)
        .ok_or_else(AppError::task_not_found)?;
    task.completed = !task.completed;
    task.updated_at = Utc::now();
    Ok(Json(task.clone()))
}

async fn delete_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user_id = authenticate(&db, &headers).await?;
    let mut store = db.write().await;
    let owned = store.tasks.get(&id).is_some_and(|t| t.user_id == user_id);
    if !owned {
        return Err(AppError::task_not_found());
    }
    store.tasks.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}
