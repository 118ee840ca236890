use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
    pub version: String,
}

/// Items in insertion order.
pub type Db = Arc<RwLock<Vec<Item>>>;

type ApiError = (StatusCode, Json<ErrorBody>);

fn error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

fn not_found() -> ApiError {
    error(StatusCode::NOT_FOUND, "Item not found")
}

pub fn app() -> Router {
    router(Db::default())
}

/// Router over an existing store, so callers can seed or inspect it.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/items", get(list_items).post(create_item))
        .route(
            "/v1/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    let len = title.chars().count();
    if len == 0 || len > TITLE_MAX {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("title must be between 1 and {TITLE_MAX} characters"),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("description must be at most {DESCRIPTION_MAX} characters"),
        ));
    }
    Ok(())
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    Json(db.read().await.clone())
}

async fn create_item(
    State(db): State<Db>,
    Json(input): Json<CreateItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    validate_title(&input.title)?;
    validate_description(&input.description)?;
    let now = Utc::now();
    let item = Item {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        description: input.description,
        created_at: now,
        updated_at: now,
    };
    db.write().await.push(item.clone());
    debug!(id = %item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let items = db.read().await;
    items
        .iter()
        .find(|i| i.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Item>, ApiError> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    let mut items = db.write().await;
    let item = items.iter_mut().find(|i| i.id == id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        item.title = title;
    }
    if let Some(description) = input.description {
        item.description = description;
    }
    item.updated_at = Utc::now().max(item.updated_at);
    debug!(id = %item.id, "item updated");
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut items = db.write().await;
    let before = items.len();
    items.retain(|i| i.id != id);
    if items.len() == before {
        return Err(not_found());
    }
    debug!(%id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}
