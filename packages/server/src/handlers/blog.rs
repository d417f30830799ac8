use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::blog;
use crate::error::{AppError, ErrorBody, Resource};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::blog::*;
use crate::state::AppState;
use crate::store::add_to_blog_counter;

#[utoipa::path(
    post,
    path = "/",
    tag = "Blogs",
    operation_id = "createBlog",
    summary = "Publish a blog",
    description = "Publishes a new blog authored by the acting user. All activity counters start at zero.",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Blog published", body = BlogResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(author = %auth_user.username, title = %payload.title))]
pub async fn create_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBlogRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_blog(&payload)?;

    let now = chrono::Utc::now();
    let new_blog = blog::ActiveModel {
        author_id: Set(auth_user.user_id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.trim().to_string()),
        content: Set(payload.content),
        total_likes: Set(0),
        total_comments: Set(0),
        total_parent_comments: Set(0),
        total_reads: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_blog.insert(&state.db).await?;
    tracing::info!(blog_id = model.id, "Blog published");

    Ok((StatusCode::CREATED, Json(BlogResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Blogs",
    operation_id = "getBlog",
    summary = "Read a blog",
    description = "Returns a blog with its activity counters. Every read increments `total_reads`; the returned counters include this read.",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog details", body = BlogResponse),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BlogResponse>, AppError> {
    let txn = state.db.begin().await?;

    find_blog(&txn, id).await?;
    add_to_blog_counter(&txn, id, blog::Column::TotalReads, 1).await?;
    let model = find_blog(&txn, id).await?;

    txn.commit().await?;
    Ok(Json(model.into()))
}

pub(crate) async fn find_blog<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<blog::Model, AppError> {
    blog::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Blog))
}
