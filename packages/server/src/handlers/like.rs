use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{blog, blog_like};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::blog::find_blog;
use crate::models::like::LikeResponse;
use crate::state::AppState;
use crate::store::add_to_blog_counter;

#[utoipa::path(
    put,
    path = "/{id}/like",
    tag = "Likes",
    operation_id = "likeBlog",
    summary = "Like a blog",
    description = "Records a like by the acting user. Liking twice is a no-op; `total_likes` only grows on the first like.",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Blog liked", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(blog_id, user_id = auth_user.user_id))]
pub async fn like_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let txn = state.db.begin().await?;
    find_blog(&txn, blog_id).await?;

    if find_like(&txn, blog_id, auth_user.user_id).await?.is_none() {
        let like = blog_like::ActiveModel {
            blog_id: Set(blog_id),
            user_id: Set(auth_user.user_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        match like.insert(&txn).await {
            Ok(_) => add_to_blog_counter(&txn, blog_id, blog::Column::TotalLikes, 1).await?,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // A concurrent request recorded the same like and counted it.
                tracing::debug!("Like race: unique constraint caught on insert");
                drop(txn);
                return like_state(&state.db, blog_id, auth_user.user_id)
                    .await
                    .map(Json);
            }
            Err(e) => return Err(e.into()),
        }
    }

    let response = like_state(&txn, blog_id, auth_user.user_id).await?;
    txn.commit().await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}/like",
    tag = "Likes",
    operation_id = "unlikeBlog",
    summary = "Remove a like",
    description = "Removes the acting user's like. Removing a like that does not exist is a no-op.",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Like removed", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(blog_id, user_id = auth_user.user_id))]
pub async fn unlike_blog(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    let txn = state.db.begin().await?;
    find_blog(&txn, blog_id).await?;

    let result = blog_like::Entity::delete_many()
        .filter(blog_like::Column::BlogId.eq(blog_id))
        .filter(blog_like::Column::UserId.eq(auth_user.user_id))
        .exec(&txn)
        .await?;

    if result.rows_affected > 0 {
        add_to_blog_counter(&txn, blog_id, blog::Column::TotalLikes, -1).await?;
    }

    let response = like_state(&txn, blog_id, auth_user.user_id).await?;
    txn.commit().await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/{id}/like",
    tag = "Likes",
    operation_id = "getLikeState",
    summary = "Check whether the acting user likes a blog",
    params(("id" = i32, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Like state", body = LikeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(blog_id, user_id = auth_user.user_id))]
pub async fn get_like_state(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
) -> Result<Json<LikeResponse>, AppError> {
    like_state(&state.db, blog_id, auth_user.user_id)
        .await
        .map(Json)
}

async fn find_like<C: ConnectionTrait>(
    db: &C,
    blog_id: i32,
    user_id: i32,
) -> Result<Option<blog_like::Model>, AppError> {
    Ok(blog_like::Entity::find()
        .filter(blog_like::Column::BlogId.eq(blog_id))
        .filter(blog_like::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

async fn like_state<C: ConnectionTrait>(
    db: &C,
    blog_id: i32,
    user_id: i32,
) -> Result<LikeResponse, AppError> {
    let blog = find_blog(db, blog_id).await?;
    let liked = find_like(db, blog_id, user_id).await?.is_some();

    Ok(LikeResponse {
        blog_id,
        liked,
        total_likes: blog.total_likes,
    })
}
