use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::CounterPropagator;
use sea_orm::*;
use tracing::instrument;

use crate::entity::comment;
use crate::error::{AppError, ErrorBody, Resource};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::blog::find_blog;
use crate::models::comment::*;
use crate::models::shared::validate_text;
use crate::state::AppState;
use crate::store::SeaCommentStore;

#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "createComment",
    summary = "Comment on a blog",
    description = "Creates a top-level comment. The blog's `total_comments` and `total_parent_comments` each grow by one.",
    params(("id" = i32, Path, description = "Blog ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentWriteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(blog_id, user_id = auth_user.user_id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_text("Comment", &payload.content, state.config.comments.max_length)?;

    let txn = state.db.begin().await?;
    let blog = find_blog(&txn, blog_id).await?;

    let now = chrono::Utc::now();
    let new_comment = comment::ActiveModel {
        blog_id: Set(blog.id),
        blog_author_id: Set(blog.author_id),
        commented_by: Set(auth_user.user_id),
        content: Set(payload.content.trim().to_string()),
        is_reply: Set(false),
        parent_id: Set(None),
        total_replies: Set(0),
        is_edited: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_comment.insert(&txn).await?;

    let store = SeaCommentStore::new(&txn);
    CounterPropagator::new(&store)
        .record_comment(blog.id)
        .await?;

    let blog = find_blog(&txn, blog_id).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentWriteResponse {
            comment: model.into(),
            blog: blog.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/comments",
    tag = "Comments",
    operation_id = "listComments",
    summary = "List top-level comments of a blog",
    description = "Returns the blog's top-level comments, newest first. Replies are listed per comment.",
    params(("id" = i32, Path, description = "Blog ID"), PageQuery),
    responses(
        (status = 200, description = "Top-level comments", body = CommentListResponse),
        (status = 404, description = "Blog not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(blog_id))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(blog_id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    find_blog(&state.db, blog_id).await?;

    let select = comment::Entity::find()
        .filter(comment::Column::BlogId.eq(blog_id))
        .filter(comment::Column::ParentId.is_null())
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id);

    paginate(&state.db, select, &query).await.map(Json)
}

#[utoipa::path(
    post,
    path = "/{id}/replies",
    tag = "Comments",
    operation_id = "createReply",
    summary = "Reply to a comment",
    description = "Creates a reply. The parent and every ancestor above it gain one in `total_replies`; the blog's `total_comments` grows by one and `total_parent_comments` is unchanged.",
    params(("id" = i32, Path, description = "Parent comment ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Reply created", body = CommentWriteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Parent comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(parent_id, user_id = auth_user.user_id))]
pub async fn create_reply(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(parent_id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_text("Reply", &payload.content, state.config.comments.max_length)?;

    let txn = state.db.begin().await?;
    let parent = find_comment(&txn, parent_id).await?;

    let now = chrono::Utc::now();
    let reply = comment::ActiveModel {
        blog_id: Set(parent.blog_id),
        blog_author_id: Set(parent.blog_author_id),
        commented_by: Set(auth_user.user_id),
        content: Set(payload.content.trim().to_string()),
        is_reply: Set(true),
        parent_id: Set(Some(parent.id)),
        total_replies: Set(0),
        is_edited: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = reply.insert(&txn).await?;

    let store = SeaCommentStore::new(&txn);
    let updated = CounterPropagator::new(&store)
        .record_reply(parent.blog_id, parent.id)
        .await?;
    tracing::debug!(reply_id = model.id, ancestors = updated, "Reply counted");

    let blog = find_blog(&txn, parent.blog_id).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentWriteResponse {
            comment: model.into(),
            blog: blog.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}/replies",
    tag = "Comments",
    operation_id = "listReplies",
    summary = "List direct replies of a comment",
    description = "Returns the comment's direct replies, oldest first.",
    params(("id" = i32, Path, description = "Comment ID"), PageQuery),
    responses(
        (status = 200, description = "Direct replies", body = CommentListResponse),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id))]
pub async fn list_replies(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CommentListResponse>, AppError> {
    find_comment(&state.db, id).await?;

    let select = comment::Entity::find()
        .filter(comment::Column::ParentId.eq(id))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id);

    paginate(&state.db, select, &query).await.map(Json)
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Comments",
    operation_id = "updateComment",
    summary = "Edit a comment",
    description = "Replaces the content and marks the comment as edited. Only the comment's author may edit it. Counters are not affected.",
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the comment's author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    validate_text("Comment", &payload.content, state.config.comments.max_length)?;

    let existing = find_comment(&state.db, id).await?;
    auth_user.require_one_of(&[existing.commented_by])?;

    let store = SeaCommentStore::new(&state.db);
    let found = CounterPropagator::new(&store)
        .record_edit(id, payload.content.trim())
        .await?;
    if !found {
        return Err(AppError::NotFound(Resource::Comment));
    }

    let model = find_comment(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Comments",
    operation_id = "deleteComment",
    summary = "Delete a comment",
    description = "Deletes a comment or reply. Allowed for the comment's author and the blog's author. Every ancestor's `total_replies` and the blog's `total_comments` drop by one plus the deleted comment's `total_replies`; `total_parent_comments` drops by one for top-level comments. Replies below the deleted comment stay in storage unless cascading deletion is configured.",
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = DeleteCommentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the comment's or blog's author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Comment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteCommentResponse>, AppError> {
    let txn = state.db.begin().await?;

    // The counters are derived from this snapshot; it must be read before the delete.
    let existing = find_comment(&txn, id).await?;
    auth_user.require_one_of(&[existing.commented_by, existing.blog_author_id])?;

    let store = SeaCommentStore::new(&txn);
    let deletion = CounterPropagator::new(&store)
        .with_policy(state.config.comments.delete_policy())
        .record_deletion(existing.node())
        .await?;
    if deletion.removed.is_empty() {
        return Err(AppError::NotFound(Resource::Comment));
    }

    let blog = find_blog(&txn, existing.blog_id).await?;
    txn.commit().await?;

    tracing::info!(
        decrement = deletion.decrement,
        removed = deletion.removed.len(),
        "Comment deleted"
    );

    Ok(Json(DeleteCommentResponse {
        id,
        decrement: deletion.decrement,
        removed: deletion.removed,
        blog: blog.into(),
    }))
}

async fn find_comment<C: ConnectionTrait>(db: &C, id: i32) -> Result<comment::Model, AppError> {
    comment::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(Resource::Comment))
}

async fn paginate<C: ConnectionTrait>(
    db: &C,
    select: Select<comment::Entity>,
    query: &PageQuery,
) -> Result<CommentListResponse, AppError> {
    let (page, per_page) = query.resolve();

    let total = select.clone().paginate(db, per_page).num_items().await?;

    let data = select
        .offset(Some(PageQuery::offset(page, per_page)))
        .limit(Some(per_page))
        .all(db)
        .await?
        .into_iter()
        .map(CommentResponse::from)
        .collect();

    Ok(CommentListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    })
}
