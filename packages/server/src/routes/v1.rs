use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{blog, comment, like};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/blogs", blog_routes())
        .nest("/comments", comment_routes())
}

fn blog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(blog::create_blog))
        .routes(routes!(blog::get_blog))
        .routes(routes!(comment::list_comments, comment::create_comment))
        .routes(routes!(
            like::get_like_state,
            like::like_blog,
            like::unlike_blog
        ))
}

fn comment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(comment::update_comment, comment::delete_comment))
        .routes(routes!(comment::list_replies, comment::create_reply))
}
