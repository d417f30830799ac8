use serde_json::json;

use quire_server::config::CommentConfig;

use crate::common::{TestApp, routes};

/// A blog by alice with the thread `A <- B <- C`, written by bob.
struct Thread {
    blog_id: i32,
    a: i32,
    b: i32,
    c: i32,
    alice: String,
    bob: String,
}

async fn seed_thread(app: &TestApp) -> Thread {
    let alice = app.token_for(1, "alice");
    let bob = app.token_for(2, "bob");

    let blog_id = app.create_blog(&alice, "Threaded").await;
    let a = app.create_comment(blog_id, &bob, "A").await;
    let b = app.create_reply(a, &bob, "B").await;
    let c = app.create_reply(b, &bob, "C").await;

    Thread {
        blog_id,
        a,
        b,
        c,
        alice,
        bob,
    }
}

mod comment_creation {
    use super::*;

    #[tokio::test]
    async fn top_level_comment_counts_towards_both_blog_counters() {
        let app = TestApp::spawn().await;
        let alice = app.token_for(1, "alice");
        let blog_id = app.create_blog(&alice, "Fresh").await;

        let res = app
            .post_with_token(
                &routes::blog_comments(blog_id),
                &json!({"content": "  Great write-up!  "}),
                &app.token_for(2, "bob"),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["comment"]["content"], "Great write-up!");
        assert_eq!(res.body["comment"]["is_reply"], false);
        assert!(res.body["comment"]["parent_id"].is_null());
        assert_eq!(res.body["comment"]["total_replies"], 0);
        assert_eq!(res.body["comment"]["commented_by"], 2);
        assert_eq!(res.body["comment"]["blog_author_id"], 1);
        assert_eq!(res.body["blog"]["activity"]["total_comments"], 1);
        assert_eq!(res.body["blog"]["activity"]["total_parent_comments"], 1);
        assert_eq!(app.comment_counters(blog_id).await, (1, 1));
    }

    #[tokio::test]
    async fn comment_on_unknown_blog_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(
                &routes::blog_comments(777),
                &json!({"content": "Hello"}),
                &app.token_for(2, "bob"),
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn commenting_requires_a_token() {
        let app = TestApp::spawn().await;
        let blog_id = app.create_blog(&app.token_for(1, "alice"), "Quiet").await;

        let res = app
            .post_without_token(&routes::blog_comments(blog_id), &json!({"content": "Hi"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        assert_eq!(app.comment_counters(blog_id).await, (0, 0));
    }

    #[tokio::test]
    async fn blank_or_oversized_content_is_rejected() {
        let app = TestApp::spawn().await;
        let bob = app.token_for(2, "bob");
        let blog_id = app.create_blog(&app.token_for(1, "alice"), "Strict").await;

        let blank = app
            .post_with_token(&routes::blog_comments(blog_id), &json!({"content": "   "}), &bob)
            .await;
        assert_eq!(blank.status, 400);
        assert_eq!(blank.body["code"], "VALIDATION_ERROR");

        let long = app
            .post_with_token(
                &routes::blog_comments(blog_id),
                &json!({"content": "x".repeat(2001)}),
                &bob,
            )
            .await;
        assert_eq!(long.status, 400);

        assert_eq!(app.comment_counters(blog_id).await, (0, 0));
    }

    #[tokio::test]
    async fn configured_max_length_applies() {
        let app = TestApp::spawn_with(CommentConfig {
            max_length: 10,
            ..Default::default()
        })
        .await;
        let bob = app.token_for(2, "bob");
        let blog_id = app.create_blog(&app.token_for(1, "alice"), "Short").await;

        let res = app
            .post_with_token(
                &routes::blog_comments(blog_id),
                &json!({"content": "eleven char"}),
                &bob,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Comment must be 1-10 characters");
    }
}

mod reply_creation {
    use super::*;

    #[tokio::test]
    async fn reply_increments_every_ancestor() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app
            .post_with_token(&routes::replies(t.c), &json!({"content": "D"}), &t.alice)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["comment"]["is_reply"], true);
        assert_eq!(res.body["comment"]["parent_id"], t.c);
        assert_eq!(res.body["comment"]["blog_id"], t.blog_id);
        assert_eq!(res.body["blog"]["activity"]["total_comments"], 4);
        assert_eq!(res.body["blog"]["activity"]["total_parent_comments"], 1);

        assert_eq!(app.total_replies(t.c).await, 1);
        assert_eq!(app.total_replies(t.b).await, 2);
        assert_eq!(app.total_replies(t.a).await, 3);
    }

    #[tokio::test]
    async fn sibling_replies_accumulate_on_the_shared_ancestor() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        app.create_reply(t.a, &t.bob, "second branch").await;

        assert_eq!(app.total_replies(t.a).await, 3);
        assert_eq!(app.total_replies(t.b).await, 1);
        assert_eq!(app.comment_counters(t.blog_id).await, (4, 1));
    }

    #[tokio::test]
    async fn reply_to_unknown_comment_is_not_found() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app
            .post_with_token(&routes::replies(9999), &json!({"content": "lost"}), &t.bob)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.comment_counters(t.blog_id).await, (3, 1));
    }
}

mod comment_listing {
    use super::*;

    #[tokio::test]
    async fn lists_only_top_level_comments_newest_first() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;
        let newer = app.create_comment(t.blog_id, &t.bob, "newer").await;

        let res = app.get_without_token(&routes::blog_comments(t.blog_id)).await;

        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["id"], newer);
        assert_eq!(data[1]["id"], t.a);
        assert_eq!(data[1]["total_replies"], 2);
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn lists_direct_replies_oldest_first() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;
        let second = app.create_reply(t.a, &t.bob, "second").await;

        let res = app.get_without_token(&routes::replies(t.a)).await;

        assert_eq!(res.status, 200);
        let ids: Vec<i64> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![t.b as i64, second as i64]);
    }

    #[tokio::test]
    async fn pagination_splits_pages() {
        let app = TestApp::spawn().await;
        let bob = app.token_for(2, "bob");
        let blog_id = app.create_blog(&app.token_for(1, "alice"), "Busy").await;
        for i in 0..5 {
            app.create_comment(blog_id, &bob, &format!("comment {i}")).await;
        }

        let res = app
            .get_without_token(&format!(
                "{}?page=2&per_page=2",
                routes::blog_comments(blog_id)
            ))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
        assert_eq!(res.body["pagination"]["total"], 5);
        assert_eq!(res.body["pagination"]["total_pages"], 3);
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app
            .get_without_token(&format!(
                "{}?page=1000000000000000000&per_page=20",
                routes::blog_comments(t.blog_id)
            ))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["data"].as_array().unwrap().is_empty());
        assert_eq!(res.body["pagination"]["page"], 1_000_000);
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn listing_unknown_blog_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::blog_comments(31337)).await;

        assert_eq!(res.status, 404);
    }
}

mod comment_editing {
    use super::*;

    #[tokio::test]
    async fn author_can_edit_without_touching_counters() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app
            .patch_with_token(&routes::comment(t.b), &json!({"content": " B, revised "}), &t.bob)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["content"], "B, revised");
        assert_eq!(res.body["is_edited"], true);
        assert_eq!(res.body["total_replies"], 1);
        assert_eq!(app.total_replies(t.a).await, 2);
        assert_eq!(app.comment_counters(t.blog_id).await, (3, 1));
    }

    #[tokio::test]
    async fn blog_author_cannot_edit_someone_elses_comment() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app
            .patch_with_token(&routes::comment(t.a), &json!({"content": "hijacked"}), &t.alice)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        let row = app.comment_row(t.a).await.unwrap();
        assert_eq!(row.content, "A");
        assert!(!row.is_edited);
    }

    #[tokio::test]
    async fn editing_unknown_comment_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .patch_with_token(
                &routes::comment(4040),
                &json!({"content": "nothing here"}),
                &app.token_for(2, "bob"),
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod comment_deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_a_leaf_reply_decrements_by_one() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app.delete_with_token(&routes::comment(t.c), &t.bob).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"], t.c);
        assert_eq!(res.body["decrement"], -1);
        assert_eq!(res.body["removed"], json!([t.c]));
        assert_eq!(res.body["blog"]["activity"]["total_comments"], 2);
        assert_eq!(res.body["blog"]["activity"]["total_parent_comments"], 1);

        assert!(app.comment_row(t.c).await.is_none());
        assert_eq!(app.total_replies(t.b).await, 0);
        assert_eq!(app.total_replies(t.a).await, 1);
    }

    #[tokio::test]
    async fn deleting_a_mid_tree_reply_removes_its_subtree_from_counters() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app.delete_with_token(&routes::comment(t.b), &t.bob).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["decrement"], -2);
        assert_eq!(app.total_replies(t.a).await, 0);
        assert_eq!(app.comment_counters(t.blog_id).await, (1, 1));

        // The orphaned reply stays in storage, still pointing at its parent.
        let orphan = app.comment_row(t.c).await.expect("orphan should remain");
        assert_eq!(orphan.parent_id, Some(t.b));
    }

    #[tokio::test]
    async fn deleting_a_top_level_comment_updates_only_the_blog() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;
        let other = app.create_comment(t.blog_id, &t.bob, "unrelated").await;

        let res = app.delete_with_token(&routes::comment(t.a), &t.bob).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["decrement"], -3);
        assert_eq!(res.body["blog"]["activity"]["total_comments"], 1);
        assert_eq!(res.body["blog"]["activity"]["total_parent_comments"], 1);
        assert_eq!(app.total_replies(t.b).await, 1);
        assert_eq!(app.total_replies(other).await, 0);
    }

    #[tokio::test]
    async fn blog_author_can_delete_any_comment_on_their_blog() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app.delete_with_token(&routes::comment(t.c), &t.alice).await;

        assert_eq!(res.status, 200);
        assert_eq!(app.comment_counters(t.blog_id).await, (2, 1));
    }

    #[tokio::test]
    async fn stranger_cannot_delete_and_counters_stay_put() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app
            .delete_with_token(&routes::comment(t.b), &app.token_for(3, "carol"))
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert!(app.comment_row(t.b).await.is_some());
        assert_eq!(app.total_replies(t.a).await, 2);
        assert_eq!(app.comment_counters(t.blog_id).await, (3, 1));
    }

    #[tokio::test]
    async fn deleting_requires_a_token() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let res = app.delete_without_token(&routes::comment(t.c)).await;

        assert_eq!(res.status, 401);
        assert_eq!(app.comment_counters(t.blog_id).await, (3, 1));
    }

    #[tokio::test]
    async fn deleting_twice_is_not_found_the_second_time() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;

        let first = app.delete_with_token(&routes::comment(t.c), &t.bob).await;
        assert_eq!(first.status, 200);

        let second = app.delete_with_token(&routes::comment(t.c), &t.bob).await;
        assert_eq!(second.status, 404);
        assert_eq!(app.total_replies(t.a).await, 1);
        assert_eq!(app.comment_counters(t.blog_id).await, (2, 1));
    }

    #[tokio::test]
    async fn reply_under_an_orphan_stops_at_the_missing_parent() {
        let app = TestApp::spawn().await;
        let t = seed_thread(&app).await;
        app.delete_with_token(&routes::comment(t.b), &t.bob).await;

        let res = app
            .post_with_token(&routes::replies(t.c), &json!({"content": "D"}), &t.bob)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(app.total_replies(t.c).await, 1);
        // A is no longer reachable from C.
        assert_eq!(app.total_replies(t.a).await, 0);
        assert_eq!(app.comment_counters(t.blog_id).await, (2, 1));
    }

    #[tokio::test]
    async fn cascade_removes_descendants_with_the_same_counters() {
        let app = TestApp::spawn_with(CommentConfig {
            cascade_delete: true,
            ..Default::default()
        })
        .await;
        let t = seed_thread(&app).await;
        let d = app.create_reply(t.c, &t.bob, "D").await;

        let res = app.delete_with_token(&routes::comment(t.b), &t.bob).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["decrement"], -3);
        let mut removed: Vec<i64> = res.body["removed"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        removed.sort();
        assert_eq!(removed, vec![t.b as i64, t.c as i64, d as i64]);

        assert!(app.comment_row(t.c).await.is_none());
        assert!(app.comment_row(d).await.is_none());
        assert_eq!(app.total_replies(t.a).await, 0);
        assert_eq!(app.comment_counters(t.blog_id).await, (1, 1));
    }
}
