use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use news_notes::{
    AppConfig, AppState, InMemoryRepository, create_router,
    models::{Comment, News, NewsDetail, NewUser, Note, User, roles},
    repository::Repository,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

// --- Fixtures ---

/// The pair of users and the content they own that every routing test starts from.
struct Fixture {
    repo: Arc<InMemoryRepository>,
    app: axum::Router,
    author: User,
    reader: User,
    news: News,
    comment: Comment,
    note: Note,
}

async fn seed(repo: &InMemoryRepository, username: &str, role: &str) -> User {
    repo.create_user(NewUser {
        username: username.to_string(),
        password_hash: "unused".to_string(),
        role: role.to_string(),
    })
    .await
    .unwrap()
}

async fn setup() -> Fixture {
    let repo = Arc::new(InMemoryRepository::new());
    let author = seed(&repo, "author", roles::USER).await;
    let reader = seed(&repo, "reader", roles::USER).await;

    let news = repo
        .create_news(
            "Заголовок".to_string(),
            "Текст".to_string(),
            Utc::now().date_naive(),
        )
        .await
        .unwrap();
    let comment = repo
        .add_comment(news.id, author.id, "Текст комментария".to_string())
        .await
        .unwrap();
    let note = repo
        .create_note(
            author.id,
            news_notes::models::NoteDraft {
                title: "Заголовок".to_string(),
                text: "Текст".to_string(),
                slug: "note-slug".to_string(),
            },
        )
        .await
        .unwrap();

    // Local env: the x-user-id header authenticates.
    let state = AppState {
        repo: repo.clone(),
        config: AppConfig::default(),
    };

    Fixture {
        repo,
        app: create_router(state),
        author,
        reader,
        news,
        comment,
        note,
    }
}

fn request(method: &str, uri: &str, as_user: Option<&User>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = as_user {
        builder = builder.header("x-user-id", user.id.to_string());
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &axum::Router, req: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

// --- Availability ---

#[tokio::test]
async fn test_public_pages_available_to_anonymous() {
    let fx = setup().await;

    for uri in [
        "/".to_string(),
        "/health".to_string(),
        "/news".to_string(),
        format!("/news/{}", fx.news.id),
        "/auth/login".to_string(),
        "/auth/logout".to_string(),
        "/auth/signup".to_string(),
    ] {
        let response = send(&fx.app, request("GET", &uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    }
}

#[tokio::test]
async fn test_anonymous_is_redirected_to_login_with_next() {
    let fx = setup().await;

    let cases = [
        ("GET", format!("/comments/{}", fx.comment.id)),
        ("PUT", format!("/comments/{}", fx.comment.id)),
        ("DELETE", format!("/comments/{}", fx.comment.id)),
        ("GET", "/notes".to_string()),
        ("POST", "/notes".to_string()),
        ("GET", format!("/notes/{}", fx.note.slug)),
        ("PUT", format!("/notes/{}", fx.note.slug)),
        ("DELETE", format!("/notes/{}", fx.note.slug)),
        ("GET", "/add".to_string()),
        ("GET", format!("/edit/{}", fx.note.slug)),
        ("GET", "/done".to_string()),
        ("GET", "/me".to_string()),
        ("GET", "/admin/stats".to_string()),
    ];

    for (method, uri) in cases {
        let response = send(&fx.app, request(method, &uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{} {}", method, uri);
        assert_eq!(
            location(&response),
            format!("/auth/login?next={}", uri),
            "{} {}",
            method,
            uri
        );
    }
}

#[tokio::test]
async fn test_anonymous_comment_is_redirected_and_not_stored() {
    let fx = setup().await;
    let uri = format!("/news/{}/comments", fx.news.id);

    let response = send(
        &fx.app,
        request("POST", &uri, None, Some(json!({ "text": "Текст" }))),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/auth/login?next={}", uri));
    assert_eq!(fx.repo.get_comments(fx.news.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_owner_pages_available_to_author() {
    let fx = setup().await;

    let comment_uri = format!("/comments/{}", fx.comment.id);
    let note_uri = format!("/notes/{}", fx.note.slug);
    let edit_uri = format!("/edit/{}", fx.note.slug);
    for uri in [
        comment_uri.as_str(),
        note_uri.as_str(),
        edit_uri.as_str(),
        "/add",
        "/notes",
        "/done",
        "/me",
    ] {
        let response = send(&fx.app, request("GET", uri, Some(&fx.author), None)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    }
}

#[tokio::test]
async fn test_owner_pages_are_not_found_for_other_users() {
    let fx = setup().await;

    let cases = [
        ("GET", format!("/comments/{}", fx.comment.id), None),
        (
            "PUT",
            format!("/comments/{}", fx.comment.id),
            Some(json!({ "text": "Обновлённый комментарий" })),
        ),
        ("DELETE", format!("/comments/{}", fx.comment.id), None),
        ("GET", format!("/notes/{}", fx.note.slug), None),
        (
            "PUT",
            format!("/notes/{}", fx.note.slug),
            Some(json!({ "title": "Новый", "text": "Новый текст" })),
        ),
        ("DELETE", format!("/notes/{}", fx.note.slug), None),
        ("GET", format!("/edit/{}", fx.note.slug), None),
        ("PUT", format!("/comments/{}", fx.comment.id), Some(json!({}))),
        ("PUT", format!("/notes/{}", fx.note.slug), Some(json!({}))),
    ];

    for (method, uri, body) in cases {
        let response = send(&fx.app, request(method, &uri, Some(&fx.reader), body)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
    }

    // Nothing changed.
    let comment = fx.repo.get_comment(fx.comment.id).await.unwrap().unwrap();
    assert_eq!(comment.text, fx.comment.text);
    let note = fx.repo.get_note_by_slug(&fx.note.slug).await.unwrap().unwrap();
    assert_eq!(note, fx.note);
}

#[tokio::test]
async fn test_non_owner_with_malformed_body_is_not_found() {
    let fx = setup().await;

    for uri in [
        format!("/comments/{}", fx.comment.id),
        format!("/notes/{}", fx.note.slug),
    ] {
        let req = Request::builder()
            .method("PUT")
            .uri(&uri)
            .header("x-user-id", fx.reader.id.to_string())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = send(&fx.app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "PUT {}", uri);
    }
}

#[tokio::test]
async fn test_not_owner_and_missing_bodies_are_identical() {
    let fx = setup().await;

    let foreign = send(
        &fx.app,
        request("GET", &format!("/comments/{}", fx.comment.id), Some(&fx.reader), None),
    )
    .await;
    let missing = send(
        &fx.app,
        request("GET", "/comments/999999", Some(&fx.reader), None),
    )
    .await;

    assert_eq!(foreign.status(), missing.status());
    assert_eq!(body_json(foreign).await, body_json(missing).await);
}

// --- News ---

#[tokio::test]
async fn test_home_feed_count_and_order() {
    let fx = setup().await;
    let today = Utc::now().date_naive();
    for day in 1..=12 {
        fx.repo
            .create_news(
                format!("Новость {}", day),
                "Просто текст.".to_string(),
                today - Duration::days(day),
            )
            .await
            .unwrap();
    }

    let response = send(&fx.app, request("GET", "/news", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let feed: Vec<News> = serde_json::from_value(body_json(response).await).unwrap();

    assert_eq!(feed.len(), 10);
    assert!(feed.windows(2).all(|pair| pair[0].date >= pair[1].date));
    assert_eq!(feed[0].id, fx.news.id);
}

#[tokio::test]
async fn test_news_detail_form_visibility() {
    let fx = setup().await;
    let uri = format!("/news/{}", fx.news.id);

    let anonymous: NewsDetail =
        serde_json::from_value(body_json(send(&fx.app, request("GET", &uri, None, None)).await).await)
            .unwrap();
    assert!(anonymous.comment_form.is_none());
    assert_eq!(anonymous.comments.len(), 1);

    let signed_in: NewsDetail = serde_json::from_value(
        body_json(send(&fx.app, request("GET", &uri, Some(&fx.reader), None)).await).await,
    )
    .unwrap();
    assert!(signed_in.comment_form.is_some());
}

// --- Comments ---

#[tokio::test]
async fn test_user_can_create_comment() {
    let fx = setup().await;

    let response = send(
        &fx.app,
        request(
            "POST",
            &format!("/news/{}/comments", fx.news.id),
            Some(&fx.reader),
            Some(json!({ "text": "Новый комментарий" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let comments = fx.repo.get_comments(fx.news.id).await.unwrap();
    assert_eq!(comments.len(), 2);
    let created = comments.last().unwrap();
    assert_eq!(created.text, "Новый комментарий");
    assert_eq!(created.author_id, fx.reader.id);
}

#[tokio::test]
async fn test_banned_words_are_rejected_with_warning() {
    let fx = setup().await;

    for text in ["Какой-то текст, редиска, еще текст", "НЕГОДЯЙ"] {
        let response = send(
            &fx.app,
            request(
                "POST",
                &format!("/news/{}/comments", fx.news.id),
                Some(&fx.reader),
                Some(json!({ "text": text })),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Не ругайтесь!");
        assert_eq!(body["field"], "text");
    }

    assert_eq!(fx.repo.get_comments(fx.news.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_author_can_edit_and_delete_comment() {
    let fx = setup().await;
    let uri = format!("/comments/{}", fx.comment.id);

    let response = send(
        &fx.app,
        request("PUT", &uri, Some(&fx.author), Some(json!({ "text": "Обновлённый комментарий" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = fx.repo.get_comment(fx.comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Обновлённый комментарий");

    let response = send(&fx.app, request("DELETE", &uri, Some(&fx.author), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(fx.repo.get_comments(fx.news.id).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_comment_edit_page_carries_form() {
    let fx = setup().await;
    let uri = format!("/comments/{}", fx.comment.id);

    let response = send(&fx.app, request("GET", &uri, Some(&fx.author), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;

    assert_eq!(page["comment"]["id"], fx.comment.id);
    assert_eq!(page["form"]["action"], uri);
    assert_eq!(page["form"]["method"], "PUT");
    assert_eq!(page["form"]["fields"], json!(["text"]));
}

// --- Form errors ---

#[tokio::test]
async fn test_incomplete_forms_are_field_errors() {
    let fx = setup().await;

    let cases = [
        ("POST", "/notes".to_string(), json!({ "title": "t" }), "text"),
        ("POST", "/notes".to_string(), json!({ "text": "Текст" }), "title"),
        ("PUT", format!("/notes/{}", fx.note.slug), json!({}), "title"),
        ("POST", format!("/news/{}/comments", fx.news.id), json!({}), "text"),
        ("PUT", format!("/comments/{}", fx.comment.id), json!({}), "text"),
    ];

    for (method, uri, body, field) in cases {
        let response = send(&fx.app, request(method, &uri, Some(&fx.author), Some(body))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
        let body = body_json(response).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["field"], field, "{} {}", method, uri);
        assert_eq!(body["error"], "This field is required.");
    }

    // Nothing was written.
    assert_eq!(fx.repo.get_notes_by_author(fx.author.id).await.unwrap().len(), 1);
    assert_eq!(fx.repo.get_comments(fx.news.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unparseable_body_is_a_json_error() {
    let fx = setup().await;

    let malformed = Request::builder()
        .method("POST")
        .uri("/notes")
        .header("x-user-id", fx.author.id.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let wrong_type = request("POST", "/notes", Some(&fx.author), Some(json!({ "title": 5 })));
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/notes")
        .header("x-user-id", fx.author.id.to_string())
        .body(Body::from(json!({ "title": "t", "text": "x" }).to_string()))
        .unwrap();

    for req in [malformed, wrong_type, no_content_type] {
        let response = send(&fx.app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["field"], "body");
        assert_eq!(body["status"], 400);
    }
}

// --- Notes ---

#[tokio::test]
async fn test_note_form_pages() {
    let fx = setup().await;

    let response = send(&fx.app, request("GET", "/add", Some(&fx.reader), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let form = body_json(response).await;
    assert_eq!(form["action"], "/notes");
    assert_eq!(form["method"], "POST");
    assert_eq!(form["fields"], json!(["title", "text", "slug"]));

    let uri = format!("/edit/{}", fx.note.slug);
    let response = send(&fx.app, request("GET", &uri, Some(&fx.author), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["note"]["slug"], fx.note.slug.as_str());
    assert_eq!(page["form"]["action"], format!("/notes/{}", fx.note.slug));
    assert_eq!(page["form"]["method"], "PUT");
    assert_eq!(page["form"]["fields"], json!(["title", "text", "slug"]));
}

#[tokio::test]
async fn test_create_note_with_and_without_slug() {
    let fx = setup().await;

    let response = send(
        &fx.app,
        request("POST", "/notes", Some(&fx.reader), Some(json!({ "title": "Новый Заголовок", "text": "Текст" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note: Note = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(note.slug, "novyj-zagolovok");
    assert_eq!(note.author_id, fx.reader.id);

    let response = send(
        &fx.app,
        request(
            "POST",
            "/notes",
            Some(&fx.reader),
            Some(json!({ "title": "Ещё", "text": "Текст", "slug": "custom_slug" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(fx.repo.get_note_by_slug("custom_slug").await.unwrap().is_some());
}

#[tokio::test]
async fn test_duplicate_slug_is_rejected() {
    let fx = setup().await;

    let response = send(
        &fx.app,
        request(
            "POST",
            "/notes",
            Some(&fx.reader),
            Some(json!({ "title": "Другой", "text": "Текст", "slug": &fx.note.slug })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["field"], "slug");
    assert_eq!(
        body["error"],
        format!(
            "{} - такой slug уже существует, придумайте уникальное значение!",
            fx.note.slug
        )
    );
    assert!(fx.repo.get_notes_by_author(fx.reader.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_author_can_edit_and_delete_note() {
    let fx = setup().await;
    let uri = format!("/notes/{}", fx.note.slug);

    let response = send(
        &fx.app,
        request(
            "PUT",
            &uri,
            Some(&fx.author),
            Some(json!({ "title": "Новый Заголовок", "text": "Новый текст", "slug": "note-slug" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Note = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(updated.title, "Новый Заголовок");
    assert_eq!(updated.slug, "note-slug");
    assert_eq!(updated.author_id, fx.author.id);

    let response = send(&fx.app, request("DELETE", &uri, Some(&fx.author), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(fx.repo.get_notes_by_author(fx.author.id).await.unwrap().is_empty());
}

// --- Admin ---

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let fx = setup().await;

    let response = send(&fx.app, request("GET", "/admin/stats", Some(&fx.author), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let root = seed(&fx.repo, "root", roles::ADMIN).await;
    let response = send(&fx.app, request("GET", "/admin/stats", Some(&root), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total_users"], 3);
    assert_eq!(stats["total_notes"], 1);

    let response = send(
        &fx.app,
        request("POST", "/admin/news", Some(&root), Some(json!({ "title": "Срочно", "text": "Текст" }))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_admin_may_delete_foreign_note() {
    let fx = setup().await;
    let root = seed(&fx.repo, "root", roles::ADMIN).await;

    let response = send(
        &fx.app,
        request("DELETE", &format!("/notes/{}", fx.note.slug), Some(&root), None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(fx.repo.get_note_by_slug(&fx.note.slug).await.unwrap().is_none());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let fx = setup().await;

    let response = send(&fx.app, request("GET", "/health", None, None)).await;

    assert!(response.headers().contains_key("x-request-id"));
}
