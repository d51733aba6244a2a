use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use greenclub_api::router;
use greenclub_api::state::AppStateInner;
use greenclub_backend::MemoryBackend;

const SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "admin@school.example";
const ADMIN_PASSWORD: &str = "leafy-greens";

#[derive(Clone)]
struct TestApp {
    app: Router,
    backend: MemoryBackend,
}

impl TestApp {
    async fn new() -> Self {
        let backend = MemoryBackend::new(SECRET, "http://localhost/media");
        backend.seed_site_content().await;
        backend
            .create_admin(ADMIN_EMAIL, ADMIN_PASSWORD, "Club Admin")
            .await
            .unwrap();
        let state = AppStateInner::new(
            Arc::new(backend.clone()),
            SECRET.to_string(),
            "news-images".to_string(),
        );
        Self { app: router(state), backend }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Signed-in admin with an open workspace.
    async fn admin(&self) -> String {
        let token = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let (status, body) = self.call("POST", "/api/admin/workspace", Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        token
    }

    async fn upload(&self, token: &str, name: &str, content_type: &str, bytes: Vec<u8>) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/api/admin/image")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-file-name", name)
            .body(Body::from(bytes))
            .unwrap();
        self.send(req).await
    }
}

fn post_form(title: &str, date: &str) -> Value {
    json!({
        "title": title,
        "excerpt": "Short summary",
        "content": "The whole story.",
        "category": "Event",
        "image_url": "",
        "read_time": "3 min read",
        "published_date": date,
    })
}

fn notice_messages(body: &Value) -> Vec<String> {
    body["notices"]
        .as_array()
        .map(|n| n.iter().map(|n| n["message"].as_str().unwrap_or("").to_string()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn health_and_public_reads() {
    let t = TestApp::new().await;

    let (status, body) = t.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));

    let (status, body) = t.call("GET", "/api/content", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = t.call("GET", "/api/content/footer", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section_key"], "footer");

    let (status, _) = t.call("GET", "/api/content/sidebar", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = t.call("GET", "/api/news", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_section_rows_are_not_found() {
    let t = TestApp::new().await;
    t.backend
        .insert_site_content("footer", "Footer", json!({ "description": "second" }))
        .await;

    let (status, _) = t.call("GET", "/api/content/footer", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_are_gated() {
    let t = TestApp::new().await;

    let (status, _) = t.call("GET", "/api/admin/news", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t.call("GET", "/api/admin/news", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t
        .call(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "email": "student@school.example", "password": "compost", "full_name": "Sam" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let student = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = t.call("POST", "/api/admin/workspace", Some(&student), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Admin only.");

    let (status, body) = t.call("GET", "/api/auth/session", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn workspace_must_be_mounted() {
    let t = TestApp::new().await;
    let token = t.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _) = t.call("GET", "/api/admin/content", Some(&token), None).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);

    let (status, body) = t.call("POST", "/api/admin/workspace", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"]["about_page"]["values"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["news"]["form"]["mode"], "create");

    let (status, _) = t.call("DELETE", "/api/admin/workspace", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = t.call("GET", "/api/admin/news", Some(&token), None).await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn about_values_edit_and_save() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    let (status, body) = t
        .call("POST", "/api/admin/content/about_page/values", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["about_page"]["values"][3], "");

    let (status, _) = t
        .call(
            "PUT",
            "/api/admin/content/about_page/values/3",
            Some(&token),
            Some(json!({ "value": "Curiosity" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .call("DELETE", "/api/admin/content/about_page/values/0", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["about_page"]["values"],
        json!(["Community", "Education", "Curiosity"])
    );

    // Out of range removal changes nothing.
    let (status, body) = t
        .call("DELETE", "/api/admin/content/about_page/values/9", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["about_page"]["values"].as_array().unwrap().len(), 3);

    // Public reads are cached until the save lands.
    let (_, before) = t.call("GET", "/api/content/about_page", None, None).await;
    assert_eq!(before["content"]["values"][0], "Sustainability");

    let (status, body) = t
        .call("POST", "/api/admin/content/about_page/save", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(notice_messages(&body), vec!["Content updated successfully!"]);

    let (_, after) = t.call("GET", "/api/content/about_page", None, None).await;
    assert_eq!(after["content"]["values"], json!(["Community", "Education", "Curiosity"]));

    // The draft survives the save.
    let (_, drafts) = t.call("GET", "/api/admin/content", Some(&token), None).await;
    assert_eq!(drafts["about_page"]["values"][2], "Curiosity");
    assert!(drafts["saving"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn section_draft_replacement_and_unknown_section() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    let (status, body) = t
        .call(
            "PUT",
            "/api/admin/content/footer",
            Some(&token),
            Some(json!({ "description": "New footer", "contact_email": "eco@school.example" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["footer"]["description"], "New footer");
    assert_eq!(body["footer"]["copyright"], "");
    // Other sections keep their drafts.
    assert_eq!(body["landing_hero"]["title"], "Growing a Greener School");

    let (status, _) = t
        .call("PUT", "/api/admin/content/sidebar", Some(&token), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = t
        .call("POST", "/api/admin/content/sidebar/save", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_save_keeps_draft_and_reports() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    t.call(
        "PUT",
        "/api/admin/content/landing_hero",
        Some(&token),
        Some(json!({ "title": "Offline edit" })),
    )
    .await;

    // A second row for the key makes the single-row update fail.
    t.backend
        .insert_site_content("landing_hero", "Landing Hero", json!({}))
        .await;
    let (status, body) = t
        .call("POST", "/api/admin/content/landing_hero/save", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let notices = notice_messages(&body);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].starts_with("Failed to update content: "));

    let (_, drafts) = t.call("GET", "/api/admin/content", Some(&token), None).await;
    assert_eq!(drafts["landing_hero"]["title"], "Offline edit");
    assert!(drafts["saving"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn news_create_edit_delete() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    let (status, _) = t
        .call("PUT", "/api/admin/news/form", Some(&token), Some(post_form("Tree planting day", "2024-04-22")))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .call("POST", "/api/admin/news/form/submit", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(notice_messages(&body), vec!["Post created successfully!"]);
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(body["data"]["form"]["draft"]["title"], "");
    assert_eq!(body["data"]["form"]["mode"], "create");

    let id = posts[0]["id"].as_str().unwrap().to_string();

    let (status, body) = t
        .call("POST", &format!("/api/admin/news/{}/edit", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["mode"], "update");
    assert_eq!(body["form"]["draft"]["title"], "Tree planting day");

    let mut form = post_form("Tree planting week", "2024-04-22");
    form["category"] = json!("Initiative");
    t.call("PUT", "/api/admin/news/form", Some(&token), Some(form)).await;
    let (status, body) = t
        .call("POST", "/api/admin/news/form/submit", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notice_messages(&body), vec!["Post updated successfully!"]);
    assert_eq!(body["data"]["posts"][0]["title"], "Tree planting week");
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 1);

    // Unconfirmed delete sends nothing.
    let (status, _) = t
        .call("DELETE", &format!("/api/admin/news/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    let (_, public) = t.call("GET", "/api/news", None, None).await;
    assert_eq!(public.as_array().unwrap().len(), 1);

    let (status, body) = t
        .call("DELETE", &format!("/api/admin/news/{}?confirm=true", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notice_messages(&body), vec!["Post deleted successfully!"]);
    assert!(body["data"]["posts"].as_array().unwrap().is_empty());

    let (_, activity) = t.call("GET", "/api/admin/activity", Some(&token), None).await;
    let messages: Vec<&str> = activity["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages[0], "Loaded 0 posts");
    assert!(messages.contains(&"Post deleted successfully"));
    assert!(messages.contains(&"Post created: Tree planting day"));
    assert_eq!(activity["error_count"], 0);

    let (status, activity) = t.call("DELETE", "/api/admin/activity", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(activity["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_form_never_reaches_backend() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    let mut form = post_form("Bad link", "2024-04-22");
    form["image_url"] = json!("not a url");
    t.call("PUT", "/api/admin/news/form", Some(&token), Some(form)).await;

    let before = t.backend.request_count();
    let (status, body) = t
        .call("POST", "/api/admin/news/form/submit", Some(&token), None)
        .await;
    // Only the admin role check touched the backend.
    assert_eq!(t.backend.request_count(), before + 1);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Must be a valid URL");
    assert_eq!(notice_messages(&body), vec!["Must be a valid URL"]);

    // The form keeps the input.
    let (_, screen) = t.call("GET", "/api/admin/news", Some(&token), None).await;
    assert_eq!(screen["form"]["draft"]["title"], "Bad link");

    let (_, activity) = t.call("GET", "/api/admin/activity", Some(&token), None).await;
    assert_eq!(activity["entries"][0]["message"], "Validation failed");
    assert_eq!(activity["error_count"], 1);
}

#[tokio::test]
async fn image_upload_rules_and_media() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    let (status, body) = t.upload(&token, "notes.txt", "text/plain", b"hello".to_vec()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(notice_messages(&body), vec!["Please select an image file"]);

    let big = vec![0u8; 6 * 1024 * 1024];
    let (status, body) = t.upload(&token, "huge.png", "image/png", big).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(notice_messages(&body), vec!["Image must be less than 5MB"]);

    let png = b"\x89PNG\r\n\x1a\nfake".to_vec();
    let (status, body) = t.upload(&token, "garden.png", "image/png", png.clone()).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(notice_messages(&body), vec!["Image uploaded successfully"]);
    let url = body["data"]["image"]["value"].as_str().unwrap().to_string();
    assert!(url.starts_with("http://localhost/media/news-images/"));
    assert!(url.ends_with(".png"));
    assert_eq!(body["data"]["form"]["draft"]["image_url"], url.as_str());
    assert_eq!(body["data"]["image"]["selected_file"], "garden.png");

    let path = url.trim_start_matches("http://localhost");
    let res = t
        .app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), png.as_slice());

    let (status, body) = t.call("DELETE", "/api/admin/image", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image"]["value"], "");
    assert_eq!(body["form"]["draft"]["image_url"], "");

    let (status, body) = t
        .call(
            "PUT",
            "/api/admin/image/url",
            Some(&token),
            Some(json!({ "url": "https://cdn.example.org/tree.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image"]["preview"], "https://cdn.example.org/tree.jpg");
    assert_eq!(body["form"]["draft"]["image_url"], "https://cdn.example.org/tree.jpg");

    let (status, _) = t.call("GET", "/media/news-images/missing.png", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_and_signup_messages() {
    let t = TestApp::new().await;

    let (status, body) = t
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, body) = t
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "not-an-email", "password": "whatever" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email address");

    let (status, body) = t
        .call(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "another1", "full_name": "Someone" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "This email is already registered. Please log in instead.");

    let token = t.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body) = t.call("GET", "/api/auth/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn outage_fails_the_admin_gate() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    t.backend.set_unavailable(true);
    let (status, body) = t.call("GET", "/api/admin/news", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Could not verify admin role");

    let (status, _) = t.call("GET", "/api/news", None, None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn remount_starts_fresh() {
    let t = TestApp::new().await;
    let token = t.admin().await;

    t.call(
        "PUT",
        "/api/admin/content/footer",
        Some(&token),
        Some(json!({ "description": "Unsaved" })),
    )
    .await;

    let (status, body) = t.call("POST", "/api/admin/workspace", Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"]["footer"]["description"], "Environmental club news and events.");
    assert_eq!(body["data"]["activity"]["entries"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn different_sections_save_concurrently() {
    let t = TestApp::new().await;
    let token = t.admin().await;
    t.call("PUT", "/api/admin/content/footer", Some(&token), Some(json!({ "description": "Slow footer" })))
        .await;
    t.call("PUT", "/api/admin/content/landing_hero", Some(&token), Some(json!({ "title": "Slow hero" })))
        .await;
    t.backend.set_latency(Duration::from_millis(300));

    let save = |section: &'static str| {
        let t = t.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let uri = format!("/api/admin/content/{}/save", section);
            t.call("POST", &uri, Some(&token), None).await
        })
    };
    let footer = save("footer");
    let hero = save("landing_hero");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = t.call("GET", "/api/admin/content", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saving"], json!(["landing_hero", "footer"]));

    let (status, _) = t.call("POST", "/api/admin/content/footer/save", Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = footer.await.unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    let (status, body) = hero.await.unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);

    t.backend.set_latency(Duration::ZERO);
    let (_, body) = t.call("GET", "/api/admin/content", Some(&token), None).await;
    assert_eq!(body["saving"], json!([]));
    let (_, footer) = t.call("GET", "/api/content/footer", None, None).await;
    assert_eq!(footer["content"]["description"], "Slow footer");
    let (_, hero) = t.call("GET", "/api/content/landing_hero", None, None).await;
    assert_eq!(hero["content"]["title"], "Slow hero");
}

#[tokio::test]
async fn abandoned_save_request_still_completes() {
    let t = TestApp::new().await;
    let token = t.admin().await;
    t.call("PUT", "/api/admin/content/footer", Some(&token), Some(json!({ "description": "Written anyway" })))
        .await;
    t.backend.set_latency(Duration::from_millis(300));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        t.call("POST", "/api/admin/content/footer/save", Some(&token), None),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;
    t.backend.set_latency(Duration::ZERO);

    let (_, body) = t.call("GET", "/api/admin/content", Some(&token), None).await;
    assert_eq!(body["saving"], json!([]));
    let (_, footer) = t.call("GET", "/api/content/footer", None, None).await;
    assert_eq!(footer["content"]["description"], "Written anyway");

    let (status, _) = t.call("POST", "/api/admin/content/footer/save", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn form_stays_editable_during_upload() {
    let t = TestApp::new().await;
    let token = t.admin().await;
    t.backend.set_latency(Duration::from_millis(400));

    let upload = tokio::spawn({
        let t = t.clone();
        let token = token.clone();
        async move { t.upload(&token, "garden.png", "image/png", b"png".to_vec()).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = t
        .call("PUT", "/api/admin/news/form", Some(&token), Some(post_form("Edited while uploading", "2024-05-01")))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["image"]["uploading"], true);
    assert!(!upload.is_finished());

    let (status, _) = t.upload(&token, "second.png", "image/png", b"png".to_vec()).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = upload.await.unwrap();
    assert_eq!(status, StatusCode::OK, "{}", body);
    let data = &body["data"];
    assert_eq!(data["image"]["uploading"], false);
    assert_eq!(data["image"]["selected_file"], "garden.png");
    assert_eq!(data["form"]["draft"]["title"], "Edited while uploading");
    assert_eq!(data["form"]["draft"]["image_url"], data["image"]["value"]);
}

#[tokio::test]
async fn abandoned_upload_request_still_lands() {
    let t = TestApp::new().await;
    let token = t.admin().await;
    t.backend.set_latency(Duration::from_millis(300));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        t.upload(&token, "garden.png", "image/png", b"png".to_vec()),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;
    let (status, body) = t.call("GET", "/api/admin/news", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image"]["uploading"], false);
    assert_eq!(body["image"]["selected_file"], "garden.png");
    assert_eq!(body["form"]["draft"]["image_url"], body["image"]["value"]);
}

