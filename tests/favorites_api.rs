use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use favorites::{config::Config, state::AppState};

const FAVORITES_URL: &str = "/v1/favorites";
const TOKEN_URL: &str = "/v1/auth/tokens";

// Shared test context
struct TestContext {
    app: Router,
}

impl TestContext {
    fn new() -> Self {
        Self {
            app: favorites::app(AppState::in_memory(Config::default())),
        }
    }

    /// Issues a token and returns the raw `Set-Cookie` header value.
    async fn issue_cookie(&self) -> String {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(TOKEN_URL)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "Failed to get session token");

        response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Set-Cookie header")
            .to_str()
            .unwrap()
            .to_string()
    }

    /// The `name=value` pair of a freshly issued session cookie.
    async fn session_cookie(&self) -> String {
        let set_cookie = self.issue_cookie().await;
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn create(&self, cookie: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(FAVORITES_URL)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header(header::COOKIE, cookie)
                    .body(Body::from(form_body(fields)))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

fn form_body(fields: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(fields).unwrap()
}

fn assert_error_envelope(body: &Value) {
    assert!(body["error"].is_object(), "Response JSON should contain 'error': {body}");
    assert!(body["error"]["id"].is_string(), "Error should contain 'id'");
    assert!(body["error"]["message"].is_string(), "Error should contain 'message'");
}

const COMPANY: [(&str, &str); 3] = [
    ("title", "Своя компания"),
    ("lat", "53.629757"),
    ("lon", "55.905509"),
];

#[tokio::test]
async fn token_is_delivered_as_http_only_cookie() {
    let ctx = TestContext::new();
    let set_cookie = ctx.issue_cookie().await;

    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
}

#[tokio::test]
async fn creates_favorite_place() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;

    let (status, body) = ctx.create(&cookie, &COMPANY).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["id"].is_i64());
    assert_eq!(body["title"], "Своя компания");
    assert_eq!(body["lat"].as_f64(), Some(53.629757));
    assert_eq!(body["lon"].as_f64(), Some(55.905509));
    assert!(body["color"].is_null());
    assert!(body["created_at"].is_string());
    assert!(body.get("session_id").is_none());
}

#[tokio::test]
async fn raw_set_cookie_header_is_accepted_as_cookie() {
    let ctx = TestContext::new();
    let cookie = ctx.issue_cookie().await;

    let (status, body) = ctx.create(&cookie, &COMPANY).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn empty_cookie_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, body) = ctx.create("", &COMPANY).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, body) = ctx.create("token=never-issued", &COMPANY).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn token_from_another_instance_is_unauthorized() {
    let issuer = TestContext::new();
    let cookie = issuer.session_cookie().await;

    let other = TestContext::new();
    let (status, _) = other.create(&cookie, &COMPANY).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authentication_is_checked_before_validation() {
    let ctx = TestContext::new();

    let (status, body) = ctx.create("", &[("lat", "91")]).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_envelope(&body);
}

#[tokio::test]
async fn invalid_payloads_are_bad_requests() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;
    let long_title = "стосимволов".repeat(91);
    assert!(long_title.chars().count() >= 1000);

    let cases: Vec<(&str, Vec<(&str, &str)>)> = vec![
        ("missing title", vec![("lat", "53.629757"), ("lon", "55.905509")]),
        ("empty title", vec![("title", ""), ("lat", "53.629757"), ("lon", "55.905509")]),
        ("long title", vec![("title", long_title.as_str()), ("lat", "53.629757"), ("lon", "55.905509")]),
        ("symbols", vec![("title", "Вкусно и @#$%^&*"), ("lat", "53.629757"), ("lon", "55.905509")]),
        ("missing lat", vec![("title", "Вкусно и вкусно"), ("lon", "55.905509")]),
        ("lat above 90", vec![("title", "Вкусно и вкусно"), ("lat", "91"), ("lon", "55.905509")]),
        ("missing lon", vec![("title", "Вкусно и вкусно"), ("lat", "55.905509")]),
        ("lon above 180", vec![("title", "Вкусно и вкусно"), ("lat", "55.905509"), ("lon", "181")]),
        ("lat not a number", vec![("title", "Вкусно и вкусно"), ("lat", "north"), ("lon", "1")]),
        ("unknown color", vec![
            ("title", "Своя компания"),
            ("lat", "53.629757"),
            ("lon", "55.905509"),
            ("color", "BLACK"),
        ]),
    ];

    for (name, fields) in cases {
        let (status, body) = ctx.create(&cookie, &fields).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{name}: {body}");
        assert_error_envelope(&body);
    }
}

#[tokio::test]
async fn coordinate_bounds_are_inclusive() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;

    let (status, body) = ctx
        .create(&cookie, &[("title", "Полюс"), ("lat", "90"), ("lon", "180")])
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["lat"].as_f64(), Some(90.0));
    assert_eq!(body["lon"].as_f64(), Some(180.0));
}

#[tokio::test]
async fn known_color_is_echoed() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;
    let mut fields = COMPANY.to_vec();
    fields.push(("color", "RED"));

    let (status, body) = ctx.create(&cookie, &fields).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["color"], "RED");
    assert_eq!(body["title"], "Своя компания");
}

#[tokio::test]
async fn identical_creations_get_distinct_ids() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;

    let (_, first) = ctx.create(&cookie, &COMPANY).await;
    let (_, second) = ctx.create(&cookie, &COMPANY).await;

    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn non_form_body_is_a_bad_request() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;

    let response = ctx
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(FAVORITES_URL)
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie)
                .body(Body::from(r#"{"title":"Home"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(Request::builder().uri("/v1/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_error_envelope(&body);
}

#[tokio::test]
async fn oversized_body_gets_a_generic_message() {
    let ctx = TestContext::new();
    let cookie = ctx.session_cookie().await;
    let huge_title = "a".repeat(70 * 1024);

    let (status, body) = ctx
        .create(&cookie, &[("title", huge_title.as_str()), ("lat", "1"), ("lon", "1")])
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_envelope(&body);
    assert_eq!(body["error"]["message"], "Invalid form body");
}
