mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use member_portal::{
    api::{create_app, state::AppState},
    domain::{CreateUserRequest, Role},
    service::ServiceContext,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "portal-test-boundary";

async fn setup() -> anyhow::Result<(Router, Arc<ServiceContext>)> {
    let context = common::test_context().await?;
    let app = create_app(AppState::new(context.clone(), Arc::new(common::test_settings())));
    Ok((app, context))
}

async fn send(app: &Router, request: Request<Body>) -> anyhow::Result<(StatusCode, axum::http::HeaderMap, Vec<u8>)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, headers, body.to_vec()))
}

fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn upload(uri: &str, cookie: &str, filename: &str, file: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n", filename).as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

/// Log in and return the `name=value` pair to send back as a Cookie header.
async fn login(app: &Router, email: &str, password: &str) -> anyhow::Result<String> {
    let (status, headers, _) = send(app, json_request(
        Method::POST,
        "/auth/login",
        None,
        json!({ "email": email, "password": password }),
    )).await?;
    assert_eq!(status, StatusCode::OK);

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(set_cookie.contains("HttpOnly"));

    Ok(set_cookie.split(';').next().unwrap_or_default().to_string())
}

async fn create_member(context: &ServiceContext, email: &str) -> anyhow::Result<()> {
    context.user_service.create_user(CreateUserRequest {
        name: "Socio".to_string(),
        email: email.to_string(),
        password: "member-pass".to_string(),
        role: Role::Socio,
    }).await?;
    Ok(())
}

fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let (app, _) = setup().await?;

    let (status, _, body) = send(&app, get("/health", None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], "healthy");

    Ok(())
}

#[tokio::test]
async fn test_login_and_me() -> anyhow::Result<()> {
    let (app, _) = setup().await?;

    let (status, _, body) = send(&app, json_request(
        Method::POST,
        "/auth/login",
        None,
        json!({ "email": "admin@test.local", "password": "wrong" }),
    )).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"], "Invalid credentials");

    // Email lookup ignores case
    let cookie = login(&app, "ADMIN@test.local", "admin-pass").await?;
    assert!(cookie.starts_with("portal_access="));

    let (status, _, body) = send(&app, get("/auth/me", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    let me = json_body(&body);
    assert_eq!(me["email"], "admin@test.local");
    assert_eq!(me["role"], "admin");
    assert!(me.get("password_hash").is_none());
    assert!(!me["last_login_at"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_missing_and_invalid_tokens() -> anyhow::Result<()> {
    let (app, _) = setup().await?;

    let (status, _, body) = send(&app, get("/auth/me", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"], "Not authenticated");

    let (status, _, body) = send(&app, get("/portal/links", Some("portal_access=garbage"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"], "Invalid token");

    let (status, _, _) = send(&app, get("/admin/users", None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_member_access() -> anyhow::Result<()> {
    let (app, context) = setup().await?;
    create_member(&context, "socio@test.local").await?;

    let cookie = login(&app, "socio@test.local", "member-pass").await?;

    let (status, _, body) = send(&app, get("/admin/users", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_body(&body)["error"], "Admin access required");

    let (status, _, body) = send(&app, get("/portal/links", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body).as_array().map(Vec::len), Some(3));

    let (status, _, body) = send(&app, get("/portal/links/plantao", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["slug"], "plantao");

    let (status, _, _) = send(&app, get("/portal/links/unknown", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_deactivated_user_loses_access() -> anyhow::Result<()> {
    let (app, context) = setup().await?;
    create_member(&context, "socio@test.local").await?;
    let member_cookie = login(&app, "socio@test.local", "member-pass").await?;
    let admin_cookie = login(&app, "admin@test.local", "admin-pass").await?;

    let member = context.user_repo.find_by_email("socio@test.local").await?.unwrap();
    let (status, _, body) = send(&app, json_request(
        Method::PATCH,
        &format!("/admin/users/{}", member.id),
        Some(&admin_cookie),
        json!({ "active": false }),
    )).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["active"], false);

    // Existing session stops resolving
    let (status, _, body) = send(&app, get("/portal/courses", Some(&member_cookie))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"], "User not found");

    let (status, _, body) = send(&app, json_request(
        Method::POST,
        "/auth/login",
        None,
        json!({ "email": "socio@test.local", "password": "member-pass" }),
    )).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_body(&body)["error"], "Inactive user");

    Ok(())
}

#[tokio::test]
async fn test_admin_user_management() -> anyhow::Result<()> {
    let (app, context) = setup().await?;
    let cookie = login(&app, "admin@test.local", "admin-pass").await?;

    let (status, _, body) = send(&app, json_request(
        Method::POST,
        "/admin/users",
        Some(&cookie),
        json!({ "name": "Nova", "email": "Nova@Test.local", "password": "nova-pass", "role": "socio" }),
    )).await?;
    assert_eq!(status, StatusCode::CREATED);
    let created = json_body(&body);
    assert_eq!(created["email"], "nova@test.local");

    let (status, _, _) = send(&app, json_request(
        Method::POST,
        "/admin/users",
        Some(&cookie),
        json!({ "name": "Dup", "email": "nova@test.local", "password": "x", "role": "socio" }),
    )).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = created["id"].as_str().unwrap_or_default().to_string();
    let (status, _, _) = send(&app, json_request(
        Method::PATCH,
        &format!("/admin/users/{}/password", id),
        Some(&cookie),
        json!({ "password": "changed-pass" }),
    )).await?;
    assert_eq!(status, StatusCode::OK);
    login(&app, "nova@test.local", "changed-pass").await?;

    // Admins cannot remove themselves
    let admin = context.user_repo.find_by_email("admin@test.local").await?.unwrap();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/admin/users/{}", admin.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())?;
    let (status, _, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json_body(&body)["error"], "cannot delete self");

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/admin/users/{}", id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())?;
    let (status, _, _) = send(&app, request).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) = send(&app, get("/admin/users", Some(&cookie))).await?;
    assert_eq!(json_body(&body).as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_template_download() -> anyhow::Result<()> {
    let (app, _) = setup().await?;
    let cookie = login(&app, "admin@test.local", "admin-pass").await?;

    let (status, headers, body) = send(&app, get("/admin/users/templates/create", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    );
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"modelo-usuarios-criacao.xlsx\"")
    );
    // xlsx files are zip archives
    assert!(body.starts_with(b"PK"));

    let (status, headers, _) = send(&app, get("/admin/users/templates/delete", Some(&cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"modelo-usuarios-exclusao.xlsx\"")
    );

    Ok(())
}

#[tokio::test]
async fn test_bulk_upload() -> anyhow::Result<()> {
    let (app, context) = setup().await?;
    let cookie = login(&app, "admin@test.local", "admin-pass").await?;

    let file = common::xlsx(&[
        &["nome", "email", "senha", "perfil"],
        &["Ana", "ana@x.com", "pw1", "socio"],
        &["Ana2", "ana@x.com", "pw2", "admin"],
    ])?;

    let (status, _, body) = send(&app, upload("/admin/users/bulk-create", &cookie, "users.XLSX", &file)).await?;
    assert_eq!(status, StatusCode::OK);
    let result = json_body(&body);
    assert_eq!(result["processed"], 2);
    assert_eq!(result["created"], 1);
    assert_eq!(result["skipped"], 1);
    assert_eq!(result["errors"][0]["row"], 3);
    assert_eq!(result["errors"][0]["message"], "duplicate email in file");
    assert!(context.user_repo.find_by_email("ana@x.com").await?.is_some());

    let (status, _, body) = send(&app, upload("/admin/users/bulk-create", &cookie, "users.csv", b"nome,email")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&body)["error"], "upload an .xlsx file");

    let file = common::xlsx(&[&["email"], &["ana@x.com"], &["admin@test.local"]])?;
    let (status, _, body) = send(&app, upload("/admin/users/bulk-delete", &cookie, "remove.xlsx", &file)).await?;
    assert_eq!(status, StatusCode::OK);
    let result = json_body(&body);
    assert_eq!(result["processed"], 2);
    assert_eq!(result["deleted"], 1);
    assert!(result.get("created").is_none());
    assert_eq!(result["errors"][0]["message"], "cannot delete self");

    Ok(())
}

#[tokio::test]
async fn test_announcements_flow() -> anyhow::Result<()> {
    let (app, context) = setup().await?;
    create_member(&context, "socio@test.local").await?;
    let admin_cookie = login(&app, "admin@test.local", "admin-pass").await?;
    let member_cookie = login(&app, "socio@test.local", "member-pass").await?;

    let today = chrono::Utc::now().date_naive();
    let yesterday = today - chrono::Duration::days(1);
    let last_week = today - chrono::Duration::days(7);

    let (status, _, body) = send(&app, json_request(
        Method::POST,
        "/admin/announcements",
        Some(&admin_cookie),
        json!({ "title": "Assembleia", "body": "Pauta anexa", "published_at": today.to_string() }),
    )).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json_body(&body)["author_name"], "Administrador");

    let (status, _, _) = send(&app, json_request(
        Method::POST,
        "/admin/announcements",
        Some(&admin_cookie),
        json!({
            "title": "Antigo",
            "body": "Encerrado",
            "published_at": last_week.to_string(),
            "expires_at": yesterday.to_string(),
        }),
    )).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, _, body) = send(&app, get("/admin/announcements", Some(&admin_cookie))).await?;
    assert_eq!(json_body(&body).as_array().map(Vec::len), Some(2));

    let (status, _, body) = send(&app, get("/portal/announcements", Some(&member_cookie))).await?;
    assert_eq!(status, StatusCode::OK);
    let visible = json_body(&body);
    assert_eq!(visible.as_array().map(Vec::len), Some(1));
    assert_eq!(visible[0]["title"], "Assembleia");

    let (status, _, _) = send(&app, json_request(
        Method::POST,
        "/admin/announcements",
        Some(&member_cookie),
        json!({ "title": "x", "body": "y", "published_at": today.to_string() }),
    )).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_logout_clears_cookie() -> anyhow::Result<()> {
    let (app, _) = setup().await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/logout")
        .body(Body::empty())?;
    let (status, headers, _) = send(&app, request).await?;
    assert_eq!(status, StatusCode::OK);

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(set_cookie.starts_with("portal_access="));
    assert!(set_cookie.contains("Max-Age=0"));

    Ok(())
}

#[tokio::test]
async fn test_unknown_admin_path_is_not_found() -> anyhow::Result<()> {
    let (app, context) = setup().await?;
    create_member(&context, "socio@test.local").await?;
    let member_cookie = login(&app, "socio@test.local", "member-pass").await?;

    let (status, _, _) = send(&app, get("/admin/does-not-exist", None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, get("/admin/does-not-exist", Some(&member_cookie))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Known admin routes stay guarded
    let (status, _, _) = send(&app, get("/admin/courses", Some(&member_cookie))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_malformed_multipart_is_reported() -> anyhow::Result<()> {
    let (app, _) = setup().await?;
    let cookie = login(&app, "admin@test.local", "admin-pass").await?;

    let body = format!("--{}\r\nnot a header line\r\n\r\npayload\r\n--{}--\r\n", BOUNDARY, BOUNDARY);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/admin/users/bulk-create")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .header(header::COOKIE, &cookie)
        .body(Body::from(body))?;

    let (status, _, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json_body(&body)["error"].as_str().unwrap_or_default().to_string();
    assert!(message.starts_with("could not read upload"), "unexpected error: {}", message);

    Ok(())
}

