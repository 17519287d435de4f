use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::{get, post},
    Router,
};
use barista_auth::{
    testing::{self, TokenMint},
    AuthConfig, Gate, KeyCache, TokenVerifier,
};
use color_eyre::Result;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod permission {
    barista_axum::permission_guards! {
        pub permission PostDrinks = "post:drinks";
        pub permission AnyCaller = *;
    }
}

async fn create(permission::PostDrinks(claims): permission::PostDrinks) -> String {
    claims
        .subject()
        .map(|s| s.as_str().to_owned())
        .unwrap_or_default()
}

async fn whoami(guard: permission::AnyCaller) -> String {
    guard
        .into_claims()
        .permissions()
        .map(|p| p.len())
        .unwrap_or_default()
        .to_string()
}

fn router() -> Router {
    let config = AuthConfig::for_domain("barista.test.auth0.com", testing::AUDIENCE);
    let gate = Gate::new(
        KeyCache::fixed(testing::primary_jwks()),
        TokenVerifier::new(config.validator()),
    );

    Router::new()
        .route("/drinks", post(create))
        .route("/whoami", get(whoami))
        .with_state(gate)
}

fn request(method: &str, uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

fn bearer(permissions: &[&str]) -> String {
    let token = TokenMint::primary().sign(&testing::claims(permissions));
    format!("Bearer {}", token.as_str())
}

async fn body_json(resp: axum::response::Response) -> Result<Value> {
    let bytes = resp.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn authorized_request_reaches_handler() -> Result<()> {
    let resp = router()
        .oneshot(request("POST", "/drinks", Some(&bearer(&["post:drinks"]))))
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await?.to_bytes();
    assert_eq!(&body[..], testing::SUBJECT.as_bytes());
    Ok(())
}

#[tokio::test]
async fn missing_header_is_a_json_401_with_challenge() -> Result<()> {
    let resp = router().oneshot(request("POST", "/drinks", None)).await?;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        r#"Bearer error="invalid_token", error_description="Authorization header is expected.""#
    );
    assert_eq!(
        body_json(resp).await?,
        json!({
            "success": false,
            "error": 401,
            "message": "Authorization header is expected.",
        })
    );
    Ok(())
}

#[tokio::test]
async fn missing_permission_is_a_json_403() -> Result<()> {
    let resp = router()
        .oneshot(request(
            "POST",
            "/drinks",
            Some(&bearer(&["get:drinks-detail"])),
        ))
        .await?;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .unwrap()
        .to_str()?
        .starts_with(r#"Bearer error="insufficient_scope""#));
    assert_eq!(
        body_json(resp).await?,
        json!({
            "success": false,
            "error": 403,
            "message": "Permission not found.",
        })
    );
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_a_json_400_without_challenge() -> Result<()> {
    let resp = router()
        .oneshot(request("POST", "/drinks", Some("Bearer not-a-token")))
        .await?;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    assert_eq!(body_json(resp).await?["error"], json!(400));
    Ok(())
}

#[tokio::test]
async fn any_caller_guard_admits_empty_permission_list() -> Result<()> {
    let resp = router()
        .oneshot(request("GET", "/whoami", Some(&bearer(&[]))))
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await?.to_bytes();
    assert_eq!(&body[..], b"0");
    Ok(())
}
