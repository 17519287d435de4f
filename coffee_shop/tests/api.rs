use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use barista_auth::{
    testing::{self, TokenMint},
    AuthConfig, Gate, KeyCache, TokenVerifier,
};
use coffee_shop::{drinks::Menu, AppState};
use color_eyre::Result;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_allowing(origins: &[&str]) -> Router {
    let config = AuthConfig::for_domain("barista.test.auth0.com", testing::AUDIENCE);
    let origins: Vec<String> = origins.iter().map(|o| (*o).to_owned()).collect();

    coffee_shop::router(
        AppState {
            gate: Gate::new(
                KeyCache::fixed(testing::primary_jwks()),
                TokenVerifier::new(config.validator()),
            ),
            menu: Menu::seeded(),
        },
        coffee_shop::cors(&origins).unwrap(),
    )
}

fn app() -> Router {
    app_allowing(&[])
}

fn preflight(uri: &str, origin: &str, method: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, method)
        .header(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            "authorization,content-type",
        )
        .body(Body::empty())
        .unwrap()
}

fn bearer(permissions: &[&str]) -> String {
    let token = TokenMint::primary().sign(&testing::claims(permissions));
    format!("Bearer {}", token.as_str())
}

fn request(method: &str, uri: &str, permissions: Option<&[&str]>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(permissions) = permissions {
        builder = builder.header(header::AUTHORIZATION, bearer(permissions));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(resp: Response) -> Result<Value> {
    let bytes = resp.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn latte() -> Value {
    json!({
        "title": "latte",
        "recipe": [
            {"name": "espresso", "color": "brown", "parts": 1},
            {"name": "milk", "color": "white", "parts": 3},
        ],
    })
}

#[tokio::test]
async fn public_routes_need_no_token() -> Result<()> {
    let resp = app().oneshot(request("GET", "/", None, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app().oneshot(request("GET", "/drinks", None, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await?,
        json!({
            "success": true,
            "drinks": [{"id": 1, "title": "water", "recipe": [{"color": "blue", "parts": 1}]}],
        })
    );
    Ok(())
}

#[tokio::test]
async fn drinks_detail_requires_its_permission() -> Result<()> {
    let resp = app()
        .oneshot(request("GET", "/drinks-detail", None, None))
        .await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app()
        .oneshot(request("GET", "/drinks-detail", Some(&["post:drinks"]), None))
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await?["message"], "Permission not found.");

    let resp = app()
        .oneshot(request(
            "GET",
            "/drinks-detail",
            Some(&["get:drinks-detail"]),
            None,
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await?["drinks"][0]["recipe"][0]["name"],
        "water"
    );
    Ok(())
}

#[tokio::test]
async fn create_update_delete_round() -> Result<()> {
    let app = app();

    let resp = app
        .clone()
        .oneshot(request("POST", "/drinks", Some(&["post:drinks"]), Some(latte())))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = json_body(resp).await?;
    assert_eq!(created["drinks"][0]["title"], "latte");
    let id = created["drinks"][0]["id"].as_u64().unwrap();

    let resp = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/drinks/{id}"),
            Some(&["patch:drinks"]),
            Some(json!({"title": "flat white"})),
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await?;
    assert_eq!(updated["drinks"][0]["title"], "flat white");
    assert_eq!(updated["drinks"][0]["recipe"][1]["parts"], 3);

    let resp = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/drinks/{id}"),
            Some(&["delete:drinks"]),
            None,
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await?, json!({"success": true, "delete": id}));

    let resp = app
        .oneshot(request(
            "DELETE",
            &format!("/drinks/{id}"),
            Some(&["delete:drinks"]),
            None,
        ))
        .await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(resp).await?,
        json!({"success": false, "error": 404, "message": "resource not found"})
    );
    Ok(())
}

#[tokio::test]
async fn incomplete_drink_is_unprocessable() -> Result<()> {
    for body in [json!({"title": "cortado"}), json!({"recipe": []}), json!("latte")] {
        let resp = app()
            .oneshot(request("POST", "/drinks", Some(&["post:drinks"]), Some(body.clone())))
            .await?;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(
            json_body(resp).await?,
            json!({"success": false, "error": 422, "message": "unprocessable"})
        );
    }
    Ok(())
}

#[tokio::test]
async fn authorization_runs_before_the_body_is_considered() -> Result<()> {
    let resp = app()
        .oneshot(request("POST", "/drinks", Some(&["get:drinks-detail"]), Some(json!({}))))
        .await?;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn unknown_drink_is_not_found() -> Result<()> {
    for uri in ["/drinks/42", "/drinks/not-a-number"] {
        let resp = app()
            .oneshot(request(
                "PATCH",
                uri,
                Some(&["patch:drinks"]),
                Some(latte()),
            ))
            .await?;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let resp = app().oneshot(request("GET", "/teapot", None, None)).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn me_reports_subject_and_permissions() -> Result<()> {
    let resp = app()
        .oneshot(request(
            "GET",
            "/me",
            Some(&["get:drinks-detail", "post:drinks"]),
            None,
        ))
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await?,
        json!({
            "success": true,
            "subject": testing::SUBJECT,
            "permissions": ["get:drinks-detail", "post:drinks"],
        })
    );
    Ok(())
}

#[tokio::test]
async fn preflight_is_answered_without_a_token() -> Result<()> {
    let resp = app()
        .oneshot(preflight("/drinks/1", "http://localhost:8100", "PATCH"))
        .await?;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str()?;
    for method in ["GET", "POST", "PATCH", "DELETE"] {
        assert!(methods.contains(method), "{methods}");
    }

    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()?
        .to_ascii_lowercase();
    assert!(allowed.contains("authorization"), "{allowed}");
    assert!(allowed.contains("content-type"), "{allowed}");
    Ok(())
}

#[tokio::test]
async fn configured_origins_are_the_only_ones_echoed() -> Result<()> {
    let app = app_allowing(&["https://barista.example"]);

    let resp = app
        .clone()
        .oneshot(preflight("/drinks", "https://barista.example", "POST"))
        .await?;
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://barista.example"
    );

    let resp = app
        .oneshot(preflight("/drinks", "https://elsewhere.example", "POST"))
        .await?;
    assert!(resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    Ok(())
}

#[tokio::test]
async fn cors_headers_accompany_auth_failures() -> Result<()> {
    let mut req = request("GET", "/drinks-detail", None, None);
    req.headers_mut()
        .insert(header::ORIGIN, "http://localhost:8100".parse()?);

    let resp = app().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    Ok(())
}

#[test]
fn invalid_origin_is_rejected() {
    assert!(coffee_shop::cors(&["https://barista.example\n".to_owned()]).is_err());
}
