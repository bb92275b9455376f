//! In-process HTTP harness for end-to-end API tests.
//!
//! Mounts the same routes as the server over [`InMemoryStore`] so scenarios
//! exercise extractors, services and error mapping without a database.

use actix_http::Request;
use actix_web::body::to_bytes;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use foodgram::Trace;
use foodgram::inbound::http::health::{HealthState, live, ready};
use foodgram::inbound::http::test_utils::test_session_middleware;
use foodgram::inbound::http::{configure_api, configure_public};
use foodgram::test_support::InMemoryStore;
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct-horse";
/// One-pixel PNG.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn app(
    store: &InMemoryStore,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    App::new()
        .app_data(health)
        .app_data(web::Data::new(store.http_state()))
        .wrap(Trace)
        .service(
            web::scope("/api")
                .wrap(test_session_middleware())
                .configure(configure_api),
        )
        .configure(configure_public)
        .service(ready)
        .service(live)
}

/// Send `req`, optionally carrying `session`, and return status plus body.
///
/// Empty bodies come back as `Value::Null`; non-JSON bodies as a string.
pub async fn send<S>(
    app: &S,
    req: test::TestRequest,
    session: Option<&Cookie<'static>>,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = match session {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    };
    let res = test::call_service(app, req.to_request()).await;
    let status = res.status();
    let bytes = to_bytes(res.into_body()).await.unwrap_or_default();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

/// Register `username` and sign in, returning the session cookie and the
/// new user's id.
pub async fn signed_in_user<S>(app: &S, username: &str) -> (Cookie<'static>, i64)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/users/").set_json(json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "first_name": "Test",
            "last_name": "Cook",
            "password": PASSWORD,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {username}: {body}");
    let id = body["id"].as_i64().expect("user id");

    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/token/login/")
            .set_json(json!({"email": format!("{username}@example.com"), "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned();
    (cookie, id)
}

/// Recipe payload with the given ingredient lines and tags.
pub fn recipe_body(name: &str, ingredients: &[(i64, i64)], tags: &[i64]) -> Value {
    json!({
        "name": name,
        "text": "Mix everything and cook.",
        "cooking_time": 15,
        "image": PNG_DATA_URI,
        "tags": tags,
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| json!({"id": id, "amount": amount}))
            .collect::<Vec<_>>(),
    })
}

/// Create a recipe as `session`, returning its id.
pub async fn create_recipe<S>(app: &S, session: &Cookie<'static>, body: Value) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/recipes/").set_json(body),
        Some(session),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create recipe: {body}");
    body["id"].as_i64().expect("recipe id")
}
