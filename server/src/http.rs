use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use platform_api::ApiError;
use products_hr::{Employee, FieldValues, SelectOption};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument};

use crate::{
    config::AppConfig,
    graphql::{self, SchemaType},
    hr::{self, HrEvents, Intake, SharedHr},
};

#[derive(Clone)]
pub struct AppState {
    pub hr: SharedHr,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// One roster per process, shared by the REST and GraphQL surfaces.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let events = HrEvents::new(config.event_buffer);
        let hr = hr::shared_module(config.intake_policy(), &events);
        let schema = graphql::build_schema(hr.clone(), events);
        Self { hr, schema, config }
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hr server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/employees",
            get(list_employees_handler).post(create_employee_handler),
        )
        .route("/api/reference/states", get(states_handler))
        .route("/api/reference/departments", get(departments_handler))
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/graphiql", get(graphiql_handler))
        .route_service("/graphql/ws", GraphQLSubscription::new(state.schema.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn graphql_handler(
    State(state): State<AppState>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

async fn graphiql_handler() -> Html<String> {
    Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql/ws")
            .finish(),
    )
}

async fn list_employees_handler(State(state): State<AppState>) -> Json<Vec<Employee>> {
    Json(state.hr.read().await.employees())
}

#[instrument(name = "http.create_employee", skip_all)]
async fn create_employee_handler(
    State(state): State<AppState>,
    payload: Result<Json<FieldValues>, JsonRejection>,
) -> HttpResult<(StatusCode, Json<Intake>)> {
    let Json(values) = payload.map_err(|rejection| {
        HttpError::from(ApiError::InvalidInput(rejection.body_text()))
    })?;
    let intake = hr::submit(&state.hr, &values).await?;
    Ok((StatusCode::CREATED, Json(intake)))
}

async fn states_handler(State(state): State<AppState>) -> Json<Vec<SelectOption>> {
    Json(state.hr.read().await.states())
}

async fn departments_handler(State(state): State<AppState>) -> Json<Vec<SelectOption>> {
    Json(state.hr.read().await.departments())
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        employees: state.hr.read().await.employee_count(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    employees: usize,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    body: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            body: ErrorBody {
                error: err.to_string(),
                code: err.code(),
                field: err.field().map(str::to_string),
            },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use products_hr::EMPLOYEE_ADDED_MESSAGE;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app_with(config: AppConfig) -> Router {
        build_router(AppState::new(Arc::new(config)))
    }

    fn app() -> Router {
        app_with(AppConfig::default())
    }

    async fn send(app: &Router, request: http::Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> http::Request<Body> {
        http::Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> http::Request<Body> {
        http::Request::post(uri)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn ada() -> Value {
        json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dateOfBirth": "10/12/1815",
            "startDate": "01/01/2020",
            "street": "1 Main St",
            "city": "London",
            "state": "NY",
            "zipCode": "10001",
            "department": "Engineering"
        })
    }

    #[tokio::test]
    async fn health_reports_roster_size() {
        let (status, body) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["employees"], json!(0));
    }

    #[tokio::test]
    async fn created_employee_is_listed() {
        let app = app();
        let (status, body) = send(&app, post_json("/api/employees", ada())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["employee"], ada());
        assert_eq!(body["confirmation"], json!(EMPLOYEE_ADDED_MESSAGE));
        assert_eq!(body["total"], json!(1));

        let (status, body) = send(&app, get("/api/employees")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([ada()]));
    }

    #[tokio::test]
    async fn list_preserves_submission_order() {
        let app = app();
        for name in ["Ada", "Grace", "Edsger"] {
            let request = post_json("/api/employees", json!({ "firstName": name }));
            let (status, _) = send(&app, request).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (_, body) = send(&app, get("/api/employees")).await;
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["firstName"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Ada", "Grace", "Edsger"]);
        assert_eq!(body[1]["city"], json!(""));
    }

    #[tokio::test]
    async fn numeric_zip_and_option_objects_are_accepted() {
        let (status, body) = send(
            &app(),
            post_json(
                "/api/employees",
                json!({
                    "zipCode": 10001,
                    "department": { "value": "Legal", "label": "Legal" }
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["employee"]["zipCode"], json!("10001"));
        assert_eq!(body["employee"]["department"], json!("Legal"));
    }

    #[tokio::test]
    async fn non_object_body_is_rejected() {
        let (status, body) = send(&app(), post_json("/api/employees", json!(["Ada"]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn strict_mode_rejects_incomplete_forms() {
        let app = app_with(AppConfig {
            require_all_fields: true,
            ..AppConfig::default()
        });
        let (status, body) = send(
            &app,
            post_json("/api/employees", json!({ "firstName": "Ada" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({
                "error": "missing required field `lastName`",
                "code": "MISSING_FIELD",
                "field": "lastName"
            })
        );

        let (_, body) = send(&app, get("/api/employees")).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn reference_routes_serve_option_lists() {
        let app = app();
        let (status, departments) = send(&app, get("/api/reference/departments")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(departments.as_array().unwrap().len(), 5);

        let (_, states) = send(&app, get("/api/reference/states")).await;
        assert!(
            states
                .as_array()
                .unwrap()
                .contains(&json!({ "value": "NY", "label": "New York" }))
        );
    }

    #[tokio::test]
    async fn rest_and_graphql_share_one_roster() {
        let app = app();
        send(&app, post_json("/api/employees", ada())).await;

        let (status, body) = send(
            &app,
            post_json("/graphql", json!({ "query": "{ employees { lastName } }" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["employees"], json!([{ "lastName": "Lovelace" }]));
    }

    fn from_origin(origin: &str) -> http::Request<Body> {
        http::Request::get("/health")
            .header(http::header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn cors_allows_configured_origins_only() {
        let app = app_with(AppConfig {
            cors_allowed_origins: vec![HeaderValue::from_static("https://hr.example")],
            ..AppConfig::default()
        });

        let response = app.clone().oneshot(from_origin("https://hr.example")).await.unwrap();
        assert_eq!(
            response.headers().get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("https://hr.example"))
        );

        let response = app.oneshot(from_origin("https://evil.example")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            !response
                .headers()
                .contains_key(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
