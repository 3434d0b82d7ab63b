use agenda_backend::{
    api::router::create_router,
    config::Config,
    domain::services::booking::BookingService,
    infra::repositories::{
        sqlite_appointment_repo::SqliteAppointmentRepo,
        sqlite_notification_repo::SqliteNotificationRepo,
        sqlite_rule_repo::SqliteRuleRepo,
        sqlite_service_repo::SqliteServiceRepo,
        sqlite_tenant_repo::SqliteTenantRepo,
    },
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{Datelike, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    tenant_id: Option<String>,
    role: Option<String>,
    exp: usize,
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            timezone: "America/Sao_Paulo".parse().unwrap(),
            auth_shared_secret: TEST_SECRET.to_string(),
        };

        let appointment_repo = Arc::new(SqliteAppointmentRepo::new(pool.clone()));
        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let notification_repo = Arc::new(SqliteNotificationRepo::new(pool.clone()));
        let booking_service = Arc::new(BookingService::new(
            appointment_repo.clone(),
            service_repo.clone(),
            notification_repo.clone(),
            config.timezone,
        ));

        let state = Arc::new(AppState {
            config: config.clone(),
            tenant_repo: Arc::new(SqliteTenantRepo::new(pool.clone())),
            service_repo,
            rule_repo: Arc::new(SqliteRuleRepo::new(pool.clone())),
            appointment_repo,
            notification_repo,
            booking_service,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub fn mint_token(&self, sub: &str, tenant_id: Option<&str>, role: Option<&str>) -> String {
        let claims = TestClaims {
            sub: sub.to_string(),
            tenant_id: tenant_id.map(str::to_string),
            role: role.map(str::to_string),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub fn owner_token(&self, tenant_id: &str) -> String {
        self.mint_token("owner-1", Some(tenant_id), Some("owner"))
    }

    pub fn client_token(&self, user_id: &str) -> String {
        self.mint_token(user_id, None, Some("client"))
    }

    pub async fn create_tenant(&self, name: &str, slug: &str) -> String {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/tenants")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "name": name, "slug": slug }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success(), "create_tenant failed");
        let body = parse_body(response).await;
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_service(&self, tenant_id: &str, name: &str, duration_minutes: i32) -> String {
        let token = self.owner_token(tenant_id);
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/{}/services", tenant_id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from(
                        json!({ "name": name, "duration_minutes": duration_minutes }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success(), "create_service failed");
        let body = parse_body(response).await;
        body["id"].as_str().unwrap().to_string()
    }

    pub async fn create_rule(
        &self,
        tenant_id: &str,
        weekday: i32,
        start_time: &str,
        end_time: &str,
        slot_minutes: i32,
    ) -> String {
        let token = self.owner_token(tenant_id);
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/{}/availability-rules", tenant_id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::from(
                        json!({
                            "weekday": weekday,
                            "start_time": start_time,
                            "end_time": end_time,
                            "slot_minutes": slot_minutes
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_success(), "create_rule failed");
        let body = parse_body(response).await;
        body["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Next calendar date at least a week out that falls on `weekday`
/// (0 = Sunday), formatted YYYY-MM-DD. The margin keeps booking times
/// safely in the future in any timezone.
pub fn upcoming_date(weekday: u32) -> String {
    let mut date = Utc::now().date_naive() + Duration::days(7);
    while date.weekday().num_days_from_sunday() != weekday {
        date += Duration::days(1);
    }
    date.format("%Y-%m-%d").to_string()
}
