use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use tower::ServiceExt;

use carshare_core::models::{ActingUser, NewUser, Role, User};
use carshare_db::Database;
use carshare_server::auth::TokenDirectory;
use carshare_server::routes;
use carshare_server::state::AppState;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";
pub const ADMIN_TOKEN: &str = "admin-token";

pub struct TestApp {
    pub router: Router,
    pub alice: User,
    pub bob: User,
    _container: ContainerAsync<GenericImage>,
}

impl TestApp {
    /// Sends a request through the router and returns the status and JSON body
    /// (`Null` when the body is empty).
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }
}

/// Spin up a PostgreSQL container, seed three users and return the app router.
pub async fn setup_test_app() -> TestApp {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "carshare_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let url = format!("postgresql://postgres:postgres@{host}:{port}/carshare_test");

    let pool = retry_connect(&url).await;
    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to run migrations");

    let alice = seed_user(&db, "alice", Role::User, Some(("Lyon", 45.76, 4.84))).await;
    let bob = seed_user(&db, "bob", Role::User, Some(("Paris", 48.86, 2.35))).await;
    let admin = seed_user(&db, "root", Role::Admin, None).await;

    let tokens = TokenDirectory::new(vec![
        (ALICE_TOKEN.to_string(), ActingUser::new(alice.id, Role::User)),
        (BOB_TOKEN.to_string(), ActingUser::new(bob.id, Role::User)),
        (ADMIN_TOKEN.to_string(), ActingUser::new(admin.id, Role::Admin)),
    ]);

    let state = Arc::new(AppState { db, tokens });

    TestApp {
        router: routes::router(state),
        alice,
        bob,
        _container: container,
    }
}

async fn seed_user(
    db: &Database,
    username: &str,
    role: Role,
    city: Option<(&str, f64, f64)>,
) -> User {
    let user = NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role,
        city: city.map(|(name, _, _)| name.to_string()),
        latitude: city.map(|(_, lat, _)| lat),
        longitude: city.map(|(_, _, lon)| lon),
    };
    db.user_repo()
        .insert(&user)
        .await
        .expect("Failed to seed user")
}

async fn retry_connect(url: &str) -> PgPool {
    for _ in 0..30 {
        if let Ok(pool) = PgPoolOptions::new().max_connections(5).connect(url).await {
            return pool;
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }
    panic!("Failed to connect to test database");
}
