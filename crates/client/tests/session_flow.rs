use reqwest::StatusCode;

use hagakure_api::config::ApiConfig;
use hagakure_client::{ApiClient, ClientError, MemorySessionStore, SqliteSessionStore};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let state = hagakure_api::app::build_state(&ApiConfig::default()).expect("failed to build state");
        let app = hagakure_api::app::build_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn admin_login_unlocks_writes_until_logout() {
    let srv = TestServer::spawn().await;
    let client = ApiClient::new(&srv.base_url, MemorySessionStore::new());
    assert!(!client.permissions().is_admin());
    assert!(client.permissions().can_view());

    let user = client.login("admin@hagakure.fr", "admin123").await.unwrap();
    assert!(user.roles.iter().any(|r| r == "ROLE_ADMIN"));

    let permissions = client.permissions();
    assert!(permissions.is_admin());
    assert!(permissions.can_create());
    assert!(permissions.can_edit());
    assert!(permissions.can_delete());

    let me = client.me().await.unwrap();
    assert_eq!(me.email.as_deref(), Some("admin@hagakure.fr"));

    client.logout().unwrap();
    assert!(!client.permissions().can_edit());
    assert!(matches!(client.me().await, Err(ClientError::NotLoggedIn)));
}

#[tokio::test]
async fn plain_user_gets_view_only() {
    let srv = TestServer::spawn().await;
    let client = ApiClient::new(&srv.base_url, MemorySessionStore::new());

    client.login("user@hagakure.fr", "user123").await.unwrap();

    let permissions = client.permissions();
    assert!(!permissions.is_admin());
    assert!(!permissions.can_edit());
    assert!(permissions.can_view());
}

#[tokio::test]
async fn failed_login_keeps_previous_session() {
    let srv = TestServer::spawn().await;
    let client = ApiClient::new(&srv.base_url, MemorySessionStore::new());
    client.login("admin@hagakure.fr", "admin123").await.unwrap();

    match client.login("admin@hagakure.fr", "wrong").await {
        Err(ClientError::Rejected { status, message }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "auth.login.rejected");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(client.permissions().is_admin());
}

#[tokio::test]
async fn sqlite_backed_session_survives_a_new_client() {
    let srv = TestServer::spawn().await;
    let tmp = tempfile::tempdir().unwrap();
    let db = tmp.path().join("session.db");

    let first = ApiClient::new(&srv.base_url, SqliteSessionStore::open(&db).unwrap());
    first.login("admin@hagakure.fr", "admin123").await.unwrap();
    drop(first);

    let second = ApiClient::new(&srv.base_url, SqliteSessionStore::open(&db).unwrap());
    assert!(second.permissions().is_admin());
    assert_eq!(second.me().await.unwrap().email.as_deref(), Some("admin@hagakure.fr"));
}
