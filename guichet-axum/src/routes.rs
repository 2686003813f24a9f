use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use guichet_core::{
    AccountId, CredentialHasher,
    repositories::{AccountRepositoryAdapter, RepositoryProvider, TokenRepositoryAdapter},
    services::{AccountService, AuthService, Notifier, Registration},
};

use crate::{
    error::{ApiError, Result},
    types::*,
};

/// Shared handler state: the orchestrator services plus the provider handle
/// for health checks.
pub struct AppState<R: RepositoryProvider> {
    pub auth: Arc<AuthService<AccountRepositoryAdapter<R>, TokenRepositoryAdapter<R>>>,
    pub accounts: Arc<AccountService<AccountRepositoryAdapter<R>>>,
    pub repositories: Arc<R>,
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            accounts: self.accounts.clone(),
            repositories: self.repositories.clone(),
        }
    }
}

impl<R: RepositoryProvider> AppState<R> {
    pub fn new(
        repositories: Arc<R>,
        hasher: Arc<CredentialHasher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let account_repo = Arc::new(AccountRepositoryAdapter::new(repositories.clone()));
        let token_repo = Arc::new(TokenRepositoryAdapter::new(repositories.clone()));

        Self {
            auth: Arc::new(AuthService::new(
                account_repo.clone(),
                token_repo,
                hasher.clone(),
                notifier,
            )),
            accounts: Arc::new(AccountService::new(account_repo, hasher)),
            repositories,
        }
    }
}

pub fn create_router<R>(state: AppState<R>) -> Router
where
    R: RepositoryProvider + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/verify-email", get(verify_email_handler))
        .route("/auth/resend-verify", post(resend_verify_handler))
        .route("/auth/forgot-password", post(forgot_password_handler))
        .route("/auth/reset-password", post(reset_password_handler))
        .route(
            "/users",
            get(list_accounts_handler).post(create_account_handler),
        )
        .route(
            "/users/{id}",
            get(get_account_handler)
                .patch(update_account_handler)
                .delete(delete_account_handler),
        )
        .with_state(state)
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .repositories
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn register_handler<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .auth
        .register(Registration {
            email: request.email,
            password: request.password,
            display_name: request.display_name,
            role: request.role,
        })
        .await
        .map_err(ApiError::from_auth)?;

    Ok((StatusCode::CREATED, Json(AccountSummary::from(&account))))
}

async fn login_handler<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .auth
        .login(&request.email, &request.password)
        .await
        .map_err(ApiError::from_auth)?;

    Ok(Json(AccountSummary::from(&account)))
}

async fn verify_email_handler<R>(
    State(state): State<AppState<R>>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .auth
        .verify_email(&query.token)
        .await
        .map_err(ApiError::from_auth)?;

    tracing::debug!(account_id = %account.id, "email verified over http");
    Ok(Json(MessageResponse::new("Email verified")))
}

/// Always answers with [`GENERIC_ACK`]. Internal failures are logged and
/// swallowed so the body stays identical on every path.
async fn resend_verify_handler<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<EmailRequest>,
) -> Json<MessageResponse>
where
    R: RepositoryProvider,
{
    if let Err(e) = state.auth.resend_verify(&request.email).await {
        tracing::error!(error = %e, "resend-verify failed");
    }
    Json(MessageResponse::new(GENERIC_ACK))
}

/// Always answers with [`GENERIC_ACK`], same contract as resend-verify.
async fn forgot_password_handler<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<EmailRequest>,
) -> Json<MessageResponse>
where
    R: RepositoryProvider,
{
    if let Err(e) = state.auth.forgot_password(&request.email).await {
        tracing::error!(error = %e, "forgot-password failed");
    }
    Json(MessageResponse::new(GENERIC_ACK))
}

async fn reset_password_handler<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .auth
        .reset_password(&request.token, &request.password)
        .await
        .map_err(ApiError::from_auth)?;

    Ok(Json(MessageResponse::new("Password updated")))
}

/// Admin-side creation. Same request shape as registration, but no
/// verification token is issued and nothing is mailed.
async fn create_account_handler<R>(
    State(state): State<AppState<R>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .accounts
        .create(Registration {
            email: request.email,
            password: request.password,
            display_name: request.display_name,
            role: request.role,
        })
        .await
        .map_err(ApiError::from_admin)?;

    Ok((StatusCode::CREATED, Json(AccountSummary::from(&account))))
}

async fn list_accounts_handler<R>(
    State(state): State<AppState<R>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let accounts = state
        .accounts
        .list(query.limit)
        .await
        .map_err(ApiError::from_admin)?;

    Ok(Json(
        accounts.iter().map(AccountSummary::from).collect::<Vec<_>>(),
    ))
}

async fn get_account_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .accounts
        .get(&AccountId::from(id.as_str()))
        .await
        .map_err(ApiError::from_admin)?;

    Ok(Json(AccountSummary::from(&account)))
}

async fn update_account_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let account = state
        .accounts
        .update(
            &AccountId::from(id.as_str()),
            request.display_name,
            request.role,
        )
        .await
        .map_err(ApiError::from_admin)?;

    Ok(Json(AccountSummary::from(&account)))
}

async fn delete_account_handler<R>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .accounts
        .remove(&AccountId::from(id.as_str()))
        .await
        .map_err(ApiError::from_admin)?;

    Ok(Json(MessageResponse::new("Account deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use guichet_core::services::{Notifier, NotifyError};
    use guichet_storage_sqlite::SqliteRepositoryProvider;
    use serde_json::{Value, json};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Records raw tokens in place of sending email, so tests can follow
    /// the links a user would click.
    #[derive(Default)]
    struct CapturingNotifier {
        tokens: Mutex<Vec<(String, String)>>,
    }

    impl CapturingNotifier {
        fn last_token(&self) -> String {
            self.tokens.lock().unwrap().last().unwrap().1.clone()
        }
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        async fn verification_requested(
            &self,
            email: &str,
            raw_token: &str,
        ) -> std::result::Result<(), NotifyError> {
            self.tokens
                .lock()
                .unwrap()
                .push((email.to_string(), raw_token.to_string()));
            Ok(())
        }

        async fn password_reset_requested(
            &self,
            email: &str,
            raw_token: &str,
        ) -> std::result::Result<(), NotifyError> {
            self.tokens
                .lock()
                .unwrap()
                .push((email.to_string(), raw_token.to_string()));
            Ok(())
        }
    }

    async fn setup() -> (Router, Arc<CapturingNotifier>) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
        repositories.provision().await.unwrap();

        let notifier = Arc::new(CapturingNotifier::default());
        let state = AppState::new(
            repositories,
            Arc::new(CredentialHasher::fast_for_tests()),
            notifier.clone(),
        );

        (create_router(state), notifier)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = setup().await;
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_returns_created_summary() {
        let (app, _) = setup().await;
        let response = app
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "password123", "display_name": "Alice"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["role"], "visiteur");
        assert_eq!(body["email_verified"], false);
        // the hash never leaks
        assert!(body.get("credential_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let (app, _) = setup().await;
        let payload = json!({"email": "a@x.com", "password": "password123"});
        app.clone()
            .oneshot(post_json("/auth/register", payload.clone()))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/auth/register", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["error"], "Email already in use");
    }

    #[tokio::test]
    async fn test_register_weak_password_is_bad_request_with_details() {
        let (app, _) = setup().await;
        let response = app
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "nope"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_admin_create_returns_summary_without_mailing() {
        let (app, notifier) = setup().await;
        let response = app
            .clone()
            .oneshot(post_json(
                "/users",
                json!({"email": "Ops@Example.COM", "password": "password123", "role": "agent"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["email"], "ops@example.com");
        assert_eq!(body["role"], "agent");
        assert_eq!(body["email_verified"], false);
        // unlike self-registration, nothing is mailed
        assert!(notifier.tokens.lock().unwrap().is_empty());

        let response = app
            .oneshot(post_json(
                "/users",
                json!({"email": "ops@example.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_status_asymmetry() {
        let (app, notifier) = setup().await;
        app.clone()
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();

        // unverified with correct credentials: 403
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // wrong password: 401
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "password124"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // verify through the emailed link, then 200
        let token = notifier.last_token();
        let response = app
            .clone()
            .oneshot(get(&format!(
                "/auth/verify-email?token={}",
                urlencode(&token)
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email_verified"], true);
    }

    #[tokio::test]
    async fn test_verify_email_token_reuse_is_bad_request() {
        let (app, notifier) = setup().await;
        app.clone()
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();

        let token = notifier.last_token();
        let uri = format!("/auth/verify-email?token={}", urlencode(&token));

        let first = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let replay = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(replay).await["error"],
            "Invalid or expired token"
        );
    }

    #[tokio::test]
    async fn test_forgot_password_body_is_identical_for_all_inputs() {
        let (app, notifier) = setup().await;
        app.clone()
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        let token = notifier.last_token();
        app.clone()
            .oneshot(get(&format!(
                "/auth/verify-email?token={}",
                urlencode(&token)
            )))
            .await
            .unwrap();

        let mut bodies = Vec::new();
        for email in ["a@x.com", "ghost@x.com", "not-an-email"] {
            let response = app
                .clone()
                .oneshot(post_json("/auth/forgot-password", json!({"email": email})))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            bodies.push(body_json(response).await);
        }

        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[1], bodies[2]);
    }

    #[tokio::test]
    async fn test_reset_password_end_to_end() {
        let (app, notifier) = setup().await;
        app.clone()
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        let verify_token = notifier.last_token();
        app.clone()
            .oneshot(get(&format!(
                "/auth/verify-email?token={}",
                urlencode(&verify_token)
            )))
            .await
            .unwrap();

        app.clone()
            .oneshot(post_json("/auth/forgot-password", json!({"email": "a@x.com"})))
            .await
            .unwrap();
        let reset_token = notifier.last_token();

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/reset-password",
                json!({"token": reset_token, "password": "new_password456"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // new credential works, old one does not
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "new_password456"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_users_crud_surface() {
        let (app, _) = setup().await;
        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/register",
                json!({"email": "a@x.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        // list
        let response = app.clone().oneshot(get("/users")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        // patch role and display name
        let request = Request::builder()
            .method("PATCH")
            .uri(format!("/users/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"display_name": "Alice", "role": "agent"}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], "agent");
        assert_eq!(body["display_name"], "Alice");

        // delete, then 404 on lookup
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/users/{id}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get(&format!("/users/{id}"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_not_found() {
        let (app, _) = setup().await;
        let response = app.oneshot(get("/users/acct_missing")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // minimal query-string escaping for the base64url token alphabet
    fn urlencode(raw: &str) -> String {
        raw.replace('+', "%2B").replace('/', "%2F").replace('=', "%3D")
    }
}
