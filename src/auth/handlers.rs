use axum::{extract::State, Json};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    generators::{PetNameUsernameGenerator, UsernameGenerator},
    types::TokenResponse,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for issuing a new identity
///
/// POST /api/auth/session
/// Returns a signed token, a fresh user id and a generated username
#[instrument(name = "create_identity", skip(state))]
pub async fn create_identity(
    State(state): State<AppState>,
) -> Result<Json<TokenResponse>, AppError> {
    let user_id = Uuid::new_v4().to_string();
    let username = PetNameUsernameGenerator.generate();
    let token = state.tokens.create_token(&user_id, &username)?;

    info!(
        user_id = %user_id,
        username = %username,
        "Identity issued"
    );

    Ok(Json(TokenResponse {
        token,
        user_id,
        username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_create_identity_handler() {
        let app_state = AppStateBuilder::new().build();
        let tokens = app_state.tokens.clone();

        let app = Router::new()
            .route("/api/auth/session", axum::routing::post(create_identity))
            .with_state(app_state);

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/session")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let issued: TokenResponse = serde_json::from_slice(&body).unwrap();

        assert!(issued.username.contains('-')); // Pet names have dashes
        let identity = tokens.validate_token(&issued.token).unwrap();
        assert_eq!(identity.user_id, issued.user_id);
        assert_eq!(identity.username, issued.username);
    }
}
