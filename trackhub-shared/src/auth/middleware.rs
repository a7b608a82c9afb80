/// Bearer-token authentication for Axum
///
/// `authenticate_bearer` turns an `Authorization: Bearer <token>` header into
/// an [`AuthContext`]. A `route_layer` middleware stores the context in the
/// request extensions, where handlers pick it up as an extractor.
///
/// # Example
///
/// ```no_run
/// use axum::{
///     extract::Request,
///     middleware::{self, Next},
///     response::{IntoResponse, Response},
///     routing::get,
///     Router,
/// };
/// use trackhub_shared::auth::middleware::{authenticate_bearer, AuthContext};
///
/// const SECRET: &str = "your-jwt-secret-at-least-32-characters";
///
/// async fn require_bearer(mut req: Request, next: Next) -> Response {
///     match authenticate_bearer(req.headers(), SECRET) {
///         Ok(auth) => {
///             req.extensions_mut().insert(auth);
///             next.run(req).await
///         }
///         Err(e) => e.into_response(),
///     }
/// }
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.display_name())
/// }
///
/// let app: Router = Router::new()
///     .route("/protected", get(protected_handler))
///     .route_layer(middleware::from_fn(require_bearer));
/// ```

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};

/// Authenticated caller, added to request extensions
///
/// `email` is the identity the access checks compare against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }

    /// Identity used for authorization
    pub fn identity(&self) -> &str {
        &self.email
    }

    /// Name shown next to things the caller writes; falls back to the email
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Extracts and validates the bearer token from request headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if there is no readable Authorization header
/// - `AuthError::InvalidFormat` if it is not `Bearer <token>`
/// - `AuthError::InvalidToken` if the token is expired, forged or a refresh token
pub fn authenticate_bearer(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    if claims.email.is_empty() {
        return Err(AuthError::InvalidToken("Token carries no identity".to_string()));
    }

    Ok(AuthContext::from_claims(claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, TokenType};
    use axum::http::HeaderValue;
    use chrono::Duration;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ada@example.com", TokenType::Access).with_name("Ada");

        let context = AuthContext::from_claims(claims);

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.identity(), "ada@example.com");
        assert_eq!(context.display_name(), "Ada");

        let nameless = AuthContext {
            name: String::new(),
            ..context
        };
        assert_eq!(nameless.display_name(), "ada@example.com");
    }

    #[test]
    fn test_authenticate_bearer_valid() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ada@example.com", TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let context = authenticate_bearer(&bearer(&token), SECRET).unwrap();
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.email, "ada@example.com");
    }

    #[test]
    fn test_authenticate_bearer_missing_header() {
        let result = authenticate_bearer(&HeaderMap::new(), SECRET);
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn test_authenticate_bearer_wrong_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));

        let result = authenticate_bearer(&headers, SECRET);
        assert!(matches!(result, Err(AuthError::InvalidFormat(_))));
    }

    #[test]
    fn test_authenticate_bearer_rejects_refresh_token() {
        let claims = Claims::new(Uuid::new_v4(), "ada@example.com", TokenType::Refresh);
        let token = create_token(&claims, SECRET).unwrap();

        let result = authenticate_bearer(&bearer(&token), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_authenticate_bearer_expired() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            "ada@example.com",
            TokenType::Access,
            Duration::seconds(-3600),
        );
        let token = create_token(&claims, SECRET).unwrap();

        match authenticate_bearer(&bearer(&token), SECRET) {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_authenticate_bearer_empty_identity() {
        let claims = Claims::new(Uuid::new_v4(), "", TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let result = authenticate_bearer(&bearer(&token), SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_extractor_reads_authenticated_context() {
        let claims = Claims::new(Uuid::new_v4(), "ada@example.com", TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();
        let context = authenticate_bearer(&bearer(&token), SECRET).unwrap();

        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        parts.extensions.insert(context.clone());

        let extracted = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, context);
    }

    #[tokio::test]
    async fn test_extractor_rejects_unauthenticated_request() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();

        let result = AuthContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }
}
