//! Authentication core: credential verification and registration

use crate::error::{BookshelfError, BookshelfResult};
use crate::password::PasswordHasher;
use crate::token::{IssuedToken, TokenService};
use crate::traits::CredentialStore;
use crate::types::*;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Verified against when the email is unknown, so that path also costs one hash check
const DUMMY_PASSWORD: &str = "bookshelf-dummy-password";

/// Outcome of a credential check. Unknown email and wrong password are the
/// same `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialCheck {
    Authenticated(UserInfo),
    Failed,
}

impl CredentialCheck {
    pub fn into_result(self) -> BookshelfResult<UserInfo> {
        match self {
            CredentialCheck::Authenticated(user) => Ok(user),
            CredentialCheck::Failed => Err(BookshelfError::InvalidCredential),
        }
    }
}

/// A user together with a freshly issued token
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthSession {
    pub user: UserInfo,
    pub token: IssuedToken,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenService,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Resolve an (email, password) pair to a user. Store failures are errors,
    /// never `Failed`.
    pub async fn verify_credential(
        &self,
        email: &str,
        password: &str,
    ) -> BookshelfResult<CredentialCheck> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            let dummy = self.dummy_hash().await?;
            self.hasher
                .spawn_verify(dummy.to_string(), password.to_string())
                .await?;
            warn!(email = %email, "Login attempt for unknown email");
            return Ok(CredentialCheck::Failed);
        };

        let matches = self
            .hasher
            .spawn_verify(user.password_hash.clone(), password.to_string())
            .await?;

        if matches {
            Ok(CredentialCheck::Authenticated(user.to_user_info()))
        } else {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            Ok(CredentialCheck::Failed)
        }
    }

    pub async fn is_duplicate_email(&self, email: &str) -> BookshelfResult<bool> {
        self.users.exists_by_email(&normalize_email(email)).await
    }

    async fn dummy_hash(&self) -> BookshelfResult<&str> {
        self.dummy_hash
            .get_or_try_init(|| self.hasher.spawn_hash(DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    /// Hash the password and persist the user
    pub async fn create_user(&self, request: RegisterRequest) -> BookshelfResult<UserInfo> {
        let password_hash = self.hasher.spawn_hash(request.password).await?;

        let new_user = NewUser {
            name: request.name,
            email: normalize_email(&request.email),
            password_hash,
        };

        let user = self.users.insert(new_user).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user.to_user_info())
    }

    pub async fn login(&self, request: LoginRequest) -> BookshelfResult<AuthSession> {
        let user = self
            .verify_credential(&request.email, &request.password)
            .await?
            .into_result()?;

        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }

    /// The duplicate check is best effort; the store rejects a racing insert
    /// with `DuplicateEmail` as well.
    pub async fn register(&self, request: RegisterRequest) -> BookshelfResult<AuthSession> {
        if self.is_duplicate_email(&request.email).await? {
            return Err(BookshelfError::DuplicateEmail);
        }

        let user = self.create_user(request).await?;
        let token = self.tokens.issue(user.id)?;
        Ok(AuthSession { user, token })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::memory::MemoryCredentialStore;
    use crate::password::test_hasher;

    pub(crate) fn test_tokens() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    pub(crate) fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryCredentialStore::new()),
            test_hasher(),
            test_tokens(),
        )
    }

    #[tokio::test]
    async fn test_registered_credential_verifies() {
        let auth = service();
        let user = auth.create_user(registration("ada@x.com")).await.unwrap();

        let check = auth
            .verify_credential("ada@x.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(check, CredentialCheck::Authenticated(user));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let auth = service();
        auth.create_user(registration("ada@x.com")).await.unwrap();

        let wrong_password = auth
            .verify_credential("ada@x.com", "battery staple")
            .await
            .unwrap();
        let unknown_email = auth
            .verify_credential("nobody@x.com", "correct horse")
            .await
            .unwrap();

        assert_eq!(wrong_password, CredentialCheck::Failed);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(
            wrong_password.into_result().unwrap_err().to_string(),
            unknown_email.into_result().unwrap_err().to_string()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_flips_after_create() {
        let auth = service();
        assert!(!auth.is_duplicate_email("ada@x.com").await.unwrap());
        auth.create_user(registration("ada@x.com")).await.unwrap();
        assert!(auth.is_duplicate_email("ada@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_twice_is_duplicate() {
        let auth = service();
        auth.register(registration("ada@x.com")).await.unwrap();
        let err = auth.register(registration("ada@x.com")).await.unwrap_err();
        assert!(matches!(err, BookshelfError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_insert_race_still_reports_duplicate() {
        let auth = service();
        // Both pass the guard; only one insert may win.
        let (first, second) = tokio::join!(
            auth.create_user(registration("ada@x.com")),
            auth.create_user(registration("ada@x.com"))
        );
        let failures = [first, second]
            .into_iter()
            .filter_map(Result::err)
            .collect::<Vec<_>>();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], BookshelfError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_padded_email_is_the_same_account() {
        let auth = service();
        auth.register(registration("a@x.com")).await.unwrap();

        let err = auth.register(registration(" a@x.com ")).await.unwrap_err();
        assert!(matches!(err, BookshelfError::DuplicateEmail));

        let err = auth.create_user(registration("a@x.com  ")).await.unwrap_err();
        assert!(matches!(err, BookshelfError::DuplicateEmail));

        assert!(matches!(
            auth.verify_credential(" a@x.com", "correct horse").await.unwrap(),
            CredentialCheck::Authenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_padded_registration_is_stored_trimmed() {
        let auth = service();
        let session = auth.register(registration("  b@x.com ")).await.unwrap();

        assert_eq!(session.user.email, "b@x.com");
        assert!(auth.is_duplicate_email("b@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_email_still_runs_a_hash_check() {
        let auth = service();
        assert!(!auth.dummy_hash.initialized());

        let check = auth
            .verify_credential("nobody@x.com", "correct horse")
            .await
            .unwrap();

        assert_eq!(check, CredentialCheck::Failed);
        assert!(auth.dummy_hash.initialized());
        let dummy = auth.dummy_hash().await.unwrap();
        assert!(dummy.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_login_issues_token_for_user() {
        let auth = service();
        let registered = auth.register(registration("ada@x.com")).await.unwrap();

        let session = auth
            .login(LoginRequest {
                email: "ada@x.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();

        let claims = auth.tokens().validate(&session.token.access_token).unwrap();
        assert_eq!(claims.user_id(), Ok(registered.user.id));
    }

    #[tokio::test]
    async fn test_bad_login_is_invalid_credential() {
        let auth = service();
        let err = auth
            .login(LoginRequest {
                email: "nobody@x.com".to_string(),
                password: "whatever".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookshelfError::InvalidCredential));
    }
}
