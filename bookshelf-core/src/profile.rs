//! Profile read and update for the authenticated user

use crate::error::{BookshelfError, BookshelfResult};
use crate::not_found_error;
use crate::password::PasswordHasher;
use crate::traits::CredentialStore;
use crate::types::*;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl ProfileService {
    pub fn new(users: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// `NotFound` when the user was removed after the token was minted
    pub async fn profile(&self, identity: UserId) -> BookshelfResult<UserInfo> {
        self.users
            .find_by_id(identity)
            .await?
            .map(|user| user.to_user_info())
            .ok_or_else(|| not_found_error!(format!("user {identity}")))
    }

    pub async fn update_profile(
        &self,
        identity: UserId,
        update: ProfileUpdate,
    ) -> BookshelfResult<UserInfo> {
        let current = self
            .users
            .find_by_id(identity)
            .await?
            .ok_or_else(|| not_found_error!(format!("user {identity}")))?;

        let email = update.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if *email != current.email && self.users.exists_by_email(email).await? {
                return Err(BookshelfError::DuplicateEmail);
            }
        }

        let password_hash = match update.password {
            Some(password) => Some(self.hasher.spawn_hash(password).await?),
            None => None,
        };

        let changes = UserChanges {
            name: update.name,
            email,
            password_hash,
        };

        let user = self.users.update(identity, changes).await?;
        info!(user_id = %identity, "Profile updated");
        Ok(user.to_user_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::{registration, test_tokens};
    use crate::auth::{AuthService, CredentialCheck};
    use crate::memory::MemoryCredentialStore;
    use crate::password::test_hasher;

    fn services() -> (AuthService, ProfileService) {
        let users: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
        (
            AuthService::new(users.clone(), test_hasher(), test_tokens()),
            ProfileService::new(users, test_hasher()),
        )
    }

    #[tokio::test]
    async fn test_profile_of_unknown_user_is_not_found() {
        let (_, profiles) = services();
        let err = profiles.profile(UserId(7)).await.unwrap_err();
        assert!(matches!(err, BookshelfError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_name_change_keeps_password() {
        let (auth, profiles) = services();
        let user = auth.create_user(registration("ada@x.com")).await.unwrap();

        let update = ProfileUpdate {
            name: Some("Countess".to_string()),
            ..Default::default()
        };
        let updated = profiles.update_profile(user.id, update).await.unwrap();

        assert_eq!(updated.name, "Countess");
        assert!(matches!(
            auth.verify_credential("ada@x.com", "correct horse").await.unwrap(),
            CredentialCheck::Authenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_password_change_is_rehashed() {
        let (auth, profiles) = services();
        let user = auth.create_user(registration("ada@x.com")).await.unwrap();

        let update = ProfileUpdate {
            password: Some("new password".to_string()),
            ..Default::default()
        };
        profiles.update_profile(user.id, update).await.unwrap();

        assert_eq!(
            auth.verify_credential("ada@x.com", "correct horse").await.unwrap(),
            CredentialCheck::Failed
        );
        assert!(matches!(
            auth.verify_credential("ada@x.com", "new password").await.unwrap(),
            CredentialCheck::Authenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_taking_someone_elses_email_is_duplicate() {
        let (auth, profiles) = services();
        let ada = auth.create_user(registration("ada@x.com")).await.unwrap();
        auth.create_user(registration("bob@x.com")).await.unwrap();

        let update = ProfileUpdate {
            email: Some("bob@x.com".to_string()),
            ..Default::default()
        };
        let err = profiles.update_profile(ada.id, update).await.unwrap_err();
        assert!(matches!(err, BookshelfError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_padded_email_update_is_normalized() {
        let (auth, profiles) = services();
        let ada = auth.create_user(registration("ada@x.com")).await.unwrap();
        auth.create_user(registration("bob@x.com")).await.unwrap();

        let taken = ProfileUpdate {
            email: Some(" bob@x.com ".to_string()),
            ..Default::default()
        };
        let err = profiles.update_profile(ada.id, taken).await.unwrap_err();
        assert!(matches!(err, BookshelfError::DuplicateEmail));

        let fresh = ProfileUpdate {
            email: Some("  lovelace@x.com".to_string()),
            ..Default::default()
        };
        let updated = profiles.update_profile(ada.id, fresh).await.unwrap();
        assert_eq!(updated.email, "lovelace@x.com");
        assert!(matches!(
            auth.verify_credential("lovelace@x.com", "correct horse").await.unwrap(),
            CredentialCheck::Authenticated(_)
        ));
    }

    #[tokio::test]
    async fn test_resubmitting_own_email_is_allowed() {
        let (auth, profiles) = services();
        let ada = auth.create_user(registration("ada@x.com")).await.unwrap();

        let update = ProfileUpdate {
            email: Some("ada@x.com".to_string()),
            ..Default::default()
        };
        let updated = profiles.update_profile(ada.id, update).await.unwrap();
        assert_eq!(updated.email, "ada@x.com");
    }
}
