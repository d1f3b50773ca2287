use std::sync::Arc;

use tracing::info;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, Role, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::{hash_password, verify_password};

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Creates a `user`-role account and signs it in.
    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }

        let user = self.create_account(req, Role::User).await?;
        let access_token = self.issue_token(&user)?;

        Ok(AuthResult { user, access_token })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.users.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // keep the timing of a missing user close to a wrong password
                let _ = verify_password(&req.password, Self::DUMMY_PASSWORD_HASH);
                return Err(DomainError::InvalidCredentials);
            }
        };

        verify_password(&req.password, &user_creds.password_hash)?;

        let access_token = self.issue_token(&user_creds.user)?;

        Ok(AuthResult {
            user: user_creds.user,
            access_token,
        })
    }

    /// Creates the configured admin account unless the username is taken.
    /// Returns the account when it was created.
    pub(crate) async fn ensure_admin(
        &self,
        req: RegisterRequest,
    ) -> Result<Option<User>, DomainError> {
        let req = req.validate()?;

        if let Some(existing) = self.users.find_by_username(&req.username).await? {
            info!(
                username = %existing.user.username,
                role = %existing.user.role,
                "bootstrap admin already present"
            );
            return Ok(None);
        }

        let user = self.create_account(req, Role::Admin).await?;
        info!(user_id = %user.id, username = %user.username, "bootstrap admin created");
        Ok(Some(user))
    }

    async fn create_account(&self, req: RegisterRequest, role: Role) -> Result<User, DomainError> {
        let password_hash = hash_password(&req.password)?;
        self.users
            .create_user(NewUser {
                username: req.username,
                email: req.email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                role,
            })
            .await
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt
            .generate_token(user)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::AuthService;
    use crate::data::Pagination;
    use crate::data::repositories::memory::InMemoryStore;
    use crate::data::user_repository::{NewUser, UserCredentials, UserPatch, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest, Role, User};
    use crate::infrastructure::jwt::JwtService;
    use crate::infrastructure::password::hash_password;

    #[derive(Clone)]
    struct FakeUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
        login_credentials: Arc<Mutex<Option<UserCredentials>>>,
    }

    impl FakeUserRepo {
        fn new() -> Self {
            Self {
                created_input: Arc::new(Mutex::new(None)),
                login_credentials: Arc::new(Mutex::new(None)),
            }
        }

        fn set_login_credentials(&self, creds: Option<UserCredentials>) {
            *self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned") = creds;
        }

        fn take_created_input(&self) -> Option<NewUser> {
            self.created_input
                .lock()
                .expect("created input mutex poisoned")
                .take()
        }
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
            let user = User {
                id: Uuid::new_v4(),
                username: input.username.clone(),
                email: input.email.clone(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                role: input.role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(user)
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(self
                .login_credentials
                .lock()
                .expect("login credentials mutex poisoned")
                .clone())
        }

        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(None)
        }

        async fn get_user(&self, _id: Uuid) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn find_users(&self, _ids: &[Uuid]) -> Result<Vec<User>, DomainError> {
            Ok(Vec::new())
        }

        async fn list_users(&self, _pagination: Pagination) -> Result<Vec<User>, DomainError> {
            Ok(Vec::new())
        }

        async fn update_user(
            &self,
            _id: Uuid,
            _patch: UserPatch,
        ) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn soft_delete_user(&self, _id: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn register_creates_user_and_returns_token() {
        let repo = FakeUserRepo::new();
        let jwt = test_jwt();
        let service = AuthService::new(Arc::new(repo.clone()), jwt.clone());

        let result = service
            .register(register_request("  valid_user  ", "  VALID@EXAMPLE.COM  "))
            .await
            .expect("register must succeed");

        assert_eq!(result.user.username, "valid_user");
        assert_eq!(result.user.role, Role::User);

        let claims = jwt
            .verify_token(&result.access_token)
            .expect("issued token must verify");
        assert_eq!(claims.user_id, result.user.id);
        assert_eq!(claims.email, "valid@example.com");
        assert_eq!(claims.role, Role::User);

        let created = repo
            .take_created_input()
            .expect("create_user must be called");
        assert_eq!(created.username, "valid_user");
        assert_eq!(created.email, "valid@example.com");
        assert_eq!(created.first_name, "Ada");
        assert!(created.password_hash.starts_with("$argon2id$"));
        assert_ne!(created.password_hash, "very-secure-password");
    }

    #[tokio::test]
    async fn register_rejects_taken_username_and_email() {
        let store = InMemoryStore::new();
        let service = AuthService::new(Arc::new(store), test_jwt());

        service
            .register(register_request("first_user", "first@example.com"))
            .await
            .expect("first registration must succeed");

        let err = service
            .register(register_request("first_user", "other@example.com"))
            .await
            .expect_err("duplicate username must fail");
        assert!(matches!(err, DomainError::AlreadyExists(ref what) if what == "username"));

        let err = service
            .register(register_request("second_user", "FIRST@example.com"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, DomainError::AlreadyExists(ref what) if what == "email"));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_missing_user() {
        let repo = FakeUserRepo::new();
        repo.set_login_credentials(None);
        let service = AuthService::new(Arc::new(repo), test_jwt());

        let err = service
            .login(login_request("valid_user", "some-password"))
            .await
            .expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_invalid_credentials_for_wrong_password() {
        let repo = FakeUserRepo::new();
        let service = AuthService::new(Arc::new(repo.clone()), test_jwt());

        let hash = hash_password("correct-password").expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user("valid_user", Role::User),
            password_hash: hash,
        }));

        let err = service
            .login(login_request("valid_user", "wrong-password"))
            .await
            .expect_err("login must fail");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_returns_token_for_valid_credentials() {
        let repo = FakeUserRepo::new();
        let jwt = test_jwt();
        let service = AuthService::new(Arc::new(repo.clone()), jwt.clone());

        let user = sample_user("valid_user", Role::Admin);
        let hash = hash_password("correct-password").expect("hash must be created");
        repo.set_login_credentials(Some(UserCredentials {
            user: user.clone(),
            password_hash: hash,
        }));

        let result = service
            .login(login_request("valid_user", "correct-password"))
            .await
            .expect("login must succeed");
        assert_eq!(result.user.id, user.id);

        let claims = jwt
            .verify_token(&result.access_token)
            .expect("issued token must verify");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.username, "valid_user");
    }

    #[tokio::test]
    async fn ensure_admin_creates_account_once() {
        let store = InMemoryStore::new();
        let service = AuthService::new(Arc::new(store.clone()), test_jwt());

        let created = service
            .ensure_admin(register_request("root_admin", "root@example.com"))
            .await
            .expect("bootstrap must succeed")
            .expect("admin must be created");
        assert_eq!(created.role, Role::Admin);

        let again = service
            .ensure_admin(register_request("root_admin", "root@example.com"))
            .await
            .expect("second bootstrap must succeed");
        assert!(again.is_none());

        let result = service
            .login(login_request("root_admin", "very-secure-password"))
            .await
            .expect("bootstrap admin must be able to log in");
        assert_eq!(result.user.role, Role::Admin);
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "very-secure-password".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn sample_user(username: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(
            "0123456789abcdef0123456789abcdef",
            3600,
            JwtService::DEFAULT_ISSUER,
        ))
    }
}
