use serde::Deserialize;
use tower_sessions::Session;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::error::{AuthError, LOGIN_FAILED, LOGOUT_FAILED, SIGNUP_FAILED};
use super::password::PasswordService;
use crate::account::validation::{EMAIL_RE, MOBILE_RE};
use crate::account::{NewUser, RepositoryError, UserId, UserRepository, UserSnapshot};
use crate::session::USER_KEY;

const FILL_ALL_FIELDS: &str = "Please fill in all fields.";

/// User Signup Request
///
/// Missing JSON fields deserialize as empty strings and are reported by
/// validation rather than rejected by the JSON extractor.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct SignupRequest {
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "ann@x.com")]
    #[validate(regex(path = *EMAIL_RE, message = "Please enter a valid email address."))]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
    #[schema(example = "5551234567")]
    #[validate(regex(path = *MOBILE_RE, message = "Please enter a valid 10-digit mobile number."))]
    pub mobile: String,
}

impl SignupRequest {
    /// Prompt for the first empty field, in form order
    fn missing_field(&self) -> Option<&'static str> {
        [
            (&self.name, "Please enter your name."),
            (&self.email, "Please enter your email."),
            (&self.password, "Please enter your password."),
            (&self.mobile, "Please enter your mobile number."),
        ]
        .into_iter()
        .find(|(value, _)| value.is_empty())
        .map(|(_, prompt)| prompt)
    }

    /// Fields the stored record cannot do without, validation bypass or not
    fn has_credentials(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.password.is_empty()
    }
}

/// Shape checks are reported email first, then mobile
const SHAPE_FIELDS: [&str; 2] = ["email", "mobile"];

fn first_shape_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    SHAPE_FIELDS
        .iter()
        .filter_map(|f| fields.get(*f))
        .filter_map(|errs| errs.first())
        .filter_map(|e| e.message.as_ref())
        .map(|m| m.to_string())
        .next()
        .unwrap_or_else(|| FILL_ALL_FIELDS.to_string())
}

/// User Login Request
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    #[schema(example = "ann@x.com")]
    pub email: String,
    #[schema(example = "secret1")]
    pub password: String,
}

/// Signup, login and logout over the credential store and the request's session
#[derive(Clone)]
pub struct UserAuthService {
    users: UserRepository,
    passwords: PasswordService,
    skip_signup_validation: bool,
}

impl UserAuthService {
    pub fn new(
        users: UserRepository,
        passwords: PasswordService,
        skip_signup_validation: bool,
    ) -> Self {
        if skip_signup_validation {
            tracing::warn!("Signup field validation is DISABLED (skip_signup_validation)");
        }
        Self {
            users,
            passwords,
            skip_signup_validation,
        }
    }

    /// Register a new user. Does not log the user in.
    pub async fn signup(&self, req: SignupRequest) -> Result<UserId, AuthError> {
        // 1-2. Every field present, then email and mobile shape
        if self.skip_signup_validation {
            // The bypass skips the form checks, not the record's required fields
            if !req.has_credentials() {
                return Err(AuthError::Validation(FILL_ALL_FIELDS.to_string()));
            }
        } else {
            if let Some(prompt) = req.missing_field() {
                return Err(AuthError::Validation(prompt.to_string()));
            }
            if let Err(errors) = req.validate() {
                return Err(AuthError::Validation(first_shape_message(&errors)));
            }
        }

        // 3. Hash password
        let password_hash = self.passwords.hash(req.password).await.map_err(|e| {
            tracing::error!("Signup hashing failed: {}", e);
            AuthError::Storage(SIGNUP_FAILED)
        })?;

        // 4. Insert; the UNIQUE constraint arbitrates concurrent signups
        let new_user = NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            mobile: Some(req.mobile),
        };
        match self.users.create(&new_user).await {
            Ok(user_id) => {
                tracing::info!(user_id, "User registered");
                Ok(user_id)
            }
            Err(RepositoryError::DuplicateEmail) => {
                tracing::warn!("Signup attempt for existing email");
                Err(AuthError::DuplicateEmail)
            }
            Err(RepositoryError::Validation(e)) => {
                tracing::debug!("Signup rejected by store: {}", e);
                Err(AuthError::Validation(FILL_ALL_FIELDS.to_string()))
            }
            Err(RepositoryError::Database(e)) => {
                tracing::error!("Signup database error: {}", e);
                Err(AuthError::Storage(SIGNUP_FAILED))
            }
        }
    }

    /// Verify credentials and bind the user to `session`.
    ///
    /// The session is moved to a fresh id first, so whatever id the request
    /// arrived with stops working.
    pub async fn login(&self, req: LoginRequest, session: &Session) -> Result<UserSnapshot, AuthError> {
        // 1. Require both fields
        if req.email.is_empty() || req.password.is_empty() {
            return Err(AuthError::Validation(
                "Please provide email and password.".to_string(),
            ));
        }

        // 2. Find user by email
        let user = self.users.find_by_email(&req.email).await.map_err(|e| {
            tracing::error!("Login database error: {}", e);
            AuthError::Storage(LOGIN_FAILED)
        })?;

        // 3. Verify password; unknown emails still pay for one verification
        let matched = match &user {
            Some(user) => {
                self.passwords
                    .verify(req.password, user.password_hash.clone())
                    .await
            }
            None => self.passwords.verify_dummy(req.password).await,
        }
        .map_err(|e| {
            tracing::error!("Login password verification error: {}", e);
            AuthError::Storage(LOGIN_FAILED)
        })?;

        let user = match (user, matched) {
            (Some(user), true) => user,
            (None, _) => {
                tracing::info!("Login failed: no such user");
                return Err(AuthError::InvalidCredentials);
            }
            (Some(user), false) => {
                tracing::info!(user_id = user.id, "Login failed: password mismatch");
                return Err(AuthError::InvalidCredentials);
            }
        };

        // 4. Rotate the id and persist the snapshot; store failures surface here
        let snapshot = user.snapshot();
        let established = async {
            session.cycle_id().await?;
            session.insert(USER_KEY, &snapshot).await?;
            session.save().await
        };
        established.await.map_err(|e| {
            tracing::error!("Session create failed: {}", e);
            AuthError::Storage(LOGIN_FAILED)
        })?;

        tracing::info!(user_id = snapshot.id, "Login successful");
        Ok(snapshot)
    }

    /// Destroy the session, if any. Repeated calls succeed.
    pub async fn logout(&self, session: &Session) -> Result<(), AuthError> {
        session.flush().await.map_err(|e| {
            tracing::error!("Logout error: {}", e);
            AuthError::Storage(LOGOUT_FAILED)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2Config;
    use crate::db::Database;
    use crate::db::schema::{init_sessions_schema, init_users_schema};
    use crate::session::SqliteSessionStore;
    use std::sync::Arc;
    use tower_sessions::SessionStore;

    async fn service(skip_validation: bool) -> (UserAuthService, SqliteSessionStore) {
        let db = Database::in_memory().await.unwrap();
        init_users_schema(&db).await.unwrap();
        init_sessions_schema(&db).await.unwrap();
        let passwords = PasswordService::new(&Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let svc = UserAuthService::new(UserRepository::new(db.clone()), passwords, skip_validation);
        (svc, SqliteSessionStore::new(db))
    }

    /// Session handle as the layer builds it for a request with no cookie
    fn fresh_session(store: &SqliteSessionStore) -> Session {
        Session::new(None, Arc::new(store.clone()), None)
    }

    fn ann() -> SignupRequest {
        SignupRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "secret1".to_string(),
            mobile: "5551234567".to_string(),
        }
    }

    fn login_req(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn ann_snapshot() -> UserSnapshot {
        UserSnapshot {
            id: 1,
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (svc, store) = service(false).await;
        let id = svc.signup(ann()).await.unwrap();
        assert_eq!(id, 1);

        let session = fresh_session(&store);
        let user = svc.login(login_req("ann@x.com", "secret1"), &session).await.unwrap();
        assert_eq!(user, ann_snapshot());

        let session_id = session.id().expect("login persists the session");
        let record = store.load(&session_id).await.unwrap().unwrap();
        let stored: UserSnapshot = serde_json::from_value(record.data[USER_KEY].clone()).unwrap();
        assert_eq!(stored, ann_snapshot());
    }

    #[tokio::test]
    async fn test_duplicate_signup_rejected() {
        let (svc, store) = service(false).await;
        svc.signup(ann()).await.unwrap();

        let mut again = ann();
        again.password = "different".to_string();
        assert_eq!(svc.signup(again).await, Err(AuthError::DuplicateEmail));

        // Original credentials still work
        let session = fresh_session(&store);
        assert!(svc.login(login_req("ann@x.com", "secret1"), &session).await.is_ok());
        assert_eq!(
            svc.login(login_req("ann@x.com", "different"), &fresh_session(&store))
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_missing_fields_in_form_order() {
        let (svc, _) = service(false).await;

        let mut req = SignupRequest::default();
        req.email = "bad".to_string();
        assert_eq!(
            svc.signup(req).await,
            Err(AuthError::Validation("Please enter your name.".into()))
        );

        let mut req = ann();
        req.password.clear();
        assert_eq!(
            svc.signup(req).await,
            Err(AuthError::Validation("Please enter your password.".into()))
        );

        let mut req = ann();
        req.mobile.clear();
        assert_eq!(
            svc.signup(req).await,
            Err(AuthError::Validation("Please enter your mobile number.".into()))
        );
    }

    #[tokio::test]
    async fn test_missing_field_reported_before_bad_shape() {
        let (svc, _) = service(false).await;

        let req = SignupRequest {
            name: "A".to_string(),
            email: "bad".to_string(),
            password: String::new(),
            mobile: "5551234567".to_string(),
        };
        assert_eq!(
            svc.signup(req).await,
            Err(AuthError::Validation("Please enter your password.".into()))
        );

        let req = SignupRequest {
            name: "A".to_string(),
            email: "bad".to_string(),
            password: "p".to_string(),
            mobile: String::new(),
        };
        assert_eq!(
            svc.signup(req).await,
            Err(AuthError::Validation("Please enter your mobile number.".into()))
        );
    }

    #[tokio::test]
    async fn test_email_shape_checked_before_mobile() {
        let (svc, _) = service(false).await;

        let mut req = ann();
        req.email = "ann@x".to_string();
        req.mobile = "12345".to_string();
        assert_eq!(
            svc.signup(req).await,
            Err(AuthError::Validation(
                "Please enter a valid email address.".into()
            ))
        );
    }

    #[tokio::test]
    async fn test_mobile_boundary_with_validation() {
        let (svc, _) = service(false).await;

        let mut short = ann();
        short.mobile = "12345".to_string();
        assert_eq!(
            svc.signup(short).await,
            Err(AuthError::Validation(
                "Please enter a valid 10-digit mobile number.".into()
            ))
        );

        let mut ok = ann();
        ok.mobile = "1234567890".to_string();
        assert!(svc.signup(ok).await.is_ok());
    }

    #[tokio::test]
    async fn test_mobile_boundary_with_bypass() {
        let (svc, _) = service(true).await;

        let mut short = ann();
        short.mobile = "12345".to_string();
        assert!(svc.signup(short).await.is_ok());

        let mut ten = ann();
        ten.email = "ann2@x.com".to_string();
        ten.mobile = "1234567890".to_string();
        assert!(svc.signup(ten).await.is_ok());
    }

    #[tokio::test]
    async fn test_bypass_still_requires_credentials() {
        let (svc, _) = service(true).await;
        let fill_all = Err(AuthError::Validation("Please fill in all fields.".into()));

        let mut req = ann();
        req.name.clear();
        assert_eq!(svc.signup(req).await, fill_all);

        let mut req = ann();
        req.email.clear();
        assert_eq!(svc.signup(req).await, fill_all);

        let mut req = ann();
        req.password.clear();
        assert_eq!(svc.signup(req).await, fill_all);

        // None of the rejected attempts reached the store
        let mut req = ann();
        req.mobile.clear();
        assert_eq!(svc.signup(req).await, Ok(1));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (svc, store) = service(false).await;
        svc.signup(ann()).await.unwrap();

        let no_user = svc
            .login(login_req("nobody@x.com", "secret1"), &fresh_session(&store))
            .await
            .unwrap_err();
        let wrong_pw = svc
            .login(login_req("ann@x.com", "wrong"), &fresh_session(&store))
            .await
            .unwrap_err();
        assert_eq!(no_user, wrong_pw);
        assert_eq!(no_user, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let (svc, store) = service(false).await;
        svc.signup(ann()).await.unwrap();

        let session = fresh_session(&store);
        svc.login(login_req("ann@x.com", "wrong"), &session)
            .await
            .unwrap_err();
        assert!(session.id().is_none());
        assert!(session.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let (svc, store) = service(false).await;
        let err = svc
            .login(login_req("ann@x.com", ""), &fresh_session(&store))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuthError::Validation("Please provide email and password.".into())
        );
    }

    #[tokio::test]
    async fn test_login_email_is_case_sensitive() {
        let (svc, store) = service(false).await;
        svc.signup(ann()).await.unwrap();
        assert_eq!(
            svc.login(login_req("ANN@x.com", "secret1"), &fresh_session(&store))
                .await
                .unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_login_rotates_previous_session() {
        let (svc, store) = service(false).await;
        svc.signup(ann()).await.unwrap();

        let first = fresh_session(&store);
        svc.login(login_req("ann@x.com", "secret1"), &first).await.unwrap();
        let first_id = first.id().unwrap();

        // Next request carries the first session's cookie
        let again = Session::new(Some(first_id), Arc::new(store.clone()), None);
        svc.login(login_req("ann@x.com", "secret1"), &again).await.unwrap();
        let second_id = again.id().unwrap();

        assert_ne!(first_id, second_id);
        assert!(store.load(&first_id).await.unwrap().is_none());
        assert!(store.load(&second_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_logout_idempotent() {
        let (svc, store) = service(false).await;
        svc.signup(ann()).await.unwrap();
        let session = fresh_session(&store);
        svc.login(login_req("ann@x.com", "secret1"), &session).await.unwrap();
        let session_id = session.id().unwrap();

        for _ in 0..2 {
            let request_session = Session::new(Some(session_id), Arc::new(store.clone()), None);
            svc.logout(&request_session).await.unwrap();
        }
        svc.logout(&fresh_session(&store)).await.unwrap();
        assert!(store.load(&session_id).await.unwrap().is_none());
    }
}
