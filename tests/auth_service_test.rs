//! Auth service unit tests.

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use uuid::Uuid;

use code_review_api::config::Config;
use code_review_api::domain::{Password, User, UserRole};
use code_review_api::errors::AppError;
use code_review_api::infra::repositories::{MockReviewRepository, MockUserRepository};
use code_review_api::infra::{Persistence, ReviewRepository, UserRepository};
use code_review_api::services::{AuthService, Authenticator};

fn test_config() -> Config {
    std::env::set_var("JWT_SECRET", "test-secret-key-for-testing-only-32chars");
    Config::from_env()
}

fn test_user(id: Uuid, email: &str, password: &str) -> User {
    User {
        id,
        username: "test_user".to_string(),
        email: email.to_string(),
        password_hash: Password::new(password).unwrap().into_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        last_login: None,
    }
}

/// Test persistence wrapping mock repositories
struct TestPersistence {
    users: Arc<MockUserRepository>,
    reviews: Arc<MockReviewRepository>,
}

impl TestPersistence {
    fn new(users: MockUserRepository) -> Self {
        Self {
            users: Arc::new(users),
            reviews: Arc::new(MockReviewRepository::new()),
        }
    }
}

impl Persistence for TestPersistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.reviews.clone()
    }
}

fn auth_service(users: MockUserRepository) -> Authenticator<TestPersistence> {
    Authenticator::new(Arc::new(TestPersistence::new(users)), test_config())
}

#[tokio::test]
async fn test_register_issues_token_for_persisted_user() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    repo.expect_find_by_username().returning(|_| Ok(None));
    repo.expect_create().returning(move |username, email, hash| {
        Ok(User {
            id: user_id,
            username,
            email,
            password_hash: hash,
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        })
    });

    let service = auth_service(repo);
    let response = service
        .register(
            "new_user".to_string(),
            "new@example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap();

    // The token decodes back to the persisted user id
    let claims = service.verify_token(&response.token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.email, "new@example.com");
    assert_eq!(response.user.id, user_id);
    assert!(response.expires_in > 0);
}

#[tokio::test]
async fn test_register_duplicate_email_is_field_specific() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .with(eq("taken@example.com"))
        .returning(|email| Ok(Some(test_user(Uuid::new_v4(), email, "password123"))));

    let service = auth_service(repo);
    let err = service
        .register(
            "new_user".to_string(),
            "taken@example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap_err();

    match err {
        AppError::Duplicate(msg) => assert_eq!(msg, "Email already in use"),
        other => panic!("expected Duplicate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_duplicate_username_is_field_specific() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    repo.expect_find_by_username()
        .with(eq("taken_name"))
        .returning(|_| Ok(Some(test_user(Uuid::new_v4(), "other@example.com", "password123"))));

    let service = auth_service(repo);
    let err = service
        .register(
            "taken_name".to_string(),
            "new@example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap_err();

    match err {
        AppError::Duplicate(msg) => assert_eq!(msg, "Username already taken"),
        other => panic!("expected Duplicate, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_success_stamps_last_login() {
    let user_id = Uuid::new_v4();
    let stored = test_user(user_id, "ada@example.com", "password123");

    let mut repo = MockUserRepository::new();
    let found = stored.clone();
    repo.expect_find_by_email()
        .returning(move |_| Ok(Some(found.clone())));
    repo.expect_touch_last_login()
        .with(eq(user_id))
        .returning(move |_| {
            let mut user = stored.clone();
            user.last_login = Some(Utc::now());
            Ok(user)
        });

    let service = auth_service(repo);
    let response = service
        .login("ada@example.com".to_string(), "password123".to_string())
        .await
        .unwrap();

    assert_eq!(response.user.id, user_id);
    assert!(response.user.last_login.is_some());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    // Unknown email
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    let unknown_email_err = auth_service(repo)
        .login("ghost@example.com".to_string(), "password123".to_string())
        .await
        .unwrap_err();

    // Wrong password for an existing user
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|email| {
        Ok(Some(test_user(Uuid::new_v4(), email, "correct-password")))
    });
    let wrong_password_err = auth_service(repo)
        .login("ada@example.com".to_string(), "wrong-password".to_string())
        .await
        .unwrap_err();

    assert!(matches!(unknown_email_err, AppError::InvalidCredentials));
    assert!(matches!(wrong_password_err, AppError::InvalidCredentials));
    // Identical message either way
    assert_eq!(unknown_email_err.to_string(), wrong_password_err.to_string());
}

#[tokio::test]
async fn test_verify_rejects_garbage_token() {
    let repo = MockUserRepository::new();
    let service = auth_service(repo);

    let err = service.verify_token("not-a-jwt").unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
}

#[tokio::test]
async fn test_authenticate_fails_when_user_gone() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    repo.expect_find_by_username().returning(|_| Ok(None));
    repo.expect_create().returning(move |username, email, hash| {
        Ok(User {
            id: user_id,
            username,
            email,
            password_hash: hash,
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        })
    });
    // The user vanished after the token was issued
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = auth_service(repo);
    let response = service
        .register(
            "short_lived".to_string(),
            "gone@example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap();

    let err = service.authenticate(&response.token).await.unwrap_err();
    assert!(matches!(err, AppError::UserGone));
}

#[tokio::test]
async fn test_refresh_token_issues_new_token() {
    let user_id = Uuid::new_v4();
    let stored = test_user(user_id, "ada@example.com", "password123");

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    repo.expect_find_by_username().returning(|_| Ok(None));
    let created = stored.clone();
    repo.expect_create()
        .returning(move |_, _, _| Ok(created.clone()));
    let found = stored.clone();
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(move |_| Ok(Some(found.clone())));

    let service = auth_service(repo);
    let original = service
        .register(
            "test_user".to_string(),
            "ada@example.com".to_string(),
            "password123".to_string(),
        )
        .await
        .unwrap();

    let refreshed = service.refresh_token(&original.token).await.unwrap();
    let claims = service.verify_token(&refreshed.token).unwrap();
    assert_eq!(claims.sub, user_id);
}

#[tokio::test]
async fn test_refresh_token_rejects_bad_signature() {
    let repo = MockUserRepository::new();
    let service = auth_service(repo);

    let err = service.refresh_token("tampered.token.value").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidToken));
}
