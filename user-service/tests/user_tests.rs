mod common;

use std::collections::HashSet;
use std::sync::Arc;

use auth::JwtError;
use auth::JwtHandler;
use common::login;
use common::registration;
use common::TestApp;
use common::TEST_SECRET;
use user_service::domain::user::errors::ErrorKind;
use user_service::domain::user::errors::UserError;
use user_service::domain::user::models::ChangePasswordRequest;
use user_service::domain::user::models::UpdateUserRequest;
use user_service::domain::user::models::UserId;
use user_service::domain::user::ports::UserServicePort;

#[tokio::test]
async fn test_register_login_introspect() {
    let app = TestApp::spawn();

    let user = app
        .service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .expect("Failed to register");
    assert_eq!(user.name.as_str(), "Ada");
    assert_eq!(user.email.as_str(), "ada@example.com");

    let session = app
        .service
        .login(login("ada@example.com", "Sup3rSecret!"))
        .await
        .expect("Failed to log in");
    assert!(!session.access_token.is_empty());

    let claims = app
        .service
        .introspect(&session.access_token)
        .await
        .expect("Failed to introspect");
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.name, "Ada");
}

#[tokio::test]
async fn test_repeated_logins_issue_distinct_tokens() {
    let app = TestApp::spawn();
    app.service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let mut tokens = HashSet::new();
    for _ in 0..5 {
        let session = app
            .service
            .login(login("ada@example.com", "Sup3rSecret!"))
            .await
            .unwrap();
        tokens.insert(session.access_token);
    }

    assert_eq!(tokens.len(), 5);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::spawn();
    app.service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let result = app
        .service
        .login(login("ada@example.com", "Sup3rSecret?"))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, UserError::InvalidCredentials));
    assert_eq!(err.kind().status_code(), 401);
}

#[tokio::test]
async fn test_login_email_is_case_sensitive() {
    let app = TestApp::spawn();
    app.service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let result = app
        .service
        .login(login("Ada@Example.com", "Sup3rSecret!"))
        .await;

    assert!(matches!(result, Err(UserError::NotFoundByEmail(_))));
}

#[tokio::test]
async fn test_register_rejects_mismatched_confirmation() {
    let app = TestApp::spawn();
    let mut request = registration("Ada", "ada@example.com", "Sup3rSecret!");
    request.password_confirmation = "Sup3rSecret?".to_string();

    let err = app.service.register(request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.field(), Some("password_confirmation"));
    assert!(app.service.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn();
    app.service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let err = app
        .service
        .register(registration("Other Ada", "ada@example.com", "An0therSecret"))
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::EmailAlreadyExists(_)));
    assert_eq!(err.kind().status_code(), 409);
    assert_eq!(app.service.list_users().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_are_all_kept() {
    let app = Arc::new(TestApp::spawn());

    let mut handles = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.service
                .register(registration(
                    &format!("User {}", i),
                    &format!("user{}@example.com", i),
                    "Sup3rSecret!",
                ))
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }

    for id in &ids {
        assert!(app.service.get_user(id).await.is_ok());
    }
    assert_eq!(app.service.list_users().await.unwrap().len(), 16);
}

#[tokio::test]
async fn test_list_is_sorted_and_bounded() {
    let app = TestApp::with_max_list_length(3);
    for i in 0..5 {
        app.service
            .register(registration(
                &format!("User {}", i),
                &format!("user{}@example.com", i),
                "Sup3rSecret!",
            ))
            .await
            .unwrap();
    }

    let first = app.service.list_users().await.unwrap();
    let second = app.service.list_users().await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[tokio::test]
async fn test_update_user_changes_login_email() {
    let app = TestApp::spawn();
    let user = app
        .service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let updated = app
        .service
        .update_user(
            &user.id,
            UpdateUserRequest {
                name: Some(String::new()),
                email: Some("countess@example.com".to_string()),
                groups: Some(vec!["admin".to_string()]),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name.as_str(), "Ada");
    assert_eq!(updated.email.as_str(), "countess@example.com");
    assert!(app
        .service
        .login(login("ada@example.com", "Sup3rSecret!"))
        .await
        .is_err());

    let session = app
        .service
        .login(login("countess@example.com", "Sup3rSecret!"))
        .await
        .unwrap();
    assert_eq!(session.claims.groups, vec!["admin".to_string()]);
}

#[tokio::test]
async fn test_change_password_replaces_credentials() {
    let app = TestApp::spawn();
    let user = app
        .service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    app.service
        .change_password(
            &user.id,
            ChangePasswordRequest {
                password: "N3wSecret!!".to_string(),
                password_confirmation: "N3wSecret!!".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        app.service
            .login(login("ada@example.com", "Sup3rSecret!"))
            .await,
        Err(UserError::InvalidCredentials)
    ));
    assert!(app
        .service
        .login(login("ada@example.com", "N3wSecret!!"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_delete_user_frees_email() {
    let app = TestApp::spawn();
    let user = app
        .service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    app.service.delete_user(&user.id).await.unwrap();

    assert!(matches!(
        app.service.get_user(&user.id).await,
        Err(UserError::NotFound(_))
    ));
    assert!(matches!(
        app.service.delete_user(&user.id).await,
        Err(UserError::NotFound(_))
    ));
    assert!(app
        .service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_user_lookups() {
    let app = TestApp::spawn();

    let err = app.service.get_user(&UserId::new()).await.unwrap_err();
    assert_eq!(err.kind().status_code(), 404);

    let err = app
        .service
        .get_user_by_email("nobody@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_introspect_rejects_expired_token() {
    let app = TestApp::with_jwt_handler(
        JwtHandler::new(TEST_SECRET).with_ttl(chrono::Duration::zero()),
    );
    app.service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let session = app
        .service
        .login(login("ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    assert!(matches!(
        app.service.introspect(&session.access_token).await,
        Err(UserError::Token(JwtError::TokenExpired))
    ));
}

#[tokio::test]
async fn test_introspect_rejects_token_from_other_secret() {
    let app = TestApp::spawn();
    let user = app
        .service
        .register(registration("Ada", "ada@example.com", "Sup3rSecret!"))
        .await
        .unwrap();

    let forged = JwtHandler::new(b"another-secret-key-that-is-also-32-bytes!")
        .issue(user.id, "Ada", vec!["admin".to_string()])
        .unwrap();

    let err = app.service.introspect(&forged.token).await.unwrap_err();
    assert!(matches!(err, UserError::Token(JwtError::InvalidSignature)));
    assert_eq!(err.kind(), ErrorKind::Token);
}
