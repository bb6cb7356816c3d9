mod common;

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{session_for, StubProvider, EMAIL, PASSWORD};
use taskdeck::auth::{AuthError, AuthService, CognitoProvider, IdentityProvider, LoginOutcome, LoginStatus, SessionStore};
use taskdeck::constants::{LOGIN_FAILED, LOGIN_SUCCESS};

#[tokio::test]
async fn test_invalid_login_keeps_signed_out_user_signed_out() {
    let auth = AuthService::new(Arc::new(StubProvider::new()), None);

    let result = auth.login(EMAIL, "wrong").await;

    assert_eq!(LoginStatus::for_result(&result), (LoginStatus::Failure, LOGIN_FAILED));
    assert!(!auth.is_authenticated());
    assert_eq!(auth.user_id(), None);
}

#[tokio::test]
async fn test_invalid_login_keeps_existing_session() {
    let auth = AuthService::new(Arc::new(StubProvider::new()), None);
    auth.login(EMAIL, PASSWORD).await.unwrap();
    let before = auth.session();

    let result = auth.login("mallory@example.com", "guess").await;

    assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    assert!(auth.is_authenticated());
    assert_eq!(auth.session(), before);
}

#[tokio::test]
async fn test_successful_login_exposes_user_context() {
    let auth = AuthService::new(Arc::new(StubProvider::new()), None);

    let result = auth.login(EMAIL, PASSWORD).await;
    assert_eq!(LoginStatus::for_result(&result).1, LOGIN_SUCCESS);

    let user = auth.fresh_user_context().await.unwrap();
    assert_eq!(user.user_id, EMAIL);
    assert_eq!(user.id_token.as_deref(), Some("id-token"));
}

#[tokio::test]
async fn test_logout_clears_session_and_signs_out_remotely() {
    let provider = Arc::new(StubProvider::new());
    let auth = AuthService::new(provider.clone(), None);
    auth.login(EMAIL, PASSWORD).await.unwrap();

    auth.logout().await;

    assert!(!auth.is_authenticated());
    assert_eq!(provider.sign_outs.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_is_restored_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let first = AuthService::new(Arc::new(StubProvider::new()), Some(SessionStore::in_dir(dir.path())));
    first.login(EMAIL, PASSWORD).await.unwrap();
    assert!(dir.path().join("session.json").exists());

    let second = AuthService::new(Arc::new(StubProvider::new()), Some(SessionStore::in_dir(dir.path())));
    assert!(second.restore_session().await);
    assert_eq!(second.user_id().as_deref(), Some(EMAIL));

    second.logout().await;
    assert!(!dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_expired_session_without_refresh_token_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::in_dir(dir.path());
    let mut expired = session_for(EMAIL);
    expired.refresh_token = None;
    expired.expires_at = Utc::now() - Duration::minutes(5);
    store.save(&expired).unwrap();

    let auth = AuthService::new(Arc::new(StubProvider::new()), Some(store.clone()));

    assert!(!auth.restore_session().await);
    assert!(store.load().is_none());
}

#[tokio::test]
async fn test_expired_session_with_refresh_token_is_refreshed() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::in_dir(dir.path());
    let mut expired = session_for(EMAIL);
    expired.expires_at = Utc::now() - Duration::minutes(5);
    store.save(&expired).unwrap();

    let provider = Arc::new(StubProvider::new());
    let auth = AuthService::new(provider.clone(), Some(store.clone()));

    assert!(auth.restore_session().await);
    assert!(auth.is_authenticated());
    assert_eq!(auth.user_id().as_deref(), Some(EMAIL));
    assert_eq!(provider.refreshes.load(std::sync::atomic::Ordering::SeqCst), 1);

    let saved = store.load().unwrap();
    assert!(!saved.is_expired());
}

#[cfg(unix)]
#[test]
fn test_session_file_is_private_to_owner() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::in_dir(dir.path());
    std::fs::write(store.path(), "{}").unwrap();
    std::fs::set_permissions(store.path(), std::fs::Permissions::from_mode(0o644)).unwrap();

    store.save(&session_for(EMAIL)).unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(store.load().unwrap().username, EMAIL);
}

#[tokio::test]
async fn test_corrupt_session_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::in_dir(dir.path());
    std::fs::write(store.path(), "{ not json").unwrap();

    assert!(store.load().is_none());
}

async fn cognito(server: &MockServer) -> CognitoProvider {
    CognitoProvider::new(Url::parse(&server.uri()).unwrap(), "client123").unwrap()
}

#[tokio::test]
async fn test_cognito_password_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSCognitoIdentityProviderService.InitiateAuth"))
        .and(body_partial_json(json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": "client123",
            "AuthParameters": { "USERNAME": EMAIL, "PASSWORD": PASSWORD },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "AccessToken": "access",
                "IdToken": "id",
                "RefreshToken": "refresh",
                "ExpiresIn": 3600,
                "TokenType": "Bearer"
            },
            "ChallengeParameters": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = cognito(&server).await.authenticate(EMAIL, PASSWORD).await.unwrap();

    let LoginOutcome::Authenticated(session) = outcome else {
        panic!("expected a session");
    };
    assert_eq!(session.username, EMAIL);
    assert_eq!(session.id_token, "id");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh"));
    assert!(!session.is_expired());
}

#[tokio::test]
async fn test_cognito_new_password_challenge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "opaque"
        })))
        .mount(&server)
        .await;

    let outcome = cognito(&server).await.authenticate(EMAIL, PASSWORD).await.unwrap();
    assert_eq!(outcome, LoginOutcome::NewPasswordRequired);
}

#[tokio::test]
async fn test_cognito_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        })))
        .mount(&server)
        .await;

    let err = cognito(&server).await.authenticate(EMAIL, "nope").await.unwrap_err();
    assert_eq!(
        err,
        AuthError::InvalidCredentials("Incorrect username or password.".to_string())
    );
}

#[tokio::test]
async fn test_cognito_sign_up_sends_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("X-Amz-Target", "AWSCognitoIdentityProviderService.SignUp"))
        .and(body_partial_json(json!({
            "ClientId": "client123",
            "Username": "grace@example.com",
            "UserAttributes": [
                { "Name": "email", "Value": "grace@example.com" },
                { "Name": "name", "Value": "Grace" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "UserConfirmed": false,
            "UserSub": "1234-abcd"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(cognito(&server).await);
    let auth = AuthService::new(provider, None);
    let outcome = auth.sign_up(" Grace ", "grace@example.com", "Password1!").await.unwrap();

    assert!(!outcome.user_confirmed);
    assert_eq!(outcome.user_sub.as_deref(), Some("1234-abcd"));
    assert!(!auth.is_authenticated());
}
