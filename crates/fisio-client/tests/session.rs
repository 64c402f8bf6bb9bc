use fisio_client::error::ClientError;
use fisio_client::session::SessionStore;
use fisio_core::models::user::{LoginResponse, User};

fn login() -> LoginResponse {
    LoginResponse {
        token: "abc".to_string(),
        user: User {
            id: 3,
            name: "Carlos".to_string(),
            email: "carlos@clinic.com".to_string(),
            role: None,
            crefito: None,
        },
    }
}

#[tokio::test]
async fn session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    SessionStore::persistent(&path).save(&login()).await.unwrap();

    let reopened = SessionStore::persistent(&path);
    assert_eq!(reopened.token().await.as_deref(), Some("abc"));
    assert_eq!(reopened.user().await.unwrap().name, "Carlos");
}

#[tokio::test]
async fn corrupt_session_file_means_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = SessionStore::persistent(&path);
    assert!(!store.is_authenticated().await);
}

#[tokio::test]
async fn clear_removes_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = SessionStore::persistent(&path);
    store.save(&login()).await.unwrap();

    store.clear().await.unwrap();

    assert!(!path.exists());
    assert!(store.token().await.is_none());
    // Clearing twice is fine.
    store.clear().await.unwrap();
}

#[tokio::test]
async fn profile_update_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = SessionStore::persistent(&path);
    store.save(&login()).await.unwrap();

    let user = store
        .update_profile(
            "Carlos Lima".to_string(),
            "lima@clinic.com".to_string(),
            Some("CREFITO-3 12345-F".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(user.crefito.as_deref(), Some("CREFITO-3 12345-F"));

    let reopened = SessionStore::persistent(&path);
    let user = reopened.user().await.unwrap();
    assert_eq!(user.name, "Carlos Lima");
    assert_eq!(user.email, "lima@clinic.com");
    assert_eq!(reopened.token().await.as_deref(), Some("abc"));
}

#[tokio::test]
async fn profile_update_requires_login_and_a_name() {
    let store = SessionStore::in_memory();
    let err = store
        .update_profile("X".to_string(), "x@y.z".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    store.save(&login()).await.unwrap();
    let err = store
        .update_profile("  ".to_string(), "x@y.z".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(store.user().await.unwrap().name, "Carlos");
}

#[cfg(unix)]
#[tokio::test]
async fn session_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    SessionStore::persistent(&path).save(&login()).await.unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
