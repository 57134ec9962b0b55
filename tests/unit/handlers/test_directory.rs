// Unit tests for the YAML credential directory

use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use warden::core::errors::IdentityError;
use warden::handlers::api_key::ApiKeyHash;
use warden::handlers::directory::Directory;

const DIRECTORY_YAML: &str = r#"
api_keys:
  - key: "svc-key-1"
    user: { id: "svc-1" }
    auth: { role: "service" }
users:
  - username: "alice"
    # sha256("secret")
    password_sha256: "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
    user: { id: 1, username: "alice" }
    auth: { role: "admin" }
"#;

#[tokio::test]
async fn test_directory_serves_keys_and_users() {
    let directory = Directory::from_yaml(DIRECTORY_YAML).unwrap();

    let account = directory
        .key_store()
        .lookup(&ApiKeyHash::from_api_key("svc-key-1"))
        .await
        .unwrap()
        .expect("key present");
    assert_eq!(account.user, json!({"id": "svc-1"}));
    assert_eq!(account.auth, json!({"role": "service"}));

    let account = directory
        .user_vault()
        .verify("alice", "secret")
        .await
        .unwrap()
        .expect("credentials valid");
    assert_eq!(account.auth, json!({"role": "admin"}));

    assert!(directory
        .user_vault()
        .verify("alice", "wrong")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_directory_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", DIRECTORY_YAML).unwrap();

    let directory = Directory::from_file(temp_file.path()).unwrap();
    let account = directory
        .key_store()
        .lookup(&ApiKeyHash::from_api_key("svc-key-1"))
        .await
        .unwrap();
    assert!(account.is_some());
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    match Directory::from_file("/nonexistent/directory.yaml") {
        Err(IdentityError::Configuration(message)) => assert!(message.contains("not found")),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_duplicate_api_key_is_rejected() {
    let yaml = r#"
api_keys:
  - key: "same"
    user: { id: 1 }
  - key: "same"
    user: { id: 2 }
"#;
    match Directory::from_yaml(yaml) {
        Err(IdentityError::Configuration(message)) => assert!(message.contains("duplicate")),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_duplicate_username_is_rejected() {
    let yaml = r#"
users:
  - username: "alice"
    password_sha256: "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
    user: { id: 1 }
  - username: "alice"
    password_sha256: "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
    user: { id: 2 }
"#;
    match Directory::from_yaml(yaml) {
        Err(IdentityError::Configuration(message)) => assert!(message.contains("alice")),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_invalid_password_digest_is_rejected() {
    let yaml = r#"
users:
  - username: "alice"
    password_sha256: "not-hex"
    user: { id: 1 }
"#;
    match Directory::from_yaml(yaml) {
        Err(IdentityError::Configuration(message)) => assert!(message.contains("alice")),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_malformed_yaml_is_rejected() {
    match Directory::from_yaml(": not yaml :") {
        Err(IdentityError::Configuration(_)) => {}
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}
