//! Account helpers: register, login and privileged users created directly in the store.

use super::{api_path, TestApp};
use serde_json::{json, Value};
use vidmod_api::auth::password::hash_password;
use vidmod_core::models::{NewUser, RoleName};

pub const TEST_PASSWORD: &str = "secret123";

/// Logged-in account.
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    fn from_auth_payload(email: &str, body: &Value) -> Self {
        let data = &body["data"];
        TestUser {
            id: data["user"]["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            access_token: data["accessToken"].as_str().unwrap().to_string(),
            refresh_token: data["refreshToken"].as_str().unwrap().to_string(),
        }
    }
}

/// Register through the API; panics unless the server answers 201.
pub async fn register_user(app: &TestApp, email: &str) -> TestUser {
    let response = app
        .client()
        .post(&api_path("auth/register"))
        .json(&json!({
            "firstName": "Test",
            "lastName": "User",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;
    assert_eq!(response.status_code(), 201, "register failed: {}", response.text());
    TestUser::from_auth_payload(email, &response.json())
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> TestUser {
    let response = app
        .client()
        .post(&api_path("auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200, "login failed: {}", response.text());
    TestUser::from_auth_payload(email, &response.json())
}

/// Accounts with elevated roles cannot self-register; create them in the store and log in.
pub async fn create_user_with_role(app: &TestApp, email: &str, role: RoleName) -> TestUser {
    let password_hash = hash_password(TEST_PASSWORD.to_string()).await.unwrap();
    app.state
        .db
        .users
        .create(NewUser {
            first_name: "Staff".to_string(),
            last_name: "Member".to_string(),
            email: email.to_string(),
            password_hash,
            role,
            is_active: true,
            is_email_verified: true,
        })
        .await
        .unwrap();
    login(app, email, TEST_PASSWORD).await
}

pub async fn create_admin(app: &TestApp) -> TestUser {
    create_user_with_role(app, "admin@example.com", RoleName::Admin).await
}
