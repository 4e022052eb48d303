//! Organization API integration tests.
//!
//! Run with: `cargo test -p vidmod-api --test organizations_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::auth::{register_user, TestUser};
use helpers::{api_path, setup_test_app, TestApp};
use serde_json::{json, Value};

async fn create_org(app: &TestApp, owner: &TestUser, name: &str) -> Value {
    let response = app
        .client()
        .post(&api_path("organizations"))
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "name": name, "description": "Video team" }))
        .await;
    assert_eq!(response.status_code(), 201, "create failed: {}", response.text());
    let body: Value = response.json();
    body["data"]["organization"].clone()
}

#[tokio::test]
async fn test_create_organization() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "founder@example.com").await;

    let org = create_org(&app, &owner, "Acme Studios").await;

    assert_eq!(org["name"], "Acme Studios");
    assert_eq!(org["slug"], "acme-studios");
    assert_eq!(org["ownerId"], owner.id.as_str());
    let members = org["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["userId"], owner.id.as_str());
    assert_eq!(members[0]["role"], "owner");
}

#[tokio::test]
async fn test_create_duplicate_name() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "dupe-org@example.com").await;
    create_org(&app, &owner, "Acme Studios").await;

    let response = app
        .client()
        .post(&api_path("organizations"))
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "name": "Acme Studios" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "Organization with this name already exists");
}

#[tokio::test]
async fn test_create_requires_name() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "noname@example.com").await;

    let response = app
        .client()
        .post(&api_path("organizations"))
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "name": "" }))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_non_member_cannot_view() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "org-owner@example.com").await;
    let outsider = register_user(&app, "outsider@example.com").await;
    let org = create_org(&app, &owner, "Private Crew").await;
    let id = org["id"].as_str().unwrap();

    let response = app
        .client()
        .get(&api_path(&format!("organizations/{}", id)))
        .authorization_bearer(&outsider.access_token)
        .await;
    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["message"], "Not authorized to view this organization");

    let response = app
        .client()
        .get(&api_path(&format!("organizations/{}", id)))
        .authorization_bearer(&owner.access_token)
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_member_management() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "lead@example.com").await;
    let member = register_user(&app, "crew@example.com").await;
    let org = create_org(&app, &owner, "Film Club").await;
    let id = org["id"].as_str().unwrap().to_string();

    // Only the owner may add
    let response = app
        .client()
        .post(&api_path(&format!("organizations/{}/members", id)))
        .authorization_bearer(&member.access_token)
        .json(&json!({ "userId": member.id }))
        .await;
    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["message"], "Only organization owner can add members");

    let response = app
        .client()
        .post(&api_path(&format!("organizations/{}/members", id)))
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "userId": member.id, "role": "viewer" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Member added successfully");
    let members = body["data"]["organization"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members
        .iter()
        .any(|m| m["userId"] == member.id.as_str() && m["role"] == "viewer"));

    let response = app
        .client()
        .post(&api_path(&format!("organizations/{}/members", id)))
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "userId": member.id }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["message"], "User is already a member");

    // Membership now shows up in the member's list
    let response = app
        .client()
        .get(&api_path("organizations"))
        .authorization_bearer(&member.access_token)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["organizations"].as_array().unwrap().len(), 1);

    let response = app
        .client()
        .delete(&api_path(&format!("organizations/{}/members/{}", id, owner.id)))
        .authorization_bearer(&owner.access_token)
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .delete(&api_path(&format!("organizations/{}/members/{}", id, member.id)))
        .authorization_bearer(&owner.access_token)
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Member removed successfully");

    let response = app
        .client()
        .delete(&api_path(&format!("organizations/{}/members/{}", id, member.id)))
        .authorization_bearer(&owner.access_token)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_add_unknown_user() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "solo@example.com").await;
    let org = create_org(&app, &owner, "Solo Act").await;
    let id = org["id"].as_str().unwrap();

    let response = app
        .client()
        .post(&api_path(&format!("organizations/{}/members", id)))
        .authorization_bearer(&owner.access_token)
        .json(&json!({ "userId": uuid::Uuid::new_v4() }))
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_upload_into_organization_requires_membership() {
    let app = setup_test_app().await;
    let owner = register_user(&app, "studio@example.com").await;
    let outsider = register_user(&app, "stranger@example.com").await;
    let org = create_org(&app, &owner, "Studio").await;
    let id = org["id"].as_str().unwrap().to_string();

    let form = |title: &str| {
        MultipartForm::new()
            .add_text("title", title.to_string())
            .add_text("organizationId", id.clone())
            .add_part(
                "video",
                Part::bytes(b"fake mp4 payload".to_vec())
                    .file_name("clip.mp4")
                    .mime_type("video/mp4"),
            )
    };

    let response = app
        .client()
        .post(&api_path("videos"))
        .authorization_bearer(&outsider.access_token)
        .multipart(form("Intruder"))
        .await;
    assert_eq!(response.status_code(), 403);
    let body: Value = response.json();
    assert_eq!(body["message"], "Not a member of this organization");

    let response = app
        .client()
        .post(&api_path("videos"))
        .authorization_bearer(&owner.access_token)
        .multipart(form("Team cut"))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["data"]["video"]["organizationId"], id.as_str());
}
