//! End-to-end API tests. Each test boots its own server in a temp directory
//! and drives it over HTTP with cookie-authenticated clients.

mod common;

use common::TestServer;
use serde_json::Value;

async fn create_user(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
    role: &str,
) -> i64 {
    let resp: Value = client
        .post(format!("{}/api/v1/users", base_url))
        .json(&serde_json::json!({
            "username": username,
            "password": password,
            "role": role
        }))
        .send()
        .await
        .expect("create user")
        .json()
        .await
        .expect("parse user response");
    assert_eq!(resp["success"], true, "create user failed: {resp}");
    resp["data"]["id"].as_i64().expect("user id")
}

async fn create_email(client: &reqwest::Client, base_url: &str, email: &str) -> i64 {
    let resp: Value = client
        .post(format!("{}/api/v1/emails", base_url))
        .json(&serde_json::json!({"email": email}))
        .send()
        .await
        .expect("create email")
        .json()
        .await
        .expect("parse email response");
    assert_eq!(resp["success"], true, "create email failed: {resp}");
    resp["data"]["id"].as_i64().expect("email id")
}

async fn put_assignments(
    client: &reqwest::Client,
    base_url: &str,
    user_id: i64,
    email_ids: &[i64],
) -> (reqwest::StatusCode, Value) {
    let resp = client
        .put(format!("{}/api/v1/users/{}/emails", base_url, user_id))
        .json(&serde_json::json!({"email_ids": email_ids}))
        .send()
        .await
        .expect("assign emails");
    let status = resp.status();
    let body: Value = resp.json().await.expect("parse assign response");
    (status, body)
}

async fn assigned_ids(client: &reqwest::Client, base_url: &str, user_id: i64) -> Vec<i64> {
    let resp: Value = client
        .get(format!("{}/api/v1/users/{}/emails", base_url, user_id))
        .send()
        .await
        .expect("list assignments")
        .json()
        .await
        .expect("parse assignments");
    assert_eq!(resp["success"], true, "list assignments failed: {resp}");
    resp["data"]
        .as_array()
        .expect("assignments array")
        .iter()
        .map(|a| a["email_id"].as_i64().expect("email_id"))
        .collect()
}

#[tokio::test]
async fn test_requires_authentication() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{}/api/v1/users", server.base_url))
        .send()
        .await
        .expect("unauthenticated request");
    assert_eq!(resp.status(), 401);

    let resp = client
        .post(format!("{}/api/v1/auth/login", server.base_url))
        .json(&serde_json::json!({"username": "admin", "password": "wrong-password"}))
        .send()
        .await
        .expect("bad login");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_ownership_gate_and_cascade() {
    let server = TestServer::start().await;
    let root = server.login_superadmin().await;
    let base = &server.base_url;

    let e1 = create_email(&root, base, "sales@example.com").await;
    let e2 = create_email(&root, base, "ops@example.com").await;

    let admin_id = create_user(&root, base, "admin-a", "password-a1", "admin").await;
    let admin = server.login("admin-a", "password-a1").await;
    let worker_id = create_user(&admin, base, "worker", "password-w1", "user").await;

    // The admin stocks both itself (via superadmin) and its worker.
    let (status, _) = put_assignments(&root, base, admin_id, &[e1, e2]).await;
    assert_eq!(status, 200);
    let (status, _) = put_assignments(&admin, base, worker_id, &[e1, e2]).await;
    assert_eq!(status, 200);

    // Ownership gate: superadmin cannot edit an admin-owned user directly.
    let (status, body) = put_assignments(&root, base, worker_id, &[e1]).await;
    assert_eq!(status, 403);
    assert_eq!(body["success"], false);

    // But shrinking the owning admin cascades into the worker's set.
    let (status, body) = put_assignments(&root, base, admin_id, &[e2]).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["cascade_removed"], 1);

    assert_eq!(assigned_ids(&admin, base, worker_id).await, vec![e2]);
}

#[tokio::test]
async fn test_scope_violation_versus_clear() {
    let server = TestServer::start().await;
    let root = server.login_superadmin().await;
    let base = &server.base_url;

    let e1 = create_email(&root, base, "sales@example.com").await;
    let e2 = create_email(&root, base, "ops@example.com").await;

    let admin_id = create_user(&root, base, "admin-a", "password-a1", "admin").await;

    // Delegate only e1 to the admin.
    let resp = root
        .put(format!("{}/api/v1/users/{}/allowed-emails", base, admin_id))
        .json(&serde_json::json!({"email_ids": [e1]}))
        .send()
        .await
        .expect("set delegation");
    assert_eq!(resp.status(), 200);

    let admin = server.login("admin-a", "password-a1").await;
    let worker_id = create_user(&admin, base, "worker", "password-w1", "user").await;

    // Entirely out-of-scope request: rejected, nothing changes.
    let (status, body) = put_assignments(&admin, base, worker_id, &[e2]).await;
    assert_eq!(status, 403);
    assert_eq!(body["success"], false);
    assert!(
        body["error"].as_str().unwrap().contains("scope"),
        "unexpected error: {body}"
    );

    // Mixed request: silently filtered to the delegated subset.
    let (status, body) = put_assignments(&admin, base, worker_id, &[e1, e2]).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["inserted"], 1);
    assert_eq!(assigned_ids(&admin, base, worker_id).await, vec![e1]);

    // Empty request: a valid clear, not a violation.
    let (status, body) = put_assignments(&admin, base, worker_id, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert!(assigned_ids(&admin, base, worker_id).await.is_empty());
}

#[tokio::test]
async fn test_template_partial_application() {
    let server = TestServer::start().await;
    let root = server.login_superadmin().await;
    let base = &server.base_url;

    let e1 = create_email(&root, base, "sales@example.com").await;

    create_user(&root, base, "admin-a", "password-a1", "admin").await;
    create_user(&root, base, "admin-b", "password-b1", "admin").await;

    let admin_a = server.login("admin-a", "password-a1").await;
    let admin_b = server.login("admin-b", "password-b1").await;
    let mine = create_user(&admin_a, base, "mine", "password-w1", "user").await;
    let theirs = create_user(&admin_b, base, "theirs", "password-w2", "user").await;

    let resp: Value = admin_a
        .post(format!("{}/api/v1/templates", base))
        .json(&serde_json::json!({
            "name": "support",
            "description": "support inboxes",
            "email_ids": [e1]
        }))
        .send()
        .await
        .expect("create template")
        .json()
        .await
        .expect("parse template response");
    assert_eq!(resp["success"], true);
    let template_id = resp["data"]["id"].as_i64().expect("template id");

    // admin-a owns `mine` but not `theirs`: one hit, one miss, no rollback.
    let resp: Value = admin_a
        .post(format!("{}/api/v1/templates/{}/apply", base, template_id))
        .json(&serde_json::json!({"user_ids": [mine, theirs]}))
        .send()
        .await
        .expect("apply template")
        .json()
        .await
        .expect("parse apply response");
    assert_eq!(resp["success"], true);
    assert_eq!(resp["data"]["applied"], 1);
    assert_eq!(resp["data"]["total"], 2);
    assert!(
        resp["message"].as_str().unwrap().contains("1 of 2"),
        "unexpected message: {resp}"
    );

    assert_eq!(assigned_ids(&admin_a, base, mine).await, vec![e1]);
    assert!(assigned_ids(&admin_b, base, theirs).await.is_empty());
}

#[tokio::test]
async fn test_available_emails_and_subject_assignments() {
    let server = TestServer::start().await;
    let root = server.login_superadmin().await;
    let base = &server.base_url;

    let e1 = create_email(&root, base, "sales@example.com").await;
    let e2 = create_email(&root, base, "ops@example.com").await;

    let worker_id = create_user(&root, base, "worker", "password-w1", "user").await;
    let (status, _) = put_assignments(&root, base, worker_id, &[e1]).await;
    assert_eq!(status, 200);

    // Only the unassigned catalog entry comes back.
    let resp: Value = root
        .get(format!(
            "{}/api/v1/users/{}/available-emails",
            base, worker_id
        ))
        .send()
        .await
        .expect("available emails")
        .json()
        .await
        .expect("parse available emails");
    assert_eq!(resp["success"], true);
    let ids: Vec<i64> = resp["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![e2]);
    assert_eq!(resp["has_more"], false);

    // Platform subject keywords: replace, then clear.
    let resp: Value = root
        .post(format!("{}/api/v1/platforms", base))
        .json(&serde_json::json!({"name": "amazon"}))
        .send()
        .await
        .expect("create platform")
        .json()
        .await
        .expect("parse platform");
    let platform_id = resp["data"]["id"].as_i64().expect("platform id");

    let resp = root
        .put(format!(
            "{}/api/v1/users/{}/platforms/{}/subjects",
            base, worker_id, platform_id
        ))
        .json(&serde_json::json!({"keywords": ["order", "refund"]}))
        .send()
        .await
        .expect("save subjects");
    assert_eq!(resp.status(), 200);

    let resp: Value = root
        .get(format!(
            "{}/api/v1/users/{}/platforms/{}/subjects",
            base, worker_id, platform_id
        ))
        .send()
        .await
        .expect("list subjects")
        .json()
        .await
        .expect("parse subjects");
    assert_eq!(resp["data"], serde_json::json!(["order", "refund"]));

    let resp = root
        .put(format!(
            "{}/api/v1/users/{}/platforms/{}/subjects",
            base, worker_id, platform_id
        ))
        .json(&serde_json::json!({"keywords": []}))
        .send()
        .await
        .expect("clear subjects");
    assert_eq!(resp.status(), 200);
}
