//! API integration tests
//!
//! These run against a live server and database:
//! `cargo test -- --ignored` with the server listening on localhost:8080.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Create a book with the given capacity, returning its id
async fn create_book(client: &Client, isbn: &str, total: i32) -> i32 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "isbn": isbn,
            "title": format!("Test Book {}", isbn),
            "author": "Test Author",
            "total_quantity": total
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book");
    body["id"].as_i64().expect("No id in response") as i32
}

// Borrower identities come from the directory sync; these tests assume
// this handle has been seeded in the users table.
const BORROWER: &str = "mt1230001";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_issue_and_return_flow() {
    let client = Client::new();
    let book_id = create_book(&client, "9781000000001", 2).await;

    // Issue a copy
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "book_id": book_id, "username": BORROWER }))
        .send()
        .await
        .expect("Failed to issue");
    assert_eq!(response.status(), 201);

    let borrow: Value = response.json().await.expect("Failed to parse borrow");
    assert_eq!(borrow["status"], "issued");
    assert_eq!(borrow["is_overdue"], false);
    let borrow_id = borrow["id"].as_i64().unwrap();

    // Book now shows one issued copy
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["issued_quantity"], 1);
    assert_eq!(book["available_quantity"], 1);

    // Return it
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .send()
        .await
        .expect("Failed to return");
    assert_eq!(response.status(), 200);

    let returned: Value = response.json().await.unwrap();
    assert_eq!(returned["status"], "returned");

    // Returning twice is rejected
    let response = client
        .post(format!("{}/borrows/{}/return", BASE_URL, borrow_id))
        .send()
        .await
        .expect("Failed to send second return");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_issue_fails_when_no_copies_available() {
    let client = Client::new();
    let book_id = create_book(&client, "9781000000002", 0).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "book_id": book_id, "username": BORROWER }))
        .send()
        .await
        .expect("Failed to send issue");
    assert_eq!(response.status(), 409);

    // State untouched
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["issued_quantity"], 0);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_issues_respect_capacity() {
    let client = Client::new();
    let book_id = create_book(&client, "9781000000003", 3).await;

    // 8 concurrent issues against 3 copies: exactly 3 must succeed
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .post(format!("{}/borrows", BASE_URL))
                    .json(&json!({ "book_id": book_id, "username": BORROWER }))
                    .send()
                    .await
                    .expect("Failed to send issue")
                    .status()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.expect("issue task panicked"));
    }
    let successes = statuses.iter().filter(|s| s.as_u16() == 201).count();
    let conflicts = statuses.iter().filter(|s| s.as_u16() == 409).count();
    assert_eq!(successes, 3);
    assert_eq!(conflicts, 5);

    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["issued_quantity"], 3);
}

#[tokio::test]
#[ignore]
async fn test_capacity_cannot_drop_below_issued() {
    let client = Client::new();
    let book_id = create_book(&client, "9781000000004", 2).await;

    // Issue one copy
    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "book_id": book_id, "username": BORROWER }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    // Shrinking to 0 would strand the issued copy
    let response = client
        .put(format!("{}/books/{}/capacity", BASE_URL, book_id))
        .json(&json!({ "total_quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Shrinking to 1 is fine
    let response = client
        .put(format!("{}/books/{}/capacity", BASE_URL, book_id))
        .json(&json!({ "total_quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_refused_while_issued() {
    let client = Client::new();
    let book_id = create_book(&client, "9781000000005", 1).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "book_id": book_id, "username": BORROWER }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_sync_status_is_exposed() {
    let client = Client::new();

    let response = client
        .get(format!("{}/sync/status", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["next_run"].is_string());
    assert!(body["running"].is_boolean());
}
