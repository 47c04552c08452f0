mod common;

use chrono::Utc;
use explorer_backend::types::internal::auth::Claims;
use jsonwebtoken::{EncodingKey, Header, encode};
use poem::http::StatusCode;
use poem::test::{TestForm, TestFormField};
use serde_json::json;

use common::{TEST_JWT_SECRET, TestServer, bearer, read_json};

#[tokio::test]
async fn test_signup_returns_token_and_hides_password() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post("/api/v1/users/signup")
        .body_json(&json!({
            "fullname": "Ada Lovelace",
            "email": "Ada@Example.com",
            "username": "ada",
            "password": "password123",
            "passwordConfirm": "password123",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    let body = read_json(resp).await;
    assert_eq!(body["status"], "success");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["data"]["user"]["email"], "ada@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_with_username_or_email() {
    let server = TestServer::start().await;
    server.signup("grace").await;

    for identifier in ["grace", "grace@example.com"] {
        let resp = server
            .client
            .post("/api/v1/users/login")
            .body_json(&json!({ "identifier": identifier, "password": "password123" }))
            .send()
            .await;
        resp.assert_status_is_ok();
    }

    let resp = server
        .client
        .post("/api/v1/users/login")
        .body_json(&json!({ "identifier": "grace", "password": "wrong-password" }))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_without_token_is_rejected() {
    let server = TestServer::start().await;

    let resp = server.client.get("/api/v1/users/me").send().await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let body = read_json(resp).await;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "You are not logged in! Please log in to continue");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let server = TestServer::start().await;
    let token = server.signup("linus").await;

    let me = read_json(
        server
            .client
            .get("/api/v1/users/me")
            .header("Authorization", bearer(&token))
            .send()
            .await,
    )
    .await;
    let user_id = me["data"]["user"]["id"].as_str().unwrap().to_string();

    let issued = Utc::now().timestamp() - 7200;
    let claims = Claims {
        sub: user_id,
        iat: issued,
        exp: issued + 60,
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let resp = server
        .client
        .get("/api/v1/users/me")
        .header("Authorization", bearer(&expired))
        .send()
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "Your token has expired, please log in again");
}

#[tokio::test]
async fn test_regular_user_cannot_create_category() {
    let server = TestServer::start().await;
    let token = server.signup("eve").await;

    let resp = server
        .client
        .post("/api/v1/category")
        .header("Authorization", bearer(&token))
        .multipart(TestForm::new().text("name", "Museums"))
        .send()
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_review_lifecycle_keeps_place_count_in_sync() {
    let server = TestServer::start().await;
    let admin = server.admin("root").await;
    let user = server.signup("walker").await;

    let category = read_json(
        server
            .client
            .post("/api/v1/category")
            .header("Authorization", bearer(&admin))
            .multipart(TestForm::new().text("name", "Parks"))
            .send()
            .await,
    )
    .await;
    let category_id = category["data"]["category"]["id"].as_str().unwrap().to_string();

    let resp = server
        .client
        .post("/api/v1/places")
        .header("Authorization", bearer(&admin))
        .body_json(&json!({ "name": "Green Park", "category": category_id }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let place = read_json(resp).await;
    let place_id = place["data"]["place"]["id"].as_str().unwrap().to_string();
    assert_eq!(place["data"]["place"]["reviewsCount"], 0);

    let resp = server
        .client
        .post("/api/v1/reviews")
        .header("Authorization", bearer(&user))
        .body_json(&json!({
            "place": place_id,
            "title": "Lovely",
            "description": "Shady trees and quiet paths",
            "author": "walker",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let review = read_json(resp).await;
    let review_id = review["data"]["review"]["id"].as_str().unwrap().to_string();

    let place = read_json(server.client.get(format!("/api/v1/places/{}", place_id)).send().await).await;
    assert_eq!(place["data"]["place"]["reviewsCount"], 1);
    assert_eq!(place["data"]["place"]["category"]["name"], "Parks");

    let resp = server
        .client
        .post("/api/v1/comments")
        .header("Authorization", bearer(&user))
        .body_json(&json!({ "text": "Agreed", "review": review_id }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);

    let resp = server
        .client
        .patch(format!("/api/v1/reviews/edit-likes/{}", review_id))
        .query("increase", &true)
        .header("Authorization", bearer(&user))
        .send()
        .await;
    resp.assert_status_is_ok();
    let liked = read_json(resp).await;
    assert_eq!(liked["data"]["review"]["likes"], 1);
    assert_eq!(liked["data"]["review"]["commentIds"].as_array().unwrap().len(), 1);

    let resp = server
        .client
        .delete(format!("/api/v1/reviews/{}", review_id))
        .header("Authorization", bearer(&admin))
        .send()
        .await;
    resp.assert_status(StatusCode::NO_CONTENT);

    let place = read_json(server.client.get(format!("/api/v1/places/{}", place_id)).send().await).await;
    assert_eq!(place["data"]["place"]["reviewsCount"], 0);

    let comments = read_json(
        server
            .client
            .get(format!("/api/v1/comments/review/{}", review_id))
            .header("Authorization", bearer(&user))
            .send()
            .await,
    )
    .await;
    assert_eq!(comments["results"], 0);
}

#[tokio::test]
async fn test_review_for_unknown_place_is_rejected() {
    let server = TestServer::start().await;
    let user = server.signup("nomad").await;

    let resp = server
        .client
        .post("/api/v1/reviews")
        .header("Authorization", bearer(&user))
        .body_json(&json!({
            "place": "00000000-0000-0000-0000-000000000000",
            "title": "Ghost",
            "description": "Nothing here",
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_media_upload_stores_blobs_and_rejects_non_images() {
    let server = TestServer::start().await;
    let admin = server.admin("curator").await;

    let category = read_json(
        server
            .client
            .post("/api/v1/category")
            .header("Authorization", bearer(&admin))
            .multipart(TestForm::new().text("name", "Galleries"))
            .send()
            .await,
    )
    .await;
    let category_id = category["data"]["category"]["id"].as_str().unwrap().to_string();
    let place = read_json(
        server
            .client
            .post("/api/v1/places")
            .header("Authorization", bearer(&admin))
            .body_json(&json!({ "name": "Tate", "category": category_id }))
            .send()
            .await,
    )
    .await;
    let place_id = place["data"]["place"]["id"].as_str().unwrap().to_string();
    let review = read_json(
        server
            .client
            .post("/api/v1/reviews")
            .header("Authorization", bearer(&admin))
            .body_json(&json!({ "place": place_id, "title": "Art", "description": "Many rooms" }))
            .send()
            .await,
    )
    .await;
    let review_id = review["data"]["review"]["id"].as_str().unwrap().to_string();

    let form = TestForm::new().field(
        TestFormField::bytes(vec![0x89, b'P', b'N', b'G'])
            .name("images")
            .filename("front.png")
            .content_type("image/png"),
    );
    let resp = server
        .client
        .post(format!("/api/v1/reviews/{}/media", review_id))
        .header("Authorization", bearer(&admin))
        .multipart(form)
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = read_json(resp).await;
    assert_eq!(body["data"]["review"]["media"].as_array().unwrap().len(), 1);
    assert_eq!(server.blob_store.stored().len(), 1);

    let form = TestForm::new().field(
        TestFormField::text("plain text")
            .name("images")
            .filename("notes.txt")
            .content_type("text/plain"),
    );
    let resp = server
        .client
        .post(format!("/api/v1/reviews/{}/media", review_id))
        .header("Authorization", bearer(&admin))
        .multipart(form)
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["message"], "Not an image! Please upload only images");
    assert_eq!(server.blob_store.stored().len(), 1);
}

#[tokio::test]
async fn test_forgot_password_sends_reset_link() {
    let server = TestServer::start().await;
    server.signup("forgetful").await;

    let resp = server
        .client
        .post("/api/v1/users/forgot-password")
        .body_json(&json!({ "email": "forgetful@example.com" }))
        .send()
        .await;
    resp.assert_status_is_ok();

    let sent = server.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "forgetful@example.com");
    assert!(sent[0].body.contains("http://explorer.test/api/v1/users/reset-password/"));

    let resp = server
        .client
        .post("/api/v1/users/forgot-password")
        .body_json(&json!({ "email": "stranger@example.com" }))
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_database_up() {
    let server = TestServer::start().await;

    let resp = server.client.get("/api/v1/health").send().await;
    resp.assert_status_is_ok();

    let body = read_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_category_image_upload_and_replace() {
    let server = TestServer::start().await;
    let admin = server.admin("keeper").await;

    let form = TestForm::new().text("name", "Zoos").field(
        TestFormField::bytes(vec![0xFF, 0xD8, 0xFF])
            .name("image")
            .filename("lion.jpg")
            .content_type("image/jpeg"),
    );
    let resp = server
        .client
        .post("/api/v1/category")
        .header("Authorization", bearer(&admin))
        .multipart(form)
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body = read_json(resp).await;
    let category_id = body["data"]["category"]["id"].as_str().unwrap().to_string();
    let first_image = body["data"]["category"]["image"].as_str().unwrap().to_string();
    assert!(first_image.starts_with("memory://blobs/categories/"));

    let form = TestForm::new().field(
        TestFormField::bytes(vec![0x89, b'P', b'N', b'G'])
            .name("image")
            .filename("tiger.png")
            .content_type("image/png"),
    );
    let resp = server
        .client
        .patch(format!("/api/v1/category/{}", category_id))
        .header("Authorization", bearer(&admin))
        .multipart(form)
        .send()
        .await;
    resp.assert_status_is_ok();
    let body = read_json(resp).await;
    assert_ne!(body["data"]["category"]["image"].as_str().unwrap(), first_image);

    server.data.cleanup_queue.flush().await;
    assert_eq!(server.blob_store.stored().len(), 1);
    assert_eq!(server.blob_store.destroyed().len(), 1);
}

#[tokio::test]
async fn test_too_many_media_files_are_refused_before_upload() {
    let server = TestServer::start().await;
    let admin = server.admin("archivist").await;

    let category = read_json(
        server
            .client
            .post("/api/v1/category")
            .header("Authorization", bearer(&admin))
            .multipart(TestForm::new().text("name", "Libraries"))
            .send()
            .await,
    )
    .await;
    let category_id = category["data"]["category"]["id"].as_str().unwrap().to_string();
    let place = read_json(
        server
            .client
            .post("/api/v1/places")
            .header("Authorization", bearer(&admin))
            .body_json(&json!({ "name": "Bodleian", "category": category_id }))
            .send()
            .await,
    )
    .await;
    let place_id = place["data"]["place"]["id"].as_str().unwrap().to_string();
    let review = read_json(
        server
            .client
            .post("/api/v1/reviews")
            .header("Authorization", bearer(&admin))
            .body_json(&json!({ "place": place_id, "title": "Quiet", "description": "Old books" }))
            .send()
            .await,
    )
    .await;
    let review_id = review["data"]["review"]["id"].as_str().unwrap().to_string();

    let mut form = TestForm::new();
    for i in 0..5u8 {
        form = form.field(
            TestFormField::bytes(vec![i])
                .name("images")
                .filename(format!("shelf-{}.png", i))
                .content_type("image/png"),
        );
    }
    let resp = server
        .client
        .post(format!("/api/v1/reviews/{}/media", review_id))
        .header("Authorization", bearer(&admin))
        .multipart(form)
        .send()
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let body = read_json(resp).await;
    assert_eq!(body["message"], "You can upload at most 4 images at once");
    assert!(server.blob_store.stored().is_empty());
}
