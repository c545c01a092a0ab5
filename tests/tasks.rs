mod common;

use std::net::TcpListener;

use actix_web::http::StatusCode;
use actix_web::{rt, test, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{bearer, create_task, create_todo, register_and_login, send, test_app, test_state};

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let state = test_state();
    let server = HttpServer::new(move || test_app(state.clone()))
        .workers(1)
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run();
    let handle = server.handle();
    rt::spawn(server);

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/task", port))
        .json(&json!({ "todo_list": 1, "note": "Unauthorized task" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.expect("body is not JSON");
    assert_eq!(body, json!({ "detail": "Not authenticated" }));

    handle.stop(false).await;
}

#[test_log::test(actix_rt::test)]
async fn test_task_crud_flow() {
    let app = test::init_service(test_app(test_state())).await;
    let token = register_and_login(&app, "crud_user").await;

    let list = create_todo(&app, &token, "Groceries").await;
    let list_id = list["id"].as_i64().unwrap();

    // 1. Create
    let created = create_task(&app, &token, list_id, "Buy milk").await;
    assert_eq!(created["todo_list"], list["id"]);
    assert_eq!(created["note"], "Buy milk");
    let task_id = created["id"].as_i64().unwrap();

    // 2. Get by id
    let req = test::TestRequest::get()
        .uri(&format!("/task/{}", task_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    // 3. Update
    let req = test::TestRequest::put()
        .uri(&format!("/task/{}", task_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "note": "Buy oat milk" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"], "Buy oat milk");
    assert_eq!(body["todo_list"], list["id"]);

    // 4. Clearing the note
    let req = test::TestRequest::put()
        .uri(&format!("/task/{}", task_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "note": null }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["note"].is_null());

    // 5. Listing
    create_task(&app, &token, list_id, "Eggs").await;
    let req = test::TestRequest::get()
        .uri("/task")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // 6. Delete
    let req = test::TestRequest::delete()
        .uri(&format!("/task/{}", task_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Task deleted successfully" }));

    let req = test::TestRequest::get()
        .uri(&format!("/task/{}", task_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Task not found" }));
}

#[actix_rt::test]
async fn test_task_in_foreign_or_missing_list_is_invalid() {
    let app = test::init_service(test_app(test_state())).await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let list = create_todo(&app, &alice, "Alice's list").await;
    let list_id = list["id"].as_i64().unwrap();

    for target in [list_id, list_id + 1000] {
        let req = test::TestRequest::post()
            .uri("/task")
            .insert_header(bearer(&bob))
            .set_json(json!({ "todo_list": target, "note": "intrusion" }))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "Invalid todo list" }));
    }

    // alice's list is untouched
    let req = test::TestRequest::get()
        .uri(&format!("/todo/{}/task", list_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body, json!([]));
}

#[test_log::test(actix_rt::test)]
async fn test_non_owner_cannot_touch_task() {
    let app = test::init_service(test_app(test_state())).await;
    let alice = register_and_login(&app, "alice").await;
    let bob = register_and_login(&app, "bob").await;

    let list = create_todo(&app, &alice, "Alice's list").await;
    let task = create_task(&app, &alice, list["id"].as_i64().unwrap(), "private").await;
    let id = task["id"].as_i64().unwrap();

    for target in [id, id + 1000] {
        let requests = [
            test::TestRequest::get().uri(&format!("/task/{}", target)),
            test::TestRequest::put()
                .uri(&format!("/task/{}", target))
                .set_json(json!({ "note": "defaced" })),
            test::TestRequest::delete().uri(&format!("/task/{}", target)),
        ];
        for req in requests {
            let (status, body) = send(&app, req.insert_header(bearer(&bob)).to_request()).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({ "detail": "Task not found" }));
        }
    }

    let req = test::TestRequest::get()
        .uri("/task")
        .insert_header(bearer(&bob))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body, json!([]));

    let req = test::TestRequest::get()
        .uri(&format!("/task/{}", id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, task);
}
