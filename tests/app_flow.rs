//! End-to-end flows through `App`: log in, load a view, select rows and
//! fetch related records, with every request served by a mock API.

use crudknut::api::ResourceClient;
use crudknut::app::App;
use crudknut::config::Config;
use crudknut::entity::EntityKind;
use crudknut::shell::Screen;
use crudknut::view::{Command, RelatedPanel};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status(app: &App) -> Option<&str> {
    app.status_message.as_ref().map(|(m, _)| &**m)
}

/// Register "ann" and log in; returns the app and the initial load.
async fn logged_in(server: &MockServer, start: &str) -> App {
    let config = Config {
        base_url: server.uri(),
        start_entity: start.to_string(),
        ..Config::default()
    };
    let client = ResourceClient::new(&config.base_url, config.request_timeout()).unwrap();
    let mut app = App::new(client, &config);

    app.toggle_auth_mode();
    let form = app.auth.active_mut();
    form.set("login", "ann");
    form.set("email", "ann@example.com");
    form.set("password", "secret");
    form.set("confirmPassword", "secret");
    assert!(app.submit_auth().is_none());

    app.auth.active_mut().set("password", "secret");
    let load = app.submit_auth().unwrap();
    let delivery = load.execute(&app.client).await;
    app.apply_delivery(delivery);
    app
}

#[tokio::test]
async fn test_login_then_load_posts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userId": 1, "id": 1, "title": "first", "body": "one"},
            {"userId": 1, "id": 2, "title": "second", "body": "two"}
        ])))
        .mount(&server)
        .await;

    let app = logged_in(&server, "posts").await;

    assert_eq!(app.screen(), Screen::Entity(EntityKind::Posts));
    assert_eq!(status(&app), Some("Loaded 2 posts"));
    let view = app.active.as_ref().unwrap();
    let rows = view.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].headline, "first");
}

#[tokio::test]
async fn test_album_selection_fetches_photos() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userId": 1, "id": 1, "title": "holiday"},
            {"userId": 1, "id": 2, "title": "work"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/photos"))
        .and(query_param("albumId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"albumId": 1, "id": 1, "title": "beach", "url": "https://x/1.png"},
            {"albumId": 1, "id": 2, "title": "sunset", "url": "https://x/2.png"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = logged_in(&server, "albums").await;

    let fetch = app.run_command(Command::ToggleSelection).unwrap();
    assert_eq!(fetch.name(), "related");
    let delivery = fetch.execute(&app.client).await;
    app.apply_delivery(delivery);

    assert_eq!(status(&app), Some("Photos for #1: 2"));
    let view = app.active.as_ref().unwrap();
    assert_eq!(view.selection(), Some(1));
    match view.related() {
        Some(RelatedPanel::Loaded(items)) => {
            let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
            assert_eq!(titles, vec!["beach", "sunset"]);
        }
        other => panic!("expected loaded photos, got {:?}", other),
    }
}

#[tokio::test]
async fn test_related_reply_after_deselect_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "name": "Leanne Graham",
                "username": "Bret",
                "email": "Sincere@april.biz",
                "address": {
                    "street": "Kulas Light",
                    "suite": "Apt. 556",
                    "city": "Gwenborough",
                    "zipcode": "92998-3874",
                    "geo": {"lat": "-37.3159", "lng": "81.1496"}
                },
                "phone": "1-770-736-8031 x56442",
                "website": "hildegard.org",
                "company": {
                    "name": "Romaguera-Crona",
                    "catchPhrase": "Multi-layered client-server neural-net",
                    "bs": "harness real-time e-markets"
                }
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("userId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"userId": 1, "id": 1, "title": "a", "body": "b"}
        ])))
        .mount(&server)
        .await;

    let mut app = logged_in(&server, "users").await;
    assert_eq!(status(&app), Some("Loaded 1 users"));

    let fetch = app.run_command(Command::ToggleSelection).unwrap();
    // Second toggle clears the selection before the reply lands
    assert!(app.run_command(Command::ToggleSelection).is_none());

    let delivery = fetch.execute(&app.client).await;
    app.apply_delivery(delivery);

    let view = app.active.as_ref().unwrap();
    assert_eq!(view.selection(), None);
    assert!(view.related().is_none());
}

#[tokio::test]
async fn test_reply_for_previous_view_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "a", "body": "b"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut app = logged_in(&server, "posts").await;
    let reload = app.run_command(Command::Reload).unwrap();

    let comments = app.select_entity(EntityKind::Comments).unwrap();
    let delivery = reload.execute(&app.client).await;
    app.apply_delivery(delivery);
    assert_eq!(app.active.as_ref().unwrap().kind(), EntityKind::Comments);
    assert!(app.active.as_ref().unwrap().is_empty());

    let delivery = comments.execute(&app.client).await;
    app.apply_delivery(delivery);
    assert_eq!(status(&app), Some("Loaded 0 comments"));
}

#[tokio::test]
async fn test_unreachable_server_raises_alert() {
    // Port 9 (discard) on localhost is closed in test environments
    let config = Config {
        base_url: "http://127.0.0.1:9".to_string(),
        ..Config::default()
    };
    let client = ResourceClient::new(&config.base_url, config.request_timeout()).unwrap();
    let mut app = App::new(client, &config);

    app.toggle_auth_mode();
    let form = app.auth.active_mut();
    form.set("login", "ann");
    form.set("email", "ann@example.com");
    form.set("password", "pw");
    form.set("confirmPassword", "pw");
    app.submit_auth();
    app.auth.active_mut().set("password", "pw");
    let load = app.submit_auth().unwrap();

    let delivery = load.execute(&app.client).await;
    app.apply_delivery(delivery);

    assert!(app
        .alert
        .as_deref()
        .is_some_and(|m| m.starts_with("Request failed")));
    assert!(app.active.as_ref().unwrap().is_empty());
}
