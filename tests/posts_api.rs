mod common;

use std::num::NonZeroU32;

use blogdesk::application::error::RequestError;
use blogdesk::application::list_view::posts_initial_state;
use blogdesk::application::resources::{ListQuery, ResourceClient};
use blogdesk::infra::http::PostsApi;
use blogdesk_api_types::Post;
use httpmock::MockServer;
use serde_json::Value;

fn rows(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).expect("non-zero")
}

#[tokio::test]
async fn list_sends_sort_and_paging_and_reads_total() -> Result<(), RequestError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/posts")
            .header("x-requested-with", "XMLHttpRequest")
            .header("accept", "application/json")
            .query_param("sortBy", "id")
            .query_param("sortDir", "asc")
            .query_param("page", "1")
            .query_param("rowsPerPage", "5");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":[{"id":1,"title":"First","content":"a","user_id":2,"user":{"id":2,"name":"Ann"},"comments_count":3}],"meta":{"total":12}}"#);
    });

    let api = PostsApi::new(common::transport(&server));
    let page = api
        .list(&ListQuery::from(&posts_initial_state(rows(5))))
        .await?;

    mock.assert();
    assert_eq!(page.count, 12);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].comments_count, Some(3));
    assert_eq!(
        page.data[0].user.as_ref().map(|user| user.name.as_str()),
        Some("Ann")
    );
    Ok(())
}

#[tokio::test]
async fn get_backfills_missing_id() -> Result<(), RequestError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/api/posts/7");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"data":{"title":"Seven","content":"body","user_id":null}}"#);
    });

    let api = PostsApi::new(common::transport(&server));
    let post = api.get(Some(7)).await?;

    mock.assert();
    assert_eq!(post.id, Some(7));
    assert_eq!(post.title, "Seven");
    Ok(())
}

#[tokio::test]
async fn get_without_id_returns_empty_draft_without_request() -> Result<(), RequestError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path_includes("/api/posts");
        then.status(500);
    });

    let api = PostsApi::new(common::transport(&server));
    assert_eq!(api.get(None).await?, Post::default());
    assert_eq!(api.get(Some(0)).await?, Post::default());

    mock.assert_calls(0);
    Ok(())
}

#[tokio::test]
async fn create_sends_draft_and_reads_enveloped_record() -> Result<(), RequestError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/api/posts")
            .header("content-type", "application/json")
            .json_body_includes(r#"{"id":null,"title":"T","content":"C","user_id":4}"#);
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"data":{"id":10,"title":"T","content":"C","user_id":4}}"#);
    });

    let api = PostsApi::new(common::transport(&server));
    let draft = Post {
        title: "T".into(),
        content: "C".into(),
        user_id: Some(4),
        ..Post::default()
    };
    let saved = api.create(&draft).await?;

    mock.assert();
    assert_eq!(saved.id, Some(10));
    Ok(())
}

#[tokio::test]
async fn update_accepts_bare_body() -> Result<(), RequestError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("PUT")
            .path("/api/posts/10")
            .json_body_includes(r#"{"title":"New"}"#);
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"id":10,"title":"New","content":"C","user_id":4}"#);
    });

    let api = PostsApi::new(common::transport(&server));
    let draft = Post {
        id: Some(10),
        title: "New".into(),
        content: "C".into(),
        user_id: Some(4),
        ..Post::default()
    };
    let saved = api.update(10, &draft).await?;

    mock.assert();
    assert_eq!(saved.title, "New");
    Ok(())
}

#[tokio::test]
async fn validation_failure_keeps_field_order() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/posts");
        then.status(422)
            .header("content-type", "application/json")
            .body(r#"{"message":"The given data was invalid.","errors":{"title":["The title has already been taken."],"content":["The content must be at least 10 characters.","The content is boring."]}}"#);
    });

    let api = PostsApi::new(common::transport(&server));
    let err = api
        .create(&Post {
            title: "Dup".into(),
            content: "short".into(),
            ..Post::default()
        })
        .await
        .expect_err("422");

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.message(), "The given data was invalid.");
    assert_eq!(
        err.messages(),
        vec![
            "The title has already been taken.",
            "The content must be at least 10 characters.",
            "The content is boring.",
        ]
    );
}

#[tokio::test]
async fn non_json_failure_body_still_carries_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts/3");
        then.status(500).body("<html>oops</html>");
    });

    let api = PostsApi::new(common::transport(&server));
    let err = api.get(Some(3)).await.expect_err("500");

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.messages(), vec!["request failed with status 500"]);
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/posts/404");
        then.status(404)
            .header("content-type", "application/json")
            .body(r#"{"message":"No query results for model [Post] 404"}"#);
    });

    let api = PostsApi::new(common::transport(&server));
    let err = api.get(Some(404)).await.expect_err("404");
    assert!(err.is_not_found());
    assert_eq!(err.message(), "No query results for model [Post] 404");
}

#[tokio::test]
async fn delete_with_empty_body_yields_null() -> Result<(), RequestError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("DELETE").path("/api/posts/5");
        then.status(204);
    });

    let api = PostsApi::new(common::transport(&server));
    assert_eq!(api.delete(5).await?, Value::Null);
    mock.assert();
    Ok(())
}
