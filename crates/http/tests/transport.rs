//! Sheets API transport tests against a mock server.

use gsheet_core::{BatchReply, BatchRequest, SheetsTransport, StoreConfig, StoreError};
use gsheet_http::{CredentialProvider, HttpTransport, StaticToken};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ID: &str = "sheet-id";

fn transport(server: &MockServer, token: Arc<StaticToken>) -> HttpTransport {
    let config = StoreConfig::new(ID).with_api_base_url(server.uri());
    HttpTransport::new(&config, token).unwrap()
}

fn api_error(code: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(serde_json::json!({
        "error": {"code": code, "message": message, "status": "INVALID_ARGUMENT"}
    }))
}

#[tokio::test]
async fn test_metadata_lists_sheet_properties() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{ID}")))
        .and(query_param("fields", "sheets.properties"))
        .and(header("authorization", "Bearer ya29.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Gelirler", "index": 0, "sheetType": "GRID"}},
                {"properties": {"sheetId": 123, "title": "Proje Takip", "index": 1}}
            ]
        })))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("ya29.test")));
    let sheets = t.spreadsheet_metadata().await.unwrap();

    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[1].sheet_id, 123);
    assert_eq!(sheets[1].title, "Proje Takip");
}

#[tokio::test]
async fn test_get_values_converts_cells() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{ID}/values/Gelirler")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "Gelirler!A1:Z1000",
            "majorDimension": "ROWS",
            "values": [["Tarih", "Tutar"], ["2024-01-05", 1500]]
        })))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    let rows = t.get_values("Gelirler").await.unwrap();
    assert_eq!(rows, vec![vec!["Tarih", "Tutar"], vec!["2024-01-05", "1500"]]);
}

#[tokio::test]
async fn test_get_values_empty_range() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v4/spreadsheets/{ID}/values/Bos")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"range": "Bos!A1:Z1000", "majorDimension": "ROWS"})),
        )
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    assert!(t.get_values("Bos").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_values_request_shape() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/v4/spreadsheets/{ID}/values/Gelirler!A5:E5")))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(body_json(serde_json::json!({
            "range": "Gelirler!A5:E5",
            "majorDimension": "ROWS",
            "values": [["2024-01-05", "Hakediş", "1000", "Gelir", "Proje"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "updatedRange": "Gelirler!A5:E5", "updatedCells": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    t.update_values(
        "Gelirler!A5:E5",
        vec![vec![
            "2024-01-05".into(),
            "Hakediş".into(),
            "1000".into(),
            "Gelir".into(),
            "Proje".into(),
        ]],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_append_values_uses_append_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v4/spreadsheets/{ID}/values/Gelirler!A:E:append")))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    t.append_values("Gelirler!A:E", vec![vec!["x".into()]])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_batch_update_add_and_delete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v4/spreadsheets/{ID}:batchUpdate")))
        .and(body_json(serde_json::json!({
            "requests": [
                {"addSheet": {"properties": {"title": "Giderler"}}},
                {"deleteSheet": {"sheetId": 5}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "spreadsheetId": ID,
            "replies": [
                {"addSheet": {"properties": {"sheetId": 42, "title": "Giderler", "index": 2}}},
                {}
            ]
        })))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    let replies = t
        .batch_update(vec![
            BatchRequest::AddSheet {
                title: "Giderler".into(),
            },
            BatchRequest::DeleteSheet { sheet_id: 5 },
        ])
        .await
        .unwrap();

    assert_eq!(replies.len(), 2);
    assert!(matches!(&replies[0], BatchReply::AddSheet(p) if p.sheet_id == 42 && p.index == 2));
    assert_eq!(replies[1], BatchReply::Empty);
}

// ===== Error mapping =====

#[tokio::test]
async fn test_missing_token_fails_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::none()));
    let err = t.get_values("Gelirler").await.unwrap_err();
    assert!(err.is_auth_required());
}

#[tokio::test]
async fn test_unauthorized_revokes_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(api_error(401, "Request had invalid authentication credentials."))
        .expect(1)
        .mount(&server)
        .await;

    let token = Arc::new(StaticToken::new("expired"));
    let t = transport(&server, token.clone());

    assert!(t.get_values("Gelirler").await.unwrap_err().is_auth_required());
    assert_eq!(token.access_token().await.unwrap(), None);
    // The second call is refused locally; the mock expects a single request.
    assert!(t.get_values("Gelirler").await.unwrap_err().is_auth_required());
    assert!(!t.reauthenticate().await.unwrap());
}

#[tokio::test]
async fn test_forbidden_is_auth_required() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(api_error(403, "The caller does not have permission"))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    assert!(t.spreadsheet_metadata().await.unwrap_err().is_auth_required());
}

#[tokio::test]
async fn test_unknown_sheet_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(api_error(400, "Unable to parse range: Yok"))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    let err = t.get_values("Yok").await.unwrap_err();
    assert!(err.is_not_found(), "{err}");
}

#[tokio::test]
async fn test_unknown_spreadsheet_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(api_error(404, "Requested entity was not found."))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    assert!(t.spreadsheet_metadata().await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let t = transport(&server, Arc::new(StaticToken::new("t")));
    let err = t
        .update_values("Gelirler!A2:A2", vec![vec!["x".into()]])
        .await
        .unwrap_err();
    match err {
        StoreError::Transport(message) => assert!(message.starts_with("HTTP 503"), "{message}"),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_failure_is_transport() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = StoreConfig::new(ID).with_api_base_url(uri);
    let t = HttpTransport::new(&config, Arc::new(StaticToken::new("t"))).unwrap();
    let err = t.get_values("Gelirler").await.unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
