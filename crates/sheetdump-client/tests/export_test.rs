//! End-to-end export against a mocked token endpoint and Sheets API.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use mockito::{Matcher, Server, ServerGuard};
use sheetdump_client::ClientError;
use sheetdump_client::commands::export;
use sheetdump_client::config::{ClientConfig, Endpoints};
use tempfile::TempDir;

const DOC_ID: &str = "doc-1";

const CLIENT_SECRET: &str = r#"{
    "installed": {
        "client_id": "test.apps.googleusercontent.com",
        "client_secret": "test-secret"
    }
}"#;

/// A stored credential whose access token expired long ago.
fn expired_credential_json(access: &str, refresh: &str) -> String {
    format!(
        r#"{{
            "access_token": "{}",
            "refresh_token": "{}",
            "expires_at": "2020-01-01T00:00:00Z",
            "scopes": ["https://www.googleapis.com/auth/spreadsheets.readonly"],
            "last_refresh": "2020-01-01T00:00:00Z"
        }}"#,
        access, refresh
    )
}

fn setup(server: &ServerGuard) -> (TempDir, ClientConfig) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("credentials.json"), CLIENT_SECRET).unwrap();

    let config = ClientConfig {
        spreadsheet_id: DOC_ID.to_string(),
        output: dir.path().join("translations.xlsx"),
        credentials_file: dir.path().join("credentials.json"),
        token_path: dir.path().join("token.json"),
        timeout_secs: 5,
        endpoints: Endpoints {
            auth_url: Some(format!("{}/auth", server.url())),
            token_url: Some(format!("{}/token", server.url())),
            api_base: Some(server.url()),
        },
        ..Default::default()
    };
    (dir, config)
}

fn write_token(path: &Path, access: &str, refresh: &str) {
    std::fs::write(path, expired_credential_json(access, refresh)).unwrap();
}

async fn mock_refresh_ok(server: &mut Server) -> mockito::Mock {
    server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"fresh-token","expires_in":3599,"token_type":"Bearer"}"#)
        .create_async()
        .await
}

async fn mock_sheet_titles(server: &mut Server, titles: &[&str]) -> mockito::Mock {
    let sheets: Vec<String> = titles
        .iter()
        .map(|t| format!(r#"{{"properties":{{"title":"{}"}}}}"#, t))
        .collect();
    server
        .mock("GET", Matcher::Regex(format!(r"^/spreadsheets/{}($|\?)", DOC_ID)))
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_body(format!(r#"{{"sheets":[{}]}}"#, sheets.join(",")))
        .create_async()
        .await
}

async fn mock_values(server: &mut Server, title: &str, body: &str) -> mockito::Mock {
    server
        .mock(
            "GET",
            Matcher::Regex(format!(r"^/spreadsheets/{}/values/.*{}", DOC_ID, title)),
        )
        .match_header("authorization", "Bearer fresh-token")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

fn string_at(range: &calamine::Range<Data>, row: u32, col: u32) -> Option<String> {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => Some(s.clone()),
        _ => None,
    }
}

#[tokio::test]
async fn expired_credential_is_refreshed_and_sheets_are_exported() {
    let mut server = Server::new_async().await;
    let (_dir, config) = setup(&server);
    write_token(&config.token_path, "stale-token", "refresh-1");

    let refresh = mock_refresh_ok(&mut server).await;
    let titles = mock_sheet_titles(&mut server, &["Sheet1", "Sheet2"]).await;
    let first = mock_values(
        &mut server,
        "Sheet1",
        r#"{"range":"Sheet1!A1:Z1000","majorDimension":"ROWS","values":[["a","b"],["c"]]}"#,
    )
    .await;
    let second = mock_values(
        &mut server,
        "Sheet2",
        r#"{"range":"Sheet2!A1:Z1000","majorDimension":"ROWS"}"#,
    )
    .await;

    let summary = export::run(&config).await.unwrap();
    assert_eq!(summary.sheet_names, vec!["Sheet1", "Sheet2"]);
    assert_eq!(summary.cells, 3);

    refresh.assert_async().await;
    titles.assert_async().await;
    first.assert_async().await;
    second.assert_async().await;

    let mut wb: Xlsx<_> = open_workbook(&config.output).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Sheet1".to_string(), "Sheet2".to_string()]);
    let sheet1 = wb.worksheet_range("Sheet1").unwrap();
    assert_eq!(string_at(&sheet1, 0, 0).as_deref(), Some("a"));
    assert_eq!(string_at(&sheet1, 0, 1).as_deref(), Some("b"));
    assert_eq!(string_at(&sheet1, 1, 0).as_deref(), Some("c"));
    assert_eq!(string_at(&sheet1, 1, 1), None);
    assert!(wb.worksheet_range("Sheet2").unwrap().is_empty());

    // The refreshed credential was persisted with the original refresh token
    let stored = std::fs::read_to_string(&config.token_path).unwrap();
    assert!(stored.contains("fresh-token"));
    assert!(stored.contains("refresh-1"));
}

#[tokio::test]
async fn revoked_refresh_token_aborts_without_output() {
    let mut server = Server::new_async().await;
    let (_dir, config) = setup(&server);
    write_token(&config.token_path, "stale-token", "revoked");

    let _mock = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#)
        .create_async()
        .await;
    let api = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = export::run(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)), "got {}", err);
    assert!(!config.output.exists());
    assert!(!config.token_path.exists());
    api.assert_async().await;
}

#[tokio::test]
async fn missing_spreadsheet_is_a_remote_error() {
    let mut server = Server::new_async().await;
    let (_dir, config) = setup(&server);
    write_token(&config.token_path, "stale-token", "refresh-1");

    let _refresh = mock_refresh_ok(&mut server).await;
    let _mock = server
        .mock("GET", Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#)
        .create_async()
        .await;

    let err = export::run(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(_)), "got {}", err);
    assert!(err.to_string().contains("Requested entity was not found."));
    assert!(!config.output.exists());

    // The credential itself is fine and stays stored
    assert!(config.token_path.exists());
}

#[tokio::test]
async fn existing_output_is_replaced() {
    let mut server = Server::new_async().await;
    let (_dir, config) = setup(&server);
    write_token(&config.token_path, "stale-token", "refresh-1");
    std::fs::write(&config.output, b"old contents").unwrap();

    let _refresh = mock_refresh_ok(&mut server).await;
    let _titles = mock_sheet_titles(&mut server, &["Only"]).await;
    let _values = mock_values(&mut server, "Only", r#"{"values":[["new"]]}"#).await;

    export::run(&config).await.unwrap();

    let mut wb: Xlsx<_> = open_workbook(&config.output).unwrap();
    let only = wb.worksheet_range("Only").unwrap();
    assert_eq!(string_at(&only, 0, 0).as_deref(), Some("new"));
}

#[tokio::test]
async fn rejected_access_token_is_a_remote_error() {
    let mut server = Server::new_async().await;
    let (_dir, config) = setup(&server);
    // No expiry: the stored access token is used without a refresh
    std::fs::write(
        &config.token_path,
        r#"{
            "access_token": "stored-token",
            "refresh_token": "refresh-1",
            "expires_at": null,
            "scopes": ["https://www.googleapis.com/auth/spreadsheets.readonly"],
            "last_refresh": "2020-01-01T00:00:00Z"
        }"#,
    )
    .unwrap();

    let token = server
        .mock("POST", "/token")
        .expect(0)
        .create_async()
        .await;
    let _api = server
        .mock("GET", Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#)
        .create_async()
        .await;

    let err = export::run(&config).await.unwrap_err();
    assert!(matches!(err, ClientError::Remote(_)), "got {}", err);
    assert!(err.to_string().contains("invalid authentication credentials"));
    assert!(!config.output.exists());
    assert!(config.token_path.exists());
    token.assert_async().await;
}
