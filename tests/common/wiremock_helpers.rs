use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts a token endpoint at `/token` that accepts the signed
/// service-account grant and returns a bearer token.
pub async fn mount_token_endpoint(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access_token,
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

/// Mounts a Drive files.list endpoint that resolves `name` to `file_id`
pub async fn mount_drive_lookup(server: &MockServer, name: &str, file_id: &str) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{ "id": file_id, "name": name }]
        })))
        .mount(server)
        .await;
}

/// Mounts a Drive files.list endpoint with no matching files
pub async fn mount_empty_drive_lookup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": [] })),
        )
        .mount(server)
        .await;
}

/// Mounts a values.get endpoint for one range returning the given rows
pub async fn mount_values_get(
    server: &MockServer,
    spreadsheet_id: &str,
    range: &str,
    values: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/v4/spreadsheets/{}/values/{}",
            spreadsheet_id, range
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values
        })))
        .mount(server)
        .await;
}

/// Mounts a values.get endpoint for a worksheet with no data at all (the
/// Sheets API omits the `values` key entirely in that case)
pub async fn mount_values_get_empty(server: &MockServer, spreadsheet_id: &str, range: &str) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/v4/spreadsheets/{}/values/{}",
            spreadsheet_id, range
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": range,
            "majorDimension": "ROWS"
        })))
        .mount(server)
        .await;
}

/// Mounts the 400 response the Sheets API gives when a range names a
/// worksheet that does not exist
pub async fn mount_values_get_missing_worksheet(
    server: &MockServer,
    spreadsheet_id: &str,
    range: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/v4/spreadsheets/{}/values/{}",
            spreadsheet_id, range
        )))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {
                "code": 400,
                "message": format!("Unable to parse range: {}", range),
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(server)
        .await;
}

/// Standard matcher set for the append call on a worksheet; mount with an
/// expectation to assert the client chose append over update
pub fn append_mock(spreadsheet_id: &str, worksheet: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(format!(
            "/v4/spreadsheets/{}/values/{}!A:A:append",
            spreadsheet_id, worksheet
        )))
        .and(query_param("valueInputOption", "RAW"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
}

/// Matcher set for the full-table update call on a worksheet
pub fn update_mock(spreadsheet_id: &str, worksheet: &str) -> wiremock::MockBuilder {
    Mock::given(method("PUT"))
        .and(path(format!(
            "/v4/spreadsheets/{}/values/{}!A1",
            spreadsheet_id, worksheet
        )))
        .and(query_param("valueInputOption", "RAW"))
}

/// Matcher set for the batchUpdate call that creates a missing worksheet
pub fn add_worksheet_mock(spreadsheet_id: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path(format!(
        "/v4/spreadsheets/{}:batchUpdate",
        spreadsheet_id
    )))
}
