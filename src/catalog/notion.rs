//! Notion catalog adapter implementation.

use std::time::Duration;

use log::{debug, warn};
use serde_json::{json, Value};

use crate::catalog::{CatalogAdapter, CatalogRecord, RecordUpdate};
use crate::config::Config;

const NOTION_API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion adapter backed by `ureq`.
pub struct NotionCatalogAdapter {
    http_client: ureq::Agent,
    auth_token: String,
    database_id: String,
}

/// One page of a cursor-paginated catalog query.
struct QueryPage {
    records: Vec<CatalogRecord>,
    has_more: bool,
    next_cursor: Option<String>,
}

impl NotionCatalogAdapter {
    /// Creates a new adapter bound to the configured database.
    pub fn new(config: &Config) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(15))
            .timeout_write(Duration::from_secs(15))
            .build();
        Self {
            http_client,
            auth_token: config.notion_token.clone(),
            database_id: config.notion_database_id.clone(),
        }
    }

    fn query_page(&self, start_cursor: Option<&str>) -> Result<QueryPage, String> {
        let url = format!("{NOTION_API_BASE}/databases/{}/query", self.database_id);
        let body = match start_cursor {
            Some(cursor) => json!({ "start_cursor": cursor }),
            None => json!({}),
        };
        let response = self
            .http_client
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.auth_token))
            .set("Notion-Version", NOTION_VERSION)
            .send_json(body)
            .map_err(|err| format!("Catalog query failed: {err}"))?;
        let parsed: Value = response
            .into_json()
            .map_err(|err| format!("Catalog query response parse failed: {err}"))?;
        Ok(parse_query_page(&parsed))
    }
}

impl CatalogAdapter for NotionCatalogAdapter {
    fn fetch_all_records(&self) -> Result<Vec<CatalogRecord>, String> {
        drain_query_pages(|cursor| self.query_page(cursor))
    }

    fn update_record(&self, record_id: &str, update: &RecordUpdate) -> Result<(), String> {
        let properties = build_update_properties(update);
        if properties
            .as_object()
            .map(|map| map.is_empty())
            .unwrap_or(true)
        {
            debug!("No properties to update for record {record_id}");
            return Ok(());
        }
        let url = format!("{NOTION_API_BASE}/pages/{record_id}");
        self.http_client
            .request("PATCH", &url)
            .set("Authorization", &format!("Bearer {}", self.auth_token))
            .set("Notion-Version", NOTION_VERSION)
            .send_json(json!({ "properties": properties }))
            .map_err(|err| format!("Catalog update failed for record {record_id}: {err}"))?;
        Ok(())
    }
}

/// Follows cursor pagination until the provider reports no more pages,
/// accumulating every record in traversal order.
fn drain_query_pages<F>(mut fetch_page: F) -> Result<Vec<CatalogRecord>, String>
where
    F: FnMut(Option<&str>) -> Result<QueryPage, String>,
{
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = fetch_page(cursor.as_deref())?;
        records.extend(page.records);
        if !page.has_more {
            break;
        }
        cursor = page.next_cursor;
        // has_more with no cursor would refetch page one forever.
        if cursor.is_none() {
            break;
        }
    }
    Ok(records)
}

fn parse_query_page(value: &Value) -> QueryPage {
    let records = value["results"]
        .as_array()
        .map(|items| items.iter().filter_map(parse_record).collect())
        .unwrap_or_default();
    QueryPage {
        records,
        has_more: value["has_more"].as_bool().unwrap_or(false),
        next_cursor: value["next_cursor"].as_str().map(str::to_string),
    }
}

fn parse_record(page: &Value) -> Option<CatalogRecord> {
    let id = page["id"].as_str()?.to_string();
    let properties = &page["properties"];
    Some(CatalogRecord {
        id,
        artist: first_plain_text(&properties["Artist"]["rich_text"]),
        album: first_plain_text(&properties["Album"]["title"]),
        artwork_file_count: properties["Album Art"]["files"]
            .as_array()
            .map(Vec::len)
            .unwrap_or(0),
        release_year: properties["Release Year"]["number"].as_i64(),
    })
}

fn first_plain_text(entries: &Value) -> Option<String> {
    let text = entries.as_array()?.first()?["plain_text"].as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

/// Builds the partial-properties payload for one record update.
///
/// A release year that does not parse as an integer is logged and omitted;
/// it never fails the update.
fn build_update_properties(update: &RecordUpdate) -> Value {
    let mut properties = serde_json::Map::new();

    if let Some(hosted_url) = &update.hosted_artwork_url {
        properties.insert(
            "Album Art".to_string(),
            json!({
                "files": [{
                    "name": format!("{} - {} Cover", update.artist, update.album),
                    "type": "external",
                    "external": { "url": hosted_url },
                }]
            }),
        );
    }

    if let Some(year) = &update.release_year {
        match year.trim().parse::<i64>() {
            Ok(parsed) => {
                properties.insert("Release Year".to_string(), json!({ "number": parsed }));
            }
            Err(_) => warn!(
                "Ignoring non-numeric release year '{year}' for {} - {}",
                update.artist, update.album
            ),
        }
    }

    Value::Object(properties)
}
