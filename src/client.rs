//! High-level API client
//!
//! Composes the request executor and the page fetcher into the generic
//! operations exposed at the API boundary: fetch-one, fetch-all, create,
//! replace, update, delete and export. Resource-specific wrappers are the
//! caller's business; everything here is resource-agnostic.

use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::fetch::{ListQuery, PageFetcher, RecordStream};
use crate::http::{ByteStream, RequestConfig, RequestExecutor};
use crate::sideload::to_singular;
use crate::urls::{build_export_url, build_resource_url, validate_base_url};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Format of an export call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Paginated record stream, same shape as a regular list call
    Json,
    Csv,
    Xml,
    Xlsx,
}

impl ExportFormat {
    /// Value of the `format` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

/// Result of an export call
pub enum Export {
    /// JSON export: records yielded page by page
    Records(RecordStream),
    /// Binary export: raw body chunks, never buffered whole
    Bytes(ByteStream),
}

/// Client for a paginated, token-authenticated REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    executor: RequestExecutor,
    fetcher: PageFetcher,
}

impl ApiClient {
    /// Build a client from the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate_base_url(&config.base_url)?;
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::Http)?;

        let authenticator = Arc::new(Authenticator::new(
            &config.base_url,
            config.credentials.clone(),
            client.clone(),
            config.retry,
        ));
        let executor =
            RequestExecutor::new(client, config.base_url.clone(), authenticator, config.retry);
        let fetcher = PageFetcher::new(executor.clone(), config.max_in_flight_requests);
        Ok(Self { executor, fetcher })
    }

    /// The underlying request executor
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Fetch every record of a resource collection as an ordered stream
    pub async fn fetch_all(&self, resource: &str, query: &ListQuery) -> Result<RecordStream> {
        self.fetcher.fetch_all(resource, query).await
    }

    /// Fetch every record from an arbitrary collection URL
    pub async fn fetch_all_by_url(&self, url: &str, query: &ListQuery) -> Result<RecordStream> {
        self.fetcher.fetch_all(url, query).await
    }

    /// Fetch a single record
    pub async fn fetch_one(&self, resource: &str, id: u64) -> Result<Value> {
        self.executor
            .request_json(
                Method::GET,
                &build_resource_url(resource, id),
                RequestConfig::new(),
            )
            .await
    }

    /// Fetch a single record and splice in the requested relations.
    ///
    /// Single-record endpoints do not sideload server-side, so each relation
    /// costs one extra GET; the fetched object replaces the record's
    /// URL-valued field, the direct-merge rule of list responses.
    pub async fn fetch_one_with_sideloads(
        &self,
        resource: &str,
        id: u64,
        sideloads: &[String],
    ) -> Result<Value> {
        let mut record = self.fetch_one(resource, id).await?;
        for sideload in sideloads {
            let field = to_singular(sideload);
            let reference = record
                .get(&field)
                .ok_or_else(|| Error::envelope(format!("record has no '{field}' field")))?;
            if reference.is_null() {
                continue;
            }
            let url = reference
                .as_str()
                .ok_or_else(|| {
                    Error::envelope(format!("record field '{field}' is not a URL string"))
                })?
                .to_string();
            let related = self
                .executor
                .request_json(Method::GET, &url, RequestConfig::new())
                .await?;
            record[&field] = related;
        }
        Ok(record)
    }

    /// Create a new record
    pub async fn create(&self, resource: &str, data: Value) -> Result<Value> {
        self.executor
            .request_json(Method::POST, resource, RequestConfig::new().json(data))
            .await
    }

    /// Replace an entire existing record
    pub async fn replace(&self, resource: &str, id: u64, data: Value) -> Result<Value> {
        self.executor
            .request_json(
                Method::PUT,
                &build_resource_url(resource, id),
                RequestConfig::new().json(data),
            )
            .await
    }

    /// Modify particular fields of an existing record
    pub async fn update(&self, resource: &str, id: u64, data: Value) -> Result<Value> {
        self.executor
            .request_json(
                Method::PATCH,
                &build_resource_url(resource, id),
                RequestConfig::new().json(data),
            )
            .await
    }

    /// Delete a record
    pub async fn delete(&self, resource: &str, id: u64) -> Result<()> {
        self.executor
            .request(
                Method::DELETE,
                &build_resource_url(resource, id),
                RequestConfig::new(),
            )
            .await?;
        Ok(())
    }

    /// Export a record's data in the given format.
    ///
    /// JSON exports are paginated like a regular list call and reuse the page
    /// fetcher; other formats stream raw bytes. The `to_status` filter is
    /// only valid in POST requests, so its presence switches the method.
    pub async fn export(
        &self,
        resource: &str,
        id: u64,
        format: ExportFormat,
        columns: &[String],
        filters: HashMap<String, String>,
    ) -> Result<Export> {
        let url = build_export_url(resource, id);
        let method = if filters.contains_key("to_status") {
            Method::POST
        } else {
            Method::GET
        };

        match format {
            ExportFormat::Json => {
                let mut query = ListQuery::new().method(method);
                query.filters = filters;
                query
                    .filters
                    .insert("format".to_string(), format.as_str().to_string());
                if !columns.is_empty() {
                    query
                        .filters
                        .insert("columns".to_string(), columns.join(","));
                }
                Ok(Export::Records(self.fetcher.fetch_all(&url, &query).await?))
            }
            _ => {
                let mut config = RequestConfig::new().query("format", format.as_str());
                for (key, value) in filters {
                    config = config.query(key, value);
                }
                if !columns.is_empty() {
                    config = config.query("columns", columns.join(","));
                }
                Ok(Export::Bytes(self.executor.stream(method, &url, config).await?))
            }
        }
    }

    /// Return the current bearer token, authenticating if needed.
    ///
    /// With `refresh` set, a fresh login call is always performed.
    pub async fn get_token(&self, refresh: bool) -> Result<String> {
        let authenticator = self.executor.authenticator();
        let token = if refresh {
            authenticator.force_refresh().await?
        } else {
            authenticator.ensure_token().await?
        };
        Ok(token.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::retry::RetryPolicy;
    use futures::TryStreamExt;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ApiClient {
        let config = ClientConfig::new(server.uri(), Credentials::Token("tok".to_string()))
            .retry(RetryPolicy::new(3, Duration::from_millis(10), Duration::ZERO));
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn test_malformed_base_url_is_rejected() {
        let config = ClientConfig::new("not a url", Credentials::Token("tok".to_string()));
        let err = ApiClient::new(config).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_one() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/invoices/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42, "status": "exported"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let record = client.fetch_one("invoices", 42).await.unwrap();
        assert_eq!(record["status"], "exported");
    }

    #[tokio::test]
    async fn test_fetch_one_with_sideloads_splices_relations() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/invoices/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "document": format!("{}/documents/7", server.uri()),
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/documents/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "file_name": "invoice.pdf"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let record = client
            .fetch_one_with_sideloads("invoices", 42, &["documents".to_string()])
            .await
            .unwrap();
        assert_eq!(record["document"]["file_name"], "invoice.pdf");
    }

    #[tokio::test]
    async fn test_create_replace_update_delete() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/invoices"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/invoices/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "v": 2})))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/invoices/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "v": 3})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/invoices/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let created = client.create("invoices", json!({"name": "x"})).await.unwrap();
        assert_eq!(created["id"], 1);
        let replaced = client.replace("invoices", 1, json!({"v": 2})).await.unwrap();
        assert_eq!(replaced["v"], 2);
        let updated = client.update("invoices", 1, json!({"v": 3})).await.unwrap();
        assert_eq!(updated["v"], 3);
        client.delete("invoices", 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_export_csv_streams_bytes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/invoices/42/export"))
            .and(query_param("format", "csv"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"id,status\n42,exported\n".to_vec()))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let export = client
            .export("invoices", 42, ExportFormat::Csv, &[], HashMap::new())
            .await
            .unwrap();

        let Export::Bytes(stream) = export else {
            panic!("expected a byte stream");
        };
        let chunks: Vec<_> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"id,status\n42,exported\n");
    }

    #[tokio::test]
    async fn test_export_json_is_paginated() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/invoices/42/export"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": 1}, {"id": 2}],
                "pagination": {"total_pages": 1},
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let export = client
            .export("invoices", 42, ExportFormat::Json, &[], HashMap::new())
            .await
            .unwrap();

        let Export::Records(stream) = export else {
            panic!("expected a record stream");
        };
        let records: Vec<_> = stream.try_collect().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_export_with_to_status_uses_post() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/invoices/42/export"))
            .and(query_param("to_status", "confirmed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [],
                "pagination": {"total_pages": 1},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let mut filters = HashMap::new();
        filters.insert("to_status".to_string(), "confirmed".to_string());
        let export = client
            .export("invoices", 42, ExportFormat::Json, &[], filters)
            .await
            .unwrap();
        let Export::Records(stream) = export else {
            panic!("expected a record stream");
        };
        let records: Vec<_> = stream.try_collect().await.unwrap();
        assert!(records.is_empty());
    }
}
