//! List query and page envelope types

use crate::error::{Error, Result};
use crate::sideload::build_sideload_params;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;

/// Page size requested from collection endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Parameters of one fetch-all call.
///
/// Immutable per call; the page number is the only query field that varies
/// between the page requests derived from it.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// HTTP method; POST when the endpoint expects a JSON body
    pub method: Method,
    /// Ordering fields, `-` prefix for descending
    pub ordering: Vec<String>,
    /// Names of related groups to fetch inline and embed
    pub sideloads: Vec<String>,
    /// Schema ids scoping the nested `content` group
    pub content_schema_ids: Vec<String>,
    /// Filter key/value pairs merged verbatim into the query string
    pub filters: HashMap<String, String>,
    /// Explicit JSON body sent with every page request
    pub json: Option<Value>,
    /// Requested page size
    pub page_size: u32,
    /// Stop after this many pages even if more exist
    pub max_pages: Option<u64>,
    /// False for the few collections served without a page envelope
    pub paginated: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            method: Method::GET,
            ordering: Vec::new(),
            sideloads: Vec::new(),
            content_schema_ids: Vec::new(),
            filters: HashMap::new(),
            json: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
            paginated: true,
        }
    }
}

impl ListQuery {
    /// Create a query with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add an ordering field; prefix with `-` for descending
    #[must_use]
    pub fn ordering(mut self, field: impl Into<String>) -> Self {
        self.ordering.push(field.into());
        self
    }

    /// Request a sideload group
    #[must_use]
    pub fn sideload(mut self, name: impl Into<String>) -> Self {
        self.sideloads.push(name.into());
        self
    }

    /// Scope the `content` sideload to a schema id
    #[must_use]
    pub fn content_schema_id(mut self, id: impl Into<String>) -> Self {
        self.content_schema_ids.push(id.into());
        self
    }

    /// Add a filter pair
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Send a JSON body with every page request (switches the method to POST)
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self.method = Method::POST;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Cap the number of fetched pages
    #[must_use]
    pub fn max_pages(mut self, pages: u64) -> Self {
        self.max_pages = Some(pages);
        self
    }

    /// Mark the collection as served without a page envelope
    #[must_use]
    pub fn unpaginated(mut self) -> Self {
        self.paginated = false;
        self
    }

    /// Query parameters shared by every page request of this call
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = build_sideload_params(&self.sideloads, &self.content_schema_ids);
        if self.paginated {
            params.insert("page_size".to_string(), self.page_size.to_string());
        }
        if !self.ordering.is_empty() {
            params.insert("ordering".to_string(), self.ordering.join(","));
        }
        for (key, value) in &self.filters {
            params.insert(key.clone(), value.clone());
        }
        params
    }
}

/// One page of a collection response
#[derive(Debug, Clone)]
pub struct PageEnvelope {
    /// Records in server order
    pub results: Vec<Value>,
    /// Authoritative page count reported by the server, >= 1
    pub total_pages: u64,
}

impl PageEnvelope {
    /// Split a raw page response into records and the page bound.
    ///
    /// A response without `pagination.total_pages` or `results` violates the
    /// API contract.
    pub fn from_value(mut data: Value) -> Result<Self> {
        let total_pages = data
            .get("pagination")
            .and_then(|p| p.get("total_pages"))
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::envelope("missing pagination.total_pages"))?;
        let results = take_results(&mut data)?;
        Ok(Self {
            results,
            total_pages,
        })
    }
}

/// Detach the `results` array from a response body.
pub(crate) fn take_results(data: &mut Value) -> Result<Vec<Value>> {
    match data.get_mut("results").map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(Error::envelope("results is not an array")),
        None => Err(Error::envelope("missing results key")),
    }
}
