//! Domain models for the fan-out ingestion pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method an endpoint template may carry.
///
/// Only GET and POST are accepted at ingestion time; the dispatcher
/// performing the eventual delivery supports no other verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET delivery.
    Get,
    /// HTTP POST delivery.
    Post,
}

impl HttpMethod {
    /// Parses a method string case-insensitively.
    ///
    /// Returns `None` for any verb other than GET or POST.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// A validated endpoint template: method plus absolute URL.
///
/// The URL is kept verbatim as received; `{placeholder}` tokens inside it
/// are opaque to this system and resolved only by the dispatcher.
/// Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTemplate {
    /// Delivery method, GET or POST.
    pub method: HttpMethod,
    /// Absolute target URL, placeholders unresolved.
    pub url: String,
}

/// One opaque data record supplied by the caller.
///
/// No schema is enforced beyond "is a JSON object"; key order is
/// preserved by `serde_json`'s map type.
pub type DataRecord = serde_json::Map<String, serde_json::Value>;

/// A validated ingestion request: one endpoint template and the ordered
/// data records to fan out against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    /// The shared endpoint template.
    pub endpoint: EndpointTemplate,
    /// Non-empty ordered sequence of opaque records.
    pub data: Vec<DataRecord>,
}

impl IngestRequest {
    /// Fans the request out into one [`PostbackUnit`] per data record.
    ///
    /// The iterator is lazy, finite, and restartable; units are yielded
    /// in input order, each borrowing the same validated template.
    pub fn fan_out(&self) -> impl Iterator<Item = PostbackUnit<'_>> + '_ {
        self.data.iter().map(|record| PostbackUnit { endpoint: &self.endpoint, data: record })
    }
}

/// The durable artifact: one endpoint template paired with one record.
///
/// Serializes with the endpoint fields flattened at the top level and the
/// record nested under `data`, the shape the dispatcher consumes:
/// `{"method":"GET","url":"…","data":{…}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostbackUnit<'a> {
    /// The shared endpoint template, never copied mutably.
    #[serde(flatten)]
    pub endpoint: &'a EndpointTemplate,
    /// The record this unit carries.
    pub data: &'a DataRecord,
}
