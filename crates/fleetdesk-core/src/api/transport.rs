//! The outbound seam between resource clients and the network.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            ..Self::get(path)
        }
    }

    pub fn post<B: Serialize + ?Sized>(
        path: impl Into<String>,
        body: &B,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::Post,
            body: Some(encode(body)?),
            ..Self::get(path)
        })
    }

    pub fn put<B: Serialize + ?Sized>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::Put,
            body: Some(encode(body)?),
            ..Self::get(path)
        })
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }
}

/// A file attached to an upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A `multipart/form-data` POST relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpUpload {
    pub path: String,
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

impl HttpUpload {
    pub fn new(path: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            fields,
            file: None,
        }
    }

    pub fn with_file(mut self, file: FilePart) -> Self {
        self.file = Some(file);
        self
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Performs one HTTP exchange and returns the decoded JSON body.
///
/// Implementations own base-URL resolution and authentication. Callers only
/// distinguish success from failure.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, request: HttpRequest) -> Result<Value, ApiError>;

    /// Send form fields and an optional file as `multipart/form-data`.
    async fn upload(&self, upload: HttpUpload) -> Result<Value, ApiError>;
}

/// Decode a JSON body into a typed response.
pub fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
