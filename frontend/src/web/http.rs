//! HTTP 请求封装模块
//!
//! `HttpClient` 抽象了传输层：浏览器中使用 `web_sys::fetch` 实现的
//! `FetchHttpClient`，测试中使用记录请求的 `MockHttpClient`。

use std::collections::HashMap;

use maisha_shared::HttpMethod;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

#[cfg(test)]
use std::cell::RefCell;

/// HTTP 错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// 请求构建失败
    #[error("Failed to build request: {0}")]
    RequestBuildFailed(String),
    /// 网络请求失败
    #[error("Network error: {0}")]
    NetworkError(String),
    /// 响应读取失败
    #[error("Failed to read response: {0}")]
    ResponseParseFailed(String),
}

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// 同名请求头会被替换
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 实现层: 浏览器 fetch
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

impl FetchHttpClient {
    async fn read_text(response: &Response) -> Result<String, HttpError> {
        let promise = response
            .text()
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| HttpError::ResponseParseFailed(format!("{:?}", e)))?;

        text.as_string()
            .ok_or_else(|| HttpError::ResponseParseFailed("body is not a string".to_string()))
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let headers = Headers::new()
            .map_err(|e| HttpError::RequestBuildFailed(format!("Headers: {:?}", e)))?;

        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| HttpError::RequestBuildFailed(format!("Header {}: {:?}", key, e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| HttpError::RequestBuildFailed(format!("{:?}", e)))?;

        let window = web_sys::window()
            .ok_or_else(|| HttpError::NetworkError("window is unavailable".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| HttpError::NetworkError(format!("{:?}", e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| HttpError::ResponseParseFailed(format!("Response cast: {:?}", e)))?;

        let status = response.status();
        // 204 没有响应体
        let body = if status == 204 {
            String::new()
        } else {
            Self::read_text(&response).await?
        };

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub struct MockHttpClient {
    // (URL, (Status, Response Body))
    responses: RefCell<HashMap<String, (u16, String)>>,
    // 模拟网络故障的 URL
    failures: RefCell<Vec<String>>,
    // 记录发出的请求 (URL, Method, Headers, Body)
    pub requests: RefCell<Vec<(String, String, HashMap<String, String>, Option<String>)>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            failures: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
        self.mock_raw(url, status, &body.to_string());
    }

    pub fn mock_raw(&self, url: &str, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), (status, body.to_string()));
    }

    pub fn mock_network_failure(&self, url: &str) {
        self.failures.borrow_mut().push(url.to_string());
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    /// 最近一次请求的请求头
    pub fn last_headers(&self) -> HashMap<String, String> {
        self.requests
            .borrow()
            .last()
            .map(|(_, _, headers, _)| headers.clone())
            .unwrap_or_default()
    }

    /// 最近一次请求的 JSON 请求体
    pub fn last_body(&self) -> Option<serde_json::Value> {
        self.requests
            .borrow()
            .last()
            .and_then(|(_, _, _, body)| body.as_deref().map(serde_json::from_str))
            .and_then(Result::ok)
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.borrow_mut().push((
            req.url.clone(),
            req.method.to_string(),
            req.headers.clone(),
            req.body.clone(),
        ));

        if self.failures.borrow().contains(&req.url) {
            return Err(HttpError::NetworkError("connection refused".to_string()));
        }

        let responses = self.responses.borrow();
        if let Some((status, body)) = responses.get(&req.url) {
            Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            })
        } else {
            Ok(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            })
        }
    }
}
