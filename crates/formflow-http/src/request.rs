//! HTTP request type.
//!
//! [`HttpRequest`] carries the pieces of an incoming request a form workflow
//! needs: the method, the path, query and form-encoded body parameters, and the
//! route the request was matched to.

use http::{HeaderMap, Method};

use crate::querydict::QueryDict;
use crate::urls::{RouteMatch, RouteParams};

/// The content type whose body is parsed into [`HttpRequest::post`].
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// An incoming HTTP request.
///
/// # Examples
///
/// ```
/// use formflow_http::HttpRequest;
///
/// let request = HttpRequest::builder()
///     .method(http::Method::POST)
///     .path("/articles/new")
///     .route("article_new")
///     .form_body("article[title]=Hello")
///     .build();
///
/// assert_eq!(request.route(), Some("article_new"));
/// assert_eq!(request.post().get("article[title]"), Some("Hello"));
/// ```
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    get: QueryDict,
    post: QueryDict,
    headers: HeaderMap,
    route_match: Option<RouteMatch>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Creates an `HttpRequest` from `http` request parts and the body bytes.
    ///
    /// The route is left unset; call [`set_route_match`](Self::set_route_match)
    /// once the path has been resolved.
    pub fn from_parts(parts: http::request::Parts, body: &[u8]) -> Self {
        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let query_string = parts.uri.query().unwrap_or("").to_string();

        Self {
            get: QueryDict::parse(&query_string),
            post: parse_body(content_type.as_deref(), body),
            method: parts.method,
            path: parts.uri.path().to_string(),
            query_string,
            content_type,
            headers: parts.headers,
            route_match: None,
        }
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string (without the leading `?`).
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the content type of the request body, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the query string parameters.
    pub const fn get(&self) -> &QueryDict {
        &self.get
    }

    /// Returns the form-encoded body parameters.
    pub const fn post(&self) -> &QueryDict {
        &self.post
    }

    /// Returns the request headers.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the name of the route this request was matched to.
    pub fn route(&self) -> Option<&str> {
        self.route_match.as_ref().map(|m| m.name.as_str())
    }

    /// Returns the parameters captured when the route was matched.
    pub fn route_params(&self) -> Option<&RouteParams> {
        self.route_match.as_ref().map(|m| &m.params)
    }

    /// Returns the full route match, if any.
    pub const fn route_match(&self) -> Option<&RouteMatch> {
        self.route_match.as_ref()
    }

    /// Records the route this request was matched to.
    pub fn set_route_match(&mut self, route_match: RouteMatch) {
        self.route_match = Some(route_match);
    }

    /// Returns the data a form should bind against: the body for methods
    /// that carry one, the query string otherwise.
    pub fn submitted_data(&self) -> &QueryDict {
        if self.method == Method::GET || self.method == Method::HEAD {
            &self.get
        } else {
            &self.post
        }
    }
}

fn parse_body(content_type: Option<&str>, body: &[u8]) -> QueryDict {
    if content_type.is_some_and(|ct| ct.starts_with(FORM_URLENCODED)) {
        QueryDict::parse(&String::from_utf8_lossy(body))
    } else {
        QueryDict::new()
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: Method,
    path: String,
    query_string: String,
    content_type: Option<String>,
    headers: HeaderMap,
    body: Vec<u8>,
    route_match: Option<RouteMatch>,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query_string: String::new(),
            content_type: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
            route_match: None,
        }
    }
}

impl HttpRequestBuilder {
    /// Sets the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the request path.
    #[must_use]
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Sets the query string (without leading `?`).
    #[must_use]
    pub fn query_string(mut self, qs: &str) -> Self {
        self.query_string = qs.to_string();
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets a form-encoded body and the matching content type.
    #[must_use]
    pub fn form_body(mut self, body: &str) -> Self {
        self.content_type = Some(FORM_URLENCODED.to_string());
        self.body = body.as_bytes().to_vec();
        self
    }

    /// Sets the matched route name.
    #[must_use]
    pub fn route(mut self, name: &str) -> Self {
        self.route_match
            .get_or_insert_with(|| RouteMatch::new(name))
            .name = name.to_string();
        self
    }

    /// Adds a captured route parameter.
    #[must_use]
    pub fn route_param(mut self, key: &str, value: &str) -> Self {
        self.route_match
            .get_or_insert_with(|| RouteMatch::new(""))
            .params
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Builds the [`HttpRequest`].
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            get: QueryDict::parse(&self.query_string),
            post: parse_body(self.content_type.as_deref(), &self.body),
            method: self.method,
            path: self.path,
            query_string: self.query_string,
            content_type: self.content_type,
            headers: self.headers,
            route_match: self.route_match,
        }
    }
}
