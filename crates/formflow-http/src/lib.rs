//! # formflow-http
//!
//! HTTP layer for formflow. Provides the request type a form binds against,
//! a multi-value [`QueryDict`] for submitted data, and a named-route
//! [`Router`](urls::Router) that generates form action URLs.

pub mod querydict;
pub mod request;
pub mod urls;

pub use querydict::QueryDict;
pub use request::{HttpRequest, HttpRequestBuilder};
pub use urls::{RouteMatch, RouteParams, Router, UrlGenerator};
