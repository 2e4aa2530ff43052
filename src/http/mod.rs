//! HTTP value types used by the middleware pipeline
//!
//! Thin wrappers over the `axum::http` primitives: an immutable request
//! view, a buildable response value with a pass-through sentinel, and the
//! pure mutator helpers that extend a response without touching the
//! original.

pub mod mutators;
pub mod request;
pub mod response;

pub use mutators::{error_response, with_cookies, with_headers, Cookie, CookieOptions, SameSite};
pub use request::AppRequest;
pub use response::{AppResponse, ResponseBody};
