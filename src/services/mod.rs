//! Vendor service adapters
//!
//! Narrow clients over the hosted services the application delegates to:
//! the Redis key-value store, the sliding-window rate limiter built on
//! it, the search index, the video platform, and the email delivery API.
//! Each adapter owns its error type; nothing here contains business
//! logic beyond request shaping and error mapping.

pub mod email;
pub mod rate_limiter;
pub mod redis;
pub mod search;
pub mod video;
