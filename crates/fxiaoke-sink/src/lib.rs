//! Fxiaoke CRM push client.
//!
//! Two ways of delivering a record are supported, matching the provider's
//! integration surfaces:
//!
//! - [`FxiaokeClient`] - exchange app credentials for a corp access token,
//!   then create one CRM object per record through the open API
//! - [`DirectPusher`] - POST each record to a fixed ingest URL with a
//!   static token in the headers

mod auth;
mod client;
mod error;
mod payload;

pub use client::{DirectPusher, FxiaokeClient};
pub use error::SinkError;
pub use payload::{
    create_object_body, direct_push_body, CreateObjectBody, DirectPushBody, MasterFieldVal,
    CREATE_OBJECT_API_NAME, DIRECT_OBJECT_API_NAME,
};
