//! HTTP API of inkpost.
//!
//! The API is a salvo [`Router`](salvo::Router) over an [`AppState`] holding
//! the store, the notification queue and the mail sender. Write endpoints
//! need an `Authorization: Bearer` token; see [`auth`].
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auth;
pub mod config;
pub mod error;
pub mod routers;
pub mod state;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use routers::{router, service};
pub use state::AppState;
