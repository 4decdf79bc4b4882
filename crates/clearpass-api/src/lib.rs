// clearpass-api: Async Rust client for the Aruba ClearPass RESTful API
//
// OAuth2 authentication, generic request dispatch, and operators for
// active sessions, endpoints, and static host lists.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod operators;
pub mod pagination;
pub mod response;
pub mod transport;

pub use auth::{AuthOutcome, AuthRequest, GrantType, TokenState};
pub use client::Client;
pub use config::{ClientConfig, Timeout};
pub use error::Error;
pub use operators::{
    ActiveSessionOperator, EndpointExtras, EndpointOperator, EndpointStatus, EndpointUpdate,
    StaticHostListOperator,
};
pub use pagination::{Item, ListQuery};
pub use response::ApiResponse;

pub use reqwest::{Method, StatusCode};
