//! # Mealie HTTP Client
//!
//! This module provides an HTTP client for the Mealie API that authenticates
//! with a password grant and transparently reauthenticates when a token
//! expires.
//!
//! ## Modules
//!
//! - [`auth`] - Password grant and bearer token state
//! - [`client`] - The authenticating client and its request/response types
//! - [`config`] - Connection settings read from the environment
//! - [`error`] - Error type for every client operation
//! - [`types`] - Request payloads built by this crate
//!
//! ## Quick Start
//!
//! ```no_run
//! use mcp_mealie::client::{ClientConfig, MealieClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = MealieClient::connect(ClientConfig::from_env()?).await?;
//!
//! let recipes: serde_json::Value = client
//!     .get("/api/recipes", Some(&[("perPage", "10")]), None)
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! println!("{}", recipes);
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
#[allow(clippy::module_inception)]
pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{MealieClient, MealieResponse, OutboundRequest};
pub use config::ClientConfig;
pub use error::{MealieError, Result};
