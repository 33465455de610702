//! # Mealie MCP Library
//!
//! This library exposes a Mealie recipe manager through the Model Context
//! Protocol (MCP). It consists of three parts:
//!
//! ## Client Module
//!
//! The [`client`] module provides an HTTP client for the Mealie API. It logs in
//! with a password grant and, when Mealie rejects an expired token, fetches a
//! new one and re-sends the request once.
//!
//! ## Server Module
//!
//! The [`server`] module implements an MCP server with tools for recipes, meal
//! plans and shopping lists, plus `mealie://` resources.
//!
//! ## Resources Module
//!
//! The [`resources`] module maps `mealie://` URIs to Mealie endpoints.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use mcp_mealie::{ClientConfig, MealieClient, MealieMcpServer};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = Arc::new(MealieClient::connect(ClientConfig::from_env()?).await?);
//! let server = MealieMcpServer::new(client.clone());
//! // ... serve `server` over stdio or SSE ...
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod resources;
pub mod server;

pub use client::{ClientConfig, MealieClient, MealieError};
pub use server::MealieMcpServer;
