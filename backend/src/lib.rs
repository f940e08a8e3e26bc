//! # Lineup Analytics Backend
//!
//! Admin analytics over a document store of users, workspaces and lineups
//! (videos).
//!
//! ## Features
//!
//! - **Event extraction**: Walk user -> workspace -> lineup references and
//!   recover each video's creation time from loosely typed records
//! - **Bucketing**: Hourly counts regrouped into daily, weekly or monthly trends
//! - **Reports**: Per-user video trends and cross-workspace usage statistics
//! - **Admin auth**: PBKDF2 passwords, HS256 bearer tokens, super-admin gate
//! - **HTTP API**: REST endpoints served with Axum
//!
//! ## Architecture
//!
//! - [`models`]: Stored document shapes and timestamp normalization
//! - [`db`]: Repository traits with local (JSON snapshot) and MongoDB backends
//! - [`services`]: Report computation on top of the repository traits
//! - [`auth`]: Password hashing, tokens and admin checks
//! - [`config`]: TOML file plus environment overrides
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
