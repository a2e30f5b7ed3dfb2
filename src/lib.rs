//! RunFood → Reckonnt Sales Sync Library
//!
//! This library pulls the RunFood payment-method and product-line reports,
//! joins them into one consolidated sale per invoice, and submits the
//! result to the Reckonnt sale API.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `config`: Configuration management.
//! - `consolidation`: Payment/product join engine.
//! - `errors`: Error handling types.
//! - `field_filter`: Report column denylist.
//! - `gateway_client`: Reckonnt API client.
//! - `handlers`: HTTP request handlers.
//! - `models`: Report rows, invoice key and consolidated sale shape.
//! - `sales_sync`: Fetch, join and submit workflow.
//! - `services`: RunFood report client.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod config;
pub mod consolidation;
pub mod errors;
pub mod field_filter;
pub mod gateway_client;
pub mod handlers;
pub mod models;
pub mod sales_sync;
pub mod services;
