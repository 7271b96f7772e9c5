//! # unisync-server
//!
//! Development backend for the UniSync chat client. Serves the chat REST
//! API from an in-memory store and answers every question with a canned
//! assistant reply carrying sample Canvas and Calendar findings.

pub mod api;
pub mod config;
pub mod error;
pub mod mock;
pub mod store;
