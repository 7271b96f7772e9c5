//! # unisync-shared
//!
//! Types shared by the UniSync client and the development server: the chat
//! domain model, the HTTP wire protocol, and a handful of constants.

pub mod constants;
pub mod error;
pub mod models;
pub mod protocol;
pub mod text;
pub mod types;

pub use error::SharedError;
