//! Core types and services for the helpdesk ticketing system.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::HelpdeskStore`]; the HTTP layer drives the
//! [`Helpdesk`] service and the [`session::TokenIssuer`].

pub mod comment;
pub mod credentials;
pub mod desk;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod session;
pub mod store;
pub mod ticket;
pub mod user;

pub use desk::Helpdesk;
pub use error::{Error, Result};
