//! Blogicum: a blog service where users publish posts filed under
//! categories and locations, comment on each other's posts, and staff
//! moderate what is public.

pub mod api;
pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod forms;
pub mod migration;
pub mod pagination;
pub mod policy;
pub mod queries;
pub mod service;
pub mod state;

pub use api::build_app;
pub use error::{BlogError, Result};
pub use state::AppState;
