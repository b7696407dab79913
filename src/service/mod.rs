//! Request-independent operations. Handlers stay thin and call into these.

pub mod accounts;
pub mod comments;
pub mod moderation;
pub mod posts;
pub mod profiles;
