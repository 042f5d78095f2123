//! Client for the Hack or Snooze story service.
//!
//! Wraps the hosted HTTP/JSON API behind three models: the global
//! [`StoryList`], individual [`Story`] records, and the signed-in
//! [`User`]. Sessions persist through a pluggable [`SessionStore`].

pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod stories;
pub mod users;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use session::{Credentials, FileStore, MemoryStore, SessionStore};
pub use stories::{NewStory, Story, StoryList};
pub use users::User;
