pub mod auth;
pub mod cache;
pub mod client;
pub mod handlers;
pub mod server;
pub mod service;

pub use auth::{AdminAuthenticator, StaticTokenAuth};
pub use cache::ReadCache;
pub use client::{ClientId, ClientRegistry};
pub use server::{start, ServerConfig, ServerHandle};
pub use service::NewsService;
