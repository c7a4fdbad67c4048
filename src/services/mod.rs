pub mod auth_service;
pub use auth_service::{AccountInfo, AccountUpdate, AuthError, AuthService};

pub mod auth_service_impl;
pub use auth_service_impl::SeaOrmAuthService;

pub mod chat_service;
pub use chat_service::{ChatError, ChatService};

pub mod chat_service_impl;
pub use chat_service_impl::ProviderChatService;
