//! Repository modules for database access

pub mod refresh_token;
pub mod refresh_token_factory;
pub mod refresh_token_memory;
pub mod refresh_token_sql;

// Re-export the token store types for ease of use
pub use refresh_token::TokenStore;
pub use refresh_token_factory::TokenStoreFactory;
pub use refresh_token_memory::InMemoryTokenStore;
pub use refresh_token_sql::SqlTokenStore;
