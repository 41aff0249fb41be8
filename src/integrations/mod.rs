pub mod api_client;
pub mod clipboard;
pub mod telegram;
pub mod wallet;
