// Client-side screen logic
pub mod invite_code;
pub mod invite_gate;
pub mod navigation;
pub mod notifier;
pub mod plus_one;
pub mod profile_screen;
pub mod profile_store;
pub mod tap_ledger;
pub mod user_fetcher;

// Re-export for convenience
pub use invite_gate::InviteGate;
pub use navigation::{Navigator, Screen};
pub use profile_screen::ProfileScreen;
pub use profile_store::ProfileStore;
pub use tap_ledger::TapLedger;
pub use user_fetcher::UserDataFetcher;
