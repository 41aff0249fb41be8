/// Application constants

// Invite gate
pub const INVITE_CODE_LENGTH: usize = 6;
pub const SUBMIT_DELAY_MS: u64 = 500; // placeholder for a real code validation call

// Tap ledger
pub const SAVE_DEBOUNCE_MS: u64 = 500;
pub const PLUS_ONE_LIFETIME_MS: u64 = 1000;
pub const PLUS_ONE_X_OFFSET: f64 = 20.0; // px between markers of one multi-touch
pub const MAX_PLUS_ONE_PER_TAP: u32 = 10; // markers drawn per tap event; earnings are not capped
pub const DEFAULT_TAP_BUDGET: u32 = 1000;

// HTTP endpoints (relative to API_BASE_URL)
pub const USER_FETCH_PATH: &str = "/api/user";
pub const USER_UPDATE_PATH: &str = "/api/updateUser";
pub const HTTP_TIMEOUT_SECS: u64 = 10;

// Dev backend seed
pub const DEV_SEED_USER_ID: &str = "1001";
pub const DEV_SEED_EARN_PER_TAP: f64 = 1.0;

// Notices shown on the profile screen
pub const MSG_REFERRAL_COPIED: &str = "Referral link copied to clipboard!";
pub const MSG_REFERRAL_COPY_FAILED: &str = "Failed to copy referral link";
pub const MSG_WALLET_DISCONNECTED: &str = "Wallet disconnected";
pub const MSG_WALLET_DISCONNECT_FAILED: &str = "Failed to disconnect wallet";
pub const MSG_WALLET_CONNECTED: &str = "Wallet connected";
pub const MSG_WALLET_CONNECT_FAILED: &str = "Failed to connect wallet";
