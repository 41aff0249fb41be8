use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::{
    config::Config,
    error::{AppError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletProvider {
    Solana,
    Ton,
    Dynamic,
}

impl WalletProvider {
    /// Parses `WALLET_PROVIDER`; `Some(None)` means wallets are switched off.
    pub fn parse(raw: &str) -> Option<Option<Self>> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Some(None),
            "solana" | "phantom" => Some(Some(WalletProvider::Solana)),
            "ton" | "tonconnect" => Some(Some(WalletProvider::Ton)),
            "dynamic" => Some(Some(WalletProvider::Dynamic)),
            _ => None,
        }
    }
}

impl fmt::Display for WalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletProvider::Solana => "solana",
            WalletProvider::Ton => "ton",
            WalletProvider::Dynamic => "dynamic",
        };
        f.write_str(name)
    }
}

/// The one wallet capability the profile screen needs.
#[async_trait::async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self) -> Result<String>;

    async fn disconnect(&self) -> Result<()>;

    fn is_connected(&self) -> bool;

    fn address(&self) -> Option<String>;
}

/// Wallet bound to an address supplied through configuration.
pub struct ConfiguredWallet {
    provider: WalletProvider,
    address: Option<String>,
    connected: Mutex<bool>,
}

impl ConfiguredWallet {
    pub fn new(provider: WalletProvider, address: Option<String>) -> Self {
        Self {
            provider,
            address,
            connected: Mutex::new(false),
        }
    }

    fn set_connected(&self, value: bool) {
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

#[async_trait::async_trait]
impl WalletConnector for ConfiguredWallet {
    async fn connect(&self) -> Result<String> {
        let address = self
            .address
            .clone()
            .ok_or_else(|| AppError::Wallet(format!("no {} address configured", self.provider)))?;
        self.set_connected(true);
        tracing::info!("Connected {} wallet {}", self.provider, short_address(&address));
        Ok(address)
    }

    async fn disconnect(&self) -> Result<()> {
        self.set_connected(false);
        tracing::info!("Disconnected {} wallet", self.provider);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn address(&self) -> Option<String> {
        if self.is_connected() {
            self.address.clone()
        } else {
            None
        }
    }
}

/// Used when no wallet provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledWallet;

#[async_trait::async_trait]
impl WalletConnector for DisabledWallet {
    async fn connect(&self) -> Result<String> {
        Err(AppError::Wallet("wallet support is disabled".to_string()))
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn address(&self) -> Option<String> {
        None
    }
}

pub fn wallet_from_config(config: &Config) -> Box<dyn WalletConnector> {
    match WalletProvider::parse(&config.wallet_provider).flatten() {
        Some(provider) => Box::new(ConfiguredWallet::new(provider, config.wallet_address.clone())),
        None => Box::new(DisabledWallet),
    }
}

/// `abcd...wxyz` form used on the wallet button.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 8 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
