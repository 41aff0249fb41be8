use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{
    constants::{
        MSG_REFERRAL_COPIED, MSG_REFERRAL_COPY_FAILED, MSG_WALLET_CONNECTED,
        MSG_WALLET_CONNECT_FAILED, MSG_WALLET_DISCONNECTED, MSG_WALLET_DISCONNECT_FAILED,
    },
    integrations::{
        clipboard::{Clipboard, FallbackClipboard},
        wallet::{short_address, WalletConnector},
    },
};

use super::notifier::{Notice, NoticeLevel, Notifier};
use super::profile_store::ProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    CopiedWithFallback,
    Failed,
    /// No link to copy, or a copy is already running.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletAction {
    Connected,
    Disconnected,
    Failed,
}

pub struct ProfileScreen {
    store: ProfileStore,
    clipboard: Box<dyn Clipboard>,
    fallback: Box<dyn FallbackClipboard>,
    wallet: Box<dyn WalletConnector>,
    notifier: Arc<dyn Notifier>,
    copying: AtomicBool,
}

impl ProfileScreen {
    pub fn new(
        store: ProfileStore,
        clipboard: Box<dyn Clipboard>,
        fallback: Box<dyn FallbackClipboard>,
        wallet: Box<dyn WalletConnector>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            clipboard,
            fallback,
            wallet,
            notifier,
            copying: AtomicBool::new(false),
        }
    }

    pub fn invitation_earnings(&self) -> f64 {
        self.store.get().map(|p| p.total_earned).unwrap_or(0.0)
    }

    #[cfg(test)]
    pub fn is_copying(&self) -> bool {
        self.copying.load(Ordering::SeqCst)
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notifier.notify(Notice::new(level, message));
    }

    pub async fn copy_referral_link(&self) -> CopyOutcome {
        let Some(link) = self.store.get().and_then(|p| p.referal_link) else {
            return CopyOutcome::Skipped;
        };
        if self.copying.swap(true, Ordering::SeqCst) {
            return CopyOutcome::Skipped;
        }

        let outcome = match self.clipboard.write_text(&link).await {
            Ok(()) => CopyOutcome::Copied,
            Err(e) => {
                tracing::warn!("Failed to copy: {}", e);
                match self.fallback.copy_text(&link) {
                    Ok(()) => CopyOutcome::CopiedWithFallback,
                    Err(e) => {
                        tracing::error!("Fallback copy failed: {}", e);
                        CopyOutcome::Failed
                    }
                }
            }
        };

        match outcome {
            CopyOutcome::Failed => self.notify(NoticeLevel::Error, MSG_REFERRAL_COPY_FAILED),
            _ => self.notify(NoticeLevel::Success, MSG_REFERRAL_COPIED),
        }
        self.copying.store(false, Ordering::SeqCst);
        outcome
    }

    pub fn wallet_label(&self) -> String {
        match self.wallet.address() {
            Some(address) if self.wallet.is_connected() => {
                format!("{} Disconnect", short_address(&address))
            }
            _ => "Connect wallet".to_string(),
        }
    }

    pub async fn wallet_click(&self) -> WalletAction {
        if self.wallet.is_connected() {
            match self.wallet.disconnect().await {
                Ok(()) => {
                    self.notify(NoticeLevel::Info, MSG_WALLET_DISCONNECTED);
                    WalletAction::Disconnected
                }
                Err(e) => {
                    tracing::error!("Wallet connection error: {}", e);
                    self.notify(NoticeLevel::Error, MSG_WALLET_DISCONNECT_FAILED);
                    WalletAction::Failed
                }
            }
        } else {
            match self.wallet.connect().await {
                Ok(_) => {
                    self.notify(NoticeLevel::Success, MSG_WALLET_CONNECTED);
                    WalletAction::Connected
                }
                Err(e) => {
                    tracing::error!("Wallet connection error: {}", e);
                    self.notify(NoticeLevel::Error, MSG_WALLET_CONNECT_FAILED);
                    WalletAction::Failed
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::integrations::wallet::{ConfiguredWallet, DisabledWallet, WalletProvider};
    use crate::services::notifier::testing::RecordingNotifier;
    use crate::services::profile_store::sample_profile;
    use std::sync::atomic::AtomicUsize;

    struct StubClipboard {
        works: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Clipboard for StubClipboard {
        async fn write_text(&self, _text: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.works {
                Ok(())
            } else {
                Err(AppError::Clipboard("denied".to_string()))
            }
        }
    }

    impl FallbackClipboard for StubClipboard {
        fn copy_text(&self, _text: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.works {
                Ok(())
            } else {
                Err(AppError::Clipboard("execCommand failed".to_string()))
            }
        }
    }

    struct Harness {
        screen: ProfileScreen,
        notifier: Arc<RecordingNotifier>,
        primary_calls: Arc<AtomicUsize>,
        fallback_calls: Arc<AtomicUsize>,
    }

    fn harness(
        primary_works: bool,
        fallback_works: bool,
        wallet: Box<dyn WalletConnector>,
    ) -> Harness {
        let store = ProfileStore::new();
        store.load(sample_profile(30.0, 1.0), 10);
        let notifier = Arc::new(RecordingNotifier::default());
        let primary_calls = Arc::new(AtomicUsize::new(0));
        let fallback_calls = Arc::new(AtomicUsize::new(0));
        let screen = ProfileScreen::new(
            store,
            Box::new(StubClipboard {
                works: primary_works,
                calls: primary_calls.clone(),
            }),
            Box::new(StubClipboard {
                works: fallback_works,
                calls: fallback_calls.clone(),
            }),
            wallet,
            notifier.clone(),
        );
        Harness {
            screen,
            notifier,
            primary_calls,
            fallback_calls,
        }
    }

    #[tokio::test]
    async fn copy_uses_primary_clipboard() {
        let h = harness(true, true, Box::new(DisabledWallet));
        assert_eq!(h.screen.copy_referral_link().await, CopyOutcome::Copied);
        assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.notifier.notices(),
            vec![Notice::new(NoticeLevel::Success, MSG_REFERRAL_COPIED)]
        );
        assert!(!h.screen.is_copying());
    }

    #[tokio::test]
    async fn copy_falls_back_when_primary_fails() {
        let h = harness(false, true, Box::new(DisabledWallet));
        assert_eq!(
            h.screen.copy_referral_link().await,
            CopyOutcome::CopiedWithFallback
        );
        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.fallback_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.notifier.notices()[0].level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn copy_reports_failure_when_both_paths_fail() {
        let h = harness(false, false, Box::new(DisabledWallet));
        assert_eq!(h.screen.copy_referral_link().await, CopyOutcome::Failed);
        assert_eq!(
            h.notifier.notices(),
            vec![Notice::new(NoticeLevel::Error, MSG_REFERRAL_COPY_FAILED)]
        );
        assert!(!h.screen.is_copying());
    }

    #[tokio::test]
    async fn copy_without_link_is_skipped() {
        let h = harness(true, true, Box::new(DisabledWallet));
        h.screen.store.clear();
        assert_eq!(h.screen.copy_referral_link().await, CopyOutcome::Skipped);
        assert_eq!(h.primary_calls.load(Ordering::SeqCst), 0);
        assert!(h.notifier.notices().is_empty());
    }

    #[test]
    fn invitation_earnings_default_to_zero() {
        let h = harness(true, true, Box::new(DisabledWallet));
        assert_eq!(h.screen.invitation_earnings(), 30.0);
        h.screen.store.clear();
        assert_eq!(h.screen.invitation_earnings(), 0.0);
    }

    #[tokio::test]
    async fn wallet_button_toggles_connection() {
        let wallet = ConfiguredWallet::new(
            WalletProvider::Solana,
            Some("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU".to_string()),
        );
        let h = harness(true, true, Box::new(wallet));
        assert_eq!(h.screen.wallet_label(), "Connect wallet");

        assert_eq!(h.screen.wallet_click().await, WalletAction::Connected);
        assert_eq!(h.screen.wallet_label(), "7xKX...gAsU Disconnect");

        assert_eq!(h.screen.wallet_click().await, WalletAction::Disconnected);
        assert_eq!(h.screen.wallet_label(), "Connect wallet");
        assert_eq!(
            h.notifier.notices().last(),
            Some(&Notice::new(NoticeLevel::Info, MSG_WALLET_DISCONNECTED))
        );
    }

    #[tokio::test]
    async fn disabled_wallet_reports_failure() {
        let h = harness(true, true, Box::new(DisabledWallet));
        assert_eq!(h.screen.wallet_click().await, WalletAction::Failed);
        assert_eq!(h.notifier.notices()[0].level, NoticeLevel::Error);
    }
}
