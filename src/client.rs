// Terminal driver for the mini-app screens.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{timeout, Duration};

use crate::{
    config::Config,
    integrations::{
        api_client::{HttpUserApi, UserApi},
        clipboard::{clipboard_from_config, Osc52Clipboard},
        telegram::{HostShell, ShellBootstrap, TelegramShell},
        wallet::wallet_from_config,
    },
    services::{
        invite_code::Key,
        notifier::ConsoleNotifier,
        plus_one::TapPosition,
        InviteGate, Navigator, ProfileScreen, ProfileStore, Screen, TapLedger, UserDataFetcher,
    },
};

const TEARDOWN_GRACE_SECS: u64 = 3;

pub struct ClientApp {
    config: Config,
    api: Arc<dyn UserApi>,
    store: ProfileStore,
    navigator: Navigator,
    gate: InviteGate,
    profile: ProfileScreen,
    ledger: Option<TapLedger>,
}

impl ClientApp {
    pub fn new(config: Config, api: Arc<dyn UserApi>) -> Self {
        let store = ProfileStore::new();
        let navigator = Navigator::new(Screen::Gate);
        let gate = InviteGate::new(
            navigator.clone(),
            Duration::from_millis(config.submit_delay_ms),
        );
        let profile = ProfileScreen::new(
            store.clone(),
            clipboard_from_config(&config),
            Box::new(Osc52Clipboard::stdout()),
            wallet_from_config(&config),
            Arc::new(ConsoleNotifier),
        );

        Self {
            config,
            api,
            store,
            navigator,
            gate,
            profile,
            ledger: None,
        }
    }

    pub async fn enter(&mut self, user_id: Option<&str>) {
        let fetcher = UserDataFetcher::new(
            Arc::clone(&self.api),
            self.store.clone(),
            self.navigator.clone(),
            self.config.default_tap_budget,
        );
        fetcher.enter(user_id).await;
        self.sync_screen();
    }

    /// Mounts or unmounts the tap surface to match the current screen.
    fn sync_screen(&mut self) {
        match (self.navigator.current(), self.ledger.is_some()) {
            (Screen::Play, false) => {
                self.ledger = Some(TapLedger::new(
                    self.store.clone(),
                    Arc::clone(&self.api),
                    &self.config,
                ));
            }
            (screen, true) if screen != Screen::Play => {
                // dropping the ledger runs its teardown flush
                self.ledger = None;
            }
            _ => {}
        }
    }

    fn prompt(&self) {
        let screen = self.navigator.current();
        match screen {
            Screen::Gate => {
                let slots: String = self
                    .gate
                    .code_input()
                    .slots()
                    .iter()
                    .map(|slot| slot.unwrap_or('_'))
                    .collect();
                println!(
                    "[gate] code: {} cursor={} ready={} loading={}",
                    slots,
                    self.gate.code_input().cursor(),
                    self.gate.can_submit(),
                    self.gate.is_loading()
                );
            }
            _ => println!("[{}] {}", screen, self.status_line()),
        }
    }

    fn status_line(&self) -> String {
        let Some(profile) = self.store.get() else {
            return "no user loaded".to_string();
        };
        let mut line = format!(
            "balance={} total={} mount={}",
            profile.balance,
            profile.total_earned,
            self.store.mount()
        );
        if let Some(ledger) = &self.ledger {
            line.push_str(&format!(
                " session={} unsaved={} saved={} pending_save={} +1s={}",
                ledger.earnings(),
                ledger.unflushed(),
                ledger.confirmed(),
                ledger.pending_save(),
                ledger.effects().active().len()
            ));
        }
        line
    }

    /// Returns `false` when the user asked to quit.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        if matches!(line, "quit" | ":quit" | "exit") {
            return false;
        }
        if line == "help" || line == ":help" {
            print_help();
            return true;
        }

        match self.navigator.current() {
            Screen::Gate => self.handle_gate(line).await,
            Screen::Play => self.handle_play(line).await,
            Screen::Profile => self.handle_profile(line).await,
        }
        self.sync_screen();
        true
    }

    async fn handle_gate(&mut self, line: &str) {
        match line {
            ":back" => {
                self.gate.handle_key(Key::from_name("Backspace"));
            }
            ":submit" => {
                if !self.gate.submit().await {
                    println!("Enter all 6 characters first");
                }
            }
            ":cancel" => {
                self.gate.cancel();
            }
            _ => {
                if let Some(value) = line.strip_prefix(":type") {
                    self.gate.sync_proxy(value.trim());
                } else if let Some(name) = line.strip_prefix(":key ") {
                    // raw key names as a keyboard reports them
                    self.gate.handle_key(Key::from_name(name.trim()));
                } else {
                    for c in line.chars() {
                        self.gate.handle_key(Key::Char(c));
                    }
                }
            }
        }
    }

    async fn handle_play(&mut self, line: &str) {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("tap") => {
                let touches = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
                let x = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
                let y = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
                let outcome = self
                    .ledger
                    .as_ref()
                    .and_then(|ledger| ledger.register_tap(touches, TapPosition { x, y }));
                match outcome {
                    Some(outcome) => {
                        let markers: Vec<String> = outcome
                            .effects
                            .iter()
                            .map(|e| format!("+1@({},{})", e.x, e.y))
                            .collect();
                        println!(
                            "{}  (+{}, balance {}, total {}, {} taps left)",
                            markers.join(" "),
                            outcome.earned,
                            outcome.balance,
                            outcome.total_earned,
                            outcome.mount
                        );
                    }
                    None => println!("No taps left"),
                }
            }
            Some("save") => {
                let result = match &self.ledger {
                    Some(ledger) => ledger.save_now().await,
                    None => None,
                };
                match result {
                    Some(Ok(report)) => println!(
                        "Saved (+{}, balance {})",
                        report.amount, report.update.balance
                    ),
                    Some(Err(e)) => println!("Save failed: {}", e),
                    None => println!("Nothing to save"),
                }
            }
            Some("profile") => self.navigator.push(Screen::Profile),
            Some("back") => {
                self.navigator.back();
            }
            Some("status") | None => {}
            Some(other) => println!("Unknown command '{}'", other),
        }
    }

    async fn handle_profile(&mut self, line: &str) {
        match line {
            "copy" => {
                self.profile.copy_referral_link().await;
            }
            "wallet" => {
                self.profile.wallet_click().await;
                println!("{}", self.profile.wallet_label());
            }
            "earnings" => println!("Your invitation earnings: {}pts", self.profile.invitation_earnings()),
            "play" => self.navigator.push(Screen::Play),
            "back" => {
                self.navigator.back();
            }
            "" | "status" => {}
            other => println!("Unknown command '{}'", other),
        }
    }

    /// Unmounts the tap surface and gives its final flush a moment to land.
    pub async fn shutdown(&mut self) {
        if let Some(ledger) = self.ledger.take() {
            if let Some(handle) = ledger.teardown() {
                if timeout(Duration::from_secs(TEARDOWN_GRACE_SECS), handle).await.is_err() {
                    tracing::warn!("Final save did not finish in time");
                }
            }
        }
    }
}

fn print_help() {
    println!("gate:    type characters | :back | :key <name> | :type <value> | :submit | :cancel");
    println!("play:    tap [touches] [x y] | save | profile | back | status");
    println!("profile: copy | wallet | earnings | play | back");
    println!("any:     help | quit");
}

pub async fn run(config: Config, user_id: Option<String>) -> anyhow::Result<()> {
    let shell = TelegramShell::default();
    let host: Option<&dyn HostShell> = if config.telegram_webapp {
        Some(&shell)
    } else {
        None
    };
    ShellBootstrap::new().init(host);

    let api = HttpUserApi::new(
        &config.api_base_url,
        Duration::from_secs(config.http_timeout_secs),
    )?;
    let mut app = ClientApp::new(config, Arc::new(api));
    app.enter(user_id.as_deref()).await;
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        app.prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !app.handle_line(line.trim()).await {
            break;
        }
    }

    app.shutdown().await;
    Ok(())
}
