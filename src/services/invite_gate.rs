use tokio::time::{sleep, Duration};

use super::invite_code::{InviteCodeInput, Key};
use super::navigation::{Navigator, Screen};

/// Invite gate screen: collects the code and moves on to the play screen.
pub struct InviteGate {
    input: InviteCodeInput,
    loading: bool,
    navigator: Navigator,
    submit_delay: Duration,
}

impl InviteGate {
    pub fn new(navigator: Navigator, submit_delay: Duration) -> Self {
        Self {
            input: InviteCodeInput::new(),
            loading: false,
            navigator,
            submit_delay,
        }
    }

    pub fn code_input(&self) -> &InviteCodeInput {
        &self.input
    }

    pub fn handle_key(&mut self, key: Key) -> Option<String> {
        let completed = self.input.handle_key(key);
        self.on_code_complete(completed)
    }

    pub fn sync_proxy(&mut self, value: &str) -> Option<String> {
        let completed = self.input.sync_proxy(value);
        self.on_code_complete(completed)
    }

    fn on_code_complete(&self, completed: Option<String>) -> Option<String> {
        if let Some(code) = &completed {
            tracing::info!("Invite code entered: {}", code);
        }
        completed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn can_submit(&self) -> bool {
        self.input.is_complete() && !self.loading
    }

    /// Returns `false` without side effects when the code is not ready.
    pub async fn submit(&mut self) -> bool {
        if !self.can_submit() {
            tracing::debug!("Submit ignored: code incomplete or already processing");
            return false;
        }

        self.loading = true;
        // TODO: validate the code against the backend once an endpoint exists
        sleep(self.submit_delay).await;
        self.navigator.push(Screen::Play);
        self.loading = false;
        true
    }

    pub fn cancel(&self) -> Screen {
        self.navigator.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SUBMIT_DELAY_MS;

    fn gate() -> (InviteGate, Navigator) {
        let nav = Navigator::new(Screen::Gate);
        let gate = InviteGate::new(nav.clone(), Duration::from_millis(SUBMIT_DELAY_MS));
        (gate, nav)
    }

    #[tokio::test(start_paused = true)]
    async fn submit_requires_complete_code() {
        let (mut gate, nav) = gate();
        gate.sync_proxy("abc12");
        assert!(!gate.can_submit());
        assert!(!gate.submit().await);
        assert_eq!(nav.current(), Screen::Gate);
    }

    #[tokio::test(start_paused = true)]
    async fn submit_navigates_to_play_after_delay() {
        let (mut gate, nav) = gate();
        for c in "abc123".chars() {
            gate.handle_key(Key::Char(c));
        }
        assert!(gate.can_submit());

        let started = tokio::time::Instant::now();
        assert!(gate.submit().await);
        assert!(started.elapsed() >= Duration::from_millis(SUBMIT_DELAY_MS));
        assert_eq!(nav.current(), Screen::Play);
        assert!(!gate.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn code_becoming_incomplete_disables_submit() {
        let (mut gate, nav) = gate();
        assert_eq!(gate.sync_proxy("ABCDEF"), Some("ABCDEF".to_string()));
        gate.handle_key(Key::Backspace);
        assert!(!gate.submit().await);
        assert_eq!(nav.current(), Screen::Gate);
    }

    #[test]
    fn cancel_goes_back() {
        let nav = Navigator::new(Screen::Play);
        nav.push(Screen::Gate);
        let gate = InviteGate::new(nav.clone(), Duration::from_millis(1));
        assert_eq!(gate.cancel(), Screen::Play);
    }
}
