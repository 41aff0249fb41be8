use std::sync::atomic::{AtomicBool, Ordering};

/// The host mini-app shell (Telegram's WebApp object in the web client).
pub trait HostShell: Send + Sync {
    fn expand(&self);

    fn ready(&self);
}

/// Telegram host seen from a headless client: records and logs the calls.
#[derive(Debug, Default)]
pub struct TelegramShell {
    expanded: AtomicBool,
    ready: AtomicBool,
}

#[cfg(test)]
impl TelegramShell {
    pub fn is_expanded(&self) -> bool {
        self.expanded.load(Ordering::SeqCst)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

impl HostShell for TelegramShell {
    fn expand(&self) {
        self.expanded.store(true, Ordering::SeqCst);
        tracing::info!("Telegram WebApp expanded to full viewport");
    }

    fn ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!("Telegram WebApp signalled ready");
    }
}

/// Runs the on-load host hook at most once.
#[derive(Debug, Default)]
pub struct ShellBootstrap {
    done: AtomicBool,
}

impl ShellBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this call performed the hook.
    pub fn init(&self, shell: Option<&dyn HostShell>) -> bool {
        let Some(shell) = shell else {
            tracing::debug!("Not running inside a host shell");
            return false;
        };
        if self.done.swap(true, Ordering::SeqCst) {
            return false;
        }
        shell.expand();
        shell.ready();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingShell {
        expands: AtomicUsize,
        readies: AtomicUsize,
    }

    impl HostShell for CountingShell {
        fn expand(&self) {
            self.expands.fetch_add(1, Ordering::SeqCst);
        }

        fn ready(&self) {
            self.readies.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn init_runs_once() {
        let shell = CountingShell::default();
        let bootstrap = ShellBootstrap::new();
        assert!(bootstrap.init(Some(&shell)));
        assert!(!bootstrap.init(Some(&shell)));
        assert_eq!(shell.expands.load(Ordering::SeqCst), 1);
        assert_eq!(shell.readies.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn init_without_shell_is_noop() {
        let bootstrap = ShellBootstrap::new();
        assert!(!bootstrap.init(None));

        let shell = TelegramShell::default();
        assert!(bootstrap.init(Some(&shell)));
        assert!(shell.is_expanded());
        assert!(shell.is_ready());
    }
}
