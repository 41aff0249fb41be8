use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Gate,
    Play,
    Profile,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Gate => "gate",
            Screen::Play => "play",
            Screen::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// Screen history shared by every component that can navigate.
#[derive(Debug, Clone)]
pub struct Navigator {
    history: Arc<Mutex<Vec<Screen>>>,
}

impl Navigator {
    pub fn new(start: Screen) -> Self {
        Self {
            history: Arc::new(Mutex::new(vec![start])),
        }
    }

    pub fn current(&self) -> Screen {
        let history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history.last().copied().unwrap_or(Screen::Gate)
    }

    pub fn push(&self, screen: Screen) {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.last() != Some(&screen) {
            tracing::debug!("Navigating to {}", screen);
            history.push(screen);
        }
    }

    /// Pops the current screen; the root screen is never popped.
    pub fn back(&self) -> Screen {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.len() > 1 {
            history.pop();
        }
        let screen = history.last().copied().unwrap_or(Screen::Gate);
        tracing::debug!("Navigated back to {}", screen);
        screen
    }
}
