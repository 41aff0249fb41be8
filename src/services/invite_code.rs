use crate::constants::INVITE_CODE_LENGTH;

const LAST_SLOT: usize = INVITE_CODE_LENGTH - 1;

/// A keystroke as seen by the invite gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Other,
}

impl Key {
    /// Maps a DOM-style key name (`"a"`, `"Backspace"`, `"Shift"`) to a key.
    pub fn from_name(name: &str) -> Self {
        if name == "Backspace" {
            return Key::Backspace;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

/// Six-slot invite code collector.
///
/// Filled slots always form a prefix of the code. The cursor never moves past
/// the last slot, so typing on a full code overwrites the last character and
/// the first backspace on a full code clears only that last character.
///
/// Every transition returns `Some(code)` exactly when the code has just become
/// complete; it stays silent while the code remains full and re-arms once the
/// code is incomplete again.
#[derive(Debug, Clone, Default)]
pub struct InviteCodeInput {
    slots: [Option<char>; INVITE_CODE_LENGTH],
    cursor: usize,
    completion_sent: bool,
}

impl InviteCodeInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Option<char>; INVITE_CODE_LENGTH] {
        &self.slots
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The full code, once every slot is filled.
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect::<Option<String>>()
    }

    /// Characters currently entered, in slot order.
    pub fn entered(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    pub fn input(&mut self, c: char) -> Option<String> {
        if !c.is_ascii_alphanumeric() {
            return None;
        }
        if self.cursor < INVITE_CODE_LENGTH {
            self.slots[self.cursor] = Some(c.to_ascii_uppercase());
            self.cursor = (self.cursor + 1).min(LAST_SLOT);
        }
        self.settle()
    }

    pub fn backspace(&mut self) -> Option<String> {
        if self.cursor == LAST_SLOT && self.slots[LAST_SLOT].is_some() {
            self.slots[LAST_SLOT] = None;
        } else if self.cursor > 0 {
            self.slots[self.cursor - 1] = None;
            self.cursor -= 1;
        }
        self.settle()
    }

    /// Keystroke channel.
    pub fn handle_key(&mut self, key: Key) -> Option<String> {
        match key {
            Key::Char(c) => self.input(c),
            Key::Backspace => self.backspace(),
            Key::Other => None,
        }
    }

    /// Soft-keyboard channel: `value` is the hidden text field's new content.
    ///
    /// The value is diffed against the entered characters and replayed as
    /// backspaces and inputs, so both channels share one state.
    pub fn sync_proxy(&mut self, value: &str) -> Option<String> {
        let current: Vec<char> = self.entered().chars().collect();
        let incoming: Vec<char> = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let common = current
            .iter()
            .zip(&incoming)
            .take_while(|(a, b)| a == b)
            .count();

        let mut completed = None;
        for _ in common..current.len() {
            if let Some(code) = self.backspace() {
                completed = Some(code);
            }
        }
        for &c in &incoming[common..] {
            if let Some(code) = self.input(c) {
                completed = Some(code);
            }
        }
        completed
    }

    fn settle(&mut self) -> Option<String> {
        match self.code() {
            Some(code) if !self.completion_sent => {
                self.completion_sent = true;
                Some(code)
            }
            Some(_) => None,
            None => {
                self.completion_sent = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> (InviteCodeInput, Vec<String>) {
        let mut input = InviteCodeInput::new();
        let fired = text.chars().filter_map(|c| input.input(c)).collect();
        (input, fired)
    }

    #[test]
    fn sixth_character_completes_once() {
        let (mut input, fired) = typed("ABCDE");
        assert!(fired.is_empty());
        assert_eq!(input.slots()[5], None);

        assert_eq!(input.input('F'), Some("ABCDEF".to_string()));
        assert_eq!(input.code().as_deref(), Some("ABCDEF"));
        // further no-op transitions while full stay silent
        assert_eq!(input.input('#'), None);
        assert_eq!(input.handle_key(Key::Other), None);
    }

    #[test]
    fn lowercase_is_uppercased_and_symbols_ignored() {
        let (input, _) = typed("a-b c!1");
        assert_eq!(input.entered(), "ABC1");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn backspace_at_full_clears_last_slot_only() {
        let (mut input, _) = typed("ABCDEF");
        assert_eq!(input.cursor(), 5);

        input.backspace();
        assert_eq!(input.cursor(), 5);
        assert_eq!(input.slots()[5], None);
        assert_eq!(input.slots()[4], Some('E'));

        input.backspace();
        assert_eq!(input.cursor(), 4);
        assert_eq!(input.slots()[4], None);
        assert_eq!(input.entered(), "ABCD");
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut input = InviteCodeInput::new();
        assert_eq!(input.backspace(), None);
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.entered(), "");
    }

    #[test]
    fn typing_on_full_code_overwrites_without_refiring() {
        let (mut input, fired) = typed("ABCDEF");
        assert_eq!(fired.len(), 1);
        assert_eq!(input.input('Z'), None);
        assert_eq!(input.code().as_deref(), Some("ABCDEZ"));
    }

    #[test]
    fn completion_rearms_after_becoming_incomplete() {
        let (mut input, _) = typed("ABCDEF");
        input.backspace();
        assert_eq!(input.input('X'), Some("ABCDEX".to_string()));
    }

    #[test]
    fn key_names_map_like_dom_events() {
        assert_eq!(Key::from_name("Backspace"), Key::Backspace);
        assert_eq!(Key::from_name("q"), Key::Char('q'));
        assert_eq!(Key::from_name("Shift"), Key::Other);
        assert_eq!(Key::from_name(""), Key::Other);
    }

    #[test]
    fn proxy_channel_appends_and_deletes() {
        let mut input = InviteCodeInput::new();
        assert_eq!(input.sync_proxy("abc"), None);
        assert_eq!(input.entered(), "ABC");
        assert_eq!(input.cursor(), 3);

        assert_eq!(input.sync_proxy("abcdef"), Some("ABCDEF".to_string()));

        // deleting one char from a full field clears only the last slot
        assert_eq!(input.sync_proxy("abcde"), None);
        assert_eq!(input.cursor(), 5);
        assert_eq!(input.entered(), "ABCDE");

        assert_eq!(input.sync_proxy("ab"), None);
        assert_eq!(input.entered(), "AB");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn proxy_replacement_rewrites_divergent_tail() {
        let mut input = InviteCodeInput::new();
        input.sync_proxy("ABCD");
        input.sync_proxy("ABXY");
        assert_eq!(input.entered(), "ABXY");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn channels_stay_consistent() {
        let mut input = InviteCodeInput::new();
        input.handle_key(Key::Char('a'));
        input.handle_key(Key::Char('b'));
        input.sync_proxy("ABC");
        input.handle_key(Key::Backspace);
        input.sync_proxy("ABQ");
        assert_eq!(input.entered(), "ABQ");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn completion_fires_iff_entering_full_state() {
        // Deterministic pseudo-random walk over inputs and backspaces.
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut input = InviteCodeInput::new();
        let mut was_full = false;

        for _ in 0..5_000 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let roll = (seed >> 33) % 10;
            let fired = if roll < 6 {
                input.input((b'a' + (roll as u8)) as char)
            } else if roll < 9 {
                input.backspace()
            } else {
                input.input('*')
            };

            let full = input.is_complete();
            assert_eq!(fired.is_some(), full && !was_full);
            if let Some(code) = fired {
                assert_eq!(code.len(), INVITE_CODE_LENGTH);
                assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            }
            assert!(input.cursor() <= LAST_SLOT);
            was_full = full;
        }
    }
}
