use crate::tui::action::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Maps KeyEvents to Actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(rename = "bindings")]
    bindings_list: Vec<KeyBinding>,

    #[serde(skip)]
    bindings_map: HashMap<KeyPattern, Action>,
}

/// Single keybinding entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: String,
    pub action: Action,
}

/// Pattern for matching key events
///
/// Character keys never carry `SHIFT`: the character itself already says
/// whether shift was held (`A` vs `a`, `?` vs `/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings_list = vec![
            // Movement - Arrow keys
            KeyBinding::new("Up", Action::MoveUp),
            KeyBinding::new("Down", Action::MoveDown),
            KeyBinding::new("Left", Action::MoveLeft),
            KeyBinding::new("Right", Action::MoveRight),
            // Movement - Vim-style
            KeyBinding::new("k", Action::MoveUp),
            KeyBinding::new("j", Action::MoveDown),
            KeyBinding::new("h", Action::MoveLeft),
            KeyBinding::new("l", Action::MoveRight),
            // Focus
            KeyBinding::new("Tab", Action::FocusNext),
            KeyBinding::new("Shift+Tab", Action::FocusPrev),
            KeyBinding::new("s", Action::SkipToContent),
            // Pages
            KeyBinding::new("1", Action::GoHome),
            KeyBinding::new("2", Action::GoMissense),
            KeyBinding::new("3", Action::GoTableViewer),
            KeyBinding::new("4", Action::GoAbout),
            KeyBinding::new("m", Action::ToggleMenu),
            // Application
            KeyBinding::new("q", Action::Quit),
            KeyBinding::new("Ctrl+c", Action::Quit),
            KeyBinding::new("Enter", Action::Activate),
            KeyBinding::new("Space", Action::Toggle),
            KeyBinding::new("Esc", Action::Cancel),
            // Help
            KeyBinding::new("?", Action::ToggleHelp),
            KeyBinding::new("F1", Action::ToggleHelp),
            // Table paging
            KeyBinding::new("[", Action::PrevPage),
            KeyBinding::new("]", Action::NextPage),
            KeyBinding::new("PageUp", Action::PrevPage),
            KeyBinding::new("PageDown", Action::NextPage),
            KeyBinding::new("Home", Action::FirstPage),
            KeyBinding::new("End", Action::LastPage),
            KeyBinding::new("p", Action::PrevSheet),
            KeyBinding::new("n", Action::NextSheet),
            // Table data
            KeyBinding::new("o", Action::ChooseFile),
            KeyBinding::new("u", Action::Upload),
            KeyBinding::new("r", Action::RemoveFile),
            KeyBinding::new("e", Action::LoadExample),
            KeyBinding::new("d", Action::Download),
            KeyBinding::new("b", Action::BackToUpload),
            // Columns
            KeyBinding::new("c", Action::ToggleColumns),
            KeyBinding::new("a", Action::SelectAllColumns),
            KeyBinding::new("A", Action::DeselectAllColumns),
            // Filters
            KeyBinding::new("g", Action::AddGenes),
            KeyBinding::new("i", Action::AddProteinId),
            KeyBinding::new("x", Action::RemoveContaminants),
            // Missense
            KeyBinding::new("Ctrl+s", Action::Submit),
            KeyBinding::new("Ctrl+r", Action::ResetForm),
            KeyBinding::new("+", Action::ExpandAll),
            KeyBinding::new("-", Action::CollapseAll),
            KeyBinding::new("y", Action::CopySection),
            KeyBinding::new("w", Action::SaveSection),
        ];

        let bindings_map = Self::build_map(&bindings_list);

        Self {
            bindings_list,
            bindings_map,
        }
    }
}

impl KeyBindings {
    /// Build hashmap from bindings list
    fn build_map(bindings: &[KeyBinding]) -> HashMap<KeyPattern, Action> {
        bindings
            .iter()
            .filter_map(|b| {
                KeyPattern::from_string(&b.key)
                    .ok()
                    .map(|pattern| (pattern, b.action))
            })
            .collect()
    }

    /// Get action for key event
    pub fn get_action(&self, key: &KeyEvent) -> Option<Action> {
        let pattern = KeyPattern::from_event(key);
        self.bindings_map.get(&pattern).copied()
    }

    /// Bind additional keys, replacing whatever those keys were bound to
    ///
    /// Returns a warning for every key that could not be parsed.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, Action>) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut keys: Vec<_> = overrides.iter().collect();
        keys.sort_by(|a, b| a.0.cmp(b.0));

        for (key, action) in keys {
            let pattern = match KeyPattern::from_string(key) {
                Ok(pattern) => pattern,
                Err(e) => {
                    warnings.push(format!("Ignoring key binding '{key}': {e}"));
                    continue;
                }
            };
            self.bindings_list.retain(|b| {
                KeyPattern::from_string(&b.key).map_or(true, |p| p != pattern)
            });
            self.bindings_list.push(KeyBinding::new(key, *action));
        }

        self.bindings_map = Self::build_map(&self.bindings_list);
        warnings
    }

    /// Get all bindings for an action (for help display)
    pub fn get_keys_for_action(&self, action: Action) -> Vec<String> {
        self.bindings_list
            .iter()
            .filter(|b| b.action == action)
            .map(|b| b.key.clone())
            .collect()
    }

    /// Check for actions that don't have any keybindings
    /// Returns Vec of (Action, description) for unbound actions
    pub fn get_unbound_actions(&self) -> Vec<(Action, &'static str)> {
        let bound_actions: HashSet<Action> = self.bindings_list.iter().map(|b| b.action).collect();

        Action::all()
            .into_iter()
            .filter(|action| !bound_actions.contains(action))
            .map(|action| (action, action.description()))
            .collect()
    }

    /// Validate bindings and return warnings
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        // Check for duplicate key bindings
        let mut seen: HashMap<KeyPattern, (&str, Action)> = HashMap::new();
        for binding in &self.bindings_list {
            let Ok(pattern) = KeyPattern::from_string(&binding.key) else {
                warnings.push(format!(
                    "Invalid key pattern '{}' for action {:?}",
                    binding.key, binding.action
                ));
                continue;
            };
            if let Some((key, existing_action)) = seen.get(&pattern) {
                warnings.push(format!(
                    "Duplicate key '{}': bound to both {:?} and {:?}",
                    key, existing_action, binding.action
                ));
            } else {
                seen.insert(pattern, (&binding.key, binding.action));
            }
        }

        let unbound = self.get_unbound_actions();
        if !unbound.is_empty() {
            warnings.push(format!(
                "Warning: {} action(s) have no keybindings: {}",
                unbound.len(),
                unbound
                    .iter()
                    .map(|(action, _)| format!("{:?}", action))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        warnings
    }
}

impl KeyBinding {
    pub fn new(key: &str, action: Action) -> Self {
        Self {
            key: key.to_string(),
            action,
        }
    }
}

impl KeyPattern {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        let mut modifiers = event.modifiers;
        if matches!(event.code, KeyCode::Char(_) | KeyCode::BackTab) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        Self {
            code: event.code,
            modifiers,
        }
    }

    /// Parse from string (e.g., "Ctrl+c", "Shift+Tab", "?", "<Ctrl-s>")
    pub fn from_string(s: &str) -> Result<Self, String> {
        let s = normalize(s);
        let parts: Vec<&str> = if s.len() > 1 && s.ends_with("++") {
            let mut parts: Vec<&str> = s[..s.len() - 2].split('+').collect();
            parts.push("+");
            parts
        } else if s == "+" {
            vec!["+"]
        } else {
            s.split('+').collect()
        };

        let mut modifiers = KeyModifiers::empty();
        for part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "cmd" | "command" | "super" => {
                    // Mac Command key maps to SUPER
                    #[cfg(target_os = "macos")]
                    {
                        modifiers |= KeyModifiers::SUPER;
                    }
                    #[cfg(not(target_os = "macos"))]
                    {
                        modifiers |= KeyModifiers::CONTROL; // Fallback to Ctrl on non-Mac
                    }
                }
                _ => return Err(format!("Unknown modifier: {}", part)),
            }
        }
        let key_part = parts[parts.len() - 1];

        let code = match key_part.to_lowercase().as_str() {
            "up" | "↑" => KeyCode::Up,
            "down" | "↓" => KeyCode::Down,
            "left" | "←" => KeyCode::Left,
            "right" | "→" => KeyCode::Right,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdown" | "pgdn" => KeyCode::PageDown,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "insert" | "ins" => KeyCode::Insert,
            "space" => KeyCode::Char(' '),

            // Single characters (must come before function key check to avoid matching 'f')
            _ if key_part.chars().count() == 1 => {
                let ch = key_part.chars().next().unwrap_or(' ');
                if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    KeyCode::Char(ch.to_ascii_lowercase())
                } else {
                    KeyCode::Char(ch)
                }
            }

            // Function keys: F1-F12
            k if k.starts_with('f') && k.len() >= 2 && k.len() <= 3 => match k[1..].parse::<u8>() {
                Ok(n) if (1..=12).contains(&n) => KeyCode::F(n),
                _ => return Err(format!("Invalid function key: {}", key_part)),
            },

            _ => return Err(format!("Unknown key: {}", key_part)),
        };

        if matches!(code, KeyCode::Char(_) | KeyCode::BackTab) {
            modifiers.remove(KeyModifiers::SHIFT);
        }

        Ok(Self { code, modifiers })
    }

    /// Display as human-readable string
    pub fn display(&self) -> String {
        let mut parts = Vec::new();

        if self.modifiers.contains(KeyModifiers::SUPER) {
            #[cfg(target_os = "macos")]
            parts.push("Cmd".to_string());
            #[cfg(not(target_os = "macos"))]
            parts.push("Super".to_string());
        }
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }

        let key_str = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Del".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };

        parts.push(key_str);
        parts.join("+")
    }
}

/// Accept the `<Ctrl-s>` notation used in config files
fn normalize(s: &str) -> String {
    let inner = match s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        Some(inner) if !inner.is_empty() => inner,
        _ => return s.to_string(),
    };
    if inner.chars().count() == 1 {
        return inner.to_string();
    }
    match inner.rsplit_once('-') {
        // "<Ctrl-->" binds the minus key
        Some((mods, "")) => format!("{}+-", mods.trim_end_matches('-').replace('-', "+")),
        Some((mods, key)) => format!("{}+{}", mods.replace('-', "+"), key),
        None => inner.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_pattern_parsing() {
        assert!(KeyPattern::from_string("Ctrl+c").is_ok());
        assert!(KeyPattern::from_string("a").is_ok());
        assert!(KeyPattern::from_string("F1").is_ok());
        assert!(KeyPattern::from_string("Up").is_ok());
        assert!(KeyPattern::from_string("Ctrl+Alt+Delete").is_ok());
        assert!(KeyPattern::from_string("Hyper+x").is_err());
        assert!(KeyPattern::from_string("F13").is_err());
    }

    #[test]
    fn test_shifted_characters_match_terminal_events() {
        let bindings = KeyBindings::default();
        // Terminals report shifted characters with or without SHIFT
        assert_eq!(
            bindings.get_action(&key(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(Action::DeselectAllColumns)
        );
        assert_eq!(
            bindings.get_action(&key(KeyCode::Char('?'), KeyModifiers::NONE)),
            Some(Action::ToggleHelp)
        );
        assert_eq!(
            bindings.get_action(&key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(Action::SelectAllColumns)
        );
        assert_eq!(
            bindings.get_action(&key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::FocusPrev)
        );
        assert_eq!(
            bindings.get_action(&key(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Action::ExpandAll)
        );
    }

    #[test]
    fn test_config_notation() {
        assert_eq!(
            KeyPattern::from_string("<Ctrl-s>").unwrap(),
            KeyPattern::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
        );
        assert_eq!(
            KeyPattern::from_string("<q>").unwrap(),
            KeyPattern::new(KeyCode::Char('q'), KeyModifiers::NONE)
        );
        assert_eq!(
            KeyPattern::from_string("Ctrl++").unwrap(),
            KeyPattern::new(KeyCode::Char('+'), KeyModifiers::CONTROL)
        );
    }

    #[test]
    fn test_mac_command_key() {
        let pattern = KeyPattern::from_string("Cmd+c").unwrap();
        #[cfg(target_os = "macos")]
        assert!(pattern.modifiers.contains(KeyModifiers::SUPER));
        #[cfg(not(target_os = "macos"))]
        assert!(pattern.modifiers.contains(KeyModifiers::CONTROL));
    }

    #[test]
    fn test_default_bindings_are_valid() {
        let warnings = KeyBindings::default().validate();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_overrides_replace_existing_key() {
        let mut bindings = KeyBindings::default();
        let overrides = HashMap::from([
            ("<Ctrl-d>".to_string(), Action::Download),
            ("q".to_string(), Action::Cancel),
            ("Bogus+q".to_string(), Action::Quit),
        ]);
        let warnings = bindings.apply_overrides(&overrides);

        assert_eq!(warnings.len(), 1);
        assert_eq!(
            bindings.get_action(&key(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Action::Download)
        );
        assert_eq!(
            bindings.get_action(&key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::Cancel)
        );
        assert_eq!(bindings.get_keys_for_action(Action::Quit), vec!["Ctrl+c"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyPattern::from_string("Ctrl+s").unwrap().display(), "Ctrl+s");
        assert_eq!(KeyPattern::from_string("Space").unwrap().display(), "Space");
        assert_eq!(KeyPattern::from_string("Shift+Tab").unwrap().display(), "Shift+Tab");
    }
}
