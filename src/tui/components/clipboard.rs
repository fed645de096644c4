use tracing::warn;

/// Destination for copied text
pub trait ClipboardSink {
    fn set_text(&mut self, text: String) -> Result<(), String>;
}

/// The desktop clipboard; opened per copy so a missing display only fails
/// the copy itself
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: String) -> Result<(), String> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .map_err(|e| {
                warn!("clipboard write failed: {e}");
                e.to_string()
            })
    }
}

/// Keeps copied text in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Option<String>,
    pub fail: bool,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: String) -> Result<(), String> {
        if self.fail {
            return Err("clipboard unavailable".to_string());
        }
        self.contents = Some(text);
        Ok(())
    }
}
