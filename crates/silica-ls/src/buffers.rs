//! Registry of open editor documents.
//!
//! The editor owns document content; the server only mirrors it here,
//! relexed wholesale on every change (full-text synchronization). The
//! definition resolver reads buffers through shared references and never
//! takes ownership.

use dashmap::mapref::one::Ref;
use dashmap::DashMap;

use silica_syntax::TextStructure;

/// The live, lexed state of one open document.
#[derive(Debug)]
pub struct ParsedBuffer {
    text: TextStructure,
}

impl ParsedBuffer {
    pub fn text(&self) -> &TextStructure {
        &self.text
    }
}

/// Open documents keyed by URI string.
#[derive(Debug, Default)]
pub struct BufferTracker {
    buffers: DashMap<String, ParsedBuffer>,
}

impl BufferTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace (or create) the buffer for `uri` with freshly lexed content.
    pub fn update(&self, uri: &str, content: &str) {
        self.buffers.insert(
            uri.to_string(),
            ParsedBuffer {
                text: TextStructure::new(content.to_string()),
            },
        );
    }

    pub fn remove(&self, uri: &str) {
        self.buffers.remove(uri);
    }

    /// Shared access to the buffer for `uri`, if one is tracked.
    pub fn get(&self, uri: &str) -> Option<Ref<'_, String, ParsedBuffer>> {
        self.buffers.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.buffers.contains_key(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_and_get() {
        let tracker = BufferTracker::new();
        tracker.update("file:///a.sv", "module a; endmodule");
        let buffer = tracker.get("file:///a.sv").unwrap();
        assert!(buffer.text().range_for_text("a").is_some());
    }

    #[test]
    fn test_update_replaces_content() {
        let tracker = BufferTracker::new();
        tracker.update("file:///a.sv", "module a; endmodule");
        tracker.update("file:///a.sv", "module b; endmodule");
        let buffer = tracker.get("file:///a.sv").unwrap();
        assert!(buffer.text().range_for_text("a").is_none());
        assert!(buffer.text().range_for_text("b").is_some());
    }

    #[test]
    fn test_remove() {
        let tracker = BufferTracker::new();
        tracker.update("file:///a.sv", "");
        tracker.remove("file:///a.sv");
        assert!(!tracker.contains("file:///a.sv"));
    }
}
