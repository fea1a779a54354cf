//! The registry of known log sources and their visibility.
use super::record::Severity;
use indexmap::IndexMap;

/// Stable index of a source in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub usize);

/// Per-source state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Whether records from this source are rendered.
    pub visible: bool,
    /// Whether the source's handler still forwards records. Cleared on
    /// teardown or after a sink failure.
    pub attached: bool,
    /// The severity the source was registered with.
    pub severity: Severity,
}

/// Insertion-ordered mapping from source name to its entry. Never shrinks.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: IndexMap<String, SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`, returning its id and whether it was newly added.
    /// Registering an existing name leaves its entry untouched.
    pub fn register(&mut self, name: &str, severity: Severity) -> (SourceId, bool) {
        if let Some(index) = self.sources.get_index_of(name) {
            return (SourceId(index), false);
        }

        let (index, _) = self.sources.insert_full(
            name.to_string(),
            SourceEntry {
                visible: true,
                attached: true,
                severity,
            },
        );
        (SourceId(index), true)
    }

    pub fn get(&self, name: &str) -> Option<&SourceEntry> {
        self.sources.get(name)
    }

    /// Sets the visibility flag. Returns `false` for an unknown source.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.sources.get_mut(name) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Detaches the source's handler. Returns `false` if it was unknown or
    /// already detached.
    pub fn detach(&mut self, name: &str) -> bool {
        match self.sources.get_mut(name) {
            Some(entry) if entry.attached => {
                entry.attached = false;
                true
            }
            _ => false,
        }
    }

    pub fn is_visible(&self, name: &str) -> bool {
        self.sources.get(name).map(|e| e.visible).unwrap_or(false)
    }

    /// Names of the sources currently shown, in registration order.
    pub fn checked(&self) -> Vec<&str> {
        self.sources
            .iter()
            .filter(|(_, entry)| entry.visible)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceEntry)> + '_ {
        self.sources.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
