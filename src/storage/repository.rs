//! Widget Repository
//!
//! Owns the authoritative widget collection and mirrors it to a
//! [`KeyValueStore`] under [`WIDGETS_KEY`].
//!
//! Every mutation rewrites the whole collection. If that write fails the
//! in-memory change is rolled back, so the in-memory list and the persisted
//! snapshot are equal after every call returns.

use crate::storage::error::{RepositoryError, RepositoryResult, StorageResult};
use crate::storage::kv::KeyValueStore;
use crate::storage::types::{ValidationError, Widget, WidgetId};
use std::collections::HashSet;

/// Storage key holding the serialized widget collection
pub const WIDGETS_KEY: &str = "finboard_widgets";

/// In-memory widget list backed by a durable snapshot
pub struct WidgetRepository<S> {
    store: S,
    widgets: Vec<Widget>,
}

impl<S: KeyValueStore> WidgetRepository<S> {
    /// Create an empty repository over `store` (call [`load`](Self::load) to read the snapshot)
    pub fn new(store: S) -> Self {
        Self {
            store,
            widgets: Vec::new(),
        }
    }

    /// Create a repository and load the persisted snapshot
    pub fn open(store: S) -> StorageResult<Self> {
        let mut repo = Self::new(store);
        repo.load()?;
        Ok(repo)
    }

    /// Read the persisted snapshot and make it the in-memory set
    ///
    /// A missing snapshot yields no widgets. An unparseable snapshot is
    /// logged and also treated as empty. Entries that break the collection
    /// invariants are skipped.
    pub fn load(&mut self) -> StorageResult<&[Widget]> {
        let widgets = match self.store.get(WIDGETS_KEY)? {
            None => Vec::new(),
            Some(content) => match serde_json::from_str::<Vec<Widget>>(&content) {
                Ok(parsed) => Self::sanitize(parsed),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable widget snapshot: {}", e);
                    Vec::new()
                }
            },
        };

        tracing::info!("Loaded {} widgets", widgets.len());
        self.widgets = widgets;
        Ok(&self.widgets)
    }

    fn sanitize(parsed: Vec<Widget>) -> Vec<Widget> {
        let mut seen = HashSet::new();
        parsed
            .into_iter()
            .filter(|w| match w.validate() {
                Err(e) => {
                    tracing::warn!(widget_id = %w.id, "Skipping persisted widget: {}", e);
                    false
                }
                Ok(()) if !seen.insert(w.id.clone()) => {
                    tracing::warn!(widget_id = %w.id, "Skipping duplicate persisted widget");
                    false
                }
                Ok(()) => true,
            })
            .collect()
    }

    /// Append a widget and persist the collection
    ///
    /// Invalid widgets and duplicate ids are refused and nothing changes.
    pub fn add(&mut self, widget: Widget) -> RepositoryResult<()> {
        widget.validate()?;
        if self.contains(&widget.id) {
            return Err(ValidationError::DuplicateId(widget.id).into());
        }

        let id = widget.id.clone();
        self.widgets.push(widget);

        if let Err(e) = self.persist() {
            self.widgets.pop();
            tracing::error!(widget_id = %id, "Rolled back widget add: {}", e);
            return Err(RepositoryError::Storage(e));
        }

        tracing::debug!(widget_id = %id, "Widget added");
        Ok(())
    }

    /// Remove a widget by id and persist the collection
    ///
    /// Returns the removed widget, or `None` (without writing) if no widget
    /// had that id.
    pub fn remove(&mut self, id: &WidgetId) -> RepositoryResult<Option<Widget>> {
        let Some(index) = self.widgets.iter().position(|w| &w.id == id) else {
            return Ok(None);
        };

        let removed = self.widgets.remove(index);

        if let Err(e) = self.persist() {
            self.widgets.insert(index, removed);
            tracing::error!(widget_id = %id, "Rolled back widget remove: {}", e);
            return Err(RepositoryError::Storage(e));
        }

        tracing::debug!(widget_id = %id, "Widget removed");
        Ok(Some(removed))
    }

    /// Get all widgets in insertion order
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Get a widget by id
    pub fn get(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| &w.id == id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn persist(&self) -> StorageResult<()> {
        let content = serde_json::to_string(&self.widgets)?;
        self.store.set(WIDGETS_KEY, &content)
    }
}
