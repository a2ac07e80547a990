use thiserror::Error;
use tracing::{debug, warn};

use list::{EntryId, EntryList};

mod list;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("No more back history")]
    NoBackHistory,
    #[error("No more forward history")]
    NoForwardHistory,
    #[error("URL not found in history: {0}")]
    NotFound(String),
    #[error("Bookmarked entry is no longer in history")]
    StaleBookmark,
}

/// Read-only copy of the store for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub entries: Vec<String>,
    /// Index into `entries` of the current node.
    pub current: Option<usize>,
    /// Most recently pushed first.
    pub back: Vec<String>,
    /// Most recently pushed first.
    pub forward: Vec<String>,
}

/// Visited addresses in visit order, a cursor on the current one, and the
/// back/forward bookmark stacks.
///
/// Bookmarks are entry ids rather than addresses, so traversal lands on the
/// exact node that was bookmarked even when an address was visited twice.
/// Deleting an address purges every bookmark carrying it.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: EntryList,
    current: Option<EntryId>,
    back: Vec<EntryId>,
    forward: Vec<EntryId>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `address` at the tail and makes it current. Blank input is
    /// ignored and yields `None`.
    pub fn visit(&mut self, address: &str) -> Option<&str> {
        let address = address.trim();
        if address.is_empty() {
            debug!("Ignoring blank address");
            return None;
        }
        if let Some(current) = self.current {
            self.back.push(current);
        }
        self.forward.clear();
        let id = self.entries.push_back(address.to_string());
        self.current = Some(id);
        debug!(address, entries = self.entries.len(), "Visited");
        self.entries.get(id)
    }

    /// Steps to the previous node, or failing that to the newest live back
    /// bookmark.
    pub fn go_back(&mut self) -> Result<&str, HistoryError> {
        let current = self.current.ok_or(HistoryError::NoBackHistory)?;
        let target = match self.entries.prev(current) {
            Some(prev) => prev,
            None => pop_live(&mut self.back, &self.entries, HistoryError::NoBackHistory)?,
        };
        self.forward.push(current);
        self.move_to(target)
    }

    pub fn go_forward(&mut self) -> Result<&str, HistoryError> {
        let current = self.current.ok_or(HistoryError::NoForwardHistory)?;
        let target = pop_live(
            &mut self.forward,
            &self.entries,
            HistoryError::NoForwardHistory,
        )?;
        self.back.push(current);
        self.move_to(target)
    }

    /// Removes the first entry matching `address` and every bookmark that
    /// carries the same address.
    pub fn delete(&mut self, address: &str) -> Result<(), HistoryError> {
        let address = address.trim();
        let not_found = || HistoryError::NotFound(address.to_string());
        let id = self.entries.find_first(address).ok_or_else(not_found)?;
        let (removed, prev, next) = self.entries.remove(id).ok_or_else(not_found)?;

        if self.current == Some(id) {
            self.current = prev.or(next);
        }

        let entries = &self.entries;
        let keep = |bookmark: &EntryId| {
            entries
                .get(*bookmark)
                .is_some_and(|address| address != removed)
        };
        self.back.retain(keep);
        self.forward.retain(keep);

        debug!(address = %removed, entries = self.entries.len(), "Deleted");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
        self.back.clear();
        self.forward.clear();
        debug!("Cleared history");
    }

    pub fn all_entries(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, address)| address).collect()
    }

    pub fn current_address(&self) -> Option<&str> {
        self.current.and_then(|id| self.entries.get(id))
    }

    pub fn back_stack_view(&self) -> Vec<&str> {
        self.stack_view(&self.back)
    }

    pub fn forward_stack_view(&self) -> Vec<&str> {
        self.stack_view(&self.forward)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.current
            .is_some_and(|id| self.entries.prev(id).is_some() || !self.back.is_empty())
    }

    pub fn can_go_forward(&self) -> bool {
        self.current.is_some() && !self.forward.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut current = None;
        let entries = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, (id, address))| {
                if Some(id) == self.current {
                    current = Some(index);
                }
                address.to_string()
            })
            .collect();
        let owned = |view: Vec<&str>| -> Vec<String> {
            view.into_iter().map(String::from).collect()
        };
        Snapshot {
            entries,
            current,
            back: owned(self.back_stack_view()),
            forward: owned(self.forward_stack_view()),
        }
    }

    fn move_to(&mut self, target: EntryId) -> Result<&str, HistoryError> {
        self.current = Some(target);
        let address = self
            .entries
            .get(target)
            .ok_or(HistoryError::StaleBookmark)?;
        debug!(address, "Moved");
        Ok(address)
    }

    fn stack_view(&self, stack: &[EntryId]) -> Vec<&str> {
        stack
            .iter()
            .rev()
            .filter_map(|id| self.entries.get(*id))
            .collect()
    }
}

/// Pops bookmarks until one still resolves. Stale ones are dropped on the
/// way; running out because of them is `StaleBookmark`, an empty stack is
/// `empty`.
fn pop_live(
    stack: &mut Vec<EntryId>,
    entries: &EntryList,
    empty: HistoryError,
) -> Result<EntryId, HistoryError> {
    if stack.is_empty() {
        return Err(empty);
    }
    while let Some(id) = stack.pop() {
        if entries.contains(id) {
            return Ok(id);
        }
        warn!(?id, "Discarding stale bookmark");
    }
    Err(HistoryError::StaleBookmark)
}
