//! Doubly linked list of visited addresses, stored in an arena.
//!
//! Nodes live in a slot vector and link to each other by [`EntryId`]. An id
//! carries the generation of its slot, so an id kept around after its node was
//! removed stops resolving instead of aliasing whatever reuses the slot.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
struct Node {
    address: String,
    prev: Option<EntryId>,
    next: Option<EntryId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
pub struct EntryList {
    slots: Vec<Slot>,
    free: Vec<usize>,
    head: Option<EntryId>,
    tail: Option<EntryId>,
    len: usize,
}

impl EntryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `address` after the current tail and returns its id.
    pub fn push_back(&mut self, address: String) -> EntryId {
        let node = Node {
            address,
            prev: self.tail,
            next: None,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                EntryId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                EntryId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        match self.tail {
            Some(tail) => self.set_next(tail, Some(id)),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Splices `id` out of the list, repairing its neighbours and the
    /// head/tail ends. Returns the removed address together with the old
    /// `(prev, next)` neighbours, or `None` if `id` is stale.
    pub fn remove(&mut self, id: EntryId) -> Option<(String, Option<EntryId>, Option<EntryId>)> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        match node.prev {
            Some(prev) => self.set_next(prev, node.next),
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.set_prev(next, node.prev),
            None => self.tail = node.prev,
        }
        self.len -= 1;
        Some((node.address, node.prev, node.next))
    }

    pub fn get(&self, id: EntryId) -> Option<&str> {
        self.node(id).map(|node| node.address.as_str())
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.node(id).is_some()
    }

    pub fn prev(&self, id: EntryId) -> Option<EntryId> {
        self.node(id)?.prev
    }

    pub fn next(&self, id: EntryId) -> Option<EntryId> {
        self.node(id)?.next
    }

    /// First node from the head whose address equals `address`.
    pub fn find_first(&self, address: &str) -> Option<EntryId> {
        self.iter()
            .find(|(_, entry)| *entry == address)
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Drops every node. Slots are bumped so ids handed out before the clear
    /// never resolve again.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index);
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn node(&self, id: EntryId) -> Option<&Node> {
        let slot = self.slots.get(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: EntryId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn set_next(&mut self, id: EntryId, next: Option<EntryId>) {
        if let Some(node) = self.node_mut(id) {
            node.next = next;
        }
    }

    fn set_prev(&mut self, id: EntryId, prev: Option<EntryId>) {
        if let Some(node) = self.node_mut(id) {
            node.prev = prev;
        }
    }
}

pub struct Iter<'a> {
    list: &'a EntryList,
    cursor: Option<EntryId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (EntryId, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let address = self.list.get(id)?;
        self.cursor = self.list.next(id);
        Some((id, address))
    }
}
