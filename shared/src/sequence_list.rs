use crate::SequenceId;

/// Items kept sorted by sequence id, lowest first.
///
/// Arrivals are usually close to the newest entry, so insertion scans from the
/// back. Equal ids are kept in arrival order.
pub struct SequenceList<T> {
    list: Vec<(SequenceId, T)>,
}

impl<T> Default for SequenceList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SequenceList<T> {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn front_id(&self) -> Option<SequenceId> {
        self.list.first().map(|(id, _)| *id)
    }

    pub fn pop_front(&mut self) -> Option<(SequenceId, T)> {
        if self.list.is_empty() {
            return None;
        }
        Some(self.list.remove(0))
    }

    pub fn insert_scan_from_back(&mut self, id: SequenceId, item: T) {
        let mut index = self.list.len();
        while index > 0 {
            let (old_id, _) = &self.list[index - 1];
            if *old_id <= id {
                break;
            }
            index -= 1;
        }
        self.list.insert(index, (id, item));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(SequenceId, T)> {
        self.list.iter()
    }
}
