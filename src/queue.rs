use alloc::collections::VecDeque;

/// A FIFO queue that also supports inserting at an arbitrary position
/// counted from the front.
///
/// The tokenizer needs the positional insert to place a KEY token (and
/// possibly a BLOCK-MAPPING-START) in front of a scalar that it has already
/// queued, once the following `:` proves the scalar was a key.
#[derive(Debug)]
pub struct InsertionQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for InsertionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InsertionQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InsertionQueue {
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    /// Insert `item` so that it becomes the element at `index`.
    ///
    /// `index == len()` appends. Panics if `index > len()`.
    pub fn insert_at(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fifo_order() {
        let mut queue = InsertionQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.dequeue(), Some(2));
        assert_eq!(queue.dequeue(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn insert_in_front_of_queued_items() {
        let mut queue = InsertionQueue::with_capacity(2);
        queue.enqueue("scalar");
        queue.enqueue("value");
        queue.insert_at(0, "key");
        queue.insert_at(0, "mapping-start");
        queue.insert_at(4, "end");
        assert_eq!(
            queue.iter().copied().collect::<Vec<_>>(),
            ["mapping-start", "key", "scalar", "value", "end"]
        );
    }

    #[test]
    fn insert_after_wraparound() {
        let mut queue = InsertionQueue::with_capacity(4);
        for i in 0..4 {
            queue.enqueue(i);
        }
        queue.dequeue();
        queue.dequeue();
        queue.enqueue(4);
        queue.enqueue(5);
        queue.insert_at(1, 99);
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), [2, 99, 3, 4, 5]);
        queue.clear();
        assert_eq!(queue.len(), 0);
    }
}
