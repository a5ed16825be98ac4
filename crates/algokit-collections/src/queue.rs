use crate::list::List;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is empty")]
    Empty,
}

/// FIFO queue backed by [`List`].
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: List<T>,
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self { items: List::new() }
    }

    /// Add to the rear.
    pub fn enqueue(&mut self, data: T) {
        self.items.insert_next(data);
    }

    /// Remove from the front.
    pub fn dequeue(&mut self) -> Result<T, QueueError> {
        self.items.pop_front().ok_or(QueueError::Empty)
    }

    pub fn peek(&self) -> Result<&T, QueueError> {
        self.items.front().ok_or(QueueError::Empty)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}
