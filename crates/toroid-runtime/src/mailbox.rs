use std::mem;

use parking_lot::Mutex;

/// Double-buffered message list. Producers append under the mutex; the consumer swaps the whole
/// back buffer out and iterates its own copy without holding the lock.
pub struct Mailbox<T> {
    back: Mutex<Vec<T>>,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            back: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, msg: T) {
        self.back.lock().push(msg);
    }

    pub fn push_many(&self, msgs: impl IntoIterator<Item = T>) {
        self.back.lock().extend(msgs);
    }

    /// Swaps the back buffer with `front`, which must be empty; the previous allocation of
    /// `front` becomes the new back buffer.
    pub fn swap_into(&self, front: &mut Vec<T>) {
        debug_assert!(front.is_empty());
        mem::swap(&mut *self.back.lock(), front);
    }

    pub fn len(&self) -> usize {
        self.back.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops everything pending and returns how many messages were discarded.
    pub fn discard(&self) -> usize {
        let mut back = self.back.lock();
        let n = back.len();
        back.clear();
        n
    }
}
