//! Bounded segment queue.
//!
//! Fixed-capacity ring over a boxed slice allocated once at creation.
//! Segments are addressed by their position from the front, so the planner
//! scan can mutate entries in place through `item_mut` without holding
//! aliasing references across iterations.

use traj_common::consts::DEFAULT_QUEUE_SIZE;
use traj_common::error::PlannerError;

use crate::segment::Segment;

/// FIFO of [`Segment`]s; front-to-back order is execution and blend order.
#[derive(Debug)]
pub struct SegmentQueue {
    slots: Box<[Segment]>,
    head: usize,
    len: usize,
}

impl SegmentQueue {
    /// Build a queue over caller-provided storage.
    ///
    /// A capacity of 0 selects [`DEFAULT_QUEUE_SIZE`]. The buffer is resized
    /// to the capacity here and never grows afterwards.
    pub fn create(capacity: usize, storage: Option<Vec<Segment>>) -> Result<Self, PlannerError> {
        let mut buf = storage.ok_or(PlannerError::NoStorage)?;
        let capacity = if capacity == 0 { DEFAULT_QUEUE_SIZE } else { capacity };
        buf.clear();
        buf.resize(capacity, Segment::default());
        Ok(Self {
            slots: buf.into_boxed_slice(),
            head: 0,
            len: 0,
        })
    }

    /// Queue with freshly allocated storage.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_QUEUE_SIZE } else { capacity };
        Self {
            slots: vec![Segment::default(); capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Drop every entry; capacity is unchanged.
    pub fn init(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Append at the back.
    pub fn put(&mut self, segment: Segment) -> Result<(), PlannerError> {
        if self.is_full() {
            return Err(PlannerError::QueueFull {
                capacity: self.capacity(),
            });
        }
        let slot = self.slot(self.len);
        self.slots[slot] = segment;
        self.len += 1;
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    #[inline]
    fn slot(&self, n: usize) -> usize {
        (self.head + n) % self.slots.len()
    }

    /// The `n`th segment from the front.
    #[inline]
    pub fn item(&self, n: usize) -> Option<&Segment> {
        if n < self.len {
            Some(&self.slots[self.slot(n)])
        } else {
            None
        }
    }

    /// Mutable access to the `n`th segment from the front.
    #[inline]
    pub fn item_mut(&mut self, n: usize) -> Option<&mut Segment> {
        if n < self.len {
            let slot = self.slot(n);
            Some(&mut self.slots[slot])
        } else {
            None
        }
    }

    /// Discard the `n` oldest entries (saturating). Returns how many went.
    pub fn remove_front(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        if n == 0 {
            return 0;
        }
        self.head = self.slot(n);
        self.len -= n;
        if self.len == 0 {
            self.head = 0;
        }
        n
    }

    /// Visit every queued segment, front to back.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Segment)) {
        for n in 0..self.len {
            let slot = self.slot(n);
            f(&mut self.slots[slot]);
        }
    }

    /// Iterate front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> + '_ {
        (0..self.len).map(move |n| &self.slots[self.slot(n)])
    }
}
