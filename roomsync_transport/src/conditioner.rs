//! Simulates network conditions on the receiving side of a subscription
use bytes::Bytes;
use core::time::Duration;
use rand::Rng;
use roomsync_core::time::Instant;

use implementation::TimeMinHeap;

/// Contains configuration required to initialize a [`LinkConditioner`]
#[derive(Clone, Debug, PartialEq)]
pub struct LinkConditionerConfig {
    /// Delay to receive incoming messages
    pub incoming_latency: Duration,
    /// The maximum additional random latency to delay received incoming
    /// messages. This may be added OR subtracted from the
    /// latency determined in the `incoming_latency` property above
    pub incoming_jitter: Duration,
    /// The % chance that an incoming packet will be dropped.
    /// Represented as a value between 0 and 1
    pub incoming_loss: f32,
}

impl LinkConditionerConfig {
    pub fn new(incoming_latency: Duration, incoming_jitter: Duration, incoming_loss: f32) -> Self {
        Self {
            incoming_latency,
            incoming_jitter,
            incoming_loss,
        }
    }

    /// Connection in a good condition
    pub fn good_condition() -> Self {
        Self::new(Duration::from_millis(40), Duration::from_millis(6), 0.002)
    }

    /// Connection in an average condition
    pub fn average_condition() -> Self {
        Self::new(Duration::from_millis(170), Duration::from_millis(45), 0.02)
    }

    /// Connection in a poor condition
    pub fn poor_condition() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(84), 0.04)
    }
}

/// Holds received packets until their simulated arrival time
#[derive(Debug)]
pub struct LinkConditioner {
    config: LinkConditionerConfig,
    time_queue: TimeMinHeap<Bytes>,
}

impl LinkConditioner {
    pub fn new(config: LinkConditionerConfig) -> Self {
        Self {
            config,
            time_queue: TimeMinHeap::new(),
        }
    }

    /// Add the packet to the queue, or drop it
    pub fn condition_packet(&mut self, packet: Bytes, now: Instant) {
        let mut rng = rand::rng();
        if self.config.incoming_loss > 0.0 && rng.random::<f32>() < self.config.incoming_loss {
            return;
        }
        let mut latency = self.config.incoming_latency;
        if !self.config.incoming_jitter.is_zero() {
            let max_jitter = self.config.incoming_jitter.as_millis() as u64;
            let jitter = Duration::from_millis(rng.random_range(0..=max_jitter));
            if rng.random_bool(0.5) {
                latency += jitter;
            } else {
                latency = latency.saturating_sub(jitter);
            }
        }
        self.time_queue.add_item(now + latency, packet);
    }

    /// Pop the next packet whose arrival time is reached
    pub fn pop_packet(&mut self, now: Instant) -> Option<Bytes> {
        self.time_queue.pop_item(now)
    }

    /// Number of packets that are still in flight
    pub fn len(&self) -> usize {
        self.time_queue.len()
    }
}

pub(crate) mod implementation {
    use roomsync_core::time::Instant;
    use std::{cmp::Ordering, collections::BinaryHeap};

    /// A heap that contains items associated with an instant.
    ///
    /// The instant represents the time at which the item becomes "visible"
    /// Before that time, it's as if the item does not exist.
    /// Items with the same instant are returned in insertion order.
    #[derive(Debug)]
    pub(crate) struct TimeMinHeap<T> {
        heap: BinaryHeap<ItemWithTime<T>>,
        next_sequence: u64,
    }

    impl<T> TimeMinHeap<T> {
        pub fn new() -> Self {
            Self {
                heap: BinaryHeap::default(),
                next_sequence: 0,
            }
        }

        /// Adds an item to the heap marked by time
        pub fn add_item(&mut self, instant: Instant, item: T) {
            let sequence = self.next_sequence;
            self.next_sequence = self.next_sequence.wrapping_add(1);
            self.heap.push(ItemWithTime {
                instant,
                sequence,
                item,
            });
        }

        /// Returns whether or not there is an item that is ready to be returned
        pub fn has_item(&self, now: Instant) -> bool {
            self.heap.peek().is_some_and(|item| item.instant <= now)
        }

        /// Pops the earliest item from the queue if its instant is reached
        pub fn pop_item(&mut self, now: Instant) -> Option<T> {
            if self.has_item(now) {
                return self.heap.pop().map(|container| container.item);
            }
            None
        }

        pub fn len(&self) -> usize {
            self.heap.len()
        }
    }

    #[derive(Debug)]
    struct ItemWithTime<T> {
        instant: Instant,
        sequence: u64,
        item: T,
    }

    impl<T> PartialEq for ItemWithTime<T> {
        fn eq(&self, other: &Self) -> bool {
            self.instant == other.instant && self.sequence == other.sequence
        }
    }

    impl<T> Eq for ItemWithTime<T> {}

    /// BinaryHeap is a max-heap, so we must reverse the ordering of the Instants
    /// to get a min-heap
    impl<T> Ord for ItemWithTime<T> {
        fn cmp(&self, other: &ItemWithTime<T>) -> Ordering {
            other
                .instant
                .cmp(&self.instant)
                .then_with(|| other.sequence.cmp(&self.sequence))
        }
    }

    impl<T> PartialOrd for ItemWithTime<T> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
}
