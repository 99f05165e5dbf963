//! Bounded admission for workers.
//!
//! The dispatcher acquires a [`Slot`] before spawning each worker and hands it over.
//! The slot goes back to the pool when it is dropped, so a worker releases it exactly
//! once whichever way it exits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::Result;

#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Counters {
    fn enter(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::AcqRel);
    }
}

/// One unit of the limiter's capacity. Dropping it frees the unit.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        // Decrement before the permit field is dropped, so `in_flight` never reads
        // higher than the number of permits actually out.
        self.counters.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl ConcurrencyLimiter {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "limiter capacity must be > 0");

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            counters: Arc::default(),
        }
    }

    /// Waits until a slot is free.
    pub async fn acquire(&self) -> Result<Slot> {
        let permit = self.semaphore.clone().acquire_owned().await?;
        Ok(self.slot(permit))
    }

    /// Returns `None` if every slot is taken.
    pub fn try_acquire(&self) -> Option<Slot> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        Some(self.slot(permit))
    }

    fn slot(&self, permit: OwnedSemaphorePermit) -> Slot {
        self.counters.enter();
        Slot {
            _permit: permit,
            counters: self.counters.clone(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::Acquire)
    }

    /// Highest number of slots held at the same time so far.
    pub fn peak_in_flight(&self) -> usize {
        self.counters.peak_in_flight.load(Ordering::Acquire)
    }
}
