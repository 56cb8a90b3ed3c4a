// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Admission control for workers.
//!
//! A `TokenPool` is a counting semaphore built on a bounded channel
//! that holds exactly as many tokens as workers may run at once.
//! Acquiring takes a token out and wraps it in a `Permit`; dropping
//! the permit puts the token back.  Tokens cannot be cloned or made
//! outside this module, so a permit can only ever be returned once.

use crate::cancel::Cancellation;
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often a blocked `acquire` looks at its cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(10);

/// Permission for one more worker to run.
#[derive(Debug)]
struct AvailabilityToken;

#[derive(Debug)]
struct Shared {
    capacity: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// A fixed supply of worker tokens.  Cheap to clone; every clone
/// draws on the same supply.
#[derive(Clone, Debug)]
pub struct TokenPool {
    give: Sender<AvailabilityToken>,
    take: Receiver<AvailabilityToken>,
    shared: Arc<Shared>,
}

impl TokenPool {
    /// A pool pre-loaded with `capacity` tokens.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "a token pool needs at least one token");
        let (give, take) = bounded(capacity);
        for _ in 0..capacity {
            give.send(AvailabilityToken)
                .expect("a fresh pool has room for all of its tokens");
        }
        TokenPool {
            give,
            take,
            shared: Arc::new(Shared {
                capacity,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// The most permits that were ever held at the same time.
    pub fn peak(&self) -> usize {
        self.shared.peak.load(Ordering::SeqCst)
    }

    /// Block until a token is free and take it.
    pub fn acquire(&self) -> Permit {
        match self.take.recv() {
            Ok(token) => self.admit(token),
            Err(_) => unreachable!("the pool holds its own sender"),
        }
    }

    /// Block until a token is free or `cancel` fires, whichever comes
    /// first.  Returns None once cancelled.
    pub fn acquire_unless(&self, cancel: &Cancellation) -> Option<Permit> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            match self.take.recv_timeout(CANCEL_POLL) {
                Ok(token) => return Some(self.admit(token)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    unreachable!("the pool holds its own sender")
                }
            }
        }
    }

    fn admit(&self, token: AvailabilityToken) -> Permit {
        let held = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(
            held <= self.shared.capacity,
            "{} permits held from a pool of {}",
            held,
            self.shared.capacity
        );
        self.shared.peak.fetch_max(held, Ordering::SeqCst);
        Permit {
            token: Some(token),
            pool: self.clone(),
        }
    }

    fn release(&self, token: AvailabilityToken) {
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.give.try_send(token) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => panic!(
                "token returned to a full pool of {}",
                self.shared.capacity
            ),
            Err(TrySendError::Disconnected(_)) => {
                unreachable!("the pool holds its own receiver")
            }
        }
    }
}

/// A held token.  Returned to its pool when dropped.
#[derive(Debug)]
pub struct Permit {
    token: Option<AvailabilityToken>,
    pool: TokenPool,
}

impl Drop for Permit {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.pool.release(token);
        }
    }
}
