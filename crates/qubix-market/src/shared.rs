//! Serialized access to a marketplace from many threads.

use std::sync::Arc;

use parking_lot::Mutex;
use qubix_core::{Address, MemoryHost};

use crate::marketplace::Marketplace;

/// A marketplace behind a mutex.
///
/// Each closure passed to [`with`](Self::with) runs with exclusive access,
/// so concurrent callers observe operations one at a time. Cloning shares
/// the same marketplace.
#[derive(Debug)]
pub struct SharedMarketplace<H> {
    inner: Arc<Mutex<Marketplace<H>>>,
}

impl<H> Clone for SharedMarketplace<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> SharedMarketplace<H> {
    /// Shares `market`.
    pub fn new(market: Marketplace<H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(market)),
        }
    }

    /// Runs `f` with exclusive access to the marketplace.
    pub fn with<R>(&self, f: impl FnOnce(&mut Marketplace<H>) -> R) -> R {
        let mut market = self.inner.lock();
        f(&mut market)
    }

    /// Takes the marketplace back if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other handles exist.
    pub fn try_unwrap(self) -> Result<Marketplace<H>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl SharedMarketplace<MemoryHost> {
    /// Runs `f` as `caller`.
    ///
    /// Setting the caller and running the operation happen under one lock,
    /// so another thread cannot swap the caller in between.
    pub fn invoke_as<R>(
        &self,
        caller: Address,
        f: impl FnOnce(&mut Marketplace<MemoryHost>) -> R,
    ) -> R {
        let mut market = self.inner.lock();
        market.host_mut().set_caller(caller);
        f(&mut market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use qubix_core::{Amount, Host, JobId, Tick};
    use std::thread;

    #[test]
    fn concurrent_job_creation_is_serialized() {
        let consumers: Vec<Address> = (0u8..8)
            .map(|i| Address::from_public_key(&[i + 1; 32]))
            .collect();
        let provider = Address::from_public_key(&[99; 32]);

        let mut host = MemoryHost::new();
        for consumer in &consumers {
            host.mint(*consumer, Amount::new(100)).unwrap();
        }
        let shared =
            SharedMarketplace::new(Marketplace::new(host, MarketConfig::default()).unwrap());

        let handles: Vec<_> = consumers
            .iter()
            .enumerate()
            .map(|(i, consumer)| {
                let shared = shared.clone();
                let consumer = *consumer;
                thread::spawn(move || {
                    shared.invoke_as(consumer, |market| {
                        market.create_job(
                            JobId::new(format!("job-{i}")).unwrap(),
                            consumer,
                            provider,
                            Amount::new(100),
                            Tick::new(10),
                        )
                    })
                })
            })
            .collect();

        let mut indices: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());

        let market = shared.try_unwrap().unwrap();
        let custody = market.config().escrow_custody;
        assert_eq!(market.host().balance(&custody), Amount::new(800));
        assert_eq!(market.escrow().len(), 8);
    }

    #[test]
    fn try_unwrap_fails_while_shared() {
        let shared =
            SharedMarketplace::new(Marketplace::new(MemoryHost::new(), MarketConfig::default()).unwrap());
        let other = shared.clone();
        let shared = shared.try_unwrap().unwrap_err();
        drop(other);
        assert!(shared.try_unwrap().is_ok());
    }

    #[test]
    fn with_reads_state() {
        let host = MemoryHost::at_tick(Tick::new(7));
        let shared = SharedMarketplace::new(Marketplace::new(host, MarketConfig::default()).unwrap());
        let tick = shared.with(|market| market.host().current_tick());
        assert_eq!(tick, Tick::new(7));
    }
}
