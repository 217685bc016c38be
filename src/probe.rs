//! Retry-by-probing
//!
//! Some quotes only succeed for trial amounts in a certain window: too much
//! overflows the pool math, too little underflows it. [`AmountProber`]
//! walks a fixed list of descending amounts, remembers which one last
//! worked, and starts there next time.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::error::{Result, SdkError};

/// Trial amounts in raw units, largest first
pub const DEFAULT_PROBE_AMOUNTS: [u64; 7] = [
    1_000_000_000_000,
    100_000_000_000,
    10_000_000_000,
    1_000_000_000,
    100_000_000,
    10_000_000,
    1_000_000,
];

#[derive(Debug)]
pub struct AmountProber {
    amounts: Vec<u64>,
    last_success: AtomicUsize,
}

impl AmountProber {
    /// `amounts` must be non-empty, non-zero and strictly descending
    pub fn new(amounts: Vec<u64>) -> Result<Self> {
        if amounts.is_empty() {
            return Err(SdkError::config("probe amounts are empty"));
        }
        if amounts.contains(&0) {
            return Err(SdkError::config(format!("probe amounts must be non-zero: {:?}", amounts)));
        }
        if amounts.windows(2).any(|w| w[0] <= w[1]) {
            return Err(SdkError::config(format!(
                "probe amounts must be strictly descending: {:?}",
                amounts
            )));
        }
        Ok(Self {
            amounts,
            last_success: AtomicUsize::new(0),
        })
    }

    pub fn amounts(&self) -> &[u64] {
        &self.amounts
    }

    /// Index the next probe starts from
    pub fn last_success(&self) -> usize {
        self.last_success.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.last_success.store(0, Ordering::Relaxed);
    }

    /// Run `attempt` on each amount from the remembered index down until one
    /// succeeds, then wrap around to the larger amounts skipped at the start.
    /// Returns the amount used and its result.
    ///
    /// Precondition failures stop the walk immediately: a smaller amount
    /// cannot fix a missing wallet. The terminal error comes only after every
    /// amount was tried; the memo is then cleared.
    pub async fn probe<T, F, Fut>(&self, mut attempt: F) -> Result<(u64, T)>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let len = self.amounts.len();
        let start = self.last_success().min(len.saturating_sub(1));
        let mut last_error = None;

        for index in (start..len).chain(0..start) {
            let amount = self.amounts[index];
            match attempt(amount).await {
                Ok(value) => {
                    if index != start {
                        info!("🔎 Probe settled on {} (index {})", amount, index);
                    }
                    self.last_success.store(index, Ordering::Relaxed);
                    return Ok((amount, value));
                }
                Err(e @ SdkError::Precondition(_)) => return Err(e),
                Err(e) => {
                    debug!("Probe with {} failed: {}", amount, e);
                    last_error = Some(e);
                }
            }
        }

        let attempts = len;
        warn!("All {} probe amounts failed", attempts);
        self.reset();
        Err(SdkError::ProbeExhausted {
            attempts,
            last_error: Box::new(
                last_error.unwrap_or_else(|| SdkError::config("no probe amounts were tried")),
            ),
        })
    }
}

impl Default for AmountProber {
    fn default() -> Self {
        Self {
            amounts: DEFAULT_PROBE_AMOUNTS.to_vec(),
            last_success: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn prober() -> AmountProber {
        AmountProber::new(vec![1000, 100, 10, 1]).unwrap()
    }

    #[test]
    fn test_rejects_unordered_amounts() {
        assert!(AmountProber::new(vec![]).is_err());
        assert!(AmountProber::new(vec![10, 10]).is_err());
        assert!(AmountProber::new(vec![1, 10]).is_err());
        assert!(AmountProber::new(vec![1000, 0]).is_err());
        assert!(AmountProber::default().amounts().windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_tries_descending_and_remembers() {
        let p = prober();
        let tried = Mutex::new(Vec::new());

        let (amount, _) = tokio_test::block_on(p.probe(|a| {
            tried.lock().unwrap().push(a);
            async move {
                if a <= 10 {
                    Ok(a * 2)
                } else {
                    Err(SdkError::Rpc("too large".into()))
                }
            }
        }))
        .unwrap();

        assert_eq!(amount, 10);
        assert_eq!(*tried.lock().unwrap(), vec![1000, 100, 10]);
        assert_eq!(p.last_success(), 2);

        // next call starts at the remembered index
        tried.lock().unwrap().clear();
        tokio_test::block_on(p.probe(|a| {
            tried.lock().unwrap().push(a);
            async move { Ok::<_, SdkError>(a) }
        }))
        .unwrap();
        assert_eq!(*tried.lock().unwrap(), vec![10]);
    }

    #[tokio::test]
    async fn test_exhaustion_after_full_list() {
        let p = prober();
        let calls = Mutex::new(0usize);
        let err = p
            .probe(|_| {
                *calls.lock().unwrap() += 1;
                async { Err::<(), _>(SdkError::Rpc("nope".into())) }
            })
            .await
            .unwrap_err();

        assert_eq!(*calls.lock().unwrap(), 4);
        match err {
            SdkError::ProbeExhausted { attempts, last_error } => {
                assert_eq!(attempts, 4);
                assert_eq!(last_error.to_string(), "rpc error: nope");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(p.last_success(), 0);
    }

    #[tokio::test]
    async fn test_memo_wraps_to_larger_amounts() {
        let p = prober();
        p.probe(|a| async move {
            if a == 1 { Ok(()) } else { Err(SdkError::Rpc("x".into())) }
        })
        .await
        .unwrap();
        assert_eq!(p.last_success(), 3);

        // the small amount now fails but a larger one works again
        let tried = Mutex::new(Vec::new());
        let (amount, _) = p
            .probe(|a| {
                tried.lock().unwrap().push(a);
                async move {
                    if a == 100 { Ok(()) } else { Err(SdkError::Rpc("y".into())) }
                }
            })
            .await
            .unwrap();
        assert_eq!(amount, 100);
        assert_eq!(*tried.lock().unwrap(), vec![1, 1000, 100]);
        assert_eq!(p.last_success(), 1);

        let err = p
            .probe(|_| async { Err::<(), _>(SdkError::Rpc("z".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::ProbeExhausted { attempts: 4, .. }));
        assert_eq!(p.last_success(), 0);
    }

    #[tokio::test]
    async fn test_precondition_is_not_retried() {
        let p = prober();
        let calls = Mutex::new(0usize);
        let err = p
            .probe(|_| {
                *calls.lock().unwrap() += 1;
                async { Err::<(), _>(SdkError::precondition("no wallet connected")) }
            })
            .await
            .unwrap_err();
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(err.to_string(), "no wallet connected");
    }
}
