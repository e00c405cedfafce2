#[cfg(test)]
mod tests {
    use crate::tests::support::*;
    use crate::tracker::{start_polling, wait_or_cancel};
    use std::time::Duration;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    fn idle_harness() -> Harness {
        harness(FakeChain::at_height(100), FakeProvider::default(), MemoryStore::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_elapses_without_cancellation() {
        let token = CancellationToken::new();
        let started = Instant::now();

        assert!(wait_or_cancel(&token, Duration::from_secs(30)).await);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_early_on_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            canceller.cancel();
        });
        let started = Instant::now();

        assert!(!wait_or_cancel(&token, Duration::from_secs(3600)).await);
        assert!(started.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_once() {
        let h = idle_harness();
        let token = CancellationToken::new();
        token.cancel();

        start_polling(h.tracker.clone(), token).await;

        assert_eq!(h.provider.price_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_per_poll_interval() {
        let h = idle_harness();
        let token = CancellationToken::new();
        let handle = tokio::spawn(start_polling(h.tracker.clone(), token.clone()));

        // Cycles at t=0, 60 and 120
        tokio::time::sleep(Duration::from_secs(150)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(h.provider.price_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_waits_for_next_interval() {
        let h = idle_harness();
        *h.provider.fail_prices.lock().unwrap() = true;
        let token = CancellationToken::new();
        let handle = tokio::spawn(start_polling(h.tracker.clone(), token.clone()));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(h.provider.price_calls(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        token.cancel();
        handle.await.unwrap();

        assert_eq!(h.provider.price_calls(), 2);
    }
}
