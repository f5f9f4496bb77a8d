//! Background workers driving the simulation
//!
//! Each activity runs in its own tokio task on a fixed pause between ticks.
//! A failed tick is logged and the loop carries on; the shutdown signal is
//! observed while sleeping, so an in-flight tick always completes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;

use crate::application::services::DeliveryService;

/// Run `tick` every `interval` until `shutdown` turns true or its sender is dropped
pub async fn run_periodic<F, Fut>(
    name: &'static str,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    tracing::info!("Starting {} worker (every {:?})", name, interval);

    loop {
        if *shutdown.borrow() {
            break;
        }

        if let Err(e) = tick().await {
            tracing::error!("{} tick failed: {:#}", name, e);
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!("{} worker stopped", name);
}

/// Assign at most one created order per tick
pub async fn assignment_worker(
    delivery_service: Arc<dyn DeliveryService>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) {
    run_periodic("assignment", interval, shutdown, || {
        let service = delivery_service.clone();
        async move {
            service.assign_next_order().await?;
            Ok(())
        }
    })
    .await
}

/// Advance every busy courier one step per tick
pub async fn movement_worker(
    delivery_service: Arc<dyn DeliveryService>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) {
    run_periodic("movement", interval, shutdown, || {
        let service = delivery_service.clone();
        async move {
            service.move_couriers().await?;
            Ok(())
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;

    #[tokio::test]
    async fn test_failing_ticks_do_not_stop_the_loop() {
        let (tx, rx) = watch::channel(false);
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = ticks.clone();
        let worker = tokio::spawn(run_periodic(
            "failing",
            Duration::from_millis(5),
            rx,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    bail!("boom")
                }
            },
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        worker.await.unwrap();

        assert!(ticks.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_sleep() {
        let (tx, rx) = watch::channel(false);
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = ticks.clone();
        let worker = tokio::spawn(run_periodic(
            "slow",
            Duration::from_secs(3600),
            rx,
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        ));

        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker should stop promptly")
            .unwrap();

        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_signalled_shutdown_runs_no_tick() {
        let (_tx, rx) = watch::channel(true);
        let ticks = AtomicUsize::new(0);

        run_periodic("idle", Duration::from_millis(1), rx, || {
            ticks.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dropped_sender_stops_worker() {
        let (tx, rx) = watch::channel(false);
        drop(tx);

        tokio::time::timeout(
            Duration::from_secs(1),
            run_periodic("orphan", Duration::from_secs(3600), rx, || async { Ok(()) }),
        )
        .await
        .expect("worker should stop when the sender is gone");
    }
}
