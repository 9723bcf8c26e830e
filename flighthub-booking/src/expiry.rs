use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::pending::PendingPaymentService;

/// Periodically expires overdue pending payments until `shutdown` flips to
/// true or its sender is dropped.
///
/// Only an optimisation: reads and completions check the deadline on their
/// own, so a stopped or slow sweeper never lets a late payment through.
pub fn spawn_expiry_sweeper(
    service: Arc<PendingPaymentService>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Expiry sweeper started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = service.sweep_expired().await {
                        error!("Expiry sweep failed: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Expiry sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use flighthub_core::repository::PendingPaymentRepository;
    use flighthub_core::{NewPendingPayment, PassengerDetails, PaymentDeadline, PaymentStatus};
    use flighthub_store::MemoryStore;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_sweeper_expires_and_stops_on_shutdown() {
        let store = Arc::new(MemoryStore::new());
        let pending = PendingPaymentRepository::insert(
            store.as_ref(),
            NewPendingPayment {
                flight_id: 1,
                passenger_name: "Ada Lovelace".to_string(),
                passenger_email: "ada@example.com".to_string(),
                passenger_phone: "0123".to_string(),
                passenger_details: PassengerDetails::new("Ada", "Lovelace", "ada@example.com", "0123"),
                passengers: 1,
                total_price: Decimal::new(124_500, 2),
                add_ons: Vec::new(),
                expires_at: Utc::now() + chrono::Duration::milliseconds(1),
            },
        )
        .await
        .unwrap();

        let service = Arc::new(PendingPaymentService::new(
            store.clone(),
            store.clone(),
            PaymentDeadline::default(),
            true,
        ));
        let (tx, rx) = watch::channel(false);
        let handle = spawn_expiry_sweeper(service, Duration::from_millis(5), rx);

        tokio::time::sleep(Duration::from_millis(40)).await;
        let swept = PendingPaymentRepository::get_by_reference(store.as_ref(), &pending.ticket_reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(swept.status, PaymentStatus::Expired);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop")
            .unwrap();
    }
}
