//! Contract Test: Fixed-Interval Scheduling
//!
//! Verifies the timing of the polling loop using tokio's paused clock:
//! - The first cycle runs immediately
//! - Cycles are separated by a constant interval, with or without failures
//! - Cycles never overlap
//! - The shutdown receiver stops the loop

mod common;

use cfddns_core::Scheduler;
use common::*;
use std::net::Ipv4Addr;
use std::time::Duration;

const INTERVAL: Duration = Duration::from_secs(60);

fn scheduler(ip_source: &FixedIpSource, provider: &MockDnsProvider) -> Scheduler {
    Scheduler::new(reconciler(ip_source, provider), INTERVAL)
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_immediately() {
    let ip_source = FixedIpSource::new(Ipv4Addr::new(1, 2, 3, 4));
    let provider = MockDnsProvider::new();
    let scheduler = scheduler(&ip_source, &provider);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { scheduler.run_with_shutdown(shutdown_rx).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(ip_source.current_call_count(), 1);
    assert_eq!(provider.create_call_count(), 1);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cycles_run_at_fixed_interval() {
    let ip_source = FixedIpSource::new(Ipv4Addr::new(1, 2, 3, 4));
    let provider = MockDnsProvider::new();
    let scheduler = scheduler(&ip_source, &provider);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { scheduler.run_with_shutdown(shutdown_rx).await });

    // Cycles at t=0, 60, 120
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(ip_source.current_call_count(), 3);
    assert_eq!(provider.list_call_count(), 3);
    assert_eq!(provider.create_call_count(), 1, "later cycles see the created record");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_change_interval() {
    let ip_source = FixedIpSource::failing();
    let provider = MockDnsProvider::new();
    let scheduler = scheduler(&ip_source, &provider);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { scheduler.run_with_shutdown(shutdown_rx).await });

    // No backoff: still exactly one attempt per interval
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(ip_source.current_call_count(), 3);

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(ip_source.current_call_count(), 13);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_loop() {
    let ip_source = FixedIpSource::new(Ipv4Addr::new(1, 2, 3, 4));
    let provider = MockDnsProvider::new();
    let scheduler = scheduler(&ip_source, &provider);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move { scheduler.run_with_shutdown(shutdown_rx).await });

    tokio::time::sleep(Duration::from_secs(30)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let cycles = ip_source.current_call_count();
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(ip_source.current_call_count(), cycles, "no cycle after shutdown");
}

#[tokio::test(start_paused = true)]
async fn dropped_shutdown_sender_stops_the_loop() {
    let ip_source = FixedIpSource::new(Ipv4Addr::new(1, 2, 3, 4));
    let provider = MockDnsProvider::new();
    let scheduler = scheduler(&ip_source, &provider);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move { scheduler.run_with_shutdown(shutdown_rx).await });

    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(shutdown_tx);

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler should stop when the sender is dropped")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn run_cycle_is_single_shot() {
    let ip_source = FixedIpSource::new(Ipv4Addr::new(1, 2, 3, 4));
    let provider = MockDnsProvider::new();
    let scheduler = scheduler(&ip_source, &provider);

    let outcome = scheduler.run_cycle().await;

    assert_eq!(outcome.label(), "created");
    assert_eq!(ip_source.current_call_count(), 1);
    assert_eq!(scheduler.interval(), INTERVAL);
}
