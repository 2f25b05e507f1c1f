mod support;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use mac_tracker::{
    scan_once, Monitor, MonitorConfig, ProbeResult, ProbeSupervisor, SharedState,
};
use std::sync::atomic::Ordering;

use support::{
    eventually, ip, table, CountingProber, RecordingPresenter, ScriptedSource, SlowSource,
};

const MODEM_MAC: &str = "00:50:f1:aa:bb:cc";

fn fast_config() -> MonitorConfig {
    MonitorConfig::default()
        .with_discovery_interval(Duration::from_millis(20))
        .with_probe_interval(Duration::from_millis(5))
        .with_display_interval(Duration::from_millis(10))
        .with_ping_timeout(Duration::from_millis(50))
}

#[tokio::test]
async fn supervisor_converges_to_each_table() {
    let state = SharedState::new();
    let prober = CountingProber::new(Duration::from_millis(1));
    let mut supervisor = ProbeSupervisor::new(Arc::clone(&state), prober, Duration::from_millis(5));

    let tables = [
        table(&[("10.0.0.1", "aa:aa:aa:aa:aa:01"), ("10.0.0.2", "aa:aa:aa:aa:aa:02")]),
        table(&[("10.0.0.2", "aa:aa:aa:aa:aa:02"), ("10.0.0.3", "aa:aa:aa:aa:aa:03")]),
        table(&[]),
        table(&[("10.0.0.9", "aa:aa:aa:aa:aa:09")]),
    ];

    for neighbors in tables {
        let expected: BTreeSet<_> = neighbors.keys().copied().collect();
        state.replace_neighbors(neighbors).await;
        supervisor.reconcile_now().await;
        assert_eq!(supervisor.active_ips(), expected);
    }

    supervisor.shutdown(Duration::from_millis(100)).await;
    assert_eq!(supervisor.worker_count(), 0);
}

#[tokio::test]
async fn second_reconcile_without_changes_is_noop() {
    let state = SharedState::new();
    let prober = CountingProber::new(Duration::from_millis(1));
    let mut supervisor = ProbeSupervisor::new(Arc::clone(&state), prober, Duration::from_millis(5));

    state
        .replace_neighbors(table(&[("10.0.0.1", "aa:aa:aa:aa:aa:01")]))
        .await;

    let first = supervisor.reconcile_now().await;
    assert_eq!(first.started, vec![ip("10.0.0.1")]);

    let second = supervisor.reconcile_now().await;
    assert!(second.is_noop());
    assert_eq!(supervisor.worker_count(), 1);

    supervisor.shutdown(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn removed_host_loses_probe_entry_and_stops_probing() {
    let state = SharedState::new();
    let prober = CountingProber::new(Duration::from_millis(2));
    let host = ip("10.0.0.7");
    prober.script(host, ProbeResult::reachable(Some(1.0)));

    let mut supervisor = ProbeSupervisor::new(
        Arc::clone(&state),
        prober.clone(),
        Duration::from_millis(5),
    );

    state
        .replace_neighbors(table(&[("10.0.0.7", "aa:aa:aa:aa:aa:07")]))
        .await;
    supervisor.reconcile_now().await;

    assert!(eventually(Duration::from_secs(2), || prober.stats(&host).calls >= 2).await);

    state.replace_neighbors(table(&[])).await;
    let outcome = supervisor.reconcile_now().await;
    assert_eq!(outcome.retired, vec![host]);

    // let any in-flight probe finish
    tokio::time::sleep(Duration::from_millis(30)).await;
    let calls_after_retire = prober.stats(&host).calls;
    assert!(state.lock().await.probe(&host).is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(prober.stats(&host).calls, calls_after_retire);
    assert!(state.snapshot().await.probes.get(&host).is_none());

    supervisor.shutdown(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn flip_flopping_host_never_has_two_probes_in_flight() {
    let state = SharedState::new();
    let prober = CountingProber::new(Duration::from_millis(15));
    let host = ip("10.0.0.5");

    let mut supervisor = ProbeSupervisor::new(
        Arc::clone(&state),
        prober.clone(),
        Duration::from_millis(1),
    );

    for round in 0..20 {
        let neighbors = if round % 2 == 0 {
            table(&[("10.0.0.5", "aa:aa:aa:aa:aa:05")])
        } else {
            table(&[])
        };
        state.replace_neighbors(neighbors).await;
        supervisor.reconcile_now().await;
        tokio::time::sleep(Duration::from_millis(3)).await;
    }

    supervisor.shutdown(Duration::from_millis(500)).await;

    assert!(prober.stats(&host).calls >= 1);
    assert_eq!(prober.max_overlap(), 1);
}

#[tokio::test]
async fn monitor_run_renders_rows_and_returns_final_state() {
    let source = ScriptedSource::new(table(&[
        ("10.0.0.2", "bb:bb:bb:bb:bb:02"),
        ("10.0.0.1", MODEM_MAC),
    ]));
    let prober = CountingProber::new(Duration::from_millis(1));
    prober.script(ip("10.0.0.1"), ProbeResult::reachable(Some(3.2)));
    prober.script(ip("10.0.0.2"), ProbeResult::unreachable());

    let monitor = Monitor::new(source, prober.clone(), fast_config());
    let mut presenter = RecordingPresenter::default();

    let outcome = monitor
        .run(&mut presenter, tokio::time::sleep(Duration::from_millis(150)))
        .await
        .expect("monitor run should succeed");

    let frames = presenter.frames();
    assert!(frames.len() >= 2, "expected several frames, got {}", frames.len());
    assert!(frames.iter().all(|frame| !frame.warning));

    let last = frames.last().expect("at least one frame");
    let ips: Vec<_> = last.rows.iter().map(|row| row.ip).collect();
    assert_eq!(ips, vec![ip("10.0.0.1"), ip("10.0.0.2")]);
    assert_eq!(last.rows[0].reachability, "REACHABLE (3.2ms)");
    assert_eq!(last.rows[0].device_guess, "Modem");
    assert_eq!(last.rows[1].reachability, "UNREACHABLE");

    assert_eq!(outcome.modem_address.as_deref(), Some(MODEM_MAC));
    assert!(outcome.cycles >= 2);
    assert_eq!(outcome.snapshot.neighbors.len(), 2);
    assert!(monitor.state().is_shutdown());
}

#[tokio::test]
async fn monitor_flags_modem_mac_on_another_host_once_per_frame() {
    let source = ScriptedSource::new(table(&[
        ("192.168.1.1", MODEM_MAC),
        ("192.168.1.10", "70:28:8b:00:00:10"),
    ]));
    let prober = CountingProber::new(Duration::from_millis(1));
    let monitor = Monitor::new(source.clone(), prober, fast_config());
    let mut presenter = RecordingPresenter::default();
    let recorded = presenter.clone();

    let spoof = {
        let source = Arc::clone(&source);
        async move {
            assert!(
                eventually(Duration::from_secs(2), || !recorded.frames().is_empty()).await
            );
            source.set(table(&[
                ("192.168.1.1", MODEM_MAC),
                ("192.168.1.10", "70:28:8b:00:00:10"),
                ("192.168.1.50", MODEM_MAC),
            ]));
            tokio::time::sleep(Duration::from_millis(120)).await;
        }
    };

    let outcome = monitor
        .run(&mut presenter, spoof)
        .await
        .expect("monitor run should succeed");

    let frames = presenter.frames();
    assert!(!frames[0].warning);

    let flagged = frames
        .iter()
        .find(|frame| frame.warning)
        .expect("a frame after the spoofing host appears should carry the warning");
    assert_eq!(flagged.rows.len(), 3);
    assert_eq!(
        flagged.warning_message(),
        Some("WARNING: Possible MITM attack detected! Same MAC as modem found on different IP.")
    );
    assert_eq!(outcome.modem_address.as_deref(), Some(MODEM_MAC));
}

#[tokio::test]
async fn monitor_keeps_running_when_first_table_read_fails() {
    let source = ScriptedSource::new(table(&[("10.0.0.3", "aa:aa:aa:aa:aa:03")]));
    source.set_failing(true);
    let prober = CountingProber::new(Duration::from_millis(1));
    let monitor = Monitor::new(source, prober, fast_config());
    let mut presenter = RecordingPresenter::default();

    let outcome = monitor
        .run(&mut presenter, tokio::time::sleep(Duration::from_millis(40)))
        .await
        .expect("a failing neighbor source should not abort the monitor");

    assert!(outcome.modem_address.is_none());
    assert!(presenter.frames().iter().all(|frame| frame.rows.is_empty()));
}

#[tokio::test]
async fn shutdown_lets_an_in_flight_table_read_finish() {
    let source = SlowSource::new(
        Duration::from_millis(60),
        table(&[("10.0.0.4", "aa:aa:aa:aa:aa:04")]),
    );
    let prober = CountingProber::new(Duration::from_millis(1));
    let config = fast_config().with_discovery_interval(Duration::from_millis(10));
    let monitor = Monitor::new(source.clone(), prober, config);
    let mut presenter = RecordingPresenter::default();

    // initial read ends at ~60ms, the refresher's next read spans ~70..130ms
    monitor
        .run(&mut presenter, tokio::time::sleep(Duration::from_millis(90)))
        .await
        .expect("monitor run should succeed");

    let started = source.started.load(Ordering::SeqCst);
    assert!(started >= 2, "refresher should have started a second read");
    assert_eq!(source.completed.load(Ordering::SeqCst), started);
}

#[tokio::test]
async fn scan_once_probes_every_host_once() {
    let source = ScriptedSource::new(table(&[
        ("10.0.0.2", "bb:bb:bb:bb:bb:02"),
        ("10.0.0.1", "aa:aa:aa:aa:aa:01"),
    ]));
    let prober = CountingProber::new(Duration::from_millis(1));
    prober.script(ip("10.0.0.1"), ProbeResult::reachable(Some(3.2)));

    let frame = scan_once(source.as_ref(), prober.clone())
        .await
        .expect("scan should succeed");

    assert!(!frame.warning);
    assert_eq!(frame.rows.len(), 2);
    assert_eq!(frame.rows[0].ip, ip("10.0.0.1"));
    assert_eq!(frame.rows[0].reachability, "REACHABLE (3.2ms)");
    assert_eq!(frame.rows[1].reachability, "UNREACHABLE");
    assert_eq!(prober.stats(&ip("10.0.0.1")).calls, 1);
    assert_eq!(prober.stats(&ip("10.0.0.2")).calls, 1);
}
