use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use uart_scope::{
    AcquireError, Acquirer, AcquirerState, AcquisitionConfig, FnSink, RollingBuffer,
    acquisition::source::{LineSource, ScriptedLineSource},
    display::monitor::{Monitor, PlotStyle},
};

fn wait_until(limit: Duration, cond: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

#[test]
fn invalid_serial_address_never_reaches_running() {
    let buf = Arc::new(RollingBuffer::new(2, 4).unwrap());
    let cfg = AcquisitionConfig::serial("/dev/uart-scope-missing-device", 115_200, 2, 4);
    let mut acq = Acquirer::new(cfg, buf.clone());

    let err = acq.start().unwrap_err();
    assert!(matches!(err, AcquireError::Connection { .. }));
    assert_eq!(acq.state(), AcquirerState::Stopped);
    assert!(acq.stop());
    assert_eq!(buf.snapshot(0).unwrap(), vec![0.0; 4]);
}

#[test]
fn simulated_mode_publishes_quickly_and_stops_within_timeout() {
    let published = Arc::new(AtomicUsize::new(0));
    let counter = published.clone();
    let sink = Arc::new(FnSink(move |v: &[f64]| {
        assert_eq!(v.len(), 3);
        counter.fetch_add(1, Ordering::Relaxed);
    }));

    let cfg = AcquisitionConfig::simulated(3, 16);
    let read_timeout = cfg.read_timeout();
    let mut acq = Acquirer::new(cfg, sink);
    acq.start().unwrap();
    assert!(acq.is_running());

    assert!(wait_until(Duration::from_millis(200), || published.load(Ordering::Relaxed) >= 1));

    let start = Instant::now();
    assert!(acq.stop());
    assert!(start.elapsed() <= read_timeout);
    assert_eq!(acq.state(), AcquirerState::Stopped);
    assert!(acq.stats().published >= 1);
}

#[test]
fn idle_line_source_stops_within_read_timeout() {
    let buf = Arc::new(RollingBuffer::new(1, 4).unwrap());
    let cfg = AcquisitionConfig {
        read_timeout_ms: 50,
        ..AcquisitionConfig::simulated(1, 4)
    };
    let src = ScriptedLineSource::new(Vec::<String>::new()).with_idle_wait(true);
    let closed = src.closed_flag();

    let mut acq = Acquirer::new(cfg, buf);
    acq.start_with_source(Box::new(src)).unwrap();
    thread::sleep(Duration::from_millis(120));

    let start = Instant::now();
    assert!(acq.stop());
    assert!(start.elapsed() < Duration::from_millis(500));
    assert_eq!(acq.state(), AcquirerState::Stopped);
    assert!(closed.load(Ordering::Acquire));
    assert!(acq.stats().read_timeouts >= 1);
}

/// Ignores its timeout, like a wedged driver.
struct StuckSource;

impl LineSource for StuckSource {
    fn read_line(&mut self, _timeout: Duration) -> Option<String> {
        thread::sleep(Duration::from_millis(600));
        None
    }

    fn close(&mut self) {}

    fn describe(&self) -> String {
        "stuck".into()
    }
}

#[test]
fn join_is_bounded_when_source_misbehaves() {
    let buf = Arc::new(RollingBuffer::new(1, 2).unwrap());
    let cfg = AcquisitionConfig {
        read_timeout_ms: 10,
        join_timeout_ms: 50,
        ..AcquisitionConfig::simulated(1, 2)
    };
    let mut acq = Acquirer::new(cfg, buf);
    acq.start_with_source(Box::new(StuckSource)).unwrap();
    thread::sleep(Duration::from_millis(20));

    let start = Instant::now();
    assert!(!acq.stop());
    assert!(start.elapsed() < Duration::from_millis(400));
    assert_eq!(acq.state(), AcquirerState::Stopping);

    // The detached loop finishes on its own once the read returns
    assert!(wait_until(Duration::from_secs(2), || acq.state() == AcquirerState::Stopped));
}

#[test]
fn cannot_restart_after_stop() {
    let buf = Arc::new(RollingBuffer::new(1, 2).unwrap());
    let mut acq = Acquirer::new(AcquisitionConfig::simulated(1, 2), buf);
    acq.start().unwrap();
    acq.stop();
    assert!(matches!(acq.start(), Err(AcquireError::AlreadyStarted)));
}

#[test]
fn interrupt_ends_monitor_and_runs_bounded_stop() {
    let buf = Arc::new(RollingBuffer::new(2, 16).unwrap());
    let cfg = AcquisitionConfig {
        read_timeout_ms: 100,
        join_timeout_ms: 500,
        ..AcquisitionConfig::simulated(2, 16)
    };
    let mut acq = Acquirer::new(cfg, buf.clone());
    acq.start().unwrap();

    let interrupted = Arc::new(AtomicBool::new(false));
    let raiser = {
        let flag = interrupted.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            flag.store(true, Ordering::SeqCst);
        })
    };

    let monitor = Monitor::new(buf, "interrupt", PlotStyle::Line, Duration::from_millis(10));
    let start = Instant::now();
    let ticks = monitor.run(None, || {
        !interrupted.load(Ordering::SeqCst) && acq.state() == AcquirerState::Running
    });
    raiser.join().unwrap();

    assert!(ticks >= 1);
    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(acq.state(), AcquirerState::Running);
    assert!(acq.stop());
    assert_eq!(acq.state(), AcquirerState::Stopped);
}
