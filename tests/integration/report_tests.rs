//! Integration tests for gesture dispatch: manual reports, automatic
//! reporting policy and factory reset.

use thnode::app::events::NodeEvent;
use thnode::app::ports::Level;
use thnode::app::report::ReportTrigger;
use thnode::app::service::{BootOutcome, NodeService};
use thnode::config::{EndpointConfig, NodeConfig, ReportingPolicy};
use thnode::error::SensorError;

use crate::mock_hw::{Call, Rig, reading};

fn booted(config: NodeConfig) -> (Rig, NodeService) {
    let mut rig = Rig::new();
    let mut node = NodeService::new(config, EndpointConfig::default());
    assert_eq!(node.boot(&mut rig.hw, &mut rig.sink), BootOutcome::Ready);
    rig.clear_calls();
    rig.sink.events.clear();
    (rig, node)
}

fn press(rig: &mut Rig, after_ms: u32, hold_ms: u32) {
    let start = rig.now() + after_ms;
    rig.hw.button.presses.push((start, start + hold_ms));
}

// ── Manual report ─────────────────────────────────────────────

#[test]
fn short_press_updates_cache_and_reports_once() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    press(&mut rig, 100, 300);
    let until = rig.now() + 2000;
    rig.run_until(&mut node, until);

    assert_eq!(rig.hw.net.cache, (22.5, 48.0));
    assert_eq!(rig.count(&Call::Report), 1);
    assert!(
        rig.shown()
            .contains(&"Temperature: 22.50\u{00b0}C\nHumidity: 48.00% rH".to_owned())
    );
    // Manual reports are paced.
    assert_eq!(rig.count(&Call::Delay(1000)), 1);
    assert_eq!(rig.count(&Call::FactoryReset), 0);

    let last = node.last_reported().unwrap();
    assert_eq!(last.temperature, 22.5);
    assert_eq!(last.relative_humidity, 48.0);
}

#[test]
fn cache_is_written_before_report() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    node.report_now(&mut rig.hw, &mut rig.sink).unwrap();

    let calls = rig.calls();
    let report = calls.iter().position(|c| *c == Call::Report).unwrap();
    assert_eq!(calls[report - 2], Call::SetTemperature(22.5));
    assert_eq!(calls[report - 1], Call::SetHumidity(48.0));
}

#[test]
fn sensor_failure_leaves_cache_unchanged() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    node.report_now(&mut rig.hw, &mut rig.sink).unwrap();
    assert_eq!(rig.hw.net.cache, (22.5, 48.0));

    rig.hw.sensor.readings.push_back(Err(SensorError::Bus));
    rig.clear_calls();
    assert_eq!(
        node.report_now(&mut rig.hw, &mut rig.sink),
        Err(SensorError::Bus)
    );

    assert_eq!(rig.hw.net.cache, (22.5, 48.0));
    assert_eq!(rig.count(&Call::Report), 0);
    assert!(
        !rig.calls()
            .iter()
            .any(|c| matches!(c, Call::SetTemperature(_) | Call::SetHumidity(_)))
    );
    assert!(
        rig.shown()
            .contains(&"Sensor read failed:\nbus transaction failed".to_owned())
    );
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, NodeEvent::ReportSkipped(SensorError::Bus)))
    );
}

#[test]
fn sentinel_reading_is_skipped() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    rig.hw
        .sensor
        .readings
        .push_back(Ok(reading(f32::NAN, 48.0)));

    assert_eq!(
        node.report_now(&mut rig.hw, &mut rig.sink),
        Err(SensorError::InvalidReading)
    );
    assert_eq!(rig.hw.net.cache, (0.0, 0.0));
    assert_eq!(rig.count(&Call::Report), 0);
}

#[test]
fn failed_press_does_not_stall_the_loop() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    rig.hw.sensor.readings.push_back(Err(SensorError::Crc));

    press(&mut rig, 100, 300);
    press(&mut rig, 1000, 300);
    let until = rig.now() + 3000;
    rig.run_until(&mut node, until);

    // First press skipped, second press reported.
    assert_eq!(rig.count(&Call::SensorRead), 2);
    assert_eq!(rig.count(&Call::Report), 1);
    assert_eq!(rig.hw.net.cache, (22.5, 48.0));
}

#[test]
fn contact_bounce_reports_once() {
    let mut config = NodeConfig::default();
    config.tick_ms = 10;
    config.hold_sample_ms = 10;
    config.report_pacing_ms = 0;
    let (mut rig, mut node) = booted(config);

    let t0 = rig.now();
    rig.hw.button.raw_script = Some(Box::new(move |now| {
        let t = now.wrapping_sub(t0);
        let toggle = (t / 10) % 2 == 0;
        match t {
            0..50 => if toggle { Level::Low } else { Level::High },
            50..400 => Level::Low,
            400..450 => if toggle { Level::High } else { Level::Low },
            _ => Level::High,
        }
    }));
    rig.run_until(&mut node, t0 + 1000);

    assert_eq!(rig.count(&Call::Report), 1);
    assert_eq!(rig.count(&Call::FactoryReset), 0);
}

// ── Factory reset ─────────────────────────────────────────────

#[test]
fn long_hold_factory_resets_once_then_restarts() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    press(&mut rig, 100, 3200);
    let until = rig.now() + 6000;
    rig.run_until(&mut node, until);

    assert_eq!(rig.count(&Call::FactoryReset), 1);
    assert_eq!(rig.count(&Call::Restart), 1);
    assert_eq!(rig.count(&Call::Report), 0);
    assert_eq!(rig.count(&Call::SensorRead), 0);

    let calls = rig.calls();
    let shown = calls
        .iter()
        .position(|c| *c == Call::Show("Factory Reset...".to_owned()))
        .unwrap();
    let erase = calls.iter().position(|c| *c == Call::FactoryReset).unwrap();
    let restart = calls.iter().position(|c| *c == Call::Restart).unwrap();
    assert!(shown < erase && erase < restart);
    assert_eq!(calls[shown + 1], Call::Delay(100));

    let resets = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, NodeEvent::FactoryReset))
        .count();
    assert_eq!(resets, 1);
}

#[test]
fn very_long_hold_still_resets_once() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    press(&mut rig, 100, 10_000);
    let until = rig.now() + 12_000;
    rig.run_until(&mut node, until);

    assert_eq!(rig.count(&Call::FactoryReset), 1);
    assert_eq!(rig.count(&Call::Report), 0);
}

#[test]
fn hold_just_under_threshold_is_a_short_press() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    press(&mut rig, 100, 2900);
    let until = rig.now() + 5000;
    rig.run_until(&mut node, until);

    assert_eq!(rig.count(&Call::FactoryReset), 0);
    assert_eq!(rig.count(&Call::Report), 1);
}

// ── Automatic reporting policy ────────────────────────────────

fn with_policy(policy: ReportingPolicy) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.reporting = Some(policy);
    config.auto_sample_ms = 5000;
    config
}

#[test]
fn no_policy_means_no_automatic_reports() {
    let (mut rig, mut node) = booted(NodeConfig::default());
    let until = rig.now() + 30_000;
    rig.run_until(&mut node, until);

    assert_eq!(rig.count(&Call::SensorRead), 0);
    assert_eq!(rig.count(&Call::Report), 0);
}

#[test]
fn policy_reports_on_temperature_delta() {
    let (mut rig, mut node) = booted(with_policy(ReportingPolicy {
        min_interval_secs: 0,
        max_interval_secs: 60,
        delta_c: 0.5,
    }));
    rig.hw.sensor.readings.push_back(Ok(reading(22.5, 48.0)));
    rig.hw.sensor.readings.push_back(Ok(reading(22.5, 48.0)));
    rig.hw.sensor.steady = Ok(reading(23.5, 47.0));

    // Samples at +0, +5 s, +10 s, +15 s.
    let until = rig.now() + 15_050;
    rig.run_until(&mut node, until);

    assert_eq!(rig.count(&Call::SensorRead), 4);
    assert_eq!(rig.count(&Call::Report), 2);
    assert_eq!(rig.hw.net.cache, (23.5, 47.0));
    assert!(rig.sink.events.iter().all(|e| match e {
        NodeEvent::Reported { trigger, .. } => *trigger == ReportTrigger::Policy,
        _ => true,
    }));
    // Automatic reports are not paced.
    assert_eq!(rig.count(&Call::Delay(1000)), 0);
}

#[test]
fn policy_reports_on_max_interval() {
    let (mut rig, mut node) = booted(with_policy(ReportingPolicy {
        min_interval_secs: 0,
        max_interval_secs: 10,
        delta_c: 100.0,
    }));

    // Samples at +0, +5 s, +10 s; only the first and last are due.
    let until = rig.now() + 10_050;
    rig.run_until(&mut node, until);

    assert_eq!(rig.count(&Call::SensorRead), 3);
    assert_eq!(rig.count(&Call::Report), 2);
}
