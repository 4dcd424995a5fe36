// cutkit-core/tests/runner_tests.rs

mod common;

use common::{MockFfmpegSpawner, MockScript, RecordingSink, Signal};
use cutkit_core::error::CoreError;
use cutkit_core::invocation::{Delivery, Invocation, InvocationOptions, OutputTarget};
use cutkit_core::progress_reporting::ffmpeg_handler::TimeUpdateObserver;
use cutkit_core::{CoreConfig, ProcessRunner};
use std::sync::{Arc, Mutex};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn runner(spawner: &MockFfmpegSpawner) -> ProcessRunner<MockFfmpegSpawner> {
    ProcessRunner::with_spawner(&CoreConfig::new("ffmpeg"), spawner.clone())
}

const PROGRESS_LOG: &str = "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'a.mp4':\n  Duration: 00:01:00.00, start: 0.000000, bitrate: 800 kb/s\nframe=   30 fps=0.0 q=-1.0 size=     256kB time=00:00:02.00 bitrate=1048.6kbits/s speed=4.0x\rframe=   75 fps= 75 q=-1.0 size=     512kB time=00:00:05.00 bitrate= 838.9kbits/s speed=5.0x\r";

#[test]
fn test_progress_is_reported_against_target_duration() -> Result<(), Box<dyn std::error::Error>> {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation("a.mp4", MockScript::success(PROGRESS_LOG));
    let sink = RecordingSink::new();

    let invocation = Invocation::new(
        "cut",
        args(&["-ss", "0", "-t", "10", "-i", "a.mp4", "-y", "out.mp4"]),
        OutputTarget::File { path: "out.mp4".into() },
    );
    let output = runner(&spawner).run(invocation, sink.clone())?.wait()?;

    assert!(output.status.success());
    assert!(output.diagnostics.contains("Duration: 00:01:00.00"));
    assert_eq!(sink.progress_values(), vec![20, 50]);
    assert_eq!(sink.signals().first(), Some(&Signal::Busy(true)));
    assert_eq!(sink.signals().last(), Some(&Signal::Busy(false)));
    assert!(sink.alerts().is_empty());

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].iter().any(|a| a == "-hide_banner"));
    assert_eq!(calls[0].last().map(String::as_str), Some("out.mp4"));
    Ok(())
}

#[test]
fn test_report_mode_failure_alerts_short_message() {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation(
        "a.mp4",
        MockScript::failure(
            "Input #0, mov, from 'a.mp4':\n[out#0/mp4 @ 0x55d0] Error opening output /readonly/out.mp4: Permission denied\n",
            1,
        ),
    );
    let sink = RecordingSink::new();

    let invocation = Invocation::new(
        "convert",
        args(&["-i", "a.mp4", "-y", "/readonly/out.mp4"]),
        OutputTarget::File { path: "/readonly/out.mp4".into() },
    );
    let err = runner(&spawner)
        .run(invocation, sink.clone())
        .unwrap()
        .wait()
        .unwrap_err();

    match &err {
        CoreError::ProcessFailure { command, status, message } => {
            assert_eq!(command, "convert");
            assert!(!status.success());
            assert_eq!(message, "Permission denied");
        }
        other => panic!("Expected ProcessFailure, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Permission denied");
    assert_eq!(sink.alerts(), vec!["Permission denied".to_string()]);
    assert_eq!(sink.signals().last(), Some(&Signal::Busy(false)));
}

#[test]
fn test_capture_mode_returns_diagnostics_on_failure() -> Result<(), Box<dyn std::error::Error>> {
    let spawner = MockFfmpegSpawner::new();
    let log = "  Duration: 00:01:23.45, start: 0.000000, bitrate: 1205 kb/s\nAt least one output file must be specified\n";
    spawner.add_expectation("a.mp4", MockScript::failure(log, 1));
    let sink = RecordingSink::new();

    let invocation = Invocation::new("probe-duration", args(&["-i", "a.mp4"]), OutputTarget::None)
        .with_delivery(Delivery::Capture)
        .with_options(InvocationOptions {
            signal_busy: false,
            ..InvocationOptions::default()
        });
    let output = runner(&spawner).run(invocation, sink.clone())?.wait()?;

    assert!(!output.status.success());
    assert_eq!(output.diagnostics, log);
    assert!(sink.signals().is_empty());
    Ok(())
}

#[test]
fn test_spawn_failure_clears_busy_and_alerts() {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_spawn_error_expectation(
        "a.mp4",
        CoreError::SpawnFailure(
            "ffmpeg".to_string(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        ),
    );
    let sink = RecordingSink::new();

    let invocation = Invocation::new("cut", args(&["-i", "a.mp4"]), OutputTarget::None);
    let result = runner(&spawner).run(invocation, sink.clone());

    let err = result.err().expect("spawn should fail");
    assert!(matches!(err, CoreError::SpawnFailure(..)));
    assert_eq!(
        sink.signals(),
        vec![
            Signal::Busy(true),
            Signal::Alert(err.user_message()),
            Signal::Busy(false),
        ]
    );
}

#[test]
fn test_wait_failure_alerts_before_clearing_busy() {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation(
        "a.mp4",
        MockScript {
            wait_fails: true,
            ..MockScript::default()
        },
    );
    let sink = RecordingSink::new();

    let invocation = Invocation::new("cut", args(&["-i", "a.mp4"]), OutputTarget::None);
    let err = runner(&spawner)
        .run(invocation, sink.clone())
        .unwrap()
        .wait()
        .unwrap_err();

    assert!(matches!(err, CoreError::CommandWait(..)));
    assert_eq!(
        sink.signals(),
        vec![
            Signal::Busy(true),
            Signal::Alert(err.user_message()),
            Signal::Busy(false),
        ]
    );
}

#[test]
fn test_stdin_payload_is_written() -> Result<(), Box<dyn std::error::Error>> {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation("concat", MockScript::success(""));

    let invocation = Invocation::new("merge", args(&["-f", "concat", "-i", "-"]), OutputTarget::None)
        .with_stdin("file 'a.mp4'\nfile 'b.mp4'".to_string());
    runner(&spawner).run(invocation, RecordingSink::new())?.wait()?;

    assert_eq!(spawner.stdin_of(0), "file 'a.mp4'\nfile 'b.mp4'");
    Ok(())
}

#[test]
fn test_piped_stdout_is_collected() -> Result<(), Box<dyn std::error::Error>> {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation(
        "pipe:1",
        MockScript {
            stdout: b"\x00\x00\x00\x18ftypiso5".to_vec(),
            ..MockScript::default()
        },
    );

    let invocation = Invocation::new("fast-transcode", args(&["-i", "a.avi", "pipe:1"]), OutputTarget::Pipe);
    let output = runner(&spawner).run(invocation, RecordingSink::new())?.wait()?;

    assert_eq!(output.stdout.as_deref(), Some(&b"\x00\x00\x00\x18ftypiso5"[..]));
    Ok(())
}

#[test]
fn test_stop_token_and_attached_observer() -> Result<(), Box<dyn std::error::Error>> {
    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation(
        "rec.mp4",
        MockScript {
            stderr: b"frame=1 time=00:00:01.00 bitrate=1\rframe=2 time=00:00:02.50 bitrate=1\r".to_vec(),
            wait_for_stdin: true,
            ..MockScript::default()
        },
    );
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let invocation = Invocation::new("record", args(&["-i", "desktop", "rec.mp4"]), OutputTarget::None)
        .with_delivery(Delivery::Capture);
    let mut handle = runner(&spawner).run(invocation, RecordingSink::new())?;
    handle.attach_observer(Box::new(TimeUpdateObserver::new(move |t| {
        seen_clone.lock().unwrap().push(t);
    })));
    handle.stop()?;
    handle.wait()?;

    assert_eq!(spawner.stdin_of(0), "q");
    assert_eq!(*seen.lock().unwrap(), vec![1.0, 2.5]);
    Ok(())
}
