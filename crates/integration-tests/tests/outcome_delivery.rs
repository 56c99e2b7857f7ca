//! Outcome delivery integration tests
//!
//! Exactly-once callback delivery, collector ordering before delivery and
//! engine-fault handling, through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rootshell_core::port::job::mocks::{Delivery, Script, ScriptedJob, SubmitCounter};
use rootshell_core::{
    Collector, ExecutionStatus, OneShot, OutputChannel, ResultCallback, ShellResult,
};

const WAIT: Duration = Duration::from_secs(5);

fn counted(calls: &Arc<AtomicUsize>) -> (ResultCallback, Arc<OneShot<ShellResult>>) {
    let outcome = Arc::new(OneShot::new());
    let (calls, completer) = (Arc::clone(calls), Arc::clone(&outcome));
    let callback = ResultCallback::new(move |result| {
        calls.fetch_add(1, Ordering::SeqCst);
        completer.complete(result);
    });
    (callback, outcome)
}

#[test]
fn test_every_delivery_mode_fires_exactly_once() {
    let modes = [
        Delivery::Background,
        Delivery::Inline,
        Delivery::DropCallback,
        Delivery::Panic,
    ];

    for mode in modes {
        let calls = Arc::new(AtomicUsize::new(0));
        let (callback, outcome) = counted(&calls);
        ScriptedJob::new(Script::success(&["x"]).delivered(mode.clone()))
            .boxed()
            .submit(callback);

        let result = outcome.wait_timeout(WAIT).expect("callback never fired");
        // Give a buggy engine the chance to fire a second time
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), 1, "mode {:?}", mode);

        let expected = match mode {
            Delivery::Background | Delivery::Inline => ExecutionStatus::Success,
            Delivery::DropCallback | Delivery::Panic => ExecutionStatus::NotExecuted,
        };
        assert_eq!(result.status(), expected, "mode {:?}", mode);
    }
}

#[test]
fn test_elements_precede_terminal_delivery() {
    let lines: Vec<String> = (0..50).map(|i| format!("line-{}", i)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let collector = Collector::new(move |line: String| sink_seen.lock().unwrap().push(line));

    let mut job = ScriptedJob::new(Script::success(&refs).with_err(&["warn"])).boxed();
    job.to(OutputChannel::Stdout, collector);

    let at_delivery = Arc::clone(&seen);
    let outcome = Arc::new(OneShot::new());
    let completer = Arc::clone(&outcome);
    job.submit(ResultCallback::new(move |result| {
        let count = at_delivery.lock().unwrap().len();
        completer.complete((result, count));
    }));

    let (result, count_at_delivery) = outcome.wait_timeout(WAIT).expect("no delivery");
    assert_eq!(count_at_delivery, 50);
    assert_eq!(*seen.lock().unwrap(), lines);
    // Unstreamed channel is still captured
    assert_eq!(result.err(), ["warn".to_string()]);
    assert!(result.out().is_empty());
}

#[test]
fn test_blocking_exec_equals_submit() {
    for script in [
        Script::success(&["ok"]),
        Script::failure(4).with_err(&["bad"]),
        Script::killed(),
    ] {
        let blocking = ScriptedJob::new(script.clone()).boxed().exec();

        let calls = Arc::new(AtomicUsize::new(0));
        let (callback, outcome) = counted(&calls);
        ScriptedJob::new(script.clone()).boxed().submit(callback);

        assert_eq!(Some(blocking.clone()), outcome.wait_timeout(WAIT));
        assert_eq!(blocking, script.expected_result());
    }
}

#[test]
fn test_fresh_job_per_execution() {
    let counter = SubmitCounter::default();
    let results: Vec<ShellResult> = (0..3)
        .map(|_| {
            ScriptedJob::with_counter(Script::success(&[]), counter.clone())
                .boxed()
                .exec()
        })
        .collect();

    assert!(results.iter().all(ShellResult::is_success));
    assert_eq!(counter.get(), 3);
}

#[test]
fn test_late_subscriber_sees_delivered_result() {
    let outcome = Arc::new(OneShot::new());
    let completer = Arc::clone(&outcome);
    ScriptedJob::new(Script::failure(1).delivered(Delivery::Inline))
        .boxed()
        .submit(ResultCallback::new(move |r| {
            completer.complete(r);
        }));

    let late = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&late);
    outcome.subscribe(move |r: ShellResult| *slot.lock().unwrap() = Some(r.code()));
    assert_eq!(*late.lock().unwrap(), Some(1));
}

#[test]
fn test_panicking_subscriber_does_not_block_others() {
    let outcome = Arc::new(OneShot::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    outcome.subscribe(|_: ShellResult| panic!("subscriber failure"));
    let slot = Arc::clone(&seen);
    outcome.subscribe(move |r: ShellResult| slot.lock().unwrap().push(r.code()));

    let completer = Arc::clone(&outcome);
    ScriptedJob::new(Script::failure(9).delivered(Delivery::Inline))
        .boxed()
        .submit(ResultCallback::new(move |r| {
            completer.complete(r);
        }));

    assert_eq!(*seen.lock().unwrap(), vec![9]);
}

#[test]
fn test_release_profile_keeps_unwinding() {
    // Subscriber isolation and the callback drop guard rely on unwinding
    let manifest = include_str!("../../../Cargo.toml");
    let release = manifest
        .split("[profile.release]")
        .nth(1)
        .expect("workspace manifest has a release profile");
    let release = release.split("\n[").next().unwrap_or_default();
    assert!(
        !release.contains("panic"),
        "release profile must not override the panic strategy"
    );
}
