use netpulse_app::config::Config;
use netpulse_app::shell::{Shell, ShellError};
use netpulse_core::View;
use netpulse_speedtest::{SpeedTestError, SpeedTestEvent};
use tokio_util::sync::CancellationToken;

fn logged_in_shell() -> Result<Shell, ShellError> {
    let mut shell = Shell::new(&Config::default(), CancellationToken::new());
    shell.execute("login john@example.com secret")?;
    assert_eq!(shell.current_view(), View::Dashboard);
    Ok(shell)
}

#[tokio::test(start_paused = true)]
async fn completed_run_is_recorded() -> Result<(), ShellError> {
    let mut shell = logged_in_shell()?;

    let reply = shell.execute("speedtest")?;
    assert_eq!(reply.output, "Testing connection...");
    let mut run = reply.started.expect("speedtest starts a run");

    let mut printed = Vec::new();
    while let Some(event) = run.events.recv().await {
        if let Some(line) = shell.on_speed_test_event(event) {
            printed.push(line);
        }
    }

    assert_eq!(printed.len(), 3);
    assert_eq!(printed[0], "Testing download speed... 30%");
    assert_eq!(printed[1], "Testing upload speed... 60%");
    assert!(printed[2].starts_with("Speed test complete: Download "));

    let result = shell
        .session()
        .state()
        .last_speed_test
        .expect("result recorded");
    assert!((20..100).contains(&result.download_mbps));
    assert!((10..50).contains(&result.upload_mbps));
    assert!((10..40).contains(&result.ping_ms));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn second_start_is_rejected_while_running() -> Result<(), ShellError> {
    let mut shell = logged_in_shell()?;
    let _run = shell.execute("speedtest")?.started;

    let err = shell.execute("speedtest").unwrap_err();
    assert!(matches!(
        err,
        ShellError::SpeedTest(SpeedTestError::AlreadyRunning(_))
    ));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn leaving_the_dashboard_cancels_the_run() -> Result<(), ShellError> {
    let mut shell = logged_in_shell()?;
    let mut run = shell.execute("speedtest")?.started.expect("run");

    let reply = shell.execute("go about")?;
    assert!(reply.output.starts_with("Speed test cancelled."));

    while let Some(event) = run.events.recv().await {
        assert!(!matches!(event, SpeedTestEvent::Completed { .. }));
        assert!(shell.on_speed_test_event(event).is_none());
    }
    assert!(shell.session().state().last_speed_test.is_none());

    // A fresh run can start once back on the dashboard.
    shell.execute("go dashboard")?;
    assert!(shell.execute("speedtest")?.started.is_some());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn simulated_speeds_never_trigger_the_slow_hint() -> Result<(), ShellError> {
    let mut shell = logged_in_shell()?;
    let mut run = shell.execute("speedtest")?.started.expect("run");
    while let Some(event) = run.events.recv().await {
        shell.on_speed_test_event(event);
    }

    // Simulated speeds never drop below the suggestion thresholds.
    let reply = shell.execute("go report")?;
    assert!(!reply.output.contains("issue defaults to"));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_stopped_without_result_frees_the_meter() -> Result<(), ShellError> {
    let shutdown = CancellationToken::new();
    let mut shell = Shell::new(&Config::default(), shutdown.clone());
    shell.execute("login john@example.com secret")?;
    let mut run = shell.execute("speedtest")?.started.expect("run");

    shutdown.cancel();
    while let Some(event) = run.events.recv().await {
        assert!(!matches!(event, SpeedTestEvent::Completed { .. }));
        shell.on_speed_test_event(event);
    }

    assert_eq!(
        shell.on_speed_test_closed(run.id).as_deref(),
        Some("Speed test stopped without a result.")
    );
    assert!(shell.execute("speedtest")?.started.is_some());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn closing_after_completion_prints_nothing() -> Result<(), ShellError> {
    let mut shell = logged_in_shell()?;
    let mut run = shell.execute("speedtest")?.started.expect("run");
    while let Some(event) = run.events.recv().await {
        shell.on_speed_test_event(event);
    }

    assert!(shell.on_speed_test_closed(run.id).is_none());
    assert!(shell.session().state().last_speed_test.is_some());

    Ok(())
}
