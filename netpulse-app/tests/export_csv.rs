use jiff::Timestamp;
use jiff::tz::TimeZone;
use netpulse_app::config::{Config, ExportConfig};
use netpulse_app::export::ExportError;
use netpulse_app::shell::{Shell, ShellError};
use tokio_util::sync::CancellationToken;

fn shell_exporting_to(dir: &std::path::Path) -> Shell {
    let config = Config {
        export: ExportConfig {
            dir: dir.to_path_buf(),
        },
        ..Default::default()
    };
    Shell::new(&config, CancellationToken::new()).with_time_zone(TimeZone::UTC)
}

#[test]
fn export_writes_one_row_per_report_in_order() -> color_eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut shell = shell_exporting_to(dir.path());

    shell.execute("signup name=\"Ana Lima\" email=ana@example.com password=pw")?;
    let submissions = [
        ("2025-10-20T08:00:00Z", "report provider=jio signal=3 network=4g issue=no-signal location=Hoboken"),
        ("2025-10-21T09:30:00Z", "report provider=att signal=1 network=5g issue=call-drop location=\"Trenton, NJ\" weather=stormy"),
        ("2025-10-22T10:15:00Z", "report provider=other signal=5 network=lte issue=other location=Camden comments=\"fine again\""),
    ];
    for (when, line) in submissions {
        shell.execute_at(line, when.parse::<Timestamp>()?)?;
    }

    shell.execute("admin-login admin@netpulse.com admin123")?;
    let reply = shell.execute_at("export", "2025-10-22T12:00:00Z".parse::<Timestamp>()?)?;
    assert!(reply.output.starts_with("Exported 3 reports to "));

    let path = dir.path().join("netpulse-reports-2025-10-22.csv");
    let contents = std::fs::read_to_string(&path)?;
    assert_eq!(contents.lines().count(), 4);

    let mut reader = csv::Reader::from_path(&path)?;
    assert_eq!(
        reader.headers()?.iter().collect::<Vec<_>>(),
        [
            "ID",
            "Date",
            "Provider",
            "Signal",
            "Network Type",
            "Issue Type",
            "Location",
            "Weather",
            "User"
        ]
    );

    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    let locations: Vec<&str> = rows.iter().map(|row| &row[6]).collect();
    assert_eq!(locations, ["Camden", "Trenton, NJ", "Hoboken"]);

    assert_eq!(&rows[0][1], "2025-10-22 10:15:00");
    assert_eq!(&rows[1][7], "stormy");
    assert_eq!(&rows[2][7], "N/A");
    assert!(rows.iter().all(|row| &row[8] == "Ana Lima"));

    Ok(())
}

#[test]
fn empty_collection_exports_header_only() -> color_eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut shell = shell_exporting_to(dir.path());

    shell.execute("admin-login admin@netpulse.com admin123")?;
    shell.execute_at("export", "2025-10-22T12:00:00Z".parse::<Timestamp>()?)?;

    let contents = std::fs::read_to_string(dir.path().join("netpulse-reports-2025-10-22.csv"))?;
    assert_eq!(contents.lines().count(), 1);

    Ok(())
}

#[test]
fn non_admin_export_is_forbidden() -> color_eyre::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut shell = shell_exporting_to(dir.path());

    let err = shell.execute("export").unwrap_err();
    assert!(matches!(err, ShellError::Export(ExportError::Forbidden)));
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);

    Ok(())
}
