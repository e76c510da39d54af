use std::fmt;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use netpulse_core::{
    IssueType, NetworkType, Provider, Report, SignalStrength, SpeedTestResult, View, Weather,
};
use netpulse_speedtest::{Phase, SpeedGrade};

use crate::session::{ReportForm, SessionState};
use crate::views::{
    AdminOverview, DataSource, LevelProgress, ReportFilter, admin_overview, badges, leaderboard,
    points_for_user, query_reports, recent_reports,
};

/// Longest bar drawn in a text chart.
const MAX_BAR: usize = 40;

/// One view as it would be shown for the current state.
pub struct Screen<'a> {
    pub view: View,
    pub state: &'a SessionState,
    pub admin_filter: &'a ReportFilter,
    /// Phase and progress of a running speed test.
    pub speed_test: Option<(Phase, u8)>,
    pub tz: &'a TimeZone,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view {
            View::Home => home(f),
            View::About => about(f),
            View::Login => login(f),
            View::AdminLogin => admin_login(f),
            View::Report => report_form(f, &ReportForm::prefilled(self.state)),
            View::Dashboard => self.dashboard(f),
            View::Admin => self.admin(f),
        }
    }
}

impl Screen<'_> {
    fn dashboard(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(identity) = &self.state.identity else {
            return login(f);
        };
        let name = &*identity.display_name;
        let reports = &self.state.reports;

        writeln!(f, "== Dashboard ==")?;
        writeln!(
            f,
            "[{}] {}  ({})",
            identity.initials(),
            name,
            identity.home_location
        )?;

        let level = LevelProgress::for_points(points_for_user(reports, name));
        writeln!(
            f,
            "Points: {}   {}% of the way to {}",
            level.points, level.percent, level.next_level
        )?;

        writeln!(f, "\nBadges:")?;
        for badge in badges(reports, name) {
            let mark = if badge.earned { "x" } else { " " };
            writeln!(
                f,
                "  [{mark}] {} - {}",
                badge.kind.name(),
                badge.kind.description()
            )?;
        }

        writeln!(f, "\nRecent reports:")?;
        let recent = recent_reports(reports, name);
        if recent.is_empty() {
            writeln!(f, "  none yet, use `go report` to file one")?;
        }
        for report in recent {
            writeln!(f, "  {}", ReportLine { report, tz: self.tz })?;
        }

        writeln!(f, "\nLeaderboard:")?;
        for standing in leaderboard(reports, Some(name)) {
            let marker = if standing.is_current { " <- you" } else { "" };
            writeln!(
                f,
                "  {:>2}. {:<16} {:>5} pts{marker}",
                standing.rank, standing.name, standing.points
            )?;
        }

        writeln!(f, "\nSpeed test:")?;
        match (self.speed_test, &self.state.last_speed_test) {
            (Some((phase, progress)), _) => {
                writeln!(f, "  {} {progress}%", phase.status_line())?;
            }
            (None, Some(result)) => writeln!(f, "  {}", SpeedTestSummary(result))?,
            (None, None) => writeln!(f, "  not run yet, use `speedtest`")?,
        }
        Ok(())
    }

    fn admin(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overview = admin_overview(&self.state.reports, self.tz);
        overview_section(f, &overview)?;

        writeln!(f, "\nReports:")?;
        let rows = query_reports(&self.state.reports, self.admin_filter);
        if rows.is_empty() {
            writeln!(f, "  no reports match")?;
        }
        for report in rows {
            writeln!(
                f,
                "  #{} {}  by {}",
                report.id.0,
                ReportLine { report, tz: self.tz },
                report.submitted_by
            )?;
        }
        writeln!(f, "\nNarrow with `filter provider=.. weather=.. city=..`, save with `export`.")
    }
}

fn overview_section(f: &mut fmt::Formatter<'_>, overview: &AdminOverview) -> fmt::Result {
    let source = match overview.source {
        DataSource::Live => "live data",
        DataSource::Placeholder => "sample data",
    };
    writeln!(f, "== Admin analytics ({source}) ==")?;

    let totals = &overview.totals;
    writeln!(
        f,
        "Total reports: {}   Active users: {}   Weather reports: {}   Avg response: {}",
        totals.reports, totals.active_users, totals.weather_reports, totals.avg_response
    )?;

    for (title, series) in [
        ("Reports over time", &overview.reports_over_time),
        ("By provider", &overview.by_provider),
        ("By issue type", &overview.by_issue_type),
    ] {
        writeln!(f, "\n{title}:")?;
        for point in series {
            writeln!(
                f,
                "  {:<14} {} {}",
                point.label,
                "#".repeat(point.value.min(MAX_BAR)),
                point.value
            )?;
        }
    }

    writeln!(f, "\nWeather impact:")?;
    for impact in &overview.weather_impact {
        writeln!(
            f,
            "  {:<8} {:>3} reports   avg signal {:.1}",
            impact.label, impact.reports, impact.avg_signal.0
        )?;
    }
    Ok(())
}

fn report_form(f: &mut fmt::Formatter<'_>, form: &ReportForm) -> fmt::Result {
    writeln!(f, "== Report an issue ==")?;
    writeln!(f, "  provider  {}", choices(Provider::ALL.map(|p| p.as_str())))?;
    writeln!(
        f,
        "  signal    {}..{}",
        SignalStrength::MIN,
        SignalStrength::MAX
    )?;
    writeln!(f, "  network   {}", choices(NetworkType::ALL.map(|n| n.as_str())))?;
    writeln!(f, "  issue     {}", choices(IssueType::ALL.map(|i| i.as_str())))?;
    writeln!(f, "  location  free text")?;
    writeln!(f, "  weather   {} (optional)", choices(Weather::ALL.map(|w| w.as_str())))?;
    writeln!(f, "  comments  free text (optional)")?;

    if !form.location.is_empty() {
        writeln!(f, "\nLocation defaults to {:?}.", form.location)?;
    }
    if !form.issue_type.is_empty() {
        writeln!(
            f,
            "Your last speed test was slow, issue defaults to {}.",
            form.issue_type
        )?;
    }
    writeln!(
        f,
        "\nExample: report provider=jio signal=3 network=4g issue=no-signal location=\"Newark, NJ\""
    )
}

fn choices<const N: usize>(values: [&str; N]) -> String {
    values.join(" | ")
}

fn home(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "== NetPulse ==")?;
    writeln!(f, "Report network outages, see what others are hitting, earn points.")?;
    writeln!(f)?;
    writeln!(f, "  go login        sign in or create an account")?;
    writeln!(f, "  go report       report a network issue")?;
    writeln!(f, "  go dashboard    your points, badges and speed test")?;
    writeln!(f, "  go about        what NetPulse is")?;
    writeln!(f, "  contact ...     send us a message")?;
    writeln!(f, "  help            every command")
}

fn about(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "== About NetPulse ==")?;
    writeln!(
        f,
        "NetPulse collects network issue reports from the people who hit them:"
    )?;
    writeln!(
        f,
        "dropped calls, dead zones and slow data, together with the provider,"
    )?;
    writeln!(f, "network type, location and weather at the time.")?;
    writeln!(f)?;
    writeln!(
        f,
        "Every report earns points. Badges and the leaderboard reward regular reporters,"
    )?;
    writeln!(f, "and the admin view aggregates the reports by day, provider and weather.")
}

fn login(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "== Login ==")?;
    writeln!(f, "  login <email> <password>")?;
    writeln!(f, "  signup name=<name> email=<email> password=<password> [location=<city>]")?;
    writeln!(f, "  go adminLogin    for the admin console")
}

fn admin_login(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "== Admin login ==")?;
    writeln!(f, "  admin-login <email> <password>")
}

/// One report as a single table row.
struct ReportLine<'a> {
    report: &'a Report,
    tz: &'a TimeZone,
}

impl fmt::Display for ReportLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        write!(
            f,
            "{}  {:<8} {:<3} {:<13} {}/5  {}",
            local_time(report.submitted_at, self.tz),
            report.provider.label(),
            report.network_type.as_str(),
            report.issue_type.label(),
            report.signal_strength.bars(),
            report.location
        )?;
        if let Some(weather) = report.weather {
            write!(f, "  ({})", weather.label())?;
        }
        Ok(())
    }
}

fn local_time(at: Timestamp, tz: &TimeZone) -> String {
    at.to_zoned(tz.clone()).strftime("%Y-%m-%d %H:%M").to_string()
}

/// A finished speed test with its grades.
pub struct SpeedTestSummary<'a>(pub &'a SpeedTestResult);

impl fmt::Display for SpeedTestSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        write!(
            f,
            "Download {} Mbps ({})  Upload {} Mbps ({})  Ping {} ms",
            result.download_mbps,
            SpeedGrade::download(result.download_mbps).label(),
            result.upload_mbps,
            SpeedGrade::upload(result.upload_mbps).label(),
            result.ping_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use netpulse_core::Identity;

    use super::*;

    fn render(view: View, state: &SessionState) -> String {
        Screen {
            view,
            state,
            admin_filter: &ReportFilter::default(),
            speed_test: None,
            tz: &TimeZone::UTC,
        }
        .to_string()
    }

    #[test]
    fn speed_test_summary_grades_both_directions() {
        let result = SpeedTestResult {
            download_mbps: 30,
            upload_mbps: 10,
            ping_ms: 12,
            measured_at: Timestamp::UNIX_EPOCH,
        };
        assert_eq!(
            SpeedTestSummary(&result).to_string(),
            "Download 30 Mbps (Fair)  Upload 10 Mbps (Poor)  Ping 12 ms"
        );
    }

    #[test]
    fn dashboard_shows_identity_and_badges() {
        let state = SessionState {
            identity: Some(Identity {
                display_name: "Jane Roe".into(),
                contact_email: "jane@example.com".into(),
                home_location: "Hoboken, NJ".into(),
                is_privileged: false,
            }),
            ..Default::default()
        };
        let out = render(View::Dashboard, &state);
        assert!(out.contains("[JR] Jane Roe  (Hoboken, NJ)"));
        assert!(out.contains("[ ] First Report"));
        assert!(out.contains("not run yet"));
    }

    #[test]
    fn admin_marks_sample_data() {
        let out = render(View::Admin, &SessionState::default());
        assert!(out.contains("(sample data)"));
        assert!(out.contains("no reports match"));
    }
}
