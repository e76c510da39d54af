use std::path::PathBuf;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use netpulse_core::{Provider, RunId, View, Weather};
use netpulse_speedtest::{Phase, SpeedTestError, SpeedTestEvent, SpeedTestMeter, SpeedTestRun};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::{Authenticator, LoginMode, SignUpForm};
use crate::config::Config;
use crate::contact::ContactForm;
use crate::error::{AuthError, ValidationError};
use crate::export::{ExportError, export_reports};
use crate::navigation::{NavigationError, Navigator, parse_view, resolve};
use crate::render::{Screen, SpeedTestSummary};
use crate::session::{ReportForm, Session};
use crate::views::ReportFilter;

pub const HELP: &str = "\
Commands:
  go <view>                   home, login, adminLogin, report, dashboard, admin, about
  show                        print the current view again
  login <email> <password>    sign in
  admin-login <email> <password>
  signup name=.. email=.. password=.. [location=..]
  logout
  report provider=.. signal=.. network=.. issue=.. location=.. [weather=..] [comments=..]
  speedtest                   run a speed test (dashboard only)
  filter [provider=..] [weather=..] [city=..]
                              narrow the admin table, `all` or no arguments clears
  export                      save all reports as CSV (admin only)
  contact first=.. last=.. email=.. message=..
  quit
Values containing spaces go in double quotes: location=\"Newark, NJ\"";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command `{0}`, try `help`")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("expected key=value, got `{0}`")]
    ExpectedField(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("the speed test runs from the dashboard")]
    NotOnDashboard,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    SpeedTest(#[from] SpeedTestError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What the front end should do after a command.
#[derive(Debug, Default)]
pub struct Reply {
    pub output: String,
    /// A speed test run whose events should be fed back through
    /// [`Shell::on_speed_test_event`].
    pub started: Option<SpeedTestRun>,
    pub quit: bool,
}

impl Reply {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Default::default()
        }
    }
}

pub struct Shell {
    session: Session,
    navigator: Navigator,
    auth: Authenticator,
    meter: SpeedTestMeter,
    /// Parent of every speed test run's token.
    shutdown: CancellationToken,
    export_dir: PathBuf,
    tz: TimeZone,
    admin_filter: ReportFilter,
    /// Phase and progress of the running speed test, as last reported.
    speed_test: Option<(Phase, u8)>,
}

impl Shell {
    pub fn new(config: &Config, shutdown: CancellationToken) -> Self {
        Self {
            session: Session::new(),
            navigator: Navigator::new(),
            auth: Authenticator::new(config.admin.clone(), config.demo_user.clone()),
            meter: SpeedTestMeter::new(config.speed_test.tick_interval()),
            shutdown,
            export_dir: config.export.dir.clone(),
            tz: TimeZone::system(),
            admin_filter: ReportFilter::default(),
            speed_test: None,
        }
    }

    /// Renders dates and buckets days in `tz` instead of the system zone.
    pub fn with_time_zone(mut self, tz: TimeZone) -> Self {
        self.tz = tz;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_view(&self) -> View {
        self.navigator.current()
    }

    pub fn screen(&self) -> String {
        Screen {
            view: self.navigator.current(),
            state: self.session.state(),
            admin_filter: &self.admin_filter,
            speed_test: self.speed_test,
            tz: &self.tz,
        }
        .to_string()
    }

    pub fn execute(&mut self, line: &str) -> Result<Reply, ShellError> {
        self.execute_at(line, Timestamp::now())
    }

    /// Runs one command line as if it were entered at `now`.
    pub fn execute_at(&mut self, line: &str, now: Timestamp) -> Result<Reply, ShellError> {
        let args = split_args(line)?;
        let Some((command, args)) = args.split_first() else {
            return Ok(Reply::default());
        };
        let command = command.to_ascii_lowercase();
        debug!(command = %command, args = args.len(), "executing command");

        match command.as_str() {
            "help" | "?" => Ok(Reply::text(HELP)),
            "show" => Ok(Reply::text(self.screen())),
            "go" => {
                let [view] = args else {
                    return Err(ShellError::Usage("go <view>"));
                };
                let view = parse_view(view)?;
                Ok(Reply::text(self.navigate(view)))
            }
            "login" => self.login(LoginMode::User, args),
            "admin-login" => self.login(LoginMode::Admin, args),
            "signup" => self.sign_up(args),
            "logout" => {
                self.cancel_speed_test();
                self.session.logout();
                self.admin_filter = ReportFilter::default();
                self.navigator.home();
                Ok(Reply::text(format!("Logged out.\n\n{}", self.screen())))
            }
            "report" => self.report(args, now),
            "speedtest" => self.start_speed_test(),
            "filter" => self.filter(args),
            "export" => self.export(now),
            "contact" => self.contact(args),
            "quit" | "exit" => Ok(Reply {
                quit: true,
                ..Default::default()
            }),
            other => Err(ShellError::UnknownCommand(other.to_string())),
        }
    }

    /// Applies an event from the running speed test. Returns a line to print,
    /// if the event is worth one.
    pub fn on_speed_test_event(&mut self, event: SpeedTestEvent) -> Option<String> {
        match event {
            SpeedTestEvent::Progress {
                run,
                phase,
                progress,
            } => {
                if self.meter.active_run() != Some(run) {
                    return None;
                }
                let previous = self.speed_test.replace((phase, progress));
                // One line per phase, at its first tick.
                (previous.map(|(p, _)| p) != Some(phase))
                    .then(|| format!("{} {progress}%", phase.status_line()))
            }
            SpeedTestEvent::Completed { run, result } => {
                if !self.meter.finish(run) {
                    return None;
                }
                self.speed_test = None;
                self.session.record_speed_test(result);
                Some(format!("Speed test complete: {}", SpeedTestSummary(&result)))
            }
        }
    }

    /// Called when a run's event channel closes. Frees the meter if the run
    /// ended without reporting a result.
    pub fn on_speed_test_closed(&mut self, run: RunId) -> Option<String> {
        if !self.meter.closed(run) {
            return None;
        }
        self.speed_test = None;
        Some("Speed test stopped without a result.".to_string())
    }

    /// Navigates to `target`, cancelling a running speed test when the
    /// dashboard is left, and returns the rendered view.
    fn navigate(&mut self, target: View) -> String {
        let leaving_dashboard = self.navigator.current() == View::Dashboard;
        let shown = self.navigator.go_to(target, self.session.identity());

        let mut out = String::new();
        if leaving_dashboard && shown != View::Dashboard && self.cancel_speed_test() {
            out.push_str("Speed test cancelled.\n\n");
        }
        out.push_str(&self.screen());
        out
    }

    fn cancel_speed_test(&mut self) -> bool {
        self.speed_test = None;
        self.meter.cancel().is_some()
    }

    fn login(&mut self, mode: LoginMode, args: &[String]) -> Result<Reply, ShellError> {
        let arg = |index: usize| args.get(index).map_or("", String::as_str);
        let identity = self.auth.login(mode, arg(0), arg(1))?;

        let greeting = format!("Welcome, {}!\n\n", identity.display_name);
        self.session.login(identity);
        let target = match mode {
            LoginMode::User => View::Dashboard,
            LoginMode::Admin => View::Admin,
        };
        Ok(Reply::text(greeting + &self.navigate(target)))
    }

    fn sign_up(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let mut form = SignUpForm::default();
        for (key, value) in fields(args)? {
            match key.as_str() {
                "name" => form.name = value,
                "email" => form.email = value,
                "password" => form.password = value,
                "location" => form.location = value,
                _ => return Err(ShellError::UnknownField(key)),
            }
        }

        let identity = self.auth.sign_up(&form)?;
        info!(user = %identity.display_name, "account created");

        let greeting = format!("Account created. Welcome, {}!\n\n", identity.display_name);
        self.session.login(identity);
        Ok(Reply::text(greeting + &self.navigate(View::Dashboard)))
    }

    fn report(&mut self, args: &[String], now: Timestamp) -> Result<Reply, ShellError> {
        if resolve(View::Report, self.session.identity()) != View::Report {
            let screen = self.navigate(View::Report);
            return Ok(Reply::text(format!(
                "Please log in to report an issue.\n\n{screen}"
            )));
        }

        let mut form = ReportForm::prefilled(self.session.state());
        for (key, value) in fields(args)? {
            match key.as_str() {
                "provider" => form.provider = value,
                "signal" | "signal-strength" => form.signal_strength = value,
                "network" | "network-type" => form.network_type = value,
                "issue" | "issue-type" => form.issue_type = value,
                "location" => form.location = value,
                "weather" => form.weather = value,
                "comments" => form.comments = value,
                _ => return Err(ShellError::UnknownField(key)),
            }
        }

        self.session.submit_report(&form, now)?;
        Ok(Reply::text(format!(
            "Report submitted successfully! You earned {} points!\n\n{}",
            netpulse_core::POINTS_PER_REPORT,
            self.navigate(View::Dashboard)
        )))
    }

    fn start_speed_test(&mut self) -> Result<Reply, ShellError> {
        if self.navigator.current() != View::Dashboard {
            return Err(ShellError::NotOnDashboard);
        }

        let run = self.meter.start(&self.shutdown)?;
        self.speed_test = Some((Phase::Ping, 0));
        Ok(Reply {
            output: Phase::Ping.status_line().to_string(),
            started: Some(run),
            quit: false,
        })
    }

    fn filter(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let mut filter = if args.is_empty() {
            ReportFilter::default()
        } else {
            self.admin_filter.clone()
        };

        for (key, value) in fields(args)? {
            let value = value.trim();
            let all = value.is_empty() || value.eq_ignore_ascii_case("all");
            match key.as_str() {
                "provider" if all => filter.provider = None,
                "provider" => filter.provider = Some(parse_field::<Provider>("provider", value)?),
                "weather" if all => filter.weather = None,
                "weather" => filter.weather = Some(parse_field::<Weather>("weather", value)?),
                "city" => filter.city = (!all).then(|| value.to_string()),
                _ => return Err(ShellError::UnknownField(key)),
            }
        }

        self.admin_filter = filter;
        Ok(Reply::text(self.navigate(View::Admin)))
    }

    fn export(&mut self, now: Timestamp) -> Result<Reply, ShellError> {
        let today = now.to_zoned(self.tz.clone()).date();
        let path = export_reports(self.session.state(), &self.export_dir, today, &self.tz)?;
        Ok(Reply::text(format!(
            "Exported {} reports to {}",
            self.session.state().reports.len(),
            path.display()
        )))
    }

    fn contact(&mut self, args: &[String]) -> Result<Reply, ShellError> {
        let mut form = ContactForm::default();
        for (key, value) in fields(args)? {
            match key.as_str() {
                "first" | "first-name" => form.first_name = value,
                "last" | "last-name" => form.last_name = value,
                "email" => form.email = value,
                "message" => form.message = value,
                _ => return Err(ShellError::UnknownField(key)),
            }
        }
        Ok(Reply::text(form.submit()?))
    }
}

fn parse_field<T>(field: &'static str, value: &str) -> Result<T, ValidationError>
where
    T: std::str::FromStr<Err = netpulse_core::UnknownVariant>,
{
    value
        .parse()
        .map_err(|source| ValidationError::Invalid { field, source })
}

/// Splits a command line on whitespace. Double quotes group words and are
/// dropped from the result.
fn split_args(line: &str) -> Result<Vec<String>, ShellError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if quoted {
        return Err(ShellError::UnterminatedQuote);
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

/// Parses `key=value` arguments. Keys are lowercased.
fn fields(args: &[String]) -> Result<Vec<(String, String)>, ShellError> {
    args.iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.to_string()))
                .ok_or_else(|| ShellError::ExpectedField(arg.clone()))
        })
        .collect()
}
