//! Session state container and its transitions.
//!
//! [`reduce`] is the only place state changes. It is a pure function of the
//! previous state and an [`Action`]; anything that depends on the outside
//! world (the clock, form validation) is resolved before the action is built.

use jiff::Timestamp;
use netpulse_core::{
    ANONYMOUS, Identity, IssueType, NetworkType, Provider, Report, ReportId, SignalStrength,
    SpeedTestResult, Weather,
};
use tracing::{debug, info};

use crate::error::{ValidationError, optional, required, required_line};

/// Download/upload speeds under which the report form suggests a slow
/// internet issue.
const SLOW_DOWNLOAD_MBPS: u32 = 10;
const SLOW_UPLOAD_MBPS: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// Most recent first.
    pub reports: Vec<Report>,
    pub last_speed_test: Option<SpeedTestResult>,
}

/// Raw report form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub provider: String,
    pub signal_strength: String,
    pub network_type: String,
    pub issue_type: String,
    pub location: String,
    pub weather: String,
    pub comments: String,
}

/// A validated report form, not yet stamped with id, time or submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub provider: Provider,
    pub signal_strength: SignalStrength,
    pub network_type: NetworkType,
    pub issue_type: IssueType,
    pub location: Box<str>,
    pub weather: Option<Weather>,
    pub comments: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Login(Identity),
    Logout,
    SubmitReport { draft: ReportDraft, at: Timestamp },
    RecordSpeedTest(SpeedTestResult),
}

impl ReportForm {
    /// A blank form as the report view presents it: location taken from the
    /// identity's home, issue type suggested from a slow speed test.
    pub fn prefilled(state: &SessionState) -> Self {
        let mut form = ReportForm {
            location: state
                .identity
                .as_ref()
                .map(|identity| identity.home_location.to_string())
                .unwrap_or_default(),
            ..Default::default()
        };

        if let Some(issue) = state.last_speed_test.as_ref().and_then(suggested_issue_type) {
            form.issue_type = issue.as_str().to_string();
        }

        form
    }

    pub fn validate(&self) -> Result<ReportDraft, ValidationError> {
        let provider = parse("provider", &self.provider)?;
        let signal_strength = parse("signal strength", &self.signal_strength)?;
        let network_type = parse("network type", &self.network_type)?;
        let issue_type = parse("issue type", &self.issue_type)?;
        let location = required_line("location", &self.location)?;

        let weather = optional(&self.weather)
            .map(|weather| {
                weather
                    .parse::<Weather>()
                    .map_err(|source| ValidationError::Invalid {
                        field: "weather",
                        source,
                    })
            })
            .transpose()?;

        Ok(ReportDraft {
            provider,
            signal_strength,
            network_type,
            issue_type,
            location: location.into(),
            weather,
            comments: optional(&self.comments).map(Into::into),
        })
    }
}

fn parse<T>(field: &'static str, value: &str) -> Result<T, ValidationError>
where
    T: std::str::FromStr<Err = netpulse_core::UnknownVariant>,
{
    required(field, value)?
        .parse()
        .map_err(|source| ValidationError::Invalid { field, source })
}

pub fn suggested_issue_type(result: &SpeedTestResult) -> Option<IssueType> {
    (result.download_mbps < SLOW_DOWNLOAD_MBPS || result.upload_mbps < SLOW_UPLOAD_MBPS)
        .then_some(IssueType::SlowInternet)
}

/// Applies `action` to `state`.
pub fn reduce(mut state: SessionState, action: Action) -> SessionState {
    match action {
        Action::Login(identity) => {
            info!(user = %identity.display_name, privileged = identity.is_privileged, "logged in");
            state.identity = Some(identity);
        }
        Action::Logout => {
            if let Some(identity) = state.identity.take() {
                info!(user = %identity.display_name, "logged out");
            }
        }
        Action::SubmitReport { draft, at } => {
            let report = Report {
                id: next_report_id(&state, at),
                provider: draft.provider,
                signal_strength: draft.signal_strength,
                network_type: draft.network_type,
                issue_type: draft.issue_type,
                location: draft.location,
                weather: draft.weather,
                comments: draft.comments,
                submitted_at: at,
                submitted_by: state
                    .identity
                    .as_ref()
                    .map(|identity| identity.display_name.clone())
                    .unwrap_or_else(|| ANONYMOUS.into()),
                measurement: state.last_speed_test.as_ref().map(|r| r.measurement()),
            };
            info!(
                report_id = report.id.0,
                user = %report.submitted_by,
                provider = report.provider.as_str(),
                issue = report.issue_type.as_str(),
                "report submitted"
            );
            state.reports.insert(0, report);
        }
        Action::RecordSpeedTest(result) => {
            debug!(download_mbps = result.download_mbps, "speed test recorded");
            state.last_speed_test = Some(result);
        }
    }
    state
}

/// Millisecond submission time, bumped past the newest id when the clock
/// has not moved forward.
fn next_report_id(state: &SessionState, at: Timestamp) -> ReportId {
    let from_clock = at.as_millisecond();
    match state.reports.first() {
        Some(latest) if latest.id.0 >= from_clock => ReportId(latest.id.0 + 1),
        _ => ReportId(from_clock),
    }
}

/// Owns the current [`SessionState`] and exposes the transitions.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity.as_ref()
    }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    pub fn login(&mut self, identity: Identity) {
        self.dispatch(Action::Login(identity));
    }

    pub fn logout(&mut self) {
        self.dispatch(Action::Logout);
    }

    /// Validates `form` and appends the resulting report. A rejected form
    /// leaves the session untouched.
    pub fn submit_report(&mut self, form: &ReportForm, at: Timestamp) -> Result<&Report, ValidationError> {
        let draft = form.validate().inspect_err(|e| {
            debug!(field = e.field(), error = %e, "report rejected");
        })?;
        self.dispatch(Action::SubmitReport { draft, at });
        Ok(&self.state.reports[0])
    }

    pub fn record_speed_test(&mut self, result: SpeedTestResult) {
        self.dispatch(Action::RecordSpeedTest(result));
    }
}
