use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

type BoxStr = Box<str>;

/// Display name stamped on reports submitted without an identity.
pub const ANONYMOUS: &str = "Anonymous";

/// Points awarded for every submitted report.
pub const POINTS_PER_REPORT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub i64);

/// Identifies one speed test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// The logged-in user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: BoxStr,
    pub contact_email: BoxStr,
    pub home_location: BoxStr,
    #[serde(default)]
    pub is_privileged: bool,
}

impl Identity {
    /// Initials shown on the dashboard avatar, `U` when the name has none.
    pub fn initials(&self) -> String {
        let initials: String = self
            .display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Airtel,
    Jio,
    Verizon,
    #[serde(rename = "tmobile")]
    TMobile,
    #[serde(rename = "att")]
    Att,
    Other,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::Airtel,
        Provider::Jio,
        Provider::Verizon,
        Provider::TMobile,
        Provider::Att,
        Provider::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Airtel => "airtel",
            Provider::Jio => "jio",
            Provider::Verizon => "verizon",
            Provider::TMobile => "tmobile",
            Provider::Att => "att",
            Provider::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Airtel => "Airtel",
            Provider::Jio => "Jio",
            Provider::Verizon => "Verizon",
            Provider::TMobile => "T-Mobile",
            Provider::Att => "AT&T",
            Provider::Other => "Other",
        }
    }
}

impl FromStr for Provider {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s || p.label().eq_ignore_ascii_case(&s))
            .ok_or_else(|| UnknownVariant::new("provider", &s))
    }
}

/// Bars of signal reported by the user, 1 (very weak) to 5 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SignalStrength(u8);

impl SignalStrength {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(bars: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&bars).then_some(Self(bars))
    }

    pub fn bars(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Very Weak",
            2 => "Weak",
            3 => "Moderate",
            4 => "Good",
            _ => "Excellent",
        }
    }
}

impl TryFrom<u8> for SignalStrength {
    type Error = UnknownVariant;

    fn try_from(bars: u8) -> Result<Self, Self::Error> {
        Self::new(bars).ok_or_else(|| UnknownVariant::new("signal strength", &bars.to_string()))
    }
}

impl From<SignalStrength> for u8 {
    fn from(signal: SignalStrength) -> Self {
        signal.0
    }
}

impl FromStr for SignalStrength {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| UnknownVariant::new("signal strength", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "5g")]
    FiveG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "lte")]
    Lte,
}

impl NetworkType {
    pub const ALL: [NetworkType; 4] = [
        NetworkType::FourG,
        NetworkType::FiveG,
        NetworkType::ThreeG,
        NetworkType::Lte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::FourG => "4g",
            NetworkType::FiveG => "5g",
            NetworkType::ThreeG => "3g",
            NetworkType::Lte => "lte",
        }
    }
}

impl FromStr for NetworkType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        NetworkType::ALL
            .into_iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("network type", &s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    CallDrop,
    NoSignal,
    SlowInternet,
    Intermittent,
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::CallDrop,
        IssueType::NoSignal,
        IssueType::SlowInternet,
        IssueType::Intermittent,
        IssueType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::CallDrop => "call-drop",
            IssueType::NoSignal => "no-signal",
            IssueType::SlowInternet => "slow-internet",
            IssueType::Intermittent => "intermittent",
            IssueType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueType::CallDrop => "Call Drop",
            IssueType::NoSignal => "No Signal",
            IssueType::SlowInternet => "Slow Internet",
            IssueType::Intermittent => "Intermittent",
            IssueType::Other => "Other",
        }
    }
}

impl FromStr for IssueType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        IssueType::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("issue type", &s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
}

impl Weather {
    pub const ALL: [Weather; 6] = [
        Weather::Sunny,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Stormy,
        Weather::Snowy,
        Weather::Foggy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Stormy => "stormy",
            Weather::Snowy => "snowy",
            Weather::Foggy => "foggy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Weather::Sunny => "Sunny",
            Weather::Cloudy => "Cloudy",
            Weather::Rainy => "Rainy",
            Weather::Stormy => "Stormy",
            Weather::Snowy => "Snowy",
            Weather::Foggy => "Foggy",
        }
    }
}

impl FromStr for Weather {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Weather::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("weather", &s))
    }
}

/// Measurement copied onto a report from the session's current speed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub download_mbps: u32,
    pub upload_mbps: u32,
    pub ping_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedTestResult {
    pub download_mbps: u32,
    pub upload_mbps: u32,
    pub ping_ms: u32,
    pub measured_at: jiff::Timestamp,
}

impl SpeedTestResult {
    pub fn measurement(&self) -> Measurement {
        Measurement {
            download_mbps: self.download_mbps,
            upload_mbps: self.upload_mbps,
            ping_ms: self.ping_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub provider: Provider,
    pub signal_strength: SignalStrength,
    pub network_type: NetworkType,
    pub issue_type: IssueType,
    pub location: BoxStr,
    pub weather: Option<Weather>,
    pub comments: Option<BoxStr>,
    pub submitted_at: jiff::Timestamp,
    pub submitted_by: BoxStr,
    pub measurement: Option<Measurement>,
}

/// Logical routes of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Home,
    Login,
    AdminLogin,
    Report,
    Dashboard,
    Admin,
    About,
}

impl View {
    pub const ALL: [View; 7] = [
        View::Home,
        View::Login,
        View::AdminLogin,
        View::Report,
        View::Dashboard,
        View::Admin,
        View::About,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Login => "login",
            View::AdminLogin => "adminLogin",
            View::Report => "report",
            View::Dashboard => "dashboard",
            View::Admin => "admin",
            View::About => "about",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        View::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .or_else(|| s.eq_ignore_ascii_case("admin-login").then_some(View::AdminLogin))
            .ok_or_else(|| UnknownVariant::new("view", s))
    }
}
