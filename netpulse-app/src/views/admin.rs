use std::collections::{BTreeMap, HashSet};

use jiff::civil::Date;
use jiff::tz::TimeZone;
use netpulse_core::{IssueType, Provider, Report, Weather};
use ordered_float::OrderedFloat;

/// Response time has no data source yet.
pub const AVG_RESPONSE_PLACEHOLDER: &str = "2.3 hrs";

const PLACEHOLDER_TOTAL_REPORTS: usize = 186;
const PLACEHOLDER_ACTIVE_USERS: usize = 342;
const PLACEHOLDER_WEATHER_REPORTS: usize = 124;

const PLACEHOLDER_OVER_TIME: [(&str, usize); 8] = [
    ("Oct 15", 12),
    ("Oct 16", 19),
    ("Oct 17", 15),
    ("Oct 18", 25),
    ("Oct 19", 22),
    ("Oct 20", 30),
    ("Oct 21", 28),
    ("Oct 22", 35),
];

const PLACEHOLDER_PROVIDERS: [(&str, usize); 5] = [
    ("Airtel", 30),
    ("Jio", 25),
    ("Verizon", 20),
    ("T-Mobile", 15),
    ("AT&T", 10),
];

const PLACEHOLDER_ISSUES: [(&str, usize); 4] = [
    ("Call Drop", 45),
    ("No Signal", 38),
    ("Slow Internet", 52),
    ("Intermittent", 28),
];

const PLACEHOLDER_WEATHER: [(&str, usize, f64); 4] = [
    ("Sunny", 25, 4.2),
    ("Cloudy", 30, 3.8),
    ("Rainy", 45, 2.5),
    ("Stormy", 35, 1.8),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub reports: usize,
    pub active_users: usize,
    pub weather_reports: usize,
    pub avg_response: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPoint {
    pub label: String,
    pub value: usize,
}

impl ChartPoint {
    fn new(label: impl Into<String>, value: usize) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherImpact {
    pub label: String,
    pub reports: usize,
    /// Mean signal bars of the reports filed in this weather.
    pub avg_signal: OrderedFloat<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOverview {
    pub source: DataSource,
    pub totals: Totals,
    pub reports_over_time: Vec<ChartPoint>,
    pub by_provider: Vec<ChartPoint>,
    pub by_issue_type: Vec<ChartPoint>,
    pub weather_impact: Vec<WeatherImpact>,
}

pub fn admin_overview(reports: &[Report], tz: &TimeZone) -> AdminOverview {
    if reports.is_empty() {
        return placeholder_overview();
    }

    AdminOverview {
        source: DataSource::Live,
        totals: Totals {
            reports: reports.len(),
            active_users: reports
                .iter()
                .map(|r| &*r.submitted_by)
                .collect::<HashSet<_>>()
                .len(),
            weather_reports: reports.iter().filter(|r| r.weather.is_some()).count(),
            avg_response: AVG_RESPONSE_PLACEHOLDER,
        },
        reports_over_time: reports_per_day(reports, tz),
        by_provider: Provider::ALL
            .into_iter()
            .map(|p| ChartPoint::new(p.label(), reports.iter().filter(|r| r.provider == p).count()))
            .filter(|point| point.value > 0)
            .collect(),
        by_issue_type: IssueType::ALL
            .into_iter()
            .map(|i| ChartPoint::new(i.label(), reports.iter().filter(|r| r.issue_type == i).count()))
            .filter(|point| point.value > 0)
            .collect(),
        weather_impact: weather_impact(reports),
    }
}

fn reports_per_day(reports: &[Report], tz: &TimeZone) -> Vec<ChartPoint> {
    let mut per_day: BTreeMap<Date, usize> = BTreeMap::new();
    for report in reports {
        let day = report.submitted_at.to_zoned(tz.clone()).date();
        *per_day.entry(day).or_default() += 1;
    }

    per_day
        .into_iter()
        .map(|(day, count)| ChartPoint::new(day.strftime("%b %d").to_string(), count))
        .collect()
}

fn weather_impact(reports: &[Report]) -> Vec<WeatherImpact> {
    Weather::ALL
        .into_iter()
        .filter_map(|weather| {
            let (count, bars) = reports
                .iter()
                .filter(|r| r.weather == Some(weather))
                .fold((0usize, 0u32), |(count, bars), r| {
                    (count + 1, bars + u32::from(r.signal_strength.bars()))
                });
            (count > 0).then(|| WeatherImpact {
                label: weather.label().to_string(),
                reports: count,
                avg_signal: OrderedFloat(f64::from(bars) / count as f64),
            })
        })
        .collect()
}

fn placeholder_overview() -> AdminOverview {
    let points = |series: &[(&str, usize)]| -> Vec<ChartPoint> {
        series
            .iter()
            .map(|(label, value)| ChartPoint::new(*label, *value))
            .collect()
    };

    AdminOverview {
        source: DataSource::Placeholder,
        totals: Totals {
            reports: PLACEHOLDER_TOTAL_REPORTS,
            active_users: PLACEHOLDER_ACTIVE_USERS,
            weather_reports: PLACEHOLDER_WEATHER_REPORTS,
            avg_response: AVG_RESPONSE_PLACEHOLDER,
        },
        reports_over_time: points(&PLACEHOLDER_OVER_TIME),
        by_provider: points(&PLACEHOLDER_PROVIDERS),
        by_issue_type: points(&PLACEHOLDER_ISSUES),
        weather_impact: PLACEHOLDER_WEATHER
            .iter()
            .map(|(label, reports, avg)| WeatherImpact {
                label: label.to_string(),
                reports: *reports,
                avg_signal: OrderedFloat(*avg),
            })
            .collect(),
    }
}
