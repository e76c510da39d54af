use std::collections::HashSet;

use netpulse_core::{POINTS_PER_REPORT, Report};

use super::leaderboard::{Standing, leaderboard};

/// How many reports the dashboard lists under "Recent Reports".
pub const RECENT_REPORTS: usize = 5;

/// Leaderboard rank needed for the Community Star badge.
const COMMUNITY_STAR_RANK: usize = 10;

pub fn reports_for_user<'a>(reports: &'a [Report], name: &str) -> Vec<&'a Report> {
    reports
        .iter()
        .filter(|report| &*report.submitted_by == name)
        .collect()
}

pub fn points_for_user(reports: &[Report], name: &str) -> u32 {
    POINTS_PER_REPORT * reports_for_user(reports, name).len() as u32
}

pub fn recent_reports<'a>(reports: &'a [Report], name: &str) -> Vec<&'a Report> {
    let mut mine = reports_for_user(reports, name);
    mine.truncate(RECENT_REPORTS);
    mine
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgress {
    pub points: u32,
    pub next_level: u32,
    /// Percent of the way from the previous hundred to `next_level`.
    pub percent: u32,
}

impl LevelProgress {
    pub fn for_points(points: u32) -> Self {
        Self {
            points,
            next_level: points.div_ceil(100) * 100,
            percent: points % 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    FirstReport,
    ConsistentReporter,
    WeatherWatcher,
    NetworkGuru,
    CommunityStar,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 5] = [
        BadgeKind::FirstReport,
        BadgeKind::ConsistentReporter,
        BadgeKind::WeatherWatcher,
        BadgeKind::NetworkGuru,
        BadgeKind::CommunityStar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BadgeKind::FirstReport => "First Report",
            BadgeKind::ConsistentReporter => "Consistent Reporter",
            BadgeKind::WeatherWatcher => "Weather Watcher",
            BadgeKind::NetworkGuru => "Network Guru",
            BadgeKind::CommunityStar => "Community Star",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BadgeKind::FirstReport => "Submitted your first report",
            BadgeKind::ConsistentReporter => "Submitted 5+ reports",
            BadgeKind::WeatherWatcher => "Reported during different weather conditions",
            BadgeKind::NetworkGuru => "Submitted 20+ reports",
            BadgeKind::CommunityStar => "Top 10 contributor",
        }
    }

    fn earned(&self, mine: &[&Report], standing: Option<&Standing>) -> bool {
        match self {
            BadgeKind::FirstReport => !mine.is_empty(),
            BadgeKind::ConsistentReporter => mine.len() >= 5,
            BadgeKind::WeatherWatcher => {
                let conditions: HashSet<_> = mine.iter().filter_map(|r| r.weather).collect();
                conditions.len() >= 3
            }
            BadgeKind::NetworkGuru => mine.len() >= 20,
            BadgeKind::CommunityStar => {
                !mine.is_empty() && standing.is_some_and(|s| s.rank <= COMMUNITY_STAR_RANK)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub kind: BadgeKind,
    pub earned: bool,
}

/// Every badge in display order, each marked earned or not.
pub fn badges(reports: &[Report], name: &str) -> Vec<Badge> {
    let mine = reports_for_user(reports, name);
    let board = leaderboard(reports, Some(name));
    let standing = board.iter().find(|s| s.is_current);

    BadgeKind::ALL
        .into_iter()
        .map(|kind| Badge {
            kind,
            earned: kind.earned(&mine, standing),
        })
        .collect()
}

pub fn badges_earned(reports: &[Report], name: &str) -> Vec<BadgeKind> {
    badges(reports, name)
        .into_iter()
        .filter(|badge| badge.earned)
        .map(|badge| badge.kind)
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use netpulse_core::{IssueType, NetworkType, Provider, ReportId, SignalStrength, Weather};

    use super::*;

    fn report(id: i64, by: &str, weather: Option<Weather>) -> Report {
        Report {
            id: ReportId(id),
            provider: Provider::Airtel,
            signal_strength: SignalStrength::new(2).unwrap(),
            network_type: NetworkType::Lte,
            issue_type: IssueType::Intermittent,
            location: "Newark, NJ".into(),
            weather,
            comments: None,
            submitted_at: Timestamp::from_millisecond(id).unwrap(),
            submitted_by: by.into(),
            measurement: None,
        }
    }

    fn many(by: &str, count: i64) -> Vec<Report> {
        (0..count).rev().map(|id| report(id, by, None)).collect()
    }

    #[test]
    fn points_are_ten_per_own_report() {
        let mut reports = many("J", 3);
        reports.extend(many("K", 2));
        assert_eq!(points_for_user(&reports, "J"), 30);
        assert_eq!(points_for_user(&reports, "K"), 20);
        assert_eq!(points_for_user(&reports, "nobody"), 0);
    }

    #[test]
    fn recent_reports_keep_the_newest_five() {
        let reports = many("J", 8);
        let recent: Vec<i64> = recent_reports(&reports, "J").iter().map(|r| r.id.0).collect();
        assert_eq!(recent, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn level_progress_rounds_up_to_the_next_hundred() {
        assert_eq!(
            LevelProgress::for_points(130),
            LevelProgress {
                points: 130,
                next_level: 200,
                percent: 30
            }
        );
        assert_eq!(LevelProgress::for_points(0).next_level, 0);
        assert_eq!(LevelProgress::for_points(200).percent, 0);
    }

    #[test]
    fn no_reports_no_badges() {
        assert!(badges_earned(&[], "J").is_empty());
        assert_eq!(badges(&[], "J").len(), BadgeKind::ALL.len());
    }

    #[test]
    fn count_thresholds_unlock_in_order() {
        let earned = badges_earned(&many("J", 1), "J");
        assert_eq!(earned, vec![BadgeKind::FirstReport, BadgeKind::CommunityStar]);

        let earned = badges_earned(&many("J", 5), "J");
        assert!(earned.contains(&BadgeKind::ConsistentReporter));
        assert!(!earned.contains(&BadgeKind::NetworkGuru));

        let earned = badges_earned(&many("J", 20), "J");
        assert!(earned.contains(&BadgeKind::NetworkGuru));
    }

    #[test]
    fn weather_watcher_needs_three_conditions() {
        let mut reports = vec![
            report(3, "J", Some(Weather::Rainy)),
            report(2, "J", Some(Weather::Rainy)),
            report(1, "J", Some(Weather::Sunny)),
        ];
        assert!(!badges_earned(&reports, "J").contains(&BadgeKind::WeatherWatcher));

        reports.insert(0, report(4, "J", Some(Weather::Foggy)));
        assert!(badges_earned(&reports, "J").contains(&BadgeKind::WeatherWatcher));
    }
}
