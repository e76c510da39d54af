use std::collections::HashMap;

use netpulse_core::{POINTS_PER_REPORT, Report};

/// Standings shown before any live report exists: (name, reports).
pub const BASELINE_STANDINGS: [(&str, u32); 5] = [
    ("Sarah Johnson", 85),
    ("Mike Chen", 72),
    ("Emma Davis", 68),
    ("Alex Kumar", 56),
    ("John Doe", 45),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub name: String,
    pub reports: u32,
    pub points: u32,
    pub is_current: bool,
}

/// Baseline standings plus live reports, highest points first.
///
/// Live reports add to the baseline entry of the same name; new submitters
/// get an entry of their own. Ties are broken by name.
pub fn leaderboard(reports: &[Report], current: Option<&str>) -> Vec<Standing> {
    let mut counts: HashMap<&str, u32> = BASELINE_STANDINGS.iter().copied().collect();
    for report in reports {
        *counts.entry(&*report.submitted_by).or_default() += 1;
    }

    let mut entries: Vec<(&str, u32)> = counts.into_iter().collect();
    entries.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (name, count))| Standing {
            rank: index + 1,
            name: name.to_string(),
            reports: count,
            points: count * POINTS_PER_REPORT,
            is_current: current == Some(name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use netpulse_core::{IssueType, NetworkType, Provider, ReportId, SignalStrength};

    use super::*;

    fn report(by: &str) -> Report {
        Report {
            id: ReportId(1),
            provider: Provider::Verizon,
            signal_strength: SignalStrength::new(1).unwrap(),
            network_type: NetworkType::FiveG,
            issue_type: IssueType::NoSignal,
            location: "Jersey City, NJ".into(),
            weather: None,
            comments: None,
            submitted_at: Timestamp::UNIX_EPOCH,
            submitted_by: by.into(),
            measurement: None,
        }
    }

    #[test]
    fn baseline_only() {
        let board = leaderboard(&[], None);
        assert_eq!(board.len(), 5);
        assert_eq!(board[0].name, "Sarah Johnson");
        assert_eq!(board[0].points, 850);
        assert_eq!(board[4].rank, 5);
        assert!(board.iter().all(|s| !s.is_current));
    }

    #[test]
    fn live_reports_add_to_existing_entries() {
        let reports: Vec<Report> = (0..12).map(|_| report("John Doe")).collect();
        let board = leaderboard(&reports, Some("John Doe"));

        let john = board.iter().find(|s| s.name == "John Doe").unwrap();
        assert_eq!(john.reports, 57);
        assert_eq!(john.rank, 4);
        assert!(john.is_current);
    }

    #[test]
    fn new_submitters_are_appended_by_points() {
        let board = leaderboard(&[report("Priya Shah")], Some("Priya Shah"));
        assert_eq!(board.len(), 6);
        assert_eq!(board[5].name, "Priya Shah");
        assert_eq!(board[5].points, 10);
        assert!(board[5].is_current);
    }
}
