use netpulse_core::{Provider, Report, Weather};

/// Rows shown in the admin table.
pub const ADMIN_TABLE_ROWS: usize = 10;

/// Admin table filters. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub provider: Option<Provider>,
    pub weather: Option<Weather>,
    /// Case-insensitive substring of the report location.
    pub city: Option<String>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(provider) = self.provider
            && report.provider != provider
        {
            return false;
        }

        if let Some(weather) = self.weather
            && report.weather != Some(weather)
        {
            return false;
        }

        if let Some(city) = &self.city
            && !report
                .location
                .to_lowercase()
                .contains(&city.trim().to_lowercase())
        {
            return false;
        }

        true
    }
}

pub fn filter_reports<'a>(
    reports: &'a [Report],
    filter: &'a ReportFilter,
) -> impl Iterator<Item = &'a Report> {
    reports.iter().filter(|report| filter.matches(report))
}

/// The admin table: matching reports, newest first, first page only.
pub fn query_reports<'a>(reports: &'a [Report], filter: &'a ReportFilter) -> Vec<&'a Report> {
    let mut rows: Vec<&Report> = filter_reports(reports, filter).collect();
    rows.sort_by(|a, b| {
        b.submitted_at
            .cmp(&a.submitted_at)
            .then(b.id.cmp(&a.id))
    });
    rows.truncate(ADMIN_TABLE_ROWS);
    rows
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use netpulse_core::{IssueType, NetworkType, ReportId, SignalStrength};

    use super::*;

    fn mock_report(id: i64, provider: Provider, weather: Option<Weather>, location: &str) -> Report {
        Report {
            id: ReportId(id),
            provider,
            signal_strength: SignalStrength::new(3).unwrap(),
            network_type: NetworkType::FourG,
            issue_type: IssueType::CallDrop,
            location: location.into(),
            weather,
            comments: None,
            submitted_at: Timestamp::from_millisecond(id).unwrap(),
            submitted_by: "J".into(),
            measurement: None,
        }
    }

    fn reports() -> Vec<Report> {
        vec![
            mock_report(4, Provider::Jio, Some(Weather::Rainy), "New York, NY"),
            mock_report(3, Provider::Airtel, None, "Newark, NJ"),
            mock_report(2, Provider::Jio, Some(Weather::Sunny), "Jersey City, NJ"),
            mock_report(1, Provider::Verizon, Some(Weather::Rainy), "newark, nj"),
        ]
    }

    fn ids(rows: Vec<&Report>) -> Vec<i64> {
        rows.iter().map(|r| r.id.0).collect()
    }

    #[test]
    fn no_filter_lists_newest_first() {
        let mut reports = reports();
        reports.reverse();
        assert_eq!(ids(query_reports(&reports, &ReportFilter::default())), vec![4, 3, 2, 1]);
    }

    #[test]
    fn filter_by_provider_and_weather() {
        let reports = reports();
        let filter = ReportFilter {
            provider: Some(Provider::Jio),
            weather: Some(Weather::Rainy),
            ..Default::default()
        };
        assert_eq!(ids(query_reports(&reports, &filter)), vec![4]);
    }

    #[test]
    fn weather_filter_excludes_reports_without_weather() {
        let reports = reports();
        let filter = ReportFilter {
            weather: Some(Weather::Rainy),
            ..Default::default()
        };
        assert_eq!(ids(query_reports(&reports, &filter)), vec![4, 1]);
    }

    #[test]
    fn city_matches_case_insensitive_substring() {
        let reports = reports();
        let filter = ReportFilter {
            city: Some("Newark".into()),
            ..Default::default()
        };
        assert_eq!(ids(query_reports(&reports, &filter)), vec![3, 1]);
    }

    #[test]
    fn table_stops_at_ten_rows() {
        let reports: Vec<Report> = (1..=15)
            .rev()
            .map(|id| mock_report(id, Provider::Att, None, "Camden, NJ"))
            .collect();
        let rows = ids(query_reports(&reports, &ReportFilter::default()));
        assert_eq!(rows, (6..=15).rev().collect::<Vec<i64>>());
    }
}
