pub mod admin;
pub mod filter;
pub mod leaderboard;
pub mod user;

pub use admin::{AdminOverview, DataSource, admin_overview};
pub use filter::{ADMIN_TABLE_ROWS, ReportFilter, query_reports};
pub use leaderboard::{Standing, leaderboard};
pub use user::{
    Badge, BadgeKind, LevelProgress, badges, badges_earned, points_for_user, recent_reports,
    reports_for_user,
};
