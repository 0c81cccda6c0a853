//! Dashboard, statistics and report payloads

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::loan::{days_overdue, LoanStatus, LoanWithBook};
use super::notification::Notification;
use super::patron::PatronSummary;
use super::reservation::ReservationWithBook;

/// Due within the next three days and not yet past due
pub fn is_due_soon(due_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due_date >= now && (due_date - now).num_days() <= 3
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDashboard {
    pub user: PatronSummary,
    pub stats: UserDashboardStats,
    pub borrowings: Vec<BorrowingEntry>,
    pub reservations: Vec<ReservationWithBook>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct UserDashboardStats {
    pub borrowed_count: usize,
    pub overdue_count: usize,
    pub due_soon_count: usize,
    pub reserved_count: usize,
}

impl UserDashboardStats {
    pub fn compute(
        borrowings: &[BorrowingEntry],
        reserved_count: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let open: Vec<&BorrowingEntry> = borrowings
            .iter()
            .filter(|b| b.status.is_open())
            .collect();
        Self {
            borrowed_count: open.len(),
            overdue_count: open.iter().filter(|b| now > b.due_date).count(),
            due_soon_count: open.iter().filter(|b| is_due_soon(b.due_date, now)).count(),
            reserved_count,
        }
    }
}

/// A loan as shown on the patron dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowingEntry {
    pub id: i32,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: Option<String>,
    pub book_description: Option<String>,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub renewal_count: i32,
    pub max_renewals: i32,
    pub is_overdue: bool,
    pub days_overdue: i64,
}

impl BorrowingEntry {
    pub fn from_loan(loan: LoanWithBook, now: DateTime<Utc>) -> Self {
        let open = loan.status.is_open();
        Self {
            is_overdue: open && now > loan.due_date,
            days_overdue: if open { days_overdue(loan.due_date, now) } else { 0 },
            id: loan.id,
            book_title: loan.book_title,
            book_author: loan.book_author,
            book_isbn: loan.book_isbn,
            book_description: loan.book_description,
            borrowed_date: loan.borrowed_date,
            due_date: loan.due_date,
            returned_date: loan.returned_date,
            status: loan.status,
            renewal_count: loan.renewal_count,
            max_renewals: loan.max_renewals,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub recent_transactions: Vec<RecentTransaction>,
    pub overdue_books: Vec<OverdueLoan>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_books: i64,
    /// Active patrons only
    pub total_users: i64,
    pub borrowed_books: i64,
    pub overdue_books: i64,
    pub returned_books: i64,
    pub paid_fine_users: i64,
    pub unpaid_fine_users: i64,
    pub books_by_subject: Vec<SubjectCount>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct SubjectCount {
    pub subject: String,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct RecentTransaction {
    pub id: i32,
    pub user_name: String,
    pub book_title: String,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

/// Open loan past its due date
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct OverdueLoan {
    pub id: i32,
    pub user_name: String,
    pub user_email: String,
    pub book_title: String,
    #[serde(skip_serializing)]
    pub due_date: DateTime<Utc>,
    #[sqlx(default)]
    pub days_overdue: i64,
}

/// Front-page counters
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_students: i64,
    pub borrowed_today: i64,
    pub returned_today: i64,
}

/// Reporting window for the circulation report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Week,
    Month,
    Quarter,
    Year,
}

impl ReportPeriod {
    /// Unknown or missing periods fall back to a month
    pub fn from_query(period: Option<&str>) -> Self {
        match period.map(str::to_lowercase).as_deref() {
            Some("week") => ReportPeriod::Week,
            Some("quarter") => ReportPeriod::Quarter,
            Some("year") => ReportPeriod::Year,
            _ => ReportPeriod::Month,
        }
    }

    pub fn length(&self) -> Duration {
        match self {
            ReportPeriod::Week => Duration::days(7),
            ReportPeriod::Month => Duration::days(30),
            ReportPeriod::Quarter => Duration::days(90),
            ReportPeriod::Year => Duration::days(365),
        }
    }

    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.length()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub period: Option<String>,
}

impl ReportQuery {
    /// Requested period as given, "month" when absent
    pub fn label(&self) -> String {
        self.period.clone().unwrap_or_else(|| "month".to_string())
    }

    pub fn window(&self) -> ReportPeriod {
        ReportPeriod::from_query(self.period.as_deref())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CirculationReport {
    /// Echo of the requested period; unknown values report over a month
    pub period: String,
    pub start_date: DateTime<Utc>,
    pub total_borrowings: i64,
    pub total_returns: i64,
    pub popular_books: Vec<PopularBook>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct PopularBook {
    pub title: String,
    pub author: String,
    pub borrow_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: LoanStatus, due_date: DateTime<Utc>) -> BorrowingEntry {
        let now = Utc::now();
        BorrowingEntry::from_loan(
            LoanWithBook {
                id: 1,
                book_title: "The Republic".to_string(),
                book_author: "Plato".to_string(),
                book_isbn: None,
                book_description: None,
                borrowed_date: due_date - Duration::days(14),
                due_date,
                returned_date: None,
                status,
                renewal_count: 0,
                max_renewals: 2,
            },
            now,
        )
    }

    #[test]
    fn test_due_soon_window() {
        let now = Utc::now();
        assert!(is_due_soon(now + Duration::days(2), now));
        assert!(is_due_soon(now + Duration::hours(90), now));
        assert!(!is_due_soon(now + Duration::days(5), now));
        assert!(!is_due_soon(now - Duration::hours(2), now));
    }

    #[test]
    fn test_stats_only_count_open_loans() {
        let now = Utc::now();
        let borrowings = vec![
            entry(LoanStatus::Borrowed, now - Duration::days(2)),
            entry(LoanStatus::Borrowed, now + Duration::days(1)),
            entry(LoanStatus::Borrowed, now + Duration::days(10)),
            entry(LoanStatus::Returned, now - Duration::days(20)),
        ];
        let stats = UserDashboardStats::compute(&borrowings, 1, now);

        assert_eq!(
            stats,
            UserDashboardStats {
                borrowed_count: 3,
                overdue_count: 1,
                due_soon_count: 1,
                reserved_count: 1,
            }
        );
    }

    #[test]
    fn test_returned_loans_are_not_overdue() {
        let returned = entry(LoanStatus::Returned, Utc::now() - Duration::days(20));
        assert!(!returned.is_overdue);
        assert_eq!(returned.days_overdue, 0);

        let late = entry(LoanStatus::Borrowed, Utc::now() - Duration::days(4));
        assert!(late.is_overdue);
        assert_eq!(late.days_overdue, 4);
    }

    #[test]
    fn test_report_period_parsing() {
        assert_eq!(ReportPeriod::from_query(Some("week")), ReportPeriod::Week);
        assert_eq!(ReportPeriod::from_query(Some("YEAR")), ReportPeriod::Year);
        assert_eq!(ReportPeriod::from_query(Some("decade")), ReportPeriod::Month);
        assert_eq!(ReportPeriod::from_query(None), ReportPeriod::Month);
        assert_eq!(ReportPeriod::Quarter.length(), Duration::days(90));
    }

    #[test]
    fn test_report_query_echoes_unknown_period() {
        let query = ReportQuery {
            period: Some("decade".to_string()),
        };
        assert_eq!(query.label(), "decade");
        assert_eq!(query.window(), ReportPeriod::Month);

        let query = ReportQuery { period: None };
        assert_eq!(query.label(), "month");
        assert_eq!(query.window().length(), Duration::days(30));
    }

    #[test]
    fn test_dashboard_stats_field_names() {
        let json = serde_json::to_value(DashboardStats {
            total_books: 8,
            total_students: 2,
            borrowed_today: 1,
            returned_today: 0,
        })
        .unwrap();

        assert_eq!(json["totalBooks"], 8);
        assert_eq!(json["totalStudents"], 2);
        assert_eq!(json["borrowedToday"], 1);
        assert_eq!(json["returnedToday"], 0);
    }
}
