//! Dashboards, statistics and circulation reports

use chrono::Utc;

use crate::{
    error::AppResult,
    models::dashboard::{
        AdminDashboard, BorrowingEntry, CirculationReport, DashboardStats, ReportQuery,
        UserDashboard, UserDashboardStats,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn user_dashboard(&self, patron_id: i32) -> AppResult<UserDashboard> {
        let now = Utc::now();
        let patron = self.repository.patrons.get_by_id(patron_id).await?;

        let borrowings: Vec<BorrowingEntry> = self
            .repository
            .reports
            .patron_loans(patron_id)
            .await?
            .into_iter()
            .map(|loan| BorrowingEntry::from_loan(loan, now))
            .collect();
        let reservations = self.repository.reports.patron_reservations(patron_id).await?;
        let notifications = self.repository.notifications.unread_for_patron(patron_id).await?;

        Ok(UserDashboard {
            user: patron.summary(),
            stats: UserDashboardStats::compute(&borrowings, reservations.len(), now),
            borrowings,
            reservations,
            notifications,
        })
    }

    pub async fn admin_dashboard(&self) -> AppResult<AdminDashboard> {
        let now = Utc::now();
        Ok(AdminDashboard {
            stats: self.repository.reports.admin_stats(now).await?,
            recent_transactions: self.repository.reports.recent_transactions().await?,
            overdue_books: self.repository.reports.overdue_loans(now).await?,
        })
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        self.repository.reports.dashboard_stats(Utc::now()).await
    }

    pub async fn circulation_report(&self, query: &ReportQuery) -> AppResult<CirculationReport> {
        let start_date = query.window().start(Utc::now());
        let (total_borrowings, total_returns) =
            self.repository.reports.circulation_totals(start_date).await?;
        let popular_books = self.repository.reports.popular_books(start_date).await?;

        Ok(CirculationReport {
            period: query.label(),
            start_date,
            total_borrowings,
            total_returns,
            popular_books,
        })
    }

    pub async fn mark_notification_read(&self, patron_id: i32, notification_id: i32) -> AppResult<()> {
        self.repository
            .notifications
            .mark_read(patron_id, notification_id)
            .await
    }
}
