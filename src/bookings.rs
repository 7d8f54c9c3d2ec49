use crate::api::ApiClient;
use crate::cancel::{cancellable, CancelHandle};
use crate::error::ApiError;
use crate::flight_models::{BookingStatus, BookingSummary};

/// Tabs above the bookings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Confirmed,
    PendingPayment,
    Expired,
    Cancelled,
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 5] = [
        StatusFilter::All,
        StatusFilter::Confirmed,
        StatusFilter::PendingPayment,
        StatusFilter::Expired,
        StatusFilter::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Confirmed => "Confirmed",
            StatusFilter::PendingPayment => "Pending Payment",
            StatusFilter::Expired => "Expired",
            StatusFilter::Cancelled => "Cancelled",
        }
    }

    fn status(self) -> Option<BookingStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Confirmed => Some(BookingStatus::Confirmed),
            StatusFilter::PendingPayment => Some(BookingStatus::PendingPayment),
            StatusFilter::Expired => Some(BookingStatus::Expired),
            StatusFilter::Cancelled => Some(BookingStatus::Cancelled),
        }
    }

    pub fn matches(self, booking: &BookingSummary) -> bool {
        self.status().map_or(true, |status| booking.status == status)
    }

    pub fn empty_message(self) -> String {
        match self.status() {
            None => "You don't have any bookings yet".to_string(),
            Some(status) => format!("No {} bookings found", status.as_str().to_lowercase()),
        }
    }
}

/// Bookings screen state: the fetched list, newest first, plus the active tab.
#[derive(Debug, Clone, Default)]
pub struct BookingsView {
    bookings: Vec<BookingSummary>,
    filter: StatusFilter,
}

impl BookingsView {
    /// The backend lists oldest first; the screen shows newest first.
    pub fn new(mut bookings: Vec<BookingSummary>) -> Self {
        bookings.reverse();
        Self {
            bookings,
            filter: StatusFilter::All,
        }
    }

    /// Always re-fetches; nothing is kept between visits.
    pub async fn load(api: &ApiClient, user_email: &str, cancel: &CancelHandle) -> Result<Self, ApiError> {
        let bookings = cancellable(cancel, api.get_bookings(user_email)).await?;
        Ok(Self::new(bookings))
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn all(&self) -> &[BookingSummary] {
        &self.bookings
    }

    pub fn visible(&self) -> Vec<&BookingSummary> {
        self.bookings.iter().filter(|b| self.filter.matches(b)).collect()
    }

    /// Message to show when `visible()` is empty.
    pub fn empty_message(&self) -> Option<String> {
        if self.visible().is_empty() {
            Some(self.filter.empty_message())
        } else {
            None
        }
    }

    /// Most recent few, for the home screen.
    pub fn recent(&self, limit: usize) -> &[BookingSummary] {
        &self.bookings[..limit.min(self.bookings.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(id: &str, status: &str) -> BookingSummary {
        BookingSummary {
            booking_id: id.to_string(),
            flight_code: "GA204".into(),
            user_id: "john.doe@example.com".into(),
            status: BookingStatus::from(status),
            booking_date: None,
            total_price: 1_650_000.0,
            origin_city: "CGK".into(),
            destination_city: "DPS".into(),
        }
    }

    fn view() -> BookingsView {
        BookingsView::new(vec![
            booking("1", "CONFIRMED"),
            booking("2", "PENDING_PAYMENT"),
            booking("3", "CANCELLED"),
            booking("4", "CONFIRMED"),
        ])
    }

    #[test]
    fn newest_first() {
        let view = view();
        let ids: Vec<_> = view.all().iter().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(ids, vec!["4", "3", "2", "1"]);
        let recent: Vec<_> = view.recent(2).iter().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(recent, vec!["4", "3"]);
        assert_eq!(view.recent(10).len(), 4);
    }

    #[test]
    fn filter_by_status() {
        let mut view = view();
        view.set_filter(StatusFilter::Confirmed);
        let ids: Vec<_> = view.visible().iter().map(|b| b.booking_id.as_str()).collect();
        assert_eq!(ids, vec!["4", "1"]);
        assert_eq!(view.empty_message(), None);

        view.set_filter(StatusFilter::Expired);
        assert!(view.visible().is_empty());
        assert_eq!(view.empty_message().as_deref(), Some("No expired bookings found"));
    }

    #[test]
    fn pending_payment_tab_ignores_plain_pending() {
        let mut view = BookingsView::new(vec![booking("1", "PENDING")]);
        view.set_filter(StatusFilter::PendingPayment);
        assert!(view.visible().is_empty());
        assert_eq!(view.empty_message().as_deref(), Some("No pending_payment bookings found"));
    }

    #[test]
    fn empty_list_message() {
        let view = BookingsView::new(Vec::new());
        assert_eq!(view.empty_message().as_deref(), Some("You don't have any bookings yet"));
    }
}
