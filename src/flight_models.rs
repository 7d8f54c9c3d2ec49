use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled flight as the client displays it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,                           // Backend schedule id
    pub flight_code: String,               // e.g. GA204
    pub airline_name: String,              // e.g. Garuda Indonesia
    pub origin_city: String,               // Departure airport code
    pub destination_city: String,          // Arrival airport code
    pub departure_datetime: DateTime<Utc>, // Scheduled departure
    pub arrival_datetime: DateTime<Utc>,   // Scheduled arrival
    pub price: f64,                        // Price per seat
    pub available_seats: u32,              // Remaining inventory, owned by the backend
}

impl Flight {
    /// Departure strictly before arrival. The backend is expected to guarantee it;
    /// the client only reports violations.
    pub fn schedule_is_consistent(&self) -> bool {
        self.departure_datetime < self.arrival_datetime
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.arrival_datetime - self.departure_datetime).num_minutes()
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_seats == 0
    }
}

/// Query for the schedules endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightSearchParams {
    pub origin_city: String,
    pub destination_city: String,
    pub departure_date: NaiveDate,
    pub num_passengers: u32,
}

/// Booking lifecycle status. Transitions are decided by the backend; the client
/// only reads them. Unrecognised strings are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    PendingPayment,
    Cancelled,
    Expired,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Pending => "PENDING",
            BookingStatus::PendingPayment => "PENDING_PAYMENT",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Expired => "EXPIRED",
            BookingStatus::Other(raw) => raw,
        }
    }

    pub fn awaits_payment(&self) -> bool {
        matches!(self, BookingStatus::PendingPayment)
    }
}

impl From<&str> for BookingStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "CONFIRMED" => BookingStatus::Confirmed,
            "PENDING" => BookingStatus::Pending,
            "PENDING_PAYMENT" => BookingStatus::PendingPayment,
            "CANCELLED" => BookingStatus::Cancelled,
            "EXPIRED" => BookingStatus::Expired,
            other => BookingStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for BookingStatus {
    fn from(raw: String) -> Self {
        BookingStatus::from(raw.as_str())
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatPreference {
    Window,
    Middle,
    Aisle,
}

impl SeatPreference {
    pub const ALL: [SeatPreference; 3] = [SeatPreference::Window, SeatPreference::Middle, SeatPreference::Aisle];

    /// Case-insensitive; `None` for anything else.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "window" => Some(SeatPreference::Window),
            "middle" => Some(SeatPreference::Middle),
            "aisle" => Some(SeatPreference::Aisle),
            _ => None,
        }
    }
}

impl fmt::Display for SeatPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SeatPreference::Window => "Window",
            SeatPreference::Middle => "Middle",
            SeatPreference::Aisle => "Aisle",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PassengerDetail {
    pub name: String,
    pub seat_preference: Option<SeatPreference>,
}

/// What the booking screen submits
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub flight_id: i64,
    pub num_tickets: u32,
    /// Collected by the form; the backend does not accept them yet.
    pub passenger_details: Vec<PassengerDetail>,
}

/// Backend acknowledgement of a created booking
#[derive(Debug, Clone, PartialEq)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub status: BookingStatus,
    pub flight_id: i64,
    pub num_seats: u32,
    pub total_price: f64,
    pub payment_due: Option<DateTime<Utc>>,
}

/// One row of the bookings list
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSummary {
    pub booking_id: String,
    pub flight_code: String,
    pub user_id: String,
    pub status: BookingStatus,
    pub booking_date: Option<DateTime<Utc>>,
    pub total_price: f64,
    pub origin_city: String,
    pub destination_city: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetail {
    pub booking_id: String,
    pub user_id: String,
    pub flight_details: Flight,
    pub num_tickets: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub passenger_details: Vec<PassengerDetail>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields an edit screen would change. No backend endpoint accepts it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateBookingRequest {
    pub num_tickets: Option<u32>,
    pub passenger_details: Option<Vec<PassengerDetail>>,
    pub status: Option<BookingStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_keeps_unknown_strings() {
        assert_eq!(BookingStatus::from("PENDING_PAYMENT"), BookingStatus::PendingPayment);
        let other = BookingStatus::from("REFUNDED");
        assert_eq!(other, BookingStatus::Other("REFUNDED".to_string()));
        assert_eq!(other.as_str(), "REFUNDED");
    }

    #[test]
    fn status_serializes_as_wire_string() {
        let json = serde_json::to_string(&BookingStatus::Expired).unwrap();
        assert_eq!(json, "\"EXPIRED\"");
        let back: BookingStatus = serde_json::from_str("\"lowercase_thing\"").unwrap();
        assert_eq!(back.to_string(), "lowercase_thing");
    }

    #[test]
    fn seat_preference_parse_is_case_insensitive() {
        assert_eq!(SeatPreference::parse(" aisle "), Some(SeatPreference::Aisle));
        assert_eq!(SeatPreference::parse("WINDOW"), Some(SeatPreference::Window));
        assert_eq!(SeatPreference::parse("exit row"), None);
    }

    #[test]
    fn schedule_consistency() {
        let mut flight = Flight {
            id: 101,
            flight_code: "GA204".into(),
            airline_name: "Garuda Indonesia".into(),
            origin_city: "CGK".into(),
            destination_city: "DPS".into(),
            departure_datetime: Utc.with_ymd_and_hms(2025, 12, 20, 8, 0, 0).unwrap(),
            arrival_datetime: Utc.with_ymd_and_hms(2025, 12, 20, 10, 50, 0).unwrap(),
            price: 1_650_000.0,
            available_seats: 35,
        };
        assert!(flight.schedule_is_consistent());
        assert_eq!(flight.duration_minutes(), 170);

        flight.arrival_datetime = flight.departure_datetime;
        assert!(!flight.schedule_is_consistent());
    }
}
