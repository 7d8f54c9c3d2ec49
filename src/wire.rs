//! Backend JSON records and their remapping into view-models.
//!
//! Field names here follow the booking backend (`airline`, `price_per_seat`,
//! `payment_due_timestamp`); the view-models in [`crate::flight_models`] use the
//! client's names.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::flight_models::{BookingConfirmation, BookingDetail, BookingStatus, BookingSummary, Flight};

/// Header carrying the caller's identity on booking endpoints.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: i64,
    pub airline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_name: Option<String>,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub price_per_seat: f64,
    pub available_seats: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    #[serde(alias = "id")]
    pub booking_id: String,
    pub flight_id: i64,
    pub user_email: String,
    pub num_seats: u32,
    pub total_price: f64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_due_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight: Option<ScheduleRecord>,
}

/// Body of `POST /bookings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBookingBody {
    pub flight_id: i64,
    pub user_email: String,
    pub num_seats: u32,
}

/// Error payload; backends use either key.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            message: None,
        }
    }

    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS`
/// which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::Decode(format!("invalid timestamp {raw:?}")))
}

fn parse_optional(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    raw.map(parse_timestamp).transpose()
}

impl ScheduleRecord {
    pub fn into_flight(self) -> Result<Flight, ApiError> {
        let available_seats = u32::try_from(self.available_seats).map_err(|_| {
            ApiError::Decode(format!(
                "schedule {} has invalid available_seats {}",
                self.id, self.available_seats
            ))
        })?;

        Ok(Flight {
            id: self.id,
            departure_datetime: parse_timestamp(&self.departure_time)?,
            arrival_datetime: parse_timestamp(&self.arrival_time)?,
            airline_name: self.airline_name.unwrap_or_else(|| self.airline.clone()),
            flight_code: self.airline,
            origin_city: self.origin,
            destination_city: self.destination,
            price: self.price_per_seat,
            available_seats,
        })
    }
}

impl BookingRecord {
    pub fn into_summary(self) -> Result<BookingSummary, ApiError> {
        let booking_date = parse_optional(self.payment_due_timestamp.as_deref())?;
        let (flight_code, origin_city, destination_city) = match self.flight {
            Some(flight) => (flight.airline, flight.origin, flight.destination),
            None => Default::default(),
        };

        Ok(BookingSummary {
            booking_id: self.booking_id,
            flight_code,
            user_id: self.user_email,
            status: BookingStatus::from(self.status),
            booking_date,
            total_price: self.total_price,
            origin_city,
            destination_city,
        })
    }

    /// Requires the embedded flight. Passenger details are never supplied by
    /// the backend, so they come back empty.
    pub fn into_detail(self) -> Result<BookingDetail, ApiError> {
        let flight = self
            .flight
            .ok_or_else(|| ApiError::Decode(format!("booking {} has no flight", self.booking_id)))?;

        Ok(BookingDetail {
            flight_details: flight.into_flight()?,
            created_at: parse_optional(self.created_at.as_deref())?,
            updated_at: parse_optional(self.updated_at.as_deref())?,
            booking_id: self.booking_id,
            user_id: self.user_email,
            num_tickets: self.num_seats,
            total_price: self.total_price,
            status: BookingStatus::from(self.status),
            passenger_details: Vec::new(),
        })
    }

    pub fn into_confirmation(self) -> Result<BookingConfirmation, ApiError> {
        Ok(BookingConfirmation {
            payment_due: parse_optional(self.payment_due_timestamp.as_deref())?,
            booking_id: self.booking_id,
            status: BookingStatus::from(self.status),
            flight_id: self.flight_id,
            num_seats: self.num_seats,
            total_price: self.total_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn schedule_json() -> serde_json::Value {
        json!({
            "id": 101,
            "airline": "GA204",
            "airline_name": "Garuda Indonesia",
            "origin": "CGK",
            "destination": "DPS",
            "departure_time": "2025-12-20T08:00:00Z",
            "arrival_time": "2025-12-20T10:50:00Z",
            "price_per_seat": 1650000.0,
            "available_seats": 35
        })
    }

    #[test]
    fn schedule_maps_to_flight_fields() {
        let record: ScheduleRecord = serde_json::from_value(schedule_json()).unwrap();
        let flight = record.into_flight().unwrap();

        assert_eq!(flight.id, 101);
        assert_eq!(flight.flight_code, "GA204");
        assert_eq!(flight.airline_name, "Garuda Indonesia");
        assert_eq!(flight.origin_city, "CGK");
        assert_eq!(flight.destination_city, "DPS");
        assert_eq!(flight.price, 1_650_000.0);
        assert_eq!(flight.available_seats, 35);
        assert_eq!(flight.departure_datetime, Utc.with_ymd_and_hms(2025, 12, 20, 8, 0, 0).unwrap());
    }

    #[test]
    fn airline_name_falls_back_to_airline() {
        let mut value = schedule_json();
        value.as_object_mut().unwrap().remove("airline_name");
        let record: ScheduleRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.into_flight().unwrap().airline_name, "GA204");
    }

    #[test]
    fn negative_seat_count_is_a_decode_error() {
        let mut value = schedule_json();
        value["available_seats"] = json!(-1);
        let record: ScheduleRecord = serde_json::from_value(value).unwrap();
        assert!(matches!(record.into_flight(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn timestamps_accept_naive_and_offset_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 8, 30, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-08-30 10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-08-30T10:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-08-30T17:00:00+07:00").unwrap(), expected);
        assert!(parse_timestamp("30/08/2024").is_err());
    }

    #[test]
    fn booking_summary_remaps_backend_names() {
        let record: BookingRecord = serde_json::from_value(json!({
            "id": "a1b2c3d4",
            "flight_id": 101,
            "user_email": "john.doe@example.com",
            "num_seats": 2,
            "total_price": 3300000.0,
            "status": "PENDING_PAYMENT",
            "payment_due_timestamp": "2025-11-15T10:30:00Z",
            "flight": schedule_json()
        }))
        .unwrap();

        let summary = record.into_summary().unwrap();
        assert_eq!(summary.booking_id, "a1b2c3d4");
        assert_eq!(summary.flight_code, "GA204");
        assert_eq!(summary.user_id, "john.doe@example.com");
        assert_eq!(summary.status, BookingStatus::PendingPayment);
        assert_eq!(summary.booking_date, Some(Utc.with_ymd_and_hms(2025, 11, 15, 10, 30, 0).unwrap()));
        assert_eq!(summary.origin_city, "CGK");
        assert_eq!(summary.destination_city, "DPS");
    }

    #[test]
    fn summary_without_flight_leaves_route_blank() {
        let record: BookingRecord = serde_json::from_value(json!({
            "booking_id": "x",
            "flight_id": 7,
            "user_email": "a@b.c",
            "num_seats": 1,
            "total_price": 10.0,
            "status": "CONFIRMED"
        }))
        .unwrap();

        let summary = record.clone().into_summary().unwrap();
        assert!(summary.flight_code.is_empty());
        assert_eq!(summary.booking_date, None);
        assert!(matches!(record.into_detail(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn detail_has_no_passengers() {
        let record: BookingRecord = serde_json::from_value(json!({
            "booking_id": "b2",
            "flight_id": 101,
            "user_email": "john.doe@example.com",
            "num_seats": 2,
            "total_price": 3300000.0,
            "status": "CONFIRMED",
            "created_at": "2025-11-15T10:30:00Z",
            "flight": schedule_json()
        }))
        .unwrap();

        let detail = record.into_detail().unwrap();
        assert_eq!(detail.num_tickets, 2);
        assert_eq!(detail.flight_details.flight_code, "GA204");
        assert!(detail.passenger_details.is_empty());
        assert!(detail.created_at.is_some());
        assert_eq!(detail.updated_at, None);
    }

    #[test]
    fn error_body_prefers_error_key() {
        let body: ErrorBody = serde_json::from_value(json!({"message": "m", "error": "e"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("e"));
        let body: ErrorBody = serde_json::from_value(json!({"message": "m"})).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("m"));
    }
}
