use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::flight_models::BookingStatus;
use crate::wire::{BookingRecord, ScheduleRecord};

/// How long a new booking may stay unpaid before the backend expires it.
pub const PAYMENT_WINDOW_MINUTES: i64 = 30;

/// A schedule as the backend stores it
#[derive(Debug, Clone)]
pub struct Schedule {
    pub id: i64,
    pub airline: String,                // Flight code, e.g. GA204
    pub airline_name: String,           // Carrier display name
    pub origin: String,                 // Departure airport code
    pub destination: String,            // Arrival airport code
    pub departure_time: DateTime<Utc>,  // Scheduled departure
    pub arrival_time: DateTime<Utc>,    // Scheduled arrival
    pub price_per_seat: f64,            // Fare per seat
    pub seats_available: u32,           // Remaining inventory
}

impl Schedule {
    fn to_record(&self) -> ScheduleRecord {
        ScheduleRecord {
            id: self.id,
            airline: self.airline.clone(),
            airline_name: Some(self.airline_name.clone()),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            departure_time: self.departure_time.to_rfc3339(),
            arrival_time: self.arrival_time.to_rfc3339(),
            price_per_seat: self.price_per_seat,
            available_seats: i64::from(self.seats_available),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredBooking {
    pub booking_id: String,
    pub flight_id: i64,
    pub user_email: String,
    pub num_seats: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub payment_due: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReserveError {
    #[error("Flight not found")]
    FlightNotFound,
    #[error("Not enough seats available")]
    NotEnoughSeats,
    #[error("num_seats must be at least 1")]
    InvalidSeatCount,
}

/// In-memory store behind the development backend.
#[derive(Debug, Default)]
pub struct FlightController {
    flights: BTreeMap<i64, Schedule>,
    bookings: Vec<StoredBooking>,
}

impl FlightController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded with CGK-DPS departures on 2025-12-20 and a few past bookings.
    pub fn with_sample_data() -> Self {
        let mut controller = Self::new();
        let at = |d: u32, h: u32, m: u32| {
            Utc.with_ymd_and_hms(2025, 12, d, h, m, 0)
                .single()
                .unwrap_or_default()
        };

        let seed = [
            (101, "GA204", "Garuda Indonesia", "CGK", "DPS", at(20, 8, 0), at(20, 10, 50), 1_650_000.0, 35),
            (102, "JT506", "Lion Air", "CGK", "DPS", at(20, 10, 30), at(20, 13, 20), 950_000.0, 5),
            (103, "QZ7510", "AirAsia", "CGK", "DPS", at(20, 14, 15), at(20, 17, 5), 850_000.0, 12),
            (104, "ID6514", "Batik Air", "DPS", "SUB", at(21, 9, 0), at(21, 9, 55), 720_000.0, 40),
            (105, "GA311", "Garuda Indonesia", "SUB", "CGK", at(22, 18, 0), at(22, 19, 30), 1_200_000.0, 0),
        ];
        for (id, airline, name, origin, destination, departure, arrival, price, seats) in seed {
            controller.add_flight(Schedule {
                id,
                airline: airline.to_string(),
                airline_name: name.to_string(),
                origin: origin.to_string(),
                destination: destination.to_string(),
                departure_time: departure,
                arrival_time: arrival,
                price_per_seat: price,
                seats_available: seats,
            });
        }

        let history = [
            (101, 1, BookingStatus::Confirmed, at(1, 10, 30)),
            (104, 2, BookingStatus::Cancelled, at(5, 14, 45)),
            (103, 1, BookingStatus::Expired, at(8, 9, 15)),
        ];
        for (flight_id, seats, status, created_at) in history {
            let price = controller.flights.get(&flight_id).map_or(0.0, |f| f.price_per_seat);
            controller.bookings.push(StoredBooking {
                booking_id: Uuid::new_v4().to_string(),
                flight_id,
                user_email: "john.doe@example.com".to_string(),
                num_seats: seats,
                total_price: price * f64::from(seats),
                status,
                payment_due: created_at + Duration::minutes(PAYMENT_WINDOW_MINUTES),
                created_at,
                updated_at: created_at,
            });
        }

        controller
    }

    pub fn add_flight(&mut self, flight: Schedule) {
        self.flights.insert(flight.id, flight);
    }

    pub fn flight(&self, flight_id: i64) -> Option<&Schedule> {
        self.flights.get(&flight_id)
    }

    /// Exact airport-code match, case-insensitive; `date` filters on departure day.
    pub fn query_schedules(&self, origin: &str, destination: &str, date: Option<NaiveDate>) -> Vec<ScheduleRecord> {
        self.flights
            .values()
            .filter(|f| f.origin.eq_ignore_ascii_case(origin.trim()))
            .filter(|f| f.destination.eq_ignore_ascii_case(destination.trim()))
            .filter(|f| date.map_or(true, |d| f.departure_time.date_naive() == d))
            .map(Schedule::to_record)
            .collect()
    }

    /// Takes seats off the flight and records a booking awaiting payment.
    pub fn reserve_seats(
        &mut self,
        flight_id: i64,
        user_email: &str,
        seats: u32,
        now: DateTime<Utc>,
    ) -> Result<BookingRecord, ReserveError> {
        if seats == 0 {
            return Err(ReserveError::InvalidSeatCount);
        }
        let flight = self.flights.get_mut(&flight_id).ok_or(ReserveError::FlightNotFound)?;
        if flight.seats_available < seats {
            return Err(ReserveError::NotEnoughSeats);
        }
        flight.seats_available -= seats;

        let booking = StoredBooking {
            booking_id: Uuid::new_v4().to_string(),
            flight_id,
            user_email: user_email.to_string(),
            num_seats: seats,
            total_price: flight.price_per_seat * f64::from(seats),
            status: BookingStatus::PendingPayment,
            payment_due: now + Duration::minutes(PAYMENT_WINDOW_MINUTES),
            created_at: now,
            updated_at: now,
        };
        let record = self.to_record(&booking);
        self.bookings.push(booking);
        Ok(record)
    }

    /// Oldest first.
    pub fn bookings_for(&self, user_email: &str) -> Vec<BookingRecord> {
        self.bookings
            .iter()
            .filter(|b| b.user_email.eq_ignore_ascii_case(user_email.trim()))
            .map(|b| self.to_record(b))
            .collect()
    }

    pub fn booking(&self, booking_id: &str) -> Option<BookingRecord> {
        self.bookings
            .iter()
            .find(|b| b.booking_id == booking_id)
            .map(|b| self.to_record(b))
    }

    /// Unpaid bookings past their deadline become EXPIRED and release their seats.
    pub fn expire_overdue(&mut self, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        for booking in self
            .bookings
            .iter_mut()
            .filter(|b| b.status.awaits_payment() && b.payment_due <= now)
        {
            booking.status = BookingStatus::Expired;
            booking.updated_at = now;
            if let Some(flight) = self.flights.get_mut(&booking.flight_id) {
                flight.seats_available += booking.num_seats;
            }
            expired += 1;
        }
        if expired > 0 {
            tracing::info!(expired, "expired unpaid bookings");
        }
        expired
    }

    fn to_record(&self, booking: &StoredBooking) -> BookingRecord {
        BookingRecord {
            booking_id: booking.booking_id.clone(),
            flight_id: booking.flight_id,
            user_email: booking.user_email.clone(),
            num_seats: booking.num_seats,
            total_price: booking.total_price,
            status: booking.status.to_string(),
            payment_due_timestamp: Some(booking.payment_due.to_rfc3339()),
            created_at: Some(booking.created_at.to_rfc3339()),
            updated_at: Some(booking.updated_at.to_rfc3339()),
            flight: self.flights.get(&booking.flight_id).map(Schedule::to_record),
        }
    }
}
