//! Booking creation: pick a passenger count, fill in passengers, submit once.
//!
//! ```text
//! LoadingFlight -> Editing -> Submitting -> Succeeded
//!       |             ^           |
//!       v             |           v
//!    Blocked          +-------- Failed (retry)
//! ```
//!
//! The total shown before submitting is a preview. The booking's real total is
//! whatever the backend returns in the confirmation.

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cancel::{cancellable, CancelHandle};
use crate::error::{ApiError, FlowError, FormError};
use crate::flight_models::{BookingConfirmation, BookingRequest, BookingSummary, Flight, PassengerDetail, SeatPreference};
use crate::search::{MAX_PASSENGERS, MIN_PASSENGERS};

#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    LoadingFlight,
    /// Cannot book: an unpaid booking exists or the flight is full.
    Blocked(String),
    Editing,
    Submitting,
    Succeeded(BookingConfirmation),
    Failed(String),
}

impl FlowState {
    fn name(&self) -> &'static str {
        match self {
            FlowState::LoadingFlight => "loading",
            FlowState::Blocked(_) => "blocked",
            FlowState::Editing => "editing",
            FlowState::Submitting => "submitting",
            FlowState::Succeeded(_) => "finished",
            FlowState::Failed(_) => "failed",
        }
    }
}

/// Client-side estimate shown on the summary card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePreview {
    pub price_per_seat: f64,
    pub passengers: u32,
    pub subtotal: f64,
    pub service_fee: f64,
    pub total: f64,
}

impl PricePreview {
    pub fn new(price_per_seat: f64, passengers: u32, service_fee: f64) -> Self {
        let subtotal = price_per_seat * f64::from(passengers);
        Self {
            price_per_seat,
            passengers,
            subtotal,
            service_fee,
            total: subtotal + service_fee,
        }
    }
}

/// Refuses to start a new booking while another one is unpaid.
pub fn ensure_no_pending_payment(bookings: &[BookingSummary]) -> Result<(), FlowError> {
    match bookings.iter().find(|b| b.status.awaits_payment()) {
        Some(pending) => Err(FlowError::PendingPayment {
            booking_id: pending.booking_id.clone(),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct BookingFlow {
    state: FlowState,
    flight: Option<Flight>,
    passengers: Vec<PassengerDetail>,
    service_fee: f64,
}

impl BookingFlow {
    pub fn new(service_fee: f64) -> Self {
        Self {
            state: FlowState::LoadingFlight,
            flight: None,
            passengers: vec![PassengerDetail::default()],
            service_fee,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn flight(&self) -> Option<&Flight> {
        self.flight.as_ref()
    }

    pub fn passengers(&self) -> &[PassengerDetail] {
        &self.passengers
    }

    pub fn num_passengers(&self) -> u32 {
        self.passengers.len() as u32
    }

    /// Upper bound for the passenger stepper.
    pub fn max_passengers(&self) -> u32 {
        self.flight
            .as_ref()
            .map_or(MAX_PASSENGERS, |f| f.available_seats.min(MAX_PASSENGERS))
            .max(MIN_PASSENGERS)
    }

    /// Flight context arrived along with the user's current bookings.
    pub fn load(
        &mut self,
        flight: Flight,
        existing: &[BookingSummary],
        requested_passengers: u32,
    ) -> Result<(), FlowError> {
        self.require_state(&[FlowState::LoadingFlight], "load a flight")?;

        let guard = if flight.is_sold_out() {
            Err(FlowError::SoldOut)
        } else {
            ensure_no_pending_payment(existing)
        };
        self.flight = Some(flight);

        match guard {
            Ok(()) => {
                self.state = FlowState::Editing;
                self.set_passenger_count(requested_passengers);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "booking blocked");
                self.state = FlowState::Blocked(err.to_string());
                Err(err)
            }
        }
    }

    pub fn load_failed(&mut self, err: &ApiError) {
        self.state = FlowState::Failed(err.user_message().to_string());
    }

    /// Clamps to `1..=max_passengers()`; existing rows are kept.
    pub fn set_passenger_count(&mut self, count: u32) {
        let count = count.clamp(MIN_PASSENGERS, self.max_passengers());
        self.passengers.resize_with(count as usize, PassengerDetail::default);
    }

    pub fn increment_passengers(&mut self) {
        self.set_passenger_count(self.num_passengers() + 1);
    }

    pub fn decrement_passengers(&mut self) {
        self.set_passenger_count(self.num_passengers().saturating_sub(1));
    }

    pub fn set_passenger_name(&mut self, index: usize, name: impl Into<String>) {
        if let Some(passenger) = self.passengers.get_mut(index) {
            passenger.name = name.into();
        }
    }

    pub fn set_seat_preference(&mut self, index: usize, preference: Option<SeatPreference>) {
        if let Some(passenger) = self.passengers.get_mut(index) {
            passenger.seat_preference = preference;
        }
    }

    /// One error per passenger row whose name is blank. Indexes are 1-based.
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        let errors: Vec<FormError> = self
            .passengers
            .iter()
            .enumerate()
            .filter(|(_, p)| p.name.trim().is_empty())
            .map(|(i, _)| FormError::PassengerName { index: i + 1 })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn price_preview(&self) -> Option<PricePreview> {
        self.flight
            .as_ref()
            .map(|f| PricePreview::new(f.price, self.num_passengers(), self.service_fee))
    }

    /// Validates and moves to `Submitting`, returning the request to send.
    pub fn begin_submit(&mut self) -> Result<BookingRequest, FlowError> {
        self.require_state(&[FlowState::Editing], "submit")?;
        self.validate().map_err(FlowError::Invalid)?;

        let flight = self
            .flight
            .as_ref()
            .ok_or(FlowError::InvalidState { state: "editing", action: "submit without a flight" })?;
        let request = BookingRequest {
            flight_id: flight.id,
            num_tickets: self.num_passengers(),
            passenger_details: self
                .passengers
                .iter()
                .map(|p| PassengerDetail {
                    name: p.name.trim().to_string(),
                    seat_preference: p.seat_preference,
                })
                .collect(),
        };
        self.state = FlowState::Submitting;
        Ok(request)
    }

    pub fn finish_submit(&mut self, result: Result<BookingConfirmation, ApiError>) {
        match result {
            Ok(confirmation) => {
                info!(booking_id = %confirmation.booking_id, status = %confirmation.status, "booking created");
                self.state = FlowState::Succeeded(confirmation);
            }
            Err(err) => self.submit_failed(&err),
        }
    }

    fn submit_failed(&mut self, err: &ApiError) {
        self.state = match err {
            ApiError::Cancelled => FlowState::Editing,
            other => FlowState::Failed(other.user_message().to_string()),
        };
    }

    /// From `Failed`, go back to wherever the user can act again.
    pub fn retry(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::Failed(_)) {
            return Err(FlowError::InvalidState {
                state: self.state.name(),
                action: "retry",
            });
        }
        self.state = if self.flight.is_some() {
            FlowState::Editing
        } else {
            FlowState::LoadingFlight
        };
        Ok(())
    }

    /// Fetches the user's bookings for the unpaid-booking check, then loads the flight.
    pub async fn start(
        &mut self,
        api: &ApiClient,
        user_email: &str,
        flight: Flight,
        requested_passengers: u32,
        cancel: &CancelHandle,
    ) -> Result<(), FlowError> {
        match cancellable(cancel, api.get_bookings(user_email)).await {
            Ok(bookings) => self.load(flight, &bookings, requested_passengers),
            Err(err) => {
                self.load_failed(&err);
                Err(err.into())
            }
        }
    }

    /// Issues exactly one `create_booking`.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        user_email: &str,
        cancel: &CancelHandle,
    ) -> Result<BookingConfirmation, FlowError> {
        let request = self.begin_submit()?;
        match cancellable(cancel, api.create_booking(&request, user_email)).await {
            Ok(confirmation) => {
                self.finish_submit(Ok(confirmation.clone()));
                Ok(confirmation)
            }
            Err(err) => {
                self.submit_failed(&err);
                Err(err.into())
            }
        }
    }

    fn require_state(&self, allowed: &[FlowState], action: &'static str) -> Result<(), FlowError> {
        if allowed.iter().any(|s| std::mem::discriminant(s) == std::mem::discriminant(&self.state)) {
            Ok(())
        } else {
            Err(FlowError::InvalidState {
                state: self.state.name(),
                action,
            })
        }
    }
}
