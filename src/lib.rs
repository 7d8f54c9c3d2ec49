//! Flight search and booking client for the booking HTTP API.
//!
//! [`api::ApiClient`] talks to the backend and remaps its JSON into the
//! view-models in [`flight_models`]; the remaining modules hold the screen
//! logic (search form, booking flow, bookings list) and the development
//! backend used for local runs and integration tests.

pub mod api;
pub mod backend;
pub mod badge;
pub mod booking_flow;
pub mod bookings;
pub mod cancel;
pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod flight_models;
pub mod format;
pub mod logging;
pub mod search;
pub mod theme;
pub mod wire;

pub use api::ApiClient;
pub use config::Config;
pub use context::AppContext;
pub use error::{ApiError, ConfigError, FlowError, FormError};
pub use flight_models::{
    BookingConfirmation, BookingDetail, BookingRequest, BookingStatus, BookingSummary, Flight, FlightSearchParams,
    PassengerDetail, SeatPreference, UpdateBookingRequest,
};
