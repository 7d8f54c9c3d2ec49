use std::time::Duration;

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::flight_models::{
    BookingConfirmation, BookingDetail, BookingRequest, BookingSummary, Flight, FlightSearchParams,
    UpdateBookingRequest,
};
use crate::wire::{BookingRecord, CreateBookingBody, ErrorBody, ScheduleRecord, USER_EMAIL_HEADER};

/// HTTP client for the booking backend.
///
/// Stateless apart from the connection pool: no retries, no caching. Every
/// failure is logged here and returned to the caller, which decides what to
/// show.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /schedules?origin&destination&date`
    pub async fn search_flights(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, ApiError> {
        logged("searchFlights", self.fetch_schedules(params).await)
    }

    /// `POST /bookings`. Not idempotent: a repeated call can create a second booking.
    pub async fn create_booking(
        &self,
        request: &BookingRequest,
        user_email: &str,
    ) -> Result<BookingConfirmation, ApiError> {
        logged("createBooking", self.post_booking(request, user_email).await)
    }

    /// `GET /bookings`, identified by header. The backend returns the full set.
    pub async fn get_bookings(&self, user_email: &str) -> Result<Vec<BookingSummary>, ApiError> {
        logged("getBookings", self.fetch_bookings(user_email).await)
    }

    /// `GET /bookings/{id}`
    pub async fn get_booking_by_id(&self, booking_id: &str) -> Result<BookingDetail, ApiError> {
        logged("getBookingById", self.fetch_booking(booking_id).await)
    }

    /// The backend has no update endpoint; this never issues a request.
    pub async fn update_booking(
        &self,
        booking_id: &str,
        update: &UpdateBookingRequest,
    ) -> Result<BookingDetail, ApiError> {
        debug!(booking_id, ?update, "update requested");
        logged("updateBooking", Err(ApiError::NotImplemented("updating a booking")))
    }

    /// The backend has no cancel endpoint; this never issues a request.
    pub async fn cancel_booking(&self, booking_id: &str) -> Result<(), ApiError> {
        debug!(booking_id, "cancel requested");
        logged("cancelBooking", Err(ApiError::NotImplemented("cancelling a booking")))
    }
}

impl ApiClient {
    async fn fetch_schedules(&self, params: &FlightSearchParams) -> Result<Vec<Flight>, ApiError> {
        let url = self.endpoint(&["schedules"])?;
        let date = params.departure_date.format("%Y-%m-%d").to_string();
        debug!(%url, origin = %params.origin_city, destination = %params.destination_city, %date, "searching flights");

        let response = self
            .client
            .get(url)
            .query(&[
                ("origin", params.origin_city.as_str()),
                ("destination", params.destination_city.as_str()),
                ("date", date.as_str()),
            ])
            .send()
            .await?;
        let records: Vec<ScheduleRecord> = read_json(response).await?;

        let flights = records
            .into_iter()
            .map(ScheduleRecord::into_flight)
            .collect::<Result<Vec<_>, _>>()?;
        for flight in flights.iter().filter(|f| !f.schedule_is_consistent()) {
            warn!(
                flight_id = flight.id,
                departure = %flight.departure_datetime,
                arrival = %flight.arrival_datetime,
                "backend returned a schedule that does not depart before it arrives"
            );
        }
        Ok(flights)
    }

    async fn post_booking(&self, request: &BookingRequest, user_email: &str) -> Result<BookingConfirmation, ApiError> {
        let url = self.endpoint(&["bookings"])?;
        let body = CreateBookingBody {
            flight_id: request.flight_id,
            user_email: user_email.to_string(),
            num_seats: request.num_tickets,
        };
        debug!(%url, flight_id = body.flight_id, num_seats = body.num_seats, "creating booking");

        let response = self
            .client
            .post(url)
            .header(USER_EMAIL_HEADER, user_email)
            .json(&body)
            .send()
            .await?;
        let record: BookingRecord = read_json(response).await?;
        record.into_confirmation()
    }

    async fn fetch_bookings(&self, user_email: &str) -> Result<Vec<BookingSummary>, ApiError> {
        let url = self.endpoint(&["bookings"])?;
        debug!(%url, "fetching bookings");

        let response = self
            .client
            .get(url)
            .header(USER_EMAIL_HEADER, user_email)
            .send()
            .await?;
        let records: Vec<BookingRecord> = read_json(response).await?;
        records.into_iter().map(BookingRecord::into_summary).collect()
    }

    async fn fetch_booking(&self, booking_id: &str) -> Result<BookingDetail, ApiError> {
        let url = self.endpoint(&["bookings", booking_id])?;
        debug!(%url, "fetching booking");

        let response = self.client.get(url).send().await?;
        let record: BookingRecord = read_json(response).await?;
        record.into_detail()
    }
}

fn logged<T>(operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(err) = &result {
        error!(operation, error = %err, "api call failed");
    }
    result
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Result<ApiClient, ApiError> {
        ApiClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 1,
        })
    }

    #[test]
    fn endpoints_keep_base_path() {
        let api = client("http://10.0.2.2:5000/api/").unwrap();
        assert_eq!(api.endpoint(&["bookings"]).unwrap().as_str(), "http://10.0.2.2:5000/api/bookings");

        let api = client("http://localhost:5000").unwrap();
        assert_eq!(
            api.endpoint(&["bookings", "a b/c"]).unwrap().as_str(),
            "http://localhost:5000/bookings/a%20b%2Fc"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(client("not a url"), Err(ApiError::InvalidBaseUrl(_))));
        assert!(matches!(client("mailto:ops@example.com"), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[tokio::test]
    async fn update_and_cancel_always_fail() {
        // Port 9 (discard) is never contacted: these return before any I/O.
        let api = client("http://127.0.0.1:9").unwrap();
        let err = api.cancel_booking("a1b2").await.unwrap_err();
        assert!(matches!(err, ApiError::NotImplemented(_)));

        let err = api
            .update_booking("a1b2", &UpdateBookingRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotImplemented(_)));
    }
}
