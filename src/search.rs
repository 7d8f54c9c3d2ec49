use chrono::NaiveDate;
use lazy_static::lazy_static;

use crate::error::FormError;
use crate::flight_models::FlightSearchParams;

pub const MIN_PASSENGERS: u32 = 1;
pub const MAX_PASSENGERS: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub code: &'static str,
    pub name: &'static str,
}

lazy_static! {
    /// Airports offered by the origin/destination pickers.
    pub static ref CITIES: Vec<City> = vec![
        City { code: "CGK", name: "Jakarta" },
        City { code: "DPS", name: "Bali (Denpasar)" },
        City { code: "SUB", name: "Surabaya" },
        City { code: "JOG", name: "Yogyakarta" },
        City { code: "KNO", name: "Medan" },
        City { code: "UPG", name: "Makassar" },
        City { code: "BPN", name: "Balikpapan" },
        City { code: "LOP", name: "Lombok" },
        City { code: "PDG", name: "Padang" },
        City { code: "SIN", name: "Singapore" },
    ];
}

/// Case-insensitive substring match on code or name. A blank query returns everything.
pub fn filter_cities(query: &str) -> Vec<&'static City> {
    let needle = query.trim().to_lowercase();
    CITIES
        .iter()
        .filter(|city| {
            needle.is_empty()
                || city.code.to_lowercase().contains(&needle)
                || city.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Search screen form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub num_passengers: u32,
}

impl SearchForm {
    pub fn new(departure_date: NaiveDate) -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            departure_date,
            num_passengers: MIN_PASSENGERS,
        }
    }

    pub fn increment_passengers(&mut self) {
        self.num_passengers = (self.num_passengers + 1).min(MAX_PASSENGERS);
    }

    pub fn decrement_passengers(&mut self) {
        self.num_passengers = self.num_passengers.saturating_sub(1).max(MIN_PASSENGERS);
    }

    pub fn swap_cities(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
    }

    /// Every problem with the current input, in field order.
    pub fn errors(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        let origin = self.origin.trim();
        let destination = self.destination.trim();

        if origin.is_empty() {
            errors.push(FormError::Required("origin"));
        }
        if destination.is_empty() {
            errors.push(FormError::Required("destination"));
        }
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&self.num_passengers) {
            errors.push(FormError::PassengerCount {
                min: MIN_PASSENGERS,
                max: MAX_PASSENGERS,
            });
        }
        errors
    }

    /// Validated query, with city codes upper-cased.
    pub fn submit(&self) -> Result<FlightSearchParams, Vec<FormError>> {
        let errors = self.errors();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(FlightSearchParams {
            origin_city: self.origin.trim().to_uppercase(),
            destination_city: self.destination.trim().to_uppercase(),
            departure_date: self.departure_date,
            num_passengers: self.num_passengers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
    }

    #[test]
    fn filter_matches_code_or_name() {
        let codes: Vec<_> = filter_cities("denpasar").iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["DPS"]);

        // Bali and Balikpapan
        let codes: Vec<_> = filter_cities("bali").iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["DPS", "BPN"]);

        let codes: Vec<_> = filter_cities("cg").iter().map(|c| c.code).collect();
        assert_eq!(codes, vec!["CGK"]);

        assert_eq!(filter_cities("  ").len(), CITIES.len());
        assert!(filter_cities("zzz").is_empty());
    }

    #[test]
    fn passenger_count_is_clamped() {
        let mut form = SearchForm::new(date());
        form.decrement_passengers();
        assert_eq!(form.num_passengers, 1);
        for _ in 0..20 {
            form.increment_passengers();
        }
        assert_eq!(form.num_passengers, 9);
    }

    #[test]
    fn blank_form_reports_required_fields() {
        let form = SearchForm::new(date());
        assert_eq!(
            form.submit().unwrap_err(),
            vec![FormError::Required("origin"), FormError::Required("destination")]
        );
    }

    #[test]
    fn out_of_range_passengers_rejected() {
        let mut form = SearchForm::new(date());
        form.origin = "CGK".into();
        form.destination = "DPS".into();
        form.num_passengers = 10;
        assert_eq!(
            form.submit().unwrap_err(),
            vec![FormError::PassengerCount { min: 1, max: 9 }]
        );
    }

    #[test]
    fn same_origin_and_destination_accepted() {
        let mut form = SearchForm::new(date());
        form.origin = "cgk".into();
        form.destination = "CGK".into();

        let params = form.submit().unwrap();
        assert_eq!(params.origin_city, "CGK");
        assert_eq!(params.destination_city, "CGK");
    }

    #[test]
    fn valid_form_produces_params() {
        let mut form = SearchForm::new(date());
        form.origin = " cgk ".into();
        form.destination = "dps".into();
        form.increment_passengers();

        let params = form.submit().unwrap();
        assert_eq!(params.origin_city, "CGK");
        assert_eq!(params.destination_city, "DPS");
        assert_eq!(params.departure_date, date());
        assert_eq!(params.num_passengers, 2);

        form.swap_cities();
        assert_eq!(form.origin, "dps");
    }
}
