use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Currency used for display. Amounts from the backend are plain numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Idr,
    Usd,
}

/// `2h 50m`, from whole minutes between the two instants.
pub fn format_duration(departure: DateTime<Utc>, arrival: DateTime<Utc>) -> String {
    let minutes = (arrival - departure).num_minutes();
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{}h {}m", minutes / 60, minutes % 60)
}

pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%H:%M").to_string()
}

/// `Sat, Dec 20, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

pub fn format_price(amount: f64, currency: Currency) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let amount = amount.abs();
    match currency {
        Currency::Idr => {
            let whole = amount.round() as u64;
            format!("{sign}Rp {}", group_thousands(whole, '.'))
        }
        Currency::Usd => {
            let cents = (amount * 100.0).round() as u64;
            format!("{sign}${}.{:02}", group_thousands(cents / 100, ','), cents % 100)
        }
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
