use crate::flight_models::BookingStatus;
use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeIcon {
    Check,
    Clock,
    Cross,
}

/// What the status badge shows for one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
    pub icon: Option<BadgeIcon>,
}

impl Badge {
    /// Total over every status. Anything without its own entry, EXPIRED
    /// included, shows the raw status text, muted and without an icon.
    pub fn for_status(status: &BookingStatus) -> Self {
        let (label, tone, icon) = match status {
            BookingStatus::Confirmed => ("Confirmed", Tone::Success, Some(BadgeIcon::Check)),
            BookingStatus::Pending => ("Pending", Tone::Warning, Some(BadgeIcon::Clock)),
            BookingStatus::PendingPayment => ("Pending Payment", Tone::Warning, Some(BadgeIcon::Clock)),
            BookingStatus::Cancelled => ("Cancelled", Tone::Error, Some(BadgeIcon::Cross)),
            BookingStatus::Expired | BookingStatus::Other(_) => (status.as_str(), Tone::Muted, None),
        };
        Self {
            label: label.to_string(),
            tone,
            icon,
        }
    }

    pub fn color<'a>(&self, palette: &'a Palette) -> &'a str {
        match self.tone {
            Tone::Success => palette.success,
            Tone::Warning => palette.warning,
            Tone::Error => palette.error,
            Tone::Muted => palette.text_secondary,
        }
    }

    /// Badge background: the foreground color at ~8% alpha (`#RRGGBB15`).
    pub fn background(&self, palette: &Palette) -> String {
        format!("{}15", self.color(palette))
    }

    /// Plain-text form for the terminal client, e.g. `[✓ Confirmed]`.
    pub fn render(&self) -> String {
        match self.icon {
            Some(BadgeIcon::Check) => format!("[✓ {}]", self.label),
            Some(BadgeIcon::Clock) => format!("[◷ {}]", self.label),
            Some(BadgeIcon::Cross) => format!("[✗ {}]", self.label),
            None => format!("[{}]", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::LIGHT;

    #[test]
    fn known_statuses() {
        let badge = Badge::for_status(&BookingStatus::PendingPayment);
        assert_eq!(badge.label, "Pending Payment");
        assert_eq!(badge.color(&LIGHT), "#F39C12");
        assert_eq!(badge.background(&LIGHT), "#F39C1215");

        let badge = Badge::for_status(&BookingStatus::Cancelled);
        assert_eq!(badge.render(), "[✗ Cancelled]");
    }

    #[test]
    fn expired_shows_raw_status() {
        let badge = Badge::for_status(&BookingStatus::Expired);
        assert_eq!(badge.label, "EXPIRED");
        assert_eq!(badge.tone, Tone::Muted);
        assert_eq!(badge.icon, None);
        assert_eq!(badge.color(&LIGHT), LIGHT.text_secondary);
        assert_eq!(badge.render(), "[EXPIRED]");
    }

    #[test]
    fn mapping_is_total() {
        for raw in ["", "REFUNDED", "confirmed", "ÜBERBUCHT", "PENDING", "EXPIRED"] {
            let status = BookingStatus::from(raw);
            let badge = Badge::for_status(&status);
            assert!(!badge.color(&LIGHT).is_empty());
            if let BookingStatus::Other(_) = status {
                assert_eq!(badge.label, raw);
                assert_eq!(badge.tone, Tone::Muted);
                assert_eq!(badge.icon, None);
            }
        }
    }
}
