use chrono::{Local, Months, NaiveDate};
use regex::Regex;

use crate::{storage::Attachment, Error, Success};

/// Booking field rules
#[derive(Serialize, Deserialize, Clone)]
pub struct BookingConfig {
    /// Booking window length in calendar months
    pub window_months: u32,

    /// Mobile number pattern
    ///
    /// Defaults to a ten-digit plan starting 6-9; swap per region.
    pub mobile_pattern: String,

    /// Attachment size ceiling in bytes
    pub max_attachment_size: usize,

    /// Accepted attachment encodings
    pub attachment_types: Vec<String>,
}

impl Default for BookingConfig {
    fn default() -> BookingConfig {
        BookingConfig {
            window_months: 2,
            mobile_pattern: "^[6789][0-9]{9}$".to_string(),
            max_attachment_size: 1024 * 1024,
            attachment_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }
}

impl BookingConfig {
    /// Check a mobile number against the configured pattern
    pub fn assert_mobile(&self, mobile: &str) -> Success {
        let pattern = Regex::new(&self.mobile_pattern).map_err(|_| Error::InternalError)?;
        if pattern.is_match(mobile) {
            Ok(())
        } else {
            Err(Error::IncorrectData { with: "mobile" })
        }
    }

    /// Check a date falls within [today, today + window]
    ///
    /// Date-only comparison evaluated in server-local time. Callers near a
    /// midnight boundary may see inconsistent acceptance; known imprecision,
    /// kept as-is.
    pub fn assert_within_window(&self, date: NaiveDate) -> Success {
        let today = Local::now().date_naive();
        let max = today
            .checked_add_months(Months::new(self.window_months))
            .ok_or(Error::InternalError)?;

        if date < today || date > max {
            Err(Error::OutsideBookingWindow)
        } else {
            Ok(())
        }
    }

    /// Check an attachment's encoding and size before it is stored
    pub fn assert_attachment(&self, attachment: &Attachment) -> Success {
        if !self
            .attachment_types
            .iter()
            .any(|encoding| encoding == &attachment.content_type)
        {
            return Err(Error::UnsupportedAttachment);
        }

        if attachment.data.len() > self.max_attachment_size {
            return Err(Error::AttachmentTooLarge);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let booking = BookingConfig::default();
        let today = Local::now().date_naive();
        let max = today.checked_add_months(Months::new(2)).unwrap();

        assert!(booking.assert_within_window(today).is_ok());
        assert!(booking.assert_within_window(max).is_ok());
        assert_eq!(
            booking.assert_within_window(today.pred_opt().unwrap()),
            Err(Error::OutsideBookingWindow)
        );
        assert_eq!(
            booking.assert_within_window(max.succ_opt().unwrap()),
            Err(Error::OutsideBookingWindow)
        );
    }

    #[test]
    fn mobile_pattern() {
        let booking = BookingConfig::default();
        assert!(booking.assert_mobile("9876543210").is_ok());
        assert!(booking.assert_mobile("1234567890").is_err());
        assert!(booking.assert_mobile("98765").is_err());
        assert!(booking.assert_mobile("98765432100").is_err());
    }

    #[test]
    fn attachment_rules() {
        let booking = BookingConfig::default();

        let ok = Attachment {
            data: vec![0; 512],
            content_type: "image/png".into(),
        };
        assert!(booking.assert_attachment(&ok).is_ok());

        let oversize = Attachment {
            data: vec![0; 1024 * 1024 + 1],
            content_type: "image/jpeg".into(),
        };
        assert_eq!(
            booking.assert_attachment(&oversize),
            Err(Error::AttachmentTooLarge)
        );

        let pdf = Attachment {
            data: vec![0; 16],
            content_type: "application/pdf".into(),
        };
        assert_eq!(
            booking.assert_attachment(&pdf),
            Err(Error::UnsupportedAttachment)
        );
    }
}
