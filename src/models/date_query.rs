use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

/// `?date=YYYY-MM-DD` on the by-date endpoints.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    pub fn parse(&self) -> Result<NaiveDate, AppError> {
        let raw = self.date.as_deref().unwrap_or_default();
        // Strict shape first: chrono alone would accept "2025-8-9".
        let well_formed = raw.len() == 10
            && raw
                .char_indices()
                .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
        if !well_formed {
            return Err(AppError::Validation(
                "date is required (format: YYYY-MM-DD)".into(),
            ));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("{raw} is not a valid date")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(date: Option<&str>) -> DateQuery {
        DateQuery {
            date: date.map(String::from),
        }
    }

    #[test]
    fn test_valid_date() {
        assert_eq!(
            query(Some("2025-08-29")).parse().unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 29).unwrap()
        );
    }

    #[test]
    fn test_missing_or_malformed_date() {
        for bad in [None, Some(""), Some("2025-8-29"), Some("29/08/2025"), Some("2025-08-29T00")] {
            assert!(matches!(query(bad).parse(), Err(AppError::Validation(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_impossible_calendar_date() {
        assert!(matches!(
            query(Some("2025-02-30")).parse(),
            Err(AppError::Validation(_))
        ));
    }
}
