//! Membership domain model: the relation binding one user to one group.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GrouperError;

/// Wire and storage format for expiration dates.
pub const EXPIRATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// At most one membership exists per `(group_id, user_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Membership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    /// Delegated admin rights over this group only.
    pub is_group_admin: bool,
    /// Calendar date, no time component. `None` = non-expiring.
    pub expiration_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// A membership is still valid on its expiration date and lapses
    /// the day after.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|date| date < today)
    }
}

/// Create-or-update input for a membership row.
#[derive(Debug, Clone, Default)]
pub struct UpsertMembership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    /// `None` = keep the stored flag (false for a new row).
    pub is_group_admin: Option<bool>,
    /// `Some(Some(d))` = set, `Some(None)` = clear, `None` = no change.
    pub expiration_date: Option<Option<NaiveDate>>,
}

/// Parse an optional ISO `YYYY-MM-DD` expiration date.
///
/// Blank input counts as absent.
pub fn parse_expiration_date(raw: Option<&str>) -> Result<Option<NaiveDate>, GrouperError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, EXPIRATION_DATE_FORMAT)
        .map(Some)
        .map_err(|e| GrouperError::Validation {
            message: format!("invalid expiration_date '{raw}': {e}"),
        })
}

pub fn format_expiration_date(date: NaiveDate) -> String {
    date.format(EXPIRATION_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(expiration_date: Option<NaiveDate>) -> Membership {
        Membership {
            group_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            is_group_admin: false,
            expiration_date,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_calendar_date() {
        let date = parse_expiration_date(Some("2019-10-10")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 10, 10));
    }

    #[test]
    fn absent_or_blank_date_means_no_expiration() {
        assert_eq!(parse_expiration_date(None).unwrap(), None);
        assert_eq!(parse_expiration_date(Some("  ")).unwrap(), None);
    }

    #[test]
    fn rejects_malformed_dates() {
        for raw in ["10/10/2019", "2019-13-01", "2019-02-30", "tomorrow"] {
            let err = parse_expiration_date(Some(raw)).unwrap_err();
            assert!(matches!(err, GrouperError::Validation { .. }), "{raw}");
        }
    }

    #[test]
    fn rejects_time_component() {
        assert!(parse_expiration_date(Some("2019-10-10T12:00:00Z")).is_err());
    }

    #[test]
    fn format_is_inverse_of_parse() {
        let date = NaiveDate::from_ymd_opt(2019, 10, 10).unwrap();
        assert_eq!(format_expiration_date(date), "2019-10-10");
    }

    #[test]
    fn expiry_day_is_still_valid() {
        let day = NaiveDate::from_ymd_opt(2019, 10, 10).unwrap();
        let m = membership(Some(day));
        assert!(!m.is_expired_on(day));
        assert!(m.is_expired_on(day.succ_opt().unwrap()));
        assert!(!membership(None).is_expired_on(day));
    }
}
