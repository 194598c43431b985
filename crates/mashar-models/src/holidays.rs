use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::ids::CalendarId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub name: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub is_vacation: bool,
    /// Lessons still take place
    #[serde(default)]
    pub is_lesson: bool,
    /// School ids the holiday applies to; empty means all
    #[serde(default)]
    pub schools: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayCalendar {
    pub id: CalendarId,
    pub branch: String,
    pub name: String,
    pub year: String,
    pub sector: Option<String>,
    #[schema(value_type = Vec<Holiday>)]
    pub holidays: Json<Vec<Holiday>>,
}

fn validate_ranges(holidays: &[Holiday]) -> Result<(), ValidationError> {
    if holidays.iter().any(|h| h.from > h.to) {
        let mut err = ValidationError::new("holiday_range");
        err.message = Some("Holiday start must not be after its end".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayCalendarDto {
    #[validate(length(min = 1, max = 100, message = "Calendar name is required"))]
    pub name: String,
    #[serde(default)]
    pub year: String,
    pub sector: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_ranges"))]
    pub holidays: Vec<Holiday>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CloneCalendarDto {
    pub id: CalendarId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn holiday(from_day: u32, to_day: u32) -> Holiday {
        Holiday {
            name: "Pesach".to_string(),
            from: Utc.with_ymd_and_hms(2025, 4, from_day, 0, 0, 0).unwrap(),
            to: Utc.with_ymd_and_hms(2025, 4, to_day, 0, 0, 0).unwrap(),
            is_vacation: true,
            is_lesson: false,
            schools: vec![],
        }
    }

    #[test]
    fn test_valid_range_passes() {
        let dto = HolidayCalendarDto {
            name: "2025".to_string(),
            year: "2025".to_string(),
            sector: None,
            holidays: vec![holiday(10, 20)],
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_fails() {
        let dto = HolidayCalendarDto {
            name: "2025".to_string(),
            year: "2025".to_string(),
            sector: None,
            holidays: vec![holiday(20, 10)],
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("holidays"));
    }
}
