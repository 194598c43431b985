use chrono::{DateTime, Utc};

/// `dd/mm/yyyy`, as shown in the admin lists.
pub fn display_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_date_pads_day_and_month() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 15, 30, 0).unwrap();
        assert_eq!(display_date(&date), "07/03/2024");
    }
}
