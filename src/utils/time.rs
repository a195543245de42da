
use chrono::NaiveDate;


/// This is the standard way of converting a date to a string in taptrack.
/// The format sorts lexicographically in chronological order.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Long form used for banners, e.g. "Sunday, March 31, 2024".
pub fn date_to_readable(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{date_to_key, date_to_readable};

    #[test]
    fn keys_are_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(date_to_key(date), "2024-03-01");
    }

    #[test]
    fn readable_form_spells_out_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(date_to_readable(date), "Sunday, March 31, 2024");
    }
}
