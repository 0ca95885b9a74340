use chrono::{DateTime, Utc};

/// Compact age label: `3d`, `5h` or `12m`. Unknown creation times render as `-`.
pub fn format_age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "-".to_string();
    };
    let age = now.signed_duration_since(created_at);
    if age.num_days() > 0 {
        format!("{}d", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{}h", age.num_hours())
    } else {
        format!("{}m", age.num_minutes().max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_age() {
        let now = Utc::now();
        assert_eq!(format_age(Some(now - Duration::days(3)), now), "3d");
        assert_eq!(format_age(Some(now - Duration::hours(5)), now), "5h");
        assert_eq!(format_age(Some(now - Duration::minutes(12)), now), "12m");
        assert_eq!(format_age(Some(now + Duration::minutes(1)), now), "0m");
        assert_eq!(format_age(None, now), "-");
    }
}
