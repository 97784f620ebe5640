use serde::Deserialize;

/// Query for GET /api/prayer-times.
#[derive(Debug, Clone, Deserialize)]
pub struct PrayerTimesQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub method: Option<i32>,
    pub school: Option<i32>,
    pub date: Option<String>, // YYYY-MM-DD, defaults to today
}

impl PrayerTimesQuery {
    pub fn validate(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude out of range: {}", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude out of range: {}", self.longitude));
        }
        if let Some(ref date) = self.date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(format!("Invalid date: '{}'. Expected YYYY-MM-DD", date));
            }
        }
        Ok(())
    }
}

/// Query for GET /api/gold-prices.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldPriceQuery {
    pub metal: Option<String>,
    pub category: Option<String>,
    pub days: Option<i64>,
}

impl GoldPriceQuery {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref metal) = self.metal {
            if !["gold", "silver"].contains(&metal.as_str()) {
                return Err(format!("metal must be 'gold' or 'silver', got: '{}'", metal));
            }
        }
        if let Some(days) = self.days {
            if days < 1 || days > 365 {
                return Err(format!("days must be between 1 and 365, got: {}", days));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prayer_times_coordinates() {
        let query = PrayerTimesQuery {
            latitude: 23.8103,
            longitude: 90.4125,
            method: None,
            school: None,
            date: None,
        };
        assert!(query.validate().is_ok());

        let query = PrayerTimesQuery {
            latitude: 91.0,
            longitude: 0.0,
            method: None,
            school: None,
            date: None,
        };
        assert!(query.validate().is_err());

        let query = PrayerTimesQuery {
            latitude: 0.0,
            longitude: -181.0,
            method: None,
            school: None,
            date: None,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_prayer_times_date_format() {
        let query = PrayerTimesQuery {
            latitude: 0.0,
            longitude: 0.0,
            method: None,
            school: None,
            date: Some("2026-13-01".to_string()),
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_gold_price_metal_whitelist() {
        let query = GoldPriceQuery {
            metal: Some("copper".to_string()),
            category: None,
            days: None,
        };
        assert!(query.validate().is_err());

        let query = GoldPriceQuery {
            metal: Some("silver".to_string()),
            category: Some("22k".to_string()),
            days: Some(30),
        };
        assert!(query.validate().is_ok());
    }
}
