use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A location returned by a search, in the order the provider ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub id: Option<i64>,
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub url: Option<String>,
}

impl LocationCandidate {
    /// Minimal candidate; handy for tests and for cities typed by hand.
    pub fn named(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            region: String::new(),
            country: country.into(),
            lat: 0.0,
            lon: 0.0,
            url: None,
        }
    }

    /// The city identifier sent to the forecast endpoint and persisted after a selection.
    pub fn forecast_query(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub wind_kph: f64,
    pub wind_mph: f64,
    pub humidity_pct: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub avg_temp_c: f64,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub condition: String,
    pub sunrise: String,
    pub sunset: String,
}

impl ForecastDay {
    /// English weekday name for the forecast date, e.g. "Monday".
    pub fn weekday_name(&self) -> &'static str {
        match self.date.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

/// The forecast currently shown on screen. Replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Place,
    pub current: CurrentConditions,
    pub days: Vec<ForecastDay>,
}

impl WeatherSnapshot {
    pub fn sunrise_today(&self) -> Option<&str> {
        self.days.first().map(|d| d.sunrise.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str) -> ForecastDay {
        ForecastDay {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            avg_temp_c: 20.0,
            max_temp_c: 25.0,
            min_temp_c: 15.0,
            condition: "Sunny".into(),
            sunrise: "06:01 AM".into(),
            sunset: "06:30 PM".into(),
        }
    }

    #[test]
    fn weekday_name_matches_date() {
        assert_eq!(day("2024-01-15").weekday_name(), "Monday");
        assert_eq!(day("2024-01-21").weekday_name(), "Sunday");
    }

    #[test]
    fn sunrise_today_uses_first_day() {
        let mut second = day("2024-01-16");
        second.sunrise = "06:02 AM".into();

        let snapshot = WeatherSnapshot {
            location: Place {
                name: "Yangon".into(),
                region: "Yangon".into(),
                country: "Myanmar".into(),
                localtime: None,
            },
            current: CurrentConditions {
                temperature_c: 30.0,
                feels_like_c: 34.0,
                condition: "Partly cloudy".into(),
                wind_kph: 10.0,
                wind_mph: 6.2,
                humidity_pct: 70,
            },
            days: vec![day("2024-01-15"), second],
        };

        assert_eq!(snapshot.sunrise_today(), Some("06:01 AM"));
    }

    #[test]
    fn candidate_label_and_query() {
        let c = LocationCandidate::named("Tokyo", "Japan");
        assert_eq!(c.label(), "Tokyo, Japan");
        assert_eq!(c.forecast_query(), "Tokyo");
    }
}
