use chrono::NaiveDate;
use log::debug;
use reqwest::blocking::Client;

use crate::error::Error;
use crate::settings::Settings;

/// One history page: a month, or a single day of it when `day` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub country: String,
    pub city: String,
    pub month: u32,
    pub year: i32,
    pub day: Option<u32>,
}

impl HistoryRequest {
    pub fn new(country: &str, city: &str, month: u32, year: i32) -> Self {
        Self {
            country: country.to_string(),
            city: city.to_string(),
            month,
            year,
            day: None,
        }
    }

    pub fn on_day(&self, day: u32) -> Self {
        Self {
            day: Some(day),
            ..self.clone()
        }
    }

    /// Checks month and day against the calendar.
    pub fn validate(&self) -> Result<(), Error> {
        let day = self.day.unwrap_or(1);
        NaiveDate::from_ymd_opt(self.year, self.month, day)
            .map(|_| ())
            .ok_or_else(|| {
                Error::InvalidDate(format!("{}-{:02}-{:02}", self.year, self.month, day))
            })
    }

    pub fn url(&self, settings: &Settings) -> String {
        let base = settings.base_url.trim_end_matches('/');
        let mut url = format!(
            "{base}/weather/{}/{}/historic?month={:02}&year={:04}",
            self.country, self.city, self.month, self.year
        );
        if let Some(day) = self.day {
            url.push_str(&format!("&hd={:04}{:02}{:02}", self.year, self.month, day));
        }
        url
    }
}

/// Number of days in `month`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Where page HTML comes from.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String, Error>;
}

pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, Error> {
        debug!("GET {url}");
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}

#[test]
fn test_month_url() {
    let request = HistoryRequest::new("indonesia", "jakarta", 7, 2023);
    assert_eq!(
        request.url(&Settings::default()),
        "https://www.timeanddate.com/weather/indonesia/jakarta/historic?month=07&year=2023"
    );
}

#[test]
fn test_day_url() {
    let settings = Settings {
        base_url: "http://localhost:8080/".to_string(),
        ..Settings::default()
    };
    let request = HistoryRequest::new("indonesia", "jakarta", 7, 2023).on_day(4);
    assert_eq!(
        request.url(&settings),
        "http://localhost:8080/weather/indonesia/jakarta/historic?month=07&year=2023&hd=20230704"
    );
}

#[test]
fn test_validate() {
    let request = HistoryRequest::new("norway", "oslo", 2, 2023);
    assert!(request.validate().is_ok());
    assert!(request.on_day(28).validate().is_ok());
    assert!(matches!(
        request.on_day(29).validate(),
        Err(Error::InvalidDate(d)) if d == "2023-02-29"
    ));
    assert!(HistoryRequest::new("norway", "oslo", 13, 2023).validate().is_err());
}

#[test]
fn test_days_in_month() {
    assert_eq!(days_in_month(2023, 7), Some(31));
    assert_eq!(days_in_month(2023, 2), Some(28));
    assert_eq!(days_in_month(2024, 2), Some(29));
    assert_eq!(days_in_month(2023, 12), Some(31));
    assert_eq!(days_in_month(2023, 0), None);
}
