use std::path::PathBuf;

use log::{debug, info, warn};

use crate::dataset;
use crate::error::Error;
use crate::extract::{extract_page, Page};
use crate::settings::Settings;
use crate::timeanddate::{days_in_month, HistoryRequest, PageSource};
use crate::units::{Normalizer, Rule};
use crate::weather::{field, DaySet};

/// What to fetch and where to put it.
pub struct Job {
    pub request: HistoryRequest,
    /// Fetch every day of the month separately instead of one page.
    pub all_days: bool,
    pub output: PathBuf,
}

pub struct Scrape<'a, S: PageSource> {
    source: &'a S,
    settings: &'a Settings,
    normalizer: Normalizer,
}

impl<'a, S: PageSource> Scrape<'a, S> {
    pub fn new(source: &'a S, settings: &'a Settings) -> Self {
        let mut normalizer = settings
            .extra_units
            .iter()
            .fold(Normalizer::new(&settings.units), |n, (name, unit)| {
                n.with_rule(name, Rule::StripUnit(unit.clone()))
            });
        if settings.keep_clock_time {
            normalizer = normalizer.with_rule(field::TIME, Rule::Verbatim);
        }
        Self {
            source,
            settings,
            normalizer,
        }
    }

    /// Fetch, extract and normalize one page.
    pub fn page(&self, request: &HistoryRequest) -> Result<Page, Error> {
        let html = self.source.fetch(&request.url(self.settings))?;
        let mut page = extract_page(&html, self.settings)?;
        for record in &mut page.records {
            self.normalizer.normalize(record);
        }
        Ok(page)
    }

    /// One page for the request; the selector's current option labels it.
    pub fn single(&self, request: &HistoryRequest) -> Result<DaySet, Error> {
        let mut days = DaySet::new();
        match self.page(request) {
            Ok(page) => {
                let key = match (request.day, page.selected_label()) {
                    (Some(day), _) => date_key(request, day),
                    (None, Some(label)) => label.to_string(),
                    (None, None) => format!("{:04}-{:02}", request.year, request.month),
                };
                info!("{key}: {} observations", page.records.len());
                days.push(key, page.records);
            }
            Err(e) if e.is_skippable() => warn!("no data for {}: {e}", request.url(self.settings)),
            Err(e) => return Err(e),
        }
        Ok(days)
    }

    /// Every day of the month, one fetch each. A failed day is left out.
    pub fn month_by_day(&self, request: &HistoryRequest) -> Result<DaySet, Error> {
        let count = days_in_month(request.year, request.month).ok_or_else(|| {
            Error::InvalidDate(format!("{}-{:02}", request.year, request.month))
        })?;

        let mut days = DaySet::new();
        for day in 1..=count {
            let key = date_key(request, day);
            match self.page(&request.on_day(day)) {
                Ok(page) => {
                    info!("{key}: {} observations", page.records.len());
                    days.push(key, page.records);
                }
                Err(e) if e.is_skippable() => warn!("skipping {key}: {e}"),
                Err(e) => return Err(e),
            }
        }
        Ok(days)
    }

    pub fn run(&self, job: &Job) -> Result<Option<usize>, Error> {
        job.request.validate()?;
        let days = if job.all_days {
            self.month_by_day(&job.request)?
        } else {
            self.single(&job.request)?
        };
        info!(
            "collected {} records over {} page(s)",
            days.record_count(),
            days.len()
        );
        debug!("keys: {}", days.keys().collect::<Vec<_>>().join(", "));
        dataset::write_csv(&days, &job.output, job.all_days)
    }
}

fn date_key(request: &HistoryRequest, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", request.year, request.month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::tests::{page, row};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;

    /// Serves the same page for every URL except those mapped to a status.
    struct FakeSource {
        html: String,
        failures: HashMap<String, u16>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new(html: String) -> Self {
            Self {
                html,
                failures: HashMap::new(),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn failing(mut self, url: String, status: u16) -> Self {
            self.failures.insert(url, status);
            self
        }
    }

    impl PageSource for FakeSource {
        fn fetch(&self, url: &str) -> Result<String, Error> {
            self.requested.borrow_mut().push(url.to_string());
            match self.failures.get(url) {
                Some(&status) => Err(Error::Status {
                    url: url.to_string(),
                    status,
                }),
                None => Ok(self.html.clone()),
            }
        }
    }

    fn sample_page() -> String {
        page(&[
            row("00:30", "26 °C", "7 km/h", Some("Wind blowing from 60° East-northeast")),
            row("01:00", "25 °C", "No wind", None),
        ])
    }

    fn job(dir: &tempfile::TempDir, month: u32, all_days: bool) -> Job {
        Job {
            request: HistoryRequest::new("indonesia", "jakarta", month, 2023),
            all_days,
            output: dir.path().join("out.csv"),
        }
    }

    #[test]
    fn single_page_is_normalized_and_written() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let source = FakeSource::new(sample_page());

        let rows = Scrape::new(&source, &settings).run(&job(&dir, 7, false)).unwrap();

        assert_eq!(rows, Some(2));
        assert_eq!(
            fs::read_to_string(dir.path().join("out.csv")).unwrap(),
            "Time,Temp,Weather,Wind,Direction,Humidity,Barometer,Visibility\n\
             00,26,Passing clouds.,7,ENE,89,1010,10\n\
             01,25,Passing clouds.,,,89,1010,10\n"
        );
        assert_eq!(
            *source.requested.borrow(),
            ["https://www.timeanddate.com/weather/indonesia/jakarta/historic?month=07&year=2023"]
        );
    }

    #[test]
    fn clock_time_kept_when_configured() {
        let settings = Settings {
            keep_clock_time: true,
            ..Settings::default()
        };
        let source = FakeSource::new(sample_page());
        let request = HistoryRequest::new("indonesia", "jakarta", 7, 2023);

        let page = Scrape::new(&source, &settings).page(&request).unwrap();
        assert_eq!(page.records[0].get("Time"), Some("00:30"));
        assert_eq!(page.records[1].get("Time"), Some("01:00"));
        assert_eq!(page.records[0].get("Temp"), Some("26"));
    }

    #[test]
    fn selected_option_labels_single_page() {
        let settings = Settings::default();
        let source = FakeSource::new(sample_page());
        let request = HistoryRequest::new("indonesia", "jakarta", 7, 2023);

        let days = Scrape::new(&source, &settings).single(&request).unwrap();
        assert_eq!(days.keys().collect::<Vec<_>>(), ["Saturday, 1 July 2023"]);

        let days = Scrape::new(&source, &settings)
            .single(&request.on_day(9))
            .unwrap();
        assert_eq!(days.keys().collect::<Vec<_>>(), ["2023-07-09"]);
    }

    #[test]
    fn failed_days_are_left_out() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let request = HistoryRequest::new("indonesia", "jakarta", 2, 2023);
        let source = FakeSource::new(sample_page())
            .failing(request.on_day(2).url(&settings), 404)
            .failing(request.on_day(3).url(&settings), 500);

        let rows = Scrape::new(&source, &settings).run(&job(&dir, 2, true)).unwrap();

        assert_eq!(source.requested.borrow().len(), 28);
        assert_eq!(rows, Some(26 * 2));
        let text = fs::read_to_string(dir.path().join("out.csv")).unwrap();
        assert!(text.starts_with("Day,Time,Temp,"));
        assert!(text.contains("2023-02-01,00,26,"));
        assert!(text.contains("2023-02-28,01,25,"));
        assert!(!text.contains("2023-02-02"));
        assert!(!text.contains("2023-02-03"));
    }

    #[test]
    fn missing_table_skips_every_day() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let source = FakeSource::new("<html><body>Not found</body></html>".to_string());

        let rows = Scrape::new(&source, &settings).run(&job(&dir, 2, true)).unwrap();

        assert_eq!(rows, None);
        assert!(!dir.path().join("out.csv").exists());
    }

    #[test]
    fn http_error_on_single_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let url = HistoryRequest::new("indonesia", "jakarta", 7, 2023).url(&settings);
        let source = FakeSource::new(sample_page()).failing(url, 503);

        let rows = Scrape::new(&source, &settings).run(&job(&dir, 7, false)).unwrap();
        assert_eq!(rows, None);
    }

    #[test]
    fn malformed_page_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let short_row = "<tr><th>00:30</th><td>26 °C</td></tr>".to_string();
        let source = FakeSource::new(page(&[short_row]));

        let err = Scrape::new(&source, &settings)
            .run(&job(&dir, 7, true))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedPage(_)));
        assert_eq!(source.requested.borrow().len(), 1);
    }

    #[test]
    fn invalid_date_fails_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let source = FakeSource::new(sample_page());
        let mut job = job(&dir, 2, false);
        job.request = job.request.on_day(30);

        let err = Scrape::new(&source, &settings).run(&job).unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
        assert!(source.requested.borrow().is_empty());
    }
}
