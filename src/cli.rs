use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::Parser;

const ABOUT: &str = "Historical weather scraper for timeanddate.com";

const LONG_ABOUT: &str = "
Download the historic weather observations of one city from timeanddate.com and save them as CSV.

Country and city are the slugs used in the site's URLs (e.g. `indonesia jakarta` for
https://www.timeanddate.com/weather/indonesia/jakarta/historic). By default one page is fetched for
the month; `--all-days` fetches every day of the month separately and adds a `Day` column.

Set RUST_LOG=debug for request and column details.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(default_value = "indonesia", help = "Country slug (e.g. indonesia, usa, uk)")]
    pub country: String,

    #[arg(default_value = "jakarta", help = "City slug (e.g. jakarta, new-york, london)")]
    pub city: String,

    #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,

    #[arg(short, long, default_value_t = 2023)]
    pub year: i32,

    #[arg(
        short,
        long,
        conflicts_with = "all_days",
        value_parser = clap::value_parser!(u32).range(1..=31),
        help = "Fetch a single day of the month"
    )]
    pub day: Option<u32>,

    #[arg(short, long, help = "Fetch each day of the month separately")]
    pub all_days: bool,

    #[arg(short, long, help = "Output file [default: <country>_<city>_weather_dataset.csv]")]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Directory for the default output file")]
    pub output_dir: PathBuf,

    #[arg(long, help = "JSON file overriding base URL, user agent, element ids or unit markers")]
    pub settings: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["wxhist"]).unwrap();
        assert_eq!(args.country, "indonesia");
        assert_eq!(args.city, "jakarta");
        assert_eq!((args.month, args.year, args.day), (7, 2023, None));
        assert!(!args.all_days);
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn day_and_all_days_conflict() {
        assert!(Args::try_parse_from(["wxhist", "norway", "oslo", "-d", "3", "-a"]).is_err());
        assert!(Args::try_parse_from(["wxhist", "-m", "13"]).is_err());
    }
}
