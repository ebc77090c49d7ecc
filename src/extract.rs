use log::debug;
use scraper::{ElementRef, Html, Selector};

use crate::error::Error;
use crate::settings::Settings;
use crate::units::collapse_whitespace;
use crate::weather::{field, WeatherRecord};

/// One entry of the day-selector dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Everything read from one history page.
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<WeatherRecord>,
    pub options: Vec<DayOption>,
}

impl Page {
    pub fn selected_label(&self) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.selected)
            .map(|o| o.label.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Text,
    /// Leading text only; the cell also holds a date span.
    Time,
    /// Tooltip only; the visible text is an arrow glyph.
    Tooltip,
}

#[derive(Debug)]
struct Column {
    name: String,
    /// Cell position in a data row. `None` for a column the page lacks.
    slot: Option<usize>,
    kind: Kind,
}

fn parse_selector(selector: &str) -> Result<Selector, Error> {
    Selector::parse(selector)
        .map_err(|e| Error::MalformedPage(format!("invalid CSS selector '{selector}': {e}")))
}

fn cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| matches!(e.value().name(), "th" | "td"))
        .collect()
}

/// Browsers clamp `colspan` to this.
const MAX_COLSPAN: usize = 1000;

fn colspan(cell: &ElementRef) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(1)
        .clamp(1, MAX_COLSPAN)
}

/// Row cells with `colspan` expanded; the extra slots are `None`.
fn slots(row: ElementRef<'_>) -> Vec<Option<ElementRef<'_>>> {
    let mut out = Vec::new();
    for cell in cells(row) {
        let span = colspan(&cell);
        out.push(Some(cell));
        out.extend(std::iter::repeat(None).take(span - 1));
    }
    out
}

fn text(cell: &ElementRef) -> String {
    collapse_whitespace(&cell.text().collect::<String>())
}

fn tooltip(cell: &ElementRef) -> Result<Option<String>, Error> {
    if let Some(title) = cell.value().attr("title") {
        return Ok(Some(title.to_string()));
    }
    let titled = parse_selector("[title]")?;
    Ok(cell
        .select(&titled)
        .find_map(|e| e.value().attr("title"))
        .map(str::to_string))
}

fn leading_text(cell: &ElementRef) -> String {
    let lead: String = cell
        .children()
        .take_while(|n| !n.value().is_element())
        .filter_map(|n| n.value().as_text().map(|t| t.to_string()))
        .collect();
    let lead = collapse_whitespace(&lead);
    if lead.is_empty() {
        text(cell)
    } else {
        lead
    }
}

fn header_row<'a>(table: ElementRef<'a>) -> Result<ElementRef<'a>, Error> {
    let rows = parse_selector("thead tr")?;
    table
        .select(&rows)
        .find(|row| cells(*row).iter().any(|c| text(c) == field::TIME))
        .ok_or_else(|| {
            Error::MalformedPage(format!("no header row with a '{}' column", field::TIME))
        })
}

/// Maps header slots to named columns. Blank slots are dropped, except the
/// one right after `Wind`, which holds the direction arrow.
fn columns(header: ElementRef) -> (Vec<Column>, usize) {
    let labels: Vec<String> = slots(header)
        .iter()
        .map(|s| s.as_ref().map(text).unwrap_or_default())
        .collect();

    let mut columns: Vec<Column> = Vec::new();
    for (slot, label) in labels.iter().enumerate() {
        let after_wind = slot > 0 && labels[slot - 1] == field::WIND;
        let (name, kind) = match label.as_str() {
            "" if after_wind => (field::DIRECTION, Kind::Tooltip),
            "" => continue,
            field::TIME => (field::TIME, Kind::Time),
            name => (name, Kind::Text),
        };
        columns.push(Column {
            name: name.to_string(),
            slot: Some(slot),
            kind,
        });
    }

    if !columns.iter().any(|c| c.name == field::DIRECTION) {
        let at = columns
            .iter()
            .position(|c| c.name == field::WIND)
            .map_or(columns.len(), |i| i + 1);
        columns.insert(
            at,
            Column {
                name: field::DIRECTION.to_string(),
                slot: None,
                kind: Kind::Tooltip,
            },
        );
    }

    (columns, labels.len())
}

fn record(row: ElementRef, columns: &[Column]) -> Result<WeatherRecord, Error> {
    let slots = slots(row);
    let mut record = WeatherRecord::new();
    for column in columns {
        let cell = column.slot.and_then(|s| slots.get(s).copied().flatten());
        let value = match (cell, column.kind) {
            (None, _) => String::new(),
            (Some(cell), Kind::Time) => leading_text(&cell),
            (Some(cell), Kind::Tooltip) => tooltip(&cell)?.unwrap_or_default(),
            (Some(cell), Kind::Text) => match tooltip(&cell)? {
                Some(title) => title,
                None => text(&cell),
            },
        };
        record.insert(&column.name, value);
    }
    Ok(record)
}

pub fn day_options(document: &Html, selector_id: &str) -> Result<Vec<DayOption>, Error> {
    let options = parse_selector(&format!("select#{selector_id} option"))?;
    Ok(document
        .select(&options)
        .map(|o| DayOption {
            value: o.value().attr("value").unwrap_or_default().to_string(),
            label: text(&o),
            selected: o.value().attr("selected").is_some(),
        })
        .collect())
}

/// Reads the observation table and the day selector from a history page.
///
/// Rows are taken from `tbody`; one-cell rows (site notices) are skipped. A
/// data row narrower than the header is a [`Error::MalformedPage`].
pub fn extract_page(html: &str, settings: &Settings) -> Result<Page, Error> {
    let document = Html::parse_document(html);

    let options = day_options(&document, &settings.selector_id)?;
    for option in &options {
        debug!("selector option {} = {:?}", option.value, option.label);
    }

    let table_sel = parse_selector(&format!("table#{}", settings.table_id))?;
    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| Error::TableNotFound {
            table_id: settings.table_id.clone(),
        })?;

    let (columns, width) = columns(header_row(table)?);
    debug!(
        "columns: {:?}",
        columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );

    let body_rows = parse_selector("tbody tr")?;
    let mut records = Vec::new();
    for (n, row) in table.select(&body_rows).enumerate() {
        let found = cells(row).len();
        if found == 1 {
            debug!("skipping notice row {n}");
            continue;
        }
        let expanded = slots(row).len();
        if expanded < width {
            return Err(Error::MalformedPage(format!(
                "row {n} has {expanded} cells, header has {width}"
            )));
        }
        records.push(record(row, &columns)?);
    }

    Ok(Page { records, options })
}
