//! Weather-station tables and the daily record lookup.
//!
//! Station exports come either as semicolon separated text
//! with decimal commas, or as a spreadsheet. Both are read
//! into a [`WeatherTable`] of loosely typed [`Cell`]s; the
//! record for one day is then extracted and validated by
//! [`match_weather_record`].

use std::{fs::File, io::Read, path::Path};

use calamine::{open_workbook_auto, DataType, Reader};
use chrono::{Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde_derive::*;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Column names of a station export.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WeatherColumns {
    pub date: String,
    /// `chrono` format of the date column (day first).
    pub date_format: String,
    pub min_temp: String,
    pub max_temp: String,
    pub min_humidity: String,
    pub max_humidity: String,
    pub irradiation_sum: String,
    pub evapotranspiration_avg: String,
    pub wind_speed_avg: String,
}

impl Default for WeatherColumns {
    fn default() -> Self {
        WeatherColumns {
            date: "Tag".into(),
            date_format: "%d.%m.%Y".into(),
            min_temp: "MIN_TA020".into(),
            max_temp: "MAX_TA020".into(),
            min_humidity: "MIN_RH200".into(),
            max_humidity: "MAX_RH200".into(),
            irradiation_sum: "SUM_GS200".into(),
            evapotranspiration_avg: "AVG_LWET200".into(),
            wind_speed_avg: "AVG_WV200".into(),
        }
    }
}

/// One day of aggregated station readings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub date: NaiveDate,
    /// °C
    pub min_temp: f64,
    /// °C
    pub max_temp: f64,
    /// % relative humidity
    pub min_humidity: f64,
    /// % relative humidity
    pub max_humidity: f64,
    /// MJ/m²
    pub irradiation_sum: f64,
    /// W/m²
    pub evapotranspiration_avg: f64,
    /// m/s
    pub wind_speed_avg: f64,
}

const INDICATOR_NOTES: &str = "\
Fusarium Head Blight (FHB) Indicators:
 • Infected spikelets show altered temps
    - Warmer: necrotic tissue / higher metabolic heat
    - Cooler: reduced transpiration (stomatal closure)
 • Early lesions ≈0.5-2 °C diff from healthy tissue";

impl WeatherRecord {
    /// Station block of the figure annotation.
    pub fn summary(&self) -> String {
        format!(
            "Weather Station ({date}):\n \
             • Temperature:       {:.1} … {:.1} °C\n \
             • Humidity:          {:.1} … {:.1} %\n \
             • Irradiation:       {:.1} MJ/m²\n \
             • Evapo-transpiration:{:.1} W/m²\n \
             • Wind speed:        {:.1} m/s",
            self.min_temp,
            self.max_temp,
            self.min_humidity,
            self.max_humidity,
            self.irradiation_sum,
            self.evapotranspiration_avg,
            self.wind_speed_avg,
            date = self.date.format("%d %b %Y"),
        )
    }

    /// Full annotation: indicator notes followed by the
    /// station block.
    pub fn annotation(&self) -> String {
        format!("{}\n\n{}", INDICATOR_NOTES, self.summary())
    }
}

/// A loosely typed table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^[+-]?(\d+([.,]\d*)?|[.,]\d+)([eE][+-]?\d+)?$").unwrap();
}

impl Cell {
    /// Numeric value of the cell. Text accepts either a
    /// decimal comma or a decimal point.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => {
                let s = s.trim();
                if !DECIMAL.is_match(s) {
                    return None;
                }
                s.replace(',', ".").parse().ok()
            }
            Cell::Empty | Cell::Date(_) => None,
        }
    }

    pub fn as_date(&self, format: &str) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), format).ok(),
            Cell::Empty | Cell::Number(_) => None,
        }
    }

    fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    fn from_spreadsheet(value: &DataType) -> Self {
        match value {
            DataType::Int(i) => Cell::Number(*i as f64),
            DataType::Float(f) => Cell::Number(*f),
            DataType::String(s) => Cell::from_text(s),
            DataType::DateTime(serial) => excel_serial_date(*serial).map_or(Cell::Empty, Cell::Date),
            _ => Cell::Empty,
        }
    }
}

// 9999-12-31, the last day a spreadsheet can hold
const MAX_EXCEL_SERIAL: f64 = 2_958_465.;

/// Spreadsheet dates are day counts from 1899-12-30. Serials
/// outside the representable calendar give `None`.
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !(0. ..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// Rows of a station export, with their header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl WeatherTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        WeatherTable { columns, rows }
    }

    /// Read a station export, choosing the parser from the
    /// file extension (spreadsheet formats, else delimited
    /// text).
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_spreadsheet = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);

        let table = if is_spreadsheet {
            Self::from_spreadsheet_path(path)?
        } else {
            let file = File::open(path).map_err(|e| Error::reading(path, e))?;
            Self::from_delimited_reader(file)
                .map_err(|e| Error::io(format!("could not parse {}", path.display()), e.to_string()))?
        };
        debug!(
            path = %path.display(),
            columns = table.columns.len(),
            rows = table.rows.len(),
            "read weather table"
        );
        Ok(table)
    }

    /// Parse semicolon separated text with a header row.
    pub fn from_delimited_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let columns = rdr
            .headers()
            .map_err(|e| Error::io("reading weather table header", e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = vec![];
        for record in rdr.records() {
            let record = record.map_err(|e| Error::io("reading weather table row", e))?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }
        Ok(WeatherTable { columns, rows })
    }

    /// Read the first sheet of a workbook. The first row is
    /// the header.
    pub fn from_spreadsheet_path(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| Error::reading(path, e.to_string()))?;
        let sheet = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::reading(path, "workbook has no worksheet"))?
            .map_err(|e| Error::reading(path, e.to_string()))?;

        let mut rows = sheet.rows();
        let columns = match rows.next() {
            Some(header) => header
                .iter()
                .map(|c| match c {
                    DataType::Empty => String::new(),
                    other => other.to_string().trim().to_string(),
                })
                .collect(),
            None => vec![],
        };
        let rows = rows.map(|r| r.iter().map(Cell::from_spreadsheet).collect()).collect();
        Ok(WeatherTable { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows whose date cell parses, in table order.
    pub fn dated_rows<'a>(
        &'a self,
        columns: &'a WeatherColumns,
    ) -> impl Iterator<Item = (NaiveDate, &'a [Cell])> + 'a {
        let idx = self.column_index(&columns.date);
        if idx.is_none() {
            warn!(column = %columns.date, "weather table has no date column");
        }
        self.rows.iter().enumerate().filter_map(move |(num, row)| {
            let date = row.get(idx?)?.as_date(&columns.date_format);
            if date.is_none() {
                debug!(row = num, "skipping weather row without a valid date");
            }
            Some((date?, row.as_slice()))
        })
    }
}

/// Find the record for `date`. The first matching row (in
/// table order) is used when the date repeats.
pub fn match_weather_record(
    table: &WeatherTable,
    columns: &WeatherColumns,
    date: NaiveDate,
) -> Result<WeatherRecord> {
    let row = table
        .dated_rows(columns)
        .find_map(|(d, row)| (d == date).then(|| row))
        .ok_or(Error::WeatherRecordNotFound(date))?;

    let field = |name: &String| -> Result<f64> {
        table
            .column_index(name)
            .and_then(|idx| row.get(idx))
            .and_then(Cell::as_number)
            .ok_or_else(|| Error::WeatherFieldMissing {
                date,
                field: name.clone(),
            })
    };

    let record = WeatherRecord {
        date,
        min_temp: field(&columns.min_temp)?,
        max_temp: field(&columns.max_temp)?,
        min_humidity: field(&columns.min_humidity)?,
        max_humidity: field(&columns.max_humidity)?,
        irradiation_sum: field(&columns.irradiation_sum)?,
        evapotranspiration_avg: field(&columns.evapotranspiration_avg)?,
        wind_speed_avg: field(&columns.wind_speed_avg)?,
    };
    debug!(?record, "matched weather record");
    Ok(record)
}
