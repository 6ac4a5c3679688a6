use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::quiz::ExampleRecord;

// Candidate headers per field, tried in order.
const EVENT_HEADERS: [&str; 3] = ["出来事", "イベント", "Event"];
const PROBLEM_HEADERS: [&str; 2] = ["問題", "Problem"];
const SUFFERING_HEADERS: [&str; 2] = ["苦しみ", "Suffering"];
const EXPLANATION_HEADERS: [&str; 3] = ["回答", "解説", "Explanation"];

// Positional fallbacks when no header matches. Column 0 usually holds a row number.
const EVENT_COLUMN: usize = 1;
const PROBLEM_COLUMN: usize = 2;
const SUFFERING_COLUMN: usize = 3;
const EXPLANATION_COLUMN: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sheet `{sheet}` is not valid CSV: {source}")]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },
}

/// A named table of usable records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub records: Arc<[ExampleRecord]>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, records: Vec<ExampleRecord>) -> Self {
        Self {
            name: name.into(),
            records: records.into(),
        }
    }
}

/// Sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// Loads a workbook from a directory of CSV files, one sheet per file, or from a single CSV file.
///
/// Sheets are named by file stem and ordered by file name.
pub fn load_workbook(path: &Path) -> Result<Workbook, DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut files = if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        fs::read_dir(path)
            .map_err(io_error)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|file| is_csv(file))
            .collect::<Vec<_>>()
    };
    files.sort();

    let mut sheets = Vec::with_capacity(files.len());
    for file in files {
        let name = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let reader = File::open(&file).map_err(|source| DatasetError::Io {
            path: file.clone(),
            source,
        })?;
        let sheet = parse_sheet(name, reader)?;
        log::debug!("Sheet `{}`: {} usable rows", sheet.name, sheet.records.len());
        sheets.push(sheet);
    }

    Ok(Workbook { sheets })
}

fn is_csv(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
}

/// Reads one CSV table with a header row, keeping only usable records.
pub fn parse_sheet(name: impl Into<String>, reader: impl Read) -> Result<Sheet, DatasetError> {
    let name = name.into();
    let csv_error = |source| DatasetError::Csv {
        sheet: name.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let event = find_column(&headers, &EVENT_HEADERS).unwrap_or(EVENT_COLUMN);
    let problem = find_column(&headers, &PROBLEM_HEADERS).unwrap_or(PROBLEM_COLUMN);
    let suffering = find_column(&headers, &SUFFERING_HEADERS).unwrap_or(SUFFERING_COLUMN);
    let explanation = find_column(&headers, &EXPLANATION_HEADERS)
        .or((headers.len() > EXPLANATION_COLUMN).then_some(EXPLANATION_COLUMN));

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;
        let cell = |index: usize| row.get(index).unwrap_or_default().to_string();

        let record = ExampleRecord {
            event_text: cell(event),
            problem_text: cell(problem),
            suffering_text: cell(suffering),
            explanation_text: explanation.map(cell).unwrap_or_default(),
        };
        if record.is_usable() {
            records.push(record);
        }
    }

    Ok(Sheet::new(name, records))
}

/// Exact header match first, then a header that contains the candidate.
fn find_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header == *candidate)
            .or_else(|| headers.iter().position(|header| header.contains(candidate)))
    })
}
