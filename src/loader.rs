use crate::error::{FteError, Result};
use crate::types::{extract_course_code, total_fte, RawRosterRow, SectionRecord, TierLookup};
use crate::util::{clean_text, parse_f64_safe};
use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    pub missing_contact_hours: usize,
    pub tier_entries: usize,
}

/// Read-only copy of the source tables, loaded once at startup and shared
/// by every report run.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    pub records: Vec<SectionRecord>,
    pub tiers: TierLookup,
    pub load_report: LoadReport,
}

impl RosterSnapshot {
    pub fn load(roster: &Path, contact_hours: &Path, tiers: &Path) -> Result<Self> {
        let hours = load_contact_hours(contact_hours)?;
        let (records, mut load_report) = load_roster(roster, &hours)?;
        let tiers = load_tiers(tiers)?;
        load_report.tier_entries = tiers.entry_count();
        info!(
            "Loaded {} sections, {} tier entries",
            records.len(),
            load_report.tier_entries
        );
        Ok(RosterSnapshot {
            records,
            tiers,
            load_report,
        })
    }
}

/// Header row plus string cells, from either a CSV file or the first sheet
/// of a workbook.
#[derive(Debug, Clone)]
pub struct SheetTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name)
            .ok_or_else(|| FteError::MissingColumn {
                column: name.to_string(),
                source_name: self.source.clone(),
            })
    }

    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell<'a>(row: &'a [String], idx: usize) -> Option<&'a str> {
        row.get(idx).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }
}

pub fn read_table(path: &Path) -> Result<SheetTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => read_csv_table(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_workbook_table(path),
        _ => Err(FteError::UnsupportedFormat(path.display().to_string())),
    }
}

fn read_csv_table(path: &Path) -> Result<SheetTable> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(SheetTable {
        source: path.display().to_string(),
        headers,
        rows,
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

fn read_workbook_table(path: &Path) -> Result<SheetTable> {
    let source = path.display().to_string();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| FteError::EmptySheet(source.clone()))??;
    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Err(FteError::EmptySheet(source)),
    };
    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    debug!("Read {} rows from {}", rows.len(), source);
    Ok(SheetTable {
        source,
        headers,
        rows,
    })
}

/// Course code → contact hours. Uses the `Course Code` column when the
/// table has one, otherwise derives it from `Sec Name`. First match wins.
pub fn load_contact_hours(path: &Path) -> Result<HashMap<String, f64>> {
    let table = read_table(path)?;
    let hours_col = table.column("Contact Hours")?;
    let code_col = table.optional_column("Course Code");
    let name_col = match code_col {
        Some(_) => None,
        None => Some(table.column("Sec Name")?),
    };

    let mut hours = HashMap::new();
    for row in &table.rows {
        let code = match (code_col, name_col) {
            (Some(c), _) => SheetTable::cell(row, c).map(|s| s.trim().to_uppercase()),
            (None, Some(n)) => SheetTable::cell(row, n)
                .and_then(extract_course_code)
                .map(str::to_string),
            (None, None) => None,
        };
        let Some(code) = code else { continue };
        let Some(value) = parse_f64_safe(SheetTable::cell(row, hours_col)) else {
            continue;
        };
        hours.entry(code).or_insert(value);
    }
    debug!("Loaded contact hours for {} courses", hours.len());
    Ok(hours)
}

pub fn load_tiers(path: &Path) -> Result<TierLookup> {
    let table = read_table(path)?;
    let prefix_col = table.column("Prefix/Course ID")?;
    let weight_col = table.column("New Sector")?;
    let entries = table.rows.iter().map(|row| {
        (
            SheetTable::cell(row, prefix_col).map(str::to_string),
            parse_f64_safe(SheetTable::cell(row, weight_col)),
        )
    });
    Ok(TierLookup::from_entries(entries))
}

/// Parse the daily roster CSV and join contact hours onto each section.
/// Records come back sorted by division, section name and faculty.
pub fn load_roster(
    path: &Path,
    contact_hours: &HashMap<String, f64>,
) -> Result<(Vec<SectionRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)?;
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRosterRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping roster row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };
        let record = section_from_raw(row, contact_hours);
        if record.contact_hours.is_none() {
            report.missing_contact_hours += 1;
        }
        records.push(record);
    }

    if report.parse_errors > 0 {
        warn!(
            "{} roster rows skipped due to parse errors",
            report.parse_errors
        );
    }

    records.sort_by(|a, b| {
        a.division_code
            .cmp(&b.division_code)
            .then_with(|| a.section_name.cmp(&b.section_name))
            .then_with(|| a.faculty_info.cmp(&b.faculty_info))
    });
    Ok((records, report))
}

pub fn section_from_raw(row: RawRosterRow, contact_hours: &HashMap<String, f64>) -> SectionRecord {
    let section_name = clean_text(row.sec_name);
    let capacity = parse_f64_safe(row.capacity.as_deref());
    let fte_count = parse_f64_safe(row.fte_count.as_deref());
    let hours = extract_course_code(&section_name).and_then(|code| contact_hours.get(code).copied());
    SectionRecord {
        division_code: clean_text(row.sec_divisions),
        delivery_method: clean_text(row.delivery_method),
        meeting_times: clean_text(row.meeting_times),
        faculty_info: clean_text(row.faculty_info),
        capacity,
        fte_count,
        contact_hours: hours,
        total_fte: total_fte(hours, fte_count),
        section_name,
    }
}
