use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tabled::Tabled;

static COURSE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z]{3}-\d+").expect("course code pattern is valid"));

#[derive(Debug, Deserialize)]
pub struct RawRosterRow {
    #[serde(rename = "Sec Name")]
    pub sec_name: Option<String>,
    #[serde(rename = "Sec Divisions")]
    pub sec_divisions: Option<String>,
    #[serde(rename = "X Sec Delivery Method")]
    pub delivery_method: Option<String>,
    #[serde(rename = "Meeting Times")]
    pub meeting_times: Option<String>,
    #[serde(rename = "Capacity")]
    pub capacity: Option<String>,
    #[serde(rename = "FTE Count")]
    pub fte_count: Option<String>,
    #[serde(rename = "Sec Faculty Info")]
    pub faculty_info: Option<String>,
}

/// One section of the merged roster, with numeric fields already parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionRecord {
    pub section_name: String,
    pub division_code: String,
    pub delivery_method: String,
    pub meeting_times: String,
    pub faculty_info: String,
    pub capacity: Option<f64>,
    pub fte_count: Option<f64>,
    pub contact_hours: Option<f64>,
    pub total_fte: Option<f64>,
}

impl SectionRecord {
    /// Course code such as `CSC-121`, taken from the first
    /// letters-dash-digits run in the section name.
    pub fn course_code(&self) -> Option<&str> {
        extract_course_code(&self.section_name)
    }
}

pub fn extract_course_code(section_name: &str) -> Option<&str> {
    COURSE_CODE_RE.find(section_name).map(|m| m.as_str())
}

/// Key used for the tier lookup: the first three characters of the section
/// name, which is not always the prefix of the course code.
pub fn tier_prefix(section_name: &str) -> &str {
    match section_name.char_indices().nth(3) {
        Some((idx, _)) => &section_name[..idx],
        None => section_name,
    }
}

/// Base workload units for a section: contact hours over a 16 week term,
/// normalised by 512 hours, rounded to 3 decimals.
pub fn total_fte(contact_hours: Option<f64>, fte_count: Option<f64>) -> Option<f64> {
    let hours = contact_hours?;
    let count = fte_count?;
    let raw = hours * 16.0 * count / 512.0;
    Some((raw * 1000.0).round() / 1000.0)
}

/// Course-prefix to tier weight ("New Sector") map.
#[derive(Debug, Clone, Default)]
pub struct TierLookup {
    weights: HashMap<String, f64>,
}

impl TierLookup {
    /// Entries without a prefix are dropped; a missing weight counts as 0.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Option<f64>)>,
    {
        let mut weights = HashMap::new();
        for (prefix, weight) in entries {
            let Some(prefix) = prefix else { continue };
            let prefix = prefix.trim().to_string();
            if prefix.is_empty() {
                continue;
            }
            weights.insert(prefix, weight.unwrap_or(0.0));
        }
        TierLookup { weights }
    }

    pub fn weight(&self, prefix: &str) -> f64 {
        self.weights.get(prefix).copied().unwrap_or(0.0)
    }

    pub fn weight_for(&self, section_name: &str) -> f64 {
        self.weight(tier_prefix(section_name))
    }

    pub fn entry_count(&self) -> usize {
        self.weights.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnrollmentPercent {
    Undefined,
    ZeroCapacity,
    Value(f64),
}

impl EnrollmentPercent {
    /// Zero capacity wins over a missing FTE count.
    pub fn compute(fte_count: Option<f64>, capacity: Option<f64>) -> Self {
        match (fte_count, capacity) {
            (_, Some(cap)) if cap == 0.0 => EnrollmentPercent::ZeroCapacity,
            (Some(fte), Some(cap)) => EnrollmentPercent::Value(fte / cap * 100.0),
            _ => EnrollmentPercent::Undefined,
        }
    }

    /// FTE reports only compute a percentage for a positive capacity.
    pub fn compute_detail(fte_count: Option<f64>, capacity: Option<f64>) -> Self {
        match capacity {
            Some(cap) if cap < 0.0 => EnrollmentPercent::Undefined,
            _ => Self::compute(fte_count, capacity),
        }
    }

    /// Rendering used by the FTE reports: blank unless a percentage exists.
    pub fn render_detail(&self) -> String {
        match self {
            EnrollmentPercent::Value(v) => format!("{:.2}%", v),
            _ => String::new(),
        }
    }

    /// Rendering used by the enrollment report.
    pub fn render_enrollment(&self) -> String {
        match self {
            EnrollmentPercent::Value(v) => format!("{:.2}%", v),
            EnrollmentPercent::ZeroCapacity => "0%".to_string(),
            EnrollmentPercent::Undefined => "N/A%".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub record: SectionRecord,
    pub enrollment: EnrollmentPercent,
    pub generated_fte: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportRow {
    Detail(DetailRow),
    Subtotal {
        course_code: Option<String>,
        generated_fte: f64,
    },
    GrandTotal {
        original_fte: f64,
        generated_fte: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    pub record: SectionRecord,
    pub enrollment: EnrollmentPercent,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DivisionFteRow {
    #[serde(rename = "Division")]
    #[tabled(rename = "Division")]
    pub division: String,
    #[serde(rename = "Course Code")]
    #[tabled(rename = "Course Code")]
    pub course_code: String,
    #[serde(rename = "Sec Name")]
    #[tabled(rename = "Sec Name")]
    pub sec_name: String,
    #[serde(rename = "X Sec Delivery Method")]
    #[tabled(rename = "X Sec Delivery Method")]
    pub delivery_method: String,
    #[serde(rename = "Meeting Times")]
    #[tabled(rename = "Meeting Times")]
    pub meeting_times: String,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "FTE Count")]
    #[tabled(rename = "FTE Count")]
    pub fte_count: String,
    #[serde(rename = "Sec Faculty Info")]
    #[tabled(rename = "Sec Faculty Info")]
    pub faculty_info: String,
    #[serde(rename = "Total FTE")]
    #[tabled(rename = "Total FTE")]
    pub total_fte: String,
    #[serde(rename = "Enrollment Per")]
    #[tabled(rename = "Enrollment Per")]
    pub enrollment_per: String,
    #[serde(rename = "Generated FTE")]
    #[tabled(rename = "Generated FTE")]
    pub generated_fte: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct InstructorFteRow {
    #[serde(rename = "Instructor")]
    #[tabled(rename = "Instructor")]
    pub instructor: String,
    #[serde(rename = "Course Code")]
    #[tabled(rename = "Course Code")]
    pub course_code: String,
    #[serde(rename = "Sec Name")]
    #[tabled(rename = "Sec Name")]
    pub sec_name: String,
    #[serde(rename = "X Sec Delivery Method")]
    #[tabled(rename = "X Sec Delivery Method")]
    pub delivery_method: String,
    #[serde(rename = "Meeting Times")]
    #[tabled(rename = "Meeting Times")]
    pub meeting_times: String,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "FTE Count")]
    #[tabled(rename = "FTE Count")]
    pub fte_count: String,
    #[serde(rename = "Total FTE")]
    #[tabled(rename = "Total FTE")]
    pub total_fte: String,
    #[serde(rename = "Enrollment Per")]
    #[tabled(rename = "Enrollment Per")]
    pub enrollment_per: String,
    #[serde(rename = "Generated FTE")]
    #[tabled(rename = "Generated FTE")]
    pub generated_fte: String,
    #[serde(rename = "Sec Divisions")]
    #[tabled(rename = "Sec Divisions")]
    pub division: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CourseFteRow {
    #[serde(rename = "Course Code")]
    #[tabled(rename = "Course Code")]
    pub course_code: String,
    #[serde(rename = "Sec Name")]
    #[tabled(rename = "Sec Name")]
    pub sec_name: String,
    #[serde(rename = "X Sec Delivery Method")]
    #[tabled(rename = "X Sec Delivery Method")]
    pub delivery_method: String,
    #[serde(rename = "Sec Faculty Info")]
    #[tabled(rename = "Sec Faculty Info")]
    pub faculty_info: String,
    #[serde(rename = "Meeting Times")]
    #[tabled(rename = "Meeting Times")]
    pub meeting_times: String,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "FTE Count")]
    #[tabled(rename = "FTE Count")]
    pub fte_count: String,
    #[serde(rename = "Total FTE")]
    #[tabled(rename = "Total FTE")]
    pub total_fte: String,
    #[serde(rename = "Enrollment Per")]
    #[tabled(rename = "Enrollment Per")]
    pub enrollment_per: String,
    #[serde(rename = "Generated FTE")]
    #[tabled(rename = "Generated FTE")]
    pub generated_fte: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct EnrollmentRow {
    #[serde(rename = "Sec Name")]
    #[tabled(rename = "Sec Name")]
    pub sec_name: String,
    #[serde(rename = "X Sec Delivery Method")]
    #[tabled(rename = "X Sec Delivery Method")]
    pub delivery_method: String,
    #[serde(rename = "Meeting Times")]
    #[tabled(rename = "Meeting Times")]
    pub meeting_times: String,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "FTE Count")]
    #[tabled(rename = "FTE Count")]
    pub fte_count: String,
    #[serde(rename = "Total FTE")]
    #[tabled(rename = "Total FTE")]
    pub total_fte: String,
    #[serde(rename = "Sec Faculty Info")]
    #[tabled(rename = "Sec Faculty Info")]
    pub faculty_info: String,
    #[serde(rename = "Enrollment Percentage")]
    #[tabled(rename = "Enrollment Percentage")]
    pub enrollment_percentage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DivisionExtractRow {
    #[serde(rename = "Sec Divisions")]
    #[tabled(rename = "Sec Divisions")]
    pub division: String,
    #[serde(rename = "Sec Name")]
    #[tabled(rename = "Sec Name")]
    pub sec_name: String,
    #[serde(rename = "X Sec Delivery Method")]
    #[tabled(rename = "X Sec Delivery Method")]
    pub delivery_method: String,
    #[serde(rename = "Meeting Times")]
    #[tabled(rename = "Meeting Times")]
    pub meeting_times: String,
    #[serde(rename = "Capacity")]
    #[tabled(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "FTE Count")]
    #[tabled(rename = "FTE Count")]
    pub fte_count: String,
    #[serde(rename = "Sec Faculty Info")]
    #[tabled(rename = "Sec Faculty Info")]
    pub faculty_info: String,
    #[serde(rename = "Contact Hours")]
    #[tabled(rename = "Contact Hours")]
    pub contact_hours: String,
    #[serde(rename = "Total FTE")]
    #[tabled(rename = "Total FTE")]
    pub total_fte: String,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub report: String,
    pub filter: String,
    pub total_sections: usize,
    pub total_courses: usize,
    pub original_fte_total: f64,
    pub generated_fte_total: f64,
    pub generated_at: String,
}
