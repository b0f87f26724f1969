//! FTE aggregation over the merged roster.
//!
//! Every report flavor runs the same pipeline: filter, optionally drop
//! duplicate sections, group by course code, then weight each section's
//! Total FTE by its tier. Results stay numeric; formatting happens in
//! `reports`.
use crate::types::{DetailRow, EnrollmentPercent, EnrollmentRecord, ReportRow, SectionRecord, TierLookup};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Fixed funding base added to every tier weight.
pub const BASE_FTE_VALUE: f64 = 1926.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FteGroup {
    /// `None` collects sections whose name has no course code.
    pub course_code: Option<String>,
    pub sections: Vec<DetailRow>,
    pub subtotal: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FteReport {
    pub groups: Vec<FteGroup>,
    pub original_total: f64,
    pub generated_total: f64,
}

impl FteReport {
    pub fn section_count(&self) -> usize {
        self.groups.iter().map(|g| g.sections.len()).sum()
    }

    pub fn details(&self) -> impl Iterator<Item = &DetailRow> {
        self.groups.iter().flat_map(|g| g.sections.iter())
    }

    /// Ordered output: each group's detail rows, then its subtotal when
    /// `with_subtotals` is set, and a single grand total at the end.
    pub fn rows(&self, with_subtotals: bool) -> Vec<ReportRow> {
        let mut rows = Vec::with_capacity(self.section_count() + self.groups.len() + 1);
        for group in &self.groups {
            rows.extend(group.sections.iter().cloned().map(ReportRow::Detail));
            if with_subtotals {
                rows.push(ReportRow::Subtotal {
                    course_code: group.course_code.clone(),
                    generated_fte: group.subtotal,
                });
            }
        }
        rows.push(ReportRow::GrandTotal {
            original_fte: self.original_total,
            generated_fte: self.generated_total,
        });
        rows
    }
}

pub fn generated_fte(total_fte: Option<f64>, weight: f64) -> f64 {
    total_fte.unwrap_or(0.0) * (weight + BASE_FTE_VALUE)
}

pub fn detail_row(record: &SectionRecord, tiers: &TierLookup) -> DetailRow {
    let weight = tiers.weight_for(&record.section_name);
    DetailRow {
        record: record.clone(),
        enrollment: EnrollmentPercent::compute_detail(record.fte_count, record.capacity),
        generated_fte: generated_fte(record.total_fte, weight),
    }
}

/// Keep the first record of each section name. Face-to-face sections can
/// appear once per auxiliary meeting slot in the raw feed.
pub fn dedupe_sections<'a>(records: Vec<&'a SectionRecord>) -> Vec<&'a SectionRecord> {
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for r in records {
        if seen.insert(r.section_name.as_str()) {
            unique.push(r);
        }
    }
    unique
}

fn course_order(a: &SectionRecord, b: &SectionRecord) -> Ordering {
    // Sections without a course code sort after every real course.
    match (a.course_code(), b.course_code()) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.section_name.cmp(&b.section_name))
}

/// Sort by `(course_code, section_name)` and partition into runs of equal
/// course code.
pub fn group_by_course<'a>(mut records: Vec<&'a SectionRecord>) -> Vec<(Option<String>, Vec<&'a SectionRecord>)> {
    records.sort_by(|a, b| course_order(a, b));
    let mut groups: Vec<(Option<String>, Vec<&SectionRecord>)> = Vec::new();
    for r in records {
        let key = r.course_code();
        match groups.last_mut() {
            Some((code, members)) if code.as_deref() == key => members.push(r),
            _ => groups.push((key.map(str::to_string), vec![r])),
        }
    }
    groups
}

fn build_report(groups: Vec<(Option<String>, Vec<&SectionRecord>)>, tiers: &TierLookup) -> FteReport {
    let mut original_total = 0.0;
    let mut generated_total = 0.0;
    let groups: Vec<FteGroup> = groups
        .into_iter()
        .map(|(course_code, members)| {
            let sections: Vec<DetailRow> = members.iter().map(|r| detail_row(r, tiers)).collect();
            let subtotal: f64 = sections.iter().map(|d| d.generated_fte).sum();
            original_total += members.iter().map(|r| r.total_fte.unwrap_or(0.0)).sum::<f64>();
            generated_total += subtotal;
            FteGroup {
                course_code,
                sections,
                subtotal,
            }
        })
        .collect();
    FteReport {
        groups,
        original_total,
        generated_total,
    }
}

fn aggregate<F>(records: &[SectionRecord], tiers: &TierLookup, dedupe: bool, filter: F) -> Option<FteReport>
where
    F: Fn(&SectionRecord) -> bool,
{
    let mut matched: Vec<&SectionRecord> = records.iter().filter(|r| filter(*r)).collect();
    if matched.is_empty() {
        return None;
    }
    if dedupe {
        let before = matched.len();
        matched = dedupe_sections(matched);
        debug!("Dropped {} duplicate sections", before - matched.len());
    }
    let report = build_report(group_by_course(matched), tiers);
    debug!(
        "Aggregated {} sections into {} course groups",
        report.section_count(),
        report.groups.len()
    );
    Some(report)
}

/// FTE for every section of one division (case-insensitive). Duplicate
/// sections are kept.
pub fn aggregate_by_division(
    records: &[SectionRecord],
    tiers: &TierLookup,
    division_code: &str,
) -> Option<FteReport> {
    let wanted = division_code.trim().to_uppercase();
    aggregate(records, tiers, false, |r| r.division_code.to_uppercase() == wanted)
}

/// FTE for every section taught by `faculty_name` (exact match).
pub fn aggregate_by_instructor(
    records: &[SectionRecord],
    tiers: &TierLookup,
    faculty_name: &str,
) -> Option<FteReport> {
    aggregate(records, tiers, true, |r| r.faculty_info == faculty_name)
}

/// FTE for every section of one course code (case-insensitive). The result
/// holds a single group.
pub fn aggregate_by_course(
    records: &[SectionRecord],
    tiers: &TierLookup,
    course_code: &str,
) -> Option<FteReport> {
    let wanted = course_code.trim().to_uppercase();
    aggregate(records, tiers, true, |r| r.course_code() == Some(wanted.as_str()))
}

/// Enrollment percentage for every section whose name contains `query`,
/// case-insensitive, without duplicates.
pub fn enrollment_report(records: &[SectionRecord], query: &str) -> Option<Vec<EnrollmentRecord>> {
    let needle = query.trim().to_lowercase();
    let matched: Vec<&SectionRecord> = records
        .iter()
        .filter(|r| r.section_name.to_lowercase().contains(&needle))
        .collect();
    if matched.is_empty() {
        return None;
    }
    Some(
        dedupe_sections(matched)
            .into_iter()
            .map(|r| EnrollmentRecord {
                record: r.clone(),
                enrollment: EnrollmentPercent::compute(r.fte_count, r.capacity),
            })
            .collect(),
    )
}

/// Sorted, distinct values of `field` over the roster, ignoring blanks.
pub fn distinct_values<F>(records: &[SectionRecord], field: F) -> Vec<String>
where
    F: Fn(&SectionRecord) -> Option<&str>,
{
    let mut values: Vec<String> = records
        .iter()
        .filter_map(|r| field(r))
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}
