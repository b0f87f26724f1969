use crate::fte::FteReport;
use crate::types::{
    CourseFteRow, DetailRow, DivisionExtractRow, DivisionFteRow, EnrollmentRecord, EnrollmentRow,
    InstructorFteRow, ReportRow, ReportSummary, SectionRecord,
};
use crate::util::{display_fte, display_number, money};
use chrono::Local;

/// Label compression state: a label is shown on the first detail row of
/// the report (owner) or of its course group (course code) only.
struct Labels {
    owner_shown: bool,
    course_shown: bool,
}

impl Labels {
    fn new() -> Self {
        Labels {
            owner_shown: false,
            course_shown: false,
        }
    }

    fn owner(&mut self, label: &str) -> String {
        if self.owner_shown {
            String::new()
        } else {
            self.owner_shown = true;
            label.to_string()
        }
    }

    fn course(&mut self, detail: &DetailRow) -> String {
        if self.course_shown {
            String::new()
        } else {
            self.course_shown = true;
            detail.record.course_code().unwrap_or_default().to_string()
        }
    }

    fn end_group(&mut self) {
        self.course_shown = false;
    }
}

pub fn division_rows(report: &FteReport, division: &str) -> Vec<DivisionFteRow> {
    let mut labels = Labels::new();
    report
        .rows(true)
        .into_iter()
        .map(|row| match row {
            ReportRow::Detail(d) => DivisionFteRow {
                division: labels.owner(division),
                course_code: labels.course(&d),
                sec_name: d.record.section_name.clone(),
                delivery_method: d.record.delivery_method.clone(),
                meeting_times: d.record.meeting_times.clone(),
                capacity: display_number(d.record.capacity),
                fte_count: display_number(d.record.fte_count),
                faculty_info: d.record.faculty_info.clone(),
                total_fte: display_fte(d.record.total_fte),
                enrollment_per: d.enrollment.render_detail(),
                generated_fte: money(d.generated_fte),
            },
            ReportRow::Subtotal { generated_fte, .. } => {
                labels.end_group();
                DivisionFteRow {
                    division: String::new(),
                    course_code: "Total".to_string(),
                    sec_name: String::new(),
                    delivery_method: String::new(),
                    meeting_times: String::new(),
                    capacity: String::new(),
                    fte_count: String::new(),
                    faculty_info: String::new(),
                    total_fte: String::new(),
                    enrollment_per: String::new(),
                    generated_fte: money(generated_fte),
                }
            }
            ReportRow::GrandTotal {
                original_fte,
                generated_fte,
            } => DivisionFteRow {
                division: String::new(),
                course_code: "DIVISION TOTAL".to_string(),
                sec_name: String::new(),
                delivery_method: String::new(),
                meeting_times: String::new(),
                capacity: String::new(),
                fte_count: String::new(),
                faculty_info: String::new(),
                total_fte: display_fte(Some(original_fte)),
                enrollment_per: String::new(),
                generated_fte: money(generated_fte),
            },
        })
        .collect()
}

pub fn instructor_rows(report: &FteReport, instructor: &str) -> Vec<InstructorFteRow> {
    let mut labels = Labels::new();
    report
        .rows(true)
        .into_iter()
        .map(|row| match row {
            ReportRow::Detail(d) => InstructorFteRow {
                instructor: labels.owner(instructor),
                course_code: labels.course(&d),
                sec_name: d.record.section_name.clone(),
                delivery_method: d.record.delivery_method.clone(),
                meeting_times: d.record.meeting_times.clone(),
                capacity: display_number(d.record.capacity),
                fte_count: display_number(d.record.fte_count),
                total_fte: display_fte(d.record.total_fte),
                enrollment_per: d.enrollment.render_detail(),
                generated_fte: money(d.generated_fte),
                division: d.record.division_code.clone(),
            },
            ReportRow::Subtotal { generated_fte, .. } => {
                labels.end_group();
                InstructorFteRow {
                    instructor: String::new(),
                    course_code: "Total".to_string(),
                    sec_name: String::new(),
                    delivery_method: String::new(),
                    meeting_times: String::new(),
                    capacity: String::new(),
                    fte_count: String::new(),
                    total_fte: String::new(),
                    enrollment_per: String::new(),
                    generated_fte: money(generated_fte),
                    division: String::new(),
                }
            }
            ReportRow::GrandTotal {
                original_fte,
                generated_fte,
            } => InstructorFteRow {
                instructor: String::new(),
                course_code: "INSTRUCTOR TOTAL".to_string(),
                sec_name: String::new(),
                delivery_method: String::new(),
                meeting_times: String::new(),
                capacity: String::new(),
                fte_count: String::new(),
                total_fte: display_fte(Some(original_fte)),
                enrollment_per: String::new(),
                generated_fte: money(generated_fte),
                division: String::new(),
            },
        })
        .collect()
}

/// Course reports have a single group, so only the final total is shown.
pub fn course_rows(report: &FteReport) -> Vec<CourseFteRow> {
    let mut labels = Labels::new();
    report
        .rows(false)
        .into_iter()
        .filter_map(|row| match row {
            ReportRow::Detail(d) => Some(CourseFteRow {
                course_code: labels.course(&d),
                sec_name: d.record.section_name.clone(),
                delivery_method: d.record.delivery_method.clone(),
                faculty_info: d.record.faculty_info.clone(),
                meeting_times: d.record.meeting_times.clone(),
                capacity: display_number(d.record.capacity),
                fte_count: display_number(d.record.fte_count),
                total_fte: display_fte(d.record.total_fte),
                enrollment_per: d.enrollment.render_detail(),
                generated_fte: money(d.generated_fte),
            }),
            ReportRow::Subtotal { .. } => None,
            ReportRow::GrandTotal {
                original_fte,
                generated_fte,
            } => Some(CourseFteRow {
                course_code: "COURSE TOTAL".to_string(),
                sec_name: String::new(),
                delivery_method: String::new(),
                faculty_info: String::new(),
                meeting_times: String::new(),
                capacity: String::new(),
                fte_count: String::new(),
                total_fte: display_fte(Some(original_fte)),
                enrollment_per: String::new(),
                generated_fte: money(generated_fte),
            }),
        })
        .collect()
}

pub fn enrollment_rows(records: &[EnrollmentRecord]) -> Vec<EnrollmentRow> {
    records
        .iter()
        .map(|e| EnrollmentRow {
            sec_name: e.record.section_name.clone(),
            delivery_method: e.record.delivery_method.clone(),
            meeting_times: e.record.meeting_times.clone(),
            capacity: display_number(e.record.capacity),
            fte_count: display_number(e.record.fte_count),
            total_fte: display_fte(e.record.total_fte),
            faculty_info: e.record.faculty_info.clone(),
            enrollment_percentage: e.enrollment.render_enrollment(),
        })
        .collect()
}

/// Every roster row of one division, unaggregated.
pub fn division_extract(records: &[SectionRecord], division: &str) -> Vec<DivisionExtractRow> {
    records
        .iter()
        .filter(|r| r.division_code.eq_ignore_ascii_case(division.trim()))
        .map(|r| DivisionExtractRow {
            division: r.division_code.clone(),
            sec_name: r.section_name.clone(),
            delivery_method: r.delivery_method.clone(),
            meeting_times: r.meeting_times.clone(),
            capacity: display_number(r.capacity),
            fte_count: display_number(r.fte_count),
            faculty_info: r.faculty_info.clone(),
            contact_hours: display_number(r.contact_hours),
            total_fte: display_fte(r.total_fte),
        })
        .collect()
}

pub fn summarize(kind: &str, filter: &str, report: &FteReport) -> ReportSummary {
    ReportSummary {
        report: kind.to_string(),
        filter: filter.to_string(),
        total_sections: report.section_count(),
        total_courses: report.groups.len(),
        original_fte_total: report.original_total,
        generated_fte_total: report.generated_total,
        generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fte::{aggregate_by_course, aggregate_by_division, aggregate_by_instructor};
    use crate::types::TierLookup;
    use crate::util::parse_money;

    fn section(name: &str, division: &str, faculty: &str, total: Option<f64>) -> SectionRecord {
        SectionRecord {
            section_name: name.to_string(),
            division_code: division.to_string(),
            faculty_info: faculty.to_string(),
            capacity: Some(30.0),
            fte_count: Some(15.0),
            total_fte: total,
            ..Default::default()
        }
    }

    fn roster() -> Vec<SectionRecord> {
        vec![
            section("CSC-121-0001", "CIT", "Seidi, H", Some(5.0)),
            section("CSC-121-0002", "CIT", "Seidi, H", Some(1.0)),
            section("CSC-121-0002", "CIT", "Seidi, H", Some(1.0)),
            section("CSC-151-0001", "CIT", "Smith, J", Some(3.0)),
            section("MAT-171-0001", "MS", "Smith, J", None),
        ]
    }

    fn tiers() -> TierLookup {
        TierLookup::from_entries(vec![(Some("CSC".to_string()), Some(50.0))])
    }

    #[test]
    fn division_rows_compress_labels() {
        let report = aggregate_by_division(&roster(), &tiers(), "cit").unwrap();
        let rows = division_rows(&report, "CIT");
        let divisions: Vec<&str> = rows.iter().map(|r| r.division.as_str()).collect();
        let codes: Vec<&str> = rows.iter().map(|r| r.course_code.as_str()).collect();
        assert_eq!(divisions, vec!["CIT", "", "", "", "", "", ""]);
        assert_eq!(
            codes,
            vec!["CSC-121", "", "", "Total", "CSC-151", "Total", "DIVISION TOTAL"]
        );
        assert_eq!(rows[0].generated_fte, "$9,880.00");
        assert_eq!(rows[0].enrollment_per, "50.00%");
        assert_eq!(rows[0].total_fte, "5.000");
        assert_eq!(rows[3].generated_fte, "$13,832.00");
        assert_eq!(rows[6].total_fte, "10.000");
        assert_eq!(rows[6].generated_fte, "$19,760.00");
    }

    #[test]
    fn division_rows_blank_percent_for_bad_capacity() {
        let mut records = roster();
        records[0].capacity = Some(-10.0);
        records[3].capacity = Some(0.0);
        let report = aggregate_by_division(&records, &tiers(), "CIT").unwrap();
        let rows = division_rows(&report, "CIT");
        assert_eq!(rows[0].sec_name, "CSC-121-0001");
        assert_eq!(rows[0].enrollment_per, "");
        assert_eq!(rows[1].enrollment_per, "50.00%");
        assert_eq!(rows[4].sec_name, "CSC-151-0001");
        assert_eq!(rows[4].enrollment_per, "");
    }

    #[test]
    fn rendered_subtotals_add_up_to_division_total() {
        let report = aggregate_by_division(&roster(), &tiers(), "CIT").unwrap();
        let rows = division_rows(&report, "CIT");
        let subtotal_sum: f64 = rows
            .iter()
            .filter(|r| r.course_code == "Total")
            .map(|r| parse_money(&r.generated_fte).unwrap())
            .sum();
        let total = parse_money(&rows.last().unwrap().generated_fte).unwrap();
        assert!((subtotal_sum - total).abs() < 0.01);
    }

    #[test]
    fn instructor_rows_carry_divisions() {
        let report = aggregate_by_instructor(&roster(), &tiers(), "Seidi, H").unwrap();
        let rows = instructor_rows(&report, "Seidi, H");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].instructor, "Seidi, H");
        assert_eq!(rows[1].instructor, "");
        assert_eq!(rows[1].division, "CIT");
        assert_eq!(rows[2].course_code, "Total");
        assert_eq!(rows[3].course_code, "INSTRUCTOR TOTAL");
        assert_eq!(rows[3].generated_fte, "$11,856.00");
    }

    #[test]
    fn course_rows_end_with_course_total() {
        let report = aggregate_by_course(&roster(), &tiers(), "MAT-171").unwrap();
        let rows = course_rows(&report);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].course_code, "MAT-171");
        assert_eq!(rows[0].total_fte, "");
        assert_eq!(rows[0].generated_fte, "$0.00");
        assert_eq!(rows[1].course_code, "COURSE TOTAL");
        assert_eq!(rows[1].total_fte, "0.000");
    }

    #[test]
    fn division_extract_is_case_insensitive() {
        let rows = division_extract(&roster(), "ms");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sec_name, "MAT-171-0001");
        assert_eq!(rows[0].capacity, "30");
    }

    #[test]
    fn summary_counts() {
        let report = aggregate_by_division(&roster(), &tiers(), "CIT").unwrap();
        let summary = summarize("division", "CIT", &report);
        assert_eq!(summary.total_sections, 4);
        assert_eq!(summary.total_courses, 2);
        assert!((summary.original_fte_total - 10.0).abs() < 1e-9);
    }
}
