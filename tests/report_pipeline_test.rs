// End-to-end: load CSV source tables, run each report flavor, export.

use fte_report::fte::{
    aggregate_by_course, aggregate_by_division, aggregate_by_instructor, enrollment_report,
};
use fte_report::loader::RosterSnapshot;
use fte_report::output::{output_path, write_csv};
use fte_report::reports::{course_rows, division_rows, enrollment_rows, instructor_rows};
use fte_report::util::parse_money;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const ROSTER: &str = "\
Sec Name,Sec Divisions,X Sec Delivery Method,Meeting Times,Capacity,FTE Count,Sec Faculty Info
CSC-121-0001,CIT,F2F,MW 09:00,30,15,\"Seidi, H\"
CSC-121-0001,CIT,F2F,F 09:00,30,15,\"Seidi, H\"
CSC-121-9001,CIT,IN,,24,12,\"Seidi, H\"
CSC-151-0001,CIT,F2F,TR 13:00,0,0,\"Smith, J\"
MAT-171-0001,MS,F2F,TR 10:00,25,20,\"Smith, J\"
ENG-111-0001,AH,F2F,MW 11:00,N/A,18,\"Doe, A\"
";

const HOURS: &str = "\
Sec Name,Contact Hours
CSC-121-0001,64
CSC-151-0001,80
MAT-171-0001,96
ENG-111-0001,48
";

const TIERS: &str = "\
Prefix/Course ID,New Sector
CSC,50
MAT,100
";

fn fixture() -> (TempDir, RosterSnapshot) {
    let dir = TempDir::new().unwrap();
    let write = |name: &str, body: &str| -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    };
    let roster = write("deanDailyCsar.csv", ROSTER);
    let hours = write("contact_hours.csv", HOURS);
    let tiers = write("FTE_Tier.csv", TIERS);
    let snapshot = RosterSnapshot::load(&roster, &hours, &tiers).unwrap();
    (dir, snapshot)
}

#[test]
fn test_division_report_end_to_end() {
    let (dir, snapshot) = fixture();
    let report = aggregate_by_division(&snapshot.records, &snapshot.tiers, "cit").unwrap();

    // 64 * 16 * 15 / 512 = 30, 64 * 16 * 12 / 512 = 24, CSC-151 has zero FTE
    assert!((report.original_total - 84.0).abs() < 1e-9);
    assert!((report.generated_total - 84.0 * 1976.0).abs() < 1e-6);

    let rows = division_rows(&report, "CIT");
    let codes: Vec<&str> = rows.iter().map(|r| r.course_code.as_str()).collect();
    assert_eq!(
        codes,
        vec!["CSC-121", "", "", "Total", "CSC-151", "Total", "DIVISION TOTAL"]
    );
    assert_eq!(rows[3].generated_fte, "$165,984.00");
    assert_eq!(rows[4].enrollment_per, "");
    assert_eq!(
        parse_money(&rows[6].generated_fte).unwrap(),
        report.generated_total
    );

    let path = output_path(dir.path(), "cit_fte", ".csv");
    write_csv(&path, &rows).unwrap();
    let body = fs::read_to_string(&path).unwrap();
    assert!(body.starts_with("Division,Course Code,Sec Name"));
    assert_eq!(body.lines().count(), rows.len() + 1);
}

#[test]
fn test_instructor_and_course_reports_drop_duplicates() {
    let (_dir, snapshot) = fixture();

    let instructor = aggregate_by_instructor(&snapshot.records, &snapshot.tiers, "Seidi, H").unwrap();
    assert_eq!(instructor.section_count(), 2);
    let rows = instructor_rows(&instructor, "Seidi, H");
    assert_eq!(rows.last().unwrap().course_code, "INSTRUCTOR TOTAL");
    assert_eq!(rows.last().unwrap().total_fte, "54.000");

    let course = aggregate_by_course(&snapshot.records, &snapshot.tiers, "csc-121").unwrap();
    assert_eq!(course.section_count(), 2);
    let rows = course_rows(&course);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].course_code, "COURSE TOTAL");
    assert_eq!(rows[2].generated_fte, "$106,704.00");
}

#[test]
fn test_enrollment_sentinels() {
    let (_dir, snapshot) = fixture();

    let csc = enrollment_report(&snapshot.records, "csc").unwrap();
    let rows = enrollment_rows(&csc);
    let pct: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.sec_name.as_str(), r.enrollment_percentage.as_str()))
        .collect();
    assert_eq!(
        pct,
        vec![
            ("CSC-121-0001", "50.00%"),
            ("CSC-121-9001", "50.00%"),
            ("CSC-151-0001", "0%"),
        ]
    );

    let eng = enrollment_rows(&enrollment_report(&snapshot.records, "ENG-111").unwrap());
    assert_eq!(eng[0].enrollment_percentage, "N/A%");
}

#[test]
fn test_not_found_is_distinct_from_empty_report() {
    let (_dir, snapshot) = fixture();
    assert!(aggregate_by_division(&snapshot.records, &snapshot.tiers, "ABC").is_none());
    assert!(aggregate_by_instructor(&snapshot.records, &snapshot.tiers, "Nobody").is_none());
    assert!(aggregate_by_course(&snapshot.records, &snapshot.tiers, "BIO-110").is_none());
    assert!(enrollment_report(&snapshot.records, "BIO").is_none());
}

#[test]
fn test_missing_source_file_fails_load() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("deanDailyCsar.csv");
    let tiers = dir.path().join("FTE_Tier.csv");
    fs::write(&tiers, TIERS).unwrap();
    let hours = dir.path().join("contact_hours.csv");
    fs::write(&hours, HOURS).unwrap();
    assert!(RosterSnapshot::load(&missing, &hours, &tiers).is_err());
}
