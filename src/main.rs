// Entry point and console menu.
//
// The source tables are loaded once into a `RosterSnapshot` and handed to
// every menu action; each report run is independent of the previous one.
use clap::Parser;
use fte_report::config::Config;
use fte_report::loader::RosterSnapshot;
use fte_report::{fte, naming, output, reports, util};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Numbered pick from `options`; `None` if the answer is not a valid index.
fn select<'a>(options: &[&'a String], what: &str) -> Option<&'a String> {
    println!("\nMultiple {} found:", what);
    for (i, o) in options.iter().enumerate() {
        println!("{}. {}", i + 1, o);
    }
    let choice = read_line(&format!("\nEnter number to select {} (or press Enter to search again): ", what))?;
    let idx: usize = choice.parse().ok()?;
    if idx == 0 || idx > options.len() {
        return None;
    }
    Some(options[idx - 1])
}

fn print_menu() {
    println!();
    println!("{}Menu{}", "=".repeat(20), "=".repeat(20));
    println!("1) Enter \"Sec Divisions\" code");
    println!("2) Get course Enrollment Percentage");
    println!("3) FTE by Division");
    println!("4) FTE per instructor");
    println!("5) FTE per course");
    println!("6) Exit");
    println!("{}", "=".repeat(44));
}

fn divisions(snapshot: &RosterSnapshot) -> Vec<String> {
    fte::distinct_values(&snapshot.records, |r| Some(r.division_code.as_str()))
}

/// Option [1]: write the raw roster rows of each requested division.
fn handle_division_extract(snapshot: &RosterSnapshot, config: &Config) {
    let available = divisions(snapshot);
    println!("\nAvailable Sec Divisions:\n");
    println!("{}", output::columns_text(&available, 4, 0));

    let Some(input) = read_line("\nEnter Sec Divisions separated by commas or ALL: ") else {
        return;
    };
    let input = input.to_uppercase();
    let wanted: Vec<String> = if input == "ALL" {
        available.clone()
    } else {
        input.split(',').map(|d| d.trim().to_string()).filter(|d| !d.is_empty()).collect()
    };

    for div in wanted {
        let Some(actual) = available.iter().find(|a| a.eq_ignore_ascii_case(&div)) else {
            println!("\nWarning: Division '{}' not found", div);
            continue;
        };
        let rows = reports::division_extract(&snapshot.records, actual);
        let path = output::output_path(&config.output_dir, &naming::division_file_stem(actual), ".csv");
        match output::write_csv(&path, &rows) {
            Ok(()) => {
                println!("\nExtracted {} rows for division '{}'", util::format_int(rows.len()), actual);
                println!("Saved to file: {}", path.display());
            }
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
}

/// Option [2]: enrollment percentage for sections matching a course code.
fn handle_enrollment(snapshot: &RosterSnapshot, config: &Config) {
    loop {
        let Some(query) = read_line("Enter course code (e.g., ACA-120) or type 'back' to return: ") else {
            return;
        };
        if query.eq_ignore_ascii_case("back") {
            return;
        }
        if query.is_empty() {
            println!("Please enter a course code.");
            continue;
        }
        let Some(found) = fte::enrollment_report(&snapshot.records, &query) else {
            println!("Course not found. Please re-enter the course code or type 'back' to return to the main menu.");
            continue;
        };
        let rows = reports::enrollment_rows(&found);
        output::preview_table_rows(&rows, config.preview_rows);
        let path = output::output_path(&config.output_dir, &naming::course_file_stem(&query), "_per.csv");
        match output::write_csv(&path, &rows) {
            Ok(()) => println!("Created '{}' with enrollment data.", path.display()),
            Err(e) => eprintln!("Write error: {}", e),
        }
        return;
    }
}

fn print_totals(report: &fte::FteReport) {
    println!("Total FTE: {}", util::format_number(report.original_total, 3));
    println!("Generated FTE: {}", util::money(report.generated_total));
}

/// Option [3]: FTE by division.
fn handle_division_fte(snapshot: &RosterSnapshot, config: &Config) {
    let available = divisions(snapshot);
    println!("\nAvailable Division Codes:");
    println!("{}", output::columns_text(&available, 4, 0));

    let Some(code) = read_line("\nEnter Division Code: ") else {
        return;
    };
    if code.is_empty() {
        println!("Please enter a valid division code.");
        return;
    }
    let Some(report) = fte::aggregate_by_division(&snapshot.records, &snapshot.tiers, &code) else {
        println!("Division '{}' not found. Please check the code and try again.", code.to_uppercase());
        return;
    };
    let actual = available
        .iter()
        .find(|a| a.eq_ignore_ascii_case(&code))
        .cloned()
        .unwrap_or_else(|| code.to_uppercase());
    info!("Division report for {}", actual);

    let rows = reports::division_rows(&report, &actual);
    output::preview_table_rows(&rows, config.preview_rows);
    let stem = format!("{}_fte", naming::division_file_stem(&actual));
    let summary = reports::summarize("division", &actual, &report);
    match output::export_report(&config.output_dir, &stem, &rows, &summary) {
        Ok(path) => {
            println!("\nAnalysis for division: {}", actual);
            print_totals(&report);
            println!("Results exported to {}", path.display());
        }
        Err(e) => eprintln!("Write error: {}", e),
    }
}

/// Option [4]: FTE for one instructor, picked by partial name search.
fn handle_instructor_fte(snapshot: &RosterSnapshot, config: &Config) {
    let faculty = fte::distinct_values(&snapshot.records, |r| Some(r.faculty_info.as_str()));
    println!("\nFound {} faculty members", util::format_int(faculty.len()));

    loop {
        println!("\nEnter instructor name (first or last name)");
        println!("Type 'list' to see all instructors");
        println!("Type 'back' for main menu");
        let Some(name) = read_line("\nEnter name: ") else {
            return;
        };
        if name.eq_ignore_ascii_case("back") {
            println!("\nReturning to main menu...");
            return;
        }
        if name.eq_ignore_ascii_case("list") {
            println!("\nInstructors:");
            println!("{}", output::columns_text(&faculty, 3, 30));
            continue;
        }
        if name.is_empty() {
            println!("Please enter a valid name.");
            continue;
        }

        let matches = naming::find_instructors(&faculty, &name);
        let selected = match matches.as_slice() {
            [] => {
                println!("No instructors found matching '{}'.", name);
                println!("Try searching without periods (.) or check the instructor list.");
                continue;
            }
            [only] => *only,
            many => match select(many, "instructors") {
                Some(s) => s,
                None => continue,
            },
        };

        println!("\nProcessing data for: {}", selected);
        let Some(report) = fte::aggregate_by_instructor(&snapshot.records, &snapshot.tiers, selected) else {
            println!("No courses found for this instructor.");
            continue;
        };
        let rows = reports::instructor_rows(&report, selected);
        output::preview_table_rows(&rows, config.preview_rows);
        let stem = format!("{}_fte", naming::instructor_file_stem(selected));
        let summary = reports::summarize("instructor", selected, &report);
        match output::export_report(&config.output_dir, &stem, &rows, &summary) {
            Ok(path) => {
                println!("\nAnalysis for instructor: {}", selected);
                print_totals(&report);
                println!("Results exported to {}", path.display());
            }
            Err(e) => eprintln!("Write error: {}", e),
        }
        return;
    }
}

/// Option [5]: FTE for one course code, picked by partial match.
fn handle_course_fte(snapshot: &RosterSnapshot, config: &Config) {
    let codes = fte::distinct_values(&snapshot.records, |r| r.course_code());

    loop {
        println!("\nEnter course code (e.g., CSC-121) or type 'back' to return to main menu:");
        let Some(input) = read_line("Course code: ") else {
            return;
        };
        if input.eq_ignore_ascii_case("back") {
            return;
        }
        if input.is_empty() {
            continue;
        }

        let matches = naming::find_courses(&codes, &input);
        let selected = match matches.as_slice() {
            [] => {
                println!("No course found with code '{}'.", input.to_uppercase());
                continue;
            }
            [only] => *only,
            many => match select(many, "courses") {
                Some(s) => s,
                None => continue,
            },
        };

        println!("\nProcessing data for course: {}", selected);
        let Some(report) = fte::aggregate_by_course(&snapshot.records, &snapshot.tiers, selected) else {
            println!("No sections found for this course.");
            continue;
        };
        let rows = reports::course_rows(&report);
        output::preview_table_rows(&rows, config.preview_rows);
        let stem = format!("{}_fte", naming::course_file_stem(selected));
        let summary = reports::summarize("course", selected, &report);
        match output::export_report(&config.output_dir, &stem, &rows, &summary) {
            Ok(path) => {
                println!("\nAnalysis for course: {}", selected);
                println!("Found {} sections", util::format_int(report.section_count()));
                print_totals(&report);
                println!("Results exported to {}", path.display());
            }
            Err(e) => eprintln!("Write error: {}", e),
        }
        return;
    }
}

fn main() -> ExitCode {
    let config = Config::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let snapshot = match RosterSnapshot::load(&config.roster, &config.contact_hours, &config.tiers) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load source tables: {}", e);
            eprintln!("File Missing! {}", e);
            return ExitCode::FAILURE;
        }
    };
    let load = &snapshot.load_report;
    println!(
        "Loaded {} sections ({} rows read, {} skipped, {} without contact hours, {} tier entries)",
        util::format_int(snapshot.records.len()),
        util::format_int(load.total_rows),
        util::format_int(load.parse_errors),
        util::format_int(load.missing_contact_hours),
        util::format_int(load.tier_entries)
    );

    loop {
        print_menu();
        let Some(choice) = read_line("Which one will you choose? ") else {
            break;
        };
        match choice.as_str() {
            "1" => {
                println!("Option 1: Enter Sec Division codes");
                handle_division_extract(&snapshot, &config);
            }
            "2" => {
                println!("\nOption 2: Enrollment Percentage");
                handle_enrollment(&snapshot, &config);
            }
            "3" => {
                println!("\nOption 3: FTE by Division");
                handle_division_fte(&snapshot, &config);
            }
            "4" => {
                println!("\nOption 4: FTE by Instructor");
                handle_instructor_fte(&snapshot, &config);
            }
            "5" => {
                println!("\nOption 5: FTE by Course");
                handle_course_fte(&snapshot, &config);
            }
            "6" => {
                println!("Exit Program: GoodBye!");
                break;
            }
            _ => println!("\nPlease include an option between 1 and 6!"),
        }
    }
    ExitCode::SUCCESS
}
