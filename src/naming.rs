// Instructor / course search helpers and export file names.

/// Standardize a name for searching: periods removed, outer whitespace
/// trimmed, lowercase. Inner spacing is preserved.
pub fn clean_name_for_search(name: &str) -> String {
    name.replace('.', "").trim().to_lowercase()
}

/// Instructors whose cleaned name contains the cleaned query.
pub fn find_instructors<'a>(faculty: &'a [String], query: &str) -> Vec<&'a String> {
    let needle = clean_name_for_search(query);
    faculty
        .iter()
        .filter(|f| clean_name_for_search(f).contains(&needle))
        .collect()
}

/// Course codes containing the query, compared upper-case.
pub fn find_courses<'a>(codes: &'a [String], query: &str) -> Vec<&'a String> {
    let needle = query.trim().to_uppercase();
    codes.iter().filter(|c| c.contains(&needle)).collect()
}

/// `"Seidi, H."` and `"H. Seidi"` both become `seidih`: last name followed
/// by the first initial.
pub fn instructor_file_stem(name: &str) -> String {
    let (last, first) = match name.split_once(',') {
        Some((last, first)) => (last.trim().to_string(), first.trim().to_string()),
        None => {
            let parts: Vec<&str> = name.split_whitespace().collect();
            match parts.as_slice() {
                [] => (String::new(), String::new()),
                [only] => (only.to_string(), String::new()),
                [first, .., last] => (last.to_string(), first.to_string()),
            }
        }
    };
    let initial = first
        .replace('.', "")
        .chars()
        .next()
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_default();
    format!("{}{}", last.to_lowercase(), initial)
}

pub fn course_file_stem(code: &str) -> String {
    code.trim().replace('-', "").to_lowercase()
}

pub fn division_file_stem(division: &str) -> String {
    division.trim().to_lowercase()
}
