use crate::error::Result;
use crate::types::ReportSummary;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn output_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", stem, suffix))
}

/// Write `<stem>.csv`, then `<stem>_summary.json`. The summary is only
/// written once the CSV is on disk. Returns the CSV path.
pub fn export_report<T: Serialize>(
    dir: &Path,
    stem: &str,
    rows: &[T],
    summary: &ReportSummary,
) -> Result<PathBuf> {
    let csv_path = output_path(dir, stem, ".csv");
    write_csv(&csv_path, rows)?;
    write_json(&output_path(dir, stem, "_summary.json"), summary)?;
    Ok(csv_path)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows\n", rows.len() - max_rows);
    }
}

/// Lay out `items` in rows of `per_row`, each prefixed with `-`.
pub fn columns_text(items: &[String], per_row: usize, width: usize) -> String {
    items
        .chunks(per_row.max(1))
        .map(|chunk| {
            chunk
                .iter()
                .map(|item| format!("-{:<width$}", item, width = width))
                .collect::<Vec<_>>()
                .join(" ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Serialize, Clone)]
    struct Row {
        #[serde(rename = "Sec Name")]
        name: String,
        #[serde(rename = "Generated FTE")]
        generated: String,
    }

    #[test]
    fn csv_uses_renamed_headers() {
        let dir = TempDir::new().unwrap();
        let path = output_path(&dir.path().join("reports"), "csc121", "_fte.csv");
        write_csv(&path, &rows()).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert_eq!(body, "Sec Name,Generated FTE\nCSC-121-0001,\"$9,880.00\"\n");
    }

    fn summary() -> ReportSummary {
        ReportSummary {
            report: "course".to_string(),
            filter: "CSC-121".to_string(),
            total_sections: 2,
            total_courses: 1,
            original_fte_total: 6.0,
            generated_fte_total: 11856.0,
            generated_at: "2025-03-18 09:00:00".to_string(),
        }
    }

    fn rows() -> Vec<Row> {
        vec![Row {
            name: "CSC-121-0001".to_string(),
            generated: "$9,880.00".to_string(),
        }]
    }

    #[test]
    fn json_summary_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &summary()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["filter"], "CSC-121");
        assert_eq!(value["generated_fte_total"], 11856.0);
    }

    #[test]
    fn export_report_writes_csv_and_summary() {
        let dir = TempDir::new().unwrap();
        let path = export_report(dir.path(), "csc121_fte", &rows(), &summary()).unwrap();
        assert_eq!(path, dir.path().join("csc121_fte.csv"));
        assert!(path.exists());
        assert!(dir.path().join("csc121_fte_summary.json").exists());
    }

    #[test]
    fn failed_csv_write_skips_summary() {
        let dir = TempDir::new().unwrap();
        // A plain file where the output directory should be.
        let blocked = dir.path().join("reports");
        std::fs::write(&blocked, "not a directory").unwrap();
        assert!(export_report(&blocked, "csc121_fte", &rows(), &summary()).is_err());
        assert!(!blocked.join("csc121_fte_summary.json").exists());
        assert!(!dir.path().join("csc121_fte_summary.json").exists());
    }

    #[test]
    fn columns_text_wraps() {
        let items: Vec<String> = ["AH", "BT", "CIT", "MS", "PS"].iter().map(|s| s.to_string()).collect();
        assert_eq!(columns_text(&items, 4, 0), "-AH -BT -CIT -MS\n-PS");
    }
}
