use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "fte_report")]
#[command(about = "FTE reports by division, instructor and course", long_about = None)]
pub struct Config {
    /// Daily roster export (CSV)
    #[arg(long, env = "FTE_ROSTER", default_value = "deanDailyCsar.csv")]
    pub roster: PathBuf,

    /// Per-course contact hours table (XLSX or CSV)
    #[arg(long, env = "FTE_CONTACT_HOURS", default_value = "unique_deansDailyCsar_FTE.xlsx")]
    pub contact_hours: PathBuf,

    /// Tier table with `Prefix/Course ID` and `New Sector` columns (XLSX or CSV)
    #[arg(long, env = "FTE_TIERS", default_value = "FTE_Tier.xlsx")]
    pub tiers: PathBuf,

    /// Directory report files are written to
    #[arg(short, long, env = "FTE_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Rows shown in console previews
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_file_names() {
        let config = Config::parse_from(["fte_report"]);
        assert_eq!(config.roster, PathBuf::from("deanDailyCsar.csv"));
        assert_eq!(config.tiers, PathBuf::from("FTE_Tier.xlsx"));
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "fte_report",
            "--tiers",
            "tiers.csv",
            "-o",
            "out",
            "--preview-rows",
            "3",
        ]);
        assert_eq!(config.tiers, PathBuf::from("tiers.csv"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.preview_rows, 3);
    }
}
