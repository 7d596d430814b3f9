use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "report-export")]
#[command(about = "Export record collections as PDF, CSV, and PNG reports", long_about = None)]
#[command(version)]
#[command(group(ArgGroup::new("definition").required(true).args(["entity", "report"])))]
pub struct Args {
    /// JSON file holding an array of records
    #[arg(long)]
    pub records: PathBuf,

    /// Built-in report preset (users, properties, property-images, verifications, wishlists)
    #[arg(long)]
    pub entity: Option<String>,

    /// Report definition JSON file
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "all")]
    pub format: FormatArg,

    /// Output directory; defaults to the configured download directory
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Directory containing settings.json
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Rows in the PNG snapshot
    #[arg(long)]
    pub row_cap: Option<usize>,

    #[arg(long)]
    pub author: Option<String>,

    #[arg(long, value_enum)]
    pub page_size: Option<PageSizeArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Csv,
    Png,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageSizeArg {
    Letter,
    A4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_a_definition() {
        let result = Args::try_parse_from(["report-export", "--records", "r.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_entity_and_report_conflict() {
        let result = Args::try_parse_from([
            "report-export",
            "--records",
            "r.json",
            "--entity",
            "users",
            "--report",
            "def.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["report-export", "--records", "r.json", "--entity", "users"]).unwrap();
        assert_eq!(args.format, FormatArg::All);
        assert_eq!(args.row_cap, None);
        assert_eq!(args.entity.as_deref(), Some("users"));
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "report-export",
            "--records",
            "r.json",
            "--entity",
            "properties",
            "--format",
            "png",
            "--row-cap",
            "25",
            "--author",
            "ops",
            "--page-size",
            "a4",
            "--out-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(args.format, FormatArg::Png);
        assert_eq!(args.row_cap, Some(25));
        assert_eq!(args.page_size, Some(PageSizeArg::A4));
        assert_eq!(args.out_dir, Some(PathBuf::from("out")));
    }
}
