use clap::Parser;
use scout_core::{IndustryCategory, ProvinceFilter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scout", version, about = "Browse, filter and bookmark tenders")]
pub struct Cli {
    #[arg(long, help = "JSON file with the tender corpus to query")]
    pub fixtures: PathBuf,

    #[arg(long = "industry", help = "Industry to include (repeatable), e.g. \"ICT & Software\"")]
    pub industries: Vec<IndustryCategory>,

    #[arg(long, default_value = "all", help = "Province code or \"all\"")]
    pub province: ProvinceFilter,

    #[arg(long, default_value = "", help = "Substring to search for")]
    pub search: String,

    #[arg(long, default_value_t = 1, help = "Page to show")]
    pub page: u32,

    #[arg(long, conflicts_with = "saved", help = "Only tenders closing within the urgent window")]
    pub urgent: bool,

    #[arg(long, help = "Only bookmarked tenders")]
    pub saved: bool,

    #[arg(long = "save", value_name = "ID", help = "Toggle the bookmark on a tender id (repeatable)")]
    pub toggle_saved: Vec<String>,

    #[arg(long, help = "Config file (defaults to the platform config directory)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Directory for saved tenders (defaults to the platform data directory)")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
}
