use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "funk",
    about = "Archive a configuration workspace and move it through an object store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file supplying defaults for any unset option
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root directory of the local object store
    #[arg(long, global = true)]
    pub store_root: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Archive workspace files and upload the archive
    Upload(UploadArgs),
    /// Download an archive and extract it
    Download(DownloadArgs),
    /// List the workspace files an upload would archive
    List(ListArgs),
    /// Build an archive into a local file
    Pack(PackArgs),
    /// Extract a local archive file
    Unpack(UnpackArgs),
    /// Create a bucket in the local store
    Mb(MbArgs),
}

#[derive(Args)]
pub struct WorkspaceArgs {
    /// Directory holding the configuration files
    #[arg(long)]
    pub source: Option<String>,
    /// Extension of the files to archive
    #[arg(long)]
    pub ext: Option<String>,
}

#[derive(Args)]
pub struct UploadArgs {
    /// Bucket to upload to
    #[arg(long)]
    pub bucket: Option<String>,
    /// Object name of the archive
    #[arg(long)]
    pub name: Option<String>,
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(Args)]
pub struct DownloadArgs {
    /// Bucket to download from
    #[arg(long)]
    pub bucket: Option<String>,
    /// Object name of the archive
    #[arg(long)]
    pub name: Option<String>,
    /// Directory to extract into
    #[arg(long, default_value = ".")]
    pub dest: PathBuf,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

#[derive(Args)]
pub struct PackArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Archive file to write
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct UnpackArgs {
    /// Archive file to read
    pub input: PathBuf,
    /// Directory to extract into
    #[arg(long, default_value = ".")]
    pub dest: PathBuf,
}

#[derive(Args)]
pub struct MbArgs {
    pub bucket: String,
}
