use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use colored::Colorize;
use funk_archive::list_workspace;
use funk_store::LocalDirGateway;
use funk_transfer::{PipelineError, TransferOrchestrator};
use serde_json::json;

use crate::cli::*;
use crate::config::{Key, Settings, TransferTarget};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let ctx = Context::new(settings, cli.store_root.as_deref(), cli.format)?;
    match cli.command {
        Command::Upload(args) => cmd_upload(&ctx, args),
        Command::Download(args) => cmd_download(&ctx, args),
        Command::List(args) => cmd_list(&ctx, args),
        Command::Pack(args) => cmd_pack(&ctx, args),
        Command::Unpack(args) => cmd_unpack(&ctx, args),
        Command::Mb(args) => cmd_mb(&ctx, args),
    }
}

struct Context {
    settings: Settings,
    gateway: LocalDirGateway,
    format: OutputFormat,
}

impl Context {
    fn new(settings: Settings, store_root: Option<&str>, format: OutputFormat) -> anyhow::Result<Self> {
        let root = settings.require(Key::StoreRoot, store_root)?;
        tracing::debug!(root = %root, "using local object store");
        Ok(Self {
            settings,
            gateway: LocalDirGateway::new(root),
            format,
        })
    }

    fn orchestrator(&self) -> TransferOrchestrator<&LocalDirGateway> {
        TransferOrchestrator::new(&self.gateway)
    }

    fn workspace(&self, args: &WorkspaceArgs) -> anyhow::Result<(String, Vec<String>)> {
        let source = self.settings.require(Key::Source, args.source.as_deref())?;
        let ext = self.settings.require(Key::Extension, args.ext.as_deref())?;
        let names = list_workspace(Path::new(&source), &ext);
        if names.is_empty() {
            tracing::warn!(source = %source, ext = %ext, "no matching files in workspace");
        }
        Ok((source, names))
    }

    fn print_json(&self, value: &serde_json::Value) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Attach a hint to errors a user can fix by creating the bucket.
fn with_guidance(err: PipelineError, container: &str) -> anyhow::Error {
    let missing = matches!(&err, PipelineError::Transfer(e) if e.is_container_not_found());
    let err = anyhow::Error::new(err);
    if missing {
        err.context(format!(
            "bucket {container} does not exist; create the bucket first, e.g. `funk mb {container}`"
        ))
    } else {
        err
    }
}

fn cmd_upload(ctx: &Context, args: UploadArgs) -> anyhow::Result<()> {
    let target = TransferTarget::resolve(
        &ctx.settings,
        args.workspace.source.as_deref(),
        args.bucket.as_deref(),
        args.name.as_deref(),
    )?;
    let (_, names) = ctx.workspace(&args.workspace)?;

    let attrs = ctx
        .orchestrator()
        .publish(&target.source_dir, &names, &target.container, &target.object)
        .map_err(|e| with_guidance(e, &target.container))?;

    match ctx.format {
        OutputFormat::Json => ctx.print_json(&json!({ "files": names, "object": attrs }))?,
        OutputFormat::Text => {
            println!(
                "{} Uploaded {} file(s) to {}",
                "✓".green().bold(),
                names.len(),
                attrs.object_ref().to_string().bold()
            );
            println!("  Location: {}", attrs.location.blue());
            println!("  Size: {} bytes", attrs.size);
            println!("  Hash: {}", attrs.content_hash.to_hex().cyan());
        }
    }
    Ok(())
}

fn cmd_download(ctx: &Context, args: DownloadArgs) -> anyhow::Result<()> {
    let container = ctx.settings.require(Key::Bucket, args.bucket.as_deref())?;
    let object = ctx.settings.require(Key::Object, args.name.as_deref())?;

    let count = ctx
        .orchestrator()
        .fetch(&container, &object, &args.dest)
        .map_err(|e| with_guidance(e, &container))?;

    match ctx.format {
        OutputFormat::Json => ctx.print_json(&json!({
            "container": container,
            "object": object,
            "dest": args.dest.display().to_string(),
            "files": count,
        }))?,
        OutputFormat::Text => println!(
            "{} Extracted {} file(s) from {}/{} into {}",
            "✓".green().bold(),
            count,
            container,
            object.bold(),
            args.dest.display()
        ),
    }
    Ok(())
}

fn cmd_list(ctx: &Context, args: ListArgs) -> anyhow::Result<()> {
    let (source, names) = ctx.workspace(&args.workspace)?;
    match ctx.format {
        OutputFormat::Json => ctx.print_json(&json!(names))?,
        OutputFormat::Text => {
            if names.is_empty() {
                println!("No matching files in {}.", source.bold());
            }
            for name in &names {
                println!("  {}", name);
            }
        }
    }
    Ok(())
}

fn cmd_pack(ctx: &Context, args: PackArgs) -> anyhow::Result<()> {
    let (source, names) = ctx.workspace(&args.workspace)?;
    let archive = funk_archive::build(Path::new(&source), &names)?;
    std::fs::write(&args.output, archive.as_bytes())
        .with_context(|| format!("writing archive to {}", args.output.display()))?;

    match ctx.format {
        OutputFormat::Json => ctx.print_json(&json!({
            "output": args.output.display().to_string(),
            "files": archive.entry_count(),
            "bytes": archive.len(),
        }))?,
        OutputFormat::Text => println!(
            "{} Packed {} file(s) into {} ({} bytes)",
            "✓".green().bold(),
            archive.entry_count(),
            args.output.display().to_string().bold(),
            archive.len()
        ),
    }
    Ok(())
}

fn cmd_unpack(ctx: &Context, args: UnpackArgs) -> anyhow::Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("opening archive {}", args.input.display()))?;
    let count = funk_archive::extract(&args.dest, BufReader::new(file))
        .with_context(|| format!("extracting {}", args.input.display()))?;

    match ctx.format {
        OutputFormat::Json => ctx.print_json(&json!({
            "dest": args.dest.display().to_string(),
            "files": count,
        }))?,
        OutputFormat::Text => println!(
            "{} Extracted {} file(s) into {}",
            "✓".green().bold(),
            count,
            args.dest.display()
        ),
    }
    Ok(())
}

fn cmd_mb(ctx: &Context, args: MbArgs) -> anyhow::Result<()> {
    ctx.gateway
        .create_container(&args.bucket)
        .with_context(|| format!("creating bucket {}", args.bucket))?;
    match ctx.format {
        OutputFormat::Json => ctx.print_json(&json!({ "bucket": args.bucket }))?,
        OutputFormat::Text => println!("{} Created bucket {}", "✓".green().bold(), args.bucket.yellow()),
    }
    Ok(())
}
