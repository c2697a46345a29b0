//! `subfolder-loader` CLI - browse an input directory and load images from it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subfolder_loader::loader::RefreshRequest;
use subfolder_loader::{Config, Selection, SubfolderImageLoader};

/// Browse subfolders of an input directory and load images as tensors.
#[derive(Parser, Debug)]
#[command(name = "subfolder-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Root input directory.
    #[arg(
        short,
        long,
        env = "SUBFOLDER_LOADER_INPUT_DIR",
        default_value = "input",
        value_name = "DIR"
    )]
    input_dir: PathBuf,

    /// Seconds a directory listing is reused before rescanning.
    #[arg(long, default_value = "5", value_name = "SECS")]
    cache_timeout: u64,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List subfolders; the root is shown as `<root>`.
    Subfolders,

    /// List the images of one subfolder, or the whole catalog.
    Images {
        /// Subfolder to list; omit for the root.
        #[arg(short, long, default_value = "")]
        subfolder: String,

        /// Print every image as a relative path instead.
        #[arg(long)]
        all: bool,
    },

    /// Print the input fields as JSON.
    Schema,

    /// Rescan and print the refresh payload as JSON.
    Refresh {
        /// Id of the requesting node.
        #[arg(long)]
        node_id: Option<String>,

        /// Selected subfolder.
        #[arg(short, long, default_value = "")]
        subfolder: String,
    },

    /// Check that a selection can be loaded.
    Validate {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Load a selection and report the resulting tensors.
    Load {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Do not extract the alpha channel as mask.
        #[arg(long)]
        no_mask: bool,
    },
}

#[derive(clap::Args, Debug)]
struct SelectionArgs {
    /// Subfolder of the image; may also be given as a prefix of the image.
    #[arg(short, long, default_value = "")]
    subfolder: String,

    /// Image filename, optionally as `subfolder/filename`.
    #[arg(short, long)]
    image: String,
}

impl SelectionArgs {
    fn to_selection(&self) -> Selection {
        Selection::new(self.subfolder.as_str(), self.image.as_str())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("subfolder_loader={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let config = Config {
        input_dir: args.input_dir.clone(),
        cache_timeout: Duration::from_secs(args.cache_timeout),
        ..Config::default()
    };

    let loader = SubfolderImageLoader::new(config).context("Failed to initialize loader")?;

    match &args.command {
        Command::Subfolders => {
            for subfolder in loader.index().list_subfolders() {
                if subfolder.is_empty() {
                    println!("<root>");
                } else {
                    println!("{subfolder}");
                }
            }
        }
        Command::Images { subfolder, all } => {
            let images = if *all {
                loader.index().catalog_all_images()
            } else {
                loader.index().images_for_subfolder(subfolder)
            };
            for image in images {
                println!("{image}");
            }
        }
        Command::Schema => {
            let schema = serde_json::to_string_pretty(&loader.describe_inputs())
                .context("Failed to serialize input schema")?;
            println!("{schema}");
        }
        Command::Refresh { node_id, subfolder } => {
            let request = RefreshRequest {
                node_id: node_id.clone().map(serde_json::Value::String),
                subfolder: Some(subfolder.clone()),
            };
            let response = loader.refresh(&request);
            let body = serde_json::to_string_pretty(&response)
                .context("Failed to serialize refresh response")?;
            println!("{body}");
        }
        Command::Validate { selection } => {
            if let Err(reason) = loader.validate(&selection.to_selection()) {
                println!("invalid: {reason}");
                return Ok(ExitCode::FAILURE);
            }
            println!("ok");
        }
        Command::Load { selection, no_mask } => {
            let output = loader.execute(&selection.to_selection().with_load_mask(!no_mask));

            #[allow(clippy::cast_precision_loss)]
            let coverage = output.mask.sum() / output.mask.len() as f32;

            println!("filename: {}", output.filename);
            println!("size: {}x{}", output.width, output.height);
            println!("image tensor: {:?}", output.image.shape());
            println!("mask tensor: {:?}", output.mask.shape());
            println!("opaque fraction: {coverage:.3}");

            if output.is_fallback() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
