//! Inspect the CameraLocalizer plugin without a host: registered ids, the
//! full descriptor, default settings and serialized result caches.

use std::{
    fs,
    path::{Path, PathBuf},
};

use camera_localizer::{
    plugin_registry, CacheError, CameraLocalizerInstance, InstanceError, RegistryError,
    ResultsCache, PLUGIN_IDENTIFIER,
};
use camera_localizer_core::{ContextKind, DescriptorIoError};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "CameraLocalizer plugin inspector")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the identifiers of the registered plugins.
    List,
    /// Print or write the validated descriptor JSON of a plugin.
    Describe {
        #[arg(long, default_value = PLUGIN_IDENTIFIER)]
        plugin: String,
        /// Host context: filter, general or paint.
        #[arg(long, default_value = "general", value_parser = parse_context)]
        context: ContextKind,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print or write the default settings snapshot.
    Params {
        /// Number of connected input clips.
        #[arg(long, default_value_t = 1)]
        input: usize,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize a serialized results cache.
    Cache {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error("failed to read results cache: {0}")]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Descriptor(#[from] DescriptorIoError),
}

fn parse_context(raw: &str) -> Result<ContextKind, String> {
    match ContextKind::from_name(raw) {
        Some(ctx @ (ContextKind::Filter | ContextKind::General | ContextKind::Paint)) => Ok(ctx),
        _ => Err(format!("unknown context `{raw}` (expected filter, general or paint)")),
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = camera_localizer_core::init_from_verbosity(cli.verbose);
    log::debug!("log level {level}");

    match cli.command {
        Command::List => {
            for id in plugin_registry().plugin_ids() {
                println!("{id}");
            }
        }
        Command::Describe {
            plugin,
            context,
            output,
        } => {
            let desc = plugin_registry().describe_plugin(&plugin, context)?;
            match output {
                Some(path) => {
                    desc.write_json(&path)?;
                    println!("wrote descriptor to {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&desc)?),
            }
        }
        Command::Params { input, output } => {
            let json = default_settings_json(input)?;
            emit(&json, output.as_deref())?;
        }
        Command::Cache { file } => {
            let raw = fs::read_to_string(&file)?;
            let cache = ResultsCache::deserialize(&raw)?;
            print!("{}", summarize_cache(&cache));
        }
    }
    Ok(())
}

fn default_settings_json(inputs: usize) -> Result<String, CliError> {
    let desc = plugin_registry().describe_plugin(PLUGIN_IDENTIFIER, ContextKind::General)?;
    let mut instance = CameraLocalizerInstance::new(&desc);
    instance.set_connected_inputs(inputs)?;
    let settings = instance.settings()?;
    Ok(serde_json::to_string_pretty(&settings)?)
}

fn emit(json: &str, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            fs::write(path, json)?;
            println!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn summarize_cache(cache: &ResultsCache) -> String {
    let mut out = format!("{} cached frames\n", cache.len());
    for (frame, result) in cache.iter() {
        out.push_str(&format!("frame {frame}:"));
        for (input, camera) in result.cameras.iter().enumerate() {
            if camera.is_localized() {
                out.push_str(&format!(
                    " cam{input}={}/{} inliers",
                    camera.stats.nb_inlier_features(),
                    camera.stats.nb_matched_features()
                ));
            } else {
                out.push_str(&format!(" cam{input}=failed"));
            }
        }
        out.push('\n');
    }
    out
}
