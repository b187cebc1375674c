use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use partdb_core::config::{resolve_with_base, Config, Settings};
use partdb_core::import::{export_json, parse_upload, process_catalog_file, save_processed};
use partdb_core::value::numeric_specs;
use partdb_match::{find_equivalents_for_id, MatchOptions};
use partdb_store::{ComponentStore, FileStore, StoreOptions};

#[derive(Parser)]
#[command(name = "partdb", about = "Component database and equivalence finder")]
struct Cli {
    /// Directory holding config.toml and config.<env>.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Override storage.data_dir
    #[arg(long, global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the stored collection with an uploaded component array
    Import { file: PathBuf },
    /// Convert a raw catalog export and store the result
    ImportCatalog {
        file: PathBuf,
        /// Also write the processed components as JSON
        #[arg(long)]
        processed_out: Option<PathBuf>,
    },
    /// Write the stored collection as pretty JSON
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print one component
    Show { id: String },
    /// List replacement candidates for a component
    Equivalents {
        id: String,
        #[arg(long)]
        min_score: Option<u32>,
        /// Emit results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Storage usage summary
    Stats,
    /// Check that the storage directory is writable
    Verify,
    /// Remove the stored collection
    Clear,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_settings(cli: &Cli) -> anyhow::Result<(Settings, PathBuf)> {
    let config = match &cli.config_dir {
        Some(dir) => {
            let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            Config::load_from(dir, &env_name)
        }
        None => Config::load(),
    }
    .context("loading configuration")?;
    let mut settings = config.settings().context("reading settings")?;
    if let Some(dir) = &cli.data_dir {
        settings.storage.data_dir.clone_from(dir);
    }
    let base = cli.config_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let data_dir = resolve_with_base(&base, &settings.storage.data_dir);
    Ok((settings, data_dir))
}

fn open_store(settings: &Settings, data_dir: &Path) -> anyhow::Result<ComponentStore<FileStore>> {
    let medium = FileStore::open(data_dir, Some(settings.storage.quota_bytes))
        .with_context(|| format!("opening storage at {}", data_dir.display()))?;
    Ok(ComponentStore::with_options(medium, StoreOptions::from(&settings.storage)))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let (settings, data_dir) = load_settings(&cli)?;
    let mut store = open_store(&settings, &data_dir)?;

    match cli.command {
        Command::Import { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let components =
                parse_upload(&text).with_context(|| format!("parsing {}", file.display()))?;
            store.try_save(&components).context("saving components")?;
            info!(count = components.len(), "import complete");
            println!("✅ Imported {} components into {}", components.len(), data_dir.display());
        }
        Command::ImportCatalog { file, processed_out } => {
            let components = process_catalog_file(&file)?;
            if let Some(out) = processed_out {
                save_processed(&out, &components)?;
                println!("Wrote processed catalog to {}", out.display());
            }
            store.try_save(&components).context("saving components")?;
            println!("✅ Processed and stored {} components", components.len());
        }
        Command::Export { out } => {
            let json = export_json(&store.try_load()?);
            match out {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Show { id } => {
            let Some(component) = store.try_load_by_id(&id)? else {
                bail!("component not found: {id}");
            };
            println!("{} ({}) [{}]", component.name, component.id, component.kind);
            if let Some(manufacturer) = &component.manufacturer {
                println!("  manufacturer: {manufacturer}");
            }
            if let Some(package) = component.package() {
                println!("  package: {package}");
            }
            for (name, value) in &component.specifications {
                println!("  {name}: {value}");
            }
            for spec in numeric_specs(&component.specifications) {
                println!("  ~ {} = {} {}", spec.name, spec.value, spec.unit);
            }
        }
        Command::Equivalents { id, min_score, json } => {
            let mut options = MatchOptions::from(&settings.matcher);
            if let Some(min_score) = min_score {
                options.min_score = min_score;
            }
            let (target, results) = find_equivalents_for_id(&store, &id, &options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                println!(
                    "Equivalents for {} ({}), min score {}:",
                    target.name, target.id, options.min_score
                );
                if results.is_empty() {
                    println!("  none found");
                }
                for result in &results {
                    println!(
                        "  {:>3}  {} ({})",
                        result.match_score, result.component.name, result.component.id
                    );
                    for d in &result.differences {
                        println!("       {}: {} -> {}", d.parameter, d.original, d.equivalent);
                    }
                }
            }
        }
        Command::Stats => {
            let stats = store.try_stats()?;
            println!("📊 {} components", stats.component_count);
            println!("   component data: {}", stats.component_data_size_formatted);
            println!(
                "   total used: {} of {} ({:.1}%)",
                stats.total_used_formatted, stats.limit_formatted, stats.percent_used
            );
            if let Some(last_updated) = stats.last_updated {
                println!("   last updated: {last_updated}");
            }
        }
        Command::Verify => {
            if !store.verify() {
                bail!("storage at {} failed verification", data_dir.display());
            }
            println!("✅ Storage at {} is readable and writable", data_dir.display());
        }
        Command::Clear => {
            store.try_clear()?;
            println!("Cleared stored components");
        }
    }
    Ok(())
}
