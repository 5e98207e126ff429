use anyhow::{Context, Result};
use quire_config::{Config, RuleSet};
use quire_kernel::{Document, DocumentPartition, LexicalPartitioner};
use std::{env, path::PathBuf, process};

const PREVIEW_CHARS: usize = 40;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} <file> [rules.toml]");
    eprintln!("       {program} --init");
    process::exit(1);
}

/// Rules from an explicit path, else the user's config file, else the C-like preset.
fn load_rules(explicit: Option<PathBuf>) -> Result<RuleSet> {
    let config = match explicit {
        Some(path) => {
            let path = Config::expand_path(&path).unwrap_or(path);
            Config::load_from_path(&path)?
                .with_context(|| format!("No rules file at {}", path.display()))?
        }
        None => match Config::load()? {
            Some(config) => {
                log::info!("Using rules from {}", Config::config_path().display());
                config
            }
            None => {
                log::info!("No rules file found, using the built-in C-like rules");
                Config::c_like()
            }
        },
    };
    Ok(config.build_rules()?)
}

fn preview(document: &Document, text: &str, partition: &DocumentPartition) -> Result<String> {
    let buffer = document.buffer();
    let start = buffer.offset_of(partition.region.beginning())?;
    let end = buffer.offset_of(partition.region.end())?;
    let mut shown: String = text[start..end].chars().take(PREVIEW_CHARS).collect();
    if shown.len() < end - start {
        shown.push('…');
    }
    Ok(format!("{shown:?}"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("quire");

    if args.len() == 2 && args[1] == "--init" {
        let config_path = Config::config_path();
        if config_path.exists() {
            eprintln!("Error: {} already exists", config_path.display());
            process::exit(1);
        }
        Config::c_like().save()?;
        println!("Wrote default rules to {}", config_path.display());
        return Ok(());
    }

    let (file, rules_path) = match args.as_slice() {
        [_, file] => (PathBuf::from(file), None),
        [_, file, rules] => (PathBuf::from(file), Some(PathBuf::from(rules))),
        _ => usage(program),
    };

    let rule_set = load_rules(rules_path)?;
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut document = Document::from_text(&text);
    document.set_partitioner(Box::new(LexicalPartitioner::with_rules(
        rule_set.rules.clone(),
    )?));
    log::info!(
        "Partitioned {} ({} lines, {} rules)",
        file.display(),
        document.number_of_lines(),
        rule_set.rules.len()
    );

    for partition in document.partitions() {
        let name = rule_set
            .name_of(partition.content_type)
            .map(str::to_string)
            .unwrap_or_else(|| partition.content_type.to_string());
        println!(
            "{:<24} {:<16} {}",
            partition.region.to_string(),
            name,
            preview(&document, &text, &partition)?
        );
    }

    Ok(())
}
