//! Command handlers for the CLI
//!
//! Each handler takes the parsed arguments plus the loaded configuration,
//! with command-line flags taking precedence over configured values.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::app::{CacheStore, DatasetCatalog, FetchOutcome, FetchRequest, Fetcher};
use crate::cli::args::{CacheAction, CacheArgs, FetchArgs};
use crate::cli::startup::resolve_fetch_inputs;
use crate::config::AppConfig;
use crate::errors::Result;

/// Handle the fetch command
pub async fn handle_fetch(args: FetchArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    let (client_config, fetch_config) = config.to_runtime_config()?;
    let fetcher = Fetcher::from_config(client_config, fetch_config)?;

    let (dataset, year) = resolve_fetch_inputs(&args, fetcher.catalog())?;
    let base_path = resolve_base_path(args.base_path, config);
    let request = FetchRequest::new(dataset, year, base_path).with_force(args.force);
    debug!("Fetch request: {:?}", request);

    let spinner = if quiet {
        None
    } else {
        Some(fetch_spinner(&format!(
            "Fetching '{}' for {}...",
            request.dataset_type, request.year
        )))
    };

    let start = Instant::now();
    let result = fetcher.fetch(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let outcome = result?;
    info!("Fetch finished in {:?}", start.elapsed());

    match outcome {
        FetchOutcome::Downloaded {
            path,
            cache_updated,
        } => {
            if quiet {
                println!("{}", path.display());
            } else {
                println!(
                    "✅ Downloaded '{}' {} to {}",
                    request.dataset_type,
                    request.year,
                    path.display()
                );
                if !cache_updated {
                    println!(
                        "⚠️  The cache record could not be updated; the next run will download again"
                    );
                }
            }
        }
        FetchOutcome::Skipped {
            key,
            decision,
            recorded_path,
        } => {
            if !quiet {
                println!("ℹ️  {} is up to date ({}), download skipped", key, decision);
                if let Some(path) = recorded_path {
                    println!("   Stored file: {}", path);
                }
            }
        }
    }

    Ok(())
}

/// Handle the datasets command
pub async fn handle_datasets(config: &AppConfig) -> Result<()> {
    let catalog = DatasetCatalog::builtin();
    let base_url = config.storage.base_url.trim_end_matches('/');

    println!("📊 Available Datasets");
    println!("=====================");
    println!();
    for dataset in catalog.iter() {
        println!("  {:<16} {}", dataset.id, dataset.description);
        println!(
            "  {:<16} {}/{}/{}_<YEAR>.zip -> {}/<YEAR>/",
            "",
            base_url,
            dataset.resource_name,
            dataset.resource_name,
            dataset.destination_subfolder
        );
    }
    println!();
    println!("Usage: tse_fetcher fetch <DATASET> <YEAR>");

    Ok(())
}

/// Handle cache commands
pub async fn handle_cache(args: CacheArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        CacheAction::Show { base_path } => {
            let base_path = resolve_base_path(base_path, config);
            let (_, fetch_config) = config.to_runtime_config()?;
            let store = CacheStore::new(fetch_config.metadata_path(&base_path));
            let (table, status) = store.load_with_status().await;

            println!("🗂️  Cache Record");
            println!("===============");
            println!("Location: {}", store.path().display());
            println!("Status:   {}", status);
            println!();

            if table.is_empty() {
                println!("No cached downloads.");
                return Ok(());
            }

            for (key, entry) in table.iter() {
                println!("{}", key);
                println!("  ETag:          {}", entry.etag().unwrap_or("-"));
                println!("  Last-Modified: {}", entry.last_modified().unwrap_or("-"));
                println!(
                    "  File:          {}",
                    entry.file_path.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

fn resolve_base_path(flag: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.base_path().to_path_buf())
}

fn fetch_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .map(|style| style.tick_strings(&["◐", "◓", "◑", "◒"]))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{CacheEntry, CacheKey, CacheTable};
    use tempfile::TempDir;

    #[test]
    fn test_base_path_flag_takes_precedence() {
        let config = AppConfig::default();
        assert_eq!(resolve_base_path(None, &config), PathBuf::from("data/raw"));
        assert_eq!(
            resolve_base_path(Some(PathBuf::from("/tmp/out")), &config),
            PathBuf::from("/tmp/out")
        );
    }

    #[tokio::test]
    async fn test_handle_cache_show() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::default();
        let (_, fetch_config) = config.to_runtime_config().unwrap();

        let mut table = CacheTable::new();
        table.insert(
            &CacheKey::new("cand", 2022),
            CacheEntry {
                etag: Some("\"v1\"".to_string()),
                last_modified: None,
                file_path: Some("candidatos/2022/x.csv".to_string()),
            },
        );
        CacheStore::new(fetch_config.metadata_path(temp_dir.path()))
            .save(&table)
            .await
            .unwrap();

        let args = CacheArgs {
            action: CacheAction::Show {
                base_path: Some(temp_dir.path().to_path_buf()),
            },
        };
        assert!(handle_cache(args, &config).await.is_ok());
    }

    #[tokio::test]
    async fn test_handle_datasets() {
        assert!(handle_datasets(&AppConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_with_invalid_year_is_rejected() {
        let args = FetchArgs {
            dataset: Some("cand".to_string()),
            year: Some(1900),
            base_path: None,
            force: false,
        };

        let err = handle_fetch(args, &AppConfig::default(), true)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
