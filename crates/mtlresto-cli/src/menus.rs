//! Menu import: one `<restaurant>.json` file per restaurant.
//!
//! Unreadable or invalid files are logged and skipped; a database failure
//! for one restaurant does not stop the others.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use futures::stream::{self, StreamExt};
use mtlresto_core::{MenuFile, MenuStatus, RestaurantMenu, UNNAMED_RESTAURANT};

/// Sub-commands available under `menus`.
#[derive(Debug, Subcommand)]
pub enum MenuCommands {
    /// Import every `*.json` menu file in a directory
    Import {
        /// Directory of scraped menu files
        dir: PathBuf,
        /// Restaurants written concurrently
        #[arg(long, default_value = "4")]
        concurrency: usize,
        /// Parse and report without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the stored menu for one restaurant
    Show {
        /// Restaurant name (sanitized the same way as on import)
        name: String,
    },
}

#[derive(Debug)]
enum ImportOutcome {
    Written { items: u64 },
    Failed(String),
}

pub(crate) async fn run_menus(pool: &sqlx::PgPool, command: MenuCommands) -> anyhow::Result<()> {
    match command {
        MenuCommands::Import {
            dir,
            concurrency,
            dry_run,
        } => run_import(pool, &dir, concurrency, dry_run).await,
        MenuCommands::Show { name } => run_show(pool, &name).await,
    }
}

/// `*.json` files directly under `dir`, sorted by path.
pub(crate) fn menu_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads and normalizes one menu file. The restaurant name is the file stem.
pub(crate) fn load_menu(path: &Path) -> anyhow::Result<RestaurantMenu> {
    let restaurant = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(UNNAMED_RESTAURANT);
    let content = std::fs::read_to_string(path)?;
    Ok(MenuFile::parse(&content)?.into_restaurant_menu(restaurant)?)
}

/// Parses every file, keeping the ones that produce a menu.
pub(crate) fn load_menus(files: &[PathBuf]) -> Vec<RestaurantMenu> {
    files
        .iter()
        .filter_map(|path| match load_menu(path) {
            Ok(menu) => Some(menu),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping menu file");
                None
            }
        })
        .collect()
}

async fn run_import(
    pool: &sqlx::PgPool,
    dir: &Path,
    concurrency: usize,
    dry_run: bool,
) -> anyhow::Result<()> {
    let files = menu_files(dir)?;
    if files.is_empty() {
        anyhow::bail!("no .json menu files found in {}", dir.display());
    }

    let menus = load_menus(&files);
    let skipped = files.len() - menus.len();
    if menus.is_empty() {
        anyhow::bail!("no importable menus in {}: all {skipped} file(s) skipped", dir.display());
    }

    if dry_run {
        println!(
            "dry-run: would import {} restaurant(s), {skipped} file(s) skipped",
            menus.len()
        );
        for menu in &menus {
            println!(
                "  {:<40} {:<14} {} item(s)",
                menu.name,
                menu.status.as_str(),
                menu.items.len()
            );
        }
        return Ok(());
    }

    let results: Vec<(&RestaurantMenu, ImportOutcome)> = stream::iter(&menus)
        .map(|menu| async move { (menu, import_one(pool, menu).await) })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut total_items: u64 = 0;
    let mut failed: usize = 0;
    for (menu, outcome) in &results {
        match outcome {
            ImportOutcome::Written { items } => {
                total_items = total_items.saturating_add(*items);
                println!(
                    "  \u{2713} {:<40} {:<14} {items} item(s)",
                    menu.name,
                    menu.status.as_str()
                );
            }
            ImportOutcome::Failed(message) => {
                failed += 1;
                println!("  \u{2717} {:<40} {message}", menu.name);
            }
        }
    }

    if failed == results.len() {
        anyhow::bail!("all {failed} restaurants failed to import");
    }

    println!(
        "imported {} restaurant(s), {total_items} item(s); {failed} failed, {skipped} file(s) skipped",
        results.len() - failed
    );
    Ok(())
}

async fn import_one(pool: &sqlx::PgPool, menu: &RestaurantMenu) -> ImportOutcome {
    let restaurant = match mtlresto_db::upsert_restaurant(pool, menu).await {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!(restaurant = %menu.name, error = %e, "failed to upsert restaurant");
            return ImportOutcome::Failed(format!("{e:#}"));
        }
    };

    if menu.status != MenuStatus::Internal {
        return ImportOutcome::Written { items: 0 };
    }

    match mtlresto_db::insert_menu_items(pool, restaurant.id, &menu.items).await {
        Ok(items) => ImportOutcome::Written { items },
        Err(e) => {
            tracing::warn!(restaurant = %menu.name, error = %e, "failed to write menu items");
            ImportOutcome::Failed(format!("{e:#}"))
        }
    }
}

async fn run_show(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<()> {
    let name = mtlresto_core::sanitize_name(name);
    let restaurant = mtlresto_db::get_restaurant_by_name(pool, &name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("restaurant '{name}' not found"))?;

    let status = restaurant.status()?;
    println!("{} ({})", restaurant.name, status.as_str());
    if let Some(url) = restaurant.external_menu_url.as_deref() {
        println!("  external menu: {url}");
    }

    let items = mtlresto_db::list_menu_items(pool, restaurant.id).await?;
    let mut section = "";
    for item in &items {
        if item.section != section {
            section = &item.section;
            println!("  [{section}]");
        }
        println!("    {:<40} {:>8}  {}", item.name, item.price, item.description);
    }
    Ok(())
}
