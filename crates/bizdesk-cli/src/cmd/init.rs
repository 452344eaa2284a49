//! `bz init`: create the `.bizdesk/` workspace.

use anyhow::{Context as _, Result};
use bizdesk_core::config::{self, DEFAULT_PROJECT_CONFIG, WORKSPACE_DIR};
use bizdesk_core::db;
use clap::Args;
use std::path::Path;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config even if `.bizdesk/` already exists. Records are kept.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "bizdesk.sqlite3\nbizdesk.sqlite3-wal\nbizdesk.sqlite3-shm\n";

/// Execute `bz init`. Creates the workspace skeleton:
///
/// ```text
/// .bizdesk/
///   config.toml         (default project config)
///   .gitignore          (the SQLite store and its WAL files)
///   bizdesk.sqlite3     (migrated record store)
/// ```
///
/// # Errors
///
/// Returns an error if `.bizdesk/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, project_root: &Path) -> Result<()> {
    let workspace_dir = project_root.join(WORKSPACE_DIR);

    if workspace_dir.exists() && !args.force {
        anyhow::bail!("{WORKSPACE_DIR}/ already exists. Use `bz init --force` to reinitialize.");
    }

    std::fs::create_dir_all(&workspace_dir)
        .with_context(|| format!("Failed to create {}", workspace_dir.display()))?;

    let config_path = workspace_dir.join("config.toml");
    std::fs::write(&config_path, DEFAULT_PROJECT_CONFIG)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = workspace_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let project = config::load_project_config(&workspace_dir)?;
    let store_path = config::store_path(&workspace_dir, &project);
    db::open_store(&store_path)
        .with_context(|| format!("Failed to create store: {}", store_path.display()))?;
    info!(path = %store_path.display(), "store ready");

    println!("✓ Initialized {WORKSPACE_DIR}/ workspace.");
    println!();
    println!("  Config: {WORKSPACE_DIR}/config.toml");
    println!("  Store:  {}", store_path.display());
    println!();
    println!("Next steps:");
    println!("  Pick the account records are scoped to:");
    println!("    export BIZDESK_ACCOUNT=acme");
    println!("    export BIZDESK_EMAIL=ops@acme.test");
    println!();
    println!("  Open your first ticket:");
    println!("    bz ticket create --title \"Cannot log in\" --customer \"Casey\"");
    Ok(())
}
