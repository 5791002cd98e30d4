// src/main.rs

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pkgdeps::config::Config;
use pkgdeps::db::{LocalDb, PackageDatabase, SyncDb, load_files};
use pkgdeps::filesystem::find_conflicts;
use pkgdeps::packages::Package;
use pkgdeps::resolver::{
    self, Confirmer, MissingDependency, Operation, Transaction, TransactionPlan, check_conflicts,
    check_deps, sort_by_deps,
};
use pkgdeps::version::vercmp;
use serde::Serialize;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Repository database file suffixes, in lookup order
const SYNC_DB_SUFFIXES: &[&str] = &[".db.tar.gz", ".db.tar.xz", ".db.tar.zst", ".db"];

#[derive(Parser)]
#[command(name = "pkgdeps")]
#[command(author, version, about = "Dependency resolution and conflict checking for pacman-style package databases", long_about = None)]
struct Cli {
    /// Configuration file (pacman.conf format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Filesystem root file conflicts are checked against
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Database directory holding local/ and sync/
    #[arg(short, long, global = true)]
    db_path: Option<PathBuf>,

    /// Add a package to the ignore list (repeatable)
    #[arg(long = "ignore", global = true)]
    ignore: Vec<String>,

    /// Answer every confirmation with yes
    #[arg(long, global = true)]
    noconfirm: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the dependencies of packages for an operation
    Check {
        /// Operation to check for (add, upgrade, remove)
        #[arg(long, default_value = "add")]
        op: Operation,
        /// Package names
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Print packages in dependency order
    Sort {
        /// Sort installed packages for removal
        #[arg(long)]
        remove: bool,
        /// Package names
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Resolve packages and their dependencies from the sync repositories
    Sync {
        /// Package names
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Check packages for package and file conflicts
    Conflicts {
        /// Package names
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Plan the removal of installed packages
    Remove {
        /// Also remove dependencies nothing else needs
        #[arg(long)]
        cascade: bool,
        /// Package names
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Compare two version strings
    Vercmp {
        /// First version
        a: String,
        /// Second version
        b: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Databases opened for one run
struct Databases {
    local: LocalDb,
    sync: Vec<SyncDb>,
}

impl Databases {
    fn open(config: &Config) -> Result<Self> {
        let local = LocalDb::open(&config.local_db_path())
            .with_context(|| format!("Failed to open local database in {}", config.db_path.display()))?;
        let sync = open_sync_dbs(config)?;
        Ok(Self { local, sync })
    }

    fn transaction<'a>(&'a self, config: &'a Config) -> Transaction<'a> {
        self.sync
            .iter()
            .fold(Transaction::new(&self.local, config), |tx, db| tx.with_sync_db(db))
    }

    /// Sync package named `name` together with the repository holding it
    fn find_sync(&self, name: &str) -> Result<(&SyncDb, &Package)> {
        self.sync
            .iter()
            .find_map(|db| db.find(name).map(|pkg| (db, pkg)))
            .ok_or_else(|| pkgdeps::Error::PackageNotFound(name.to_string()).into())
    }

    fn find_local(&self, name: &str) -> Result<&Package> {
        self.local
            .find(name)
            .ok_or_else(|| pkgdeps::Error::PackageNotFound(format!("{} (not installed)", name)).into())
    }
}

fn open_sync_dbs(config: &Config) -> Result<Vec<SyncDb>> {
    let dir = config.sync_db_dir();
    let mut dbs = Vec::new();

    for repo in &config.repos {
        let found = SYNC_DB_SUFFIXES
            .iter()
            .map(|suffix| dir.join(format!("{}{}", repo, suffix)))
            .find(|path| path.is_file());
        match found {
            Some(path) => dbs.push(SyncDb::open(&path)?),
            None => warn!("No database file for repository {} in {}", repo, dir.display()),
        }
    }

    // Without configured repositories use whatever is in the sync directory
    if config.repos.is_empty() && dir.is_dir() {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_sync_db_file(path))
            .collect();
        paths.sort();
        for path in paths {
            dbs.push(SyncDb::open(&path)?);
        }
    }

    info!("Opened {} sync database(s)", dbs.len());
    Ok(dbs)
}

fn is_sync_db_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .map(|n| n.to_string_lossy().contains(".db"))
            .unwrap_or(false)
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if let Some(db_path) = &cli.db_path {
        config.db_path = db_path.clone();
    }
    for name in &cli.ignore {
        if !config.is_ignored(name) {
            config.ignore_pkgs.push(name.clone());
        }
    }
    config.no_confirm |= cli.noconfirm;

    Ok(config)
}

/// Asks transaction questions on stdin; `--noconfirm` answers yes
struct StdinConfirmer {
    no_confirm: bool,
}

impl StdinConfirmer {
    fn new(no_confirm: bool) -> Self {
        Self { no_confirm }
    }

    fn ask(&self, question: &str) -> bool {
        if self.no_confirm {
            return true;
        }
        print!("{} [Y/n] ", question);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

impl Confirmer for StdinConfirmer {
    fn confirm_ignored(&mut self, target: &str, provider: &Package) -> bool {
        self.ask(&format!(
            ":: {} requires {}, which is in IgnorePkg. Install anyway?",
            target, provider.name
        ))
    }

    fn confirm_hold(&mut self, pkg: &Package) -> bool {
        self.ask(&format!(
            ":: {} is designated as a HoldPkg. Remove anyway?",
            pkg.name
        ))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "" | "y" | "yes")
}

fn package_label(pkg: &Package) -> String {
    format!("{}-{}", pkg.name, pkg.version)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_missing(missing: &[MissingDependency], json: bool) -> Result<()> {
    if json {
        return print_json(&missing);
    }
    if missing.is_empty() {
        println!("No problems found.");
    }
    for miss in missing {
        println!("  {}", miss);
    }
    Ok(())
}

fn print_plan(plan: &TransactionPlan<'_>, json: bool) -> Result<()> {
    if json {
        return print_json(plan);
    }
    if plan.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }
    println!("Packages ({}):", plan.packages.len());
    for pkg in &plan.packages {
        let pulled = plan.pulled.iter().any(|p| std::ptr::eq(*p, *pkg));
        println!("  {}{}", package_label(pkg), if pulled { " (dependency)" } else { "" });
    }
    Ok(())
}

#[derive(Serialize)]
struct ConflictReport<'a> {
    packages: &'a [MissingDependency],
    files: &'a [pkgdeps::filesystem::Conflict],
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let filter = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let Some(command) = &cli.command else {
        println!("pkgdeps v{}", env!("CARGO_PKG_VERSION"));
        println!("Run 'pkgdeps --help' for usage information");
        return Ok(());
    };

    if let Commands::Vercmp { a, b } = command {
        let result = match vercmp(a, b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        };
        println!("{}", result);
        return Ok(());
    }

    if let Commands::Completions { shell } = command {
        clap_complete::generate(*shell, &mut Cli::command(), "pkgdeps", &mut io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let dbs = Databases::open(&config)?;

    match command {
        Commands::Check { op, targets } => {
            let mut tx = dbs.transaction(&config);
            for name in targets {
                let pkg = match op {
                    Operation::Remove => dbs.find_local(name)?,
                    Operation::Add | Operation::Upgrade => dbs.find_sync(name)?.1,
                };
                tx.add_target(pkg);
            }

            info!("Checking dependencies for {} ({})", targets.join(" "), op);
            let missing = check_deps(&tx, *op, tx.targets());
            print_missing(&missing, cli.json)?;
            if !missing.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Sort { remove, targets } => {
            let mut packages = Vec::with_capacity(targets.len());
            for name in targets {
                packages.push(if *remove {
                    dbs.find_local(name)?
                } else {
                    dbs.find_sync(name)?.1
                });
            }

            let mode = if *remove { Operation::Remove } else { Operation::Add };
            let sorted = sort_by_deps(&packages, mode);
            let labels: Vec<String> = sorted.iter().map(|p| package_label(p)).collect();
            if cli.json {
                print_json(&labels)
            } else {
                for label in labels {
                    println!("{}", label);
                }
                Ok(())
            }
        }
        Commands::Sync { targets } => {
            let mut tx = dbs.transaction(&config);
            for name in targets {
                tx.add_target(dbs.find_sync(name)?.1);
            }

            let mut confirm = StdinConfirmer::new(config.no_confirm);
            let plan = resolver::prepare_sync(&tx, &mut confirm)?;
            print_plan(&plan, cli.json)
        }
        Commands::Conflicts { targets } => {
            let mut packages = Vec::with_capacity(targets.len());
            for name in targets {
                let (db, pkg) = dbs.find_sync(name)?;
                load_files(db, pkg)?;
                packages.push(pkg);
            }

            let package_conflicts = check_conflicts(&packages, &dbs.local);
            let (file_conflicts, skip_list) = find_conflicts(&packages, &config.root, &dbs.local)?;
            if !skip_list.is_empty() {
                info!("{} file(s) change owner", skip_list.len());
            }

            if cli.json {
                print_json(&ConflictReport {
                    packages: &package_conflicts,
                    files: &file_conflicts,
                })?;
            } else {
                print_missing(&package_conflicts, false)?;
                for conflict in &file_conflicts {
                    println!("  {}", conflict);
                }
            }
            if !package_conflicts.is_empty() || !file_conflicts.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Remove { cascade, targets } => {
            let mut tx = dbs.transaction(&config);
            for name in targets {
                tx.add_target(dbs.find_local(name)?);
            }

            let mut confirm = StdinConfirmer::new(config.no_confirm);
            let plan = resolver::prepare_remove(&tx, *cascade, &mut confirm)?;
            print_plan(&plan, cli.json)
        }
        Commands::Vercmp { .. } | Commands::Completions { .. } => Ok(()),
    }
}
