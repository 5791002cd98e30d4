// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn targets_arg() -> Arg {
    Arg::new("targets")
        .required(true)
        .num_args(1..)
        .help("Package names")
}

fn build_cli() -> Command {
    Command::new("pkgdeps")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgdeps Contributors")
        .about("Dependency resolution and conflict checking for pacman-style package databases")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file (pacman.conf format)"),
        )
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("PATH")
                .global(true)
                .help("Filesystem root file conflicts are checked against"),
        )
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .global(true)
                .help("Database directory holding local/ and sync/"),
        )
        .arg(
            Arg::new("ignore")
                .long("ignore")
                .value_name("PKG")
                .action(ArgAction::Append)
                .global(true)
                .help("Add a package to the ignore list (repeatable)"),
        )
        .arg(
            Arg::new("noconfirm")
                .long("noconfirm")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Answer every confirmation with yes"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("check")
                .about("Check the dependencies of packages for an operation")
                .arg(
                    Arg::new("op")
                        .long("op")
                        .value_parser(["add", "upgrade", "remove"])
                        .default_value("add")
                        .help("Operation to check for"),
                )
                .arg(targets_arg()),
        )
        .subcommand(
            Command::new("sort")
                .about("Print packages in dependency order")
                .arg(
                    Arg::new("remove")
                        .long("remove")
                        .action(ArgAction::SetTrue)
                        .help("Sort installed packages for removal"),
                )
                .arg(targets_arg()),
        )
        .subcommand(
            Command::new("sync")
                .about("Resolve packages and their dependencies from the sync repositories")
                .arg(targets_arg()),
        )
        .subcommand(
            Command::new("conflicts")
                .about("Check packages for package and file conflicts")
                .arg(targets_arg()),
        )
        .subcommand(
            Command::new("remove")
                .about("Plan the removal of installed packages")
                .arg(
                    Arg::new("cascade")
                        .long("cascade")
                        .action(ArgAction::SetTrue)
                        .help("Also remove dependencies nothing else needs"),
                )
                .arg(targets_arg()),
        )
        .subcommand(
            Command::new("vercmp")
                .about("Compare two version strings")
                .arg(Arg::new("a").required(true).help("First version"))
                .arg(Arg::new("b").required(true).help("Second version")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell to generate completions for"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("pkgdeps.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
