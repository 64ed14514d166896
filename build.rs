// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("pacdb")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pacdb Contributors")
        .about("Convert pacman sync databases into a queryable SQLite database")
        .subcommand_required(false)
        .subcommand(
            Command::new("convert")
                .about("Convert sync databases into a SQLite database")
                .arg(
                    Arg::new("sync_dir")
                        .short('s')
                        .long("sync-dir")
                        .value_name("DIR")
                        .default_value("/var/lib/pacman/sync")
                        .help("Directory holding the sync databases"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .default_value("pacman.sqlite")
                        .help("Output database path, replaced atomically on success"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("pacdb.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
