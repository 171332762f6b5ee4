// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("pms")
        .version(env!("CARGO_PKG_VERSION"))
        .author("PMS Contributors")
        .about("Minimal package installer")
        .subcommand_required(false)
        .subcommand(
            Command::new("install")
                .about("Install a package")
                .arg(Arg::new("package_path").help("Absolute path to the package file"))
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .default_value("/")
                        .help("Root directory payload paths are applied under"),
                )
                .arg(
                    Arg::new("db_dir")
                        .short('d')
                        .long("db-dir")
                        .default_value("/var/lib/pms/db")
                        .help("Registry directory"),
                )
                .arg(
                    Arg::new("scratch_dir")
                        .long("scratch-dir")
                        .default_value("/tmp/pms_extract")
                        .help("Scratch directory, wiped before every install"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("pms.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
