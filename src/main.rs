use std::path::PathBuf;
use std::process;

use clap::{arg, crate_version, value_parser, ArgMatches, Command};

use balanced_bst::harness::{self, Config, KeyKind};

fn config_from(params: &ArgMatches) -> Config {
    let defaults = Config::default();
    Config {
        step: params.get_one::<usize>("step").copied().unwrap_or(defaults.step),
        iterations: params
            .get_one::<usize>("iterations")
            .copied()
            .unwrap_or(defaults.iterations),
        out_dir: params
            .get_one::<PathBuf>("out-dir")
            .cloned()
            .unwrap_or(defaults.out_dir),
        keys: if params.get_flag("strings") {
            KeyKind::Strings
        } else {
            KeyKind::Integers
        },
        seed: params.get_one::<u64>("seed").copied(),
    }
}

fn main() {
    let params = Command::new("bst-harness")
        .version(crate_version!())
        .about(
            "Time batched insert, find and erase on AVL, splay and treap trees against a \
             BTreeMap baseline, writing one `offset elapsed_ms` series file per container and \
             operation",
        )
        .arg(
            arg!(-s --step <STEP> "How many keys go into each timed batch")
                .value_parser(value_parser!(usize))
                .default_value("10000"),
        )
        .arg(
            arg!(-i --iterations <ITERATIONS>)
                .help("How many batches to run. The dataset holds step * iterations keys")
                .value_parser(value_parser!(usize))
                .default_value("200"),
        )
        .arg(
            arg!(-o --"out-dir" <DIR> "Existing directory to write the series files into")
                .value_parser(value_parser!(PathBuf))
                .default_value("."),
        )
        .arg(arg!(--strings "Use random alphanumeric strings instead of distinct integers"))
        .arg(
            arg!(--seed <SEED>)
                .help("Seed for the dataset and treap priorities, for reproducible runs")
                .value_parser(value_parser!(u64)),
        )
        .get_matches();

    let config = config_from(&params);
    match harness::run(&config, |line| println!("{line}")) {
        Ok(written) => println!(
            "Wrote {} series files to {}",
            written.len(),
            config.out_dir.display()
        ),
        Err(err) => {
            eprintln!("bst-harness: {err}");
            process::exit(1);
        }
    }
}
