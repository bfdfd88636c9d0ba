//! kdip: generate address files and query them by subnet.

use clap::{Parser, Subcommand};
use kdip::shell::{Shell, ShellCommand};
use kdip::{generate_file, AddressFamily, Cidr, Config, IpFile, IpIndex, LoadStrategy};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "kdip")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Index IP addresses in a kd-tree and query them by subnet", long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write random addresses to an address file
    Generate {
        /// IP version of the generated addresses (4 or 6)
        #[arg(short = 'v', long = "ip-version")]
        family: Option<AddressFamily>,

        /// Number of addresses
        #[arg(short = 'n', long)]
        count: Option<u64>,

        /// Output file (gzipped when it ends in .gz)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Load an address file and list the addresses inside subnets
    Query {
        /// Input address file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// How to populate the tree (build or insert)
        #[arg(long)]
        strategy: Option<LoadStrategy>,

        /// Subnets to query; prompts on stdin when none are given
        subnets: Vec<String>,
    },

    /// Interactive 2-d tree shell
    Shell,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            family,
            count,
            output,
            seed,
        } => {
            config.family = family.unwrap_or(config.family);
            config.count = count.unwrap_or(config.count);
            config.data_file = output.unwrap_or(config.data_file);
            config.seed = seed.or(config.seed);
            generate(&config)
        }
        Commands::Query {
            input,
            strategy,
            subnets,
        } => {
            config.data_file = input.unwrap_or(config.data_file);
            config.load = strategy.unwrap_or(config.load);
            query(&config, &subnets)
        }
        Commands::Shell => shell(),
    }
}

fn generate(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let written = generate_file(&config.data_file, config.family, config.count, config.seed)?;
    println!(
        "Generated {} {} addresses in {:?} ({:.2?})",
        written,
        config.family,
        config.data_file,
        started.elapsed()
    );
    Ok(())
}

fn query(config: &Config, subnets: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let file = IpFile::open(&config.data_file)
        .map_err(|e| format!("cannot load {:?}: {}", config.data_file, e))?;
    let family = file.family();
    let index = IpIndex::load(family, file.into_addrs(), config.load)?;
    log::info!(
        "Loaded {} {} addresses from {:?} in {:.2?} ({}, depth {})",
        index.len(),
        family,
        config.data_file,
        started.elapsed(),
        config.load.as_str(),
        index.depth()
    );

    if !subnets.is_empty() {
        for subnet in subnets {
            let cidr: Cidr = subnet.parse()?;
            answer(&index, &cidr)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Subnet (CIDR) or q to quit: ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "q" {
            break;
        }

        let result = line
            .parse::<Cidr>()
            .map_err(Box::<dyn std::error::Error>::from)
            .and_then(|cidr| answer(&index, &cidr));
        if let Err(e) = result {
            log::warn!("{}", e);
        }
    }
    Ok(())
}

/// Print every indexed address inside `cidr`, then the match count.
fn answer(index: &IpIndex, cidr: &Cidr) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let hits = index.query(cidr)?;
    let elapsed = started.elapsed();

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    for addr in &hits {
        writeln!(out, "{}", addr)?;
    }
    writeln!(out, "{} IP(s) found.", hits.len())?;
    out.flush()?;

    log::debug!("Query {} matched {} in {:.2?}", cidr, hits.len(), elapsed);
    Ok(())
}

fn shell() -> Result<(), Box<dyn std::error::Error>> {
    println!("2-d tree shell");
    println!("Commands: i(nsert) <x y>, s(earch) <x y>, d(elete) <x y>, p(rint), q(uit)");

    let mut shell = Shell::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ShellCommand>() {
            Ok(command) => match shell.execute(command) {
                Some(reply) => println!("{}", reply),
                None => break,
            },
            Err(e) => println!("Unknown command ({})", e),
        }
    }
    Ok(())
}
