//! Campaign driver for the AstroSurge mining engine.
//!
//! Runs seeded mission campaigns against an in-memory world and reports
//! the business outcomes. Useful for balance sweeps and determinism
//! checks without standing up any real persistence.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use astrosurge_engine::{
    Asteroid, ElementDeposit, EventCatalog, MemoryStore, MiningGlobals, MissionEngine,
    MissionReport, MissionStatus, Ship, StaticPriceTable, UserProfile,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "astrosurge-sim", version = "0.3.0")]
#[command(about = "Seeded mission campaign simulation for the AstroSurge engine")]
struct Args {
    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Missions flown per seed (the ship is reused between missions)
    #[arg(long, default_value_t = 3)]
    missions: u32,

    /// Starting bank balance for the operator
    #[arg(long, default_value_t = 60_000_000)]
    bank: i64,

    /// Cargo hold capacity in kilograms
    #[arg(long, default_value_t = 50_000)]
    capacity: i64,

    /// Mining rig throughput in kilograms per hour
    #[arg(long, default_value_t = 500)]
    mining_power: i64,

    /// Asteroids to target, in order (comma-separated); "all" cycles the catalog
    #[arg(long, default_value = "all")]
    asteroids: String,

    /// List the built-in asteroid catalog and exit
    #[arg(long)]
    list_asteroids: bool,

    /// Path to a custom event catalog JSON (defaults to the built-in one)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "csv", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output (per-day logging via RUST_LOG is separate)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Serialize)]
struct CampaignRecord {
    seed: u64,
    asteroid: String,
    ship: String,
    #[serde(flatten)]
    report: MissionReport,
}

#[derive(Debug, Clone, Serialize)]
struct CampaignAggregate {
    seeds: usize,
    missions: usize,
    completed: usize,
    failed: usize,
    ships_lost: usize,
    mean_days: f64,
    mean_profit: f64,
    total_banked: i64,
    total_yield_kg: i64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_asteroids {
        return list_asteroids(&args);
    }

    announce_banner();

    let start_time = Instant::now();
    let catalog = load_catalog(&args)?;
    let seeds = parse_seeds(&args.seeds)?;
    let targets = resolve_targets(&args.asteroids)?;

    let mut records = Vec::new();
    for &seed in &seeds {
        records.extend(run_campaign(&args, seed, &targets, catalog.clone())?);
    }

    let aggregate = aggregate_records(&seeds, &records);
    write_report(&args, &records, &aggregate, start_time)?;

    if aggregate.completed == 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner() {
    println!("{}", "AstroSurge Campaign Simulator".bright_cyan().bold());
    println!("{}", "=============================".cyan());
}

/// The demo world: a handful of near-Earth targets with plausible mixes of
/// commodity and non-commodity deposits.
fn builtin_asteroids() -> Vec<Asteroid> {
    fn deposit(name: &str, mass_kg: i64) -> ElementDeposit {
        ElementDeposit {
            name: name.to_string(),
            mass_kg,
        }
    }
    vec![
        Asteroid {
            full_name: "433 Eros".to_string(),
            moid_days: 10,
            elements: vec![
                deposit("Gold", 40_000_000),
                deposit("Platinum", 25_000_000),
                deposit("Copper", 90_000_000),
                deposit("Olivine", 500_000_000),
            ],
            commodity_factor: 1.3,
        },
        Asteroid {
            full_name: "16 Psyche".to_string(),
            moid_days: 14,
            elements: vec![
                deposit("Palladium", 30_000_000),
                deposit("Silver", 80_000_000),
                deposit("Copper", 200_000_000),
                deposit("Pyroxene", 700_000_000),
            ],
            commodity_factor: 1.6,
        },
        Asteroid {
            full_name: "101955 Bennu".to_string(),
            moid_days: 6,
            elements: vec![
                deposit("Platinum", 8_000_000),
                deposit("Copper", 30_000_000),
                deposit("Magnetite", 250_000_000),
            ],
            commodity_factor: 0.9,
        },
        Asteroid {
            full_name: "162173 Ryugu".to_string(),
            moid_days: 7,
            elements: vec![
                deposit("Gold", 5_000_000),
                deposit("Silver", 20_000_000),
                deposit("Troilite", 300_000_000),
            ],
            commodity_factor: 1.0,
        },
    ]
}

fn list_asteroids(args: &Args) -> Result<()> {
    let mut output = OutputTarget::new(args.output.clone())?;
    writeln!(output, "Built-in asteroid catalog:")?;
    for asteroid in builtin_asteroids() {
        writeln!(
            output,
            "  {:14} moid {:2} days, factor {:.1}, {} deposits totalling {} kg",
            asteroid.full_name,
            asteroid.moid_days,
            asteroid.commodity_factor,
            asteroid.elements.len(),
            asteroid.total_mass_kg(),
        )?;
    }
    output.flush_inner()?;
    Ok(())
}

fn load_catalog(args: &Args) -> Result<EventCatalog> {
    match &args.events {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            EventCatalog::from_json(&json)
                .with_context(|| format!("invalid event catalog {}", path.display()))
        }
        None => Ok(EventCatalog::builtin()),
    }
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_seeds(input: &str) -> Result<Vec<u64>> {
    split_csv(input)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed: {token}"))
        })
        .collect()
}

fn resolve_targets(input: &str) -> Result<Vec<String>> {
    let catalog: Vec<String> = builtin_asteroids()
        .into_iter()
        .map(|a| a.full_name)
        .collect();
    let tokens = split_csv(input);
    if tokens.iter().any(|t| t == "all") {
        return Ok(catalog);
    }
    for token in &tokens {
        if !catalog.contains(token) {
            anyhow::bail!("unknown asteroid: {token} (try --list-asteroids)");
        }
    }
    Ok(tokens)
}

fn seed_world(args: &Args, store: &MemoryStore) {
    store.put_globals(MiningGlobals::default());
    store.put_user(UserProfile::new(
        "operator",
        "operator",
        "AstroSurge Ventures",
        args.bank,
    ));
    store.put_ship(
        "operator",
        Ship::new("Artemis", args.capacity, args.mining_power),
    );
    for asteroid in builtin_asteroids() {
        store.put_asteroid(asteroid);
    }
}

fn run_campaign(
    args: &Args,
    seed: u64,
    targets: &[String],
    catalog: EventCatalog,
) -> Result<Vec<CampaignRecord>> {
    let store = MemoryStore::new();
    seed_world(args, &store);
    let engine = MissionEngine::new(store, StaticPriceTable, catalog, seed);

    let mut records = Vec::new();
    let mut ship_name = "Artemis".to_string();
    let mut hulls_built = 1;

    for flight in 0..args.missions {
        let target = &targets[flight as usize % targets.len()];
        let mission = engine.start_mission("operator", &ship_name, target)?;
        let report = engine.complete_mission(mission.id)?;

        print_mission_line(args, seed, target, &ship_name, &report);
        records.push(CampaignRecord {
            seed,
            asteroid: target.clone(),
            ship: ship_name.clone(),
            report: report.clone(),
        });

        if report.ship_destroyed {
            // The replacement hull is financed through the operator's loan
            // by the engine; we only commission it here.
            hulls_built += 1;
            ship_name = format!("Artemis Mk{hulls_built}");
            engine.backend().put_ship(
                "operator",
                Ship::new(&ship_name, args.capacity, args.mining_power),
            );
        }
    }

    Ok(records)
}

fn print_mission_line(args: &Args, seed: u64, target: &str, ship: &str, report: &MissionReport) {
    let status = match report.status {
        MissionStatus::Completed => "completed".green(),
        MissionStatus::Failed => "failed".red(),
        MissionStatus::Active => "active".yellow(),
    };
    println!(
        "[seed {seed}] {ship} -> {target}: {status} in {} days, yield {} kg, profit ${}",
        report.days_simulated, report.total_yield_kg, report.profit
    );
    if args.verbose {
        println!(
            "           revenue ${}, cost ${}, penalties ${}, repaid ${}, banked ${}",
            report.total_revenue,
            report.total_cost,
            report.penalties,
            report.loan_repaid,
            report.banked
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn aggregate_records(seeds: &[u64], records: &[CampaignRecord]) -> CampaignAggregate {
    let completed = records
        .iter()
        .filter(|r| r.report.status == MissionStatus::Completed)
        .count();
    let failed = records
        .iter()
        .filter(|r| r.report.status == MissionStatus::Failed)
        .count();
    let ships_lost = records.iter().filter(|r| r.report.ship_destroyed).count();
    let count = records.len().max(1) as f64;
    CampaignAggregate {
        seeds: seeds.len(),
        missions: records.len(),
        completed,
        failed,
        ships_lost,
        mean_days: records
            .iter()
            .map(|r| f64::from(r.report.days_simulated))
            .sum::<f64>()
            / count,
        mean_profit: records.iter().map(|r| r.report.profit as f64).sum::<f64>() / count,
        total_banked: records.iter().map(|r| r.report.banked).sum(),
        total_yield_kg: records.iter().map(|r| r.report.total_yield_kg).sum(),
    }
}

fn write_report(
    args: &Args,
    records: &[CampaignRecord],
    aggregate: &CampaignAggregate,
    start_time: Instant,
) -> Result<()> {
    let mut output = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            #[derive(Serialize)]
            struct JsonReport<'a> {
                aggregate: &'a CampaignAggregate,
                missions: &'a [CampaignRecord],
            }
            serde_json::to_writer_pretty(
                &mut output,
                &JsonReport {
                    aggregate,
                    missions: records,
                },
            )?;
            writeln!(output)?;
        }
        "csv" => write_csv_report(&mut output, records)?,
        _ => write_console_report(&mut output, aggregate)?,
    }

    let duration = start_time.elapsed();
    writeln!(output)?;
    writeln!(output, "Total time: {duration:?}")?;
    output.flush_inner()?;
    Ok(())
}

fn write_csv_report(output: &mut dyn Write, records: &[CampaignRecord]) -> Result<()> {
    writeln!(
        output,
        "seed,ship,asteroid,status,days,yield_kg,revenue,cost,penalties,profit,banked,ship_destroyed"
    )?;
    for r in records {
        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            r.seed,
            r.ship,
            r.asteroid,
            r.report.status.as_code(),
            r.report.days_simulated,
            r.report.total_yield_kg,
            r.report.total_revenue,
            r.report.total_cost,
            r.report.penalties,
            r.report.profit,
            r.report.banked,
            r.report.ship_destroyed,
        )?;
    }
    Ok(())
}

fn write_console_report(output: &mut dyn Write, aggregate: &CampaignAggregate) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "Campaign summary")?;
    writeln!(output, "----------------")?;
    writeln!(
        output,
        "  seeds: {}  missions: {}  completed: {}  failed: {}  ships lost: {}",
        aggregate.seeds,
        aggregate.missions,
        aggregate.completed,
        aggregate.failed,
        aggregate.ships_lost
    )?;
    writeln!(
        output,
        "  mean days: {:.1}  mean profit: ${:.0}",
        aggregate.mean_days, aggregate.mean_profit
    )?;
    writeln!(
        output,
        "  total banked: ${}  total yield: {} kg",
        aggregate.total_banked, aggregate.total_yield_kg
    )?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
