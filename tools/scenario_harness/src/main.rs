use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use scenario_core::schema::{
    CompartmentId, PersonId, RandomNumberGeneratorId, RegionId, ResourceId, TimeTrackingPolicy,
};
use scenario_core::{
    load_ledger_config_from_env, ComponentSupplier, LedgerConfig, LedgerError, LedgerEvent,
    RandomStreams, ResourceLedger, Scenario, UnstructuredScenarioBuilder,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic scenario and resource ledger harness", long_about = None)]
struct Args {
    /// Number of people in the synthetic population
    #[arg(long, default_value_t = 100)]
    people: u32,

    /// Number of regions people are spread across
    #[arg(long, default_value_t = 4)]
    regions: usize,

    /// Units of the resource seeded into every region
    #[arg(long, default_value_t = 1_000)]
    stock: i64,

    /// Number of random transfers to attempt
    #[arg(long, default_value_t = 1_000)]
    transfers: u32,

    /// Base seed for the random streams
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Ledger config JSON (defaults to LEDGER_CONFIG_PATH, then the builtin)
    #[arg(long)]
    ledger_config: Option<PathBuf>,

    /// Print every person identifier in the report
    #[arg(long)]
    list_people: bool,
}

const RESOURCE: &str = "water";
const TRANSFER_STREAM: &str = "transfers";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if args.regions == 0 {
        anyhow::bail!("--regions must be at least 1");
    }

    let scenario = build_scenario(&args).context("Failed to build synthetic scenario")?;
    let config = match &args.ledger_config {
        Some(path) => LedgerConfig::from_file(path)
            .with_context(|| format!("Failed to load ledger config {}", path.display()))?,
        None => load_ledger_config_from_env(),
    };

    let mut ledger = ResourceLedger::from_scenario(&scenario, &config);
    let mut moved: i128 = 0;
    ledger.subscribe_fn(move |event: &LedgerEvent| {
        if let LedgerEvent::PersonResourceChanged { .. } = event {
            moved += event.level_delta().unwrap_or(0).abs();
            tracing::trace!(target: "scenario::harness", moved, "harness.person_level_changed");
        }
    });

    let resource = ResourceId::new(RESOURCE);
    let total_before = ledger.total_resource_level(&resource)?;
    let mut streams = RandomStreams::from_scenario(&scenario, args.seed);
    let (accepted, rejected) = run_transfers(&mut ledger, &mut streams, &args, &resource)?;
    let total_after = ledger.total_resource_level(&resource)?;
    tracing::info!(
        target: "scenario::harness",
        accepted,
        rejected,
        conserved = total_before == total_after,
        "harness.finished"
    );

    let regions: serde_json::Map<String, serde_json::Value> = ledger
        .region_ids()
        .map(|region| {
            let level = ledger.region_resource_level(region, &resource)?;
            Ok((region.to_string(), json!(level)))
        })
        .collect::<Result<_, LedgerError>>()?;
    let mut report = json!({
        "fingerprint": format!("{:016x}", scenario.fingerprint()),
        "person_count": ledger.person_count(),
        "transfers": { "accepted": accepted, "rejected": rejected },
        "total_before": total_before.to_string(),
        "total_after": total_after.to_string(),
        "regions": regions,
    });
    if args.list_people {
        let people: Vec<u32> = ledger.person_ids().map(|person| person.0).collect();
        report["people"] = json!(people);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn region_id(index: usize) -> RegionId {
    RegionId::new(format!("region-{index}"))
}

fn build_scenario(args: &Args) -> Result<Scenario> {
    let resource = ResourceId::new(RESOURCE);
    let home = CompartmentId::new("home");
    let supplier = ComponentSupplier::inert();

    // Recorded in reverse dependency order; the builder replays them.
    let mut builder = UnstructuredScenarioBuilder::new();
    for person in 0..args.people {
        let region = region_id(person as usize % args.regions);
        builder.add_person(PersonId(person), region, home.clone());
    }
    for index in 0..args.regions {
        builder.set_region_resource_level(region_id(index), resource.clone(), args.stock);
    }
    builder
        .set_resource_time_tracking(resource.clone(), TimeTrackingPolicy::TrackTime)
        .set_suggested_population_size(args.people as usize)
        .add_random_number_generator_id(RandomNumberGeneratorId::new(TRANSFER_STREAM))
        .add_resource(resource)
        .add_compartment_id(home, supplier.clone());
    for index in 0..args.regions {
        builder.add_region_id(region_id(index), supplier.clone());
    }
    Ok(builder.build()?)
}

fn run_transfers(
    ledger: &mut ResourceLedger,
    streams: &mut RandomStreams,
    args: &Args,
    resource: &ResourceId,
) -> Result<(u32, u32)> {
    let stream = RandomNumberGeneratorId::new(TRANSFER_STREAM);
    let mut accepted = 0;
    let mut rejected = 0;
    let start = ledger.time();
    for step in 0..args.transfers {
        ledger.set_time(start + f64::from(step))?;
        let rng = streams.stream(&stream)?;
        let amount = rng.gen_range(0..=args.stock.max(1) / 10);
        let outcome = if args.people > 0 && rng.gen_bool(0.5) {
            let person = PersonId(rng.gen_range(0..args.people));
            if rng.gen_bool(0.5) {
                ledger.transfer_resource_to_person_from_region(resource, person, amount)
            } else {
                ledger.transfer_resource_from_person_to_region(resource, person, amount)
            }
        } else {
            let source = region_id(rng.gen_range(0..args.regions));
            let destination = region_id(rng.gen_range(0..args.regions));
            ledger.transfer_resource_between_regions(resource, &source, &destination, amount)
        };
        match outcome {
            Ok(()) => accepted += 1,
            Err(
                LedgerError::InsufficientResourcesAvailable { .. }
                | LedgerError::ReflexiveResourceTransfer(_),
            ) => rejected += 1,
            Err(err) => return Err(err).with_context(|| format!("Transfer {step} failed")),
        }
    }
    Ok((accepted, rejected))
}
