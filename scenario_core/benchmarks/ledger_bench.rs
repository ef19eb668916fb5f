use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use scenario_core::schema::{CompartmentId, PersonId, RegionId, ResourceId};
use scenario_core::{
    ComponentSupplier, LedgerConfig, ResourceLedger, Scenario, UnstructuredScenarioBuilder,
};

const REGION_COUNT: u32 = 16;

fn region(index: u32) -> RegionId {
    RegionId::new(format!("region-{index}"))
}

fn food() -> ResourceId {
    ResourceId::new("food")
}

fn scenario(population: u32) -> Scenario {
    let mut builder = UnstructuredScenarioBuilder::new();
    for person in 0..population {
        builder
            .add_person(PersonId(person), region(person % REGION_COUNT), CompartmentId::new("home"))
            .set_person_resource_level(PersonId(person), food(), 10);
    }
    for index in 0..REGION_COUNT {
        builder
            .add_region_id(region(index), ComponentSupplier::inert())
            .set_region_resource_level(region(index), food(), 1_000_000);
    }
    builder
        .add_compartment_id(CompartmentId::new("home"), ComponentSupplier::inert())
        .add_resource(food());
    builder.build().expect("bench scenario builds")
}

fn bench_scenario_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario_build");
    for population in [1_000u32, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("unstructured", population),
            &population,
            |b, &population| b.iter(|| black_box(scenario(population))),
        );
    }
    group.finish();
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("resource_ledger");
    for population in [1_000u32, 100_000] {
        let scenario = scenario(population);
        group.bench_with_input(
            BenchmarkId::new("person_round_trip", population),
            &population,
            |b, &population| {
                b.iter_batched(
                    || ResourceLedger::from_scenario(&scenario, &LedgerConfig::default()),
                    |mut ledger| {
                        for person in 0..population {
                            let person = PersonId(person);
                            ledger
                                .transfer_resource_to_person_from_region(&food(), person, 2)
                                .expect("region holds enough food");
                            ledger
                                .transfer_resource_from_person_to_region(&food(), person, 1)
                                .expect("person holds enough food");
                        }
                        ledger
                    },
                    BatchSize::LargeInput,
                )
            },
        );

        let ledger = ResourceLedger::from_scenario(&scenario, &LedgerConfig::default());
        group.bench_with_input(
            BenchmarkId::new("total_resource_level", population),
            &ledger,
            |b, ledger| b.iter(|| black_box(ledger.total_resource_level(&food()))),
        );
    }
    group.finish();
}

criterion_group!(ledger_benches, bench_scenario_build, bench_ledger);
criterion_main!(ledger_benches);
