use std::sync::Arc;

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use eventhub_core::{EventId, UserId};
use eventhub_events::EventAttributes;
use eventhub_infra::service::EventService;
use eventhub_infra::store::{InMemoryEventStore, InMemoryRegistrationLedger};

type Service = EventService<Arc<InMemoryEventStore>, InMemoryRegistrationLedger>;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

fn attrs() -> EventAttributes {
    EventAttributes {
        name: "Benchmark social".to_string(),
        description: "Throughput of the registration path".to_string(),
        location: "Quad".to_string(),
        starts_at: Utc.with_ymd_and_hms(2030, 1, 1, 18, 0, 0).unwrap(),
        image_data: None,
        color: None,
        price: None,
        priority: None,
        tickets_available: 1_000,
    }
}

fn setup(rt: &Runtime) -> (Service, EventId) {
    let store = Arc::new(InMemoryEventStore::new());
    let ledger = InMemoryRegistrationLedger::attached_to(&store);
    let svc = EventService::new(store, ledger);
    let event = rt.block_on(svc.create_event(UserId::new(1), attrs())).unwrap();
    (svc, event.id)
}

/// Register then cancel one pair: the steady-state cost of the ledger.
fn bench_register_cancel(c: &mut Criterion) {
    let rt = runtime();
    let (svc, event_id) = setup(&rt);
    let user = UserId::new(2);

    let mut group = c.benchmark_group("registration");
    group.throughput(Throughput::Elements(1));
    group.bench_function("register_then_cancel", |b| {
        b.iter(|| {
            rt.block_on(async {
                svc.register(black_box(event_id), user).await.unwrap();
                svc.cancel_registration(event_id, user).await.unwrap();
            })
        })
    });
    group.bench_function("duplicate_rejected", |b| {
        rt.block_on(svc.register(event_id, UserId::new(3))).unwrap();
        b.iter(|| {
            let result = rt.block_on(svc.register(black_box(event_id), UserId::new(3)));
            assert!(result.is_err());
        })
    });
    group.finish();
}

/// Status lookups against ledgers of growing size.
fn bench_status_lookup(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("registration_status");

    for attendees in [10_i64, 1_000, 10_000] {
        let (svc, event_id) = setup(&rt);
        rt.block_on(async {
            for id in 0..attendees {
                svc.register(event_id, UserId::new(100 + id)).await.unwrap();
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(attendees), &attendees, |b, _| {
            b.iter(|| {
                rt.block_on(svc.registration_status(black_box(event_id), UserId::new(100)))
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_register_cancel, bench_status_lookup);
criterion_main!(benches);
