use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sse_hub::channel::{Channel, ChannelName, Event, EventSource, ListenerFn};
use tokio::runtime::Runtime;

fn no_op_listener() -> ListenerFn {
    Arc::new(|_event| Box::pin(async move { true }))
}

fn bench_fire_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("fire_fan_out");

    for listener_count in [1usize, 10, 100, 1_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(listener_count),
            &listener_count,
            |b, &listener_count| {
                let channel = rt.block_on(async {
                    let channel = Channel::new(ChannelName::parse("bench").unwrap());
                    for _ in 0..listener_count {
                        channel.subscribe(no_op_listener()).await;
                    }
                    channel
                });

                b.to_async(&rt).iter(|| async {
                    channel
                        .fire(Event {
                            channel_id: channel.id(),
                            source: EventSource::Publisher,
                            payload: "benchmark payload".to_string(),
                        })
                        .await;
                    black_box(());
                });
            },
        );
    }

    group.finish();
}

fn bench_subscribe(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    c.bench_function("subscribe", |b| {
        let channel = Channel::new(ChannelName::parse("bench-subscribe").unwrap());
        b.to_async(&rt).iter(|| async {
            channel.subscribe(no_op_listener()).await;
        });
    });
}

fn bench_channel_name_parse(c: &mut Criterion) {
    c.bench_function("channel_name_parse", |b| {
        b.iter(|| ChannelName::parse(black_box("device.42.telemetry")));
    });
}

criterion_group!(benches, bench_fire_fan_out, bench_subscribe, bench_channel_name_parse);
criterion_main!(benches);
