use std::sync::Arc;

use bytes::Bytes;
use command_hub::{
    CommandEntry, Connection, MpscConnection, Origin, Registry, Subscriptions, handler_fn,
    notifier_fn,
};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

// Fan-out cost of one broadcast, including envelope encoding and the mpsc push
// into each subscriber's queue. A writer task per subscriber drains its queue.

fn broadcast_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("broadcast");

    for subscribers in [10usize, 100, 1000] {
        let subs = Arc::new(Subscriptions::new());
        let mut conns = Vec::with_capacity(subscribers);
        let double = notifier_fn(|_, n: i64| async move { Ok(Bytes::from((n * 2).to_string())) });

        for i in 0..subscribers {
            let (conn, mut rx) = MpscConnection::new(64);
            let conn: Arc<dyn Connection> = conn;
            subs.subscribe_cmd(&conn, "tick", i as i64, double.clone());
            rt.spawn(async move { while rx.recv().await.is_some() {} });
            conns.push(conn);
        }

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, _| {
                b.to_async(&rt).iter(|| {
                    let subs = Arc::clone(&subs);
                    async move { subs.broadcast("tick").await }
                });
            },
        );
    }

    group.finish();
}

fn dispatch_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let registry = Registry::new();
    registry
        .add(
            CommandEntry::new("user", Origin::ALL)
                .with_params("{id}/{field}")
                .with_handler(handler_fn(|_, _, req| {
                    Ok(Bytes::from(req.param("field")?.to_string()))
                })),
        )
        .expect("register");

    let line = b"user/42/email/trailing/payload";
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Bytes(line.len() as u64));

    group.bench_function("parse_command", |b| {
        b.iter(|| registry.parse_command(line).expect("known command"))
    });

    group.bench_function("dispatch_line", |b| {
        b.to_async(&rt)
            .iter(|| async { registry.dispatch_line(line, Origin::WS).await.expect("dispatch") })
    });

    group.finish();
}

criterion_group!(benches, broadcast_benchmark, dispatch_benchmark);
criterion_main!(benches);
