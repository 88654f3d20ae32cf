use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use linechat_proto::{notice, Command, LineCodec};
use tokio_util::codec::Decoder;

fn command_parsing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("command");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_chat", |b| {
        b.iter(|| Command::parse("hello everyone, how is it going today?"))
    });
    group.bench_function("parse_rename", |b| b.iter(|| Command::parse("rename|alice")));

    group.finish();
}

fn line_decoding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("line");
    let raw = b"hello everyone, how is it going today?\r\n";
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("decode_line", |b| {
        let mut codec = LineCodec::new();
        b.iter(|| {
            let mut buf = BytesMut::from(&raw[..]);
            codec.decode(&mut buf).unwrap()
        })
    });

    group.bench_function("render_chat", |b| {
        b.iter(|| notice::chat("127.0.0.1:40000", "alice", "hello everyone"))
    });

    group.finish();
}

criterion_group!(benches, command_parsing_benchmark, line_decoding_benchmark);
criterion_main!(benches);
