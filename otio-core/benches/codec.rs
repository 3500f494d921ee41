use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use otio_core::{
    from_json_bytes, to_json_bytes, Clip, ComposableRef, MediaReference, RationalTime, TimeRange,
    Timeline, Track, Transition,
};

fn make_timeline(clips: usize) -> Timeline {
    let timeline = Timeline::new("bench");
    let track = ComposableRef::from(Track::new("V1"));
    for i in 0..clips {
        let reference = MediaReference::external(format!("file:///media/shot_{i:04}.mov"))
            .with_available_range(TimeRange::from_values(0.0, 240.0, 24.0));
        let range = TimeRange::from_values(12.0, 48.0, 24.0);
        track
            .append_child(ComposableRef::from(Clip::with_media(
                format!("shot {i}"),
                reference,
                Some(range),
            )))
            .unwrap();
        if i % 8 == 7 {
            let offset = RationalTime::new(6.0, 24.0);
            track
                .append_child(ComposableRef::from(Transition::new(
                    "dissolve",
                    "SMPTE_Dissolve",
                    offset,
                    offset,
                )))
                .unwrap();
        }
    }
    timeline.tracks().append_child(track).unwrap();
    timeline
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for clips in [16, 128, 1024] {
        let timeline = make_timeline(clips);
        let size = to_json_bytes(&timeline).unwrap().len();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(clips), &timeline, |b, timeline| {
            b.iter(|| to_json_bytes(black_box(timeline)).unwrap());
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for clips in [16, 128, 1024] {
        let encoded = to_json_bytes(&make_timeline(clips)).unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(clips), &encoded, |b, data| {
            b.iter(|| from_json_bytes(black_box(data)).unwrap());
        });
    }

    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    for clips in [16, 128, 1024] {
        let timeline = make_timeline(clips);
        let track = timeline.tracks().child_at_index(0).unwrap();
        let middle = RationalTime::new((clips * 24) as f64, 24.0);

        group.bench_with_input(BenchmarkId::new("child_at_time", clips), &track, |b, track| {
            b.iter(|| track.child_at_time(black_box(middle), false).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("find_clips", clips), &timeline, |b, timeline| {
            b.iter(|| timeline.find_clips(None, false).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_queries);
criterion_main!(benches);
