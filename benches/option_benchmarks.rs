use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mediagrab::extractor::ytdlp::parse_output_line;
use mediagrab::extractor::{build_options, classify, DownloadMode, DownloadRequest};
use mediagrab::utils::AppConfig;

fn benchmark_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("URL Classification");

    let urls = [
        ("youtube", "https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        ("bilibili_bv", "https://b23.tv/BV1GJ411x7h7"),
        ("twitch_channel", "https://www.twitch.tv/somechannel"),
        ("unknown", "https://vimeo.com/12345"),
    ];
    for (name, url) in urls {
        group.bench_function(name, |b| b.iter(|| classify(black_box(url))));
    }

    let long_url = format!("https://example.com/{}", "a".repeat(2000));
    group.bench_function("long", |b| b.iter(|| classify(black_box(&long_url))));

    group.finish();
}

fn benchmark_build_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("Option Building");
    let config = AppConfig::default();

    for mode in DownloadMode::ALL {
        let request = DownloadRequest::new("https://youtu.be/abc", mode);
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| build_options(black_box(&request), black_box(&config)))
        });
    }

    let request = DownloadRequest::new("https://youtu.be/abc", DownloadMode::Audio);
    let options = build_options(&request, &config);
    group.bench_function("to_args_audio", |b| b.iter(|| black_box(&options).to_args()));

    group.finish();
}

fn benchmark_progress_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Progress Line Parsing");

    group.bench_function("progress", |b| {
        b.iter(|| parse_output_line(black_box("[mediagrab]  42.5%|  1.20MiB/s|00:42")))
    });
    group.bench_function("other", |b| {
        b.iter(|| parse_output_line(black_box("[youtube] abc: Downloading webpage")))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_classify,
    benchmark_build_options,
    benchmark_progress_parsing
);
criterion_main!(benches);
