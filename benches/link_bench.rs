use criterion::{black_box, criterion_group, criterion_main, Criterion};

use host_finder::finder::link;
use host_finder::finder::{HostRecord, MoreHint, SearchPage};

// 运行: cargo bench

const CANVAS_LINK: &str = concat!(
    r#"<https://canvas.instructure.com/api/v1/accounts/search?name=state&page=1&per_page=5>; rel="current","#,
    r#"<https://canvas.instructure.com/api/v1/accounts/search?name=state&page=2&per_page=5>; rel="next","#,
    r#"<https://canvas.instructure.com/api/v1/accounts/search?name=state&page=1&per_page=5>; rel="first","#,
    r#"<https://canvas.instructure.com/api/v1/accounts/search?name=state&page=14&per_page=5>; rel="last""#,
);

fn bench_link(c: &mut Criterion) {
    c.bench_function("last_page_canvas", |b| {
        b.iter(|| link::last_page(black_box(CANVAS_LINK)))
    });

    c.bench_function("page_count_missing", |b| {
        b.iter(|| link::page_count(black_box(None)))
    });
}

fn bench_page(c: &mut Criterion) {
    let records: Vec<HostRecord> = (0..5)
        .map(|i| HostRecord {
            id: i,
            name: format!("State University {}", i),
            domain: format!("state{}.edu", i),
        })
        .collect();

    c.bench_function("search_page_from_records", |b| {
        b.iter(|| {
            let page = SearchPage::from_records(black_box(records.clone()), 14);
            MoreHint::from_pages(page.pages)
        })
    });
}

criterion_group!(benches, bench_link, bench_page);
criterion_main!(benches);
