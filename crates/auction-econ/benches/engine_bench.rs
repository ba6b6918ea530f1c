use auction_core::{CourtDocsRaw, Policy, PropertySeed, RawOccupant, RawRight};
use auction_econ::{analyze, AnalysisInput};
use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_input(n_rights: usize) -> AnalysisInput {
    let registered_rights = (0..n_rights)
        .map(|i| RawRight {
            right_type: if i % 3 == 0 { "가압류" } else { "근저당권" }.to_string(),
            date: date(2018 + (i % 5) as i32, 1 + (i % 12) as u32, 1),
            creditor: format!("creditor-{i}"),
            amount: Decimal::new(10_000_000 * (i as i64 + 1), 0),
        })
        .collect();
    AnalysisInput {
        seed: PropertySeed {
            property_type: "apartment".into(),
            category: "residential".into(),
            size_m2: Decimal::new(84, 0),
            year_built: Some(2010),
            address: Some("서울특별시 마포구".into()),
            floor: Some(7),
            total_floors: Some(15),
            difficulty: Some("normal".into()),
            auction_step: Some(2),
        },
        court_docs: Some(CourtDocsRaw {
            case_number: Some("2024타경1000".into()),
            region: None,
            base_right_date: date(2018, 1, 1),
            registered_rights,
            occupants: vec![RawOccupant {
                name: "tenant".into(),
                move_in_date: date(2017, 6, 1),
                fixed_date: Some(date(2017, 6, 1)),
                deposit: Decimal::new(80_000_000, 0),
                monthly_rent: Decimal::ZERO,
                is_business: false,
            }],
        }),
        user_bid: Decimal::new(600_000_000, 0),
        as_of: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    }
}

fn bench_analyze(c: &mut Criterion) {
    let policy = Policy::default();
    let input = build_input(12);
    c.bench_function("analyze 12 rights", |b| {
        b.iter(|| {
            let _ = black_box(analyze(black_box(&input), &policy));
        })
    });
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
