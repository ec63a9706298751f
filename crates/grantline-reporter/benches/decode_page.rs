use grantline_reporter::schema::decode_response;

fn main() {
    divan::main();
}

/// A full 500-record page shaped like a RePORTER response
fn sample_page() -> Vec<u8> {
    let results: Vec<_> = (0..500)
        .map(|i| {
            serde_json::json!({
                "appl_id": 10_000_000 + i,
                "fiscal_year": 2025,
                "project_num": format!("5R01GM{i:06}-03"),
                "award_amount": 350_000 + i,
                "is_active": true,
                "contact_pi_name": "SMITH, ALEX",
                "budget_start": "2025-07-01T00:00:00Z",
                "budget_end": "2026-06-30T00:00:00Z",
                "project_title": "Mechanisms of cellular stress response",
                "project_detail_url": format!("https://reporter.nih.gov/project-details/{}", 10_000_000 + i),
                "project_start_date": "2023-07-01T00:00:00Z",
                "project_end_date": "2028-06-30T00:00:00Z",
                "date_added": "2025-06-12T09:41:00Z",
                "organization": {
                    "org_name": "EXAMPLE MEDICAL CENTER",
                    "org_city": "BOSTON",
                    "org_state": "MA"
                },
                "terms": "<Cell Stress><Protein Folding><Mitochondria>",
                "abstract_text": "Project summary ".repeat(80),
                "pref_terms": "Cell Stress;Protein Folding;Mitochondria"
            })
        })
        .collect();
    serde_json::to_vec(&serde_json::json!({
        "meta": {
            "search_id": "bench",
            "total": 500,
            "offset": 0,
            "limit": 500,
            "sort_field": "project_start_date"
        },
        "results": results
    }))
    .unwrap()
}

#[divan::bench]
fn decode_full_page(bencher: divan::Bencher) {
    let body = sample_page();
    bencher.bench(|| decode_response(divan::black_box(&body)).unwrap());
}

#[divan::bench]
fn serialize_full_page(bencher: divan::Bencher) {
    let records = decode_response(&sample_page()).unwrap().records;
    bencher.bench(|| serde_json::to_vec_pretty(divan::black_box(&records)).unwrap());
}
