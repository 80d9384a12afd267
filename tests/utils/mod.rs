// Integration test utilities
//
// Writes a realistic benchmark results directory: four problem sizes, three
// trials each, capacity W = 1000.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const SIZES: [u64; 4] = [100, 200, 300, 400];

/// Three trials around `average` (±5%)
fn trials(average: f64) -> [f64; 3] {
    [average * 0.95, average, average * 1.05]
}

fn group(prefix: &str, with_average: bool) -> String {
    let mut header: Vec<String> = (1..=3).map(|k| format!("{} {}", prefix, k)).collect();
    if with_average {
        header.push("average".to_string());
    }
    header.join(",")
}

fn cells(values: [f64; 3], with_average: bool) -> String {
    let mut row: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    if with_average {
        row.push((values.iter().sum::<f64>() / 3.0).to_string());
    }
    row.join(",")
}

/// Optimal values of the three trials at size `n`
fn optimum(n: u64) -> [f64; 3] {
    let base = 1000.0 + n as f64;
    [base, base + 50.0, base + 100.0]
}

fn exact_csv(scale: f64, with_cache: bool) -> String {
    let mut header = vec!["n".to_string(), group("table", true), group("backtrack", true)];
    if with_cache {
        header.push(group("cache miss", true));
        header.push(group("cache hit", true));
    }
    header.push(group("value", true));

    let mut out = header.join(",");
    out.push('\n');
    for n in SIZES {
        let x = n as f64;
        let mut row = vec![
            n.to_string(),
            cells(trials(scale * 1e-8 * x * 1000.0), true),
            cells(trials(1e-6 * x), true),
        ];
        if with_cache {
            row.push(cells(trials(x * 600.0), true));
            row.push(cells(trials(x * 400.0), true));
        }
        row.push(cells(optimum(n), true));
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn greedy_csv(scale: f64, fraction: [f64; 3]) -> String {
    let mut out = format!("n,{},{}\n", group("trial", true), group("value", false));
    for n in SIZES {
        let x = n as f64;
        let opt = optimum(n);
        let values = [opt[0] * fraction[0], opt[1] * fraction[1], opt[2] * fraction[2]];
        out.push_str(&format!(
            "{},{},{}\n",
            n,
            cells(trials(scale * 1e-7 * x * x.ln()), true),
            cells(values, false)
        ));
    }
    out
}

/// Write all five algorithm CSVs into `dir`
pub fn write_results(dir: &Path) {
    fs::write(dir.join("bottom_up.csv"), exact_csv(1.0, false)).unwrap();
    fs::write(dir.join("top_down_memoized.csv"), exact_csv(1.6, true)).unwrap();
    fs::write(
        dir.join("greatest_worth_first.csv"),
        greedy_csv(1.0, [1.0, 0.97, 0.99]),
    )
    .unwrap();
    fs::write(
        dir.join("largest_value_first.csv"),
        greedy_csv(1.3, [0.85, 0.8, 0.9]),
    )
    .unwrap();
    fs::write(
        dir.join("smallest_weight_first.csv"),
        greedy_csv(0.7, [0.6, 0.7, 0.65]),
    )
    .unwrap();
}
