use crate::core::dataset::Dataset;
use crate::streams::CsvStream;

/// Deterministic, balanced sensor log. Machines that run hot for long stretches
/// go down; the two populations overlap a little.
pub fn downtime_csv(rows: usize) -> String {
    let mut out = String::from("Machine_ID,Temperature,Run_Time,Downtime_Flag\n");
    for i in 0..rows {
        let (temperature, run_time, flag) = if i % 2 == 0 {
            (62.0 + (i * 7 % 19) as f64 + 0.5, 85 + i * 11 % 45, 0)
        } else {
            (76.0 + (i * 5 % 21) as f64, 115 + i * 13 % 50, 1)
        };
        out.push_str(&format!("M-{i:03},{temperature},{run_time},{flag}\n"));
    }
    out
}

pub fn downtime_dataset(rows: usize) -> Dataset {
    let csv = downtime_csv(rows);
    CsvStream::from_bytes("fixture", csv.as_bytes())
        .and_then(|mut s| Dataset::from_stream(&mut s))
        .expect("fixture CSV is well formed")
}
