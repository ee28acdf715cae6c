use anyhow::Result;
use datascout::{
    calculate_mean, evaluate, list_files,
    output::write_search_results,
    search, Condition, EncodingMode, MeanQuery, NoopObserver, OutputFormat, Record, ScanConfig,
    ScanError, ScanEvent, SearchOptions,
};
use serde_json::json;
use std::fs;
use std::io::Write;
use tempfile::{tempdir, TempDir};

fn create_test_files(files: &[(&str, &str)]) -> Result<TempDir> {
    let dir = tempdir()?;
    for (name, content) in files {
        let mut file = fs::File::create(dir.path().join(name))?;
        file.write_all(content.as_bytes())?;
    }
    Ok(dir)
}

fn row(cells: &[&str]) -> Record {
    Record::Row(cells.iter().map(|c| c.to_string()).collect())
}

#[test]
fn test_list_files_counts_regular_files() -> Result<()> {
    let dir = create_test_files(&[("a.txt", "x"), ("b.csv", "x"), ("c.json", "[]")])?;
    fs::create_dir(dir.path().join("sub"))?;

    let files = list_files(&ScanConfig::new(dir.path()))?;
    assert_eq!(files.len(), 3);

    let missing = list_files(&ScanConfig::new(dir.path().join("absent")));
    assert!(matches!(missing, Err(ScanError::DirectoryNotFound(_))));
    Ok(())
}

#[test]
fn test_search_csv_header_and_matching_row() -> Result<()> {
    let dir = create_test_files(&[("readings.csv", "id,device,value\n1,A,10\n2,B,20\n")])?;
    let config = ScanConfig::new(dir.path());

    let result = search(&config, "B", &SearchOptions::default(), &mut NoopObserver)?;
    let records: Vec<_> = result.records().cloned().collect();
    assert_eq!(
        records,
        vec![row(&["id", "device", "value"]), row(&["2", "B", "20"])]
    );
    assert!(!records.contains(&row(&["1", "A", "10"])));
    Ok(())
}

#[test]
fn test_search_json_items() -> Result<()> {
    let dir = create_test_files(&[("items.json", r#"[{"x":1},{"x":2}]"#)])?;
    let config = ScanConfig::new(dir.path());

    let result = search(&config, "2", &SearchOptions::default(), &mut NoopObserver)?;
    let records: Vec<_> = result.records().cloned().collect();
    assert_eq!(records, vec![Record::Json(json!({"x": 2}))]);
    Ok(())
}

#[test]
fn test_search_reports_matches_in_order() -> Result<()> {
    let dir = create_test_files(&[
        ("a.txt", "first hit\nmiss\nsecond hit\n"),
        ("b.txt", "third hit\n"),
    ])?;
    let config = ScanConfig::new(dir.path());

    let mut seen = Vec::new();
    let mut observer = |event: &ScanEvent| {
        if let ScanEvent::Match { record, .. } = event {
            seen.push(record.to_string());
        }
    };
    search(&config, "hit", &SearchOptions::default(), &mut observer)?;

    assert_eq!(seen, vec!["first hit", "second hit", "third hit"]);
    Ok(())
}

#[test]
fn test_search_results_round_trip_to_file() -> Result<()> {
    let dir = create_test_files(&[("readings.csv", "id,device,value\n1,A,10\n2,B,20\n")])?;
    let out = tempdir()?;
    let config = ScanConfig::new(dir.path());

    let result = search(&config, "A", &SearchOptions::default(), &mut NoopObserver)?;
    let path = write_search_results(result.records(), OutputFormat::Json, out.path())?;

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    assert_eq!(written, json!([["id", "device", "value"], ["1", "A", "10"]]));
    Ok(())
}

#[test]
fn test_mean_for_device() -> Result<()> {
    let dir = create_test_files(&[(
        "readings.csv",
        "timestamp,device,value\nt1,A,10\nt2,A,20\nt3,A,30\nt4,B,5\n",
    )])?;
    let config = ScanConfig::new(dir.path());

    let report = calculate_mean(&config, &MeanQuery::new("A", "value"), &mut NoopObserver)?;
    assert_eq!(report.overall_mean, Some(20.0));

    let query = MeanQuery::new("A", "value").with_condition(Condition::parse(">15")?);
    let report = calculate_mean(&config, &query, &mut NoopObserver)?;
    assert_eq!(report.overall_mean, Some(25.0));

    let report = calculate_mean(&config, &MeanQuery::new("nobody", "value"), &mut NoopObserver)?;
    assert_eq!(report.overall_mean, None);
    assert_eq!(
        report.messages.last().map(String::as_str),
        Some("No valid values found for mean calculation.")
    );
    Ok(())
}

#[test]
fn test_mean_across_formats() -> Result<()> {
    let dir = create_test_files(&[
        ("a.csv", "timestamp,device,temp\nt1,A,1\n"),
        (
            "b.json",
            r#"[{"device": "A", "temp": 2, "timestamp": "t2"}, {"device": "B", "temp": 90}]"#,
        ),
        ("c.txt", "A temp 3 t3\nA pressure 70 t3\n"),
    ])?;
    let config = ScanConfig::new(dir.path());
    let query = MeanQuery::new("A", "temp").with_timestamp("t2");

    let mut found = 0;
    let mut observer = |event: &ScanEvent| {
        if matches!(event, ScanEvent::RecordFound { .. }) {
            found += 1;
        }
    };
    let report = calculate_mean(&config, &query, &mut observer)?;

    assert_eq!(report.overall_mean, Some(2.0));
    assert_eq!(report.file_means.len(), 3);
    assert_eq!(found, 1);
    Ok(())
}

#[test]
fn test_lossy_encoding_keeps_file() -> Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("readings.txt"), b"A temp 4 \xff\n")?;

    let mut config = ScanConfig::new(dir.path());
    let strict = calculate_mean(&config, &MeanQuery::new("A", "temp"), &mut NoopObserver)?;
    assert_eq!(strict.overall_mean, None);

    config.encoding_mode = EncodingMode::Lossy;
    let lossy = calculate_mean(&config, &MeanQuery::new("A", "temp"), &mut NoopObserver)?;
    assert_eq!(lossy.overall_mean, Some(4.0));
    Ok(())
}

#[test]
fn test_condition_evaluator() {
    assert!(evaluate(10.0, Some("=10")));
    assert!(evaluate(10.0, Some(">5")));
    assert!(!evaluate(10.0, Some("<5")));
    assert!(!evaluate(10.0, Some("?5")));
    assert!(evaluate(10.0, None));
}
