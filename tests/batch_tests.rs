use std::fs;

use fileprobe::{BatchAnalyzer, ContentClass, FeatureExtractor, FileFormat, ProbeConfig};

#[test]
fn test_inspect_reports_digest_and_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("abc.txt");
    fs::write(&path, b"abc").unwrap();

    let report = BatchAnalyzer::default().inspect(&path).unwrap();
    assert_eq!(
        report.sha256,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(report.path, path);
    assert_eq!(report.verdict.format, None);
    assert_eq!(report.features.content_len(), 3);
}

#[test]
fn test_streamed_inspect_matches_buffered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.wav");
    let mut data = b"RIFF\x24\x08\x00\x00WAVEfmt ".to_vec();
    data.extend((0..50_000u32).map(|i| (i % 7) as u8));
    fs::write(&path, &data).unwrap();

    let buffered = BatchAnalyzer::default().inspect(&path).unwrap();
    let streamed = BatchAnalyzer::new(FeatureExtractor::with_config(
        ProbeConfig::default().always_stream().with_chunk_size(1000),
    ))
    .inspect(&path)
    .unwrap();

    assert_eq!(streamed.sha256, buffered.sha256);
    assert_eq!(streamed.features, buffered.features);
    assert_eq!(streamed.verdict.format, Some(FileFormat::Wav));
}

#[test]
fn test_inspect_all_keeps_order_and_isolates_errors() {
    let dir = tempfile::tempdir().unwrap();
    let text = dir.path().join("readme.md");
    fs::write(&text, b"# Title\n\nSome words here.\n").unwrap();
    let empty = dir.path().join("empty.bin");
    fs::write(&empty, b"").unwrap();
    let missing = dir.path().join("missing.bin");

    let paths = vec![text.clone(), missing.clone(), empty.clone()];
    let entries = BatchAnalyzer::default().inspect_all(&paths);

    let order: Vec<_> = entries.iter().map(|e| e.path.clone()).collect();
    assert_eq!(order, paths);
    assert_eq!(
        entries[0].result.as_ref().unwrap().verdict.class,
        ContentClass::Text
    );
    assert!(entries[1].result.is_err());
    let empty_report = entries[2].result.as_ref().unwrap();
    assert_eq!(empty_report.verdict.class, ContentClass::Empty);
    assert!(empty_report.features.is_even_weight());
}

#[test]
fn test_report_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pic.png");
    fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13]).unwrap();

    let report = BatchAnalyzer::default().inspect(&path).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["features"]["is_png"], true);
    assert_eq!(json["verdict"]["format"], "png");
    assert_eq!(json["features"]["is_even_weight"], true);
}
