#![no_main]

use fileprobe::{FeatureExtractor, ProbeConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let buffered = FeatureExtractor::new().analyze_bytes(data);
    assert_eq!(buffered.len(), fileprobe::features::PROBES.len());
    assert!((0.0..=8.0).contains(&buffered.entropy()));

    let chunk = (data.first().copied().unwrap_or(1) as usize).max(1);
    let streamed = FeatureExtractor::with_config(ProbeConfig::default().with_chunk_size(chunk))
        .analyze_reader(data)
        .unwrap();
    assert_eq!(buffered, streamed);
});
