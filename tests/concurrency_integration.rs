//! Concurrent use of one engine from blocking tasks

#[allow(dead_code)]
mod common;

use common::*;
use pulsewatch::config::AnalysisConfig;
use pulsewatch::AnalysisEngine;
use std::collections::BTreeMap;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_metric_analysis_matches_sequential() {
    let engine = Arc::new(AnalysisEngine::new(AnalysisConfig::default()).unwrap());

    let inputs: Vec<BTreeMap<String, Vec<pulsewatch::Sample>>> = (0..8u64)
        .map(|seed| {
            let mut gen = TestDataGenerator::new(seed);
            let mut values = gen.noisy_values(80, 50.0, 5.0);
            values[60] = 500.0;
            let mut streams = BTreeMap::new();
            streams.insert("cpu".to_string(), samples_from("cpu", &values));
            streams
        })
        .collect();

    let mut handles = Vec::new();
    for streams in inputs.clone() {
        let engine = Arc::clone(&engine);
        handles.push(tokio::task::spawn_blocking(move || {
            engine.analyze_metrics(&streams).map(|r| r.anomalies)
        }));
    }

    for (streams, handle) in inputs.iter().zip(handles) {
        let parallel = handle.await.unwrap().unwrap();
        let sequential = engine.analyze_metrics(streams).unwrap().anomalies;
        assert_eq!(parallel, sequential);
        assert!(parallel.iter().any(|a| a.index == 60));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_pattern_analysis() {
    let engine = Arc::new(AnalysisEngine::new(AnalysisConfig::default()).unwrap());

    let handles: Vec<_> = (0..6u64)
        .map(|seed| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || {
                let events = TestDataGenerator::new(seed).error_events(200);
                let report = engine.analyze_error_patterns(&events);
                (events.len(), report)
            })
        })
        .collect();

    for handle in handles {
        let (count, report) = handle.await.unwrap();
        let total: usize = report.patterns.iter().map(|p| p.frequency).sum();
        assert_eq!(total, count);
    }
}
