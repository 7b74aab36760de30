//! Concurrency and thread safety tests for dupguard

use std::sync::Arc;
use std::thread;

use dupguard::{
    AnalyzerConfig, DupGuard, DupGuardConfig, FingerprintEngine, LoopCheck, PerceptualConfig,
    StreamConfig, StreamingFilter,
};

const BLOCK: &str = "fn area(w: f64, h: f64) -> f64 {\n    w * h\n}";

#[test]
fn concurrent_analysis_same_guard() {
    let guard = Arc::new(DupGuard::from_config(&DupGuardConfig::default()).expect("guard"));
    let text = format!("{BLOCK}\n\n{BLOCK}\n");
    let expected = guard.analyze(&text, "rust");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let guard = Arc::clone(&guard);
            let text = text.clone();
            thread::spawn(move || guard.analyze(&text, "rust"))
        })
        .collect();

    for handle in handles {
        let report = handle.join().expect("thread should not panic");
        assert_eq!(report, expected);
    }
}

#[test]
fn concurrent_sessions_share_engine() {
    let engine = Arc::new(FingerprintEngine::default());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut filter = StreamingFilter::with_engine(engine, StreamConfig::default())
                    .expect("valid config");
                let line = format!("let worker_{i} = spawn(task_{i});");
                let mut completion = String::new();
                let mut stopped_at = None;
                for n in 0..3 {
                    completion.push_str(&line);
                    completion.push('\n');
                    if let Some(reason) = filter.check_line(&completion, &line, "rust").reason() {
                        stopped_at = Some((n, reason.check));
                    }
                }
                stopped_at
            })
        })
        .collect();

    for handle in handles {
        let stopped = handle.join().expect("thread should not panic");
        assert_eq!(stopped, Some((2, LoopCheck::ExactDuplicate)));
    }
    assert_eq!(engine.cache_stats().entries, 8);
}

#[test]
fn cache_stays_bounded_under_contention() {
    let capacity = 16;
    let engine = Arc::new(
        FingerprintEngine::new(PerceptualConfig::default().with_cache_capacity(capacity))
            .expect("engine"),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..100 {
                    let text = format!("let v_{t}_{i} = {i};");
                    engine.fingerprint(&text, "rust");
                    assert!(engine.cache_stats().entries <= capacity);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread should not panic");
    }

    let stats = engine.cache_stats();
    assert_eq!(stats.entries, capacity);
    assert_eq!(stats.misses, 800);
    assert_eq!(stats.evictions, 800 - capacity as u64);
}

#[test]
fn analyzers_with_shared_engine_in_parallel() {
    let engine = Arc::new(
        FingerprintEngine::new(PerceptualConfig::default().with_parallel(true)).expect("engine"),
    );
    let texts: Vec<String> = (0..6)
        .map(|i| format!("fn f_{i}() -> u32 {{\n    {i} * 2\n}}\n\nfn f_{i}() -> u32 {{\n    {i} * 2\n}}"))
        .collect();

    let handles: Vec<_> = texts
        .into_iter()
        .map(|text| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let analyzer = dupguard::DuplicateAnalyzer::with_engine(
                    engine,
                    AnalyzerConfig::default(),
                )
                .expect("analyzer");
                analyzer.detect_duplicates(&text, "rust").duplicates_removed
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread should not panic"), 1);
    }
}
