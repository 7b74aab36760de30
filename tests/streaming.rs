use dupguard::{DupGuard, DupGuardConfig, LoopCheck, StreamConfig, StreamVerdict, StreamingFilter};

/// Appends each line to the completion and checks it, stopping at the first
/// stop verdict. Returns the index of the stopping line and its check.
fn run(filter: &mut StreamingFilter, lines: &[&str], language: &str) -> Option<(usize, LoopCheck)> {
    let mut completion = String::new();
    for (idx, line) in lines.iter().enumerate() {
        completion.push_str(line);
        completion.push('\n');
        if let StreamVerdict::Stop(reason) = filter.check_line(&completion, line, language) {
            return Some((idx, reason.check));
        }
    }
    None
}

fn session(config: StreamConfig) -> StreamingFilter {
    StreamingFilter::new(config).expect("valid stream config")
}

#[test]
fn third_copy_of_a_line_stops() {
    let line = "result.push(item.clone());";
    let mut filter = session(StreamConfig::default());
    assert_eq!(
        run(&mut filter, &[line, line, line], "rust"),
        Some((2, LoopCheck::ExactDuplicate))
    );
}

#[test]
fn comment_variants_count_as_the_same_line() {
    let mut filter = session(StreamConfig::default());
    let lines = [
        "total += price;",
        "total += price; // add",
        "total  +=  price;",
    ];
    assert_eq!(
        run(&mut filter, &lines, "javascript"),
        Some((2, LoopCheck::ExactDuplicate))
    );
}

#[test]
fn distinct_code_runs_to_completion() {
    let lines = [
        "use std::collections::HashMap;",
        "",
        "pub fn word_counts(text: &str) -> HashMap<&str, usize> {",
        "    let mut counts = HashMap::new();",
        "    for word in text.split_whitespace() {",
        "        *counts.entry(word).or_insert(0) += 1;",
        "    }",
        "    counts",
        "}",
    ];
    let mut filter = session(StreamConfig::default());
    assert_eq!(run(&mut filter, &lines, "rust"), None);
}

#[test]
fn twenty_repeated_chars_stop() {
    let mut filter = session(StreamConfig::default());
    let line = format!("let banner = \"{}\";", "*".repeat(20));
    assert_eq!(
        run(&mut filter, &[&line], "rust"),
        Some((0, LoopCheck::CharacterRepetition))
    );
}

#[test]
fn disabling_a_check_skips_only_that_check() {
    let line = format!("let banner = \"{}\";", "*".repeat(20));
    let config = StreamConfig::default().disable(LoopCheck::CharacterRepetition);
    let mut filter = session(config);
    assert_eq!(run(&mut filter, &[&line], "rust"), None);

    // The remaining checks still run.
    let mut completion = format!("{line}\n");
    filter.check_line(&completion, &line, "rust");
    completion.push_str(&line);
    let verdict = filter.check_line(&completion, &line, "rust");
    assert_eq!(verdict.reason().map(|r| r.check), Some(LoopCheck::ExactDuplicate));
}

#[test]
fn template_tokens_stop() {
    let mut filter = session(StreamConfig::default());
    let lines = ["def f(x):", "<|fim_prefix|>return x<|fim_suffix|>"];
    assert_eq!(
        run(&mut filter, &lines, "python"),
        Some((1, LoopCheck::TemplateMarkers))
    );
}

#[test]
fn repeated_path_header_stops() {
    let mut filter = session(StreamConfig::default());
    let lines = [
        "# file: app/models.py",
        "class User:",
        "    pass",
        "# file: app/models.py",
    ];
    assert_eq!(
        run(&mut filter, &lines, "python"),
        Some((3, LoopCheck::MetadataLoop))
    );
}

#[test]
fn repeated_tail_block_stops() {
    let mut filter = session(StreamConfig::default());
    let chunk = "x = [1, 2, 3]; y = {a: 1}; z = f(x, y) + g(y, x);\n";
    assert_eq!(chunk.chars().count(), 50);
    let completion = format!("// start\n{chunk}{chunk}");
    let verdict = filter.check_line(&completion, "z", "javascript");
    assert_eq!(verdict.reason().map(|r| r.check), Some(LoopCheck::BlockRepetition));
}

#[test]
fn guard_sessions_follow_config() {
    let mut cfg = DupGuardConfig::default();
    cfg.stream = cfg.stream.disable(LoopCheck::ExactDuplicate).disable(LoopCheck::NearDuplicate);
    let guard = DupGuard::from_config(&cfg).expect("guard");

    let a = "let left = fetch(a);";
    let b = "let right = fetch(b);";
    let lines = [a, b, a, b, a, b, a, b];
    let mut filter = guard.new_session();
    assert_eq!(
        run(&mut filter, &lines, "javascript"),
        Some((7, LoopCheck::DistributedPattern))
    );

    filter.reset();
    assert_eq!(filter.lines_seen(), 0);
    assert_eq!(filter.window_len(), 0);
}

#[test]
fn deep_indentation_is_not_a_character_run() {
    let line = format!("{}return total;", " ".repeat(24));

    let mut filter = session(StreamConfig::default());
    assert_eq!(run(&mut filter, &[&line], "rust"), None);

    let mut strict = session(StreamConfig::default().with_ignore_whitespace_runs(false));
    assert_eq!(
        run(&mut strict, &[&line], "rust"),
        Some((0, LoopCheck::CharacterRepetition))
    );
}
