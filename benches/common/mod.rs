//! Shared generators for dupguard benchmarks

#![allow(dead_code)]

/// A small function whose body depends on `seed`, so blocks built from
/// different seeds are distinct.
pub fn function_block(seed: usize) -> String {
    format!(
        "fn handler_{seed}(req: &Request) -> Response {{\n    let id = req.param(\"id_{seed}\");\n    let row = db.fetch(id, {seed});\n    Response::json(row)\n}}"
    )
}

/// `blocks` functions separated by blank lines; every `dup_every`-th one is a
/// copy of the previous block.
pub fn generated_file(blocks: usize, dup_every: usize) -> String {
    let mut parts = Vec::with_capacity(blocks);
    for i in 0..blocks {
        let seed = if dup_every > 0 && i > 0 && i % dup_every == 0 {
            i - 1
        } else {
            i
        };
        parts.push(function_block(seed));
    }
    parts.join("\n\n")
}

/// Lines of distinct statements, as a model would produce without looping.
pub fn distinct_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("    let value_{i} = compute(input[{i}], {i});"))
        .collect()
}

/// A two-line cycle repeated `pairs` times.
pub fn looping_lines(pairs: usize) -> Vec<String> {
    (0..pairs)
        .flat_map(|_| {
            [
                "    render(root, state);".to_string(),
                "    state.tick += 1;".to_string(),
            ]
        })
        .collect()
}
