// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use quire_kernel::{ContentType, DEFAULT_CONTENT, TransitionRule};

#[allow(dead_code)]
pub fn generate_c_source(functions: usize) -> String {
    let mut content = String::new();
    for i in 0..functions {
        content.push_str(&format!(
            "/* function {i}\n * does a thing\n */\nint f{i}(char *s) {{\n    // check\n    if (s[0] == '\\'') return {i};\n    puts(\"value: \\\"{i}\\\"\");\n    return 0;\n}}\n\n"
        ));
    }
    content
}

#[allow(dead_code)]
pub fn c_like_rules() -> Vec<TransitionRule> {
    let block = ContentType::new_value();
    let line = ContentType::new_value();
    let string = ContentType::new_value();
    let character = ContentType::new_value();
    vec![
        TransitionRule::literal(DEFAULT_CONTENT, block, "/*", None, true),
        TransitionRule::literal(block, DEFAULT_CONTENT, "*/", None, true),
        TransitionRule::literal(DEFAULT_CONTENT, line, "//", None, true),
        TransitionRule::literal(line, DEFAULT_CONTENT, "", Some('\\'), true),
        TransitionRule::literal(DEFAULT_CONTENT, string, "\"", None, true),
        TransitionRule::literal(string, DEFAULT_CONTENT, "\"", Some('\\'), true),
        TransitionRule::literal(string, DEFAULT_CONTENT, "", Some('\\'), true),
        TransitionRule::literal(DEFAULT_CONTENT, character, "'", None, true),
        TransitionRule::literal(character, DEFAULT_CONTENT, "'", Some('\\'), true),
    ]
}

#[allow(dead_code)]
pub fn generate_lines(lines: usize) -> String {
    (0..lines).map(|i| format!("line {i}\n")).collect()
}
