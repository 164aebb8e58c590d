// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and `code`.\n\n- Bullet point\n  - Nested item\n- Another item\n\n> A quote\n> over two lines\n\n$$\n\\frac{a}{b} % comment\n$$\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

/// `content` with one character inserted at its middle line.
#[allow(dead_code)]
pub fn edit_in_middle(content: &str) -> String {
    let middle = content.len() / 2;
    let at = content[middle..]
        .find('\n')
        .map_or(content.len(), |i| middle + i);
    let mut edited = content.to_string();
    edited.insert(at, 'x');
    edited
}
