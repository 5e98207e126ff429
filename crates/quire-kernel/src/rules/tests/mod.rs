//! Partitioning tests driven through a real document.
//!
//! Every edit is followed by a full consistency check and a comparison with a
//! partitioner installed from scratch on the edited text.


use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::document::{Document, DocumentPartitioningListener};
use crate::position::{Position, Region};
use crate::rules::{ContentType, DEFAULT_CONTENT, LexicalPartitioner, TransitionRule};

struct CLike {
    block: ContentType,
    line: ContentType,
    string: ContentType,
    character: ContentType,
    rules: Vec<TransitionRule>,
}

fn c_like() -> CLike {
    let block = ContentType::new_value();
    let line = ContentType::new_value();
    let string = ContentType::new_value();
    let character = ContentType::new_value();
    let rules = vec![
        TransitionRule::literal(DEFAULT_CONTENT, block, "/*", None, true),
        TransitionRule::literal(block, DEFAULT_CONTENT, "*/", None, true),
        TransitionRule::literal(DEFAULT_CONTENT, line, "//", None, true),
        TransitionRule::literal(line, DEFAULT_CONTENT, "", Some('\\'), true),
        TransitionRule::literal(DEFAULT_CONTENT, string, "\"", None, true),
        TransitionRule::literal(string, DEFAULT_CONTENT, "\"", Some('\\'), true),
        TransitionRule::literal(string, DEFAULT_CONTENT, "", Some('\\'), true),
        TransitionRule::literal(DEFAULT_CONTENT, character, "'", None, true),
        TransitionRule::literal(character, DEFAULT_CONTENT, "'", Some('\\'), true),
    ];
    CLike {
        block,
        line,
        string,
        character,
        rules,
    }
}

fn install(text: &str, rules: &[TransitionRule]) -> Document {
    let mut document = Document::from_text(text);
    let partitioner = LexicalPartitioner::with_rules(rules.to_vec()).expect("valid rules");
    document.set_partitioner(Box::new(partitioner));
    document
}

fn table(document: &Document) -> Vec<(ContentType, Position, Position)> {
    document
        .partitioner::<LexicalPartitioner>()
        .expect("lexical partitioner installed")
        .table()
}

/// Checks `document` and compares it with a from-scratch partitioning.
fn assert_consistent(document: &Document, rules: &[TransitionRule]) {
    invariants::check(document);
    let fresh = install(&document.text(), rules);
    assert_eq!(table(document), table(&fresh), "text: {:?}", document.text());
}

fn kinds(document: &Document) -> Vec<(ContentType, String)> {
    let text = document.text();
    let buffer = document.buffer();
    document
        .partitions()
        .into_iter()
        .map(|p| {
            let start = buffer.offset_of(p.region.beginning()).expect("valid");
            let end = buffer.offset_of(p.region.end()).expect("valid");
            (p.content_type, text[start..end].to_string())
        })
        .collect()
}

#[derive(Default)]
struct ChangedRegions(RefCell<Vec<Region>>);

impl DocumentPartitioningListener for ChangedRegions {
    fn document_partitioning_changed(&self, _document: &Document, changed_region: Region) {
        self.0.borrow_mut().push(changed_region);
    }
}

#[test]
fn earlier_rule_wins_inside_a_string() {
    let comment = ContentType::new_value();
    let string = ContentType::new_value();
    let rules = vec![
        TransitionRule::literal(DEFAULT_CONTENT, comment, "/*", None, true),
        TransitionRule::literal(DEFAULT_CONTENT, string, "\"", None, true),
        TransitionRule::literal(comment, DEFAULT_CONTENT, "*/", None, true),
        TransitionRule::literal(string, DEFAULT_CONTENT, "\"", Some('\\'), true),
    ];
    let document = install("x = \"a/*b\" + 1", &rules);

    assert_eq!(
        kinds(&document),
        vec![
            (DEFAULT_CONTENT, "x = ".to_string()),
            (string, "\"a/*b\"".to_string()),
            (DEFAULT_CONTENT, " + 1".to_string()),
        ]
    );
}

#[test]
fn newline_inside_an_open_comment_extends_it() {
    let c = c_like();
    let mut document = install("int a; /* open\nstill open", &c.rules);
    document.insert(Position::new(0, 12), "\n").unwrap();

    assert_eq!(
        kinds(&document),
        vec![
            (DEFAULT_CONTENT, "int a; ".to_string()),
            (c.block, "/* op\nen\nstill open".to_string()),
        ]
    );
    assert_consistent(&document, &c.rules);
}

#[rstest]
#[case::no_rules(vec![])]
#[case::never_matching(vec![TransitionRule::literal(
    DEFAULT_CONTENT,
    ContentType::new_value(),
    "@@@",
    None,
    true,
)])]
fn without_matches_everything_is_default(#[case] rules: Vec<TransitionRule>) {
    let mut document = install("a\nb /* c */\n", &rules);
    document.insert(Position::new(1, 1), "\"").unwrap();

    let partitions = document.partitions();
    assert_eq!(partitions.len(), 1);
    assert_eq!(partitions[0].content_type, DEFAULT_CONTENT);
    assert_eq!(partitions[0].region, document.region());
    invariants::check(&document);
}

#[test]
fn every_kind_is_recognized() {
    let c = c_like();
    let document = install("a 'x' \"s\\\"\" // l\n/* b */ z", &c.rules);
    let found: Vec<ContentType> = kinds(&document).into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        found,
        vec![
            DEFAULT_CONTENT,
            c.character,
            DEFAULT_CONTENT,
            c.string,
            DEFAULT_CONTENT,
            c.line,
            DEFAULT_CONTENT,
            c.block,
            DEFAULT_CONTENT,
        ]
    );
}

#[test]
fn escaped_line_end_continues_a_line_comment() {
    let c = c_like();
    let document = install("// one \\\ntwo\nthree", &c.rules);
    assert_eq!(
        kinds(&document),
        vec![
            (c.line, "// one \\\ntwo".to_string()),
            (DEFAULT_CONTENT, "\nthree".to_string()),
        ]
    );
}

#[test]
fn typing_inside_a_line_reports_only_that_line() {
    let c = c_like();
    let text = (0..100).map(|i| format!("line {i} /* c */\n")).collect::<String>();
    let mut document = install(&text, &c.rules);
    let changed = Rc::new(ChangedRegions::default());
    document.add_partitioning_listener(changed.clone()).unwrap();

    document.insert(Position::new(50, 4), "x").unwrap();

    assert_eq!(
        *changed.0.borrow(),
        vec![Region::new(Position::new(50, 0), Position::new(51, 0))]
    );
    assert_consistent(&document, &c.rules);
}

#[test]
fn opening_a_comment_reparses_to_the_end() {
    let c = c_like();
    let mut document = install("a\nb\nc\nd\n", &c.rules);
    let changed = Rc::new(ChangedRegions::default());
    document.add_partitioning_listener(changed.clone()).unwrap();

    document.insert(Position::new(1, 0), "/*").unwrap();
    assert_eq!(
        *changed.0.borrow(),
        vec![Region::new(Position::new(1, 0), document.region().end())]
    );

    // closing it again changes everything up to the end as well
    document.insert(Position::new(2, 1), "*/").unwrap();
    assert_eq!(
        changed.0.borrow()[1],
        Region::new(Position::new(2, 0), document.region().end())
    );

    document.insert(Position::new(3, 0), "x").unwrap();
    assert_eq!(
        changed.0.borrow()[2],
        Region::new(Position::new(3, 0), Position::new(4, 0))
    );
    assert_consistent(&document, &c.rules);
}

#[rstest]
#[case::join_lines("a /* x\ny */ b\nc", Region::new(Position::new(0, 6), Position::new(1, 0)), "")]
#[case::close_comment_early("/* a\nb\nc */ d", Region::single_line(1, 0..1), "*/")]
#[case::remove_opener("x /* a\nb */ \"s\"\n", Region::single_line(0, 2..4), "")]
#[case::split_token("a /* b */", Region::single_line(0, 3..3), " ")]
#[case::unterminated_string("s = \"abc\";\nt = 1;", Region::single_line(0, 8..9), "")]
#[case::replace_everything("/* a */\n\"b\"", Region::new(Position::new(0, 0), Position::new(1, 3)), "// c\nd")]
#[case::insert_at_end("a\n/* b", Region::single_line(1, 4..4), "\n*/ c\n")]
#[case::multibyte("é /* ü */ \"ß\"", Region::single_line(0, 0..2), "ñ\n")]
fn single_edit_matches_full_reparse(
    #[case] text: &str,
    #[case] region: Region,
    #[case] replacement: &str,
) {
    let c = c_like();
    let mut document = install(text, &c.rules);
    assert_consistent(&document, &c.rules);

    document.replace(region, replacement).unwrap();
    assert_consistent(&document, &c.rules);
}

/// Deterministic pseudo-random numbers for edit sequences.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, n: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % n as u64) as usize
    }
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(2024)]
fn edit_sequences_match_full_reparse(#[case] seed: u64) {
    const SNIPPETS: &[&str] = &[
        "/*", "*/", "\"", "'", "\\", "//", "\n", "x", " ab ", "\n/* c\n", "", "*/\n\"", "é",
    ];
    let c = c_like();
    let mut document = install(
        "int main() {\n  /* hello */ return \"a\\\"b\"; // end\n  char c = '\\'';\n}\n",
        &c.rules,
    );
    let mut random = Lcg(seed);

    for _ in 0..60 {
        let positions = invariants::positions(&document);
        let a = positions[random.below(positions.len())];
        let b = positions[random.below(positions.len())];
        let snippet = SNIPPETS[random.below(SNIPPETS.len())];

        document.replace(Region::new(a, b), snippet).unwrap();
        assert_consistent(&document, &c.rules);
    }
}

#[test]
fn regex_rules_scan_a_long_line() {
    let number = ContentType::new_value();
    let rules = vec![
        TransitionRule::regex(DEFAULT_CONTENT, number, "[0-9]{3}x", true).unwrap(),
        TransitionRule::regex(number, DEFAULT_CONTENT, " ", true).unwrap(),
    ];
    let filler = "a1".repeat(100_000);
    let mut document = install(&format!("{filler}123x tail"), &rules);
    assert_eq!(
        kinds(&document),
        vec![
            (DEFAULT_CONTENT, filler.clone()),
            (number, "123x ".to_string()),
            (DEFAULT_CONTENT, "tail".to_string()),
        ]
    );

    // an edit at the start of the line rescans all of it
    document.insert(Position::ZERO, "9").unwrap();
    assert_eq!(document.partitions().len(), 3);
    assert_eq!(
        document.partition(Position::new(0, 200_002)).unwrap().content_type,
        number
    );
}

#[test]
fn reset_content_reinstalls() {
    let c = c_like();
    let mut document = install("/* a */", &c.rules);
    document.reset_content("x \"y\"");
    assert_eq!(
        kinds(&document),
        vec![
            (DEFAULT_CONTENT, "x ".to_string()),
            (c.string, "\"y\"".to_string()),
        ]
    );
    assert_consistent(&document, &c.rules);
}
