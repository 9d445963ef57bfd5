/*
 * includes.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Include resolution against the real filesystem.
 */

use nml_parser::{Engine, ErrorKind};
use nml_syntax::{CodeFragment, Element, Variable};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

#[test]
fn test_book_fixture() {
    let doc = Engine::new()
        .parse_file(fixture_path("book/main.nml"))
        .unwrap_or_else(|e| panic!("{}", e));

    // Variables from every included file land in the including document
    assert_eq!(
        doc.variable("Author"),
        Some(&Variable::Text("Someone".to_string()))
    );
    assert_eq!(
        doc.variable("Cover"),
        Some(&Variable::Path(fixture_path("book/chapters/cover.png")))
    );

    let titles: Vec<&str> = doc
        .outline()
        .entries()
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Book", "Intro"]);
    assert_eq!(doc.figure("diagram").map(|entry| entry.id), Some(1));

    let code = doc
        .tree()
        .iter()
        .find_map(|element| match element {
            Element::Code(code) => Some(code),
            _ => None,
        })
        .expect("the chapter has a code block");
    assert_eq!(code.name, "Hello");
    assert_eq!(code.style, "plain");
    assert_eq!(
        code.fragments,
        vec![CodeFragment {
            first_line: 1,
            text: "fn main() {\n    println!(\"hello\");\n}\n".to_string(),
        }]
    );

    let tail: Vec<&Element> = doc.tree().iter().collect();
    assert!(matches!(tail[tail.len() - 2], Element::Reference(r) if r.referencing == "diagram"));
    assert_eq!(tail[tail.len() - 1], &Element::text("."));
}

#[test]
fn test_include_in_temp_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("parts")).unwrap();
    fs::write(dir.path().join("parts/a.nml"), "#:Inc b.nml\n#+FromA yes\n").unwrap();
    fs::write(dir.path().join("parts/b.nml"), "#+FromB' data.csv\n").unwrap();
    fs::write(dir.path().join("main.nml"), "#:Inc parts/a.nml\ndone\n").unwrap();

    let doc = Engine::new()
        .parse_file(dir.path().join("main.nml"))
        .unwrap_or_else(|e| panic!("{}", e));

    assert_eq!(
        doc.variable("FromA"),
        Some(&Variable::Text("yes".to_string()))
    );
    // Relative to the file that defined it, not to main.nml
    let Some(Variable::Path(path)) = doc.variable("FromB") else {
        panic!("FromB should be a path variable");
    };
    assert!(path.ends_with("parts/data.csv"));
    assert_eq!(doc.last(), Some(&Element::text("done")));
}

#[test]
fn test_missing_include_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.nml"), "intro\n#:Inc gone.nml\n").unwrap();

    let err = Engine::new()
        .parse_file(dir.path().join("main.nml"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncludeIO);
    assert_eq!(err.category(), "Invalid Include");
    assert_eq!(err.message(), "Unable to open file 'gone.nml'");
    assert_eq!(err.diagnostic().hints.len(), 1);
    assert!(err.diagnostic().hints[0].contains("gone.nml"));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Engine::new()
        .parse_file(dir.path().join("absent.nml"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncludeIO);
    assert!(err.diagnostic().location.is_none());
}

#[test]
fn test_error_inside_include_names_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.nml"), "fine\n§{nothing}\n").unwrap();
    fs::write(dir.path().join("main.nml"), "#:Inc bad.nml\n").unwrap();

    let err = Engine::new()
        .parse_file(dir.path().join("main.nml"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownReference);

    let snippet = err.diagnostic().location.as_ref().unwrap();
    assert!(snippet.name.ends_with("bad.nml"));
    assert_eq!(snippet.ancestors.len(), 1);
    assert!(snippet.ancestors[0].ends_with("main.nml"));
    assert_eq!(snippet.line, 2);
}
