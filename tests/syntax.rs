use serde_json::{json, Value};

fn syntax(pattern: &str) -> Value {
    serde_json::to_value(regex!(pattern).syntax()).unwrap()
}

fn hir(kind: Value) -> Value {
    json!({
        "@name": "rregex::hir::Hir",
        "@type": "struct",
        "kind": kind,
    })
}

fn kind(variant: &str, payload: Value) -> Value {
    json!({
        "@name": "rregex::hir::HirKind",
        "@type": "enum",
        "@variant": variant,
        "@values": [payload],
    })
}

fn literal(bytes: &[u8]) -> Value {
    hir(kind(
        "Literal",
        json!({
            "@name": "rregex::hir::Literal",
            "@type": "struct",
            "@values": [bytes],
        }),
    ))
}

fn look(variant: &str) -> Value {
    hir(kind(
        "Look",
        json!({
            "@name": "rregex::hir::Look",
            "@type": "enum",
            "@variant": variant,
        }),
    ))
}

/// Counts the nodes in a serialized tree with the given `@variant`.
fn count_variant(value: &Value, variant: &str) -> usize {
    match *value {
        Value::Object(ref map) => {
            let here = usize::from(map.get("@variant") == Some(&json!(variant)));
            here + map.values().map(|v| count_variant(v, variant)).sum::<usize>()
        }
        Value::Array(ref items) => {
            items.iter().map(|v| count_variant(v, variant)).sum()
        }
        _ => 0,
    }
}

#[test]
fn empty() {
    let expected = hir(json!({
        "@name": "rregex::hir::HirKind",
        "@type": "enum",
        "@variant": "Empty",
    }));
    assert_eq!(expected, syntax(""));
}

#[test]
fn literal_is_bytes() {
    assert_eq!(literal(b"a"), syntax("a"));
    assert_eq!(literal("☃".as_bytes()), syntax("☃"));
}

#[test]
fn adjacent_literals_merge() {
    assert_eq!(literal(b"abc"), syntax("a(?:b)c"));
}

#[test]
fn unicode_class() {
    let expected = hir(kind(
        "Class",
        json!({
            "@name": "rregex::hir::Class",
            "@type": "enum",
            "@variant": "Unicode",
            "@values": [{
                "@name": "rregex::hir::ClassUnicode",
                "@type": "struct",
                "ranges": [
                    {
                        "@name": "rregex::hir::ClassUnicodeRange",
                        "@type": "struct",
                        "start": "a",
                        "end": "c",
                        "len": 3,
                    },
                    {
                        "@name": "rregex::hir::ClassUnicodeRange",
                        "@type": "struct",
                        "start": "x",
                        "end": "x",
                        "len": 1,
                    },
                ],
            }],
        }),
    ));
    assert_eq!(expected, syntax("[xa-c]"));
}

#[test]
fn byte_class() {
    let expected = hir(kind(
        "Class",
        json!({
            "@name": "rregex::hir::Class",
            "@type": "enum",
            "@variant": "Bytes",
            "@values": [{
                "@name": "rregex::hir::ClassBytes",
                "@type": "struct",
                "ranges": [{
                    "@name": "rregex::hir::ClassBytesRange",
                    "@type": "struct",
                    "start": 97,
                    "end": 99,
                    "len": 3,
                }],
            }],
        }),
    ));
    assert_eq!(expected, syntax("(?-u:[a-c])"));
}

#[test]
fn looks() {
    assert_eq!(look("Start"), syntax("^"));
    assert_eq!(look("EndLF"), syntax("(?m)$"));
    assert_eq!(look("WordUnicode"), syntax(r"\b"));
    assert_eq!(look("WordAsciiNegate"), syntax(r"(?-u)\B"));
    assert_eq!(look("WordStartHalfUnicode"), syntax(r"\b{start-half}"));
}

#[test]
fn repetition_and_capture() {
    let capture = hir(json!({
        "@name": "rregex::hir::HirKind",
        "@type": "enum",
        "@variant": "Capture",
        "@values": [{
            "@name": "rregex::hir::Capture",
            "@type": "struct",
            "index": 1,
            "name": "x",
            "sub": literal(b"a"),
        }],
    }));
    let expected = hir(kind(
        "Repetition",
        json!({
            "@name": "rregex::hir::Repetition",
            "@type": "struct",
            "min": 1,
            "max": null,
            "greedy": false,
            "sub": capture,
        }),
    ));
    assert_eq!(expected, syntax("(?P<x>a)+?"));
}

#[test]
fn unnamed_capture_and_counted_bounds() {
    let got = syntax("(a){2,5}");
    let rep = &got["kind"]["@values"][0];
    assert_eq!(json!(2), rep["min"]);
    assert_eq!(json!(5), rep["max"]);
    assert_eq!(json!(true), rep["greedy"]);
    let cap = &rep["sub"]["kind"]["@values"][0];
    assert_eq!(json!(null), cap["name"]);
    assert_eq!(json!(1), cap["index"]);
}

#[test]
fn concat_and_alternation() {
    let expected = hir(kind(
        "Alternation",
        json!([literal(b"ab"), hir(kind("Concat", json!([look("Start"), literal(b"c")])))]),
    ));
    assert_eq!(expected, syntax("ab|^c"));
}

#[test]
fn generic_walk() {
    let tree = syntax(r"(?i)foo|bar\d+|(baz)*");
    assert_eq!(1, count_variant(&tree, "Alternation"));
    assert_eq!(1, count_variant(&tree, "Capture"));
    assert_eq!(2, count_variant(&tree, "Repetition"));
    assert_eq!(0, count_variant(&tree, "Literal"));
}

#[test]
fn serializes_to_string() {
    let re = regex!("a");
    let text = serde_json::to_string(re.syntax()).unwrap();
    assert!(text.contains(r#""@variant":"Literal""#), "{}", text);
    assert!(text.contains("[[97]]"), "{}", text);
}
