use std::fs;

use stackc::compiler::{Options, compile_to_string};

/// Position of `needle` in `haystack`, asserting it occurs exactly once.
fn offset_of(haystack: &str, needle: &str) -> usize {
    let first = haystack.find(needle).unwrap_or_else(|| {
        panic!("listing does not contain {needle:?}");
    });
    assert_eq!(
        haystack.matches(needle).count(),
        1,
        "{needle:?} should occur exactly once"
    );
    first
}

#[test]
fn compiles_countdown_program() {
    let source = fs::read_to_string("tests/countdown.s").unwrap();
    let listing = compile_to_string(&source, &Options::default()).expect("valid program");

    // the leading comment line is echoed first
    assert!(listing.starts_with("; // countdown driver\n"));

    // every source line appears as a comment before the code it produced
    let echo = offset_of(&listing, "; readint(n);");
    let din = offset_of(&listing, "          din");
    assert!(echo < din);

    // chained assignment stores the same value into both targets
    let chain = [
        "          pc        count",
        "          pc        total",
        "          p         n",
        "          dupe",
        "          rot",
        "          stav",
        "          stav",
    ]
    .join("\n");
    assert!(listing.contains(&chain), "chained assignment sequence");

    // loop shape: condition at the head, jz to the exit, back edge, exit
    let head = offset_of(&listing, "@L0:\n");
    let jz = offset_of(&listing, "          jz        @L1");
    let back = offset_of(&listing, "          ja        @L0");
    let exit = offset_of(&listing, "@L1:\n");
    assert!(head < jz && jz < back && back < exit);

    // the string constant is declared inline, quotes preserved
    offset_of(&listing, "^@L2:     dw        \"counted \"");

    // storage: one declaration per distinct variable, in first-use order,
    // after the halt
    let halt = offset_of(&listing, "          halt");
    let tail = &listing[halt..];
    let declarations: Vec<&str> = tail
        .lines()
        .filter(|l| l.contains(" dw "))
        .collect();
    assert_eq!(
        declarations,
        vec![
            "n:        dw        0",
            "count:    dw        0",
            "total:    dw        0",
        ]
    );
}

#[test]
fn rejects_countdown_with_unterminated_string() {
    let source = fs::read_to_string("tests/countdown.s")
        .unwrap()
        .replace("\"counted \"", "\"counted ");
    let err = compile_to_string(&source, &Options::default()).unwrap_err();
    assert!(err.to_string().contains("missing its closing quote"), "{err}");
}

#[test]
fn token_trace_only_adds_comments() {
    let source = fs::read_to_string("tests/countdown.s").unwrap();
    let plain = compile_to_string(&source, &Options::default()).unwrap();
    let traced = compile_to_string(&source, &Options { trace_tokens: true }).unwrap();

    let code = |s: &str| {
        s.lines()
            .filter(|l| !l.starts_with(';'))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(code(&plain), code(&traced));
    assert!(traced.contains("; kind=Readint"));
}
