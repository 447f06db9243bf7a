//! End-to-end template behavior.

use std::sync::Arc;

use edge_expr::{compile, parse, to_template, CompileError, CompiledTemplate, KeyContext};

fn ctx(values: &[&str]) -> KeyContext {
    values.iter().copied().collect()
}

fn assert_renders(context: &KeyContext, template: &str, expected: &str) {
    let compiled = compile(template).unwrap_or_else(|e| panic!("{}: {}", template, e));
    assert_eq!(compiled.evaluate(context), expected, "template: {}", template);
}

#[test]
fn test_substring() {
    assert_renders(
        &ctx(&["abcd"]),
        "{substr {0} 0 2} {substr {0} 0 10} {substr {0} 3 2} {substr {0} 3 1} {substr 0}",
        "ab abcd d d <ARGN>",
    );
}

#[test]
fn test_select() {
    assert_renders(
        &ctx(&["ab c d", "ab\tq"]),
        "{select {0} 0} {select {0} 1} {select {0} 2} {select {0} 3} {select 0} {select {1} 1}",
        "ab c d  <ARGN> q",
    );
    assert_renders(&KeyContext::empty(), r#"{select "ab cd ef" 1}"#, "cd");
}

#[test]
fn test_path_functions() {
    let context = ctx(&["/assets/css/site.min.css"]);
    assert_renders(&context, "{path_base {0}}", "site.min.css");
    assert_renders(&context, "{path_dir {0}}", "/assets/css");
    assert_renders(&context, "{path_ext {0}}", ".css");
    assert_renders(&context, "{path_base}|{path_dir a b}", "<ARGN>|<ARGN>");
}

#[test]
fn test_missing_context_index() {
    assert_renders(&ctx(&["GET"]), "{0}:{1}:{0}", "GET:<ARGN>:GET");
}

#[test]
fn test_sentinel_is_local_to_failing_call() {
    assert_renders(
        &ctx(&["GET", "/a/b.txt"]),
        "{0} {substr {1}} {path_ext {1}}",
        "GET <ARGN> .txt",
    );
}

#[test]
fn test_bad_numeric_argument() {
    assert_renders(&ctx(&["abc", "x"]), "{substr {0} {1}}-{select {0} y}", "<BAD-TYPE>-<BAD-TYPE>");
}

#[test]
fn test_dynamic_arguments() {
    assert_renders(&ctx(&["hello world", "1", "3"]), "{substr {select {0} {1}} 0 {2}}", "wor");
}

#[test]
fn test_concat_argument() {
    assert_renders(&ctx(&["EN"]), "{lower lang-{0}}", "lang-en");
}

#[test]
fn test_plain_template_reproduces_input() {
    for template in ["", "plain", "a b\tc", "üñí/cødé", "quotes \" stay"] {
        assert_renders(&ctx(&["x"]), template, template);
    }
}

#[test]
fn test_unknown_function_fails_compile() {
    assert!(matches!(
        compile("{0}-{hash {0}}"),
        Err(CompileError::UnknownFunction { ref name, .. }) if name == "hash"
    ));
}

#[test]
fn test_unbalanced_braces_fail_compile() {
    for template in ["{0", "0}", "{select {0} 1", "{{0}"] {
        assert!(
            matches!(compile(template), Err(CompileError::UnbalancedBraces { .. })),
            "template: {}",
            template
        );
    }
}

#[test]
fn test_display_reparses_to_same_tree() {
    let templates = [
        r#"k:{select "a b" {0}}/{lower v{1}}/{substr {0} 1}"#,
        r#"{"{"}"#,
        r#"a{"}"}b"#,
        r#"{"{0}"}:{0}"#,
    ];
    let context = ctx(&["1", "X"]);

    for template in templates {
        let nodes = parse(template).unwrap();
        let rendered = to_template(&nodes);
        assert_eq!(parse(&rendered).unwrap(), nodes, "{} rendered as {}", template, rendered);
        assert_eq!(
            compile(&rendered).unwrap().evaluate(&context),
            compile(template).unwrap().evaluate(&context)
        );
    }
    assert_eq!(compile(r#"a{"}"}b"#).unwrap().evaluate(&context), "a}b");
}

#[test]
fn test_concurrent_evaluation_has_no_cross_talk() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CompiledTemplate>();

    let template = Arc::new(compile("{0}/{select {1} 1}/{substr {0} 1 3}").unwrap());

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let template = Arc::clone(&template);
                scope.spawn(move || {
                    for round in 0..500 {
                        let head = format!("t{}r{}", i, round);
                        let words = format!("x {} y", i);
                        let context = ctx(&[head.as_str(), words.as_str()]);
                        let expected = format!("{}/{}/{}", head, i, &head[1..4]);
                        assert_eq!(template.evaluate(&context), expected);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}
