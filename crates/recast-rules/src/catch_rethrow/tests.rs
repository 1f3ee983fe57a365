//! Unit tests for catch clause removal.

use rstest::rstest;

use super::*;
use crate::test_support::rewrite;

fn method(body: &str) -> String {
    format!("import java.io.IOException;\n\nclass A {{\n    void f() throws Exception {{\n{body}    }}\n}}\n")
}

#[rstest]
#[case::unwraps_multi_line(
    "        try {\n            read();\n            close();\n        } catch (IOException e) {\n            throw e;\n        }\n",
    "        read();\n        close();\n"
)]
#[case::unwraps_one_line(
    "        try { read(); } catch (IOException e) { throw e; }\n",
    "        read();\n"
)]
#[case::keeps_finally(
    "        try { read(); } catch (IOException e) { throw e; } finally { close(); }\n",
    "        try { read(); } finally { close(); }\n"
)]
#[case::unrelated_later_clause(
    "        try { read(); } catch (IOException e) { throw e; } catch (InterruptedException e) { log(e); }\n",
    "        try { read(); } catch (InterruptedException e) { log(e); }\n"
)]
#[case::resources_stay(
    "        try (Reader r = open()) { r.read(); } catch (IOException e) { throw e; }\n",
    "        try (Reader r = open()) { r.read(); }\n"
)]
#[case::empty_try(
    "        try {} catch (RuntimeException e) { throw e; }\n        read();\n",
    "        read();\n"
)]
#[case::earlier_nested_local_is_out_of_scope(
    "        for (int x = 0; x < 1; x++) {}\n        try { int x = g(); } catch (IOException e) { throw e; }\n        log(x);\n",
    "        for (int x = 0; x < 1; x++) {}\n        int x = g();\n        log(x);\n"
)]
#[case::nested_statements_keep_relative_indent(
    "        try {\n            if (ready()) {\n                read();\n            }\n        } catch (IOException e) {\n            throw e;\n        }\n",
    "        if (ready()) {\n            read();\n        }\n"
)]
fn removes_rethrow_only_clauses(#[case] before: &str, #[case] after: &str) {
    assert_eq!(
        rewrite(CatchClauseOnlyRethrows::new(), &method(before)),
        method(after)
    );
}

#[rstest]
#[case::later_supertype(
    "        try { read(); } catch (IOException e) { throw e; } catch (Exception e) { log(e); }\n"
)]
#[case::unresolved_type(
    "        try { read(); } catch (Missing e) { throw e; } catch (Exception e) { log(e); }\n"
)]
#[case::wraps_instead(
    "        try { read(); } catch (IOException e) { throw new RuntimeException(e); }\n"
)]
#[case::throws_other_variable(
    "        try { read(); } catch (IOException e) { throw failure; }\n"
)]
#[case::commented(
    "        try { read(); } catch (IOException e) {\n            // propagate\n            throw e;\n        }\n"
)]
#[case::name_clash(
    "        try { int x = 1; use(x); } catch (RuntimeException e) { throw e; }\n        int x = 2;\n"
)]
#[case::clash_with_loop_variable(
    "        try { int x = g(); } catch (IOException e) { throw e; }\n        for (int x = 0; x < 1; x++) {}\n"
)]
#[case::clash_in_inner_block(
    "        try { int x = g(); } catch (IOException e) { throw e; }\n        {\n            int x = 3;\n        }\n"
)]
#[case::clash_with_lambda_parameter(
    "        try { int x = g(); } catch (IOException e) { throw e; }\n        run(x -> x + 1);\n"
)]
#[case::clash_with_catch_parameter(
    "        try { Exception e = g(); } catch (IOException io) { throw io; }\n        try { read(); } catch (Exception e) { log(e); }\n"
)]
#[case::clash_with_enhanced_for(
    "        try { String s = g(); } catch (IOException e) { throw e; }\n        for (String s : names()) { log(s); }\n"
)]
#[case::local_in_switch_group(
    "        switch (g()) {\n            case 1:\n                try { int x = g(); } catch (IOException e) { throw e; }\n                break;\n            default:\n                break;\n        }\n"
)]
fn keeps_clauses_that_matter(#[case] body: &str) {
    let source = method(body);
    assert_eq!(rewrite(CatchClauseOnlyRethrows::new(), &source), source);
}

#[test]
fn shift_rewrites_only_continuation_lines() {
    assert_eq!(
        shift("  \n            // note\n            ", Some("            "), Some("        ")),
        "  \n        // note\n        "
    );
    assert_eq!(shift(" ", Some("    "), None), " ");
}
