use ptpy_ast::stmt::StmtKind;
use ptpy_ast_parsing::parser::ErrorKind;
use ptpy_tokens::keywords::Dialect;
use ptpyc::backend::Backend;
use ptpyc::error::{PtpyCErrorKind, ResolveError};
use ptpyc::resolution::{NameClass, ResolvedModule};
use ptpyc::Frontend;
use std::fmt::Write as _;
use test_log::test;

fn english() -> Frontend {
    Frontend::builder()
        .dialect(Dialect::English)
        .build()
        .expect("default builder is valid")
}

/// Renders every scope as `name: a=CLASS, ...` lines
#[derive(Default)]
struct ScopeDump;

#[derive(Debug, thiserror::Error)]
#[error("module has no statements")]
struct EmptyModule;

impl Backend for ScopeDump {
    type Output = String;
    type Error = EmptyModule;

    fn compile_unit(&mut self, unit: &ResolvedModule) -> Result<Self::Output, Self::Error> {
        if unit.module().body.is_empty() {
            return Err(EmptyModule);
        }
        let mut out = String::new();
        for scope in unit.scopes().iter() {
            let mut classes = scope.classifications().collect::<Vec<_>>();
            classes.sort_by_key(|(name, _)| *name);
            let classes = classes
                .into_iter()
                .map(|(name, class)| format!("{name}={class}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "{}: {classes}", scope.name()).unwrap();
        }
        Ok(out)
    }
}

#[test]
fn module_local_captured_by_nested_blocks() -> eyre::Result<()> {
    let resolved = english().compile(
        "a = 1\ndef outer:\n    x = a\n    def inner:\n        y = a\n",
    )?;
    assert_eq!(resolved.scope_of_module().classify("a"), Some(NameClass::Cell));

    let StmtKind::ClosureBlock(outer) = &resolved.module().body.stmts[1].kind else {
        panic!("expected closure block");
    };
    let outer_scope = resolved.scope_of(outer).expect("outer has a scope");
    assert_eq!(outer_scope.classify("a"), Some(NameClass::Free));

    let StmtKind::ClosureBlock(inner) = &outer.body.stmts[1].kind else {
        panic!("expected closure block");
    };
    let inner_scope = resolved.scope_of(inner).expect("inner has a scope");
    assert_eq!(inner_scope.classify("a"), Some(NameClass::Free));
    assert_eq!(inner_scope.parent(), Some(outer_scope.id()));
    Ok(())
}

#[test]
fn portuguese_is_the_default_dialect() -> eyre::Result<()> {
    let frontend = Frontend::builder().build()?;
    let resolved = frontend.compile(
        "contador = 0\ndefine incrementar:\n    se contador > 0:\n        passar\n    senao contador == 0:\n        interromper\n",
    )?;
    let module = resolved.scope_of_module();
    assert_eq!(module.classify("contador"), Some(NameClass::Cell));
    assert_eq!(module.classify("incrementar"), Some(NameClass::Local));
    Ok(())
}

#[test]
fn invalid_assignment_fails_before_resolution() {
    let error = english().compile("1 = 0\n").unwrap_err();
    let PtpyCErrorKind::Syntax(syntax) = error.kind() else {
        panic!("expected syntax error, got {error}");
    };
    assert!(matches!(
        syntax.error_kind(),
        ErrorKind::InvalidAssignmentTarget("literal")
    ));
    assert_eq!(error.location().map(|span| span.line()), Some(1));
}

#[test]
fn indentation_errors_surface_as_syntax_errors() {
    let error = english().compile("x = 1\n    y = 2\n").unwrap_err();
    let PtpyCErrorKind::Syntax(syntax) = error.kind() else {
        panic!("expected syntax error, got {error}");
    };
    assert!(matches!(syntax.error_kind(), ErrorKind::Indent(_)), "{error}");

    let error = english()
        .compile("if x:\n        y = 1\n    z = 2\n")
        .unwrap_err();
    assert!(error.to_string().contains("inconsistent"), "{error}");
}

#[test]
fn permissive_globals_by_default() -> eyre::Result<()> {
    let resolved = english().compile("x = undefined_name\n")?;
    assert_eq!(
        resolved.scope_of_module().classify("undefined_name"),
        Some(NameClass::Global)
    );
    assert_eq!(resolved.unbound_globals().len(), 1);
    Ok(())
}

#[test]
fn strict_globals_rejects_unbound_names() {
    let frontend = Frontend::builder()
        .dialect(Dialect::English)
        .strict_globals(true)
        .builtin("len")
        .build()
        .unwrap();
    frontend
        .compile("def f:\n    x = len\n")
        .expect("builtins are accepted");
    frontend
        .compile("def f:\n    global g\n    g = 1\ndef h:\n    y = g\n")
        .expect("globals bound in a closure are accepted");

    let error = frontend.compile("def f:\n    x = mispelled\n").unwrap_err();
    assert!(
        matches!(
            error.kind(),
            PtpyCErrorKind::Resolve(ResolveError::UnresolvedName { name, scope })
                if name == "mispelled" && scope == "f"
        ),
        "{error}"
    );
    assert_eq!(error.location().map(|span| span.line()), Some(2));
}

#[test]
fn backend_receives_resolved_module() -> eyre::Result<()> {
    let mut dump = ScopeDump;
    let output = english().compile_with(&mut dump, "n = 0\ndef f:\n    m = n\n")?;
    assert_eq!(output, "<module>: f=LOCAL, n=CELL\nf: m=LOCAL, n=FREE\n");
    Ok(())
}

#[test]
fn backend_errors_are_wrapped() {
    let error = english().compile_with(ScopeDump, "\n").unwrap_err();
    assert!(matches!(error.kind(), PtpyCErrorKind::Backend(_)));
    assert!(error.to_string().contains("module has no statements"), "{error}");
}
