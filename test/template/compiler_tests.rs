#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde_json::json;
    use std::sync::Arc;

    use layout_compiler::{
        compile, CompileEnv, CompileError, Compiler, Context, Definition, Fragment, Handler,
        RenderError, Stringify, Value,
    };

    fn def(value: serde_json::Value) -> Definition {
        Definition::from(value)
    }

    fn check_render(definition: serde_json::Value, context: Context, expected: &str) {
        let template = compile(&def(definition.clone()))
            .unwrap_or_else(|e| panic!("{definition} should compile: {e}"));
        let rendered = template
            .render(&context)
            .unwrap_or_else(|e| panic!("{definition} should render: {e}"));
        assert_eq!(rendered, expected);
    }

    fn check_compile_err(definition: serde_json::Value) -> CompileError {
        match compile(&def(definition.clone())) {
            Ok(_) => panic!("{definition} should fail to compile"),
            Err(e) => e,
        }
    }

    mod entry_point_tests {
        use super::*;

        #[test]
        fn should_accept_objects_and_sequences_at_the_root() {
            check_render(json!({"tag": "div"}), Context::new(), "<div></div>");
            check_render(json!(["a", "b"]), Context::new(), "a\nb");
        }

        #[test]
        fn should_reject_scalar_roots() {
            assert!(matches!(
                compile(&Definition::from("just text")),
                Err(CompileError::InvalidDefinition(_))
            ));
            assert!(matches!(
                compile(&Definition::from(5)),
                Err(CompileError::InvalidDefinition(_))
            ));
            assert!(matches!(
                compile(&Definition::Null),
                Err(CompileError::InvalidDefinition(_))
            ));
        }

        #[test]
        fn should_fail_on_nodes_no_handler_claims() {
            match check_compile_err(json!({"bogus": 1})) {
                CompileError::UnhandledNode(text) => assert!(text.contains("bogus")),
                other => panic!("expected unhandled node, got {other:?}"),
            }
        }

        #[test]
        fn should_render_with_an_empty_context() {
            check_render(json!({"tag": "p", "content": "hi"}), Context::new(), "<p>hi</p>");
        }
    }

    mod sequence_tests {
        use super::*;

        #[test]
        fn should_join_siblings_with_newlines() {
            check_render(json!(["a", "b", "c"]), Context::new(), "a\nb\nc");
        }

        #[test]
        fn should_emit_scalars_verbatim() {
            check_render(json!([1, "x", true, 2.5]), Context::new(), "1\nx\ntrue\n2.5");
        }

        #[test]
        fn should_never_escape_literal_text() {
            check_render(
                json!(["<b> & \"quotes\""]),
                Context::new(),
                "<b> & \"quotes\"",
            );
        }

        #[test]
        fn should_skip_nulls_and_empty_output() {
            check_render(json!(["a", null, "b"]), Context::new(), "a\nb");
            // A branchless conditional contributes no separator either.
            check_render(
                json!(["a", {"test": "missing2", "yes": "y"}, "c"]),
                Context::new().with("missing2", false),
                "a\nc",
            );
        }
    }

    mod expression_tests {
        use super::*;

        #[test]
        fn should_evaluate_against_the_context() {
            check_render(
                json!({"expr": "'hello ' + name"}),
                Context::new().with("name", "world"),
                "hello world",
            );
        }

        #[test]
        fn should_escape_by_default() {
            check_render(
                json!({"expr": "v"}),
                Context::new().with("v", "a < b & \"c\""),
                "a &lt; b &amp; &quot;c&quot;",
            );
        }

        #[test]
        fn should_pass_raw_when_escape_is_disabled() {
            check_render(
                json!({"expr": "v", "escape": false}),
                Context::new().with("v", "<b>bold</b>"),
                "<b>bold</b>",
            );
        }

        #[test]
        fn should_emit_nothing_for_null() {
            check_render(json!({"expr": "null"}), Context::new(), "");
        }

        #[test]
        fn should_fail_malformed_snippets_at_compile_time() {
            match check_compile_err(json!({"expr": "1 +"})) {
                CompileError::ExpressionSyntax { snippet, .. } => assert_eq!(snippet, "1 +"),
                other => panic!("expected syntax error, got {other:?}"),
            }
        }

        #[test]
        fn should_fail_unbound_names_only_at_render_time() {
            let template = compile(&def(json!({"expr": "missing"}))).expect("compiles fine");
            match template.render(&Context::new()) {
                Err(RenderError::UnboundVariable(name)) => assert_eq!(name, "missing"),
                other => panic!("expected unbound variable, got {other:?}"),
            }
        }

        #[test]
        fn should_reject_unknown_keys() {
            match check_compile_err(json!({"expr": "1", "bogus": true})) {
                CompileError::UnknownKey { key, .. } => assert_eq!(key, "bogus"),
                other => panic!("expected unknown key, got {other:?}"),
            }
        }
    }

    mod spec_scenario_tests {
        use super::*;

        #[test]
        fn should_render_a_bare_div() {
            check_render(json!({"tag": "div"}), Context::new(), "<div></div>");
        }

        #[test]
        fn should_join_class_sequences_with_spaces() {
            check_render(
                json!({"tag": "div", "cls": ["hat", "beard"]}),
                Context::new(),
                "<div class=\"hat beard\"></div>",
            );
        }

        #[test]
        fn should_pick_count_branches() {
            let definition =
                json!({"test": "n", "singular": "One", "plural": "Many", "none": "None"});
            check_render(definition.clone(), Context::new().with("n", 0), "None");
            check_render(definition.clone(), Context::new().with("n", 1), "One");
            check_render(definition, Context::new().with("n", 3), "Many");
        }

        #[test]
        fn should_filter_iteration_content() {
            check_render(
                json!({
                    "each": "[1,2,3,4,5,6]",
                    "filter": "$item % 2 === 0",
                    "content": {"expr": "$item"},
                }),
                Context::new(),
                "2\n4\n6",
            );
        }

        #[test]
        fn should_escape_dynamic_attribute_values_once() {
            check_render(
                json!({"tag": "input", "value": {"expr": "\"<\" + value + \">\"", "escape": true}}),
                Context::new().with("value", "foo&bar"),
                "<input value=\"&lt;foo&amp;bar&gt;\">",
            );
        }
    }

    mod handler_registry_tests {
        use super::*;

        fn shout_handler(
            node: &IndexMap<String, Definition>,
            _env: &mut CompileEnv<'_>,
        ) -> Result<Option<Fragment>, CompileError> {
            match node.get("shout") {
                Some(Definition::Str(s)) => Ok(Some(Fragment::Literal(s.to_uppercase()))),
                _ => Ok(None),
            }
        }

        fn stub_handler(
            _node: &IndexMap<String, Definition>,
            _env: &mut CompileEnv<'_>,
        ) -> Result<Option<Fragment>, CompileError> {
            Ok(Some(Fragment::Literal("stub".to_string())))
        }

        #[test]
        fn should_dispatch_to_custom_handlers() {
            let mut compiler = Compiler::new();
            compiler.register("shout", Arc::new(shout_handler) as Handler);
            let template = compiler.compile(&def(json!({"shout": "psst"}))).unwrap();
            assert_eq!(template.render(&Context::new()).unwrap(), "PSST");
        }

        #[test]
        fn should_keep_scanning_when_a_handler_declines() {
            let mut compiler = Compiler::new();
            compiler.register("shout", Arc::new(shout_handler) as Handler);
            // Declined with no other key present: nothing claims the node.
            assert!(matches!(
                compiler.compile(&def(json!({"shout": 3}))),
                Err(CompileError::UnhandledNode(_))
            ));
            // Declined, but a later-registered key is present too.
            let mut compiler = Compiler::new();
            compiler.register("shout", Arc::new(shout_handler) as Handler);
            compiler.register("fallback", Arc::new(stub_handler) as Handler);
            let template = compiler
                .compile(&def(json!({"shout": 3, "fallback": true})))
                .unwrap();
            assert_eq!(template.render(&Context::new()).unwrap(), "stub");
        }

        #[test]
        fn should_keep_dispatch_position_when_re_registering() {
            let mut compiler = Compiler::new();
            compiler.register("tag", Arc::new(stub_handler) as Handler);
            // "tag" still outranks "expr" even though it was re-registered
            // after every built-in.
            let template = compiler
                .compile(&def(json!({"tag": "div", "expr": "1"})))
                .unwrap();
            assert_eq!(template.render(&Context::new()).unwrap(), "stub");
            let names: Vec<&str> = compiler.registry().names().collect();
            assert_eq!(names[0], "tag");
        }

        #[test]
        fn should_register_batches_in_order() {
            let mut compiler = Compiler::new();
            compiler.register_all([
                ("alpha", Arc::new(stub_handler) as Handler),
                ("beta", Arc::new(stub_handler) as Handler),
            ]);
            let names: Vec<&str> = compiler.registry().names().collect();
            assert_eq!(&names[names.len() - 2..], &["alpha", "beta"]);
        }
    }

    mod property_tests {
        use super::*;

        #[test]
        fn should_compile_idempotently() {
            let definition = json!({
                "tag": "ul",
                "content": {"each": "items", "content": {"tag": "li", "content": {"expr": "$item"}}},
            });
            let first = compile(&def(definition.clone())).unwrap();
            let second = compile(&def(definition)).unwrap();
            let context = Context::new().with(
                "items",
                Value::from(json!(["a", "b"])),
            );
            assert_eq!(
                first.render(&context).unwrap(),
                second.render(&context).unwrap()
            );
        }

        #[test]
        fn should_evaluate_side_effecting_snippets_exactly_once_per_render() {
            let log = Value::array(vec![]);
            let context = Context::new().with("log", log.clone());
            // The test value feeds branch selection; the push still
            // happens once.
            let template =
                compile(&def(json!({"test": "log.push(1)", "yes": "Y", "no": "N"}))).unwrap();
            assert_eq!(template.render(&context).unwrap(), "Y");
            match &log {
                Value::Array(items) => assert_eq!(items.borrow().len(), 1),
                _ => unreachable!(),
            }
            // A second render evaluates once more.
            template.render(&context).unwrap();
            match &log {
                Value::Array(items) => assert_eq!(items.borrow().len(), 2),
                _ => unreachable!(),
            }
        }

        #[test]
        fn should_render_templates_repeatedly_without_interference() {
            let template = compile(&def(json!({"expr": "'n=' + n"}))).unwrap();
            assert_eq!(
                template.render(&Context::new().with("n", 1)).unwrap(),
                "n=1"
            );
            assert_eq!(
                template.render(&Context::new().with("n", 2)).unwrap(),
                "n=2"
            );
        }
    }

    mod definition_tests {
        use super::*;

        struct Version;

        impl Stringify for Version {
            fn stringify(&self) -> String {
                "1.2.0".to_string()
            }
        }

        #[test]
        fn should_bake_custom_leaves_in_at_compile_time() {
            let definition = Definition::seq([
                Definition::from("v"),
                Definition::custom(Version),
            ]);
            let template = compile(&definition).unwrap();
            assert_eq!(template.render(&Context::new()).unwrap(), "v\n1.2.0");
        }

        #[test]
        fn should_parse_definitions_from_json_text() {
            let definition =
                Definition::from_json_str(r#"{"tag": "p", "content": {"expr": "x"}}"#).unwrap();
            let template = compile(&definition).unwrap();
            assert_eq!(
                template.render(&Context::new().with("x", "ok")).unwrap(),
                "<p>ok</p>"
            );
        }

        #[test]
        fn should_outline_compiled_templates() {
            let template = compile(&def(json!({"tag": "div", "content": {"expr": "x"}}))).unwrap();
            let dump = template.dump();
            assert!(dump.contains("element <div>"));
            assert!(dump.contains("expr [x]"));
        }
    }
}
