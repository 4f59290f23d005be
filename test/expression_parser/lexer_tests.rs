#[cfg(test)]
mod tests {
    use layout_compiler::expression_parser::lexer::{Lexer, Token, TokenType};

    fn tokenize(text: &str) -> Vec<Token> {
        Lexer::new().tokenize(text)
    }

    fn token_texts(text: &str) -> Vec<String> {
        tokenize(text).iter().map(|t| t.str_value.clone()).collect()
    }

    mod identifier_tests {
        use super::*;

        #[test]
        fn should_scan_plain_identifiers() {
            let tokens = tokenize("alpha beta");
            assert_eq!(tokens.len(), 2);
            assert!(tokens.iter().all(Token::is_identifier));
            assert_eq!(tokens[0].str_value, "alpha");
            assert_eq!(tokens[1].str_value, "beta");
        }

        #[test]
        fn should_admit_dollar_and_underscore() {
            let tokens = tokenize("$item _private $0");
            assert!(tokens.iter().all(Token::is_identifier));
            assert_eq!(tokens[0].str_value, "$item");
            assert_eq!(tokens[1].str_value, "_private");
            assert_eq!(tokens[2].str_value, "$0");
        }

        #[test]
        fn should_scan_keywords_as_keywords() {
            let tokens = tokenize("null undefined true false");
            assert!(tokens.iter().all(Token::is_keyword));
            assert!(tokens[0].is_keyword_null());
            assert!(tokens[1].is_keyword_undefined());
            assert!(tokens[2].is_keyword_true());
            assert!(tokens[3].is_keyword_false());
        }

        #[test]
        fn should_not_treat_keyword_prefixes_as_keywords() {
            let tokens = tokenize("nullable truer");
            assert!(tokens.iter().all(Token::is_identifier));
        }
    }

    mod number_tests {
        use super::*;

        #[test]
        fn should_scan_integers_and_decimals() {
            let tokens = tokenize("0 42 2.5 .5");
            assert!(tokens.iter().all(Token::is_number));
            assert_eq!(tokens[0].num_value, 0.0);
            assert_eq!(tokens[1].num_value, 42.0);
            assert_eq!(tokens[2].num_value, 2.5);
            assert_eq!(tokens[3].num_value, 0.5);
        }

        #[test]
        fn should_scan_exponent_forms() {
            let tokens = tokenize("1e3 2.5e-2 1E2");
            assert!(tokens.iter().all(Token::is_number));
            assert_eq!(tokens[0].num_value, 1000.0);
            assert_eq!(tokens[1].num_value, 0.025);
            assert_eq!(tokens[2].num_value, 100.0);
        }

        #[test]
        fn should_reject_dangling_exponent() {
            let tokens = tokenize("1e");
            assert!(tokens[0].is_error());
            assert!(tokens[0].str_value.contains("invalid exponent"));
        }

        #[test]
        fn should_keep_token_positions() {
            let tokens = tokenize("  12 ");
            assert_eq!(tokens[0].index, 2);
            assert_eq!(tokens[0].end, 4);
        }
    }

    mod string_tests {
        use super::*;

        #[test]
        fn should_scan_both_quote_styles() {
            let tokens = tokenize("'hat' \"beard\"");
            assert!(tokens.iter().all(Token::is_string));
            assert_eq!(tokens[0].str_value, "hat");
            assert_eq!(tokens[1].str_value, "beard");
        }

        #[test]
        fn should_resolve_escapes() {
            let tokens = tokenize(r#"'a\nb' 'it\'s' "q\"q" 'A'"#);
            assert_eq!(tokens[0].str_value, "a\nb");
            assert_eq!(tokens[1].str_value, "it's");
            assert_eq!(tokens[2].str_value, "q\"q");
            assert_eq!(tokens[3].str_value, "A");
        }

        #[test]
        fn should_report_unterminated_string() {
            let tokens = tokenize("'open");
            assert!(tokens[0].is_error());
            assert!(tokens[0].str_value.contains("unterminated quote"));
        }

        #[test]
        fn should_report_bad_unicode_escape() {
            let tokens = tokenize(r"'\u12'");
            assert!(tokens[0].is_error());
        }
    }

    mod operator_tests {
        use super::*;

        #[test]
        fn should_scan_compound_operators_greedily() {
            assert_eq!(
                token_texts("=== !== == != <= >= && ||"),
                vec!["===", "!==", "==", "!=", "<=", ">=", "&&", "||"],
            );
        }

        #[test]
        fn should_scan_arithmetic_and_ternary() {
            let tokens = tokenize("+ - * / % ? ! < >");
            assert!(tokens
                .iter()
                .all(|t| t.token_type == TokenType::Operator));
        }

        #[test]
        fn should_scan_punctuation_as_characters() {
            let tokens = tokenize("( ) [ ] { } , : ;");
            assert!(tokens
                .iter()
                .all(|t| t.token_type == TokenType::Character));
        }

        #[test]
        fn should_split_adjacent_tokens() {
            assert_eq!(token_texts("a+b"), vec!["a", "+", "b"]);
            assert_eq!(token_texts("x===y"), vec!["x", "===", "y"]);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn should_flag_unknown_characters() {
            let tokens = tokenize("a @ b");
            assert!(tokens[1].is_error());
            assert!(tokens[1].str_value.contains("invalid character"));
        }

        #[test]
        fn should_name_the_whole_expression_in_the_message() {
            let tokens = tokenize("x # y");
            assert!(tokens[1].str_value.contains("x # y"));
        }

        #[test]
        fn should_produce_nothing_for_blank_input() {
            assert!(tokenize("   ").is_empty());
            assert!(tokenize("").is_empty());
        }
    }
}
