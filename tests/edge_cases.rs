use rule_ast::{
    decode, evaluate, field, parse_rule, tokenize, Ast, ComparisonType, Document, DocumentError,
    EvalError, Node, Operator, ParseError, Record, RecordError, RuleEngine, Token, Value,
    MAX_DEPTH,
};
use serde_json::json;

const NESTED_RULE: &str = "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)";

fn employee(age: i64, department: &str, salary: i64, experience: i64) -> Record {
    Record::new()
        .set("age", age)
        .set("department", department)
        .set("salary", salary)
        .set("experience", experience)
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[test]
fn tokenize_nested_rule() {
    let texts: Vec<&str> = tokenize(NESTED_RULE).iter().map(Token::as_str).collect();
    assert_eq!(
        texts,
        [
            "(", "(", "age", ">", "30", "AND", "department", "=", "Sales", ")", "OR", "(", "age",
            "<", "25", "AND", "department", "=", "Marketing", ")", ")", "AND", "(", "salary", ">",
            "50000", "OR", "experience", ">", "5", ")",
        ]
    );
}

#[test]
fn tokenize_keeps_spaces_inside_quotes() {
    let tokens = tokenize("team = 'Field Sales'");
    assert_eq!(tokens[2], Token::Quoted("Field Sales"));
}

#[test]
fn tokenize_blank_is_empty() {
    assert!(tokenize("").is_empty());
    assert!(tokenize(" \t\n ").is_empty());
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[test]
fn and_binds_tighter_than_or() {
    let node = parse_rule("a = 1 OR b = 2 AND c = 3").unwrap();
    assert_eq!(
        node,
        field("a").eq(1).or(field("b").eq(2).and(field("c").eq(3)))
    );
}

#[test]
fn same_operator_is_left_associative() {
    let node = parse_rule("a = 1 OR b = 2 OR c = 3").unwrap();
    assert_eq!(
        node,
        field("a").eq(1).or(field("b").eq(2)).or(field("c").eq(3))
    );
}

#[test]
fn literal_typing() {
    let conds = |text: &str| -> Vec<Value> {
        parse_rule(text)
            .unwrap()
            .conditions()
            .into_iter()
            .map(|c| c.rvalue.clone())
            .collect()
    };
    assert_eq!(
        conds("a = 30 AND b = -4 AND c = 2.5 AND d = '30' AND e = Sales"),
        vec![
            Value::Int(30),
            Value::Int(-4),
            Value::Float(2.5),
            Value::String("30".into()),
            Value::String("Sales".into()),
        ]
    );
}

#[test]
fn keywords_are_case_sensitive() {
    // lowercase `and` is not a connective, so the rule has trailing tokens
    let err = parse_rule("a = 1 and b = 2").unwrap_err();
    assert!(matches!(err, ParseError::TrailingTokens { ref found, position: 3 } if found == "and"));
}

#[test]
fn syntax_errors() {
    assert_eq!(
        parse_rule("").unwrap_err(),
        ParseError::UnexpectedEnd {
            expected: "identifier"
        }
    );
    assert_eq!(
        parse_rule("(age > 30").unwrap_err(),
        ParseError::UnmatchedParen { position: 0 }
    );
    assert_eq!(
        parse_rule("age > 30)").unwrap_err(),
        ParseError::TrailingTokens {
            found: ")".into(),
            position: 3
        }
    );
    assert_eq!(
        parse_rule("age ~ 30").unwrap_err(),
        ParseError::UnknownComparator {
            found: "~".into(),
            position: 1
        }
    );
    assert_eq!(
        parse_rule("age > 30 AND").unwrap_err(),
        ParseError::UnexpectedEnd {
            expected: "identifier"
        }
    );
    assert!(matches!(
        parse_rule("age >").unwrap_err(),
        ParseError::UnexpectedEnd { expected: "literal" }
    ));
    assert!(matches!(
        parse_rule("AND = 1").unwrap_err(),
        ParseError::UnexpectedToken { position: 0, .. }
    ));
}

#[test]
fn syntax_error_message() {
    let err = parse_rule("(age > 30").unwrap_err();
    assert!(err.to_string().starts_with("syntax error:"));
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[test]
fn and_or_truth_tables() {
    let and = field("age").gt(30).and(field("salary").gt(50000));
    let or = field("age").gt(30).or(field("salary").gt(50000));

    let cases = [
        (35, 60000, true, true),
        (35, 40000, false, true),
        (25, 40000, false, false),
    ];
    for (age, salary, and_expected, or_expected) in cases {
        let record = Record::new().set("age", age).set("salary", salary);
        assert_eq!(evaluate(&and, &record), Ok(and_expected), "AND for {age}/{salary}");
        assert_eq!(evaluate(&or, &record), Ok(or_expected), "OR for {age}/{salary}");
    }
}

#[test]
fn nested_rule_evaluation() {
    let ast = Ast::create_rule(NESTED_RULE).unwrap();
    assert_eq!(ast.evaluate_rule(&employee(35, "Sales", 60000, 3)), Ok(true));
    assert_eq!(ast.evaluate_rule(&employee(22, "Marketing", 40000, 8)), Ok(true));
    assert_eq!(ast.evaluate_rule(&employee(35, "Marketing", 60000, 8)), Ok(false));
    assert_eq!(ast.evaluate_rule(&employee(35, "Sales", 40000, 2)), Ok(false));
}

// The OR-of-OR rule is satisfied by `salary > 50000`; plain boolean semantics
// give true here.
#[test]
fn or_of_or_rule_is_true_when_salary_clause_holds() {
    let ast = Ast::create_rule(
        "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) OR (salary > 50000 OR experience > 5)",
    )
    .unwrap();
    assert_eq!(ast.evaluate_rule(&employee(35, "Sales", 60000, 3)), Ok(true));
    assert_eq!(ast.evaluate_rule(&employee(28, "HR", 40000, 3)), Ok(false));
}

#[test]
fn missing_field_is_reported_even_when_other_side_decides() {
    // both children are evaluated, so the missing field surfaces
    let node = field("age").gt(30).or(field("salary").gt(50000));
    let record = Record::new().set("age", 35);
    assert_eq!(
        evaluate(&node, &record),
        Err(EvalError::MissingField {
            field: "salary".into()
        })
    );
}

#[test]
fn type_mismatch_is_an_error() {
    let node = parse_rule("age > 'thirty'").unwrap();
    let record = Record::new().set("age", 35);
    assert_eq!(
        evaluate(&node, &record),
        Err(EvalError::TypeMismatch {
            field: "age".into(),
            expected: "string",
            found: "number",
        })
    );
}

#[test]
fn int_and_float_compare_numerically() {
    let node = parse_rule("salary >= 50000").unwrap();
    assert_eq!(
        evaluate(&node, &Record::new().set("salary", 50000.0)),
        Ok(true)
    );
    let node = parse_rule("salary < 50000.5").unwrap();
    assert_eq!(evaluate(&node, &Record::new().set("salary", 50000)), Ok(true));
}

#[test]
fn strings_compare_lexicographically() {
    let node = Node::from(rule_ast::Condition::new(
        "department",
        ComparisonType::Lt,
        "Marketing",
    ));
    assert_eq!(
        evaluate(&node, &Record::new().set("department", "HR")),
        Ok(true)
    );
}

#[test]
fn empty_combination_cannot_be_evaluated() {
    let rules: [&str; 0] = [];
    let ast = Ast::combine(&rules, Operator::And).unwrap();
    assert!(ast.is_empty());
    assert_eq!(ast.evaluate_rule(&Record::new()), Err(EvalError::EmptyRule));
}

// ---------------------------------------------------------------------------
// Records from JSON
// ---------------------------------------------------------------------------

#[test]
fn record_from_json_evaluates() {
    let record = Record::from_json(json!({
        "age": 35,
        "department": "Sales",
        "salary": 60000.0,
        "experience": 3,
    }))
    .unwrap();
    let ast = Ast::create_rule(NESTED_RULE).unwrap();
    assert_eq!(ast.evaluate_rule(&record), Ok(true));
}

#[test]
fn record_from_json_rejects_non_scalars() {
    assert_eq!(
        Record::from_json(json!([1, 2])).unwrap_err(),
        RecordError::NotAnObject
    );
    assert_eq!(
        Record::from_json(json!({ "active": true })).unwrap_err(),
        RecordError::UnsupportedValue {
            field: "active".into(),
            kind: "boolean"
        }
    );
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[test]
fn operand_with_operator_tag_fails_to_decode() {
    let doc = Document::from_json_value(json!({
        "node_type": "operand",
        "left": null,
        "right": null,
        "value": "OROperator",
    }))
    .unwrap();
    assert!(matches!(decode(&doc), Err(DocumentError::Malformed { .. })));
}

#[test]
fn empty_ast_is_json_null() {
    assert_eq!(Ast::empty().to_json_string().unwrap(), "null");
    assert!(Ast::from_json_str("null").unwrap().is_empty());
}

#[test]
fn nested_rule_json_round_trip() {
    let ast = Ast::create_rule(NESTED_RULE).unwrap();
    let text = ast.to_json_string().unwrap();
    let restored = Ast::from_json_str(&text).unwrap();
    assert_eq!(restored, ast);
    assert_eq!(
        restored.evaluate_rule(&employee(35, "Sales", 60000, 3)),
        Ok(true)
    );
}

// ---------------------------------------------------------------------------
// Depth limit
//
// Every tree that parses, combines or builds into a writable document reads
// back from its JSON text.
// ---------------------------------------------------------------------------

#[test]
fn long_conjunction_is_rejected_at_parse() {
    let text = vec!["age > 30"; 200].join(" AND ");
    assert!(matches!(
        parse_rule(&text),
        Err(ParseError::TooDeep { max: MAX_DEPTH, .. })
    ));
    assert!(matches!(
        Ast::create_rule(&text),
        Err(ParseError::TooDeep { .. })
    ));
}

#[test]
fn longest_accepted_conjunction_round_trips_through_json() {
    let text = vec!["age > 30"; MAX_DEPTH].join(" AND ");
    let ast = Ast::create_rule(&text).unwrap();
    let json = ast.to_json_string().unwrap();
    let restored = Ast::from_json_str(&json).unwrap();
    assert_eq!(restored, ast);
    assert_eq!(restored.evaluate_rule(&Record::new().set("age", 31)), Ok(true));
}

#[test]
fn combining_many_rules_is_rejected() {
    let rules = vec!["age > 30".to_owned(); 200];
    let engine = RuleEngine::in_memory();
    let err = engine.combine_rules(&rules).unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(
        Ast::combine(&rules, Operator::Or),
        Err(ParseError::CombinedTooDeep { max: MAX_DEPTH, .. })
    ));

    let doc = engine.combine_rules(&rules[..MAX_DEPTH]).unwrap().unwrap();
    let json = doc.to_json_string().unwrap();
    assert_eq!(Document::from_json_str(&json).unwrap(), doc);
}

#[test]
fn built_tree_too_deep_to_write() {
    let node = (0..200).fold(field("age").gt(0), |acc, i| acc.and(field("age").gt(i)));
    let ast = Ast::new(node.clone());
    assert!(matches!(
        ast.to_json_string(),
        Err(DocumentError::TooDeep { depth: 201, max: MAX_DEPTH })
    ));
    assert_eq!(evaluate(&node, &Record::new().set("age", 500)), Ok(true));
}

#[test]
fn non_finite_value_is_not_written() {
    let ast = Ast::new(field("ratio").eq(f64::NAN));
    assert!(matches!(
        ast.to_json_string(),
        Err(DocumentError::NonFinite { ref field }) if field == "ratio"
    ));
}
