use rule_ast::{Ast, Operator, Record};

fn main() {
    // Parse a rule
    let ast = Ast::create_rule(
        "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)",
    )
    .expect("failed to parse rule");

    println!("{ast}");

    // Evaluate against a record
    let record = Record::new()
        .set("age", 35)
        .set("department", "Sales")
        .set("salary", 60000)
        .set("experience", 3);

    match ast.evaluate_rule(&record) {
        Ok(result) => println!("Result: {result}"),
        Err(e) => println!("Evaluation failed: {e}"),
    }

    // Combine independent rules with OR
    let combined = Ast::combine(&["age < 25", "experience > 10"], Operator::Or)
        .expect("failed to combine rules");
    println!("{combined} -> {:?}", combined.evaluate_rule(&record));

    // Store and reload as JSON
    let json = ast.to_json_string().expect("failed to encode rule");
    println!("{json}");
    let restored = Ast::from_json_str(&json).expect("failed to decode rule");
    assert_eq!(restored, ast);
}
