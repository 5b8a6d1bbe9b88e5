use rule_ast::{Record, RuleEngine, RuleId};

fn main() {
    let engine = RuleEngine::in_memory();

    let (seniors, doc) = engine
        .create_rule("sales_seniors", "age > 30 AND department = 'Sales'")
        .expect("failed to create rule");
    println!(
        "created rule {seniors}: {}",
        doc.to_json_string().expect("failed to encode document")
    );

    let (earners, _) = engine
        .create_rule("high_earners", "salary > 50000 OR experience > 5")
        .expect("failed to create rule");

    if let Some(doc) = engine
        .combine_rules(&["age > 30", "salary > 50000"])
        .expect("failed to combine rules")
    {
        println!("combined: {}", doc.to_json_string().expect("failed to encode document"));
    }

    let record = Record::from_json(serde_json::json!({
        "age": 35,
        "department": "Sales",
        "salary": 40000,
        "experience": 3,
    }))
    .expect("invalid record");

    for id in [seniors, earners, RuleId::new(99)] {
        match engine.evaluate_rule(id, &record) {
            Ok(result) => println!("rule {id}: {result}"),
            Err(e) if e.is_not_found() => println!("rule {id}: not found"),
            Err(e) => println!("rule {id}: {e}"),
        }
    }

    // A record missing a referenced field is a caller error
    let partial = Record::new().set("age", 35);
    if let Err(e) = engine.evaluate_rule(seniors, &partial) {
        println!("rule {seniors}: {e} (client error: {})", e.is_client_error());
    }
}
