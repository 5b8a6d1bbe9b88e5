use std::sync::Arc;
use std::thread;

use rule_ast::{Ast, Record};

fn main() {
    let ast = Arc::new(
        Ast::create_rule("age >= 18 AND department = 'Sales'").expect("failed to parse rule"),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ast = Arc::clone(&ast);
            thread::spawn(move || {
                let age = 16_i64 + i64::from(i);
                let record = Record::new().set("age", age).set("department", "Sales");
                let result = ast.evaluate_rule(&record);
                (age, result)
            })
        })
        .collect();

    for handle in handles {
        let (age, result) = handle.join().expect("thread panicked");
        match result {
            Ok(result) => println!("age={age}: {result}"),
            Err(e) => println!("age={age}: {e}"),
        }
    }
}
