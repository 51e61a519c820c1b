//! One parsed template rendered from many threads at once.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use ftlc::{Configuration, SimpleHash, Value};
use pretty_assertions::assert_eq;
use rayon::prelude::*;

#[test]
fn renders_share_the_template_but_not_their_state() {
    let config = Configuration::builder()
        .shared_variable("greeting", Value::from("Hi"))
        .build();
    let template = config
        .parse(
            "t.ftl",
            "<#assign total = 0><#list 1..n as i><#assign total += i></#list>\
             ${greeting} ${n}: ${total?c}",
        )
        .unwrap();

    let outputs: Vec<String> = (1..=64i64)
        .into_par_iter()
        .map(|n| {
            let mut model = SimpleHash::new();
            model.insert("n", Value::from(n));
            template.render_to_string(Value::hash(model)).unwrap()
        })
        .collect();

    for (n, output) in (1..=64i64).zip(&outputs) {
        assert_eq!(output, &format!("Hi {n}: {}", n * (n + 1) / 2));
    }
}

#[test]
fn failures_stay_in_their_own_render() {
    let template = Configuration::default()
        .parse("t.ftl", "<#if fail>${missing}</#if>ok")
        .unwrap();
    let results: Vec<bool> = (0..32)
        .into_par_iter()
        .map(|i| {
            let mut model = SimpleHash::new();
            model.insert("fail", Value::Boolean(i % 2 == 0));
            template.render_to_string(Value::hash(model)).is_ok()
        })
        .collect();
    for (i, ok) in results.into_iter().enumerate() {
        assert_eq!(ok, i % 2 == 1);
    }
}
