//! Data-driven tests for first-match evaluation over the built-in rules

use discount_rules::{Conditions, Error, Evaluator, FormInput, KnowledgeBase, MemoryStore, Query};
use discount_rules::form::render;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn evaluator() -> Evaluator {
    Evaluator::from_knowledge_base(&KnowledgeBase::builtin()).unwrap()
}

// ============================================================================
// Built-in knowledge base
// ============================================================================

#[rstest]
#[case("alto", "alta", true, Some("20% de descuento"))]
#[case("alto", "baja", true, Some("15% de descuento"))]
#[case("bajo", "alta", true, Some("10% de descuento"))]
#[case("bajo", "baja", false, Some("5% de descuento"))]
#[case("bajo", "alta", false, None)]
#[case("alto", "alta", false, None)]
#[case("medio", "alta", true, None)]
#[case("", "", false, None)]
fn test_builtin_rules(
    evaluator: Evaluator,
    #[case] monto: &str,
    #[case] frecuencia: &str,
    #[case] miembro: bool,
    #[case] expected: Option<&str>,
) {
    let result = evaluator
        .evaluate(&Query::new(monto, frecuencia, miembro))
        .unwrap();
    assert_eq!(result.as_deref(), expected);
}

// ============================================================================
// Form coercion feeding the evaluator
// ============================================================================

#[rstest]
#[case(" ALTO ", "Alta", "True", "Resultado: 20% de descuento")]
#[case("bajo", "BAJA", "false", "Resultado: 5% de descuento")]
#[case("bajo", "baja", "no", "Resultado: 5% de descuento")]
#[case("bajo", "alta", "False", "Resultado: None")]
#[case("alto", "alta", "yes", "Resultado: None")]
fn test_form_round_trip(
    evaluator: Evaluator,
    #[case] monto: &str,
    #[case] frecuencia: &str,
    #[case] miembro: &str,
    #[case] expected: &str,
) {
    let query = FormInput::new(monto, frecuencia, miembro).to_query();
    assert_eq!(render(&evaluator.evaluate(&query)), expected);
}

// ============================================================================
// Untyped queries
// ============================================================================

#[rstest]
fn test_non_mapping_query_is_an_error_not_a_panic(evaluator: Evaluator) {
    let outcome = evaluator.evaluate_value(&json!("not a dict"));
    assert!(matches!(outcome, Err(Error::InvalidQuery(_))));
    assert!(render(&outcome).starts_with("Error: Invalid query"));
}

#[rstest]
#[case(json!({"monto_compra": "alto", "frecuencia": "alta", "miembro": true}), Some("20% de descuento"))]
#[case(json!({"monto_compra": "alto", "frecuencia": "alta"}), None)]
#[case(json!({"monto_compra": "alto", "frecuencia": "alta", "miembro": "true"}), None)]
#[case(json!({"monto_compra": "alto", "frecuencia": "alta", "miembro": 1}), None)]
#[case(json!({"monto_compra": true, "frecuencia": "alta", "miembro": true}), None)]
fn test_untyped_query(
    evaluator: Evaluator,
    #[case] query: serde_json::Value,
    #[case] expected: Option<&str>,
) {
    assert_eq!(evaluator.evaluate_value(&query).unwrap().as_deref(), expected);
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_first_inserted_wins_for_identical_conditions() {
    let mut evaluator = Evaluator::new(MemoryStore::new());
    let conditions = Conditions::new("alto", "alta", true);
    evaluator.add_rule(conditions.clone(), "primero").unwrap();
    evaluator.add_rule(conditions.clone(), "segundo").unwrap();

    let query = Query::from(conditions);
    assert_eq!(evaluator.evaluate(&query).unwrap().as_deref(), Some("primero"));

    let m = evaluator.evaluate_detailed(&query).unwrap().unwrap();
    assert_eq!(m.position, 0);
}

#[test]
fn test_later_rule_reachable_when_earlier_differs() {
    let mut evaluator = Evaluator::new(MemoryStore::new());
    evaluator
        .add_rule(Conditions::new("alto", "alta", true), "a")
        .unwrap();
    evaluator
        .add_rule(Conditions::new("alto", "alta", false), "b")
        .unwrap();

    let m = evaluator
        .evaluate_detailed(&Query::new("alto", "alta", false))
        .unwrap()
        .unwrap();
    assert_eq!(m.position, 1);
    assert_eq!(m.resultado(), "b");
}
