use serde_json::json;

use statwox_core::models::question::QuestionOptions;

#[test]
fn choice_lists_deserialize() {
    let options: QuestionOptions = serde_json::from_value(json!(["A", "B"])).unwrap();
    assert_eq!(options.choices(), ["A".to_string(), "B".to_string()]);
}

#[test]
fn double_encoded_options_are_unwrapped() {
    let options: QuestionOptions = serde_json::from_value(json!("[\"A\",\"B\",\"C\"]")).unwrap();
    assert_eq!(options, QuestionOptions::Choices(vec!["A".into(), "B".into(), "C".into()]));

    let matrix: QuestionOptions =
        serde_json::from_value(json!("{\"rows\":[\"r1\"],\"columns\":[\"c1\",\"c2\"]}")).unwrap();
    assert!(matches!(matrix, QuestionOptions::Matrix { ref rows, .. } if rows.len() == 1));
    assert!(matrix.choices().is_empty());
}

#[test]
fn malformed_encoded_options_are_rejected() {
    assert!(serde_json::from_value::<QuestionOptions>(json!("not json")).is_err());
}

#[test]
fn options_serialize_without_wrapping() {
    let value = serde_json::to_value(QuestionOptions::Matrix {
        rows: vec!["r".into()],
        columns: vec!["c".into()],
    })
    .unwrap();
    assert_eq!(value, json!({"rows": ["r"], "columns": ["c"]}));
}
