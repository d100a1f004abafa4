use super::*;

#[test]
fn test_json_to_minijinja_value() {
    let json = serde_json::json!({
        "string": "hello",
        "number": 42,
        "bool": true,
        "array": [1, 2, 3]
    });

    let value = json_to_minijinja_value(&json);
    assert_eq!(value.get_attr("number").unwrap(), Value::from(42));
    assert_eq!(value.get_attr("string").unwrap().as_str(), Some("hello"));
    assert!(value.get_attr("bool").unwrap().is_true());
    assert_eq!(value.get_attr("array").unwrap().len(), Some(3));
}

#[test]
fn test_variables_fn_missing_is_none() {
    let mut vars = Variables::new();
    vars.insert("env".to_string(), serde_json::json!("prod"));
    let lookup = make_variables_fn(Arc::new(vars));

    assert_eq!(lookup("env").as_str(), Some("prod"));
    assert!(lookup("missing").is_none());
}

#[test]
fn test_env_var_fn_default() {
    let env_var = make_env_var_fn();
    let value = env_var("TB_JINJA_TEST_SURELY_UNSET", Some(Value::from("fallback"))).unwrap();
    assert_eq!(value, "fallback");

    let empty = env_var("TB_JINJA_TEST_SURELY_UNSET", None).unwrap();
    assert_eq!(empty, "");
}
