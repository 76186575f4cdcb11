//! Typing preference values for `defaults write`

use serde_json::{Number, Value};

/// Interpret a command-line value the way `defaults` would store it
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "YES" | "yes" | "TRUE" | "true" => return Value::Bool(true),
        "NO" | "no" | "FALSE" | "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(float) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(float);
    }
    Value::String(raw.to_string())
}

/// Arguments after `defaults write DOMAIN KEY` for a stored value
#[must_use]
pub fn write_args(value: &Value) -> Vec<String> {
    let (kind, text) = match value {
        Value::Bool(flag) => ("-bool", if *flag { "true" } else { "false" }.to_string()),
        Value::Number(number) if number.is_f64() => ("-float", number.to_string()),
        Value::Number(number) => ("-int", number.to_string()),
        Value::String(text) => ("-string", text.clone()),
        other => ("-string", other.to_string()),
    };
    vec![kind.to_string(), text]
}
