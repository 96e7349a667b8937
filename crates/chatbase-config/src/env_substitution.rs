use chatbase_core::{ChatbaseError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::env;

// Matches ${VAR} and ${VAR:-default}
static ENV_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Recursively substitute environment variable references in a parsed
/// configuration value. Missing variables without a default are a
/// configuration error naming every unresolved variable.
pub fn substitute_env_vars(value: &mut Value) -> Result<()> {
    match value {
        Value::String(s) => {
            *s = substitute_in_string(s)?;
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                substitute_env_vars(v)?;
            }
        }
        Value::Array(arr) => {
            for v in arr.iter_mut() {
                substitute_env_vars(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn substitute_in_string(input: &str) -> Result<String> {
    let mut result = input.to_string();
    let mut missing_vars = Vec::new();

    for cap in ENV_VAR_REGEX.captures_iter(input) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default_value = cap.get(2).map(|m| m.as_str());

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => match default_value {
                Some(default) => {
                    result = result.replace(full_match, default);
                }
                None => missing_vars.push(var_name.to_string()),
            },
        }
    }

    if !missing_vars.is_empty() {
        return Err(ChatbaseError::Config(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}
