use std::cmp::Ordering;

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::types::AppOption;

/// Turns a raw `app/list` response into sorted app options. The list may sit
/// under `result.data` or `data`; anything that is not an array yields nothing.
pub fn normalize_apps_response(response: &Value) -> Vec<AppOption> {
    let data = non_null(response.get("result").and_then(|result| result.get("data")))
        .or_else(|| non_null(response.get("data")));
    let Some(items) = data.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut apps: Vec<AppOption> = items.iter().map(normalize_app).collect();
    apps.sort_by(compare_apps);
    apps
}

fn normalize_app(item: &Value) -> AppOption {
    AppOption {
        id: loose_string(non_null(item.get("id"))),
        name: loose_string(non_null(item.get("name"))),
        description: truthy_string(item.get("description")),
        is_accessible: field(item, "isAccessible", "is_accessible").is_some_and(truthy),
        install_url: truthy_string(item.get("installUrl"))
            .or_else(|| truthy_string(item.get("install_url"))),
        distribution_channel: truthy_string(item.get("distributionChannel"))
            .or_else(|| truthy_string(item.get("distribution_channel"))),
    }
}

/// Accessible apps first, then by name ignoring case and accents.
pub fn compare_apps(a: &AppOption, b: &AppOption) -> Ordering {
    b.is_accessible
        .cmp(&a.is_accessible)
        .then_with(|| compare_names(&a.name, &b.name))
}

/// Base letters first, then accents, then case with lowercase ahead.
fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded_case(a).cmp(folded_case(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    folded_case(name).filter(|ch| !is_combining_mark(*ch))
}

fn folded_case(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

fn field<'a>(item: &'a Value, camel: &str, snake: &str) -> Option<&'a Value> {
    non_null(item.get(camel)).or_else(|| non_null(item.get(snake)))
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn truthy_string(value: Option<&Value>) -> Option<String> {
    value
        .filter(|value| truthy(value))
        .map(|value| loose_string(Some(value)))
}

fn loose_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_nested_result_data_first() {
        let apps = normalize_apps_response(&json!({
            "result": { "data": [{ "id": "a", "name": "Nested" }] },
            "data": [{ "id": "b", "name": "Flat" }]
        }));
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "Nested");

        let apps = normalize_apps_response(&json!({
            "result": { "data": null },
            "data": [{ "id": "b", "name": "Flat" }]
        }));
        assert_eq!(apps[0].name, "Flat");
    }

    #[test]
    fn non_array_payloads_yield_nothing() {
        assert!(normalize_apps_response(&json!({ "data": { "id": "x" } })).is_empty());
        assert!(normalize_apps_response(&json!(null)).is_empty());
        assert!(normalize_apps_response(&json!("apps")).is_empty());
    }

    #[test]
    fn accepts_snake_and_camel_case_fields() {
        let apps = normalize_apps_response(&json!({
            "data": [
                {
                    "id": "snake",
                    "name": "Snake",
                    "is_accessible": true,
                    "install_url": "https://example.com/snake",
                    "distribution_channel": "store"
                },
                {
                    "id": 42,
                    "name": "Camel",
                    "description": "",
                    "isAccessible": 0,
                    "installUrl": "https://example.com/camel",
                    "distributionChannel": "beta"
                }
            ]
        }));

        assert_eq!(
            apps[0],
            AppOption {
                id: "snake".to_string(),
                name: "Snake".to_string(),
                description: None,
                is_accessible: true,
                install_url: Some("https://example.com/snake".to_string()),
                distribution_channel: Some("store".to_string()),
            }
        );
        assert_eq!(apps[1].id, "42");
        assert!(!apps[1].is_accessible);
        assert_eq!(apps[1].description, None);
        assert_eq!(apps[1].install_url.as_deref(), Some("https://example.com/camel"));
        assert_eq!(apps[1].distribution_channel.as_deref(), Some("beta"));
    }

    #[test]
    fn camel_case_flag_wins_when_present() {
        let apps = normalize_apps_response(&json!({
            "data": [{ "id": "a", "name": "A", "isAccessible": false, "is_accessible": true }]
        }));
        assert!(!apps[0].is_accessible);

        let apps = normalize_apps_response(&json!({
            "data": [{ "id": "a", "name": "A", "isAccessible": null, "is_accessible": true }]
        }));
        assert!(apps[0].is_accessible);
    }

    #[test]
    fn sorts_accessible_first_then_by_name() {
        let apps = normalize_apps_response(&json!({
            "data": [
                { "id": "1", "name": "zeta", "isAccessible": false },
                { "id": "2", "name": "Beta", "isAccessible": true },
                { "id": "3", "name": "alpha", "isAccessible": false },
                { "id": "4", "name": "delta", "isAccessible": true },
                { "id": "5", "name": "Alpha", "isAccessible": false }
            ]
        }));
        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "delta", "alpha", "Alpha", "zeta"]);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let apps = normalize_apps_response(&json!({
            "data": [
                { "id": "1", "name": "Zeta" },
                { "id": "2", "name": "Éclair" },
                { "id": "3", "name": "eagle" },
                { "id": "4", "name": "eclair" },
                { "id": "5", "name": "Ångström" }
            ]
        }));
        let names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
        assert_eq!(names, vec!["Ångström", "eagle", "eclair", "Éclair", "Zeta"]);
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let apps = normalize_apps_response(&json!({ "data": [null, { "name": "No id" }] }));
        assert_eq!(apps.len(), 2);
        assert!(apps.iter().any(|app| app.id.is_empty() && app.name.is_empty()));
        assert!(apps.iter().any(|app| app.id.is_empty() && app.name == "No id"));
    }
}
