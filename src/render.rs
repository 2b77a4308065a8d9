//! Turning API replies into HTML fragments or printable text.
//!
//! Profile actions answer with a one-element array wrapping an object, login
//! actions with a bare object; both shapes are accepted. A truthy `status`
//! in the reply short-circuits rendering: the caller gets the service's
//! message instead of a table.

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::request::{ApiRequest, ParamValue};

pub const UNKNOWN_DATE: &str = "0000-00-00";
pub const UNKNOWN_YEAR: &str = "?";
pub const WIKI_URL: &str = "https://www.wikitree.com/wiki/";

const PARENT_BULLET: &str = "https://www.wikitree.com/images/icons/pedigree.gif";
const CHILD_BULLET: &str = "https://www.wikitree.com/images/icons/descendant-link.gif";

/// Fields mapping a profile id to a nested profile summary.
const RELATIVE_FIELDS: [&str; 4] = ["Parents", "Children", "Siblings", "Spouses"];

const JS_ALWAYS_LISTED: [&str; 2] = ["key", "fields"];

pub fn parse_reply(json: &str) -> ApiResult<Value> {
    serde_json::from_str(json).map_err(|err| ApiError::Response(format!("reply is not JSON: {err}")))
}

pub fn unwrap_reply(value: &Value) -> ApiResult<&Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => match items.first() {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(ApiError::Response(
                "first element of the reply is not an object".to_string(),
            )),
            None => Err(ApiError::Response("reply array is empty".to_string())),
        },
        _ => Err(ApiError::Response(
            "reply is neither an object nor an array".to_string(),
        )),
    }
}

/// The reply's `status` text when it reports a failure.
///
/// Successful replies carry `0` or an empty string, so those (and `"0"`,
/// `false`, `null`) count as no status.
pub fn status_message(reply: &Map<String, Value>) -> Option<String> {
    match reply.get("status")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() || text == "0" => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

pub fn check_status(reply: &Map<String, Value>) -> ApiResult<()> {
    match status_message(reply) {
        Some(status) => {
            tracing::warn!(%status, "API reported an error");
            Err(ApiError::Application(status))
        }
        None => Ok(()),
    }
}

/// The profile object of a reply (`person` for getPerson, `profile` for getProfile).
pub fn profile_of(reply: &Map<String, Value>) -> ApiResult<&Map<String, Value>> {
    ["person", "profile"]
        .iter()
        .find_map(|key| reply.get(*key).and_then(Value::as_object))
        .ok_or_else(|| ApiError::Response("reply carries no person or profile".to_string()))
}

/// Parses, unwraps and status-checks a reply in one go.
pub fn with_reply<T>(json: &str, f: impl FnOnce(&Map<String, Value>) -> ApiResult<T>) -> ApiResult<T> {
    let value = parse_reply(json)?;
    let reply = unwrap_reply(&value)?;
    check_status(reply)?;
    f(reply)
}

/// Four-digit year of a `YYYY-MM-DD` date, or `?` when unknown.
pub fn life_year(date: Option<&str>) -> &str {
    match date {
        Some(date) if !date.is_empty() && date != UNKNOWN_DATE => date.get(..4).unwrap_or(date),
        _ => UNKNOWN_YEAR,
    }
}

fn is_known_date(date: Option<&str>) -> bool {
    matches!(date, Some(date) if !date.is_empty() && date != UNKNOWN_DATE)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

/// Key/value entries of a container; arrays are keyed by index.
fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Error text in place of the output, the way every page shows failures.
fn or_message(result: ApiResult<String>) -> String {
    result.unwrap_or_else(|err| escape_html(&err.to_string()))
}

/// Field/value table for a `getPerson`/`getProfile` reply.
pub fn render_html(json: &str) -> String {
    or_message(try_render_html(json))
}

pub fn try_render_html(json: &str) -> ApiResult<String> {
    with_reply(json, |reply| {
        let person = profile_of(reply)?;
        let mut html = String::from("WikiTree API Result<br>");
        if let Some(page_name) = reply.get("page_name") {
            let _ = write!(
                html,
                "Retrieved Profile for: page_name={}<br>",
                escape_html(&scalar_text(page_name))
            );
        }
        if let (Some(long_name), Some(name)) =
            (str_field(person, "LongName"), str_field(person, "Name"))
        {
            let _ = write!(
                html,
                "The derived \"long\" name, linked to the WikiTree profile page is: <a href=\"{}{}\">{}</a><br>",
                WIKI_URL,
                escape_html(name),
                escape_html(long_name)
            );
        }

        html.push_str("<table><thead><tr><th>Field</th><th>Value</th></tr></thead><tbody>");
        for (field, value) in person {
            let cell = if RELATIVE_FIELDS.contains(&field.as_str()) {
                relatives_cell(value)
            } else if value.is_object() || value.is_array() {
                nested_cell(value)
            } else {
                escape_html(&scalar_text(value))
            };
            let _ = write!(html, "<tr><td>{}</td><td>{}</td></tr>", escape_html(field), cell);
        }
        html.push_str("</tbody></table>");
        Ok(html)
    })
}

fn relatives_cell(value: &Value) -> String {
    let mut html = String::new();
    for (id, relative) in entries(value) {
        let name = match relative {
            Value::Object(map) => map.get("Name").map(scalar_text).unwrap_or_default(),
            other => scalar_text(other),
        };
        let _ = write!(html, "{}: {}<br>", escape_html(&id), escape_html(&name));
    }
    html
}

fn nested_cell(value: &Value) -> String {
    let mut html = String::new();
    for (key, inner) in entries(value) {
        if inner.is_object() || inner.is_array() {
            let _ = write!(
                html,
                "{} =<div style=\"margin-left:1em\">{}</div>",
                escape_html(&key),
                nested_cell(inner)
            );
        } else {
            let _ = write!(
                html,
                "{} = {}<br>",
                escape_html(&key),
                escape_html(&scalar_text(inner))
            );
        }
    }
    html
}

/// Linked name with `(birth - death)` years, as shown in the edit-family box.
pub fn render_person_summary(person: &Map<String, Value>) -> String {
    let name = person.get("Name").map(scalar_text).unwrap_or_default();
    let first_name = person.get("FirstName").map(scalar_text).unwrap_or_default();
    let birth = str_field(person, "BirthDate");
    let death = str_field(person, "DeathDate");

    let mut html = format!(
        "<a href=\"{}{}\" target=\"_new\">{} {}</a>",
        WIKI_URL,
        escape_html(&name),
        escape_html(&first_name),
        escape_html(&name)
    );
    if is_known_date(birth) || is_known_date(death) {
        let _ = write!(
            html,
            " ({} - {}) ",
            escape_html(life_year(birth)),
            escape_html(life_year(death))
        );
    }
    format!("<span style='white-space:nowrap;'>{html}</span>")
}

/// Edited person in bold, then one bulleted line per parent and child.
pub fn render_reference_box(json: &str) -> String {
    or_message(try_render_reference_box(json))
}

pub fn try_render_reference_box(json: &str) -> ApiResult<String> {
    with_reply(json, |reply| {
        let person = profile_of(reply)?;
        let mut html = format!("<b>{}</b><br>", render_person_summary(person));
        for (field, bullet) in [("Parents", PARENT_BULLET), ("Children", CHILD_BULLET)] {
            let Some(relatives) = person.get(field) else {
                continue;
            };
            for (_, relative) in entries(relatives) {
                if let Value::Object(relative) = relative {
                    let _ = write!(
                        html,
                        "<img class=\"fauxBullet\" src=\"{bullet}\">{}<br>",
                        render_person_summary(relative)
                    );
                }
            }
        }
        Ok(html)
    })
}

/// Indented `key: value` listing of the whole reply, for terminals.
/// Unknown dates print as `?`.
pub fn render_text(json: &str) -> String {
    try_render_text(json).unwrap_or_else(|err| err.to_string())
}

pub fn try_render_text(json: &str) -> ApiResult<String> {
    with_reply(json, |reply| {
        let mut out = String::new();
        write_text(&mut out, reply.iter().map(|(k, v)| (k.clone(), v)).collect(), 0);
        Ok(out)
    })
}

fn write_text(out: &mut String, items: Vec<(String, &Value)>, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, value) in items {
        match value {
            Value::Object(map) if map.is_empty() => {
                let _ = writeln!(out, "{indent}{key}: {{}}");
            }
            Value::Array(list) if list.is_empty() => {
                let _ = writeln!(out, "{indent}{key}: []");
            }
            Value::Object(_) | Value::Array(_) => {
                let _ = writeln!(out, "{indent}{key}:");
                write_text(out, entries(value), depth + 1);
            }
            Value::String(date) if date == UNKNOWN_DATE => {
                let _ = writeln!(out, "{indent}{key}: {UNKNOWN_YEAR}");
            }
            scalar => {
                let _ = writeln!(out, "{indent}{key}: {}", scalar_text(scalar));
            }
        }
    }
}

/// Indented JSON; text that does not parse is returned unchanged.
pub fn pretty_json(json: &str) -> String {
    serde_json::from_str::<Value>(json)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| json.to_string())
}

/// jQuery snippet issuing `request`, for documentation pages.
///
/// `key` and `fields` are always listed; other parameters only when set
/// (non-empty text, a true flag, any number).
pub fn render_js_example(endpoint: &str, request: &ApiRequest) -> String {
    let mut data = format!("        action: '{}',\n", js_escape(request.action()));
    for name in JS_ALWAYS_LISTED {
        match request.get(name) {
            Some(value) => write_js_param(&mut data, name, value),
            None => {
                let _ = writeln!(data, "        {name}: '',");
            }
        }
    }
    for (name, value) in request.params() {
        if JS_ALWAYS_LISTED.contains(&name) {
            continue;
        }
        match value {
            ParamValue::Text(text) if text.is_empty() => {}
            ParamValue::Flag(false) => {}
            other => write_js_param(&mut data, name, other),
        }
    }
    format!(
        "$.ajax({{\n    url: '{}',\n    xhrFields: {{ withCredentials: true }},\n    type: 'POST',\n    dataType: 'json',\n    data: {{\n{data}    }}\n}}).then((response) => {{\n    // Process the response data here\n}});\n",
        js_escape(endpoint)
    )
}

fn write_js_param(data: &mut String, name: &str, value: &ParamValue) {
    let _ = match value {
        ParamValue::Text(text) => writeln!(data, "        {name}: '{}',", js_escape(text)),
        other => writeln!(data, "        {name}: {other},"),
    };
}

fn js_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}
