//! Server-rendered `getPerson` form: the page re-renders itself with the
//! results of the submitted lookup inlined.

use std::fmt::Write as _;

use serde::Deserialize;

use crate::api::WikiTreeClient;
use crate::render::{escape_html, pretty_json, render_html, render_js_example};
use crate::request::{ACTION_GET_PERSON, ProfileQuery};
use crate::session::Session;

pub const DEFAULT_KEY: &str = "Shoshone-1";
pub const DEFAULT_FIELDS: &str = "Id,PageId,Name,Derived.LongName,BirthDate,DeathDate";

const BIO_FORMATS: [&str; 3] = ["wiki", "html", "both"];

/// Fields posted by the form. Unchecked checkboxes and radios are simply absent.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FormInput {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fields: String,
    #[serde(default, rename = "bioFormat")]
    pub bio_format: Option<String>,
    #[serde(default, rename = "resolveRedirect")]
    pub resolve_redirect: Option<String>,
}

impl FormInput {
    pub fn to_query(&self) -> ProfileQuery {
        ProfileQuery::new(&self.key)
            .fields(&self.fields)
            .bio_format(self.bio_format.clone().unwrap_or_default())
            .resolve_redirect(self.resolve_redirect.as_deref().is_some_and(|v| !v.is_empty()))
    }
}

/// What the results section shows after a submission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormResult {
    pub html: String,
    pub json: String,
    pub example: String,
}

pub async fn lookup(client: &WikiTreeClient, input: &FormInput, session: Option<&Session>) -> FormResult {
    let query = input.to_query();
    let example = render_js_example(client.endpoint(), &query.to_request(ACTION_GET_PERSON));
    match client.get_person(&query, session).await {
        Ok(json) => FormResult {
            html: render_html(&json),
            json: format!("<pre>{}</pre>", escape_html(&pretty_json(&json))),
            example,
        },
        Err(err) => FormResult {
            html: escape_html(&err.to_string()),
            json: String::new(),
            example,
        },
    }
}

/// The whole page. `input` pre-fills the form; `result` is `None` before the
/// first submission.
pub fn render_page(input: Option<&FormInput>, result: Option<&FormResult>) -> String {
    let key = input.map_or(DEFAULT_KEY, |i| i.key.as_str());
    let fields = input.map_or(DEFAULT_FIELDS, |i| i.fields.as_str());
    let bio_format = input.and_then(|i| i.bio_format.as_deref()).unwrap_or("");
    let resolve = input.is_some_and(|i| i.to_query().resolve_redirect);

    let mut radios = String::new();
    for format in BIO_FORMATS {
        let checked = if format == bio_format { " checked" } else { "" };
        let _ = write!(
            radios,
            "<input type=\"radio\" name=\"bioFormat\" value=\"{format}\"{checked}> {format}\n"
        );
    }
    let resolve_checked = if resolve { " checked" } else { "" };
    let (result_html, result_json, example) = match result {
        Some(r) => (
            r.html.as_str(),
            r.json.as_str(),
            format!("<pre>{}</pre>", escape_html(&r.example)),
        ),
        None => ("", "", String::new()),
    };

    format!(
        r#"<html>
<head><title>WikiTree API | getPerson</title></head>
<body>
<article class="markdown-body">
<h1>getPerson</h1>
<form action="/" method="POST">
<p>
The "key" for getPerson is a WikiTree ID (e.g., Shoshone-1) or a User ID (e.g. 27351134).
Fields may be omitted for the default set, or "*" for all.
<table>
<tr><td>Key:</td><td><input type="text" id="key" name="key" value="{key}" size="20"></td></tr>
<tr><td>Fields:</td><td><input type="text" id="fields" name="fields" value="{fields}" size="80"></td></tr>
<tr><td>bioFormat:</td><td>
{radios}(only relevant if Fields includes "Bio")
</td></tr>
<tr><td>resolveRedirect:</td><td>
<input type="checkbox" name="resolveRedirect" id="resolveRedirect" value="1"{resolve_checked}> Resolve/Follow redirections
</td></tr>
<tr><td colspan=3><input type="submit" value="Get Profile"></td></tr>
</table>
</p>
</form>
<h2>Results</h2>
<blockquote id="result">{result_html}</blockquote>
<h2>JSON Results</h2>
<blockquote id="json">{result_json}</blockquote>
<h2>JavaScript Example</h2>
<blockquote id="example">{example}</blockquote>
</article>
</body>
</html>
"#,
        key = escape_html(key),
        fields = escape_html(fields),
    )
}
