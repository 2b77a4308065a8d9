use wikitree_api::request::ACTION_GET_PROFILE;
use wikitree_api::{API_URL, ApiRequest, ProfileQuery};
use wikitree_api::render::{
    pretty_json, render_html, render_js_example, render_reference_box, render_text,
    try_render_html,
};

const SHOSHONE: &str = r#"[{"person":{"Id":1,"Name":"Shoshone-1","FirstName":"Shoshone","BirthDate":"0000-00-00","DeathDate":"1900-01-01"}}]"#;

const FAMILY: &str = r#"[{
    "page_name": "Doe-7",
    "person": {
        "Id": 7,
        "Name": "Doe-7",
        "FirstName": "Jane",
        "LongName": "Jane (Roe) Doe",
        "BirthDate": "1850-03-04",
        "DeathDate": "0000-00-00",
        "DataStatus": {"BirthDate": "certain", "DeathDate": "guess"},
        "PhotoData": {"path": "/photo.php/a/b.jpg", "width": 75},
        "Parents": {
            "3": {"Id": 3, "Name": "Roe-3", "FirstName": "Ann", "BirthDate": "1820-01-01"},
            "4": {"Id": 4, "Name": "Roe-4", "FirstName": "Bob"}
        },
        "Children": {
            "9": {"Id": 9, "Name": "Doe-9", "FirstName": "Tim", "BirthDate": "1880-05-05", "DeathDate": "1950-06-06"}
        },
        "Siblings": [],
        "Spouses": {"8": {"Id": 8, "Name": "Doe-8"}}
    },
    "status": 0
}]"#;

fn body_rows(html: &str) -> usize {
    html.matches("<tr><td>").count()
}

#[test]
fn one_row_per_field_in_source_order() {
    let html = render_html(FAMILY);
    assert_eq!(body_rows(&html), 12);

    let order = [
        "<tr><td>Id</td>",
        "<tr><td>Name</td>",
        "<tr><td>FirstName</td>",
        "<tr><td>LongName</td>",
        "<tr><td>BirthDate</td>",
        "<tr><td>DeathDate</td>",
        "<tr><td>DataStatus</td>",
        "<tr><td>PhotoData</td>",
        "<tr><td>Parents</td>",
        "<tr><td>Children</td>",
        "<tr><td>Siblings</td>",
        "<tr><td>Spouses</td>",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|needle| html.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "rows out of order: {positions:?}");
}

#[test]
fn nested_pairs_appear_exactly_once() {
    let html = render_html(FAMILY);
    for pair in [
        "BirthDate = certain<br>",
        "DeathDate = guess<br>",
        "path = /photo.php/a/b.jpg<br>",
        "width = 75<br>",
        "3: Roe-3<br>",
        "4: Roe-4<br>",
        "9: Doe-9<br>",
        "8: Doe-8<br>",
    ] {
        assert_eq!(html.matches(pair).count(), 1, "{pair} in {html}");
    }
    assert!(html.contains("<tr><td>Siblings</td><td></td></tr>"));
}

#[test]
fn heading_names_page_and_links_long_name() {
    let html = render_html(FAMILY);
    assert!(html.starts_with("WikiTree API Result<br>Retrieved Profile for: page_name=Doe-7<br>"));
    assert!(html.contains(
        "<a href=\"https://www.wikitree.com/wiki/Doe-7\">Jane (Roe) Doe</a>"
    ));
}

#[test]
fn getprofile_replies_use_profile_key() {
    let json = r#"[{"page_name":"Doe-7","profile":{"Id":7,"Name":"Doe-7"},"status":0}]"#;
    let html = render_html(json);
    assert_eq!(body_rows(&html), 2);
}

#[test]
fn status_short_circuits_to_the_error_message() {
    let err = try_render_html(r#"[{"status":"Invalid key"}]"#).expect_err("status set");
    assert!(err.is_application());

    let html = render_html(r#"[{"status":"Invalid key"}]"#);
    assert_eq!(html, "WikiTree API Error: Invalid key");
    assert!(!html.contains("<table"));

    let boxed = render_reference_box(r#"[{"status":"Invalid key"}]"#);
    assert_eq!(boxed, "WikiTree API Error: Invalid key");

    let text = render_text(r#"[{"status":"Invalid key","person":{"Id":1}}]"#);
    assert_eq!(text, "WikiTree API Error: Invalid key");
}

#[test]
fn error_message_is_escaped() {
    let html = render_html(r#"[{"status":"<script>"}]"#);
    assert_eq!(html, "WikiTree API Error: &lt;script&gt;");
}

#[test]
fn malformed_replies_are_reported_not_rendered() {
    assert!(try_render_html("not json").is_err());
    assert!(!try_render_html("[]").expect_err("empty array").is_application());
    assert!(try_render_html(r#"[{"status":0}]"#).is_err());
    assert!(render_html("[]").contains("unexpected API reply"));
}

#[test]
fn unknown_birth_date_renders_question_mark() {
    let html = render_reference_box(SHOSHONE);
    assert!(html.contains("(? - 1900)"), "{html}");
    assert!(!html.contains("0000"));
    assert!(html.contains(
        "<a href=\"https://www.wikitree.com/wiki/Shoshone-1\" target=\"_new\">Shoshone Shoshone-1</a>"
    ));
}

#[test]
fn reference_box_lists_parents_then_children() {
    let html = render_reference_box(FAMILY);
    assert!(html.starts_with("<b><span style='white-space:nowrap;'>"));
    assert!(html.contains("Jane Doe-7</a> (1850 - ?) </span></b><br>"));

    let ann = html.find("Ann Roe-3").expect("first parent");
    let bob = html.find("Bob Roe-4").expect("second parent");
    let tim = html.find("Tim Doe-9").expect("child");
    assert!(ann < bob && bob < tim);
    assert!(html.contains("Ann Roe-3</a> (1820 - ?) "));
    assert!(html.contains("Tim Doe-9</a> (1880 - 1950) "));
    // no known dates, no year range
    assert!(html.contains("Bob Roe-4</a></span>"));
    assert_eq!(html.matches("pedigree.gif").count(), 2);
    assert_eq!(html.matches("descendant-link.gif").count(), 1);
    assert!(!html.contains("Doe-8"));
}

#[test]
fn text_output_nests_in_key_order() {
    let text = render_text(SHOSHONE);
    assert_eq!(
        text,
        "person:\n  Id: 1\n  Name: Shoshone-1\n  FirstName: Shoshone\n  BirthDate: ?\n  DeathDate: 1900-01-01\n"
    );

    let family = render_text(FAMILY);
    assert!(family.contains("  Parents:\n    3:\n      Id: 3\n"));
    assert!(family.contains("  Siblings: []\n"));
    assert!(family.contains("  DeathDate: ?\n"));
    assert!(!family.contains("0000-00-00"));
}

#[test]
fn bare_object_replies_are_accepted() {
    let text = render_text(r#"{"clientLogin":{"result":"Success","userid":42,"username":"Doe-1"}}"#);
    assert_eq!(
        text,
        "clientLogin:\n  result: Success\n  userid: 42\n  username: Doe-1\n"
    );
}

#[test]
fn pretty_json_indents_and_passes_through_garbage() {
    assert_eq!(pretty_json(r#"[{"a":1}]"#), "[\n  {\n    \"a\": 1\n  }\n]");
    assert_eq!(pretty_json("oops"), "oops");
}

#[test]
fn js_example_lists_only_present_parameters() {
    let request = ApiRequest::new("getProfile")
        .param("key", "Shoshone-1")
        .param("fields", "Id,Name")
        .param("bioFormat", "");
    let snippet = render_js_example("https://api.wikitree.com/api.php", &request);
    assert!(snippet.starts_with("$.ajax({\n    url: 'https://api.wikitree.com/api.php',\n"));
    assert!(snippet.contains("        action: 'getProfile',\n        key: 'Shoshone-1',\n        fields: 'Id,Name',\n    }\n"));
    assert!(!snippet.contains("bioFormat"));
    assert!(!snippet.contains("resolveRedirect"));

    let with_flags = render_js_example(
        "https://api.wikitree.com/api.php",
        &request.param("bioFormat", "wiki").param("resolveRedirect", true),
    );
    assert!(with_flags.contains("        bioFormat: 'wiki',\n        resolveRedirect: 1,\n"));
}

#[test]
fn js_example_from_query_lists_key_and_fields_and_skips_unset_options() {
    let snippet = render_js_example(API_URL, &ProfileQuery::new("Shoshone-1").to_request(ACTION_GET_PROFILE));
    assert!(snippet.contains(
        "    data: {\n        action: 'getProfile',\n        key: 'Shoshone-1',\n        fields: '',\n    }\n"
    ));
    assert!(!snippet.contains("resolveRedirect"));
    assert!(!snippet.contains("bioFormat"));

    let blank = render_js_example(API_URL, &ProfileQuery::default().to_request(ACTION_GET_PROFILE));
    assert!(blank.contains("        key: '',\n        fields: '',\n    }\n"));

    let full = render_js_example(
        API_URL,
        &ProfileQuery::new("Shoshone-1")
            .fields("Id,Name")
            .bio_format("html")
            .resolve_redirect(true)
            .to_request(ACTION_GET_PROFILE),
    );
    assert!(full.contains(
        "        key: 'Shoshone-1',\n        fields: 'Id,Name',\n        bioFormat: 'html',\n        resolveRedirect: 1,\n    }\n"
    ));
}

#[test]
fn js_example_keeps_numeric_params() {
    let snippet = render_js_example(API_URL, &ApiRequest::get_ancestors(27351134_i64, 3));
    assert!(snippet.contains("        key: 27351134,\n        fields: '',\n        depth: 3,\n        resolveRedirect: 1,\n"));
}
