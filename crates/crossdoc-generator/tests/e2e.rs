//! End-to-end tests for crossdoc.
//!
//! These tests load a model from its JSON form and render a complete site.

use std::fs;

use crossdoc_core::{Config, DocumentationModel, ExternalTypes};
use crossdoc_generator::{Builder, audit_references};
use tempfile::TempDir;

const MODEL: &str = r##"{
    "ids": {
        "Widget": { "filename": "classes/widget", "html_id": "widget" },
        "Widget#render": { "filename": "classes/widget", "html_id": "widget-render" },
        "Button": { "filename": "classes/button", "html_id": "button" },
        "utils": { "filename": "modules/utils", "html_id": "utils" },
        "init": "DUPLICATED ENTRY"
    },
    "guides": [
        {
            "name": "Getting Started",
            "filename": "guides/getting-started",
            "content": "# Getting Started\n\nCreate a [[#Widget]] first."
        }
    ],
    "classes": [
        {
            "name": "Widget",
            "filename": "classes/widget",
            "html_id": "widget",
            "description": "Base of every control. See [[#Button]].",
            "defined_in": "lib/widget.js",
            "properties": [
                {
                    "name": "render",
                    "kind": "method",
                    "html_id": "widget-render",
                    "params": [
                        { "name": "target", "types": ["Array<Widget>"] },
                        { "name": "options", "types": ["Settings"], "optional": true }
                    ],
                    "returns": { "types": ["Array<Widget>"] }
                },
                {
                    "name": "attach",
                    "kind": "method",
                    "html_id": "widget-attach",
                    "description": "Calls [[#init]] before rendering.",
                    "see": ["Widget#render"]
                }
            ]
        },
        {
            "name": "Button",
            "filename": "classes/button",
            "html_id": "button",
            "extends": ["Widget"],
            "defined_in": "lib/button.js"
        }
    ],
    "modules": [
        {
            "name": "utils",
            "filename": "modules/utils",
            "html_id": "utils",
            "properties": [
                { "name": "uuid", "kind": "method", "html_id": "utils-uuid", "returns": { "types": ["String"] } }
            ]
        }
    ],
    "files": [
        { "name": "lib/widget.js", "filename": "files/lib_widget.js" }
    ]
}"##;

fn config(project: &TempDir) -> Config {
    Config {
        project_dir: project.path().to_path_buf(),
        quiet: true,
        ..Config::default()
    }
}

#[test]
fn test_model_renders_to_site() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("README.md"), "# Demo\n\nStart with [[#utils]].").unwrap();
    let model = DocumentationModel::from_json(MODEL).expect("model should decode");

    let stats = Builder::new(&model, config(&project))
        .build()
        .expect("build should succeed");

    let doc = project.path().join("doc");
    assert_eq!(stats.pages, 6);
    assert_eq!(stats.failed_pages, 0);

    let index = fs::read_to_string(doc.join("index.html")).unwrap();
    assert!(index.contains("<a href='./modules/utils.html#utils'>utils</a>"));

    let guide = fs::read_to_string(doc.join("guides/getting-started.html")).unwrap();
    assert!(guide.contains("<a href='../classes/widget.html#widget'>Widget</a>"));

    let widget = fs::read_to_string(doc.join("classes/widget.html")).unwrap();
    assert!(widget.contains("<a href='../classes/button.html#button'>Button</a>"));
    assert!(widget.contains("Array'>Array</a>&lt;<a href='../classes/widget.html#widget'>Widget</a>&gt;"));
    assert!(widget.contains("<span class='missing-link'>Settings</span>"));
    assert!(widget.contains("<span class='missing-link'>init</span>"));
    assert!(widget.contains("<a href='../classes/widget.html#widget-render'>Widget#render</a>"));

    let button = fs::read_to_string(doc.join("classes/button.html")).unwrap();
    assert!(button.contains("<a href='../classes/widget.html#widget'>Widget</a>"));

    let utils = fs::read_to_string(doc.join("modules/utils.html")).unwrap();
    assert!(utils.contains("Global_Objects/String'>String</a>"));

    assert!(doc.join("files/lib_widget.js.html").is_file());
    assert!(!doc.join("features").exists());
}

#[test]
fn test_external_types_link_unknown_names() {
    let project = TempDir::new().unwrap();
    let external = project.path().join("types.json");
    fs::write(&external, r#"{ "Settings": "https://example.com/settings" }"#).unwrap();
    let model = DocumentationModel::from_json(MODEL).unwrap();

    let config = Config {
        external_types: Some(ExternalTypes::File(external)),
        ..config(&project)
    };
    let stats = Builder::new(&model, config).build().unwrap();

    // Only the ambiguous `init` reference remains.
    assert_eq!(stats.missing_links, 1);
    let widget = fs::read_to_string(project.path().join("doc/classes/widget.html")).unwrap();
    assert!(widget.contains("<a href='https://example.com/settings'>Settings</a>"));
}

#[test]
fn test_audit_matches_build() {
    let project = TempDir::new().unwrap();
    let model = DocumentationModel::from_json(MODEL).unwrap();

    let audit = audit_references(&model, &config(&project));
    let stats = Builder::new(&model, config(&project)).build().unwrap();

    assert_eq!(audit.missing.len(), stats.missing_links);
    let names: Vec<&str> = audit.missing.iter().map(|r| r.reference.name()).collect();
    assert!(names.contains(&"Settings"));
    assert!(names.contains(&"init"));
}
