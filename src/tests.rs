use super::*;
use crate::outline::bulleted;
use crate::script::{Layout, PlaceholderKind, PlaceholderMapping, Unit};
use serde_json::json;

fn insert(object_id: &str, text: &str) -> EditOperation {
    EditOperation::InsertText {
        object_id: object_id.to_string(),
        text: text.to_string(),
    }
}

fn sample_outline() -> SlideOutline {
    SlideOutline::new(vec![
        SlideSpec::titled("Theory of Computation").with_subtitle("Team 7"),
        SlideSpec::titled("Goals").with_points(&["Pick a topic", "Ship a prototype"]),
        SlideSpec::titled("Risks"),
    ])
}

#[test]
fn test_parse_fenced_outline() {
    let raw = "Here:\n```json\n[{\"title\":\"S1\"}]\n```";
    let outline = parse_outline(raw).expect("fenced outline should parse");

    assert_eq!(outline.len(), 1);
    assert_eq!(
        outline.slides[0].title,
        Some(FieldValue::Text("S1".to_string()))
    );
}

#[test]
fn test_parse_outline_in_prose() {
    let raw = "Sure! [{\"title\":\"S1\"},{\"title\":\"S2\"}] Hope this helps!";
    let outline = parse_outline(raw).expect("outline in prose should parse");
    assert_eq!(outline.len(), 2);
}

#[test]
fn test_parse_outline_with_preamble_and_postamble() {
    let raw = "Analyzing...\n\nFound 3 points.\n[{\"title\": \"A\"}]\n\nDone.";
    let outline = parse_outline(raw).unwrap();
    assert_eq!(outline.len(), 1);
}

#[test]
fn test_parse_without_brackets() {
    let err = parse_outline("I could not produce slides today.").unwrap_err();
    assert!(matches!(err, AgentError::NoArrayFound));
    assert!(err.is_parse_failure());
}

#[test]
fn test_parse_closing_bracket_only() {
    let err = parse_outline("see note ] above").unwrap_err();
    assert!(matches!(err, AgentError::NoArrayFound));
}

#[test]
fn test_parse_bad_json() {
    let err = parse_outline("[{bad json").unwrap_err();
    assert!(matches!(err, AgentError::MalformedArray(_)));
    assert!(err.is_parse_failure());

    let err = parse_outline("[{bad json]").unwrap_err();
    assert!(matches!(err, AgentError::MalformedArray(_)));
}

#[test]
fn test_parse_closing_bracket_before_opening() {
    let err = parse_outline("oops ] then [ nothing").unwrap_err();
    assert!(matches!(err, AgentError::NoArrayFound));
    assert_eq!(
        parser::extract_array_span("oops ] then [ nothing"),
        parser::ArraySpan::Missing
    );
    assert_eq!(
        parser::extract_array_span("[ nothing"),
        parser::ArraySpan::Unterminated
    );
}

#[test]
fn test_fences_inside_strings_are_kept() {
    let outline = parse_outline(r#"[{"title":"use ``` fences"}]"#).unwrap();
    assert_eq!(
        outline.slides[0].title,
        Some(FieldValue::Text("use ``` fences".to_string()))
    );

    let raw = "```json\n[{\"title\":\"use ``` fences\"}]\n```";
    let outline = parse_outline(raw).unwrap();
    assert_eq!(
        outline.slides[0].title,
        Some(FieldValue::Text("use ``` fences".to_string()))
    );
}

#[test]
fn test_parse_two_arrays_fails() {
    let raw = "[{\"title\":\"A\"}] and also [{\"title\":\"B\"}]";
    let err = parse_outline(raw).unwrap_err();
    assert!(matches!(err, AgentError::MalformedArray(_)));
}

#[test]
fn test_parse_rejects_empty_array_and_non_objects() {
    assert!(matches!(
        parse_outline("[]").unwrap_err(),
        AgentError::MalformedArray(_)
    ));
    assert!(matches!(
        parse_outline("[\"just a string\"]").unwrap_err(),
        AgentError::MalformedArray(_)
    ));
}

#[test]
fn test_parse_missing_and_null_fields_are_absent() {
    let raw = r#"[{"title": "Cover", "subtitle": null, "notes": "ignored"}]"#;
    let outline = parse_outline(raw).unwrap();
    let cover = &outline.slides[0];

    assert_eq!(cover.subtitle, None);
    assert_eq!(cover.points, None);
}

#[test]
fn test_parse_keeps_points_shapes() {
    let raw = r#"[{"title": "C"}, {"points": ["a", "b"]}, {"points": "plain"}, {"points": 3}]"#;
    let outline = parse_outline(raw).unwrap();

    assert_eq!(
        outline.slides[1].points,
        Some(FieldValue::Items(vec!["a".to_string(), "b".to_string()]))
    );
    assert_eq!(
        outline.slides[2].points,
        Some(FieldValue::Text("plain".to_string()))
    );
    assert_eq!(outline.slides[3].points, Some(FieldValue::Other(json!(3))));
}

#[test]
fn test_bulleted_points() {
    assert_eq!(bulleted(&["a", "b"]), "• a\n• b");
    let scalar = FieldValue::Text("already formatted".to_string());
    assert_eq!(scalar.to_slide_text().as_deref(), Some("already formatted"));
}

#[test]
fn test_cover_title_then_font_size() {
    let outline = SlideOutline::new(vec![SlideSpec::titled("T")]);
    let script = build_edit_script(&outline, "Fallback", "p").unwrap();

    let position = script
        .operations
        .iter()
        .position(|op| *op == insert("title_0", "T"))
        .expect("cover title inserted");
    assert_eq!(
        script.operations[position + 1],
        EditOperation::SetFontSize {
            object_id: "title_0".to_string(),
            points: 42,
            unit: Unit::Pt,
        }
    );
}

#[test]
fn test_cover_uses_fallback_title() {
    let outline = SlideOutline::new(vec![SlideSpec::default().with_subtitle("Team 7")]);
    let script = build_edit_script(&outline, "Compilers", "p").unwrap();

    assert!(script.operations.contains(&insert("title_0", "Compilers")));
    assert!(script.operations.contains(&insert("subtitle_0", "Team 7")));
}

#[test]
fn test_cover_subtitle_falls_back_to_points() {
    let outline = SlideOutline::new(vec![SlideSpec::titled("T").with_points(&["x", "y"])]);
    let script = build_edit_script(&outline, "F", "p").unwrap();
    assert!(script.operations.contains(&insert("subtitle_0", "• x\n• y")));
}

#[test]
fn test_full_script_layout() {
    let script = build_edit_script(&sample_outline(), "Fallback", "p").unwrap();

    let expected = vec![
        EditOperation::CreateSlide {
            slide_id: "slide_0".to_string(),
            layout: Layout::Title,
            placeholder_mappings: vec![
                PlaceholderMapping {
                    placeholder: PlaceholderKind::CenteredTitle,
                    index: 0,
                    object_id: "title_0".to_string(),
                },
                PlaceholderMapping {
                    placeholder: PlaceholderKind::Subtitle,
                    index: 0,
                    object_id: "subtitle_0".to_string(),
                },
            ],
        },
        insert("title_0", "Theory of Computation"),
        EditOperation::SetFontSize {
            object_id: "title_0".to_string(),
            points: 42,
            unit: Unit::Pt,
        },
        insert("subtitle_0", "Team 7"),
        EditOperation::CreateSlide {
            slide_id: "slide_1".to_string(),
            layout: Layout::TitleAndBody,
            placeholder_mappings: vec![
                PlaceholderMapping {
                    placeholder: PlaceholderKind::Title,
                    index: 0,
                    object_id: "title_1".to_string(),
                },
                PlaceholderMapping {
                    placeholder: PlaceholderKind::Body,
                    index: 0,
                    object_id: "body_1".to_string(),
                },
            ],
        },
        insert("title_1", "Goals"),
        insert("body_1", "• Pick a topic\n• Ship a prototype"),
        EditOperation::CreateSlide {
            slide_id: "slide_2".to_string(),
            layout: Layout::TitleAndBody,
            placeholder_mappings: vec![
                PlaceholderMapping {
                    placeholder: PlaceholderKind::Title,
                    index: 0,
                    object_id: "title_2".to_string(),
                },
                PlaceholderMapping {
                    placeholder: PlaceholderKind::Body,
                    index: 0,
                    object_id: "body_2".to_string(),
                },
            ],
        },
        insert("title_2", "Risks"),
        EditOperation::DeleteObject {
            object_id: "p".to_string(),
        },
    ];

    assert_eq!(script.operations, expected);
}

#[test]
fn test_one_create_per_slide_and_no_forward_references() {
    let outline = sample_outline();
    let script = build_edit_script(&outline, "Fallback", "p").unwrap();

    assert_eq!(script.slide_count(), outline.len());
    let deletes = script
        .operations
        .iter()
        .filter(|op| matches!(op, EditOperation::DeleteObject { .. }))
        .count();
    assert_eq!(deletes, 1);
    assert!(matches!(
        script.operations.last(),
        Some(EditOperation::DeleteObject { .. })
    ));
    script.check_references(&["p"]).unwrap();
}

#[test]
fn test_check_references_detects_forward_reference() {
    let script = EditScript {
        operations: vec![insert("title_0", "too early")],
    };
    assert!(script.check_references(&["p"]).is_err());
}

#[test]
fn test_builder_is_deterministic() {
    let outline = sample_outline();
    let first = build_edit_script(&outline, "Fallback", "p").unwrap();
    let second = build_edit_script(&outline, "Fallback", "p").unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_empty_outline_produces_no_operations() {
    let script = build_edit_script(&SlideOutline::default(), "Fallback", "p").unwrap();
    assert!(script.is_empty());
}

#[test]
fn test_blank_body_slide_has_no_text() {
    let outline = SlideOutline::new(vec![SlideSpec::titled("Cover"), SlideSpec::default()]);
    let script = build_edit_script(&outline, "F", "p").unwrap();

    assert!(outline.slides[1].is_blank());
    assert!(!script.operations.iter().any(|op| matches!(
        op,
        EditOperation::InsertText { object_id, .. } if object_id.ends_with("_1")
    )));
}

#[test]
fn test_empty_points_are_not_inserted() {
    let outline = SlideOutline::new(vec![
        SlideSpec::titled("Cover"),
        SlideSpec {
            points: Some(FieldValue::Items(Vec::new())),
            ..SlideSpec::default()
        },
        SlideSpec {
            points: Some(FieldValue::Text(String::new())),
            ..SlideSpec::default()
        },
    ]);
    let script = build_edit_script(&outline, "F", "p").unwrap();

    assert!(!script.operations.iter().any(|op| matches!(
        op,
        EditOperation::InsertText { object_id, .. } if object_id.starts_with("body_")
    )));
}

#[test]
fn test_invalid_points_type_is_compile_failure() {
    let outline = parse_outline(r#"[{"title": "C"}, {"title": "B", "points": {"a": 1}}]"#).unwrap();
    let err = build_edit_script(&outline, "F", "p").unwrap_err();

    assert!(err.is_compile_failure());
    assert!(matches!(
        err,
        AgentError::InvalidFieldType {
            slide: 1,
            field: "points",
            ..
        }
    ));
}

#[test]
fn test_list_title_is_compile_failure() {
    let outline = parse_outline(r#"[{"title": ["not", "text"]}]"#).unwrap();
    let err = EditScript::compile(&outline, "F").unwrap_err();
    assert!(matches!(
        err,
        AgentError::InvalidFieldType { slide: 0, field: "title", .. }
    ));
}

#[test]
fn test_slides_requests_schema() {
    let script = build_edit_script(&SlideOutline::new(vec![SlideSpec::titled("T")]), "F", "p").unwrap();
    let requests = slides::to_requests(&script.operations);

    assert_eq!(
        requests[0]["createSlide"]["slideLayoutReference"]["predefinedLayout"],
        "TITLE"
    );
    assert_eq!(
        requests[0]["createSlide"]["placeholderIdMappings"][0]["layoutPlaceholder"]["type"],
        "CENTERED_TITLE"
    );
    assert_eq!(requests[1]["insertText"]["insertionIndex"], 0);
    assert_eq!(
        requests[2]["updateTextStyle"]["style"]["fontSize"],
        json!({ "magnitude": 42, "unit": "PT" })
    );
    assert_eq!(requests[2]["updateTextStyle"]["fields"], "fontSize");
    assert_eq!(requests[3], json!({ "deleteObject": { "objectId": "p" } }));
}

#[test]
fn test_extract_content_shapes() {
    let ollama = json!({ "message": { "role": "assistant", "content": "plan" } });
    let generate = json!({ "response": "plan" });
    let openai = json!({ "choices": [{ "message": { "content": "plan" } }] });

    for body in [ollama, generate, openai] {
        assert_eq!(llm::extract_content(&body).as_deref(), Some("plan"));
    }
    assert_eq!(llm::extract_content(&json!({ "error": "nope" })), None);
}

#[test]
fn test_strip_markdown() {
    assert_eq!(
        llm::strip_markdown("## Goals\n**Ship** it\n### Later"),
        " Goals\nShip it\n Later"
    );
}

#[test]
fn test_parse_recipients() {
    let recipients = utils::parse_recipients("f74122030, alice@example.com, ,bob ", "gs.ncku.edu.tw");
    assert_eq!(
        recipients,
        vec![
            "f74122030@gs.ncku.edu.tw".to_string(),
            "alice@example.com".to_string(),
            "bob@gs.ncku.edu.tw".to_string(),
        ]
    );
}

#[test]
fn test_build_message_headers() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    let message = mail::build_message(" a@example.com ", "Subject", "Body");
    assert!(message.starts_with("To: a@example.com\r\n"));
    assert!(message.contains(&format!("Subject: =?UTF-8?B?{}?=", STANDARD.encode("Subject"))));
    assert!(message.contains(&STANDARD.encode("Body")));
}

#[test]
fn test_config_validation() {
    let mut config = Config::new();
    assert!(matches!(config.validate(), Err(AgentError::ConfigError(_))));

    config.llm.api_key = "key".to_string();
    config.llm.api_url = "not a url".to_string();
    assert!(matches!(config.validate(), Err(AgentError::ConfigError(_))));

    config.llm.api_url = "http://localhost:11434/api/chat".to_string();
    assert!(config.validate().is_ok());
    assert_eq!(config.llm.model, "gpt-oss:120b");
    assert!(!config.has_google_credentials());

    config.google.service_account_json = Some("{}".to_string());
    assert!(config.has_google_credentials());
}

#[test]
fn test_output_mode_from_str() {
    assert_eq!("slides".parse::<OutputMode>().unwrap(), OutputMode::Slides);
    assert_eq!("Document".parse::<OutputMode>().unwrap(), OutputMode::Document);
    assert!("video".parse::<OutputMode>().is_err());
}

#[test]
fn test_read_assignment() {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all("Build a DFA minimizer.".as_bytes())
        .expect("Failed to write to temp file");
    let text = utils::read_assignment(file.path()).unwrap();
    assert_eq!(text, "Build a DFA minimizer.");

    let empty = NamedTempFile::new().expect("Failed to create temp file");
    assert!(matches!(
        utils::read_assignment(empty.path()),
        Err(AgentError::ValidationError(_))
    ));
    assert!(utils::read_assignment(std::path::Path::new("/nonexistent/assignment.txt")).is_err());
}

fn write_assignment_pdf(path: &std::path::Path, line: &str) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("Failed to encode page content"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("Failed to write PDF");
}

#[test]
fn test_read_assignment_pdf() {
    let file = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .expect("Failed to create temp file");
    write_assignment_pdf(file.path(), "Build a DFA minimizer.");

    let text = utils::read_assignment(file.path()).unwrap();
    assert!(text.contains("Build a DFA minimizer."));
}

#[test]
fn test_read_assignment_rejects_broken_pdf() {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(".PDF")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(b"plain text pretending to be a PDF")
        .expect("Failed to write to temp file");

    assert!(matches!(
        utils::read_assignment(file.path()),
        Err(AgentError::PdfError(_))
    ));
}
