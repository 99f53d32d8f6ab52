use prompter::{OutputType, Prompter, ScriptDocument, parse};

const KEYNOTE: &str = include_str!("fixtures/keynote.md");

fn export(doc: &ScriptDocument, output_type: OutputType) -> anyhow::Result<String> {
    let mut out = Vec::new();
    Prompter::default().export(doc, &mut out, output_type)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn markup_export_reparses_to_the_same_document() -> anyhow::Result<()> {
    let doc = parse(KEYNOTE);
    let markup = export(&doc, OutputType::Markup)?;

    assert!(markup.starts_with("## 1: HOOK (30 seconds)\n"));
    assert_eq!(parse(&markup), doc);
    Ok(())
}

#[test]
fn json_export_loads_back() -> anyhow::Result<()> {
    let doc = parse(KEYNOTE);
    let json = export(&doc, OutputType::Json)?;

    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value.as_array().map(Vec::len), Some(4));
    assert_eq!(value[2]["title"], "DEMO");
    assert_eq!(value[2]["duration"], 90);

    assert_eq!(ScriptDocument::from_json_str(&json)?, doc);
    Ok(())
}

#[test]
fn records_with_zero_duration_are_rejected() {
    let json = r#"[{ "id": 1, "title": "Broken", "duration": 0 }]"#;
    assert!(ScriptDocument::from_json_str(json).is_err());
}

#[test]
fn loaded_records_are_renumbered() -> anyhow::Result<()> {
    let json = r#"[
        { "id": 7, "title": "First", "duration": 12 },
        { "id": 3, "title": "Second", "duration": 8, "bullets": [] }
    ]"#;
    let doc = ScriptDocument::from_json_str(json)?;
    let ids: Vec<u32> = doc.segments().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2]);
    Ok(())
}

#[test]
fn placeholder_survives_export() -> anyhow::Result<()> {
    let doc = parse("");
    let markup = export(&doc, OutputType::Markup)?;
    assert!(parse(&markup).is_placeholder());
    Ok(())
}

#[test]
fn titles_keeping_a_seconds_annotation_survive_markup() -> anyhow::Result<()> {
    let doc = parse("## A (10 seconds) (20 seconds)\n- point\n");
    assert_eq!(doc.first().title, "A (10 seconds)");
    assert_eq!(doc.first().duration, 20);

    let markup = export(&doc, OutputType::Markup)?;
    assert_eq!(parse(&markup), doc);
    Ok(())
}

#[test]
fn bullets_made_of_rule_glyphs_survive_markup() -> anyhow::Result<()> {
    let doc = parse("## A (10 seconds)\n• ***\n• ---\n");
    assert_eq!(doc.first().bullets.len(), 2);

    let markup = export(&doc, OutputType::Markup)?;
    assert_eq!(markup, "## 1: A (10 seconds)\n• ***\n• ---\n");
    assert_eq!(parse(&markup), doc);
    Ok(())
}
