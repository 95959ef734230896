use lucide_inline::{
    CreateIconsOptions, Document, IconRegistry, IconReplacer, Namespace, NodeId, create_icons,
    inner_html, parse_document, serialize_document,
};

fn mock_icons() -> IconRegistry {
    IconRegistry::from_json(
        r#"{
            "Circle": [["circle", { "cx": "12", "cy": "12", "r": "10" }]],
            "Heart": [["path", { "d": "M20.84 4.61a5.5 5.5 0 0 0-7.78 0L12 5.67l-1.06-1.06a5.5 5.5 0 0 0-7.78 7.78l1.06 1.06L12 21.23l7.78-7.78 1.06-1.06a5.5 5.5 0 0 0 0-7.78z" }]],
            "Volume2": [
                ["polygon", { "points": "11 5 6 9 2 9 2 15 6 15 11 19 11 5" }],
                ["path", { "d": "m19.07 4.93-1.41 1.41A8.5 8.5 0 0 1 19.5 12a8.5 8.5 0 0 1-1.84 5.66l1.41 1.41A10.5 10.5 0 0 0 21.5 12a10.5 10.5 0 0 0-2.43-6.07z" }],
                ["path", { "d": "m15.54 8.46-1.41 1.41A2.5 2.5 0 0 1 14.5 12a2.5 2.5 0 0 1-.37 2.13l1.41 1.41A4.5 4.5 0 0 0 16.5 12a4.5 4.5 0 0 0-0.96-3.54z" }]
            ]
        }"#,
    )
    .unwrap()
}

fn page(body: &str) -> Document {
    parse_document(&format!(
        "<!DOCTYPE html><html><head></head><body>{body}</body></html>"
    ))
}

fn by_id(doc: &Document, id: &str) -> NodeId {
    doc.get_element_by_id(doc.root(), id)
        .unwrap_or_else(|| panic!("no element #{id}"))
}

fn content(doc: &Document, template: &str) -> NodeId {
    doc.template_contents(by_id(doc, template)).unwrap()
}

fn svg(doc: &Document, scope: NodeId) -> Option<NodeId> {
    doc.find_element(scope, |el| el.is(Namespace::Svg, "svg"))
}

fn svg_for(doc: &Document, scope: NodeId, name_attr: &str, name: &str) -> Option<NodeId> {
    doc.find_element(scope, |el| {
        el.is(Namespace::Svg, "svg") && el.get_attribute(name_attr) == Some(name)
    })
}

fn attr<'a>(doc: &'a Document, id: NodeId, name: &str) -> Option<&'a str> {
    doc.element(id).and_then(|el| el.get_attribute(name))
}

fn has_child(doc: &Document, id: NodeId, tag: &str) -> bool {
    doc.find_element(id, |el| el.is(Namespace::Svg, tag)).is_some()
}

#[test]
fn test_replaces_elements_inside_template() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="icon-template">
        <i data-lucide="circle"></i>
      </template>
    "#,
    );

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    let content = content(&doc, "icon-template");
    let svg = svg(&doc, content).unwrap();
    assert_eq!(attr(&doc, svg, "data-lucide"), Some("circle"));
    let class = attr(&doc, svg, "class").unwrap();
    assert!(class.contains("lucide"));
    assert!(class.contains("lucide-circle"));
    assert!(has_child(&doc, svg, "circle"));
}

#[test]
fn test_replaces_multiple_elements_inside_template() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="multi-icon-template">
        <div>
          <i data-lucide="circle"></i>
          <i data-lucide="heart"></i>
        </div>
      </template>
    "#,
    );

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    let content = content(&doc, "multi-icon-template");
    let svgs = doc.find_elements(content, |el| el.is(Namespace::Svg, "svg"));
    assert_eq!(svgs.len(), 2);

    let circle = svg_for(&doc, content, "data-lucide", "circle").unwrap();
    let heart = svg_for(&doc, content, "data-lucide", "heart").unwrap();
    assert!(has_child(&doc, circle, "circle"));
    assert!(has_child(&doc, heart, "path"));

    // Nothing leaked into the live document.
    assert!(svg(&doc, doc.root()).is_none());
}

#[test]
fn test_replaces_elements_in_multiple_templates() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="template1">
        <i data-lucide="circle"></i>
      </template>
      <template id="template2">
        <i data-lucide="heart"></i>
      </template>
    "#,
    );

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    let first = content(&doc, "template1");
    let second = content(&doc, "template2");
    assert!(svg_for(&doc, first, "data-lucide", "circle").is_some());
    assert!(svg_for(&doc, second, "data-lucide", "heart").is_some());
    assert!(svg_for(&doc, first, "data-lucide", "heart").is_none());
    assert!(svg_for(&doc, second, "data-lucide", "circle").is_none());
}

#[test]
fn test_replaces_regular_and_template_elements() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <i data-lucide="volume-2" id="regular-icon"></i>
      <template id="template-with-icon">
        <i data-lucide="circle"></i>
      </template>
    "#,
    );

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    let regular = svg_for(&doc, doc.root(), "data-lucide", "volume-2").unwrap();
    assert!(has_child(&doc, regular, "polygon"));
    assert_eq!(attr(&doc, regular, "id"), Some("regular-icon"));
    assert_eq!(doc.children(regular).len(), 3);

    let content = content(&doc, "template-with-icon");
    let templated = svg_for(&doc, content, "data-lucide", "circle").unwrap();
    assert!(has_child(&doc, templated, "circle"));
}

#[test]
fn test_handles_empty_templates() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="empty-template">
      </template>
      <i data-lucide="circle"></i>
    "#,
    );
    let empty = content(&doc, "empty-template");
    let before = inner_html(&doc, empty).unwrap();

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    assert!(svg_for(&doc, doc.root(), "data-lucide", "circle").is_some());
    assert_eq!(inner_html(&doc, empty).unwrap(), before);
}

#[test]
fn test_templates_without_markers_are_unchanged() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="no-lucide-template">
        <div>Regular content</div>
        <span>No icons here</span>
      </template>
      <i data-lucide="heart"></i>
    "#,
    );
    let template = content(&doc, "no-lucide-template");
    let before = inner_html(&doc, template).unwrap();

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    assert_eq!(inner_html(&doc, template).unwrap(), before);
    let div = doc
        .find_element(template, |el| el.is(Namespace::Html, "div"))
        .unwrap();
    let span = doc
        .find_element(template, |el| el.is(Namespace::Html, "span"))
        .unwrap();
    assert_eq!(doc.text_content(div), "Regular content");
    assert_eq!(doc.text_content(span), "No icons here");
    assert!(svg(&doc, template).is_none());

    assert!(svg_for(&doc, doc.root(), "data-lucide", "heart").is_some());
}

#[test]
fn test_custom_name_attr_in_templates() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="custom-attr-template">
        <i data-custom-icon="circle"></i>
      </template>
    "#,
    );

    create_icons(
        &mut doc,
        &CreateIconsOptions::new(&icons).name_attr("data-custom-icon"),
    );

    let content = content(&doc, "custom-attr-template");
    let svg = svg(&doc, content).unwrap();
    assert_eq!(attr(&doc, svg, "data-custom-icon"), Some("circle"));
    assert!(attr(&doc, svg, "class").unwrap().contains("lucide-circle"));
}

#[test]
fn test_inherits_attributes_from_template_elements() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="attrs-template">
        <i data-lucide="circle" class="custom-class" data-test="value"></i>
      </template>
    "#,
    );

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    let content = content(&doc, "attrs-template");
    let svg = svg(&doc, content).unwrap();
    assert_eq!(attr(&doc, svg, "data-test"), Some("value"));
    let classes: Vec<_> = doc.element(svg).unwrap().class_list().collect();
    assert_eq!(classes, ["lucide", "lucide-circle", "custom-class"]);
}

#[test]
fn test_nested_elements_keep_structure() {
    let icons = mock_icons();
    let mut doc = page(
        r#"
      <template id="nested-template">
        <div class="container">
          <div class="icon-wrapper">
            <i data-lucide="heart" class="nested-icon"></i>
          </div>
          <span>Some text</span>
        </div>
      </template>
    "#,
    );

    create_icons(&mut doc, &CreateIconsOptions::new(&icons));

    let content = content(&doc, "nested-template");
    let svg = svg(&doc, content).unwrap();
    assert_eq!(attr(&doc, svg, "data-lucide"), Some("heart"));
    let class = attr(&doc, svg, "class").unwrap();
    assert!(class.contains("nested-icon"));
    assert!(class.contains("lucide-heart"));

    let container = doc
        .find_element(content, |el| el.class_list().any(|c| c == "container"))
        .unwrap();
    let wrapper = doc
        .find_element(content, |el| el.class_list().any(|c| c == "icon-wrapper"))
        .unwrap();
    assert!(doc.contains(container, wrapper));
    assert!(doc.contains(wrapper, svg));
    assert_eq!(doc.parent(svg), Some(wrapper));
}

#[test]
fn test_nested_templates_are_processed() {
    let icons = mock_icons();
    let mut doc = page(
        r#"<template id="outer"><i data-lucide="circle"></i><template id="inner"><i data-lucide="heart"></i><template id="innermost"><i data-lucide="volume-2"></i></template></template></template><template id="sibling"><p>plain</p></template>"#,
    );
    let sibling = content(&doc, "sibling");
    let sibling_before = inner_html(&doc, sibling).unwrap();

    let stats = IconReplacer::new(CreateIconsOptions::new(&icons)).run(&mut doc);

    assert_eq!(stats.scopes_searched, 5);
    assert_eq!(stats.icons_replaced, 3);

    let outer = content(&doc, "outer");
    let inner = doc
        .template_contents(doc.get_element_by_id(outer, "inner").unwrap())
        .unwrap();
    let innermost = doc
        .template_contents(doc.get_element_by_id(inner, "innermost").unwrap())
        .unwrap();

    assert!(svg_for(&doc, outer, "data-lucide", "circle").is_some());
    assert!(svg_for(&doc, inner, "data-lucide", "heart").is_some());
    assert!(svg_for(&doc, innermost, "data-lucide", "volume-2").is_some());
    assert!(svg(&doc, doc.root()).is_none());
    assert_eq!(inner_html(&doc, sibling).unwrap(), sibling_before);

    let html = serialize_document(&doc).unwrap();
    assert!(html.contains(r#"<template id="innermost"><svg"#));
}

#[test]
fn test_unknown_names_in_templates_are_untouched() {
    let icons = mock_icons();
    let mut doc = page(
        r#"<template id="t"><i data-lucide="does-not-exist" class="a"></i><i data-lucide="circle"></i></template>"#,
    );

    let stats = IconReplacer::new(CreateIconsOptions::new(&icons)).run(&mut doc);

    assert_eq!(stats.unknown_icons, ["does-not-exist"]);
    let content = content(&doc, "t");
    assert_eq!(
        inner_html(&doc, content).unwrap().split("<svg").next(),
        Some(r#"<i data-lucide="does-not-exist" class="a"></i>"#)
    );
}

#[test]
fn test_document_without_markers_is_unchanged() {
    let icons = mock_icons();
    let html = r#"<!DOCTYPE html><html><head></head><body><div><svg class="lucide" data-lucide="circle"><circle r="1"></circle></svg></div><template><p>x</p></template></body></html>"#;
    let mut doc = parse_document(html);

    let stats = IconReplacer::new(CreateIconsOptions::new(&icons)).run(&mut doc);

    assert_eq!(stats.markers_found, 0);
    assert_eq!(serialize_document(&doc).unwrap(), html);
}

#[test]
fn test_repeated_runs_are_stable() {
    let icons = mock_icons();
    let mut doc = page(
        r#"<i data-lucide="heart"></i><template id="t"><i data-lucide="circle"></i></template>"#,
    );
    let options = CreateIconsOptions::new(&icons);

    create_icons(&mut doc, &options);
    let once = serialize_document(&doc).unwrap();
    create_icons(&mut doc, &options);
    assert_eq!(serialize_document(&doc).unwrap(), once);
}
