use std::rc::Rc;

use weft_core::{Emitter, Observable, Value};
use weft_dom::{Node, SVG_NAMESPACE, XLINK_NAMESPACE};
use weft_template::{schema, Definition, Template, TemplateError, View};

fn card() -> Definition {
    Definition::tag("div")
        .attr("class", vec!["ck", "ck-card"])
        .attr("data-id", 0)
        .attr("hidden", false)
        .child(Definition::tag("span").child("Hello"))
        .child("tail")
}

#[test]
fn static_definitions_render_identically() {
    let a = Template::new(card()).render().unwrap();
    let b = Template::new(card()).render().unwrap();
    assert_eq!(
        a.outer_html(),
        "<div class=\"ck ck-card\" data-id=\"0\"><span>Hello</span>tail</div>"
    );
    assert_eq!(a.outer_html(), b.outer_html());
}

#[test]
fn bare_strings_render_text_nodes() {
    let node = Template::new("hello").render().unwrap();
    assert!(node.is_text());
    assert_eq!(node.text_content(), "hello");

    let joined = Template::new(Definition::text(schema!["a", Value::Null, "b", 0]))
        .render()
        .unwrap();
    assert_eq!(joined.text_content(), "ab0");
}

#[test]
fn malformed_definitions_fail_before_rendering() {
    let both = Template::new(Definition::tag("p").with_text("x"));
    assert!(matches!(
        both.render(),
        Err(TemplateError::MalformedDefinition { .. })
    ));
    assert!(!both.is_rendered());

    let neither = Template::new(Definition::new().attr("class", "a"));
    assert!(matches!(
        neither.render(),
        Err(TemplateError::MalformedDefinition { .. })
    ));

    let nested = Template::new(Definition::tag("div").child(Definition::new()));
    assert!(matches!(
        nested.render(),
        Err(TemplateError::MalformedDefinition { .. })
    ));
}

#[test]
fn templates_render_once() {
    let shared = Template::new(Definition::tag("b"));
    let first = Template::new(Definition::tag("p").child(shared.clone()));
    let second = Template::new(Definition::tag("p").child(shared.clone()));

    first.render().unwrap();
    assert!(shared.is_rendered());
    assert!(matches!(first.render(), Err(TemplateError::AlreadyRendered)));
    assert!(matches!(second.render(), Err(TemplateError::AlreadyRendered)));
}

#[test]
fn one_template_cannot_fill_two_positions() {
    let shared = Template::new(Definition::tag("i"));
    let root = Template::new(
        Definition::tag("div")
            .child(shared.clone())
            .child(shared.clone()),
    );
    assert!(matches!(root.render(), Err(TemplateError::AlreadyRendered)));
    assert!(!shared.is_rendered());
    assert!(!root.is_rendered());

    let deep = Template::new(
        Definition::tag("div")
            .child(Definition::tag("section").child(shared.clone()))
            .child(shared.clone()),
    );
    assert!(matches!(deep.render(), Err(TemplateError::AlreadyRendered)));

    let single = Template::new(Definition::tag("div").child(shared.clone()));
    assert_eq!(single.render().unwrap().outer_html(), "<div><i></i></div>");
}

#[test]
fn elements_use_their_namespace() {
    let state = Observable::new().with("icon", "#bold");
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);

    let svg = Template::new(
        Definition::tag("svg").ns(SVG_NAMESPACE).child(
            Definition::tag("use")
                .ns(SVG_NAMESPACE)
                .attr_ns(XLINK_NAMESPACE, "href", bind.to("icon")),
        ),
    )
    .render()
    .unwrap();

    let use_el = svg.first_child().unwrap();
    assert_eq!(svg.namespace_uri(), Some(SVG_NAMESPACE));
    assert_eq!(use_el.namespace_uri(), Some(SVG_NAMESPACE));
    assert_eq!(
        use_el.get_attribute_ns(Some(XLINK_NAMESPACE), "href").as_deref(),
        Some("#bold")
    );
    assert_eq!(use_el.get_attribute_ns(None, "href"), None);

    state.set("icon", "#italic");
    assert_eq!(
        use_el.get_attribute_ns(Some(XLINK_NAMESPACE), "href").as_deref(),
        Some("#italic")
    );
    state.set("icon", Value::Null);
    assert!(use_el.attributes().is_empty());
}

#[test]
fn style_maps_render_per_property() {
    let state = Observable::new().with("width", "10px");
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);

    let node = Template::new(
        Definition::tag("div")
            .style("width", bind.to("width"))
            .style("color", "red"),
    )
    .render()
    .unwrap();
    assert_eq!(
        node.get_attribute("style").as_deref(),
        Some("width: 10px; color: red;")
    );

    state.set("width", Value::Null);
    assert_eq!(node.get_attribute("style").as_deref(), Some("color: red;"));
    state.set("width", "2em");
    assert_eq!(node.style_property("width").as_deref(), Some("2em"));
    assert_eq!(node.style_property("color").as_deref(), Some("red"));
}

#[test]
fn plain_style_strings_fold_into_style_maps() {
    let node = Template::new(
        Definition::tag("div")
            .attr("style", "top: 1px")
            .style("color", "red"),
    )
    .render()
    .unwrap();
    assert_eq!(
        node.get_attribute("style").as_deref(),
        Some("top: 1px; color: red;")
    );
}

#[test]
fn bindings_cannot_mix_with_style_maps() {
    let state = Observable::new();
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);
    let t = Template::new(
        Definition::tag("div")
            .attr("style", bind.to("css"))
            .style("color", "red"),
    );
    assert!(matches!(
        t.render(),
        Err(TemplateError::MalformedDefinition { .. })
    ));
    assert_eq!(state.total_listener_count(), 0);
}

#[test]
fn invalid_listener_selectors_are_rejected() {
    let state = Observable::new();
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);

    for key in ["click@button:hover", "click@>", "click@"] {
        let t = Template::new(Definition::tag("div").on(key, bind.to("x")));
        match t.render() {
            Err(TemplateError::InvalidSelector { key: k, .. }) => assert_eq!(k, key),
            other => panic!("expected InvalidSelector for {key}, got {other:?}"),
        }
    }
    assert_eq!(emitter.live_count(), 0);
}

#[test]
fn children_of_every_kind_mount_in_order() {
    let raw = Node::element("hr");

    let view = Rc::new(View::new());
    view.set_template(Definition::tag("em").child("view"));

    let member = Rc::new(View::new());
    member.set_template(Definition::tag("li"));
    let host = View::new();
    let items = host.create_collection();
    items.add(member.clone()).unwrap();

    let node = Template::new(
        Definition::tag("div")
            .child(raw.clone())
            .child(view.clone())
            .child(items.clone())
            .child(Definition::tag("p")),
    )
    .render()
    .unwrap();

    assert_eq!(
        node.outer_html(),
        "<div><hr><em>view</em><li></li><p></p></div>"
    );
    assert!(view.is_rendered());
    assert!(items.parent().unwrap().ptr_eq(&node));
    assert!(raw.parent_node().unwrap().ptr_eq(&node));
}

#[test]
fn failed_renders_release_their_bindings() {
    let state = Observable::new().with("t", "x");
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);

    // A view without a template never gets an element.
    let empty = Rc::new(View::new());
    let t = Template::new(
        Definition::tag("div")
            .attr("title", bind.to("t"))
            .child(Definition::text(bind.to("t")))
            .child(empty),
    );
    assert!(matches!(t.render(), Err(TemplateError::ComponentNotRendered)));
    assert_eq!(state.total_listener_count(), 0);
    assert_eq!(emitter.live_count(), 0);
}

#[test]
fn get_views_walks_nested_definitions() {
    let a = Rc::new(View::new());
    let b = Rc::new(View::new());
    let c = Rc::new(View::new());
    let host = View::new();
    let items = host.create_collection();

    let t = Template::new(
        Definition::tag("div")
            .child(a.clone())
            .child(Definition::tag("p").child(b.clone()).child(items))
            .child(c.clone()),
    );
    let views = t.get_views();
    assert_eq!(views.len(), 3);
    assert!(std::ptr::addr_eq(Rc::as_ptr(&views[0]), Rc::as_ptr(&a)));
    assert!(std::ptr::addr_eq(Rc::as_ptr(&views[1]), Rc::as_ptr(&b)));
    assert!(std::ptr::addr_eq(Rc::as_ptr(&views[2]), Rc::as_ptr(&c)));
    assert!(!a.is_rendered());
}
