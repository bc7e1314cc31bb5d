use std::cell::RefCell;
use std::rc::Rc;

use weft_core::{Emitter, Observable};
use weft_template::{Definition, Template, TemplateError};

#[test]
fn attributes_and_children_merge() {
    let template = Template::new(
        Definition::tag("div")
            .attr("class", "a")
            .child(Definition::tag("span")),
    );
    template
        .extend(
            Definition::new()
                .attr("class", "b")
                .attr("id", "x")
                .child(Definition::new().attr("class", "inner")),
        )
        .unwrap();

    let node = template.render().unwrap();
    assert_eq!(
        node.outer_html(),
        "<div class=\"a b\" id=\"x\"><span class=\"inner\"></span></div>"
    );
}

#[test]
fn text_chunks_append() {
    let template = Template::new(Definition::text("Hello"));
    template.extend(Definition::text(", world")).unwrap();
    assert_eq!(template.render().unwrap().text_content(), "Hello, world");
}

#[test]
fn style_maps_merge_per_property() {
    let template = Template::new(Definition::tag("p").style("color", "red"));
    template
        .extend(Definition::new().style("top", "1px"))
        .unwrap();
    let node = template.render().unwrap();
    assert_eq!(
        node.get_attribute("style").as_deref(),
        Some("color: red; top: 1px;")
    );
}

#[test]
fn listeners_accumulate_in_order() {
    let state = Observable::new();
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = log.clone();
    let template = Template::new(
        Definition::tag("button").on("click", bind.to_callback(move |_| first.borrow_mut().push(1))),
    );
    let second = log.clone();
    template
        .extend(Definition::new().on("click", bind.to_callback(move |_| second.borrow_mut().push(2))))
        .unwrap();

    template.render().unwrap().click();
    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn children_must_line_up() {
    let template = Template::new(
        Definition::tag("div")
            .attr("class", "a")
            .child(Definition::tag("span")),
    );
    let result = template.extend(
        Definition::new()
            .attr("class", "b")
            .child(Definition::new())
            .child(Definition::new()),
    );
    assert!(matches!(
        result,
        Err(TemplateError::ExtendChildrenMismatch {
            expected: 1,
            actual: 2
        })
    ));
    assert_eq!(
        template.render().unwrap().outer_html(),
        "<div class=\"a\"><span></span></div>"
    );
}

#[test]
fn rendered_templates_cannot_be_extended() {
    let template = Template::new(Definition::tag("div"));
    template.render().unwrap();
    assert!(matches!(
        template.extend(Definition::new().attr("class", "late")),
        Err(TemplateError::ExtendRendered)
    ));
}

#[test]
fn extended_bindings_stay_live() {
    let state = Observable::new().with("a", "x");
    let emitter = Emitter::new();
    let bind = Template::bind(&state, &emitter);

    let template = Template::new(Definition::tag("i").attr("class", "icon"));
    template
        .extend(Definition::new().attr("class", bind.to("a")))
        .unwrap();
    let node = template.render().unwrap();
    assert_eq!(node.get_attribute("class").as_deref(), Some("icon x"));

    state.set("a", "y");
    assert_eq!(node.get_attribute("class").as_deref(), Some("icon y"));
}
