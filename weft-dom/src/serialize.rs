use crate::node::Node;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) fn write_node(node: &Node, out: &mut String) {
    if node.is_text() {
        escape_into(&node.text_content(), false, out);
        return;
    }
    let Some(tag) = node.tag_name() else {
        // fragment
        for child in node.child_nodes() {
            write_node(&child, out);
        }
        return;
    };

    out.push('<');
    out.push_str(tag);
    for attr in node.attributes() {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_into(&attr.value, true, out);
        out.push('"');
    }
    out.push('>');

    let children = node.child_nodes();
    if children.is_empty() && VOID_ELEMENTS.contains(&tag) {
        return;
    }
    for child in children {
        write_node(&child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
