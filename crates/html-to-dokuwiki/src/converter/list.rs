//! Ordered/unordered list rendering.

use futures::future::join_all;

use crate::dom::MarkupNode;

use super::main::Engine;

/// Render a list node with the given item marker.
///
/// Each item line is `indent + marker + " " + content`, indented two
/// spaces per nesting level starting at two spaces for the top level.
/// Nested lists re-enter the walker at `depth + 1` and hang off their
/// parent item's line; only the top-level block earns a leading newline to
/// separate it from surrounding content.
pub(crate) async fn format_list(engine: &Engine<'_>, list: &MarkupNode, marker: char, depth: usize) -> String {
    let indent = "  ".repeat(depth + 1);

    let items: Vec<&MarkupNode> = list
        .children()
        .iter()
        .filter(|child| matches!(child, MarkupNode::Element { .. }))
        .collect();

    let lines = join_all(
        items
            .iter()
            .map(|item| render_item(engine, item, marker, depth, &indent)),
    )
    .await;

    let block = lines.join("\n");
    if depth == 0 {
        format!("\n{block}")
    } else {
        block
    }
}

async fn render_item(engine: &Engine<'_>, item: &MarkupNode, marker: char, depth: usize, indent: &str) -> String {
    // Partition the item's children: nested lists hang below the item
    // line, everything else is the line's own content. A table or other
    // block inside a list item counts as ordinary content.
    let (own, nested): (Vec<&MarkupNode>, Vec<&MarkupNode>) = item
        .children()
        .iter()
        .partition(|child| !child.is_element("ul") && !child.is_element("ol"));

    let own_rendered = join_all(own.iter().map(|node| engine.convert_node(node, depth))).await;
    let content = own_rendered.concat().trim().to_string();

    // Nested lists go back through the walker so each picks the marker
    // for its own tag.
    let nested_rendered = join_all(nested.iter().map(|sub| engine.convert_node(sub, depth + 1))).await;
    let nested_block = nested_rendered.join("\n");

    let mut line = format!("{indent}{marker} {content}");
    if !nested_block.is_empty() {
        line.push('\n');
        line.push_str(&nested_block);
    }
    line
}
