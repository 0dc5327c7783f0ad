//! Boilerplate removal for the `#content-blocks` body container.
//!
//! Eight passes run in a fixed order, each removing matched nodes from
//! the tree (never rewriting serialized text, which would corrupt
//! nested markup). The passes are conservative: when a structural
//! heuristic cannot find a safe enclosing block, only the narrowest
//! matched element is removed. The exception is the footer pass, which
//! deliberately drops everything after a recurring end-of-newsletter
//! phrase.

use kuchiki::NodeRef;

use crate::extractor::patterns;

/// Ancestor levels to climb when enclosing a referral-program marker.
const REFERRAL_ASCENT: usize = 5;
/// Ancestor levels to climb around a boilerplate link.
const LINK_ASCENT: usize = 3;
/// A link's enclosing block keeps climbing while its text stays short.
const LINK_BLOCK_CLIMB_MAX_TEXT: usize = 200;
/// Largest block we are willing to delete around a boilerplate link.
const LINK_BLOCK_REMOVE_MAX_TEXT: usize = 300;
/// Wrapper levels to climb out of when locating a footer trigger's
/// flow-level node.
const FOOTER_ASCENT: usize = 10;

/// Strip platform boilerplate from the body container, in place.
pub fn clean_body(root: &NodeRef) {
    remove_hidden_elements(root);
    remove_tracking_pixels(root);
    remove_referral_blocks(root);
    remove_boilerplate_links(root);
    remove_named_containers(root);
    remove_footer_sections(root);
    remove_boilerplate_images(root);
    remove_empty_blocks(root);
}

fn remove_hidden_elements(root: &NodeRef) {
    let hidden = collect(root, "[style]", |el| {
        el.attributes
            .borrow()
            .get("style")
            .is_some_and(patterns::is_hidden_style)
    });
    detach_all(hidden);
}

fn remove_tracking_pixels(root: &NodeRef) {
    let pixels = collect(root, "img", |el| {
        let attrs = el.attributes.borrow();
        let tiny = attrs.get("width").is_some_and(patterns::is_tracking_pixel_size)
            || attrs.get("height").is_some_and(patterns::is_tracking_pixel_size);
        tiny || attrs.get("src").is_some_and(patterns::is_tracking_src)
    });
    detach_all(pixels);
}

/// Referral-program blocks carry `{{rp_` template markers. The marker
/// sits in a deeply nested text node; climb a few levels to take out
/// the whole block rather than just the text.
fn remove_referral_blocks(root: &NodeRef) {
    for text_node in text_nodes_matching(root, patterns::has_referral_marker) {
        let Some(mut block) = text_node.parent() else {
            continue;
        };
        for _ in 0..REFERRAL_ASCENT {
            match block.parent() {
                Some(parent) if parent != *root => block = parent,
                _ => break,
            }
        }
        if block != *root {
            block.detach();
        }
    }
}

/// Subscribe/share/read-online links usually sit inside a small
/// promotional block; remove the block when it is unambiguously small,
/// otherwise remove only the anchor so surrounding prose survives.
fn remove_boilerplate_links(root: &NodeRef) {
    let anchors = collect(root, "a", |_| true);
    for anchor in anchors {
        if !patterns::is_boilerplate_link_text(stripped_text(&anchor).as_str()) {
            continue;
        }
        let Some(mut block) = anchor.parent() else {
            anchor.detach();
            continue;
        };
        for _ in 0..LINK_ASCENT {
            match block.parent() {
                Some(parent) if parent != *root => {
                    if text_len(&block) < LINK_BLOCK_CLIMB_MAX_TEXT {
                        block = parent;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        if block != *root && text_len(&block) < LINK_BLOCK_REMOVE_MAX_TEXT {
            block.detach();
        } else {
            anchor.detach();
        }
    }
}

fn remove_named_containers(root: &NodeRef) {
    let named = collect(root, "[class]", |el| {
        el.attributes
            .borrow()
            .get("class")
            .is_some_and(patterns::is_boilerplate_class)
    });
    detach_all(named);
}

/// Once a footer trigger phrase appears, everything after it in the
/// flow is trailing boilerplate. Climb out of sole-child wrappers to
/// the flow-level node, then drop it and all following siblings.
/// Aggressive and irreversible; any genuine content after the phrase
/// is lost. Matches how these recurring sections actually appear in
/// newsletters.
fn remove_footer_sections(root: &NodeRef) {
    for text_node in text_nodes_matching(root, patterns::is_footer_trigger) {
        let Some(mut node) = text_node.parent() else {
            continue;
        };
        for _ in 0..FOOTER_ASCENT {
            let Some(parent) = node.parent() else { break };
            if parent == *root || element_child_count(&parent) > 1 {
                break;
            }
            node = parent;
        }
        if node != *root {
            let trailing: Vec<NodeRef> = node.inclusive_following_siblings().collect();
            detach_all(trailing);
        }
    }
}

fn remove_boilerplate_images(root: &NodeRef) {
    let images = collect(root, "img", |el| {
        el.attributes
            .borrow()
            .get("src")
            .is_some_and(patterns::is_boilerplate_image_src)
    });
    for img in images {
        // Take the parent too when it is a pure wrapper around the image.
        match img.parent() {
            Some(parent) if parent != *root && stripped_text(&parent).is_empty() => {
                parent.detach();
            }
            _ => img.detach(),
        }
    }
}

/// Paragraphs and cells left with only whitespace or a non-breaking
/// space, and no embedded media, are husks of earlier removals.
fn remove_empty_blocks(root: &NodeRef) {
    let empties = collect(root, "p, td", |_| true);
    for node in empties {
        let text = stripped_text(&node);
        if !text.is_empty() && text != "\u{a0}" {
            continue;
        }
        let has_media = node
            .select("img, video, iframe")
            .map(|mut media| media.next().is_some())
            .unwrap_or(false);
        if !has_media {
            node.detach();
        }
    }
}

/// Nodes under `root` matching `selector` and passing `keep`, collected
/// before any detaching so tree mutation never invalidates iteration.
fn collect<F>(root: &NodeRef, selector: &str, keep: F) -> Vec<NodeRef>
where
    F: Fn(&kuchiki::ElementData) -> bool,
{
    match root.select(selector) {
        Ok(matches) => matches
            .filter(|m| keep(m))
            .map(|m| m.as_node().clone())
            .collect(),
        Err(()) => Vec::new(),
    }
}

fn text_nodes_matching(root: &NodeRef, matches: fn(&str) -> bool) -> Vec<NodeRef> {
    root.descendants()
        .filter(|node| {
            node.as_text()
                .is_some_and(|text| matches(text.borrow().as_str()))
        })
        .collect()
}

fn detach_all(nodes: Vec<NodeRef>) {
    for node in nodes {
        node.detach();
    }
}

/// Concatenated text of the subtree with each text node trimmed,
/// mirroring how the length thresholds are defined.
fn stripped_text(node: &NodeRef) -> String {
    let mut out = String::new();
    for n in node.inclusive_descendants() {
        if let Some(text) = n.as_text() {
            out.push_str(text.borrow().trim());
        }
    }
    out
}

fn text_len(node: &NodeRef) -> usize {
    stripped_text(node).chars().count()
}

fn element_child_count(node: &NodeRef) -> usize {
    node.children().filter(|c| c.as_element().is_some()).count()
}
