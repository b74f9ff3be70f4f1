//! Enter/update/exit reconciliation of node and link SVG elements.
//!
//! The keyed diff itself is pure and unit-tested; element creation and
//! attribute writes are thin `web-sys` wrappers over the owned svg surface.

use std::collections::HashSet;

use web_sys::{Document, Element};

use super::types::{GraphLink, GraphNode};

/// SVG element namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// Namespace for `xlink:href` icon references.
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Result of a keyed diff: keys to create and keys to remove.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyDiff {
	/// Incoming keys with no existing element, in input order (first
	/// occurrence wins for duplicates).
	pub enter: Vec<String>,
	/// Existing keys absent from the incoming data.
	pub exit: Vec<String>,
}

/// Diff existing element keys against incoming data keys.
pub fn diff_keys<'a, I>(existing: I, incoming: &[String]) -> KeyDiff
where
	I: Iterator<Item = &'a String>,
{
	let existing: Vec<&String> = existing.collect();
	let existing_set: HashSet<&str> = existing.iter().map(|s| s.as_str()).collect();
	let mut seen: HashSet<&str> = HashSet::new();
	let mut diff = KeyDiff::default();
	for key in incoming {
		if seen.insert(key.as_str()) && !existing_set.contains(key.as_str()) {
			diff.enter.push(key.clone());
		}
	}
	for key in existing {
		if !seen.contains(key.as_str()) {
			diff.exit.push(key.clone());
		}
	}
	diff
}

/// Measure an element's rendered width, falling back to the parent
/// container's width when the element reports zero. Firefox always reports
/// zero `clientWidth` for svg elements.
pub fn measure_width(element: &Element) -> f64 {
	let width = element.client_width();
	if width == 0 {
		element
			.parent_element()
			.map(|p| p.client_width() as f64)
			.unwrap_or(0.0)
	} else {
		width as f64
	}
}

/// Append the background overlay rect to the svg surface.
pub fn append_overlay(document: &Document, svg: &Element) {
	let rect = create(document, "rect");
	rect.set_attribute("class", "g-overlay").unwrap();
	svg.append_child(&rect).unwrap();
}

/// Create and append a node group: `<g class="g-node g-node--{entity}">`
/// wrapping a circle of the given radius and an icon `<use>` reference
/// sized `icon_ratio × radius` and centered by translation.
pub fn create_node_group(
	document: &Document,
	svg: &Element,
	node: &GraphNode,
	radius: f64,
	icon_ratio: f64,
) -> Element {
	let group = create(document, "g");
	group
		.set_attribute("class", &format!("g-node g-node--{}", node.entity))
		.unwrap();

	let circle = create(document, "circle");
	circle.set_attribute("r", &radius.to_string()).unwrap();
	group.append_child(&circle).unwrap();

	let icon = node.icon.as_deref().unwrap_or(&node.entity);
	let half_offset = icon_ratio / 2.0 * radius;
	let reference = create(document, "use");
	reference
		.set_attribute_ns(Some(XLINK_NS), "xlink:href", &format!("#{icon}"))
		.unwrap();
	reference
		.set_attribute("width", &(icon_ratio * radius).to_string())
		.unwrap();
	reference
		.set_attribute("height", &(icon_ratio * radius).to_string())
		.unwrap();
	reference
		.set_attribute(
			"transform",
			&format!("translate({},{})", -half_offset, -half_offset),
		)
		.unwrap();
	group.append_child(&reference).unwrap();

	svg.append_child(&group).unwrap();
	group
}

/// Create and append a link group:
/// `<g class="g-link g-link--{source_entity}-{target_entity}">` wrapping a
/// black-stroked line. Returns `(group, line)`; positions go on the line.
pub fn create_link_group(document: &Document, svg: &Element, link: &GraphLink) -> (Element, Element) {
	let group = create(document, "g");
	group
		.set_attribute(
			"class",
			&format!(
				"g-link g-link--{}-{}",
				link.source_entity, link.target_entity
			),
		)
		.unwrap();

	let line = create(document, "line");
	line.set_attribute("stroke", "black").unwrap();
	group.append_child(&line).unwrap();

	svg.append_child(&group).unwrap();
	(group, line)
}

/// Write a node's position as a translation onto its group element.
pub fn set_node_transform(group: &Element, x: f64, y: f64) {
	group
		.set_attribute("transform", &format!("translate({x},{y})"))
		.unwrap();
}

/// Write a link's resolved endpoints onto its line element.
pub fn set_link_endpoints(line: &Element, x1: f64, y1: f64, x2: f64, y2: f64) {
	line.set_attribute("x1", &x1.to_string()).unwrap();
	line.set_attribute("y1", &y1.to_string()).unwrap();
	line.set_attribute("x2", &x2.to_string()).unwrap();
	line.set_attribute("y2", &y2.to_string()).unwrap();
}

fn create(document: &Document, tag: &str) -> Element {
	document.create_element_ns(Some(SVG_NS), tag).unwrap()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn keys(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn diff_partitions_enter_and_exit() {
		let existing = keys(&["a", "b", "c"]);
		let incoming = keys(&["b", "c", "d"]);
		let diff = diff_keys(existing.iter(), &incoming);
		assert_eq!(diff.enter, keys(&["d"]));
		assert_eq!(diff.exit, keys(&["a"]));
	}

	#[test]
	fn removing_one_key_exits_exactly_that_key() {
		let existing = keys(&["l1", "l2", "l3"]);
		let incoming = keys(&["l1", "l3"]);
		let diff = diff_keys(existing.iter(), &incoming);
		assert!(diff.enter.is_empty());
		assert_eq!(diff.exit, keys(&["l2"]));
	}

	#[test]
	fn duplicate_incoming_keys_enter_once() {
		let existing: Vec<String> = Vec::new();
		let incoming = keys(&["a", "a", "b"]);
		let diff = diff_keys(existing.iter(), &incoming);
		assert_eq!(diff.enter, keys(&["a", "b"]));
		assert!(diff.exit.is_empty());
	}

	#[test]
	fn identical_sets_yield_empty_diff() {
		let existing = keys(&["a", "b"]);
		let diff = diff_keys(existing.iter(), &existing);
		assert_eq!(diff, KeyDiff::default());
	}
}
