//! Post-serialization patching of inner documents.
//!
//! The bureau's schema wants `class` (and on collections `size`) attributes
//! on a handful of elements. Their values depend on the document variant,
//! not on the fields, so they are injected into the serialized text instead
//! of being modelled as struct fields.

use crate::documents::RequestContent;

/// Rewrites the bare opening tag `<tag>` into `<tag attributes>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPatch {
    tag: &'static str,
    attributes: String,
}

impl TagPatch {
    pub fn new(tag: &'static str, attributes: impl Into<String>) -> Self {
        Self {
            tag,
            attributes: attributes.into(),
        }
    }

    fn class(tag: &'static str) -> Self {
        Self::new(tag, format!(r#"class="{tag}""#))
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    fn literal(&self) -> String {
        format!("<{}>", self.tag)
    }

    fn replacement(&self) -> String {
        format!("<{} {}>", self.tag, self.attributes)
    }
}

/// The patch table for the given document.
pub fn patches_for(content: &RequestContent) -> Vec<TagPatch> {
    match content {
        RequestContent::Issue(request) => vec![
            TagPatch::class("REQUEST_FPKJXX"),
            TagPatch::class("FPKJXX_FPTXX"),
            TagPatch::new(
                "FPKJXX_XMXXS",
                format!(r#"class="FPKJXX_XMXX;" size="{}""#, request.line_count()),
            ),
            TagPatch::class("FPKJXX_DDXX"),
        ],
        RequestContent::Download(_) => vec![TagPatch::class("REQUEST_FPXXXZ_NEW")],
    }
}

/// Applies `patches` to `xml` in a single left-to-right pass.
///
/// Every occurrence of a patch's bare opening tag is rewritten. Tags that
/// already carry attributes do not match, so applying the same table twice
/// changes nothing. A tag that never occurs is skipped.
pub fn apply(xml: &str, patches: &[TagPatch]) -> String {
    let table: Vec<(String, String)> = patches
        .iter()
        .map(|p| (p.literal(), p.replacement()))
        .collect();
    let mut hits = vec![0usize; table.len()];

    let mut out = String::with_capacity(xml.len() + 32 * table.len());
    let mut rest = xml;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match table
            .iter()
            .position(|(literal, _)| rest.starts_with(literal.as_str()))
        {
            Some(idx) => {
                let (literal, replacement) = &table[idx];
                out.push_str(replacement);
                rest = &rest[literal.len()..];
                hits[idx] += 1;
            }
            None => {
                out.push('<');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    for (patch, count) in patches.iter().zip(&hits) {
        if *count == 0 {
            tracing::debug!(tag = patch.tag(), "schema tag not present, skipped");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::tests::{sample_download, sample_issue};
    use crate::documents::LineItem;

    #[test]
    fn issue_document_gets_class_and_size() {
        let mut request = sample_issue();
        let discount = LineItem {
            name: "折扣".to_string(),
            line_kind: "1".to_string(),
            ..request.lines.items[0].clone()
        };
        request.lines.items.push(discount);
        let xml = RequestContent::from(request).to_patched_xml().unwrap();

        assert!(xml.starts_with(r#"<REQUEST_FPKJXX class="REQUEST_FPKJXX"><FPKJXX_FPTXX class="FPKJXX_FPTXX">"#));
        assert!(xml.contains(r#"<FPKJXX_XMXXS class="FPKJXX_XMXX;" size="2">"#));
        assert!(xml.contains(r#"<FPKJXX_DDXX class="FPKJXX_DDXX">"#));
        // closing tags are untouched
        assert!(xml.ends_with("</FPKJXX_DDXX></REQUEST_FPKJXX>"));
        assert!(!xml.contains("<FPKJXX_XMXX class"));
    }

    #[test]
    fn download_document_gets_class() {
        let xml = RequestContent::from(sample_download())
            .to_patched_xml()
            .unwrap();
        assert!(xml.starts_with(r#"<REQUEST_FPXXXZ_NEW class="REQUEST_FPXXXZ_NEW"><FPQQLSH>"#));
    }

    #[test]
    fn patching_is_idempotent() {
        for content in [
            RequestContent::from(sample_issue()),
            RequestContent::from(sample_download()),
        ] {
            let patches = patches_for(&content);
            let once = apply(&content.to_xml().unwrap(), &patches);
            let twice = apply(&once, &patches);
            assert_ne!(once, content.to_xml().unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn missing_tags_are_skipped() {
        let patches = vec![TagPatch::class("FPKJXX_DDXX"), TagPatch::class("A")];
        let xml = "<A><B>x &lt; y</B><A>2</A></A>";
        assert_eq!(
            apply(xml, &patches),
            r#"<A class="A"><B>x &lt; y</B><A class="A">2</A></A>"#
        );
        assert_eq!(apply("", &patches), "");
        assert_eq!(apply("no tags", &patches), "no tags");
    }

    #[test]
    fn only_whole_tag_names_match() {
        let patches = vec![TagPatch::class("FPKJXX_XMXX")];
        let xml = "<FPKJXX_XMXXS><FPKJXX_XMXX></FPKJXX_XMXX></FPKJXX_XMXXS>";
        assert_eq!(
            apply(xml, &patches),
            r#"<FPKJXX_XMXXS><FPKJXX_XMXX class="FPKJXX_XMXX"></FPKJXX_XMXX></FPKJXX_XMXXS>"#
        );
    }
}
