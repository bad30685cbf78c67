use sha2::{Digest, Sha256};

/// Hex SHA-256 of a payload, logged in place of the payload itself.
pub fn compute_sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Walks `path` from `node` by element name, ignoring namespaces.
pub(crate) fn find_element<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    path: &[&str],
) -> Option<roxmltree::Node<'a, 'input>> {
    let Some((first, rest)) = path.split_first() else {
        return Some(node);
    };
    node.children()
        .filter(|child| child.is_element() && child.tag_name().name() == *first)
        .find_map(|child| find_element(child, rest))
}

/// Trimmed, non-empty text of the element at `path`.
pub(crate) fn text_at_path(node: roxmltree::Node<'_, '_>, path: &[&str]) -> Option<String> {
    find_element(node, path)
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            compute_sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn path_lookup_skips_non_matching_branches() {
        let doc = roxmltree::Document::parse(
            "<a><b><x>1</x></b><b><c> two </c></b><c/></a>",
        )
        .unwrap();
        let root = doc.root_element();

        assert_eq!(text_at_path(root, &["b", "c"]).as_deref(), Some("two"));
        assert_eq!(text_at_path(root, &["b", "x"]).as_deref(), Some("1"));
        assert_eq!(text_at_path(root, &["c"]), None);
        assert!(find_element(root, &["b", "missing"]).is_none());
        assert_eq!(find_element(root, &[]), Some(root));
    }
}
