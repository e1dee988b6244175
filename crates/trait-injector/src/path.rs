//! Structured JSON pointer accumulator
//!
//! Patch paths are built segment by segment and only rendered into a
//! [`PointerBuf`] at the end, so field names are escaped by `jsonptr` and
//! container indices stay numeric tokens.

use std::fmt;

use json_patch::jsonptr::PointerBuf;

/// Token addressing the position past the last element of an array
pub const APPEND_TOKEN: &str = "-";

/// A path into a workload document, as a list of unescaped segments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// A path from a fixed list of field names
    pub fn from_fields(fields: &[&str]) -> Self {
        Self {
            segments: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Descend into an object field
    pub fn field(&self, name: &str) -> Self {
        self.child(name.to_string())
    }

    /// Descend into an array element
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// Address the append position of the array at this path
    pub fn append(&self) -> Self {
        self.child(APPEND_TOKEN.to_string())
    }

    /// Unescaped segments of this path
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Render as a JSON pointer
    pub fn to_pointer(&self) -> PointerBuf {
        PointerBuf::from_tokens(self.segments.iter().map(String::as_str))
    }

    fn child(&self, segment: String) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_pointer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_as_empty_pointer() {
        assert_eq!(DocumentPath::root().to_string(), "");
        assert!(DocumentPath::root().segments().is_empty());
    }

    #[test]
    fn container_env_from_append_path() {
        let path = DocumentPath::from_fields(&["spec", "template", "spec"])
            .field("containers")
            .index(1)
            .field("envFrom")
            .append();
        assert_eq!(path.to_string(), "/spec/template/spec/containers/1/envFrom/-");
        assert_eq!(path.segments().len(), 7);
    }

    #[test]
    fn children_do_not_mutate_parent() {
        let parent = DocumentPath::from_fields(&["spec"]);
        let _child = parent.field("template");
        assert_eq!(parent.to_string(), "/spec");
    }

    #[test]
    fn special_characters_are_escaped() {
        let path = DocumentPath::root().field("a/b").field("c~d");
        assert_eq!(path.to_string(), "/a~1b/c~0d");
        assert_eq!(path.segments(), &["a/b".to_string(), "c~d".to_string()]);
    }
}
