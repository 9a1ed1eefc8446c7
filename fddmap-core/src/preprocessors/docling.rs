//! Docling JSON preprocessor
//!
//! Reads the `texts` and `groups` arrays of a Docling export. Only the first
//! provenance entry of a text is used for its page and position. Fragments
//! with missing or null positional data are kept with zero defaults; items
//! that are not objects, or carry a negative or fractional page number, are
//! skipped. Neither case is an error.

use super::traits::Preprocessor;
use crate::error::{FddError, Result};
use crate::types::*;
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawText {
    #[serde(default)]
    self_ref: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    orig: Option<String>,
    #[serde(default)]
    label: Option<FragmentLabel>,
    #[serde(default)]
    level: Option<u32>,
    #[serde(default)]
    prov: Option<Vec<RawProvenance>>,
}

#[derive(Debug, Deserialize)]
struct RawProvenance {
    #[serde(default, deserialize_with = "page_number")]
    page_no: Option<u32>,
    #[serde(default)]
    bbox: Option<RawBoundingBox>,
}

#[derive(Debug, Deserialize)]
struct RawBoundingBox {
    #[serde(default)]
    l: Option<f64>,
    #[serde(default)]
    t: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(default)]
    self_ref: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    children: Vec<RawChild>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChild {
    Reference {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Plain(String),
}

/// Page numbers may be written as integral floats (`4.0`). Negative or
/// fractional values make the whole entry unreadable.
fn page_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(page) if page.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&page) => {
            Ok(Some(page as u32))
        }
        Some(page) => Err(D::Error::custom(format!("invalid page number {page}"))),
    }
}

impl RawChild {
    fn into_ref(self) -> String {
        match self {
            RawChild::Reference { reference } => reference,
            RawChild::Plain(reference) => reference,
        }
    }
}

/// Counts of data-quality problems seen while loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub fragments: usize,
    pub groups: usize,
    /// Fragments kept with one or more positional fields defaulted to zero
    pub defaulted_positions: usize,
    /// Text or group entries dropped because they could not be read at all
    pub skipped: usize,
}

#[derive(Debug, Default, Clone)]
pub struct DoclingPreprocessor;

impl DoclingPreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Parse a Docling export, also returning what had to be defaulted or skipped.
    pub fn parse_value(&self, root: &Value) -> Result<(Document, LoadReport)> {
        let object = root
            .as_object()
            .ok_or_else(|| FddError::invalid_document("top-level value is not a JSON object"))?;
        let texts = match object.get("texts") {
            Some(Value::Array(texts)) => texts,
            Some(_) => return Err(FddError::invalid_document("`texts` is not an array")),
            None => return Err(FddError::invalid_document("missing `texts` array")),
        };

        let mut report = LoadReport::default();
        let mut fragments = Vec::with_capacity(texts.len());
        for (index, item) in texts.iter().enumerate() {
            match RawText::deserialize(item) {
                Ok(raw) => fragments.push(self.convert_text(raw, index, &mut report)),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping unreadable text entry");
                    report.skipped += 1;
                }
            }
        }

        let groups = match object.get("groups") {
            Some(Value::Array(groups)) => self.convert_groups(groups, &mut report),
            Some(_) => {
                tracing::warn!("`groups` is not an array, ignoring it");
                Vec::new()
            }
            None => Vec::new(),
        };

        report.fragments = fragments.len();
        report.groups = groups.len();
        if report.defaulted_positions > 0 || report.skipped > 0 {
            tracing::warn!(
                defaulted_positions = report.defaulted_positions,
                skipped = report.skipped,
                "document has malformed entries"
            );
        }
        tracing::debug!(fragments = report.fragments, groups = report.groups, "docling document loaded");

        Ok((Document::new(fragments).with_groups(groups), report))
    }

    fn convert_text(&self, raw: RawText, index: usize, report: &mut LoadReport) -> TextFragment {
        let provenance = raw.prov.unwrap_or_default().into_iter().next();
        let page_no = provenance.as_ref().and_then(|p| p.page_no);
        let bbox = provenance.and_then(|p| p.bbox);
        let top = bbox.as_ref().and_then(|b| b.t).filter(|v| v.is_finite());
        let left = bbox.as_ref().and_then(|b| b.l).filter(|v| v.is_finite());

        if page_no.is_none() || top.is_none() || left.is_none() {
            report.defaulted_positions += 1;
        }

        let self_ref = raw.self_ref.unwrap_or_else(|| format!("#/texts/{index}"));
        let text = raw.text.filter(|t| !t.is_empty()).or(raw.orig).unwrap_or_default();

        TextFragment {
            self_ref,
            text,
            label: raw.label.unwrap_or_default(),
            level: raw.level,
            page_no: page_no.unwrap_or(0),
            top: top.unwrap_or(0.0),
            left: left.unwrap_or(0.0),
        }
    }

    fn convert_groups(&self, groups: &[Value], report: &mut LoadReport) -> Vec<FragmentGroup> {
        groups
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match RawGroup::deserialize(item) {
                Ok(raw) => Some(FragmentGroup {
                    self_ref: raw.self_ref.unwrap_or_else(|| format!("#/groups/{index}")),
                    label: raw.label.unwrap_or_default(),
                    name: raw.name,
                    children: raw.children.into_iter().map(RawChild::into_ref).collect(),
                }),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping unreadable group entry");
                    report.skipped += 1;
                    None
                }
            })
            .collect()
    }
}

impl Preprocessor for DoclingPreprocessor {
    fn parse_str(&self, content: &str) -> Result<Document> {
        let root: Value = serde_json::from_str(content)?;
        let (document, _) = self.parse_value(&root)?;
        Ok(document)
    }

    fn name(&self) -> &str {
        "docling"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> (Document, LoadReport) {
        DoclingPreprocessor::new().parse_value(&value).unwrap()
    }

    #[test]
    fn reads_texts_with_first_provenance() {
        let (doc, report) = parse(json!({
            "texts": [{
                "self_ref": "#/texts/0",
                "text": "ITEM 1 THE FRANCHISOR",
                "orig": "ITEM 1 THE FRANCHISOR",
                "label": "section_header",
                "level": 1,
                "prov": [
                    {"page_no": 4, "bbox": {"l": 72.0, "t": 710.5, "r": 300.0, "b": 690.0}},
                    {"page_no": 5, "bbox": {"l": 0.0, "t": 0.0, "r": 0.0, "b": 0.0}}
                ]
            }]
        }));

        let fragment = &doc.fragments[0];
        assert_eq!(fragment.self_ref, "#/texts/0");
        assert_eq!(fragment.label, FragmentLabel::SectionHeader);
        assert_eq!(fragment.level, Some(1));
        assert_eq!((fragment.page_no, fragment.top, fragment.left), (4, 710.5, 72.0));
        assert_eq!(report, LoadReport { fragments: 1, groups: 0, defaulted_positions: 0, skipped: 0 });
    }

    #[test]
    fn missing_positions_default_to_zero() {
        let (doc, report) = parse(json!({
            "texts": [
                {"self_ref": "#/texts/0", "text": "no prov", "label": "text"},
                {"self_ref": "#/texts/1", "text": "no bbox", "label": "text", "prov": [{"page_no": 3}]},
                {"text": "no ref", "label": "footnote", "prov": [{"page_no": 2, "bbox": {"t": 5.0}}]},
                {"self_ref": "#/texts/3", "text": "ITEM 3 LITIGATION", "label": "section_header", "prov": null},
                {"self_ref": "#/texts/4", "text": "float page", "label": "text",
                 "prov": [{"page_no": 4.0, "bbox": {"l": 72.0, "t": 700.0}}]}
            ]
        }));

        assert_eq!(doc.len(), 5);
        assert_eq!((doc.fragments[0].page_no, doc.fragments[0].top), (0, 0.0));
        assert_eq!(doc.fragments[1].page_no, 3);
        assert_eq!(doc.fragments[2].self_ref, "#/texts/2");
        assert_eq!(doc.fragments[2].left, 0.0);
        assert_eq!(doc.fragments[3].text, "ITEM 3 LITIGATION");
        assert_eq!((doc.fragments[3].page_no, doc.fragments[3].left), (0, 0.0));
        assert_eq!(doc.fragments[4].page_no, 4);
        assert_eq!(doc.section_headers().count(), 1);
        assert_eq!(doc.page_count(), 4);
        assert_eq!(report.defaulted_positions, 4);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn unknown_labels_become_other_and_bad_entries_are_skipped() {
        let (doc, report) = parse(json!({
            "texts": [
                {"self_ref": "#/texts/0", "text": "x", "label": "checkbox_selected"},
                "not an object",
                {"self_ref": "#/texts/2", "text": "y", "label": "paragraph", "prov": [{"page_no": -1}]},
                {"self_ref": "#/texts/3", "text": "z", "label": "paragraph", "prov": [{"page_no": 2.5}]}
            ]
        }));

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.fragments[0].label, FragmentLabel::Other);
        assert_eq!(report.skipped, 3);
    }

    #[test]
    fn groups_resolve_child_refs() {
        let (doc, _) = parse(json!({
            "texts": [
                {"self_ref": "#/texts/0", "text": "first", "label": "list_item"},
                {"self_ref": "#/texts/1", "text": "", "label": "list_item"},
                {"self_ref": "#/texts/2", "text": "third", "label": "list_item"}
            ],
            "groups": [{
                "self_ref": "#/groups/0",
                "label": "list",
                "name": "list",
                "children": [{"$ref": "#/texts/0"}, {"$ref": "#/texts/1"}, "#/texts/2", {"$ref": "#/texts/99"}]
            }]
        }));

        let group = &doc.groups[0];
        assert_eq!(group.children.len(), 4);
        assert_eq!(doc.group_texts(group), vec!["first", "third"]);
    }

    #[test]
    fn structurally_invalid_input_is_an_error() {
        let pre = DoclingPreprocessor::new();
        for value in [json!([1, 2, 3]), json!({"texts": {"a": 1}}), json!({"body": {}})] {
            let err = pre.parse_value(&value).unwrap_err();
            assert!(err.is_input_error(), "{err}");
        }
        assert!(pre.parse_bytes(&[0xff, 0xfe, 0x00]).unwrap_err().is_input_error());
        assert!(matches!(pre.parse_str("{not json"), Err(FddError::Json(_))));
    }

    #[test]
    fn supports_json_files_only() {
        let pre = DoclingPreprocessor::new();
        assert!(pre.supports_file_type(Path::new("acme_2023.JSON")));
        assert!(!pre.supports_file_type(Path::new("acme_2023.pdf")));
    }
}
