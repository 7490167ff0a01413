use std::collections::HashSet;
use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::{debug, warn};

use crate::error::IngestResult;

/// An embedded figure image extracted from a PDF
#[derive(Debug, Clone)]
pub struct FigureImage {
    /// 1-based page number the image appears on
    pub page: u32,
    /// Raw encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub media_type: String,
}

/// Extract the concatenated page text of a PDF.
///
/// Pages that fail individually are skipped; an unreadable or unparsable
/// document is an error. An empty string is a valid (degenerate) result.
pub fn extract_text(path: &Path) -> IngestResult<String> {
    let doc = Document::load(path)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();

    let mut full_text = String::new();
    for page in &pages {
        match doc.extract_text(&[*page]) {
            Ok(text) => full_text.push_str(&text),
            Err(e) => {
                warn!(page = *page, error = %e, "Skipping unreadable page");
            }
        }
    }

    debug!(
        pages = pages.len(),
        chars = full_text.len(),
        "Extracted document text"
    );
    Ok(full_text)
}

/// Extract embedded figure images from a PDF.
///
/// Only JPEG-encoded (DCTDecode) image XObjects are collected; the vision
/// oracle consumes them directly without transcoding. Failures are absorbed
/// into an empty list.
pub fn extract_figures(path: &Path) -> Vec<FigureImage> {
    let doc = match Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "Could not open PDF for figure extraction");
            return Vec::new();
        }
    };

    let mut figures = Vec::new();
    let mut seen = HashSet::new();

    for (&page_num, &page_id) in doc.get_pages().iter() {
        let Ok((resource_dict, resource_ids)) = doc.get_page_resources(page_id) else {
            continue;
        };

        let mut dicts: Vec<&Dictionary> = Vec::new();
        if let Some(dict) = resource_dict {
            dicts.push(dict);
        }
        for id in resource_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object(id) {
                dicts.push(dict);
            }
        }

        for dict in dicts {
            let Ok(xobjects) = dict.get(b"XObject").and_then(|o| o.as_dict()) else {
                continue;
            };
            for (_name, entry) in xobjects.iter() {
                let Ok(id) = entry.as_reference() else { continue };
                if !seen.insert(id) {
                    continue;
                }
                let Ok(Object::Stream(stream)) = doc.get_object(id) else {
                    continue;
                };
                let is_image = stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|o| o.as_name())
                    .map(|n| n == b"Image")
                    .unwrap_or(false);
                if !is_image || !has_jpeg_filter(&stream.dict) {
                    continue;
                }
                figures.push(FigureImage {
                    page: page_num,
                    data: stream.content.clone(),
                    media_type: "image/jpeg".to_string(),
                });
            }
        }
    }

    debug!(figures = figures.len(), "Extracted embedded figures");
    figures
}

fn has_jpeg_filter(dict: &Dictionary) -> bool {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name.as_slice() == b"DCTDecode",
        Ok(Object::Array(items)) => items
            .iter()
            .any(|o| matches!(o, Object::Name(n) if n.as_slice() == b"DCTDecode")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extract_text_missing_file_is_error() {
        let result = extract_text(Path::new("/nonexistent/paper.pdf"));
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_text_invalid_pdf_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a pdf at all").unwrap();
        let result = extract_text(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_extract_figures_invalid_pdf_is_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"still not a pdf").unwrap();
        assert!(extract_figures(file.path()).is_empty());
    }

    #[test]
    fn test_jpeg_filter_detection() {
        let mut dict = Dictionary::new();
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
        assert!(has_jpeg_filter(&dict));

        let mut dict = Dictionary::new();
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        assert!(!has_jpeg_filter(&dict));

        let mut dict = Dictionary::new();
        dict.set(
            "Filter",
            Object::Array(vec![
                Object::Name(b"ASCII85Decode".to_vec()),
                Object::Name(b"DCTDecode".to_vec()),
            ]),
        );
        assert!(has_jpeg_filter(&dict));
    }
}
