use std::path::Path;

use lopdf::Document;

use crate::acquire::AcquireError;

/// Reads the embedded text layer of a PDF, one string per page in page order.
pub trait TextLayerReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, AcquireError>;
}

/// Text layer extraction backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfReader;

impl TextLayerReader for LopdfReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, AcquireError> {
        let doc = Document::load(path).map_err(|e| AcquireError::Extraction(e.to_string()))?;
        page_texts_from(&doc)
    }
}

fn page_texts_from(doc: &Document) -> Result<Vec<String>, AcquireError> {
    // get_pages is keyed by 1-based page number, so iteration is page order.
    doc.get_pages()
        .keys()
        .map(|&page_num| {
            doc.extract_text(&[page_num])
                .map_err(|e| AcquireError::Extraction(format!("page {page_num}: {e}")))
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry; `None` pages carry no text at all.
    pub fn pdf_with_pages(pages: &[Option<&str>]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = match text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    pub fn write_pdf(dir: &std::path::Path, name: &str, pages: &[Option<&str>]) -> std::path::PathBuf {
        let path = dir.join(name);
        pdf_with_pages(pages).save(&path).unwrap();
        path
    }
}
