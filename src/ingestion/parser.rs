//! Multi-format file parser

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Supported file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "pptx" => Self::Pptx,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Pptx => "PowerPoint (.pptx)",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// Parsed document with extracted text and structure
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Source filename the document was parsed from
    pub source_filename: String,
    /// Full extracted text content
    pub content: String,
    /// Content hash for deduplication
    pub content_hash: String,
    /// Total pages (if applicable)
    pub total_pages: Option<u32>,
    /// Structural blocks in document order
    pub blocks: Vec<DocBlock>,
    /// Document metadata
    pub metadata: HashMap<String, String>,
}

/// A structural block of a parsed document
///
/// A page for paginated formats, a slide for presentations, a heading
/// section for Markdown. Provenance fields are filled only when the
/// format actually carries them.
#[derive(Debug, Clone)]
pub struct DocBlock {
    /// Text content of the block
    pub content: String,
    /// Page or slide number (1-indexed)
    pub page_number: Option<u32>,
    /// Heading hierarchy active for this block
    pub headings: Vec<String>,
    /// Character offset in the full document content
    pub char_offset: usize,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Parse a file on disk based on its extension
    pub fn parse_path(path: &Path) -> Result<ParsedDocument> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let data = std::fs::read(path)?;
        Self::parse(&filename, &data)
    }

    /// Parse in-memory file data based on the filename's extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let extension = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        let file_type = FileType::from_extension(&extension);

        if !file_type.is_supported() {
            return Err(Error::UnsupportedFormat(extension));
        }

        tracing::debug!("Parsing {} as {}", filename, file_type.display_name());

        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            FileType::Docx => Self::parse_docx(filename, data),
            FileType::Pptx => Self::parse_pptx(filename, data),
            FileType::Markdown => Self::parse_markdown(filename, data),
            FileType::Unknown => Err(Error::UnsupportedFormat(extension)),
        }
    }

    /// Extract PDF pages with a sync timeout to prevent hangs on problematic fonts
    fn extract_pdf_pages_with_timeout(filename: &str, data: &[u8]) -> Result<Vec<String>> {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem_by_pages(&data_vec);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_secs(60)) {
            Ok(Ok(pages)) => {
                let _ = handle.join();
                Ok(pages)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                tracing::warn!("Per-page PDF extraction failed: {}, trying whole-document", e);
                pdf_extract::extract_text_from_mem(data)
                    .map(|text| vec![text])
                    .map_err(|e| Error::parse_failure(filename, e.to_string()))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Extraction thread is still running and cannot be killed.
                tracing::error!("PDF extraction timeout after 60s");
                Err(Error::parse_failure(filename, "extraction timed out after 60s"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(Error::parse_failure(filename, "extraction thread crashed"))
            }
        }
    }

    /// Parse PDF document
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let raw_pages = Self::extract_pdf_pages_with_timeout(filename, data)?;

        let mut content = String::new();
        let mut blocks = Vec::new();

        for (i, raw) in raw_pages.iter().enumerate() {
            let page_text = cleanup_extracted_text(raw);
            if page_text.trim().is_empty() {
                continue;
            }

            blocks.push(DocBlock {
                char_offset: content.len(),
                content: page_text.clone(),
                page_number: Some(i as u32 + 1),
                headings: Vec::new(),
            });
            content.push_str(&page_text);
            content.push('\n');
        }

        if content.trim().is_empty() {
            return Err(Error::parse_failure(
                filename,
                "no text content could be extracted from PDF",
            ));
        }

        // Page count from the document catalog; extraction may have
        // skipped blank pages.
        let total_pages = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(_) => Some(raw_pages.len() as u32),
        };

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            source_filename: filename.to_string(),
            content_hash: hash_content(&content),
            content,
            total_pages,
            blocks,
            metadata: HashMap::new(),
        })
    }

    /// Parse DOCX document
    fn parse_docx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::parse_failure(filename, e.to_string()))?;

        let mut content = String::new();

        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                content.push_str(&t.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        if content.trim().is_empty() {
            return Err(Error::parse_failure(filename, "no text content in document"));
        }

        // DOCX carries no page breaks in its body XML; the whole body is
        // one block on page 1.
        let blocks = vec![DocBlock {
            content: content.clone(),
            page_number: Some(1),
            headings: Vec::new(),
            char_offset: 0,
        }];

        Ok(ParsedDocument {
            file_type: FileType::Docx,
            source_filename: filename.to_string(),
            content_hash: hash_content(&content),
            content,
            total_pages: Some(1),
            blocks,
            metadata: HashMap::new(),
        })
    }

    /// Parse PowerPoint presentation (.pptx)
    fn parse_pptx(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        use std::io::Read;

        let cursor = std::io::Cursor::new(data);
        let mut archive =
            zip::ZipArchive::new(cursor).map_err(|e| Error::parse_failure(filename, e.to_string()))?;

        let mut content = String::new();
        let mut blocks = Vec::new();

        // Slide files live at ppt/slides/slideN.xml; sort by N.
        let mut slide_names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();

        slide_names.sort_by_key(|name| {
            name.trim_start_matches("ppt/slides/slide")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(0)
        });

        let mut slide_number = 0u32;

        for slide_name in slide_names {
            slide_number += 1;

            if let Ok(mut file) = archive.by_name(&slide_name) {
                let mut xml_content = String::new();
                if file.read_to_string(&mut xml_content).is_ok() {
                    let slide_text = extract_text_from_slide_xml(&xml_content);

                    if !slide_text.is_empty() {
                        blocks.push(DocBlock {
                            char_offset: content.len(),
                            content: slide_text.clone(),
                            page_number: Some(slide_number),
                            headings: Vec::new(),
                        });
                        content.push_str(&slide_text);
                        content.push('\n');
                    }
                }
            }
        }

        if content.trim().is_empty() {
            return Err(Error::parse_failure(
                filename,
                "no text content could be extracted from presentation",
            ));
        }

        Ok(ParsedDocument {
            file_type: FileType::Pptx,
            source_filename: filename.to_string(),
            content_hash: hash_content(&content),
            content,
            total_pages: Some(slide_number),
            blocks,
            metadata: HashMap::new(),
        })
    }

    /// Parse Markdown, tracking the heading hierarchy per section
    fn parse_markdown(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

        let text = String::from_utf8_lossy(data).to_string();
        let parser = Parser::new(&text);

        let mut content = String::new();
        let mut blocks: Vec<DocBlock> = Vec::new();
        let mut heading_stack: Vec<(HeadingLevel, String)> = Vec::new();
        let mut section = String::new();
        let mut heading_text = String::new();
        let mut in_heading = false;
        let mut pending_level = HeadingLevel::H1;

        let flush_section =
            |section: &mut String, content: &mut String, blocks: &mut Vec<DocBlock>, stack: &[(HeadingLevel, String)]| {
                let trimmed = section.trim();
                if !trimmed.is_empty() {
                    blocks.push(DocBlock {
                        char_offset: content.len(),
                        content: trimmed.to_string(),
                        page_number: None,
                        headings: stack.iter().map(|(_, h)| h.clone()).collect(),
                    });
                    content.push_str(trimmed);
                    content.push('\n');
                }
                section.clear();
            };

        for event in parser {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    flush_section(&mut section, &mut content, &mut blocks, &heading_stack);
                    in_heading = true;
                    heading_text.clear();
                    pending_level = level;
                }
                Event::End(TagEnd::Heading(_)) => {
                    in_heading = false;
                    while heading_stack
                        .last()
                        .is_some_and(|(level, _)| *level >= pending_level)
                    {
                        heading_stack.pop();
                    }
                    heading_stack.push((pending_level, heading_text.trim().to_string()));
                }
                Event::Text(t) | Event::Code(t) => {
                    if in_heading {
                        heading_text.push_str(&t);
                    } else {
                        section.push_str(&t);
                    }
                }
                Event::SoftBreak | Event::HardBreak => section.push('\n'),
                Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock) => {
                    section.push('\n');
                }
                _ => {}
            }
        }
        flush_section(&mut section, &mut content, &mut blocks, &heading_stack);

        Ok(ParsedDocument {
            file_type: FileType::Markdown,
            source_filename: filename.to_string(),
            content_hash: hash_content(&content),
            content,
            total_pages: None,
            blocks,
            metadata: HashMap::new(),
        })
    }
}

/// Extract text from a PowerPoint slide's XML (<a:t> elements)
fn extract_text_from_slide_xml(xml: &str) -> String {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut text_parts = Vec::new();
    let mut in_text_element = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                    current_text.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_text_element {
                    if let Ok(text) = e.unescape() {
                        current_text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"t" && in_text_element {
                    if !current_text.trim().is_empty() {
                        text_parts.push(current_text.trim().to_string());
                    }
                    in_text_element = false;
                }
                if name.as_ref() == b"p" && !text_parts.is_empty() {
                    text_parts.push("\n".to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    text_parts
        .join(" ")
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize typographic Unicode that PDF fonts emit and strip null bytes
fn cleanup_extracted_text(text: &str) -> String {
    let replaced = text
        .replace('\0', "")
        .replace('\u{2010}', "-")
        .replace('\u{2011}', "-")
        .replace('\u{2013}', "-")
        .replace('\u{2014}', "--")
        .replace('\u{2018}', "'")
        .replace('\u{2019}', "'")
        .replace('\u{201C}', "\"")
        .replace('\u{201D}', "\"")
        .replace('\u{2022}', "* ")
        .replace('\u{2026}', "...")
        .replace('\u{00A0}', " ")
        .replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl");

    replaced
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hash content with SHA-256
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
