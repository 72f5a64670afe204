use serde::Serialize;

use crate::properties::RichText;

/// Maximum length of one text fragment, in UTF-16 code units as the remote
/// service counts them.
pub const MAX_TEXT_LEN: usize = 2000;

/// Maximum children accepted by a single block-append call.
pub const MAX_BLOCKS_PER_APPEND: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub rich_text: Vec<RichText>,
}

/// A paragraph block: `{"object": "block", "type": "paragraph", "paragraph": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub object: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub paragraph: Paragraph,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            object: "block",
            kind: "paragraph",
            paragraph: Paragraph {
                rich_text: vec![RichText::text(text)],
            },
        }
    }
}

/// Split `text` into pieces of at most `max` UTF-16 code units, never inside
/// a character. A character wider than `max` still gets a piece of its own.
pub fn split_text(text: &str, max: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut units = 0;
        let mut end = rest.len();
        for (idx, c) in rest.char_indices() {
            units += c.len_utf16();
            if units > max {
                end = if idx == 0 { c.len_utf8() } else { idx };
                break;
            }
        }
        let (head, tail) = rest.split_at(end);
        pieces.push(head);
        rest = tail;
    }
    pieces
}

/// Turn an email body into paragraph blocks that each fit one text fragment.
pub fn body_blocks(text: &str) -> Vec<Block> {
    split_text(text, MAX_TEXT_LEN)
        .into_iter()
        .map(Block::paragraph)
        .collect()
}
