//! List, table, preamble and bibliography sub-parsers.

use super::grammar;
use super::inline::parse_inline;
use crate::error::ParseResult;
use crate::models::{Alignment, Attribute, Block, ListItem, Preamble, Table};

/// Parse the bullet lines of a list block.
///
/// Lines that do not start with a bullet are skipped. The list is ordered
/// only when every item uses a numbered bullet.
///
/// # Errors
///
/// Propagates inline scanner failures from item content.
pub fn parse_list(src: &str) -> ParseResult<Block> {
    let mut ordered = true;
    let mut items = Vec::new();

    for line in src.split('\n') {
        let Some(caps) = grammar::LIST_ITEM.captures(line) else {
            continue;
        };
        ordered &= caps[2].len() > 1;
        items.push(ListItem {
            indent: u32::try_from(caps[1].len()).unwrap_or(u32::MAX),
            content: parse_inline(&line[caps[0].len()..])?,
        });
    }

    Ok(Block::List { ordered, items })
}

/// Split a table row on pipes that are not backslash-escaped, trimming cells.
fn split_cells(row: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut prev = None;
    for (i, c) in row.char_indices() {
        if c == '|' && prev != Some('\\') {
            cells.push(row[start..i].trim());
            start = i + 1;
        }
        prev = Some(c);
    }
    cells.push(row[start..].trim());
    cells
}

fn is_dashes(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'-')
}

fn parse_alignment(cell: &str) -> Option<Alignment> {
    let cell = cell.trim();
    if let Some(inner) = cell.strip_prefix(':').and_then(|s| s.strip_suffix(':'))
        && is_dashes(inner)
    {
        Some(Alignment::Center)
    } else if cell.strip_suffix(':').is_some_and(is_dashes) {
        Some(Alignment::Right)
    } else if cell.strip_prefix(':').is_some_and(is_dashes) {
        Some(Alignment::Left)
    } else {
        None
    }
}

/// Parse a pipe table from its header row, alignment row and body lines.
///
/// The header and alignment rows arrive without their outer pipes; each body
/// line still carries them.
///
/// # Errors
///
/// Propagates inline scanner failures from cell content.
pub fn parse_table(header: &str, align: &str, body: &str) -> ParseResult<Table> {
    let header = split_cells(header.trim())
        .into_iter()
        .map(parse_inline)
        .collect::<ParseResult<Vec<_>>>()?;
    let align = split_cells(align.trim())
        .into_iter()
        .map(parse_alignment)
        .collect();

    let mut rows = Vec::new();
    for line in body.trim().split('\n').filter(|line| !line.trim().is_empty()) {
        let line = line.trim();
        let line = line.strip_prefix('|').unwrap_or(line);
        let line = line.strip_suffix('|').unwrap_or(line);
        let row = split_cells(line)
            .into_iter()
            .map(parse_inline)
            .collect::<ParseResult<Vec<_>>>()?;
        rows.push(row);
    }

    Ok(Table {
        header,
        align,
        rows,
    })
}

/// Parse a title preamble into macros and tags.
///
/// Entries are separated by newlines, commas or semicolons. `name:value`
/// entries become macros; `#tag` or `#[multi word]` entries become tags.
/// The two checks are independent, so one entry may yield both. A macro
/// defined twice keeps its first position and its last value.
#[must_use]
pub fn parse_preamble(src: &str) -> Preamble {
    let mut preamble = Preamble::default();
    for item in src.split(['\n', ',', ';']).filter(|item| !item.is_empty()) {
        if let Some((name, value)) = item.split_once(':') {
            let name = name.trim();
            match preamble.macros.iter_mut().find(|attr| attr.key == name) {
                Some(existing) => existing.value = value.trim().to_string(),
                None => preamble.macros.push(Attribute::new(name, value.trim())),
            }
        }
        if grammar::PREAMBLE_TAG.is_match(item) {
            let tag = item
                .replacen('#', "", 1)
                .replacen('[', "", 1)
                .replacen(']', "", 1);
            preamble.tags.push(tag.trim().to_string());
        }
    }
    preamble
}

/// Build a bibliography block from `key: value` lines.
#[must_use]
pub fn parse_biblio(id: &str, text: &str) -> Block {
    let entries = text
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| Attribute::new(key.trim(), value.trim()))
        .collect();
    Block::Biblio {
        id: id.to_string(),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Inline;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unordered_list_items() {
        let block = parse_list("- one\n  * two").unwrap();
        let Block::List { ordered, items } = block else {
            panic!("expected list");
        };
        assert!(!ordered);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].indent, 0);
        assert_eq!(items[1].indent, 2);
        assert_eq!(items[1].content, vec![Inline::text("two")]);
    }

    #[test]
    fn test_ordered_only_when_all_numbered() {
        let Block::List { ordered, .. } = parse_list("1. a\n2. b").unwrap() else {
            panic!("expected list");
        };
        assert!(ordered);
        let Block::List { ordered, .. } = parse_list("1. a\n- b").unwrap() else {
            panic!("expected list");
        };
        assert!(!ordered);
    }

    #[test]
    fn test_list_skips_non_bullet_lines() {
        let Block::List { items, .. } = parse_list("- a\n\n- b").unwrap() else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_alignment_cells() {
        assert_eq!(parse_alignment(" --: "), Some(Alignment::Right));
        assert_eq!(parse_alignment(":-:"), Some(Alignment::Center));
        assert_eq!(parse_alignment(":--"), Some(Alignment::Left));
        assert_eq!(parse_alignment("---"), None);
        assert_eq!(parse_alignment(":"), None);
    }

    #[test]
    fn test_split_cells_respects_escapes() {
        assert_eq!(split_cells(r" a | b\|c | d "), vec!["a", r"b\|c", "d"]);
    }

    #[test]
    fn test_table_rows() {
        let table = parse_table(" a | b ", " :- | -: ", "| 1 | 2 |\n| 3 | 4 |\n").unwrap();
        assert_eq!(table.header, vec![vec![Inline::text("a")], vec![Inline::text("b")]]);
        assert_eq!(table.align, vec![Some(Alignment::Left), Some(Alignment::Right)]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], vec![Inline::text("3")]);
    }

    #[test]
    fn test_table_empty_body() {
        let table = parse_table("a", "---", "").unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.align, vec![None]);
    }

    #[test]
    fn test_preamble_macros_and_tags() {
        let preamble = parse_preamble("\\R:\\mathbb{R}, #draft; #[big idea]\nplain");
        assert_eq!(preamble.macros, vec![Attribute::new("\\R", "\\mathbb{R}")]);
        assert_eq!(preamble.tags, vec!["draft".to_string(), "big idea".to_string()]);
    }

    #[test]
    fn test_preamble_later_macro_wins() {
        let preamble = parse_preamble("\\a:1\n\\b:2; \\a:3");
        assert_eq!(
            preamble.macros,
            vec![Attribute::new("\\a", "3"), Attribute::new("\\b", "2")]
        );
    }

    #[test]
    fn test_preamble_entry_can_be_macro_and_tag() {
        let preamble = parse_preamble("#topic x:1");
        assert_eq!(preamble.macros, vec![Attribute::new("#topic x", "1")]);
        assert_eq!(preamble.tags, vec!["topic x:1".to_string()]);
    }

    #[test]
    fn test_biblio_entries() {
        let Block::Biblio { id, entries } = parse_biblio("knuth84", "author: Knuth\ntitle: TeX") else {
            panic!("expected biblio");
        };
        assert_eq!(id, "knuth84");
        assert_eq!(entries[1], Attribute::new("title", "TeX"));
    }
}
