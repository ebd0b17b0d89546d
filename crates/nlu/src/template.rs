// crates/nlu/src/template.rs

use std::cmp::Ordering;

use barista_core::{BaristaError, BaristaResult, Slot, SlotCapture};
use regex::{Regex, RegexBuilder};

// Spacing and punctuation between tokens. Word boundaries are fenced separately.
const SEPARATOR: &str = r"[\s,.!?;:]*";
const APOSTROPHE: &str = "['’]?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureMode {
    /// `$(SLOT a|b|c)`
    Exact,
    /// `$(SLOT~ a|b|c)`, resolved to the closest alternative.
    Fuzzy,
    /// `$(SLOT* regex)`, regex embedded verbatim.
    Regex,
    /// `$(NAME)`
    FreeText,
}

#[derive(Debug, Clone, PartialEq)]
struct SlotSpec {
    slot: Slot,
    mode: CaptureMode,
    pattern: String,
}

impl SlotSpec {
    fn alternatives(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.pattern
            .split('|')
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
    }

    fn regex_fragment(&self) -> String {
        match self.mode {
            CaptureMode::Exact => self
                .alternatives()
                .map(|alt| {
                    alt.split_whitespace()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join(r"\s+")
                })
                .collect::<Vec<_>>()
                .join("|"),
            CaptureMode::Fuzzy | CaptureMode::FreeText => ".+?".to_string(),
            CaptureMode::Regex => format!("(?:{})", self.pattern),
        }
    }

    fn closest(&self, raw: &str, threshold: f64) -> Option<&str> {
        let needle = raw.to_lowercase();
        // reversed so that ties keep the first alternative
        self.alternatives()
            .rev()
            .map(|alt| (alt, strsim::jaro_winkler(&needle, &alt.to_lowercase())))
            .filter(|(_, score)| *score >= threshold)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .map(|(alt, _)| alt)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Choice(Vec<String>),
    Slot(SlotSpec),
}

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    slots: Vec<SlotSpec>,
    regex: Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch {
    pub slots: Vec<SlotCapture>,
    // Alphanumeric characters matched outside of slots.
    pub literal_len: usize,
}

impl Template {
    pub fn parse(source: &str) -> BaristaResult<Self> {
        let nodes = parse_nodes(source)?;

        let mut pattern = format!("^{}", SEPARATOR);
        let mut slots: Vec<SlotSpec> = Vec::new();
        let last = nodes.len() - 1;

        for (index, node) in nodes.iter().enumerate() {
            match node {
                Node::Text(text) => {
                    pattern.push_str(&literal_fragment(text, index == 0, index == last))
                }
                Node::Choice(alternatives) => {
                    // no gap in the template glues the alternation to its neighbour
                    let gap_before = index == 0
                        || matches!(&nodes[index - 1], Node::Text(t) if t.ends_with(is_separator));
                    let gap_after = index == last
                        || matches!(&nodes[index + 1], Node::Text(t) if t.starts_with(is_separator));

                    let compiled = alternatives
                        .iter()
                        .map(|alt| {
                            let fragment = literal_fragment(alt, gap_before, gap_after);
                            if !gap_before && alt.starts_with(char::is_alphanumeric) {
                                format!("{}{}", APOSTROPHE, fragment)
                            } else {
                                fragment
                            }
                        })
                        .collect::<Vec<_>>()
                        .join("|");
                    pattern.push_str(&format!("(?:{})", compiled));
                }
                Node::Slot(spec) => {
                    if slots.iter().any(|existing| existing.slot == spec.slot) {
                        return Err(template_error(
                            source,
                            format!("slot {} declared twice", spec.slot),
                        ));
                    }
                    pattern.push_str(&format!(
                        "(?P<{}>{})",
                        spec.slot.as_str(),
                        spec.regex_fragment()
                    ));
                    slots.push(spec.clone());
                }
            }
        }

        pattern.push_str(SEPARATOR);
        pattern.push('$');

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .unicode(true)
            .build()
            .map_err(|e| template_error(source, e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            slots,
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn captures(&self, utterance: &str, fuzzy_threshold: f64) -> Option<TemplateMatch> {
        let caps = self.regex.captures(utterance)?;
        let whole = caps.get(0)?;

        let mut slots = Vec::with_capacity(self.slots.len());
        let mut slot_chars = 0;

        for spec in &self.slots {
            let m = caps.name(spec.slot.as_str())?;
            slot_chars += alphanumeric_len(m.as_str());

            let raw = m.as_str().trim();
            let value = match spec.mode {
                CaptureMode::Fuzzy => spec.closest(raw, fuzzy_threshold)?,
                _ => raw,
            };
            if value.is_empty() {
                return None;
            }
            slots.push(SlotCapture::new(spec.slot.as_str(), value));
        }

        Some(TemplateMatch {
            slots,
            literal_len: alphanumeric_len(whole.as_str()).saturating_sub(slot_chars),
        })
    }
}

fn alphanumeric_len(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphanumeric()).count()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ';' | ':')
}

// Words are fenced with `\b` wherever the template separates them, so a
// literal never runs into the neighbouring word of the utterance.
fn literal_fragment(text: &str, open_start: bool, open_end: bool) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let mut out = String::new();
    let mut in_separator = false;

    for (i, &c) in chars.iter().enumerate() {
        if is_separator(c) {
            if !in_separator {
                out.push_str(SEPARATOR);
                in_separator = true;
            }
            continue;
        }

        in_separator = false;
        if matches!(c, '\'' | '’') {
            out.push_str(APOSTROPHE);
            continue;
        }

        let word_start = match i.checked_sub(1) {
            Some(prev) => is_separator(chars[prev]),
            None => open_start,
        };
        let word_end = match chars.get(i + 1) {
            Some(next) => is_separator(*next),
            None => open_end,
        };

        if c.is_alphanumeric() && word_start {
            out.push_str(r"\b");
        }
        out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        if c.is_alphanumeric() && word_end {
            out.push_str(r"\b");
        }
    }

    out
}

fn parse_nodes(source: &str) -> BaristaResult<Vec<Node>> {
    let chars = source.chars().collect::<Vec<_>>();
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '$' if chars.get(i + 1) == Some(&'(') => {
                flush_text(&mut text, &mut nodes);
                let (body, next) = balanced_group(&chars, i + 1)
                    .ok_or_else(|| template_error(source, "unclosed slot"))?;
                nodes.push(Node::Slot(parse_slot(&body, source)?));
                i = next;
            }
            '(' => {
                flush_text(&mut text, &mut nodes);
                let end = chars[i + 1..]
                    .iter()
                    .position(|c| *c == ')')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| template_error(source, "unclosed alternation"))?;
                let body = chars[i + 1..end].iter().collect::<String>();
                if body.contains('(') || body.contains('$') {
                    return Err(template_error(source, "alternations cannot nest"));
                }
                nodes.push(Node::Choice(body.split('|').map(str::to_string).collect()));
                i = end + 1;
            }
            ')' => return Err(template_error(source, "unbalanced ')'")),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }

    flush_text(&mut text, &mut nodes);

    if nodes.iter().all(|node| matches!(node, Node::Text(t) if t.trim().is_empty())) {
        return Err(template_error(source, "template is empty"));
    }

    Ok(nodes)
}

fn flush_text(text: &mut String, nodes: &mut Vec<Node>) {
    if !text.is_empty() {
        nodes.push(Node::Text(std::mem::take(text)));
    }
}

// Returns the body between `chars[open]` and its matching `)`, plus the
// index just past it.
fn balanced_group(chars: &[char], open: usize) -> Option<(String, usize)> {
    let mut depth = 0usize;
    for (offset, c) in chars[open..].iter().enumerate() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + offset;
                    return Some((chars[open + 1..close].iter().collect(), close + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_slot(body: &str, source: &str) -> BaristaResult<SlotSpec> {
    let body = body.trim();
    let (head, pattern) = match body.split_once(char::is_whitespace) {
        Some((head, pattern)) => (head, pattern.trim()),
        None => (body, ""),
    };

    let (name, mode) = if let Some(name) = head.strip_suffix('~') {
        (name, CaptureMode::Fuzzy)
    } else if let Some(name) = head.strip_suffix('*') {
        (name, CaptureMode::Regex)
    } else {
        (head, CaptureMode::Exact)
    };

    let slot = name.parse::<Slot>()?;

    let mode = if pattern.is_empty() {
        if mode != CaptureMode::Exact || !slot.is_free_text() {
            return Err(template_error(
                source,
                format!("slot {} needs a pattern", slot),
            ));
        }
        CaptureMode::FreeText
    } else {
        mode
    };

    Ok(SlotSpec {
        slot,
        mode,
        pattern: pattern.to_string(),
    })
}

fn template_error(source: &str, reason: impl std::fmt::Display) -> BaristaError {
    BaristaError::Template(format!("'{}': {}", source, reason))
}
