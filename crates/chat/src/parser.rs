//! Response parser: splits raw model output into answer text and citations.
//!
//! The answer template asks the model to close with a blank line and a JSON
//! object mapping source names to URLs. This module finds that trailing
//! block, removes it from the answer and decodes it. Decoding never fails:
//! anything that is not a flat string-to-string mapping yields no citations.

use crate::types::CitationMap;
use serde_json::Value;

/// Split `raw` into `(answer, sources)`.
///
/// Only a brace block anchored to the end of the text (trailing whitespace
/// allowed) is treated as the citation block. Brace text earlier in the
/// answer is left untouched.
///
/// # Example
/// ```
/// use websage_chat::parse_response;
///
/// let (answer, sources) =
///     parse_response("Paris is the capital.\n\n{\"Britannica\": \"https://britannica.com/place/Paris\"}");
/// assert_eq!(answer, "Paris is the capital.");
/// assert_eq!(sources["Britannica"], "https://britannica.com/place/Paris");
/// ```
pub fn parse_response(raw: &str) -> (String, CitationMap) {
    let Some(start) = find_trailing_block(raw) else {
        return (raw.trim().to_string(), CitationMap::new());
    };

    let answer = raw[..start].trim().to_string();
    let block = raw[start..].trim_end();

    let sources = decode_citations(block).unwrap_or_else(|| {
        tracing::debug!("Discarding malformed citation block ({} bytes)", block.len());
        CitationMap::new()
    });

    (answer, sources)
}

/// Byte offset of the `{` opening the block that closes at the end of `raw`.
///
/// Scans backwards from the final `}` tracking brace depth; braces inside
/// single- or double-quoted strings do not count. Prose inside a malformed
/// block can leave a quote unclosed (`{it's unclear}`), so a quote-aware scan
/// that finds no opening brace is repeated with plain depth counting.
fn find_trailing_block(raw: &str) -> Option<usize> {
    let trimmed = raw.trim_end();
    if !trimmed.ends_with('}') {
        return None;
    }

    let chars: Vec<(usize, char)> = trimmed.char_indices().collect();
    scan_for_opening(&chars, true).or_else(|| scan_for_opening(&chars, false))
}

fn scan_for_opening(chars: &[(usize, char)], respect_quotes: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for i in (0..chars.len()).rev() {
        let (pos, c) = chars[i];

        if let Some(open) = quote {
            if c == open && !is_escaped(chars, i) {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' if respect_quotes && !is_escaped(chars, i) => quote = Some(c),
            '}' => depth += 1,
            '{' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }

    None
}

/// Whether the char at `i` is preceded by an odd number of backslashes.
fn is_escaped(chars: &[(usize, char)], i: usize) -> bool {
    chars[..i]
        .iter()
        .rev()
        .take_while(|(_, c)| *c == '\\')
        .count()
        % 2
        == 1
}

/// Decode a citation block: strict JSON first, then a flat quoted literal.
fn decode_citations(block: &str) -> Option<CitationMap> {
    let entries = match serde_json::from_str::<Value>(block) {
        Ok(Value::Object(object)) => object
            .into_iter()
            .filter_map(|(name, url)| match url {
                Value::String(url) => Some((name, url)),
                other => {
                    tracing::debug!("Dropping citation '{}' with non-string value {}", name, other);
                    None
                }
            })
            .collect(),
        Ok(_) => return None,
        Err(_) => FlatLiteral::new(block).parse()?,
    };

    Some(
        entries
            .into_iter()
            .filter(|(name, _)| !name.trim().is_empty())
            .collect(),
    )
}

/// Decoder for `{'name': 'url', "name2": "url2"}` style mappings.
///
/// Accepts only quoted strings as keys and values, either quote style,
/// backslash escapes, and an optional trailing comma. Nothing is evaluated.
struct FlatLiteral<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> FlatLiteral<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
        }
    }

    fn parse(mut self) -> Option<Vec<(String, String)>> {
        let mut entries = Vec::new();

        self.skip_whitespace();
        self.expect('{')?;
        self.skip_whitespace();

        if self.chars.peek() == Some(&'}') {
            self.chars.next();
        } else {
            loop {
                let key = self.string()?;
                self.skip_whitespace();
                self.expect(':')?;
                self.skip_whitespace();
                let value = self.string()?;
                entries.push((key, value));
                self.skip_whitespace();

                match self.chars.next()? {
                    '}' => break,
                    ',' => {
                        self.skip_whitespace();
                        if self.chars.peek() == Some(&'}') {
                            self.chars.next();
                            break;
                        }
                    }
                    _ => return None,
                }
            }
        }

        self.skip_whitespace();
        if self.chars.next().is_some() {
            return None;
        }

        Some(entries)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        (self.chars.next()? == expected).then_some(())
    }

    /// Four hex digits following `\u`.
    fn hex4(&mut self) -> Option<u32> {
        let mut code = 0;
        for _ in 0..4 {
            code = code * 16 + self.chars.next()?.to_digit(16)?;
        }
        Some(code)
    }

    /// Decode the rest of a `\uXXXX` escape, joining surrogate pairs.
    /// A lone or invalid surrogate rejects the whole literal.
    fn unicode_escape(&mut self) -> Option<char> {
        let high = self.hex4()?;
        if !(0xD800..=0xDBFF).contains(&high) {
            return char::from_u32(high);
        }

        self.expect('\\')?;
        self.expect('u')?;
        let low = self.hex4()?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return None;
        }
        char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
    }

    fn string(&mut self) -> Option<String> {
        let quote = self.chars.next().filter(|c| *c == '"' || *c == '\'')?;
        let mut out = String::new();

        loop {
            match self.chars.next()? {
                '\\' => match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'u' => out.push(self.unicode_escape()?),
                    other => out.push(other),
                },
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }
}
