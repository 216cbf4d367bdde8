//! Overlapping text chunker.
//!
//! Splits a document's text into [`Chunk`]s no longer than `chunk_size`
//! characters, with neighbouring chunks sharing up to `overlap` characters
//! so the completion service sees some context across each boundary.
//!
//! Two strategies implement [`Splitter`]:
//!
//! - **[`RecursiveSplitter`]**: splits on the coarsest separator present
//!   (`"\n\n"`, then `"\n"`, then `" "`, then single characters), recurses
//!   into pieces that are still too long, and merges adjacent pieces back up
//!   to the size limit. Windows are whitespace-trimmed, so they may realign
//!   on whitespace.
//! - **[`WindowSplitter`]**: fixed character windows. Each chunk starts
//!   `overlap` characters before the previous one ended, so the chunks
//!   stitch back into the input exactly.
//!
//! The strategy is picked from `[chunking].strategy` by [`create_splitter`].
//!
//! All lengths and offsets are in characters, not bytes.

use std::collections::VecDeque;

use crate::config::{ChunkingConfig, SplitStrategy};
use crate::models::{Chunk, Document};

/// Separators tried by [`RecursiveSplitter`], coarsest first.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A chunking strategy.
pub trait Splitter: Send + Sync {
    /// Short strategy name for logs.
    fn name(&self) -> &'static str;

    /// Splits `text` into ordered chunks. Empty input yields no chunks.
    fn split(&self, text: &str) -> Vec<Chunk>;
}

/// Builds the splitter selected by the configuration.
pub fn create_splitter(config: &ChunkingConfig) -> Box<dyn Splitter> {
    match config.strategy {
        SplitStrategy::Recursive => {
            Box::new(RecursiveSplitter::new(config.chunk_size, config.overlap))
        }
        SplitStrategy::Window => Box::new(WindowSplitter::new(config.chunk_size, config.overlap)),
    }
}

/// Chunks a whole document for summarization.
///
/// Documents no longer than `single_chunk_limit` characters are returned as
/// one chunk without consulting the splitter. An empty document still yields
/// one empty chunk, so every file gets a summary block.
pub fn chunk_document(
    splitter: &dyn Splitter,
    document: &Document,
    single_chunk_limit: usize,
) -> Vec<Chunk> {
    let len = document.char_len();
    if len <= single_chunk_limit {
        return vec![Chunk {
            index: 0,
            start: 0,
            end: len,
            overlap: 0,
            text: document.text.clone(),
        }];
    }
    splitter.split(&document.text)
}

// ============ Window splitter ============

/// Fixed-size character windows with overlap.
///
/// ```rust
/// use repo_scribe::chunk::{Splitter, WindowSplitter};
///
/// let text = "x".repeat(7000);
/// let chunks = WindowSplitter::new(2500, 200).split(&text);
/// let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
/// assert_eq!(starts, vec![0, 2300, 4600]);
/// assert_eq!(chunks.last().unwrap().end, 7000);
/// ```
#[derive(Debug, Clone)]
pub struct WindowSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl WindowSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
        }
    }
}

impl Splitter for WindowSplitter {
    fn name(&self) -> &'static str {
        "window"
    }

    fn split(&self, text: &str) -> Vec<Chunk> {
        let bounds = char_boundaries(text);
        let len = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut prev_end: usize = 0;

        while start < len {
            let end = (start + self.chunk_size).min(len);
            chunks.push(Chunk {
                index: chunks.len(),
                start,
                end,
                overlap: prev_end.saturating_sub(start),
                text: text[bounds[start]..bounds[end]].to_string(),
            });
            if end == len {
                break;
            }

            // Fall back to `end` when stepping back would not advance.
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
            prev_end = end;
        }

        chunks
    }
}

// ============ Recursive splitter ============

/// Separator-aware splitter that prefers paragraph, line and word boundaries.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self::with_separators(chunk_size, overlap, &DEFAULT_SEPARATORS)
    }

    /// Uses a custom separator priority list, coarsest first. An empty
    /// separator means "split into single characters".
    pub fn with_separators(chunk_size: usize, overlap: usize, separators: &[&str]) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn split_pieces(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut output = Vec::new();

        // Coarsest separator that occurs in the text; the rest are kept for
        // pieces that are still too long.
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep.as_str();
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut fitting: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                output.extend(self.merge_pieces(&fitting));
                fitting.clear();
            }
            if finer.is_empty() {
                output.push(piece.to_string());
            } else {
                output.extend(self.split_pieces(piece, finer));
            }
        }
        if !fitting.is_empty() {
            output.extend(self.merge_pieces(&fitting));
        }

        output
    }

    /// Greedily packs pieces into windows of at most `chunk_size` characters,
    /// carrying up to `overlap` trailing characters into the next window.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut windows = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_trimmed(&current, &mut windows);
                while total > self.overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some(first) => total -= char_len(first),
                        None => break,
                    }
                }
            }
            current.push_back(piece);
            total += len;
        }
        push_trimmed(&current, &mut windows);

        windows
    }
}

impl Splitter for RecursiveSplitter {
    fn name(&self) -> &'static str {
        "recursive"
    }

    fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }
        let windows = self.split_pieces(text, &self.separators);
        locate_windows(text, windows, self.overlap)
    }
}

/// Splits on `separator`, keeping each separator at the start of the piece
/// that follows it. Empty pieces are dropped. An empty separator splits into
/// single characters.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[last..idx]);
        last = idx;
    }
    pieces.push(&text[last..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn push_trimmed(current: &VecDeque<&str>, windows: &mut Vec<String>) {
    let joined: String = current.iter().copied().collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        windows.push(trimmed.to_string());
    }
}

/// Recovers character offsets for windows cut from `text`, in order.
///
/// A window never starts before the previous window's start, nor more than
/// `overlap` characters before the previous window's end.
fn locate_windows(text: &str, windows: Vec<String>, overlap: usize) -> Vec<Chunk> {
    let bounds = char_boundaries(text);
    let len = bounds.len() - 1;
    let mut chunks: Vec<Chunk> = Vec::with_capacity(windows.len());
    let mut prev_start: Option<usize> = None;
    let mut prev_end: usize = 0;

    for window in windows {
        let from_char = match prev_start {
            Some(s) => (s + 1).max(prev_end.saturating_sub(overlap)).min(len),
            None => 0,
        };
        let from = bounds[from_char];
        let start_byte = text[from..]
            .find(&window)
            .map(|i| from + i)
            .or_else(|| text.find(&window))
            .unwrap_or(from);

        let start = byte_to_char(&bounds, start_byte);
        let end = start + char_len(&window);
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
            overlap: if chunks.is_empty() {
                0
            } else {
                prev_end.saturating_sub(start)
            },
            text: window,
        });
        prev_start = Some(start);
        prev_end = end;
    }

    chunks
}

// ============ Character helpers ============

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of every character boundary, including the end of the text.
/// `bounds[i]` is the byte offset of character `i`.
fn char_boundaries(text: &str) -> Vec<usize> {
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    bounds
}

fn byte_to_char(bounds: &[usize], byte: usize) -> usize {
    match bounds.binary_search(&byte) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Concatenates chunks, dropping the characters each one shares with its
    /// predecessor.
    fn stitch(chunks: &[Chunk]) -> String {
        chunks
            .iter()
            .map(|c| c.text.chars().skip(c.overlap).collect::<String>())
            .collect()
    }

    fn sample_text(paragraphs: usize) -> String {
        (0..paragraphs)
            .map(|i| {
                format!(
                    "def handler_{i}(request):\n    value = compute({i})\n    return respond(value)"
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    // ---- window ----

    #[test]
    fn test_window_empty_text() {
        assert!(WindowSplitter::new(10, 2).split("").is_empty());
    }

    #[test]
    fn test_window_short_text_single_chunk() {
        let chunks = WindowSplitter::new(2500, 200).split("fn main() {}");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "fn main() {}");
        assert_eq!(chunks[0].start, 0);
        assert_eq!(chunks[0].end, 12);
        assert_eq!(chunks[0].overlap, 0);
    }

    #[test]
    fn test_window_exact_chunk_size_single_chunk() {
        let text = "a".repeat(2500);
        let chunks = WindowSplitter::new(2500, 200).split(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].end, 2500);
    }

    #[test]
    fn test_window_offsets_7000() {
        let text: String = (0..7000).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let chunks = WindowSplitter::new(2500, 200).split(&text);
        let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 2300, 4600]);
        assert_eq!(chunks.last().unwrap().end, 7000);
        for c in &chunks {
            assert!(c.text.chars().count() <= 2500);
        }
    }

    #[test]
    fn test_window_stops_when_end_reached() {
        let splitter = WindowSplitter::new(2500, 200);
        let chunks = splitter.split(&"x".repeat(7000));
        let overlaps: Vec<usize> = chunks.iter().map(|c| c.overlap).collect();
        assert_eq!(overlaps, vec![0, 200, 200]);
        // No trailing window made only of already-covered text.
        for pair in chunks.windows(2) {
            assert!(pair[1].end > pair[0].end);
        }

        let spans: Vec<(usize, usize)> = splitter
            .split(&"x".repeat(4800))
            .iter()
            .map(|c| (c.start, c.end))
            .collect();
        assert_eq!(spans, vec![(0, 2500), (2300, 4800)]);
    }

    #[test]
    fn test_window_consecutive_overlap() {
        let text = sample_text(60);
        let chunks = WindowSplitter::new(300, 40).split(&text);
        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start, pair[0].end - 40);
            assert_eq!(pair[1].overlap, 40);
            let tail: String = pair[0].text.chars().skip(300 - 40).collect();
            let head: String = pair[1].text.chars().take(40).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_window_round_trip() {
        let text = sample_text(45);
        for (size, overlap) in [(100, 0), (100, 99), (257, 31), (1000, 200)] {
            let chunks = WindowSplitter::new(size, overlap).split(&text);
            assert_eq!(stitch(&chunks), text, "size={} overlap={}", size, overlap);
        }
    }

    #[test]
    fn test_window_no_gaps() {
        let text = "z".repeat(1234);
        let chunks = WindowSplitter::new(100, 30).split(&text);
        assert_eq!(chunks[0].start, 0);
        for pair in chunks.windows(2) {
            assert!(pair[1].start <= pair[0].end);
            assert!(pair[1].start > pair[0].start);
        }
        assert_eq!(chunks.last().unwrap().end, 1234);
    }

    #[test]
    fn test_window_multibyte_boundaries() {
        let text = "héllo wörld ✓ ".repeat(50);
        let chunks = WindowSplitter::new(37, 5).split(&text);
        assert_eq!(stitch(&chunks), text);
        for c in &chunks {
            assert_eq!(c.text.chars().count(), c.end - c.start);
        }
    }

    #[test]
    fn test_window_indices_contiguous() {
        let chunks = WindowSplitter::new(10, 3).split(&"q".repeat(95));
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    // ---- recursive ----

    #[test]
    fn test_recursive_empty_text() {
        assert!(RecursiveSplitter::new(100, 10).split("").is_empty());
    }

    #[test]
    fn test_recursive_short_text_single_chunk() {
        let text = "First paragraph.\n\nSecond paragraph.";
        let chunks = RecursiveSplitter::new(2500, 200).split(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn test_recursive_respects_chunk_size() {
        let text = sample_text(80);
        let chunks = RecursiveSplitter::new(200, 40).split(&text);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(
                c.text.chars().count() <= 200,
                "chunk {} too long: {}",
                c.index,
                c.text.chars().count()
            );
        }
    }

    #[test]
    fn test_recursive_prefers_paragraph_boundaries() {
        let text = "alpha alpha alpha\n\nbeta beta beta\n\ngamma gamma gamma";
        let chunks = RecursiveSplitter::new(20, 0).split(text);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha alpha alpha", "beta beta beta", "gamma gamma gamma"]);
    }

    #[test]
    fn test_recursive_falls_back_to_words() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = RecursiveSplitter::new(15, 0).split(text);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.chars().count() <= 15);
            assert!(!c.text.starts_with(' '));
        }
        let words: Vec<&str> = chunks.iter().flat_map(|c| c.text.split(' ')).collect();
        assert_eq!(words.join(" "), text);
    }

    #[test]
    fn test_recursive_falls_back_to_characters() {
        let text = "x".repeat(45);
        let chunks = RecursiveSplitter::new(10, 0).split(&text);
        assert_eq!(chunks.len(), 5);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 10));
    }

    #[test]
    fn test_recursive_carries_overlap() {
        let text = "aa bb cc dd ee ff gg hh ii jj kk ll";
        let chunks = RecursiveSplitter::new(9, 3).split(text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_word = pair[0].text.split(' ').last().unwrap();
            assert!(
                pair[1].text.starts_with(last_word),
                "{:?} does not continue {:?}",
                pair[1].text,
                pair[0].text
            );
            assert!(pair[1].overlap > 0);
        }
    }

    #[test]
    fn test_recursive_offsets_point_into_text() {
        let text = sample_text(30);
        let chunks = RecursiveSplitter::new(150, 30).split(&text);
        let chars: Vec<char> = text.chars().collect();
        for c in &chunks {
            let slice: String = chars[c.start..c.end].iter().collect();
            assert_eq!(slice, c.text);
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn test_recursive_covers_all_content() {
        let text = sample_text(25);
        let chunks = RecursiveSplitter::new(120, 20).split(&text);
        let mut covered = vec![false; text.chars().count()];
        for c in &chunks {
            for slot in &mut covered[c.start..c.end] {
                *slot = true;
            }
        }
        for (i, ch) in text.chars().enumerate() {
            if !ch.is_whitespace() {
                assert!(covered[i], "character {} ({:?}) not covered", i, ch);
            }
        }
    }

    #[test]
    fn test_split_keep_separator() {
        assert_eq!(
            split_keep_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keep_separator("\nx", "\n"), vec!["\nx"]);
        assert_eq!(split_keep_separator("hé", ""), vec!["h", "é"]);
    }

    // ---- selection ----

    #[test]
    fn test_create_splitter_follows_config() {
        let mut config = ChunkingConfig::default();
        assert_eq!(create_splitter(&config).name(), "recursive");
        config.strategy = SplitStrategy::Window;
        assert_eq!(create_splitter(&config).name(), "window");
    }

    #[test]
    fn test_chunk_document_below_limit_is_whole() {
        let doc = Document {
            path: "app.py".into(),
            text: "print('hi')\n".repeat(200),
        };
        let splitter = WindowSplitter::new(100, 10);
        let chunks = chunk_document(&splitter, &doc, 3000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, doc.text);
    }

    #[test]
    fn test_chunk_document_above_limit_splits() {
        let doc = Document {
            path: "app.py".into(),
            text: "y".repeat(3001),
        };
        let splitter = WindowSplitter::new(2500, 200);
        let chunks = chunk_document(&splitter, &doc, 3000);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].start, 2300);
    }

    #[test]
    fn test_chunk_document_empty() {
        let doc = Document {
            path: "empty.txt".into(),
            text: String::new(),
        };
        let chunks = chunk_document(&WindowSplitter::new(10, 1), &doc, 3000);
        assert_eq!(chunks.len(), 1);
        assert_eq!((chunks[0].start, chunks[0].end), (0, 0));
        assert!(chunks[0].text.is_empty());
    }
}
