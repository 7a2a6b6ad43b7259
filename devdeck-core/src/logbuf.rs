/// Append-only log of command output blocks
///
/// Blocks are stored raw and wrapped to the viewport width only when the
/// visible lines are read. The scroll offset counts wrapped lines from the
/// top and is clamped to `[0, max(0, total - visible)]` by every mutation,
/// so the viewport can never scroll past the content.
#[derive(Clone, Debug, Default)]
pub struct LogBuffer {
    blocks: Vec<String>,
    scroll: usize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one block of text (may span multiple lines)
    pub fn append(&mut self, block: impl Into<String>) {
        self.blocks.push(block.into());
    }

    /// Wrapped line count at the given width
    pub fn total_lines(&self, width: u16) -> usize {
        self.wrapped(width).len()
    }

    /// Current scroll offset in wrapped lines from the top
    pub fn offset(&self) -> usize {
        self.scroll
    }

    /// Scroll by `delta` lines, clamped to the content
    pub fn scroll_by(&mut self, delta: isize, width: u16, height: u16) {
        let max = self.max_scroll(width, height) as isize;
        let next = self.scroll as isize + delta;
        self.scroll = next.clamp(0, max) as usize;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self, width: u16, height: u16) {
        self.scroll = self.max_scroll(width, height);
    }

    /// Re-clamp after a viewport size change
    pub fn clamp_scroll(&mut self, width: u16, height: u16) {
        self.scroll = self.scroll.min(self.max_scroll(width, height));
    }

    /// The slice of wrapped lines the viewport shows
    pub fn visible_lines(&self, width: u16, height: u16) -> Vec<String> {
        let height = height as usize;
        if height == 0 {
            return Vec::new();
        }
        let lines = self.wrapped(width);
        let offset = self.scroll.min(lines.len().saturating_sub(height));
        lines.into_iter().skip(offset).take(height).collect()
    }

    fn max_scroll(&self, width: u16, height: u16) -> usize {
        self.total_lines(width).saturating_sub(height as usize)
    }

    // Blocks render in arrival order with one blank line between them.
    fn wrapped(&self, width: u16) -> Vec<String> {
        let width = width as usize;
        if width == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for block in &self.blocks {
            if !out.is_empty() {
                out.push(String::new());
            }
            for line in block.lines() {
                wrap_line(&mut out, line, width);
            }
        }
        out
    }
}

fn wrap_line(out: &mut Vec<String>, line: &str, width: usize) {
    if line.is_empty() {
        out.push(String::new());
        return;
    }
    let chars: Vec<char> = line.chars().collect();
    for chunk in chars.chunks(width) {
        out.push(chunk.iter().collect());
    }
}
