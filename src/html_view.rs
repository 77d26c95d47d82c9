//! # HTML View Module
//!
//! Paints a rendered [`HtmlDocument`] with egui. The document is parsed once
//! into a flat list of [`Block`]s when it is loaded; every frame after that
//! only lays the blocks out.
//!
//! Only the markup the Markdown renderer produces is understood: headings,
//! paragraphs, block quotes, lists, rules, tables, `pre` code blocks with
//! syntect's colored spans, and the usual inline tags. Unknown tags are
//! transparent and their text is kept. `<style>` and `<script>` contents
//! are dropped.

use egui::text::LayoutJob;
use egui::{Color32, FontId, Stroke, TextFormat, Ui};

use crate::markdown::HtmlDocument;

/// Inline formatting of a run of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strike: bool,
    pub color: Option<Color32>,
    pub link: Option<String>,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

/// A block-level element of the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        spans: Vec<Span>,
    },
    Paragraph(Vec<Span>),
    Quote(Vec<Span>),
    ListItem {
        /// Item number for ordered lists.
        number: Option<u64>,
        depth: usize,
        spans: Vec<Span>,
    },
    Code(Vec<Span>),
    Table {
        header: Vec<Vec<Span>>,
        rows: Vec<Vec<Vec<Span>>>,
    },
    Rule,
}

/// Plain text of a span list, for tests and logging.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

/// Parsed document plus the settings used to paint it.
#[derive(Debug, Clone, Default)]
pub struct HtmlView {
    blocks: Vec<Block>,
}

impl HtmlView {
    pub fn new(document: &HtmlDocument) -> Self {
        Self {
            blocks: parse(document.as_str()),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Lay the document out into `ui`, wrapping at `content_width`.
    pub fn show(&self, ui: &mut Ui, base_font_size: f32, content_width: f32) {
        let painter = BlockPainter {
            base_font_size,
            content_width,
        };
        for (index, block) in self.blocks.iter().enumerate() {
            painter.paint(ui, index, block);
        }
    }
}

struct BlockPainter {
    base_font_size: f32,
    content_width: f32,
}

impl BlockPainter {
    fn paint(&self, ui: &mut Ui, index: usize, block: &Block) {
        match block {
            Block::Heading { level, spans } => {
                self.render_heading(ui, spans, *level);
                ui.add_space(12.0);
            }
            Block::Paragraph(spans) => {
                let job = self.layout_spans(ui, spans, self.base_font_size, self.content_width);
                self.render_paragraph_with_links(ui, job, spans, self.content_width);
                ui.add_space(8.0);
            }
            Block::Quote(spans) => {
                self.render_blockquote(ui, spans);
                ui.add_space(8.0);
            }
            Block::ListItem {
                number,
                depth,
                spans,
            } => {
                self.render_list_item(ui, *number, *depth, spans);
                ui.add_space(4.0);
            }
            Block::Code(spans) => {
                self.render_code_block(ui, spans);
                ui.add_space(8.0);
            }
            Block::Table { header, rows } => {
                self.render_table(ui, index, header, rows);
                ui.add_space(8.0);
            }
            Block::Rule => {
                ui.separator();
                ui.add_space(8.0);
            }
        }
    }

    fn layout_spans(&self, ui: &Ui, spans: &[Span], font_size: f32, max_width: f32) -> LayoutJob {
        let mut job = LayoutJob::default();
        job.wrap.max_width = max_width;
        job.wrap.break_anywhere = false;
        job.halign = egui::Align::LEFT;

        for span in spans {
            let style = &span.style;
            let color = if let Some(color) = style.color {
                color
            } else if style.link.is_some() {
                ui.visuals().hyperlink_color
            } else if style.bold {
                ui.visuals().strong_text_color()
            } else {
                ui.visuals().text_color()
            };

            let font_id = if style.code {
                FontId::monospace(font_size * 0.9)
            } else {
                FontId::proportional(font_size)
            };

            job.append(
                &span.text,
                0.0,
                TextFormat {
                    font_id,
                    color,
                    background: if style.code && style.color.is_none() {
                        ui.visuals().code_bg_color
                    } else {
                        Color32::TRANSPARENT
                    },
                    italics: style.italic,
                    underline: if style.link.is_some() {
                        Stroke::new(1.0, color)
                    } else {
                        Stroke::NONE
                    },
                    strikethrough: if style.strike {
                        Stroke::new(1.0, color)
                    } else {
                        Stroke::NONE
                    },
                    ..Default::default()
                },
            );
        }
        job
    }

    fn add_wrapped(&self, ui: &mut Ui, job: LayoutJob, max_width: f32) -> egui::Response {
        ui.horizontal(|ui| {
            ui.allocate_ui_with_layout(
                [max_width, 0.0].into(),
                egui::Layout::left_to_right(egui::Align::TOP),
                |ui| ui.add(egui::Label::new(job).wrap().sense(egui::Sense::click())),
            )
            .inner
        })
        .inner
    }

    fn render_heading(&self, ui: &mut Ui, spans: &[Span], level: u8) {
        let font_size = match level {
            1 => self.base_font_size * 2.0,
            2 => self.base_font_size * 1.7,
            3 => self.base_font_size * 1.4,
            4 => self.base_font_size * 1.2,
            5 => self.base_font_size * 1.1,
            _ => self.base_font_size * 1.0,
        };

        let mut job = self.layout_spans(ui, spans, font_size, self.content_width);
        for section in &mut job.sections {
            section.format.color = ui.visuals().strong_text_color();
        }
        self.add_wrapped(ui, job, self.content_width);

        // h1 carries a bottom border in the stylesheet
        if level == 1 {
            ui.separator();
        }
    }

    fn render_paragraph_with_links(
        &self,
        ui: &mut Ui,
        job: LayoutJob,
        spans: &[Span],
        max_width: f32,
    ) {
        let response = self.add_wrapped(ui, job, max_width);
        let link = spans.iter().find_map(|s| s.style.link.as_deref());

        if link.is_some() && response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if response.clicked() {
            if let Some(url) = link {
                if url.starts_with("http://") || url.starts_with("https://") {
                    if let Err(e) = webbrowser::open(url) {
                        tracing::warn!("Could not open {}: {}", url, e);
                    }
                }
            }
        }
    }

    fn render_blockquote(&self, ui: &mut Ui, spans: &[Span]) {
        let max_width = self.content_width - 40.0;
        let job = self.layout_spans(ui, spans, self.base_font_size, max_width);
        egui::Frame::none()
            .fill(ui.visuals().faint_bg_color)
            .inner_margin(egui::Margin::same(12.0))
            .outer_margin(egui::Margin::same(4.0))
            .stroke(egui::Stroke::new(4.0, ui.visuals().weak_text_color()))
            .show(ui, |ui| {
                self.render_paragraph_with_links(ui, job, spans, max_width);
            });
    }

    fn render_list_item(&self, ui: &mut Ui, number: Option<u64>, depth: usize, spans: &[Span]) {
        let total_indent = 20.0 + 30.0 * depth as f32;
        let available_width = self.content_width - total_indent - 40.0;
        let job = self.layout_spans(ui, spans, self.base_font_size, available_width);

        ui.horizontal(|ui| {
            ui.add_space(total_indent);
            match number {
                Some(n) => ui.label(format!("{}.", n)),
                None => ui.label("•"),
            };
            ui.add_space(8.0);
            self.render_paragraph_with_links(ui, job, spans, available_width);
        });
    }

    fn render_code_block(&self, ui: &mut Ui, spans: &[Span]) {
        let max_width = self.content_width - 32.0;
        egui::Frame::none()
            .fill(ui.visuals().code_bg_color)
            .inner_margin(16.0)
            .show(ui, |ui| {
                let job = self.layout_spans(ui, spans, self.base_font_size, max_width);
                self.add_wrapped(ui, job, max_width);
            });
    }

    fn render_table(
        &self,
        ui: &mut Ui,
        index: usize,
        header: &[Vec<Span>],
        rows: &[Vec<Vec<Span>>],
    ) {
        if header.is_empty() && rows.is_empty() {
            return;
        }

        let columns = header
            .len()
            .max(rows.iter().map(|r| r.len()).max().unwrap_or(0))
            .max(1);
        let cell_width = self.content_width / columns as f32;

        egui::Frame::none()
            .stroke(egui::Stroke::new(1.0, ui.visuals().weak_text_color()))
            .inner_margin(egui::Margin::same(8.0))
            .show(ui, |ui| {
                egui::Grid::new(("table", index))
                    .num_columns(columns)
                    .spacing([10.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        if !header.is_empty() {
                            for cell in header {
                                let mut job =
                                    self.layout_spans(ui, cell, self.base_font_size, cell_width);
                                for section in &mut job.sections {
                                    section.format.color = ui.visuals().strong_text_color();
                                }
                                self.add_wrapped(ui, job, cell_width);
                            }
                            ui.end_row();
                        }

                        for row in rows {
                            for col in 0..columns {
                                let cell = row.get(col).map(Vec::as_slice).unwrap_or(&[]);
                                let job =
                                    self.layout_spans(ui, cell, self.base_font_size, cell_width);
                                self.add_wrapped(ui, job, cell_width);
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open { name: String, attrs: String },
    Close(String),
    Text(String),
}

/// Parse an HTML document into blocks.
pub fn parse(html: &str) -> Vec<Block> {
    let mut builder = Builder::default();
    for token in tokenize(html) {
        match token {
            Token::Open { name, attrs } => builder.open(&name, &attrs),
            Token::Close(name) => builder.close(&name),
            Token::Text(text) => builder.text(&text),
        }
    }
    builder.finish()
}

fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map(|i| &after[i + 3..]).unwrap_or("");
            continue;
        }

        if rest.starts_with('<') {
            let Some(end) = rest.find('>') else {
                tokens.push(Token::Text(decode_entities(rest)));
                break;
            };
            let inner = &rest[1..end];
            rest = &rest[end + 1..];

            if inner.starts_with('!') || inner.starts_with('?') {
                continue;
            }
            if let Some(name) = inner.strip_prefix('/') {
                tokens.push(Token::Close(name.trim().to_ascii_lowercase()));
                continue;
            }

            let inner = inner.trim_end_matches('/').trim();
            let (name, attrs) = match inner.find(char::is_whitespace) {
                Some(i) => (&inner[..i], inner[i..].trim()),
                None => (inner, ""),
            };
            let name = name.to_ascii_lowercase();

            if name == "style" || name == "script" {
                let close = format!("</{}", name);
                rest = match rest.find(&close) {
                    Some(i) => rest[i..]
                        .find('>')
                        .map(|j| &rest[i + j + 1..])
                        .unwrap_or(""),
                    None => "",
                };
                continue;
            }

            tokens.push(Token::Open {
                name,
                attrs: attrs.to_string(),
            });
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            tokens.push(Token::Text(decode_entities(&rest[..end])));
            rest = &rest[end..];
        }
    }

    tokens
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Value of attribute `name` in a raw attribute string.
fn attr(attrs: &str, name: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let needle = format!("{}={}", name, quote);
        if let Some(start) = attrs.find(&needle) {
            let value = &attrs[start + needle.len()..];
            let end = value.find(quote)?;
            return Some(decode_entities(&value[..end]));
        }
    }
    None
}

/// Inline style from a `style` attribute, e.g. syntect's
/// `color:#323232;font-weight:bold;`.
fn parse_style(attrs: &str) -> SpanStyle {
    let mut style = SpanStyle::default();
    let Some(css) = attr(attrs, "style") else {
        return style;
    };

    for declaration in css.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        match (property.trim(), value.trim()) {
            ("color", value) => style.color = parse_hex_color(value),
            ("font-weight", "bold") => style.bold = true,
            ("font-style", "italic") => style.italic = true,
            _ => {}
        }
    }
    style
}

fn parse_hex_color(value: &str) -> Option<Color32> {
    let hex = value.strip_prefix('#')?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct TableState {
    header: Vec<Vec<Span>>,
    rows: Vec<Vec<Vec<Span>>>,
    row: Vec<Vec<Span>>,
    in_head: bool,
}

/// Tracks open elements while walking the token stream.
#[derive(Debug, Default)]
struct Builder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    heading: Option<u8>,
    quote_depth: usize,
    pre: bool,
    /// One entry per open list: `Some(next)` for ordered lists.
    lists: Vec<Option<u64>>,
    item: Option<(Option<u64>, usize)>,
    table: Option<TableState>,
    bold: usize,
    italic: usize,
    code: usize,
    strike: usize,
    styled: Vec<SpanStyle>,
    links: Vec<Option<String>>,
}

impl Builder {
    fn open(&mut self, name: &str, attrs: &str) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                self.heading = name[1..].parse().ok();
            }
            "p" => {
                if self.item.is_none() && self.table.is_none() {
                    self.flush();
                }
            }
            "div" | "body" | "html" | "section" | "article" => self.flush(),
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
            }
            "ul" => {
                self.flush();
                self.lists.push(None);
            }
            "ol" => {
                self.flush();
                let start = attr(attrs, "start")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1);
                self.lists.push(Some(start));
            }
            "li" => {
                self.flush();
                let number = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let n = *next;
                        *next += 1;
                        Some(n)
                    }
                    _ => None,
                };
                self.item = Some((number, self.lists.len().saturating_sub(1)));
            }
            "pre" => {
                self.flush();
                self.pre = true;
            }
            "code" => self.code += 1,
            "strong" | "b" => self.bold += 1,
            "em" | "i" => self.italic += 1,
            "del" | "s" => self.strike += 1,
            "a" => self.links.push(attr(attrs, "href")),
            "span" => self.styled.push(parse_style(attrs)),
            "br" => self.push_text("\n"),
            "hr" => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            "img" => {
                if let Some(alt) = attr(attrs, "alt").filter(|a| !a.is_empty()) {
                    self.italic += 1;
                    self.push_text(&format!("[{}]", alt));
                    self.italic -= 1;
                }
            }
            "table" => {
                self.flush();
                self.table = Some(TableState::default());
            }
            "thead" => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                }
            }
            "th" | "td" => self.spans.clear(),
            _ => {}
        }
    }

    fn close(&mut self, name: &str) {
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let spans = trimmed(std::mem::take(&mut self.spans));
                if let Some(level) = self.heading.take() {
                    if !spans.is_empty() {
                        self.blocks.push(Block::Heading { level, spans });
                    }
                }
            }
            "p" => {
                if self.item.is_none() && self.table.is_none() {
                    self.flush();
                }
            }
            "div" | "body" | "html" | "section" | "article" => self.flush(),
            "blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
            }
            "li" => {
                self.flush();
                self.item = None;
            }
            "pre" => {
                let mut spans = std::mem::take(&mut self.spans);
                if let Some(last) = spans.last_mut() {
                    if last.text.ends_with('\n') {
                        last.text.pop();
                    }
                }
                spans.retain(|s| !s.text.is_empty());
                self.blocks.push(Block::Code(spans));
                self.pre = false;
            }
            "code" => self.code = self.code.saturating_sub(1),
            "strong" | "b" => self.bold = self.bold.saturating_sub(1),
            "em" | "i" => self.italic = self.italic.saturating_sub(1),
            "del" | "s" => self.strike = self.strike.saturating_sub(1),
            "a" => {
                self.links.pop();
            }
            "span" => {
                self.styled.pop();
            }
            "th" | "td" => {
                let cell = trimmed(std::mem::take(&mut self.spans));
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            "tr" => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    if table.in_head {
                        table.header = row;
                    } else if !row.is_empty() {
                        table.rows.push(row);
                    }
                }
            }
            "thead" => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = false;
                }
            }
            "table" => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(Block::Table {
                        header: table.header,
                        rows: table.rows,
                    });
                }
                self.spans.clear();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.pre {
            self.push_text(text);
            return;
        }

        let mut collapsed = String::with_capacity(text.len());
        let mut last_was_space = self
            .spans
            .last()
            .map(|s| s.text.ends_with(char::is_whitespace))
            .unwrap_or(true);
        for c in text.chars() {
            if c.is_whitespace() && c != '\u{a0}' {
                if !last_was_space {
                    collapsed.push(' ');
                }
                last_was_space = true;
            } else {
                collapsed.push(c);
                last_was_space = false;
            }
        }

        if !collapsed.is_empty() {
            self.push_text(&collapsed);
        }
    }

    fn current_style(&self) -> SpanStyle {
        let mut style = SpanStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            code: self.code > 0 || self.pre,
            strike: self.strike > 0,
            color: None,
            link: self.links.iter().rev().flatten().next().cloned(),
        };
        for styled in &self.styled {
            style.bold |= styled.bold;
            style.italic |= styled.italic;
            if styled.color.is_some() {
                style.color = styled.color;
            }
        }
        style
    }

    fn push_text(&mut self, text: &str) {
        let style = self.current_style();
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(Span {
                text: text.to_string(),
                style,
            }),
        }
    }

    /// Close the current inline run as a paragraph, quote or list item.
    fn flush(&mut self) {
        if self.heading.is_some() || self.pre || self.table.is_some() {
            return;
        }
        let spans = trimmed(std::mem::take(&mut self.spans));
        if spans.is_empty() {
            return;
        }

        let block = if let Some((number, depth)) = self.item {
            Block::ListItem {
                number,
                depth,
                spans,
            }
        } else if self.quote_depth > 0 {
            Block::Quote(spans)
        } else {
            Block::Paragraph(spans)
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.heading = None;
        self.pre = false;
        self.table = None;
        self.flush();
        self.blocks
    }
}

/// Strip leading whitespace from the first span and trailing whitespace
/// from the last, dropping spans left empty.
fn trimmed(mut spans: Vec<Span>) -> Vec<Span> {
    if let Some(first) = spans.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    spans.retain(|s| !s.text.is_empty());
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(fragment: &str) -> Vec<Block> {
        parse(HtmlDocument::wrap(fragment).as_str())
    }

    #[test]
    fn stylesheet_is_not_rendered() {
        let parsed = blocks("<p>hello</p>\n");
        assert_eq!(parsed.len(), 1);
        assert!(matches!(&parsed[0], Block::Paragraph(s) if plain_text(s) == "hello"));
    }

    #[test]
    fn heading_levels() {
        let parsed = blocks("<h1>Title</h1>\n<h3>Sub <code>x</code></h3>\n");
        let Block::Heading { level: 1, spans } = &parsed[0] else {
            panic!("Expected h1, got {:?}", parsed[0]);
        };
        assert_eq!(plain_text(spans), "Title");
        match &parsed[1] {
            Block::Heading { level: 3, spans } => {
                assert_eq!(plain_text(spans), "Sub x");
                assert!(spans[1].style.code);
            }
            other => panic!("Expected heading, got {:?}", other),
        }
    }

    #[test]
    fn inline_styles_and_links() {
        let parsed = blocks(
            "<p>a <strong>b</strong> <em>c</em> <del>d</del> <a href=\"https://example.com\">e</a></p>\n",
        );
        let Block::Paragraph(spans) = &parsed[0] else {
            panic!("Expected paragraph");
        };
        let find = |t: &str| spans.iter().find(|s| s.text == t).unwrap();
        assert!(find("b").style.bold);
        assert!(find("c").style.italic);
        assert!(find("d").style.strike);
        assert_eq!(find("e").style.link.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn entities_are_decoded() {
        let parsed = blocks("<p>a &lt; b &amp;&amp; &#39;c&#x27; &bogus;</p>\n");
        let Block::Paragraph(spans) = &parsed[0] else {
            panic!("Expected paragraph");
        };
        assert_eq!(plain_text(spans), "a < b && 'c' &bogus;");
    }

    #[test]
    fn whitespace_collapses_outside_pre() {
        let parsed = blocks("<p>one\n   two</p>\n<pre><code>keep\n   this\n</code></pre>\n");
        assert!(matches!(&parsed[0], Block::Paragraph(s) if plain_text(s) == "one two"));
        assert!(matches!(&parsed[1], Block::Code(s) if plain_text(s) == "keep\n   this"));
    }

    #[test]
    fn highlighted_code_keeps_colors() {
        let parsed = blocks(
            "<div class=\"codehilite\"><pre><code class=\"language-rust\"><span style=\"font-weight:bold;color:#a71d5d;\">fn</span><span style=\"color:#323232;\"> main</span></code></pre></div>\n",
        );
        let Block::Code(spans) = &parsed[0] else {
            panic!("Expected code block");
        };
        assert_eq!(spans[0].text, "fn");
        assert!(spans[0].style.bold);
        let keyword = Color32::from_rgb(0xa7, 0x1d, 0x5d);
        let plain = Color32::from_rgb(0x32, 0x32, 0x32);
        assert_eq!(spans[0].style.color, Some(keyword));
        assert_eq!(spans[1].style.color, Some(plain));
        assert!(spans.iter().all(|s| s.style.code));
    }

    #[test]
    fn nested_lists_flatten_with_depth() {
        let parsed = blocks(
            "<ul>\n<li>one\n<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>\n</li>\n<li>two</li>\n</ul>\n",
        );
        let items: Vec<_> = parsed
            .iter()
            .map(|b| match b {
                Block::ListItem {
                    number,
                    depth,
                    spans,
                } => (*number, *depth, plain_text(spans)),
                other => panic!("Expected list item, got {:?}", other),
            })
            .collect();
        assert_eq!(
            items,
            vec![
                (None, 0, "one".to_string()),
                (Some(3), 1, "three".to_string()),
                (Some(4), 1, "four".to_string()),
                (None, 0, "two".to_string()),
            ]
        );
    }

    #[test]
    fn table_header_and_rows() {
        let parsed = blocks(
            "<table><thead><tr><th>a</th><th>b</th></tr></thead><tbody>\n<tr><td>1</td><td>2</td></tr>\n</tbody></table>\n",
        );
        let Block::Table { header, rows } = &parsed[0] else {
            panic!("Expected table");
        };
        let header: Vec<_> = header.iter().map(|c| plain_text(c)).collect();
        assert_eq!(header, ["a", "b"]);
        assert_eq!(rows.len(), 1);
        let row: Vec<_> = rows[0].iter().map(|c| plain_text(c)).collect();
        assert_eq!(row, ["1", "2"]);
    }

    #[test]
    fn quotes_and_rules() {
        let parsed = blocks("<blockquote>\n<p>quoted</p>\n</blockquote>\n<hr />\n");
        assert!(matches!(&parsed[0], Block::Quote(s) if plain_text(s) == "quoted"));
        assert_eq!(parsed[1], Block::Rule);
    }

    #[test]
    fn error_panel_parses() {
        let parsed = parse(HtmlDocument::error_panel("No such file").as_str());
        let Block::Heading { level: 3, spans } = &parsed[0] else {
            panic!("Expected h3, got {:?}", parsed[0]);
        };
        assert_eq!(plain_text(spans), "Error");
        let Block::Paragraph(spans) = &parsed[1] else {
            panic!("Expected paragraph");
        };
        assert!(plain_text(spans).contains("No such file"));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color32::RED));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#abc"), None);
    }
}
