//! Pagination engine
//!
//! Flows blocks top to bottom through the content area of fixed-size pages.
//! Atomic blocks move to the next page whole; list and paragraph blocks
//! break between lines. The footer is placed last, outside the flow.
//!
//! Coordinates are millimetres from the top-left corner of the page.

use crate::blocks::{Block, ImageSlot, RasterImage, SlotContent};
use crate::config::{ComposerConfig, PageGeometry};
use crate::measure::{wrap_text, TextMeasure};
use crate::style::{ColorRole, TextStyle};

/// Baseline position inside a line box, as a fraction of the line height
const BASELINE_RATIO: f64 = 0.75;

/// Inner padding of placeholder frames
const FRAME_PADDING: f64 = 3.0;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element<'a> {
    Text {
        text: String,
        x: f64,
        baseline: f64,
        style: TextStyle,
        /// Index of the originating block
        block: usize,
    },
    Image {
        image: &'a RasterImage,
        rect: Rect,
        block: usize,
    },
    Frame {
        rect: Rect,
        role: ColorRole,
        block: usize,
    },
}

impl Element<'_> {
    pub fn block(&self) -> usize {
        match self {
            Element::Text { block, .. }
            | Element::Image { block, .. }
            | Element::Frame { block, .. } => *block,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<'a> {
    pub elements: Vec<Element<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout<'a> {
    pub geometry: PageGeometry,
    pub pages: Vec<Page<'a>>,
}

impl<'a> Layout<'a> {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text lines of one block across all pages, in reading order
    pub fn block_text(&self, block: usize) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Text {
                    text, block: b, ..
                } if *b == block => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Pages (0-based) holding at least one element of `block`
    pub fn pages_of_block(&self, block: usize) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.elements.iter().any(|e| e.block() == block))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn images(&self) -> impl Iterator<Item = (&'a RasterImage, Rect)> + '_ {
        self.pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                Element::Image { image, rect, .. } => Some((*image, *rect)),
                _ => None,
            })
    }
}

/// One line waiting to be placed
struct Line {
    text: String,
    indent: f64,
    style: TextStyle,
    centered: bool,
}

struct Flow<'a> {
    geometry: PageGeometry,
    spacing: f64,
    pages: Vec<Page<'a>>,
    cursor: f64,
    /// Bottom of the last band claimed on the current page
    filled: f64,
}

impl<'a> Flow<'a> {
    fn new(geometry: PageGeometry, spacing: f64) -> Self {
        Self {
            geometry,
            spacing,
            pages: vec![Page::default()],
            cursor: geometry.content_top(),
            filled: geometry.content_top(),
        }
    }

    fn at_page_top(&self) -> bool {
        self.cursor <= self.geometry.content_top() + EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.geometry.content_top();
        self.filled = self.cursor;
    }

    /// Claim `height` on the current page, breaking first if it does not fit.
    ///
    /// Returns the top of the claimed band. A band taller than an empty page
    /// still lands on one and overflows it.
    fn reserve(&mut self, height: f64) -> f64 {
        if self.cursor + height > self.geometry.content_bottom() + EPSILON && !self.at_page_top() {
            self.new_page();
        }
        if height > self.geometry.content_height() + EPSILON {
            tracing::warn!(
                height,
                available = self.geometry.content_height(),
                "block taller than a page"
            );
        }
        let top = self.cursor;
        self.cursor += height;
        self.filled = self.cursor;
        top
    }

    fn skip(&mut self, gap: f64) {
        if !self.at_page_top() {
            self.cursor += gap;
        }
    }

    fn push(&mut self, element: Element<'a>) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn line_height(&self, style: &TextStyle) -> f64 {
        style.line_height(self.spacing)
    }

    fn place_line(&mut self, line: Line, top: f64, block: usize, measure: &dyn TextMeasure) {
        let left = self.geometry.margin_left;
        let x = if line.centered {
            let free = self.geometry.content_width() - measure.width(&line.text, &line.style);
            left + free.max(0.0) / 2.0
        } else {
            left + line.indent
        };
        let baseline = top + self.line_height(&line.style) * BASELINE_RATIO;
        self.push(Element::Text {
            text: line.text,
            x,
            baseline,
            style: line.style,
            block,
        });
    }

    /// Place lines as one unit
    fn place_atomic(&mut self, lines: Vec<Line>, block: usize, measure: &dyn TextMeasure) {
        let height: f64 = lines.iter().map(|l| self.line_height(&l.style)).sum();
        let mut top = self.reserve(height);
        for line in lines {
            let advance = self.line_height(&line.style);
            self.place_line(line, top, block, measure);
            top += advance;
        }
    }

    /// Place lines one by one, keeping the first `keep` lines together
    fn place_flowing(
        &mut self,
        lines: Vec<Line>,
        keep: usize,
        block: usize,
        measure: &dyn TextMeasure,
    ) {
        let kept: f64 = lines
            .iter()
            .take(keep)
            .map(|l| self.line_height(&l.style))
            .sum();
        let mut top = self.reserve(kept);
        for (index, line) in lines.into_iter().enumerate() {
            let advance = self.line_height(&line.style);
            if index >= keep {
                top = self.reserve(advance);
            }
            self.place_line(line, top, block, measure);
            if index < keep {
                top += advance;
            }
        }
    }
}

fn plain_lines(
    text: &str,
    width: f64,
    style: TextStyle,
    centered: bool,
    measure: &dyn TextMeasure,
) -> Vec<Line> {
    wrap_text(text, width, &style, measure)
        .into_iter()
        .map(|text| Line {
            text,
            indent: 0.0,
            style,
            centered,
        })
        .collect()
}

/// Number each item and hang its continuation lines under the item text
fn numbered_lines(
    items: &[String],
    width: f64,
    style: TextStyle,
    measure: &dyn TextMeasure,
) -> Vec<Line> {
    let mut lines = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let prefix = format!("{}. ", index + 1);
        let hang = measure.width(&prefix, &style);
        let mut wrapped = wrap_text(item, (width - hang).max(0.0), &style, measure);
        if wrapped.is_empty() {
            wrapped.push(String::new());
        }
        for (n, text) in wrapped.into_iter().enumerate() {
            let (text, indent) = if n == 0 {
                (format!("{prefix}{text}"), 0.0)
            } else {
                (text, hang)
            };
            lines.push(Line {
                text,
                indent,
                style,
                centered: false,
            });
        }
    }
    lines
}

fn heading_line(heading: &str, style: TextStyle) -> Line {
    Line {
        text: heading.to_string(),
        indent: 0.0,
        style,
        centered: false,
    }
}

fn place_slot<'a>(
    flow: &mut Flow<'a>,
    slot: &'a ImageSlot,
    origin: (f64, f64),
    box_size: f64,
    note_style: TextStyle,
    block: usize,
    measure: &dyn TextMeasure,
) {
    let (x, y) = origin;
    match &slot.content {
        SlotContent::Raster(image) => {
            let (width, height) = slot.display_size(box_size);
            flow.push(Element::Image {
                image,
                rect: Rect {
                    x,
                    y,
                    width,
                    height,
                },
                block,
            });
        }
        SlotContent::Placeholder(note) => {
            flow.push(Element::Frame {
                rect: Rect {
                    x,
                    y,
                    width: box_size,
                    height: box_size,
                },
                role: ColorRole::Muted,
                block,
            });
            let inner = (box_size - 2.0 * FRAME_PADDING).max(0.0);
            let advance = note_style.line_height(flow.spacing);
            let mut top = y + FRAME_PADDING;
            let floor = y + box_size - FRAME_PADDING;
            for text in wrap_text(note, inner, &note_style, measure) {
                // Whatever does not fit inside the frame is dropped
                if top + advance > floor + EPSILON {
                    break;
                }
                let free = inner - measure.width(&text, &note_style);
                flow.push(Element::Text {
                    x: x + FRAME_PADDING + free.max(0.0) / 2.0,
                    baseline: top + advance * BASELINE_RATIO,
                    text,
                    style: note_style,
                    block,
                });
                top += advance;
            }
        }
    }
}

/// Footer lines stacked upward from the footer baseline of the last page.
///
/// A wrapped footer can climb above the bottom margin; when the content on
/// the last page already reaches into that band the footer moves to a page
/// of its own.
fn place_footer(
    flow: &mut Flow<'_>,
    text: &str,
    style: TextStyle,
    block: usize,
    measure: &dyn TextMeasure,
) {
    let geometry = flow.geometry;
    let lines = wrap_text(text, geometry.content_width(), &style, measure);
    let advance = flow.line_height(&style);
    let last_baseline = geometry.height - geometry.footer_offset;
    let count = lines.len();
    if count == 0 {
        return;
    }

    let band_top = last_baseline - advance * (count - 1) as f64 - advance * BASELINE_RATIO;
    if flow.filled > band_top + EPSILON {
        flow.new_page();
    }
    if band_top < geometry.content_top() - EPSILON {
        tracing::warn!(
            lines = count,
            band_top,
            content_top = geometry.content_top(),
            "footer taller than the page content area"
        );
    }

    for (index, text) in lines.into_iter().enumerate() {
        let free = geometry.content_width() - measure.width(&text, &style);
        flow.push(Element::Text {
            x: geometry.margin_left + free.max(0.0) / 2.0,
            baseline: last_baseline - advance * (count - 1 - index) as f64,
            text,
            style,
            block,
        });
    }
}

/// Assign blocks to pages
pub fn paginate<'a>(
    blocks: &'a [Block],
    config: &ComposerConfig,
    measure: &dyn TextMeasure,
) -> Layout<'a> {
    let geometry = config.page;
    let width = geometry.content_width();
    let mut flow = Flow::new(geometry, config.typography.line_spacing);
    let mut footers = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        match block {
            Block::Title { text, style } | Block::Subtitle { text, style } => {
                let lines = plain_lines(text, width, *style, true, measure);
                flow.place_atomic(lines, index, measure);
            }
            Block::KeyValue { entries, style } => {
                let lines = entries
                    .iter()
                    .flat_map(|(key, value)| {
                        plain_lines(&format!("{key}: {value}"), width, *style, false, measure)
                    })
                    .collect();
                flow.place_atomic(lines, index, measure);
            }
            Block::ImagePair {
                left,
                right,
                caption_style,
                note_style,
                box_size,
                gutter,
            } => {
                let caption_height = flow.line_height(caption_style);
                let image_height = left
                    .display_size(*box_size)
                    .1
                    .max(right.display_size(*box_size).1);
                let top = flow.reserve(caption_height + image_height);
                let left_x = geometry.margin_left;
                let right_x = left_x + box_size + gutter;
                for (slot, x) in [(left, left_x), (right, right_x)] {
                    flow.push(Element::Text {
                        text: slot.caption.clone(),
                        x,
                        baseline: top + caption_height * BASELINE_RATIO,
                        style: *caption_style,
                        block: index,
                    });
                    place_slot(
                        &mut flow,
                        slot,
                        (x, top + caption_height),
                        *box_size,
                        *note_style,
                        index,
                        measure,
                    );
                }
            }
            Block::NumberedList {
                heading,
                heading_style,
                items,
                style,
            } => {
                let mut lines = vec![heading_line(heading, *heading_style)];
                lines.extend(numbered_lines(items, width, *style, measure));
                flow.place_flowing(lines, 2, index, measure);
            }
            Block::Paragraph {
                heading,
                heading_style,
                text,
                style,
            } => {
                let mut lines = vec![heading_line(heading, *heading_style)];
                lines.extend(plain_lines(text, width, *style, false, measure));
                flow.place_flowing(lines, 2, index, measure);
            }
            Block::Footer { text, style } => {
                footers.push((index, text, *style));
                continue;
            }
        }
        flow.skip(config.block_gap);
    }

    for (index, text, style) in footers {
        place_footer(&mut flow, text, style, index, measure);
    }

    tracing::debug!(pages = flow.pages.len(), blocks = blocks.len(), "paginated report");
    Layout {
        geometry,
        pages: flow.pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{assemble, BlockKind};
    use crate::measure::Helvetica;
    use pretty_assertions::assert_eq;
    use triage_types::{Confidence, FindingRecord, ReportMetadata};

    fn findings(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("Finding number {i}")).collect()
    }

    fn layout_for(record: &FindingRecord, config: &ComposerConfig) -> (Vec<Block>, usize) {
        let blocks = assemble(record, &ReportMetadata::new("2025-11-07"), config).unwrap();
        let pages = paginate(&blocks, config, &Helvetica).page_count();
        (blocks, pages)
    }

    fn index_of(blocks: &[Block], kind: BlockKind) -> usize {
        blocks.iter().position(|b| b.kind() == kind).unwrap()
    }

    #[test]
    fn test_short_report_fits_one_page() {
        let record = FindingRecord::new(
            Confidence::new(87).unwrap(),
            findings(3),
            "Opacity detected in the left upper lobe.",
        );
        let (_, pages) = layout_for(&record, &ComposerConfig::default());
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_long_list_on_narrow_page_spans_pages_in_order() {
        let mut config = ComposerConfig::default();
        config.page = config.page.with_size(80.0, 120.0);
        let record = FindingRecord::new(Confidence::new(60).unwrap(), findings(20), "");
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);

        assert!(layout.page_count() >= 2);

        let list = index_of(&blocks, BlockKind::NumberedList);
        let numbered: Vec<&str> = layout
            .block_text(list)
            .into_iter()
            .skip(1) // heading
            .collect();
        let expected: Vec<String> = (1..=20).map(|i| format!("{i}. Finding number {i}")).collect();
        assert_eq!(numbered, expected);
        assert!(layout.pages_of_block(list).len() >= 2);
    }

    /// Every flowing line on the footer's page must end above the footer band
    fn assert_footer_clear(layout: &Layout<'_>, footer: usize, spacing: f64) {
        let last = layout.pages.last().unwrap();
        let band_top = last
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text {
                    baseline,
                    style,
                    block,
                    ..
                } if *block == footer => Some(baseline - style.line_height(spacing) * BASELINE_RATIO),
                _ => None,
            })
            .fold(f64::INFINITY, f64::min);
        assert!(band_top.is_finite(), "footer missing from last page");

        for element in &last.elements {
            if let Element::Text {
                baseline, block, ..
            } = element
            {
                if *block != footer {
                    assert!(
                        *baseline <= band_top + EPSILON,
                        "baseline {baseline} runs into footer starting at {band_top}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_lines_stay_inside_content_area() {
        let mut config = ComposerConfig::default();
        config.page = config.page.with_size(90.0, 110.0);
        let record = FindingRecord::new(
            Confidence::new(60).unwrap(),
            findings(15),
            "word ".repeat(200),
        );
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);
        let footer = index_of(&blocks, BlockKind::Footer);
        let bottom = config.page.content_bottom();

        for page in &layout.pages {
            for element in &page.elements {
                if let Element::Text {
                    baseline, block, ..
                } = element
                {
                    if *block != footer {
                        assert!(*baseline <= bottom + EPSILON, "baseline {baseline} past {bottom}");
                    }
                }
            }
        }
        assert_footer_clear(&layout, footer, config.typography.line_spacing);
    }

    #[test]
    fn test_wrapped_footer_never_overlaps_content() {
        for width in [60.0, 70.0, 80.0] {
            for count in [5, 10, 15, 20, 25] {
                let mut config = ComposerConfig::default();
                config.page = config.page.with_size(width, 120.0);
                let record = FindingRecord::new(Confidence::new(60).unwrap(), findings(count), "");
                let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
                let layout = paginate(&blocks, &config, &Helvetica);
                let footer = index_of(&blocks, BlockKind::Footer);

                assert_eq!(layout.pages_of_block(footer), vec![layout.page_count() - 1]);
                assert_footer_clear(&layout, footer, config.typography.line_spacing);
            }
        }
    }

    #[test]
    fn test_footer_only_on_last_page() {
        let mut config = ComposerConfig::default();
        config.page = config.page.with_size(80.0, 120.0);
        let record = FindingRecord::new(Confidence::new(60).unwrap(), findings(20), "");
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);

        let footer = index_of(&blocks, BlockKind::Footer);
        assert_eq!(layout.pages_of_block(footer), vec![layout.page_count() - 1]);
    }

    #[test]
    fn test_footer_sits_on_bottom_margin_centered() {
        let config = ComposerConfig::default();
        let record = FindingRecord::new(Confidence::new(60).unwrap(), findings(1), "");
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);
        let footer = index_of(&blocks, BlockKind::Footer);

        let (x, baseline, text, style) = layout.pages[0]
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Text {
                    x,
                    baseline,
                    text,
                    style,
                    block,
                } if *block == footer => Some((*x, *baseline, text.clone(), *style)),
                _ => None,
            })
            .unwrap();
        assert_eq!(baseline, 287.0);
        let width = Helvetica.width(&text, &style);
        let centre = x + width / 2.0;
        assert!((centre - 105.0).abs() < 1e-6);
    }

    #[test]
    fn test_image_pair_moves_whole_to_next_page() {
        let mut config = ComposerConfig::default();
        // Room for the header blocks but not for an 80mm box below them
        config.page = config.page.with_size(210.0, 140.0);
        let record = FindingRecord::new(Confidence::new(60).unwrap(), findings(1), "");
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);

        let pair = index_of(&blocks, BlockKind::ImagePair);
        assert_eq!(layout.pages_of_block(pair), vec![1]);
    }

    #[test]
    fn test_heading_not_orphaned_at_page_end() {
        let mut config = ComposerConfig::default();
        config.page = config.page.with_size(80.0, 120.0);
        let record = FindingRecord::new(
            Confidence::new(60).unwrap(),
            findings(20),
            "Short note.",
        );
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);
        let paragraph = index_of(&blocks, BlockKind::Paragraph);
        assert_eq!(layout.pages_of_block(paragraph).len(), 1);
        assert_eq!(layout.block_text(paragraph)[0], "Detailed Analysis:");
    }

    #[test]
    fn test_wrapped_item_hangs_under_text() {
        let mut config = ComposerConfig::default();
        config.page = config.page.with_size(80.0, 300.0);
        let record = FindingRecord::new(
            Confidence::new(60).unwrap(),
            vec!["Pattern suggestive of inflammatory or neoplastic process".to_string()],
            "",
        );
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);
        let list = index_of(&blocks, BlockKind::NumberedList);

        let xs: Vec<f64> = layout.pages[0]
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { x, block, .. } if *block == list => Some(*x),
                _ => None,
            })
            .collect();
        // heading, "1. ..." and at least one continuation
        assert!(xs.len() >= 3);
        assert_eq!(xs[1], config.page.margin_left);
        assert!(xs[2] > xs[1]);
    }

    #[test]
    fn test_smaller_pages_never_need_fewer_pages() {
        let record = FindingRecord::new(
            Confidence::new(60).unwrap(),
            findings(12),
            "Consolidation in left lower lobe. ".repeat(30),
        );
        let mut previous = 0;
        for height in [297.0, 220.0, 160.0, 120.0] {
            let mut config = ComposerConfig::default();
            config.page = config.page.with_size(210.0, height);
            let (_, pages) = layout_for(&record, &config);
            assert!(pages >= previous, "{height}mm gave {pages} pages");
            previous = pages;
        }
    }

    #[test]
    fn test_title_is_centered() {
        let config = ComposerConfig::default();
        let record = FindingRecord::new(Confidence::new(60).unwrap(), findings(1), "");
        let blocks = assemble(&record, &ReportMetadata::new("x"), &config).unwrap();
        let layout = paginate(&blocks, &config, &Helvetica);
        let Element::Text { x, text, style, .. } = &layout.pages[0].elements[0] else {
            panic!("title should be the first element");
        };
        let centre = x + Helvetica.width(text, style) / 2.0;
        assert!((centre - 105.0).abs() < 1e-6);
        assert_eq!(text, "Medical Imaging Analysis Report");
    }
}
