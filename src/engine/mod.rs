use crate::browser;
use anyhow::{anyhow, Result};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub mod clock;
pub mod input;
pub mod scheduler;

pub use clock::{FrameClock, FrameTime};
pub use input::{InputState, KeyState, PointerState};
pub use scheduler::{FrameCallback, FrameHandle, FrameScheduler, ManualScheduler};

// TABLE:
// ┌──────────────────────── Engine Seams ───────────────────────────────────┐
// │   Trait            │ Browser impl              │ Host / test impl       │
// ├────────────────────┼───────────────────────────┼────────────────────────┤
// │   Surface          │ CanvasSurface (2d ctx)    │ any recording fake     │
// │   FrameScheduler   │ AnimationFrameScheduler   │ ManualScheduler        │
// └────────────────────┴───────────────────────────┴────────────────────────┘
// - the loop manager only ever talks to the traits, so everything above the
//   browser line runs under a plain `cargo test`

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    /// Centre of an area this size, in surface coordinates
    pub fn center(&self) -> Point {
        Point {
            x: f64::from(self.width) / 2.0,
            y: f64::from(self.height) / 2.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    /// Rect anchored at the origin covering the whole of `size`
    pub fn from_size(size: Size) -> Self {
        Rect {
            position: Point::default(),
            size,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub color: String,
    pub align: TextAlign,
}

/// A drawable area the loop manager renders into.
/// - owns its size, the manager only reads it per frame and writes it on
///   resize
/// - `configure` runs once at construction
pub trait Surface {
    fn size(&self) -> Size;
    fn set_size(&mut self, size: Size);
    fn configure(&mut self) -> Result<()>;
    fn clear(&mut self, rect: &Rect);
    fn fill_rect(&mut self, rect: &Rect, color: &str);
    fn fill_text(&mut self, text: &str, position: Point, style: &TextStyle) -> Result<()>;
}

/// Browser canvas backed surface
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, context: CanvasRenderingContext2d) -> Self {
        CanvasSurface { canvas, context }
    }

    /// Looks up the page canvas and its 2d context
    pub fn from_document() -> Result<Self> {
        Ok(CanvasSurface::new(browser::canvas()?, browser::context()?))
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Size {
        Size::new(self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, size: Size) {
        // writing width/height resets the backing store, prior pixels are gone
        self.canvas.set_width(size.width);
        self.canvas.set_height(size.height);
    }

    fn configure(&mut self) -> Result<()> {
        self.canvas
            .style()
            .set_property("background", "transparent")
            .map_err(|err| anyhow!("Could not reset canvas background : {:#?}", err))?;
        self.canvas
            .focus()
            .map_err(|err| anyhow!("Could not focus canvas : {:#?}", err))
    }

    fn clear(&mut self, rect: &Rect) {
        self.context.clear_rect(
            rect.position.x,
            rect.position.y,
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            rect.position.x,
            rect.position.y,
            rect.size.width.into(),
            rect.size.height.into(),
        );
    }

    fn fill_text(&mut self, text: &str, position: Point, style: &TextStyle) -> Result<()> {
        self.context.set_font(&style.font);
        self.context.set_fill_style_str(&style.color);
        self.context.set_text_align(style.align.as_str());
        self.context
            .fill_text(text, position.x, position.y)
            .map_err(|err| anyhow!("Could not draw text '{}' : {:#?}", text, err))
    }
}
