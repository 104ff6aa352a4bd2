use crate::boot::BootSequence;
use crate::clock::Millis;
use crate::companion::Companion;
use crate::hud::ClockFace;
use crate::mascot::Mood;
use crate::rng::RandomSource;
use crate::starfield::Starfield;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

const BG: Color = Color::Black;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }

    pub(crate) fn put(&mut self, x: i32, y: i32, c: Cell) {
        if x < 0 || y < 0 || x >= self.w as i32 || y >= self.h as i32 {
            return;
        }
        let i = self.idx(x as u16, y as u16);
        self.cells[i] = c;
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }
}

/* -----------------------------
   Palette
------------------------------ */

#[derive(Clone, Copy)]
pub(crate) struct Palette {
    color: bool,
}

impl Palette {
    pub(crate) fn new(color: bool) -> Self {
        Self { color }
    }

    /// White dimmed to `level` in [0, 1].
    fn grey(&self, level: f32) -> Color {
        if !self.color {
            return if level >= 0.5 { Color::White } else { Color::DarkGrey };
        }
        let v = (level.clamp(0.0, 1.0) * 255.0) as u8;
        Color::Rgb { r: v, g: v, b: v }
    }

    fn alert(&self) -> Color {
        if self.color {
            Color::Rgb { r: 255, g: 59, b: 59 }
        } else {
            Color::White
        }
    }
}

/* -----------------------------
   Braille star layer: 2×4 subpixels per cell
------------------------------ */

pub(crate) struct StarCanvas {
    pub(crate) w: u32,
    pub(crate) h: u32,
    lum: Vec<f32>,
}

impl StarCanvas {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        let (w, h) = (cols as u32 * 2, rows as u32 * 4);
        Self {
            w,
            h,
            lum: vec![0.0; (w as usize) * (h as usize)],
        }
    }

    fn clear(&mut self) {
        self.lum.fill(0.0);
    }

    fn plot(&mut self, x: i32, y: i32, v: f32) {
        if x < 0 || y < 0 || x as u32 >= self.w || y as u32 >= self.h {
            return;
        }
        let i = (y as usize) * (self.w as usize) + (x as usize);
        self.lum[i] = self.lum[i].max(v);
    }
}

fn braille_bit(dx: u32, dy: u32) -> u8 {
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

// below this a star is too faint to bother drawing
const INK_MIN: f32 = 0.08;

pub(crate) fn draw_stars(
    canvas: &mut StarCanvas,
    out: &mut CellBuffer,
    field: &Starfield,
    now: Millis,
    layer: f32,
    pal: Palette,
) {
    canvas.clear();
    if layer <= 0.0 {
        return;
    }
    let (w, h) = (canvas.w as f32, canvas.h as f32);
    for star in field.stars() {
        let s = star.sample(now);
        let a = s.alpha * layer;
        if a < INK_MIN {
            continue;
        }
        let x = (s.x * w) as i32;
        let y = (s.y * h) as i32;
        for dy in 0..star.size as i32 {
            for dx in 0..star.size as i32 {
                canvas.plot(x + dx, y + dy, a);
            }
        }
    }

    for cy in 0..out.h as u32 {
        for cx in 0..out.w as u32 {
            let mut mask = 0u8;
            let mut peak = 0.0f32;
            for dy in 0..4 {
                for dx in 0..2 {
                    let (x, y) = (cx * 2 + dx, cy * 4 + dy);
                    if x >= canvas.w || y >= canvas.h {
                        continue;
                    }
                    let v = canvas.lum[(y as usize) * (canvas.w as usize) + (x as usize)];
                    if v >= INK_MIN {
                        mask |= braille_bit(dx, dy);
                        peak = peak.max(v);
                    }
                }
            }
            if mask == 0 {
                continue;
            }
            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            out.put(
                cx as i32,
                cy as i32,
                Cell {
                    ch,
                    fg: pal.grey(peak),
                    bold: false,
                },
            );
        }
    }
}

/* -----------------------------
   Terminal
------------------------------ */

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) stars: StarCanvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            stars: StarCanvas::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        self.stars = StarCanvas::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate, SetBackgroundColor(BG))?;

        let mut last_fg = None;
        let mut last_bold = false;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;
                if last_bold != c.bold {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = c.bold;
                    last_fg = None;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Text helpers
------------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Viewport {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) w: i32,
    pub(crate) h: i32,
}

impl Viewport {
    pub(crate) fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: i32, y: i32, s: &str, fg: Color, bold: bool) {
    for (i, ch) in s.chars().enumerate() {
        buf.put(x + i as i32, y, Cell { ch, fg, bold });
    }
}

fn draw_centered(buf: &mut CellBuffer, cx: i32, y: i32, s: &str, fg: Color, bold: bool) {
    let w = s.chars().count() as i32;
    draw_text(buf, cx - w / 2, y, s, fg, bold);
}

/* -----------------------------
   Boot overlay
------------------------------ */

const BAR_MAX: i32 = 48;

pub(crate) fn draw_boot(buf: &mut CellBuffer, boot: &BootSequence, now: Millis, pal: Palette) {
    let (cols, rows) = (buf.w as i32, buf.h as i32);

    // faint grid behind everything
    for y in (1..rows).step_by(2) {
        for x in (0..cols).step_by(4) {
            buf.put(
                x,
                y,
                Cell {
                    ch: '·',
                    fg: pal.grey(0.15),
                    bold: false,
                },
            );
        }
    }

    let bar_w = BAR_MAX.min(cols - 8).max(4);
    let x0 = (cols - bar_w) / 2;
    let y0 = rows / 2 - 1;

    let fill = ((boot.progress(now) / 100.0) * bar_w as f32).round() as i32;
    for i in 0..bar_w {
        let (ch, fg) = if i < fill {
            ('━', pal.grey(1.0))
        } else {
            ('─', pal.grey(0.12))
        };
        buf.put(x0 + i, y0, Cell { ch, fg, bold: false });
    }

    let white = pal.grey(1.0);
    let title = boot.title(now);
    draw_text(buf, x0, y0 + 2, title, white, true);
    // block cursor, 2 steps per second
    if (now / 500) % 2 == 0 {
        let cx = x0 + title.chars().count() as i32 + 1;
        buf.put(cx, y0 + 2, Cell { ch: '█', fg: white, bold: false });
    }

    let pct = format!("{:>3}%", boot.percent(now));
    draw_text(buf, x0 + bar_w - pct.len() as i32, y0 + 2, &pct, white, true);
}

/* -----------------------------
   HUD
------------------------------ */

pub(crate) fn draw_hud(buf: &mut CellBuffer, face: &ClockFace, alpha: f32, pal: Palette) {
    if alpha <= 0.0 {
        return;
    }
    let label = format!("{} {}", face.glyph(), face.time);
    let x = buf.w as i32 - label.chars().count() as i32 - 2;
    draw_text(buf, x, 1, &label, pal.grey(alpha), true);
}

/* -----------------------------
   Companion cat
------------------------------ */

pub(crate) const CAT_W: i32 = 13;
pub(crate) const CAT_H: i32 = 7;

const HEAD: [&str; CAT_H as usize] = [
    " /\\       /\\ ",
    "/  \\_____/  \\",
    "|           |",
    "|           |",
    "|           |",
    "|           |",
    " \\_________/ ",
];

const SPIN: [char; 4] = ['◐', '◓', '◑', '◒'];
const SHAKE: [i32; 6] = [0, -1, 1, -1, 1, 0];

/// Whole-sprite displacement in cells for the current mood.
fn body_offset(mood: Mood, in_mood: Millis, now: Millis) -> (i32, i32) {
    match mood {
        Mood::Angry => {
            if (now / 50) % 2 == 0 {
                (-1, 0)
            } else {
                (1, 0)
            }
        }
        Mood::DizzyRecover => {
            let step = (in_mood.min(499) * SHAKE.len() as Millis / 500) as usize;
            (SHAKE[step], 0)
        }
        Mood::Dizzy => (0, 0),
        Mood::Idle | Mood::Sleeping => {
            // slow float, 4s period
            let phase = (now % 4_000) as f32 / 4_000.0;
            if (0.25..0.75).contains(&phase) {
                (0, -1)
            } else {
                (0, 0)
            }
        }
    }
}

fn eyes(mood: Mood, blink: bool, now: Millis) -> (char, char) {
    match mood {
        Mood::Sleeping => ('_', '_'),
        Mood::Dizzy | Mood::DizzyRecover => {
            let c = SPIN[((now / 250) % SPIN.len() as Millis) as usize];
            (c, c)
        }
        Mood::Angry => ('\\', '/'),
        Mood::Idle if blink => ('-', '-'),
        Mood::Idle => ('o', 'o'),
    }
}

/// Draws the cat centred on `(cx, top)` and returns the rectangle it covers.
pub(crate) fn draw_cat<R: RandomSource>(
    buf: &mut CellBuffer,
    cat: &Companion<R>,
    cx: i32,
    top: i32,
    now: Millis,
    pal: Palette,
) -> Viewport {
    let st = cat.state();
    let mood = st.mood;
    let (bx, by) = body_offset(mood, now.saturating_sub(cat.mood_since()), now);
    let x0 = cx - CAT_W / 2 + bx;
    let y0 = top + by;

    let (body, ink) = if mood == Mood::Angry {
        (pal.alert(), pal.alert())
    } else {
        (pal.grey(1.0), pal.grey(0.85))
    };

    for (row, line) in HEAD.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            if ch != ' ' {
                buf.put(x0 + col as i32, y0 + row as i32, Cell { ch, fg: body, bold: true });
            }
        }
    }

    let face = cat.face_at(now);
    let fx = (face.x / 2.0).round() as i32;
    let fy = (face.y / 3.0).round() as i32;
    let (left, right) = eyes(mood, st.blink, now);
    let fcell = |ch| Cell { ch, fg: ink, bold: true };
    buf.put(x0 + 4 + fx, y0 + 3 + fy, fcell(left));
    buf.put(x0 + 8 + fx, y0 + 3 + fy, fcell(right));
    buf.put(x0 + 6 + fx, y0 + 4 + fy, fcell('ᴥ'));
    buf.put(x0 - 1 + fx, y0 + 4 + fy, fcell('='));
    buf.put(x0 + CAT_W + fx, y0 + 4 + fy, fcell('='));

    if mood == Mood::Sleeping {
        let phase = (now % 1_500) as i32 * 3 / 1_500;
        let z = pal.grey(0.8);
        buf.put(x0 + CAT_W - 1, y0 - 1 - phase.min(1), Cell { ch: 'z', fg: z, bold: false });
        buf.put(x0 + CAT_W + 1, y0 - 2 - phase / 2, Cell { ch: 'Z', fg: z, bold: false });
    }

    let text = cat.typed_message(now);
    if !text.is_empty() && mood != Mood::Sleeping {
        let fg = if mood == Mood::Angry { pal.alert() } else { pal.grey(1.0) };
        let shown = format!("{text}▌");
        draw_centered(buf, cx, y0 - 2, &shown, fg, true);
    }

    Viewport {
        x: x0 - 1,
        y: y0,
        w: CAT_W + 2,
        h: CAT_H,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Scripted;

    fn row(buf: &CellBuffer, y: u16) -> String {
        (0..buf.w).filter_map(|x| buf.get(x, y)).map(|c| c.ch).collect()
    }

    #[test]
    fn head_rows_share_a_width() {
        for line in HEAD {
            assert_eq!(line.chars().count(), CAT_W as usize);
        }
    }

    #[test]
    fn boot_screen_shows_percent_and_title() {
        let mut buf = CellBuffer::new(60, 20);
        let boot = BootSequence::start(0);
        draw_boot(&mut buf, &boot, 3_000, Palette::new(false));
        let text = row(&buf, 11);
        assert!(text.contains("Initializing..."), "{text}");
        assert!(text.contains("100%"), "{text}");
        assert!(row(&buf, 9).contains('━'));
    }

    #[test]
    fn hit_box_tracks_the_sprite() {
        let mut buf = CellBuffer::new(40, 20);
        let cat = Companion::mount(Scripted::constant(0.5), 0);
        let vp = draw_cat(&mut buf, &cat, 20, 8, 0, Palette::new(true));
        assert_eq!(vp.w, CAT_W + 2);
        assert!(vp.contains(20, 10));
        assert!(!vp.contains(0, 0));
        assert!(row(&buf, 11).contains('o'));
    }

    #[test]
    fn sleeping_cat_hides_its_message() {
        let mut buf = CellBuffer::new(40, 20);
        let mut cat = Companion::mount(Scripted::constant(0.5), 0);
        cat.advance(8_000);
        draw_cat(&mut buf, &cat, 20, 8, 8_000, Palette::new(false));
        assert!(row(&buf, 11).contains('_') || row(&buf, 10).contains('_'));
        assert!(!row(&buf, 6).contains('▌'));
    }

    #[test]
    fn stars_render_as_braille() {
        let mut rng = Scripted::new(&[0.5, 0.5, 0.1, 0.999, 0.5, 0.5]);
        let field = Starfield::generate(1, &mut rng);
        let mut buf = CellBuffer::new(20, 10);
        let mut canvas = StarCanvas::new(20, 10);
        draw_stars(&mut canvas, &mut buf, &field, 0, 1.0, Palette::new(true));
        let inked = buf.cells.iter().filter(|c| c.ch != ' ').count();
        assert_eq!(inked, 1);
        let c = buf.cells.iter().find(|c| c.ch != ' ').expect("one star");
        assert!(('\u{2801}'..='\u{28FF}').contains(&c.ch));

        draw_stars(&mut canvas, &mut buf, &field, 0, 0.0, Palette::new(true));
        buf.clear();
        assert!(buf.cells.iter().all(|c| c.ch == ' '));
    }
}
