use crate::clock::MonotonicClock;
use crate::config::Settings;
use crate::hud::ClockFace;
use crate::input::{collect_input_nonblocking, map_event, Action};
use crate::render::{draw_boot, draw_cat, draw_hud, draw_stars, Palette, Terminal, Viewport, CAT_H};
use crate::rng;
use crate::stage::{Stage, StageOptions};
use crate::starfield::layer_alpha;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};
use tracing::info;

// the cat pops in a beat after the stars start fading
const CAT_DELAY_MS: u64 = 1_000;
const HUD_DELAY_MS: u64 = 500;
const HUD_FADE_MS: u64 = 1_000;

pub(crate) struct App {
    settings: Settings,
    stage: Stage<MonotonicClock, StdRng>,
    term: Terminal,
    cat_box: Option<Viewport>,
    clock_face: ClockFace,
    clock_checked: Instant,
    should_quit: bool,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let stage = Stage::new(
            MonotonicClock::new(),
            rng::seeded(settings.seed),
            StageOptions {
                skip_boot: settings.skip_boot,
                star_count: settings.star_count,
            },
        );
        let term = Terminal::begin()?;

        Ok(Self {
            settings,
            stage,
            term,
            cat_box: None,
            clock_face: ClockFace::at(&chrono::Local::now()),
            clock_checked: Instant::now(),
            should_quit: false,
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let fps = self.settings.fps_cap;
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        info!(fps, "entering main loop");

        while !self.should_quit {
            let frame_start = Instant::now();
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event(&ev, self.cat_box) {
                    Some(Action::Quit) => {
                        self.should_quit = true;
                        break;
                    }
                    Some(Action::Tap) => self.stage.tap(),
                    None => {}
                }
            }

            let now = self.stage.tick();

            if self.clock_checked.elapsed() >= Duration::from_secs(1) {
                self.clock_face = ClockFace::at(&chrono::Local::now());
                self.clock_checked = Instant::now();
            }

            self.render_frame(now)?;

            spin_sleep(frame_dt, frame_start);
        }

        self.stage.shutdown();
        Ok(())
    }

    fn render_frame(&mut self, now: u64) -> anyhow::Result<()> {
        let pal = Palette::new(self.settings.enable_color);
        self.term.cur.clear();

        match self.stage.since_boot(now) {
            None => {
                draw_boot(&mut self.term.cur, self.stage.boot(), now, pal);
                self.cat_box = None;
            }
            Some(since) => {
                draw_stars(
                    &mut self.term.stars,
                    &mut self.term.cur,
                    self.stage.starfield(),
                    now,
                    layer_alpha(since),
                    pal,
                );

                let hud_alpha =
                    (since.saturating_sub(HUD_DELAY_MS) as f32 / HUD_FADE_MS as f32).min(1.0);
                draw_hud(&mut self.term.cur, &self.clock_face, hud_alpha, pal);

                self.cat_box = match self.stage.companion() {
                    Some(cat) if since >= CAT_DELAY_MS => {
                        let cx = self.term.cols as i32 / 2;
                        let top = (self.term.rows as i32 / 5).max(3);
                        let top = top.min(self.term.rows as i32 - CAT_H).max(0);
                        Some(draw_cat(&mut self.term.cur, cat, cx, top, now, pal))
                    }
                    _ => None,
                };
            }
        }

        self.term.present()?;
        Ok(())
    }
}

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    let mut app = App::init(settings)?;
    let result = app.run();
    // restore the terminal even if the loop failed
    let restore = app.term.end();
    first_error(result, restore)
}

/// The loop's own error wins over a failed terminal restore.
fn first_error(result: anyhow::Result<()>, restore: anyhow::Result<()>) -> anyhow::Result<()> {
    result.and(restore)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn loop_error_survives_failed_restore() {
        let err = first_error(Err(anyhow!("loop broke")), Err(anyhow!("restore broke")))
            .unwrap_err();
        assert_eq!(err.to_string(), "loop broke");
    }

    #[test]
    fn restore_error_surfaces_after_clean_loop() {
        let err = first_error(Ok(()), Err(anyhow!("restore broke"))).unwrap_err();
        assert_eq!(err.to_string(), "restore broke");
        assert!(first_error(Ok(()), Ok(())).is_ok());
    }
}
