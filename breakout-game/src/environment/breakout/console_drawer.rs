use console_engine::pixel;
use console_engine::screen::Screen;
use ql::prelude::DebugVisualizer;

use crate::environment::breakout::algebra_2d::AaBB;
use crate::environment::breakout::mechanics::{BreakoutMechanics, GameResult};

/// playfield units per console cell; cells are about twice as high as wide
const CELL_SIZE_X: f32 = 10.0;
const CELL_SIZE_Y: f32 = 20.0;

/// Number of console rows reserved for the status line below the playfield
const STATUS_ROWS: u32 = 1;

pub fn screen_size(mechanics: &BreakoutMechanics) -> (u32, u32) {
    let config = mechanics.config();
    let cols = (config.width / CELL_SIZE_X).ceil() as u32;
    let rows = (config.height / CELL_SIZE_Y).ceil() as u32;
    // frame around the playfield
    (cols + 2, rows + 2 + STATUS_ROWS)
}

fn cell(
    x: f32,
    y: f32,
) -> (i32, i32) {
    ((x / CELL_SIZE_X).floor() as i32 + 1, (y / CELL_SIZE_Y).floor() as i32 + 1)
}

fn fill(
    screen: &mut Screen,
    shape: &AaBB,
    chr: char,
) {
    let (x1, y1) = cell(shape.min.x, shape.min.y);
    // max is exclusive
    let (x2, y2) = cell(shape.max.x - 0.01, shape.max.y - 0.01);
    screen.fill_rect(x1, y1, x2, y2, pixel::pxl(chr));
}

impl DebugVisualizer for BreakoutMechanics {
    fn one_line_info(&self) -> String {
        let status = match self.game_result {
            None => "running",
            Some(GameResult::Won) => "won",
            Some(GameResult::Lost) => "lost",
        };
        format!(
            "Breakout: score {}, lives {}, bricks left {}, {}",
            self.score,
            self.lives,
            self.bricks.len(),
            status
        )
    }

    fn render_to_console(&self) -> Screen {
        let (width, height) = screen_size(self);
        let mut screen = Screen::new_empty(width, height);
        screen.clear();

        let bottom = (height - 1 - STATUS_ROWS) as i32;
        screen.rect(0, 0, width as i32 - 1, bottom, pixel::pxl('#'));
        // no wall at the bottom
        screen.line(1, bottom, width as i32 - 2, bottom, pixel::pxl(' '));

        for brick in &self.bricks {
            fill(&mut screen, &brick.shape, '▒');
        }
        fill(&mut screen, &self.paddle.shape(), '▀');

        let center = self.ball.shape.center;
        if center.y <= self.config().height {
            let (x, y) = cell(center.x, center.y);
            screen.set_pxl(x, y, pixel::pxl('●'));
        }

        screen.print(0, height as i32 - 1, &self.one_line_info());
        screen
    }
}

#[cfg(test)]
mod tests {
    use egui::Pos2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::environment::breakout::config::BreakoutConfig;

    use super::*;

    #[test]
    fn test_render_to_console() {
        let mut mechanics = BreakoutMechanics::new(BreakoutConfig::default(), &mut StdRng::seed_from_u64(0));
        mechanics.ball.shape.center = Pos2::new(205.0, 305.0);
        let screen = mechanics.render_to_console();

        assert_eq!(screen_size(&mechanics), (42, 28));
        assert_eq!(screen.get_width(), 42);
        assert_eq!(screen.get_pxl(0, 0).unwrap().chr, '#');
        assert_eq!(screen.get_pxl(41, 10).unwrap().chr, '#');
        // first brick: x 6..56, y 60..78
        assert_eq!(screen.get_pxl(1, 4).unwrap().chr, '▒');
        // ball
        assert_eq!(screen.get_pxl(21, 16).unwrap().chr, '●');
        // paddle: x 160..240 at y 460
        assert_eq!(screen.get_pxl(17, 24).unwrap().chr, '▀');
        assert_eq!(screen.get_pxl(24, 24).unwrap().chr, '▀');
        assert_eq!(screen.get_pxl(25, 24).unwrap().chr, ' ');
    }

    #[test]
    fn test_one_line_info() {
        let mut mechanics = BreakoutMechanics::new(BreakoutConfig::classic(), &mut StdRng::seed_from_u64(0));
        assert_eq!(mechanics.one_line_info(), "Breakout: score 0, lives 1, bricks left 15, running");
        mechanics.game_result = Some(GameResult::Lost);
        assert!(mechanics.one_line_info().ends_with("lost"));
    }
}
