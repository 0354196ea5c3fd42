use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use crate::config::{GridSize, Theme};
use crate::engine::{EndReason, Phase};
use crate::snake::Position;
use crate::snapshot::Snapshot;

/// Terminal columns per grid cell, so cells look roughly square.
const CELL_WIDTH: u16 = 2;
const GLYPH_CELL: &str = "██";
const GLYPH_FOOD: &str = "◆ ";

/// Values shown around the board that the engine does not own.
#[derive(Debug, Clone, Copy)]
pub struct HudInfo<'a> {
    pub high_score: u32,
    pub theme: &'a Theme,
}

/// Renders the full frame from one snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &Snapshot, hud: &HudInfo<'_>) {
    let [hud_area, board_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

    render_hud(frame, hud_area, snapshot, hud);

    let board = board_rect(board_area, snapshot.grid);
    let block = Block::bordered()
        .title(" Snake ")
        .border_style(Style::new().fg(hud.theme.border_fg))
        .style(Style::new().bg(hud.theme.play_bg));
    let inner = block.inner(board);
    frame.render_widget(block, board);

    render_food(frame, inner, snapshot, hud.theme);
    render_snake(frame, inner, snapshot, hud.theme);

    match snapshot.phase {
        Phase::NotStarted => render_intro(frame, board, hud.theme),
        Phase::Over { reason } => render_game_over(frame, board, snapshot.score, reason, hud),
        Phase::Running => {}
    }
}

fn render_hud(frame: &mut Frame<'_>, area: Rect, snapshot: &Snapshot, hud: &HudInfo<'_>) {
    let line = Line::from(vec![
        Span::raw(format!("Score: {}", snapshot.score)),
        Span::raw(format!("  High Score: {}", hud.high_score.max(snapshot.score))),
        Span::raw(format!("  Speed: {}", snapshot.speed)),
        Span::styled(
            format!("  [{}]", hud.theme.name),
            Style::new().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(line).style(Style::new().fg(hud.theme.hud)),
        area,
    );
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot, theme: &Theme) {
    let Some(food) = snapshot.food else {
        return;
    };
    let Some((x, y)) = cell_to_terminal(inner, snapshot.grid, food) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, GLYPH_FOOD, Style::new().fg(theme.food).bg(theme.play_bg));
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &Snapshot, theme: &Theme) {
    let buffer = frame.buffer_mut();

    // Tail first so the head wins if it overlaps a segment on the final frame.
    for (index, segment) in snapshot.snake.iter().enumerate().rev() {
        let Some((x, y)) = cell_to_terminal(inner, snapshot.grid, *segment) else {
            continue;
        };

        let style = if index == 0 {
            Style::new().fg(theme.snake_head).add_modifier(Modifier::BOLD)
        } else {
            Style::new().fg(theme.snake_body)
        };
        buffer.set_string(x, y, GLYPH_CELL, style);
    }
}

fn render_intro(frame: &mut Frame<'_>, board: Rect, theme: &Theme) {
    let lines = vec![
        Line::from("Use arrow keys to move the snake"),
        Line::from(""),
        Line::from("[T] Theme  [Q]/[Esc] Quit"),
    ];
    render_popup(frame, board, lines, Style::new().fg(theme.hud));
}

fn render_game_over(
    frame: &mut Frame<'_>,
    board: Rect,
    score: u32,
    reason: EndReason,
    hud: &HudInfo<'_>,
) {
    let cause = match reason {
        EndReason::Wall => "Hit the wall",
        EndReason::SelfCollision => "Ran into itself",
        EndReason::BoardFull => "Board full!",
    };
    let lines = vec![
        Line::from("GAME OVER").style(
            Style::new()
                .fg(hud.theme.game_over)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(cause),
        Line::from(""),
        Line::from(format!("Final Score: {score}")),
        Line::from(format!("High Score: {}", hud.high_score.max(score))),
        Line::from(""),
        Line::from("Press R to Restart or Q/ESC to Quit"),
    ];
    render_popup(frame, board, lines, Style::new().fg(hud.theme.hud));
}

fn render_popup(frame: &mut Frame<'_>, board: Rect, lines: Vec<Line<'_>>, style: Style) {
    let width = lines.iter().map(Line::width).max().unwrap_or(0) + 4;
    let width = u16::try_from(width).unwrap_or(u16::MAX);
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
    let popup = centered(board, width, height);

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::bordered()),
        popup,
    );
}

/// Board rectangle including its border, centered in `area` and clipped to it.
fn board_rect(area: Rect, grid: GridSize) -> Rect {
    let width = grid.width.saturating_mul(CELL_WIDTH).saturating_add(2);
    let height = grid.height.saturating_add(2);
    centered(area, width, height)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn cell_to_terminal(inner: Rect, grid: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(grid) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.checked_mul(CELL_WIDTH)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x.saturating_add(CELL_WIDTH) > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    use crate::config::{EngineConfig, GridSize, THEME_CLASSIC};
    use crate::engine::GameCore;
    use crate::input::Direction;
    use crate::snake::{Position, Snake};
    use crate::snapshot::Snapshot;

    use super::{HudInfo, cell_to_terminal, render};

    fn screen_text(snapshot: &Snapshot, high_score: u32) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("test backend");
        let hud = HudInfo {
            high_score,
            theme: &THEME_CLASSIC,
        };
        terminal
            .draw(|frame| render(frame, snapshot, &hud))
            .expect("draw into test backend");

        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn start_frame_shows_hud_and_intro() {
        let core = GameCore::with_seed(EngineConfig::default(), 1).expect("valid config");

        let text = screen_text(&core.snapshot(), 12);

        assert!(text.contains("Score: 0"));
        assert!(text.contains("High Score: 12"));
        assert!(text.contains("Speed: 10"));
        assert!(text.contains("Use arrow keys to move the snake"));
    }

    #[test]
    fn game_over_frame_shows_final_score() {
        let mut core = GameCore::with_seed(EngineConfig::default(), 2).expect("valid config");
        core.set_snake(Snake::new(Position::new(0, 0)));
        core.set_direction(Direction::Up);
        core.tick();

        let text = screen_text(&core.snapshot(), 4);

        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Hit the wall"));
        assert!(text.contains("Final Score: 0"));
        assert!(text.contains("Press R to Restart or Q/ESC to Quit"));
    }

    #[test]
    fn cells_map_to_two_columns_and_skip_out_of_bounds() {
        let inner = Rect::new(1, 2, 60, 20);
        let grid = GridSize {
            width: 30,
            height: 20,
        };

        assert_eq!(cell_to_terminal(inner, grid, Position::new(0, 0)), Some((1, 2)));
        assert_eq!(cell_to_terminal(inner, grid, Position::new(3, 1)), Some((7, 3)));
        assert_eq!(cell_to_terminal(inner, grid, Position::new(-1, 0)), None);
        assert_eq!(cell_to_terminal(inner, grid, Position::new(30, 0)), None);
    }
}
