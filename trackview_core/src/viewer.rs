//! TrackView Terminal Viewer
//! ==========================
//!
//! Interactive host surface for the draw-instruction stream.
//! Uses Ratatui for rendering and Crossterm for keyboard and mouse input.
//!
//! Enable with the `viewer` feature flag.
//!
//! Features:
//! - Canvas that executes every [`DrawInstruction`] in order
//! - Left-button drag rotates the track (pitch/yaw)
//! - Turn list for the selected track
//! - Placeholder panel when a track has no outline
//!
//! Pointer events are drained in batches before each redraw, so a burst of
//! drag events produces one frame.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use nalgebra::Point2;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Block, Borders, Paragraph, Row, Table,
    },
    Frame, Terminal,
};

use crate::catalog::TrackCatalog;
use crate::config::ViewerConfig;
use crate::render::{DrawInstruction, Rgb};
use crate::view::TrackView;

/// How long to wait for input before checking for a pending redraw.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

// =============================================================================
// TRACK VIEWER
// =============================================================================

/// Terminal viewer over a track catalog.
pub struct TrackViewer {
    catalog: TrackCatalog,
    config: ViewerConfig,
    track_ids: Vec<String>,
    /// Index into `track_ids`; `None` until a known track is selected
    selected: Option<usize>,
    /// The open view, or the message shown in place of the canvas
    view: Result<TrackView, String>,
    /// Inner canvas area from the last draw, used to map mouse cells to pixels
    canvas_area: Option<Rect>,
    dirty: bool,
    quit: bool,
    frame_count: usize,
}

impl TrackViewer {
    /// Creates a viewer with `track_id` selected.
    ///
    /// An unknown id is not an error here: the viewer starts on the
    /// "no track" placeholder and the user can cycle to a known track.
    pub fn new(catalog: TrackCatalog, config: ViewerConfig, track_id: &str) -> Self {
        let track_ids: Vec<String> = catalog.ids().map(str::to_string).collect();
        let selected = track_ids.iter().position(|id| id == track_id);
        let view = TrackView::open(&catalog, track_id, &config).map_err(|e| e.to_string());

        Self {
            catalog,
            config,
            track_ids,
            selected,
            view,
            canvas_area: None,
            dirty: true,
            quit: false,
            frame_count: 0,
        }
    }

    /// Overrides the rotation of the current view.
    pub fn with_rotation(mut self, pitch: f64, yaw: f64) -> Self {
        if let Ok(view) = &mut self.view {
            if let Err(e) = view.set_rotation(pitch, yaw) {
                tracing::warn!("Ignoring rotation override: {}", e);
            }
        }
        self
    }

    /// Returns the open view, if the selected track has an outline.
    pub fn view(&self) -> Option<&TrackView> {
        self.view.as_ref().ok()
    }

    /// Selects the track at `index` in catalog order, discarding the old rotation.
    pub fn select(&mut self, index: usize) {
        let Some(track_id) = self.track_ids.get(index) else {
            return;
        };
        self.selected = Some(index);
        self.view = TrackView::open(&self.catalog, track_id, &self.config).map_err(|e| e.to_string());
        self.dirty = true;
        tracing::debug!("Selected track '{}'", track_id);
    }

    fn cycle(&mut self, forward: bool) {
        let count = self.track_ids.len();
        if count == 0 {
            return;
        }
        let next = match (self.selected, forward) {
            (Some(current), true) => (current + 1) % count,
            (Some(current), false) => (current + count - 1) % count,
            (None, true) => 0,
            (None, false) => count - 1,
        };
        self.select(next);
    }

    /// Run the TUI main loop (blocks until 'q' pressed)
    pub fn run(&mut self) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
        while !self.quit {
            if self.take_redraw() {
                terminal.draw(|f| self.ui(f))?;
                self.frame_count += 1;
            }

            if event::poll(POLL_INTERVAL)? {
                self.handle_event(event::read()?);
                // Drain everything already queued before the next draw
                while event::poll(Duration::ZERO)? {
                    self.handle_event(event::read()?);
                }
            }
        }
        Ok(())
    }

    fn take_redraw(&mut self) -> bool {
        let view_dirty = self.view.as_mut().map(TrackView::take_redraw).unwrap_or(false);
        std::mem::take(&mut self.dirty) | view_dirty
    }

    /// Applies one input event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
                KeyCode::Tab => self.cycle(true),
                KeyCode::BackTab => self.cycle(false),
                KeyCode::Char('r') => {
                    if let Ok(view) = &mut self.view {
                        view.reset_rotation();
                    }
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                let position = self.to_viewport(mouse.column, mouse.row);
                let Ok(view) = &mut self.view else {
                    return;
                };
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        if let Some(pos) = position.filter(|(_, inside)| *inside) {
                            view.begin_drag(pos.0);
                        }
                    }
                    MouseEventKind::Drag(MouseButton::Left) => {
                        if let Some((pos, _)) = position {
                            view.update_drag(pos);
                        }
                    }
                    MouseEventKind::Up(_) => view.end_drag(),
                    _ => {}
                }
            }
            Event::Resize(_, _) => self.dirty = true,
            _ => {}
        }
    }

    /// Maps a terminal cell to viewport pixels.
    ///
    /// The flag is false when the cell lies outside the canvas; the position
    /// is still returned so a drag that leaves the canvas keeps rotating.
    fn to_viewport(&self, column: u16, row: u16) -> Option<(Point2<f64>, bool)> {
        let area = self.canvas_area?;
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;

        let rel_x = (f64::from(column) - f64::from(area.x)) / f64::from(area.width);
        let rel_y = (f64::from(row) - f64::from(area.y)) / f64::from(area.height);
        let pos = Point2::new(
            rel_x * self.config.viewport_width,
            rel_y * self.config.viewport_height,
        );
        Some((pos, inside))
    }

    /// Render the UI
    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Canvas + turns
                Constraint::Length(1), // Footer
            ])
            .split(f.area());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(chunks[1]);

        self.render_header(f, chunks[0]);

        let block = Block::default().borders(Borders::ALL).title(self.title());
        self.canvas_area = Some(block.inner(body[0]));

        match &self.view {
            Ok(view) => {
                let instructions: Vec<DrawInstruction> = view.frame().collect();
                let background = instructions.iter().find_map(|i| match i {
                    DrawInstruction::Background { color: c, .. } => Some(color(*c)),
                    _ => None,
                });
                let height = self.config.viewport_height;

                let canvas = Canvas::default()
                    .block(block)
                    .background_color(background.unwrap_or(Color::Reset))
                    .x_bounds([0.0, self.config.viewport_width])
                    .y_bounds([0.0, height])
                    .paint(|ctx| paint_instructions(ctx, &instructions, height));
                f.render_widget(canvas, body[0]);
                self.render_turns(f, body[1], view);
            }
            Err(message) => {
                let placeholder = Paragraph::new(message.as_str())
                    .style(Style::default().fg(Color::Yellow))
                    .block(block);
                f.render_widget(placeholder, body[0]);
                f.render_widget(
                    Block::default().title("Turns").borders(Borders::ALL),
                    body[1],
                );
            }
        }

        // === FOOTER ===
        let footer = Paragraph::new("Drag to rotate | Tab/Shift-Tab: track | r: reset | q: quit")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(footer, chunks[2]);
    }

    fn title(&self) -> String {
        match &self.view {
            Ok(view) if !view.outline().name.is_empty() => view.outline().name.clone(),
            Ok(view) => view.track_id().to_string(),
            Err(_) => "No track".to_string(),
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let rotation = match &self.view {
            Ok(view) => format!(
                "pitch={:.1}° yaw={:.1}°",
                view.rotation().pitch(),
                view.rotation().yaw()
            ),
            Err(_) => "-".to_string(),
        };
        let position = match self.selected {
            Some(index) => format!("{}/{}", index + 1, self.track_ids.len()),
            None => format!("-/{}", self.track_ids.len()),
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("🏁 TrackView", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled(
                position,
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  |  "),
            Span::styled(rotation, Style::default().fg(Color::Cyan)),
            Span::raw("  |  "),
            Span::raw(format!("Frame: {}", self.frame_count)),
        ]))
        .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(header, area);
    }

    fn render_turns(&self, f: &mut Frame, area: Rect, view: &TrackView) {
        let header_cells = ["Turn", "Sector", "Point"]
            .iter()
            .map(|h| Span::styled(*h, Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells).height(1);

        let rows: Vec<Row> = view
            .outline()
            .turns()
            .map(|turn| {
                let sector_color = color(self.config.sector_colors[turn.sector.index()]);
                Row::new(vec![
                    Span::raw(turn.label.to_string()),
                    Span::styled(turn.sector.to_string(), Style::default().fg(sector_color)),
                    Span::raw(turn.index.to_string()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [Constraint::Length(8), Constraint::Length(7), Constraint::Length(6)],
        )
        .header(header)
        .block(Block::default().title("Turns").borders(Borders::ALL));
        f.render_widget(table, area);
    }
}

/// Executes draw instructions on a canvas whose y axis points up.
fn paint_instructions(ctx: &mut Context, instructions: &[DrawInstruction], height: f64) {
    let flip = |y: f64| height - y;

    for instruction in instructions {
        match instruction {
            DrawInstruction::Background { .. } => {}
            DrawInstruction::GridLines { lines, color: c, .. } => {
                for s in lines {
                    ctx.draw(&CanvasLine {
                        x1: s.x1,
                        y1: flip(s.y1),
                        x2: s.x2,
                        y2: flip(s.y2),
                        color: color(*c),
                    });
                }
                ctx.layer();
            }
            DrawInstruction::Polyline { points, color: c } => {
                for pair in points.windows(2) {
                    ctx.draw(&CanvasLine {
                        x1: pair[0].x,
                        y1: flip(pair[0].y),
                        x2: pair[1].x,
                        y2: flip(pair[1].y),
                        color: color(*c),
                    });
                }
            }
            DrawInstruction::CircleMarker { center, radius, color: c, label, .. } => {
                ctx.draw(&Circle {
                    x: center.x,
                    y: flip(center.y),
                    radius: *radius,
                    color: color(*c),
                });
                if let Some(label) = label {
                    ctx.print(
                        center.x + radius,
                        flip(center.y),
                        Span::styled(label.clone(), Style::default().fg(color(*c))),
                    );
                }
            }
            DrawInstruction::TextLabel { x, y, text, color: c } => {
                ctx.print(*x, flip(*y), Span::styled(text.clone(), Style::default().fg(color(*c))));
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
