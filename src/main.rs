use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use livestock_map::app::App;
use livestock_map::catalog::Catalog;
use livestock_map::config::Args;
use livestock_map::selection::SelectionFlow;
use livestock_map::terminal::TerminalSession;
use livestock_map::viewer::{DocumentViewer, SystemViewer};
use livestock_map::{data, logging, ui};
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    // Held until exit so the file writer flushes
    let _log_guard = logging::init(&args)?;

    let catalog = Catalog::load(&args.catalog)
        .with_context(|| format!("cannot load catalog {}", args.catalog.display()))?;
    let origin = args.document_origin()?;
    let map = data::load_or_outline(&args.geodata);

    let unmapped: Vec<&str> = catalog
        .regions()
        .iter()
        .filter(|r| map.index_of(&r.name).is_none())
        .map(|r| r.name.as_str())
        .collect();
    if !map.is_empty() && !unmapped.is_empty() {
        tracing::warn!(?unmapped, "catalog regions without a map polygon; use [ and ] to reach them");
    }

    let viewer = match args.opener.as_deref() {
        Some(line) => SystemViewer::from_command_line(line)?,
        None => SystemViewer::platform(),
    };

    let selection = SelectionFlow::new(catalog, args.variant.into(), origin);
    tracing::info!(
        regions = selection.catalog().len(),
        polygons = map.len(),
        origin = %selection.origin().base(),
        opener = viewer.program(),
        "starting"
    );
    let viewer: Box<dyn DocumentViewer> = Box::new(viewer);

    let mut session = TerminalSession::mount()?;
    let size = session.terminal.size()?;
    let mut app = App::new(size.width, size.height, map, selection, args.theme.into(), viewer);

    run(&mut session, &mut app)
}

/// Handle mouse events for hovering, clicking, panning and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp if app.map_interactive() => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown if app.map_interactive() => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft if app.map_interactive() => app.pan(-15, 0),
        MouseEventKind::ScrollRight if app.map_interactive() => app.pan(15, 0),
        // Drag pans, a press and release in place clicks
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(session: &mut TerminalSession, app: &mut App) -> Result<()> {
    loop {
        session.terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
