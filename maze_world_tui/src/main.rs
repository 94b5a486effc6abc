use anyhow::{Context, Result};
use clap::Parser;
use maze_world_core::{
    DrawInstruction, EntityKind, Frame as SceneFrame, GameConfig, TileMap, World,
    color::ColorState,
    input::{Command, InputEvent, Key, KeyEventKind as CoreKeyEventKind, Modifiers},
    interaction::KeyVariant,
    mesh::{MeshLibrary, ModelKind},
};
use ratatui::{
    crossterm::{
        self,
        event::{
            self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent,
            KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
            PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
        },
        execute,
        terminal::{
            EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            supports_keyboard_enhancement,
        },
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE", default_value = "maps/map01.txt")]
    map: PathBuf,

    /// JSON file overriding movement and collision settings
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Directory holding teapot.txt, knot.txt, cube.txt and sphere.txt
    #[arg(long, value_name = "DIR")]
    models: Option<PathBuf>,

    /// Where to write logs; the terminal itself is taken by the UI
    #[arg(long, value_name = "LOG_FILE", default_value = "maze_world.log")]
    log_file: PathBuf,

    /// Game time units per wall-clock second
    #[arg(long, default_value_t = 10.0)]
    time_scale: f32,
}

struct App {
    /// The core simulation state.
    world: World,
    /// The most recently composed frame.
    frame: SceneFrame,
    meshes: Option<MeshLibrary>,
    /// Whether the terminal reports key releases.
    sees_releases: bool,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(world: World, meshes: Option<MeshLibrary>, sees_releases: bool) -> Self {
        App {
            world,
            frame: SceneFrame::default(),
            meshes,
            sees_releases,
            should_quit: false,
        }
    }

    /// Feeds a terminal key event to the world.
    fn on_key(&mut self, key: KeyEvent) {
        let Some(game_key) = map_key(key.code) else {
            return;
        };
        let modifiers = Modifiers {
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
        };
        let kind = match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => CoreKeyEventKind::KeyDown,
            KeyEventKind::Release => CoreKeyEventKind::KeyUp,
        };

        self.send(InputEvent {
            kind,
            key: game_key,
            modifiers,
        });
        // Without release reports a press stands for a full click.
        if !self.sees_releases && game_key.direction().is_none() {
            self.send(InputEvent {
                kind: CoreKeyEventKind::KeyUp,
                key: game_key,
                modifiers,
            });
        }
    }

    fn send(&mut self, event: InputEvent) {
        match self.world.handle_event(event) {
            Some(Command::Quit) => self.should_quit = true,
            Some(Command::ToggleFullscreen) => {
                info!(fullscreen = self.world.is_fullscreen(), "fullscreen toggled");
            }
            Some(Command::RandomizeColor) => {
                info!(tint = ?self.world.color(), "tint randomized");
            }
            None => {}
        }
    }

    /// Handles one step of the simulation.
    fn tick(&mut self, dt: f32) {
        self.frame = self.world.tick(dt);
        if !self.sees_releases {
            self.world.release_keys();
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Key::ColorRandomize),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(Key::Fullscreen),
        KeyCode::Char('q') | KeyCode::Esc => Some(Key::Quit),
        _ => None,
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    init_tracing(&args.log_file)?;

    let map = load_map(&args.map)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    let meshes = args.models.as_deref().map(load_meshes).transpose()?;
    info!(map = %args.map.display(), "map file read");

    // Set up the terminal
    let mut terminal = setup_terminal()?;
    let sees_releases = enable_release_reports(&mut terminal);
    if !sees_releases {
        warn!("terminal does not report key releases; held keys are re-read every frame");
    }

    // Create the application state
    let mut app = App::new(World::new(map, config), meshes, sees_releases);

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app, args.time_scale);

    // Restore the terminal state
    restore_terminal(&mut terminal, sees_releases)?;

    result
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn load_map(path: &Path) -> Result<TileMap> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file {}", path.display()))?;
    TileMap::parse(&text).with_context(|| format!("Invalid map file {}", path.display()))
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

fn load_meshes(dir: &Path) -> Result<MeshLibrary> {
    let mut texts = Vec::with_capacity(4);
    for model in ModelKind::LOAD_ORDER {
        let path = dir.join(model.file_name());
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read model {}", path.display()))?;
        texts.push(text);
    }
    let library = MeshLibrary::from_descriptions([
        texts[0].as_str(),
        texts[1].as_str(),
        texts[2].as_str(),
        texts[3].as_str(),
    ])
    .with_context(|| format!("Invalid model in {}", dir.display()))?;
    info!(vertices = library.total_vertices(), "models loaded");
    Ok(library)
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Asks the terminal for key release events. Returns whether it agreed.
fn enable_release_reports(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> bool {
    if !matches!(supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    execute!(
        terminal.backend_mut(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

/// Restores the terminal to its original state.
fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    sees_releases: bool,
) -> Result<()> {
    if sees_releases {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    time_scale: f32,
) -> Result<()> {
    let frame_time = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        let timeout = frame_time
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        // Drain every pending event before advancing the world
        if crossterm::event::poll(timeout)? {
            loop {
                if let Event::Key(key) = event::read()? {
                    app.on_key(key);
                }
                if !crossterm::event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }

        if app.should_quit {
            break;
        }

        if last_tick.elapsed() >= frame_time {
            let dt = last_tick.elapsed().as_secs_f32() * time_scale;
            last_tick = Instant::now();
            app.tick(dt);
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame<'_>, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(70), // Area for the map
            Constraint::Percentage(20), // Area for status
            Constraint::Percentage(10), // Area for help
        ])
        .split(frame.area());

    render_scene(frame, main_layout[0], app);
    render_status(frame, main_layout[1], app);

    let help_text = Paragraph::new(
        "Arrows move, Shift+Up/Down change height, 'c' recolors, 'f' fullscreen, 'q' or 'Esc' quits.",
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Draw order when several instructions land on one cell; higher wins.
fn layer(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::Floor => 0,
        EntityKind::Wall => 1,
        EntityKind::Door => 2,
        EntityKind::Key => 3,
        EntityKind::Player => 4,
    }
}

fn glyph(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Floor => ".",
        EntityKind::Wall => "#",
        EntityKind::Door => "+",
        EntityKind::Key => "k",
        EntityKind::Player => "@",
    }
}

/// Base colour of each texture slot, tinted like the shader tints the texture.
fn texture_color(slot: u32, tint: ColorState) -> Color {
    let (r, g, b) = match slot {
        0 => (160.0, 110.0, 60.0),
        1 => (180.0, 70.0, 50.0),
        2 => (230.0, 200.0, 40.0),
        3 => (60.0, 200.0, 220.0),
        _ => (255.0, 255.0, 255.0),
    };
    Color::Rgb(
        (r * tint.r).round() as u8,
        (g * tint.g).round() as u8,
        (b * tint.b).round() as u8,
    )
}

/// Projects the frame's instructions onto the map grid, seen from above.
fn render_scene(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let map = app.world.map();
    let (rows, cols) = (map.rows(), map.cols());
    let mut cells: Vec<Option<&DrawInstruction>> = vec![None; rows * cols];

    for instruction in &app.frame.instructions {
        let origin = instruction.translation();
        let (row, col) = (origin.z.round(), origin.y.round());
        if row < 0.0 || col < 0.0 || row as usize >= rows || col as usize >= cols {
            continue;
        }
        let slot = &mut cells[row as usize * cols + col as usize];
        if slot.is_none_or(|current| layer(current.kind) < layer(instruction.kind)) {
            *slot = Some(instruction);
        }
    }

    let tint = app.world.color();
    let lines: Vec<Line> = cells
        .chunks(cols.max(1))
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    Some(instruction) => Span::styled(
                        glyph(instruction.kind),
                        Style::default().fg(texture_color(instruction.texture_slot, tint)),
                    ),
                    None => Span::raw(" "),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let title = if app.world.is_fullscreen() {
        "Maze World [fullscreen]"
    } else {
        "Maze World"
    };
    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}

fn render_status(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let player = app.world.player();
    let flags = app.world.flags();
    let key_color = match flags.active_key {
        KeyVariant::None => Color::Gray,
        variant => texture_color(variant.texture_slot(), ColorState::default()),
    };
    let (r, g, b) = app.world.color().to_rgb8();

    let mut items = vec![
        ListItem::from(format!(
            "Offset: ({:.2}, {:.2})  Cell: {:?}  Height: {:.2}  Time: {:.1}",
            player.offset.x,
            player.offset.y,
            app.world.player_cell(),
            player.lift,
            app.world.elapsed()
        )),
        ListItem::from(Line::from(vec![
            Span::raw(format!(
                "Key collected: {}  Door open: {}  Key: ",
                flags.key_collected, flags.door_open
            )),
            Span::styled(format!("{:?}", flags.active_key), Style::default().fg(key_color)),
        ])),
        ListItem::from(Line::from(vec![
            Span::raw("Tint: "),
            Span::styled(
                format!("#{r:02x}{g:02x}{b:02x}"),
                Style::default().fg(Color::Rgb(r, g, b)),
            ),
        ])),
    ];
    if let Some(meshes) = &app.meshes {
        let vertices: usize = app
            .frame
            .instructions
            .iter()
            .map(|instruction| meshes.for_entity(instruction.kind).vertex_count)
            .sum();
        items.push(ListItem::from(format!(
            "Draw calls: {}  Vertices: {}",
            app.frame.instructions.len(),
            vertices
        )));
    }

    let status_widget =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status_widget, area);
}
