//! Terminal console for the cluster summary.
//!
//! A read-only TUI over the [`Aggregator`] state: a status bar, the error
//! banner when a refresh came back incomplete, and one tab each for the
//! controller, the agents, feature gates and the latency heat-map.
//!
//! Launch with `cview console` (the default command).

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame, Terminal,
};

use cview_types::{
    format_conditions, heartbeat_age, ref_or_unknown, AgentInfo, ControllerInfo, FeatureGate,
};

use crate::heatmap::{self, HeatCell, HEAT_PALETTE, NO_DATA_COLOR};
use crate::orchestrator::{Aggregator, DashboardView, RefreshOutcome};

const HEAT_COLUMN_WIDTH: u16 = 10;
const WAITING: &str = "  Waiting for data...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Controller,
    Agents,
    FeatureGates,
    Latency,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Controller, Tab::Agents, Tab::FeatureGates, Tab::Latency];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Controller => "Controller",
            Tab::Agents => "Agents",
            Tab::FeatureGates => "Feature Gates",
            Tab::Latency => "Latency",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What a key press asks the console loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Refresh,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
struct AgentView {
    name: String,
    version: String,
    pod: String,
    node: String,
    local_pods: u32,
    subnets: String,
    ovs_version: String,
    conditions: String,
    heartbeat: String,
    healthy: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct GateView {
    name: String,
    status: String,
    version: String,
    enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct LatencyView {
    labels: Vec<String>,
    rows: Vec<(String, Vec<HeatCell>)>,
}

/// Everything one frame needs, taken from a [`DashboardView`].
#[derive(Debug, Clone)]
struct ConsoleSnapshot {
    endpoint: String,
    generation: u64,
    refreshed: String,
    refreshing: bool,
    error: Option<String>,
    controller: Option<Vec<(&'static str, String)>>,
    agents: Option<Vec<AgentView>>,
    controller_gates: Option<Vec<GateView>>,
    agent_gates: Option<Vec<GateView>>,
    latency: Option<LatencyView>,
}

impl ConsoleSnapshot {
    fn from_view(view: &DashboardView, endpoint: &str, now: DateTime<Utc>) -> Self {
        let summary = &view.summary;
        Self {
            endpoint: endpoint.to_string(),
            generation: summary.generation,
            refreshed: summary
                .refreshed_at
                .map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string()),
            refreshing: view.refreshing,
            error: view.error.clone(),
            controller: summary.controller.as_ref().map(|c| controller_fields(c, now)),
            agents: summary
                .agents
                .as_ref()
                .map(|agents| agents.iter().map(|a| agent_view(a, now)).collect()),
            controller_gates: summary.controller_gates().map(gate_views),
            agent_gates: summary.agent_gates().map(gate_views),
            latency: summary.latency_matrix.as_ref().map(|m| LatencyView {
                labels: m.nodes.columns().to_vec(),
                rows: heatmap::heat_rows(m),
            }),
        }
    }
}

fn controller_fields(c: &ControllerInfo, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
    vec![
        ("Name", c.name().to_string()),
        ("Version", c.version.clone()),
        ("Pod", ref_or_unknown(c.pod_ref.as_ref())),
        ("Node", ref_or_unknown(c.node_ref.as_ref())),
        ("Connected Agents", c.connected_agent_num.to_string()),
        ("Conditions", format_conditions(&c.controller_conditions)),
        ("Last Heartbeat", heartbeat_age(&c.controller_conditions, now)),
    ]
}

fn agent_view(a: &AgentInfo, now: DateTime<Utc>) -> AgentView {
    AgentView {
        name: a.name().to_string(),
        version: a.version.clone(),
        pod: ref_or_unknown(a.pod_ref.as_ref()),
        node: ref_or_unknown(a.node_ref.as_ref()),
        local_pods: a.local_pod_num,
        subnets: if a.node_subnets.is_empty() {
            "-".to_string()
        } else {
            a.node_subnets.join(", ")
        },
        ovs_version: if a.ovs_info.version.is_empty() {
            "-".to_string()
        } else {
            a.ovs_info.version.clone()
        },
        conditions: format_conditions(&a.agent_conditions),
        heartbeat: heartbeat_age(&a.agent_conditions, now),
        healthy: a.agent_conditions.iter().all(|c| c.is_healthy()),
    }
}

fn gate_views(gates: &[FeatureGate]) -> Vec<GateView> {
    gates
        .iter()
        .map(|g| GateView {
            name: g.name.clone(),
            status: g.status.clone(),
            version: g.version.clone(),
            enabled: g.is_enabled(),
        })
        .collect()
}

/// Map a key press to an action, updating the selected tab in place.
pub fn handle_key(tab: &mut Tab, code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::F(5) => KeyAction::Refresh,
        KeyCode::Tab | KeyCode::Right => {
            *tab = tab.next();
            KeyAction::None
        }
        KeyCode::BackTab | KeyCode::Left => {
            *tab = tab.prev();
            KeyAction::None
        }
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            *tab = Tab::ALL[idx];
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

/// Render one full frame.
fn render(frame: &mut Frame, snap: &ConsoleSnapshot, tab: Tab) {
    let banner_height = if snap.error.is_some() { 3 } else { 0 };
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Status bar
            Constraint::Length(banner_height), // Error banner
            Constraint::Length(3),             // Tabs
            Constraint::Min(6),                // Panel
            Constraint::Length(1),             // Key help
        ])
        .split(frame.area());

    render_status_bar(frame, outer[0], snap);
    if let Some(error) = &snap.error {
        render_banner(frame, outer[1], error);
    }
    render_tabs(frame, outer[2], tab);
    match tab {
        Tab::Controller => render_controller(frame, outer[3], snap),
        Tab::Agents => render_agents(frame, outer[3], snap),
        Tab::FeatureGates => render_feature_gates(frame, outer[3], snap),
        Tab::Latency => render_latency(frame, outer[3], snap),
    }
    render_help(frame, outer[4]);
}

fn render_status_bar(frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
    let block = Block::default()
        .title(" Cluster Summary ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let (state, state_color) = if snap.refreshing {
        ("Refreshing", Color::Yellow)
    } else if snap.error.is_some() {
        ("Degraded", Color::Red)
    } else if snap.generation == 0 {
        ("Loading", Color::Yellow)
    } else {
        ("Healthy", Color::Green)
    };

    let line = Line::from(vec![
        Span::styled("  Backend: ", Style::default().fg(Color::Gray)),
        Span::styled(&snap.endpoint, Style::default().fg(Color::White)),
        Span::styled("  |  State: ", Style::default().fg(Color::Gray)),
        Span::styled(state, Style::default().fg(state_color)),
        Span::styled("  |  Refreshed: ", Style::default().fg(Color::Gray)),
        Span::styled(&snap.refreshed, Style::default().fg(Color::Magenta)),
        Span::styled("  |  Cycle: ", Style::default().fg(Color::Gray)),
        Span::styled(snap.generation.to_string(), Style::default().fg(Color::LightCyan)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_banner(frame: &mut Frame, area: Rect, error: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let text = Line::from(Span::styled(
        format!("  {error}"),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, tab: Tab) {
    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!(" {} {} ", i + 1, t.title()));
    let tabs = Tabs::new(titles)
        .select(tab.index())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn waiting(frame: &mut Frame, area: Rect, block: Block) {
    let text = Paragraph::new(Line::from(Span::styled(
        WAITING,
        Style::default().fg(Color::DarkGray),
    )))
    .block(block);
    frame.render_widget(text, area);
}

fn header(cells: &[&'static str]) -> Row<'static> {
    Row::new(cells.to_vec())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))
}

fn render_controller(frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
    let block = Block::default()
        .title(" Controller ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let Some(fields) = &snap.controller else {
        waiting(frame, area, block);
        return;
    };

    let rows: Vec<Row> = fields
        .iter()
        .map(|(key, value)| {
            Row::new(vec![
                Cell::from(Span::styled(format!("  {key}"), Style::default().fg(Color::Gray))),
                Cell::from(Span::styled(value.clone(), Style::default().fg(Color::White))),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(20)]).block(block);
    frame.render_widget(table, area);
}

fn render_agents(frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
    let Some(agents) = &snap.agents else {
        let block = Block::default()
            .title(" Agents ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));
        waiting(frame, area, block);
        return;
    };

    let block = Block::default()
        .title(format!(" Agents ({}) ", agents.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let rows: Vec<Row> = agents
        .iter()
        .map(|a| {
            let health = if a.healthy { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from(Span::styled(format!("  {}", a.name), Style::default().fg(Color::White))),
                Cell::from(a.version.clone()),
                Cell::from(a.pod.clone()),
                Cell::from(a.node.clone()),
                Cell::from(a.local_pods.to_string()),
                Cell::from(a.subnets.clone()),
                Cell::from(a.ovs_version.clone()),
                Cell::from(Span::styled(a.conditions.clone(), Style::default().fg(health))),
                Cell::from(a.heartbeat.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(16),
            Constraint::Percentage(8),
            Constraint::Percentage(16),
            Constraint::Percentage(10),
            Constraint::Percentage(5),
            Constraint::Percentage(14),
            Constraint::Percentage(7),
            Constraint::Percentage(17),
            Constraint::Percentage(7),
        ],
    )
    .block(block)
    .header(header(&[
        "  Name", "Version", "Pod", "Node", "Pods", "Subnets", "OVS", "Conditions", "Beat",
    ]));

    frame.render_widget(table, area);
}

fn render_feature_gates(frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_gate_table(frame, columns[0], "Controller", snap.controller_gates.as_deref());
    render_gate_table(frame, columns[1], "Agent", snap.agent_gates.as_deref());
}

fn render_gate_table(frame: &mut Frame, area: Rect, component: &str, gates: Option<&[GateView]>) {
    let Some(gates) = gates else {
        let block = Block::default()
            .title(format!(" {component} Feature Gates "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::LightBlue));
        waiting(frame, area, block);
        return;
    };

    let block = Block::default()
        .title(format!(" {component} Feature Gates ({}) ", gates.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightBlue));

    let rows: Vec<Row> = gates
        .iter()
        .map(|g| {
            let color = if g.enabled { Color::Green } else { Color::DarkGray };
            Row::new(vec![
                Cell::from(format!("  {}", g.name)),
                Cell::from(Span::styled(g.status.clone(), Style::default().fg(color))),
                Cell::from(g.version.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(55),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
        ],
    )
    .block(block)
    .header(header(&["  Name", "Status", "Version"]));

    frame.render_widget(table, area);
}

fn render_latency(frame: &mut Frame, area: Rect, snap: &ConsoleSnapshot) {
    let block = Block::default()
        .title(" Node Latency (ms) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let Some(latency) = &snap.latency else {
        waiting(frame, area, block);
        return;
    };

    if latency.labels.is_empty() {
        let text = Paragraph::new(Line::from(Span::styled(
            "  No latency measurements reported.",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(text, area);
        return;
    }

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(block.inner(area));
    frame.render_widget(block, area);

    let label_width = HEAT_COLUMN_WIDTH as usize - 1;
    let mut head = vec![Cell::from("")];
    head.extend(
        latency
            .labels
            .iter()
            .map(|l| Cell::from(heatmap::truncate_label(l, label_width))),
    );

    let rows: Vec<Row> = latency
        .rows
        .iter()
        .map(|(label, cells)| {
            let mut row = vec![Cell::from(Span::styled(
                heatmap::truncate_label(label, label_width),
                Style::default().fg(Color::Gray),
            ))];
            row.extend(cells.iter().map(|c| {
                Cell::from(format!("{:>width$}", c.text, width = label_width))
                    .style(Style::default().fg(Color::Black).bg(c.color))
            }));
            Row::new(row)
        })
        .collect();

    let widths = std::iter::repeat(Constraint::Length(HEAT_COLUMN_WIDTH))
        .take(latency.labels.len() + 1)
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths).header(
        Row::new(head).style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, inner[0]);

    let mut legend = vec![Span::styled(" low ", Style::default().fg(Color::Gray))];
    legend.extend(
        HEAT_PALETTE
            .iter()
            .map(|c| Span::styled("   ", Style::default().bg(*c))),
    );
    legend.push(Span::styled(" high   ", Style::default().fg(Color::Gray)));
    legend.push(Span::styled("   ", Style::default().bg(NO_DATA_COLOR)));
    legend.push(Span::styled(" no data", Style::default().fg(Color::Gray)));
    frame.render_widget(Paragraph::new(Line::from(legend)), inner[1]);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Line::from(Span::styled(
        "  r refresh  |  Tab/1-4 switch view  |  q quit",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(help), area);
}

/// Start a cycle in the background so drawing never waits on the backend.
fn trigger_refresh(aggregator: &Arc<Aggregator>) {
    let aggregator = Arc::clone(aggregator);
    tokio::spawn(async move {
        match aggregator.refresh().await {
            RefreshOutcome::Completed { failed_sources } => {
                tracing::debug!(failed_sources, "Console refresh finished");
            }
            RefreshOutcome::AlreadyRunning => {
                tracing::debug!("Console refresh ignored, cycle in flight");
            }
        }
    });
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the console event loop until the operator quits.
///
/// The first refresh cycle starts immediately; later cycles only run when
/// the operator asks for one.
pub async fn run_console(aggregator: Arc<Aggregator>, endpoint: String) -> Result<(), anyhow::Error> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!(
            "Console requires a terminal (TTY). Use `cview snapshot` or `cview serve` instead."
        ));
    }

    // Restore the terminal before the panic message is printed.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut tab = Tab::Controller;
    let tick_rate = Duration::from_millis(200);

    trigger_refresh(&aggregator);

    loop {
        let view = aggregator.view().await;
        let snapshot = ConsoleSnapshot::from_view(&view, &endpoint, Utc::now());

        terminal.draw(|frame| render(frame, &snapshot, tab))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(&mut tab, key.code, key.modifiers) {
                    KeyAction::Quit => break,
                    KeyAction::Refresh => trigger_refresh(&aggregator),
                    KeyAction::None => {}
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}
