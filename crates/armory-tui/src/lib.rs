// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use armory_app::{AppCommand, AppState, Inventory, Partition, Record, ViewState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// Seam between the view and whatever supplies inventory and identity.
/// The inventory is loaded once per signed-in session; there is no reload
/// affordance.
pub trait AppRuntime {
    fn load_inventory(&mut self) -> Result<Inventory>;
    fn sign_in(&mut self, user: &str) -> Result<()>;
    fn sign_out(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    inventory: Option<Inventory>,
    cursors: [usize; 2],
    editing_query: bool,
    sign_in_input: String,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    if state.session.is_signed_in() {
        load_inventory(state, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// One fetch per session, at the moment the gated view becomes visible.
/// Load failures arrive as data inside the inventory (empty list plus a
/// reason); a runtime-level error degrades the same way here so the view
/// never crashes on load.
fn load_inventory<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let inventory = match runtime.load_inventory() {
        Ok(inventory) => inventory,
        Err(error) => Inventory::failed(error.to_string(), time::OffsetDateTime::now_utc()),
    };
    let message = load_status_message(&inventory);
    view_data.inventory = Some(inventory);
    view_data.cursors = [0, 0];
    emit_status(state, view_data, internal_tx, message);
}

fn load_status_message(inventory: &Inventory) -> String {
    if let Some(reason) = inventory.load_error() {
        return format!("feed load failed: {reason}");
    }

    let fetched = inventory
        .fetched_at()
        .format(&time::macros::format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "--:--".to_owned());
    if inventory.skipped() > 0 {
        format!(
            "{} records loaded, {} malformed rows skipped ({fetched} UTC)",
            inventory.records().len(),
            inventory.skipped()
        )
    } else {
        format!(
            "{} records loaded ({fetched} UTC)",
            inventory.records().len()
        )
    }
}

fn visible_rows<'a>(state: &AppState, view_data: &'a ViewData) -> Vec<&'a Record> {
    match &view_data.inventory {
        Some(inventory) => inventory.filtered(state.active_tab, state.query(state.active_tab)),
        None => Vec::new(),
    }
}

fn cursor(state: &AppState, view_data: &ViewData) -> usize {
    view_data.cursors[state.active_tab.index()]
}

fn clamp_cursor(state: &AppState, view_data: &mut ViewData) {
    let rows = visible_rows(state, view_data).len();
    let slot = &mut view_data.cursors[state.active_tab.index()];
    if rows == 0 {
        *slot = 0;
    } else if *slot >= rows {
        *slot = rows - 1;
    }
}

fn selected_record<'a>(state: &AppState, view_data: &'a ViewData) -> Option<&'a Record> {
    let key = state.detail_key()?;
    view_data.inventory.as_ref()?.find(key)
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if !state.session.is_signed_in() {
        handle_sign_in_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    match state.view_state() {
        ViewState::FullImage => {
            handle_image_key(state, key);
            return false;
        }
        ViewState::Detail => {
            handle_detail_key(state, view_data, internal_tx, key);
            return false;
        }
        ViewState::List => {}
    }

    if view_data.editing_query {
        handle_query_key(state, view_data, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            view_data.editing_query = true;
        }
        (KeyCode::Char('f') | KeyCode::Tab, _) => {
            state.dispatch(AppCommand::NextTab);
        }
        (KeyCode::Char('b') | KeyCode::BackTab, _) => {
            state.dispatch(AppCommand::PrevTab);
        }
        (KeyCode::Down | KeyCode::Char('j'), _) => {
            let rows = visible_rows(state, view_data).len();
            let slot = &mut view_data.cursors[state.active_tab.index()];
            if rows > 0 && *slot + 1 < rows {
                *slot += 1;
            }
        }
        (KeyCode::Up | KeyCode::Char('k'), _) => {
            let slot = &mut view_data.cursors[state.active_tab.index()];
            *slot = slot.saturating_sub(1);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) => {
            view_data.cursors[state.active_tab.index()] = 0;
        }
        (KeyCode::Char('G'), _) => {
            let rows = visible_rows(state, view_data).len();
            view_data.cursors[state.active_tab.index()] = rows.saturating_sub(1);
        }
        (KeyCode::Enter, _) => {
            let key = visible_rows(state, view_data)
                .get(cursor(state, view_data))
                .map(|record| record.key());
            if let Some(key) = key {
                state.dispatch(AppCommand::OpenDetail(key));
            }
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            if let Err(error) = runtime.sign_out() {
                emit_status(state, view_data, internal_tx, format!("sign out failed: {error}"));
                return false;
            }
            state.dispatch(AppCommand::SignOut);
            // Session teardown discards the load-once inventory.
            view_data.inventory = None;
            view_data.cursors = [0, 0];
            view_data.editing_query = false;
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
        }
        _ => {}
    }

    false
}

fn handle_sign_in_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => {
            let user = view_data.sign_in_input.trim().to_owned();
            if user.is_empty() {
                emit_status(state, view_data, internal_tx, "enter a name to sign in");
                return;
            }
            if let Err(error) = runtime.sign_in(&user) {
                emit_status(state, view_data, internal_tx, format!("sign in failed: {error}"));
                return;
            }
            view_data.sign_in_input.clear();
            state.dispatch(AppCommand::SignIn(user));
            load_inventory(state, runtime, view_data, internal_tx);
        }
        (KeyCode::Backspace, _) => {
            view_data.sign_in_input.pop();
        }
        (KeyCode::Esc, _) => {
            view_data.sign_in_input.clear();
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT =>
        {
            view_data.sign_in_input.push(ch);
        }
        _ => {}
    }
}

fn handle_detail_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::CloseDetail);
        }
        KeyCode::Enter | KeyCode::Char('i') => {
            let has_image = selected_record(state, view_data)
                .map(|record| record.image_url.is_some())
                .unwrap_or(false);
            if has_image {
                state.dispatch(AppCommand::OpenImage);
            } else {
                emit_status(state, view_data, internal_tx, "no image for this record");
            }
        }
        _ => {}
    }
}

fn handle_image_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        // The described UI close drops both layers together.
        KeyCode::Esc | KeyCode::Enter => {
            state.dispatch(AppCommand::CloseDetail);
        }
        KeyCode::Backspace => {
            state.dispatch(AppCommand::CloseImage);
        }
        _ => {}
    }
}

fn handle_query_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc | KeyCode::Enter, _) => {
            view_data.editing_query = false;
        }
        (KeyCode::Backspace, _) => {
            state.dispatch(AppCommand::QueryPop);
            clamp_cursor(state, view_data);
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::QueryClear);
            clamp_cursor(state, view_data);
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT =>
        {
            state.dispatch(AppCommand::QueryPush(ch));
            clamp_cursor(state, view_data);
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    if !state.session.is_signed_in() {
        let header = Paragraph::new("signed out")
            .block(Block::default().title("armory").borders(Borders::ALL));
        frame.render_widget(header, layout[0]);

        let prompt = Paragraph::new(sign_in_text(&view_data.sign_in_input))
            .block(Block::default().title("sign in").borders(Borders::ALL));
        frame.render_widget(prompt, layout[1]);
    } else {
        let selected = Partition::ALL
            .iter()
            .position(|tab| *tab == state.active_tab)
            .unwrap_or(0);
        let tab_titles = Partition::ALL
            .iter()
            .map(|tab| tab_title(*tab, view_data))
            .collect::<Vec<String>>();

        let tabs = Tabs::new(tab_titles)
            .block(Block::default().title("armory").borders(Borders::ALL))
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .select(selected);
        frame.render_widget(tabs, layout[0]);

        render_table(frame, layout[1], state, view_data);
    }

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if let Some(record) = selected_record(state, view_data) {
        match state.view_state() {
            ViewState::Detail => {
                let area = centered_rect(60, 60, frame.area());
                frame.render_widget(Clear, area);
                let detail = Paragraph::new(detail_text(record)).block(
                    Block::default()
                        .title(record.key())
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Cyan)),
                );
                frame.render_widget(detail, area);
            }
            ViewState::FullImage => {
                let area = centered_rect(88, 80, frame.area());
                frame.render_widget(Clear, area);
                let image = Paragraph::new(image_text(record))
                    .block(Block::default().title("image").borders(Borders::ALL));
                frame.render_widget(image, area);
            }
            ViewState::List => {}
        }
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn tab_title(tab: Partition, view_data: &ViewData) -> String {
    let count = view_data
        .inventory
        .as_ref()
        .map(|inventory| inventory.count(tab))
        .unwrap_or(0);
    format!("{} ({count})", tab.label())
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let rows_data = visible_rows(state, view_data);
    let selected_row = cursor(state, view_data);

    let header_cells = ["manufacturer", "model", "caliber", "serial"].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = rows_data.iter().enumerate().map(|(row_index, record)| {
        let mut style = Style::default();
        if row_index == selected_row {
            style = style
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
        }
        Row::new([
            Cell::from(record.manufacturer.clone()),
            Cell::from(record.model.clone()),
            Cell::from(record.caliber.clone()),
            Cell::from(record.serial_number.clone()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Min(12),
        Constraint::Min(12),
        Constraint::Min(10),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state, view_data, rows_data.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_title(state: &AppState, view_data: &ViewData, shown: usize) -> String {
    let total = view_data
        .inventory
        .as_ref()
        .map(|inventory| inventory.count(state.active_tab))
        .unwrap_or(0);
    let mut parts = vec![format!("{} r:{shown}/{total}", state.active_tab.label())];

    let query = state.query(state.active_tab);
    if !query.is_empty() || view_data.editing_query {
        let marker = if view_data.editing_query { "_" } else { "" };
        parts.push(format!("search: {query}{marker}"));
    }

    parts.join(" | ")
}

fn empty_list_text(state: &AppState, view_data: &ViewData) -> String {
    let Some(inventory) = &view_data.inventory else {
        return "no inventory loaded".to_owned();
    };
    if let Some(reason) = inventory.load_error() {
        return format!("nothing to show -- feed load failed: {reason}");
    }
    if inventory.count(state.active_tab) == 0 {
        format!("no {} records in the feed", state.active_tab.label())
    } else {
        "no records match the search".to_owned()
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }

    if !state.session.is_signed_in() {
        return "type a name, enter to sign in | ctrl+q quit".to_owned();
    }

    match state.view_state() {
        ViewState::Detail => "enter/i image | esc close".to_owned(),
        ViewState::FullImage => "esc close | backspace back to detail".to_owned(),
        ViewState::List => {
            let rows = visible_rows(state, view_data);
            if rows.is_empty() {
                empty_list_text(state, view_data)
            } else {
                "f/b tabs | / search | enter detail | s sign out | ? help | ctrl+q quit".to_owned()
            }
        }
    }
}

fn sign_in_text(input: &str) -> String {
    format!(
        "The inventory is visible to signed-in users only.\n\
         \n\
         name: {input}_\n\
         \n\
         enter sign in | esc clear | ctrl+q quit"
    )
}

fn detail_text(record: &Record) -> String {
    let mut lines = vec![
        format!("manufacturer:  {}", record.manufacturer),
        format!("model:         {}", record.model),
        format!("caliber:       {}", record.caliber),
        format!("serial number: {}", record.serial_number),
        format!("status:        {}", record.partition().label()),
    ];
    if let Some(disposition) = &record.disposition {
        lines.push(format!("disposition:   {disposition}"));
    }
    if let Some(image_url) = &record.image_url {
        lines.push(String::new());
        lines.push(format!("image: {image_url}"));
        lines.push("enter/i to view full size".to_owned());
    }
    lines.join("\n")
}

fn image_text(record: &Record) -> String {
    let reference = record
        .image_url
        .as_deref()
        .unwrap_or("(no image reference)");
    format!(
        "{} {} -- {}\n\
         \n\
         {reference}\n\
         \n\
         esc close | backspace back to detail",
        record.manufacturer, record.model, record.serial_number
    )
}

const fn help_overlay_text() -> &'static str {
    "nav: f/b or tab switch partition | j/k or arrows move | g/G first/last\n\
     nav: / edit search | enter open detail | s sign out\n\
     search: type to narrow | backspace delete | ctrl+u clear | esc/enter done\n\
     detail: enter/i full-size image | esc close\n\
     image: esc close all | backspace back to detail\n\
     ctrl+q quit | ? toggle help"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
