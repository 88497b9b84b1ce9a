use crate::config::{default_global_config_path, default_state_root_path, Settings};
use crate::portal::PortalClient;
use crate::shared::logging::{append_wizard_log_entry, WizardLogEntry};
use crate::wizard::job_form::{JobObjectForm, Notice, Outcome, StepError};
use crate::wizard::navigation::{
    form_action_from_key, form_screen_item_count, form_transition, parse_scripted_wizard_keys,
    FormNavEffect, FormRowKind, FormScreen, NavState,
};
use crate::wizard::screens::{
    notice_lines, project_form_view_model, resource_picker_items, row_field, tail_for_display,
    toolbox_picker_items, FormViewModel,
};
use crate::wizard::state::WizardState;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, Padding, Paragraph, Row, Table};
use ratatui::Terminal;
use std::collections::VecDeque;
use std::io::{self, IsTerminal};
use std::time::Duration;

enum WizardExit {
    Advanced,
    Canceled,
}

struct WizardSession {
    state: WizardState,
    form: JobObjectForm,
    nav: NavState,
}

impl WizardSession {
    fn picker_len(&self) -> usize {
        match self.nav.screen {
            FormScreen::ToolboxPicker => self.form.images().len(),
            FormScreen::ResourcePicker => self.form.compute_types().len(),
            other => form_screen_item_count(other, 0),
        }
    }
}

/// How the effect loop asks the user for things the key stream alone cannot
/// answer: free-text edits and the yes/no confirmation.
trait WizardFrontend {
    fn confirm(&mut self, question: &str) -> bool;
    fn edit(&mut self, label: &str, current: &str) -> Option<String>;
    fn show_help(&mut self, title: &str, body: &str);
}

pub fn cmd_wizard() -> Result<String, String> {
    let config_path = default_global_config_path().map_err(|e| e.to_string())?;
    let settings = Settings::from_path(&config_path).map_err(|e| e.to_string())?;
    let base_url = std::env::var("VGLAUNCH_PORTAL_BASE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| settings.portal_base_url.clone());
    let client = PortalClient::new(base_url);

    let mut state = WizardState::default();
    let mut form = JobObjectForm::new(client, &settings, &mut state);
    form.activate(&mut state)
        .map_err(|e| format!("job wizard load exception: {e}"))?;

    let mut session = WizardSession {
        state,
        form,
        nav: NavState::form(),
    };

    let exit = if let Some(keys) = load_scripted_wizard_keys()? {
        run_wizard_scripted(&mut session, keys)?
    } else if is_interactive() {
        run_wizard_tui(&mut session)?
    } else {
        return Err(
            "wizard requires an interactive terminal or VGLAUNCH_WIZARD_SCRIPT_KEYS".to_string(),
        );
    };

    log_outcome(&session, &exit);
    match exit {
        WizardExit::Canceled => Ok("wizard canceled".to_string()),
        WizardExit::Advanced => Ok(format!(
            "job details saved\njobId={}\nseriesId={}\ntoolbox={}\nncpus={}\nnrammb={}",
            session.state.job_id().unwrap_or_default(),
            session
                .state
                .series_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "<none>".to_string()),
            session.state.toolbox().unwrap_or_default(),
            session.state.ncpus().unwrap_or_default(),
            session.state.nrammb().unwrap_or_default(),
        )),
    }
}

fn log_outcome(session: &WizardSession, exit: &WizardExit) {
    let Ok(state_root) = default_state_root_path() else {
        return;
    };
    let entry = match exit {
        WizardExit::Advanced => WizardLogEntry {
            step: "job_details",
            event: "advanced",
            fields: vec![
                (
                    "job_id",
                    session.state.job_id().unwrap_or_default().to_string(),
                ),
                ("version", session.state.version().to_string()),
            ],
        },
        WizardExit::Canceled => WizardLogEntry {
            step: "job_details",
            event: "canceled",
            fields: Vec::new(),
        },
    };
    let _ = append_wizard_log_entry(&state_root, &entry);
}

fn log_notice(notice: &Notice) {
    let Ok(state_root) = default_state_root_path() else {
        return;
    };
    let entry = WizardLogEntry {
        step: "job_details",
        event: "notice",
        fields: vec![
            ("title", notice.title.clone()),
            ("message", notice.message.clone()),
        ],
    };
    let _ = append_wizard_log_entry(&state_root, &entry);
}

fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn load_scripted_wizard_keys() -> Result<Option<Vec<event::KeyEvent>>, String> {
    let Ok(raw) = std::env::var("VGLAUNCH_WIZARD_SCRIPT_KEYS") else {
        return Ok(None);
    };
    parse_scripted_wizard_keys(&raw).map(Some)
}

fn apply_effect(
    session: &mut WizardSession,
    effect: FormNavEffect,
    frontend: &mut dyn WizardFrontend,
) -> Result<Option<WizardExit>, String> {
    match effect {
        FormNavEffect::None
        | FormNavEffect::OpenToolboxPicker
        | FormNavEffect::OpenResourcePicker
        | FormNavEffect::AnswerYes
        | FormNavEffect::AnswerNo
        | FormNavEffect::DismissError => Ok(None),
        FormNavEffect::EditField(kind) => {
            let (label, current) = match kind {
                FormRowKind::Name => ("Job Name", session.form.name().to_string()),
                FormRowKind::Description => {
                    ("Job Description", session.form.description().to_string())
                }
                _ => return Ok(None),
            };
            if let Some(value) = frontend.edit(label, &current) {
                match kind {
                    FormRowKind::Name => session.form.set_name(value),
                    FormRowKind::Description => session.form.set_description(value),
                    _ => {}
                }
            }
            Ok(None)
        }
        FormNavEffect::ToggleEmail => {
            session.form.toggle_email_notification();
            Ok(None)
        }
        FormNavEffect::ClearToolbox => {
            session.form.select_image(None);
            session.nav.status_text = "Cleared the toolbox selection.".to_string();
            Ok(None)
        }
        FormNavEffect::ShowHelp(kind) => {
            let field = row_field(kind);
            if let Some(help) = JobObjectForm::help_instructions()
                .iter()
                .find(|help| help.field == field)
            {
                frontend.show_help(help.title, help.description);
            }
            Ok(None)
        }
        FormNavEffect::ChooseToolbox(index) => {
            session.form.select_image(Some(index));
            Ok(None)
        }
        FormNavEffect::ChooseResource(index) => {
            session.form.select_compute_type(index);
            Ok(None)
        }
        FormNavEffect::Submit => {
            let outcome = session
                .form
                .validate(&mut session.state, &mut |question| {
                    frontend.confirm(question)
                });
            match outcome {
                Ok(Outcome::Advanced) => Ok(Some(WizardExit::Advanced)),
                Ok(Outcome::Rejected) => {
                    session.nav.status_text = if session.form.invalid_fields().is_empty() {
                        "Job details were not saved.".to_string()
                    } else {
                        "Required fields are missing.".to_string()
                    };
                    Ok(None)
                }
                Err(err @ StepError::LookupFailure(_)) => {
                    session.nav.status_text = err.to_string();
                    Ok(None)
                }
                Err(err) => Err(err.to_string()),
            }
        }
        FormNavEffect::CancelWizard => Ok(Some(WizardExit::Canceled)),
    }
}

fn run_wizard_scripted(
    session: &mut WizardSession,
    keys: Vec<event::KeyEvent>,
) -> Result<WizardExit, String> {
    let mut queue: VecDeque<event::KeyEvent> = keys.into();
    while let Some(key) = queue.pop_front() {
        let Some(action) = form_action_from_key(session.nav.screen, key) else {
            continue;
        };
        let picker_len = session.picker_len();
        let transition = form_transition(&mut session.nav, action, picker_len)
            .map_err(|e| e.to_string())?;
        if let Some(feedback) = transition.feedback {
            session.nav.status_text = feedback;
        }
        let mut frontend = ScriptedFrontend { queue: &mut queue };
        if let Some(exit) = apply_effect(session, transition.effect, &mut frontend)? {
            return Ok(exit);
        }
        // Notices cannot be rendered without a terminal; log and drop them so
        // a scripted run never wedges on an unread popup.
        for notice in session.form.take_notices() {
            log_notice(&notice);
        }
    }
    Ok(WizardExit::Canceled)
}

struct ScriptedFrontend<'a> {
    queue: &'a mut VecDeque<event::KeyEvent>,
}

impl WizardFrontend for ScriptedFrontend<'_> {
    fn confirm(&mut self, _question: &str) -> bool {
        matches!(
            self.queue
                .pop_front()
                .and_then(|key| form_action_from_key(FormScreen::ConfirmPopup, key)),
            Some(crate::wizard::navigation::FormAction::Yes)
                | Some(crate::wizard::navigation::FormAction::Enter)
        )
    }

    fn edit(&mut self, _label: &str, _current: &str) -> Option<String> {
        None
    }

    fn show_help(&mut self, _title: &str, _body: &str) {}
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<(Self, Term), String> {
        enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)
            .map_err(|e| format!("failed to enter alternate screen: {e}"))?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| format!("failed to initialise terminal: {e}"))?;
        Ok((TerminalGuard, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

fn run_wizard_tui(session: &mut WizardSession) -> Result<WizardExit, String> {
    let (_guard, mut terminal) = TerminalGuard::enter()?;

    loop {
        for notice in session.form.take_notices() {
            log_notice(&notice);
            show_error_popup(&mut terminal, &notice)?;
        }

        match session.nav.screen {
            FormScreen::Form => {
                let view_model = project_form_view_model(&session.form, &session.nav);
                draw_job_form(&mut terminal, &view_model)?;
            }
            FormScreen::ToolboxPicker => {
                let items = toolbox_picker_items(&session.form);
                draw_picker(&mut terminal, "Select a toolbox", &items, &session.nav)?;
            }
            FormScreen::ResourcePicker => {
                let items = resource_picker_items(&session.form);
                draw_picker(&mut terminal, "Select resources", &items, &session.nav)?;
            }
            // Popups run their own modal loops; the main loop never parks on
            // these screens.
            FormScreen::ConfirmPopup | FormScreen::ErrorPopup => {
                session.nav = NavState::form();
                continue;
            }
        }

        if !event::poll(Duration::from_millis(200))
            .map_err(|e| format!("failed to poll terminal events: {e}"))?
        {
            continue;
        }
        let Event::Key(key) = event::read().map_err(|e| format!("failed to read event: {e}"))?
        else {
            continue;
        };
        let Some(action) = form_action_from_key(session.nav.screen, key) else {
            continue;
        };
        let picker_len = session.picker_len();
        let transition = match form_transition(&mut session.nav, action, picker_len) {
            Ok(transition) => transition,
            Err(err) => {
                session.nav.status_text = err.to_string();
                continue;
            }
        };
        if let Some(feedback) = transition.feedback {
            session.nav.status_text = feedback;
        }
        let mut frontend = InteractiveFrontend {
            terminal: &mut terminal,
        };
        if let Some(exit) = apply_effect(session, transition.effect, &mut frontend)? {
            return Ok(exit);
        }
    }
}

struct InteractiveFrontend<'a> {
    terminal: &'a mut Term,
}

impl WizardFrontend for InteractiveFrontend<'_> {
    fn confirm(&mut self, question: &str) -> bool {
        confirm_popup(self.terminal, question).unwrap_or(false)
    }

    fn edit(&mut self, label: &str, current: &str) -> Option<String> {
        edit_text(self.terminal, label, current).ok().flatten()
    }

    fn show_help(&mut self, title: &str, body: &str) {
        let _ = help_popup(self.terminal, title, body);
    }
}

fn header_paragraph(title: &str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            "VGL Job Wizard",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(title.to_string()),
    ])
    .block(Block::default().borders(Borders::ALL))
}

fn footer_paragraph(hint: &str, status: &str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(hint.to_string()),
        Line::from(format!("Status: {status}")),
    ])
    .block(Block::default().borders(Borders::ALL))
}

fn main_panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .padding(Padding::new(3, 3, 2, 2))
}

fn screen_chunks(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(area)
}

fn draw_job_form(terminal: &mut Term, view_model: &FormViewModel) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let chunks = screen_chunks(frame.area());
            frame.render_widget(header_paragraph(&view_model.title), chunks[0]);

            let rows = view_model.rows.iter().enumerate().map(|(idx, row)| {
                let mut style = if idx == view_model.selected {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                if row.invalid {
                    style = style.fg(Color::Red);
                }
                let label = if row.required {
                    format!("{} *", row.label)
                } else {
                    row.label.to_string()
                };
                Row::new(vec![
                    Cell::from(label),
                    Cell::from(tail_for_display(&row.value, 64)),
                ])
                .style(style)
            });
            let table = Table::new(
                rows,
                [Constraint::Percentage(35), Constraint::Percentage(65)],
            )
            .column_spacing(2)
            .block(main_panel_block());
            frame.render_widget(table, chunks[1]);

            frame.render_widget(
                footer_paragraph(&view_model.hint_text, &view_model.status_text),
                chunks[2],
            );
        })
        .map_err(|e| format!("failed to render job form: {e}"))?;
    Ok(())
}

fn draw_picker(
    terminal: &mut Term,
    title: &str,
    items: &[String],
    nav: &NavState,
) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let chunks = screen_chunks(frame.area());
            frame.render_widget(header_paragraph(title), chunks[0]);

            let mut list_items = Vec::with_capacity(items.len());
            for (idx, line) in items.iter().enumerate() {
                let mut item = ListItem::new(Line::from(Span::raw(line.clone())));
                if idx == nav.selected {
                    item = item.style(
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    );
                }
                list_items.push(item);
            }
            if items.is_empty() {
                list_items.push(ListItem::new(Line::from(Span::raw(
                    "No matching entries found. Select a different toolbox.",
                ))));
            }
            frame.render_widget(List::new(list_items).block(main_panel_block()), chunks[1]);

            frame.render_widget(
                footer_paragraph(&nav.hint_text, &nav.status_text),
                chunks[2],
            );
        })
        .map_err(|e| format!("failed to render picker: {e}"))?;
    Ok(())
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
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

fn draw_popup(terminal: &mut Term, title: &str, lines: &[String], hint: &str) -> Result<(), String> {
    terminal
        .draw(|frame| {
            let area = centered_rect(60, 40, frame.area());
            frame.render_widget(Clear, area);
            let mut body: Vec<Line> = lines
                .iter()
                .map(|line| Line::from(line.clone()))
                .collect();
            body.push(Line::from(""));
            body.push(Line::from(Span::styled(
                hint.to_string(),
                Style::default().add_modifier(Modifier::DIM),
            )));
            let popup = Paragraph::new(body).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title.to_string())
                    .padding(Padding::new(2, 2, 1, 1)),
            );
            frame.render_widget(popup, area);
        })
        .map_err(|e| format!("failed to render popup: {e}"))?;
    Ok(())
}

fn wait_for_key() -> Result<event::KeyEvent, String> {
    loop {
        let Event::Key(key) = event::read().map_err(|e| format!("failed to read event: {e}"))?
        else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        return Ok(key);
    }
}

fn help_popup(terminal: &mut Term, title: &str, body: &str) -> Result<(), String> {
    loop {
        draw_popup(terminal, title, &[body.to_string()], "Enter/Esc dismiss")?;
        let key = wait_for_key()?;
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            return Ok(());
        }
    }
}

fn confirm_popup(terminal: &mut Term, question: &str) -> Result<bool, String> {
    let mut nav = NavState::form();
    nav.screen = FormScreen::ConfirmPopup;
    loop {
        draw_popup(
            terminal,
            "Confirm",
            &[question.to_string()],
            "y/Enter continue | n stay on this step",
        )?;
        let key = wait_for_key()?;
        let Some(action) = form_action_from_key(FormScreen::ConfirmPopup, key) else {
            continue;
        };
        let transition =
            form_transition(&mut nav, action, 0).map_err(|e| e.to_string())?;
        match transition.effect {
            FormNavEffect::AnswerYes => return Ok(true),
            FormNavEffect::AnswerNo => return Ok(false),
            _ => continue,
        }
    }
}

fn show_error_popup(terminal: &mut Term, notice: &Notice) -> Result<(), String> {
    let mut nav = NavState::form();
    nav.screen = FormScreen::ErrorPopup;
    loop {
        draw_popup(terminal, &notice.title, &notice_lines(notice), "Enter/Esc dismiss")?;
        let key = wait_for_key()?;
        let Some(action) = form_action_from_key(FormScreen::ErrorPopup, key) else {
            continue;
        };
        let transition =
            form_transition(&mut nav, action, 0).map_err(|e| e.to_string())?;
        if transition.effect == FormNavEffect::DismissError {
            return Ok(());
        }
        nav.screen = FormScreen::ErrorPopup;
    }
}

fn edit_text(
    terminal: &mut Term,
    label: &str,
    current: &str,
) -> Result<Option<String>, String> {
    let mut value = current.to_string();
    loop {
        draw_popup(
            terminal,
            label,
            &[format!("> {value}")],
            "Enter accept | Esc cancel | Backspace delete",
        )?;
        let key = wait_for_key()?;
        match key.code {
            KeyCode::Enter => return Ok(Some(value)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Backspace => {
                value.pop();
            }
            KeyCode::Char(ch) => value.push(ch),
            _ => {}
        }
    }
}
