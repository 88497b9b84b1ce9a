use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

const FORM_STATUS_TEXT: &str = "Enter edits the selected field. 's' submits. Esc cancels.";
const FORM_HINT_TEXT: &str = "Up/Down move | Enter edit | t toggle | d clear toolbox | h help | s submit | Esc cancel";
const PICKER_STATUS_TEXT: &str = "Enter chooses the highlighted entry. Esc back.";
const PICKER_HINT_TEXT: &str = "Up/Down move | Enter choose | Esc back";
const CONFIRM_HINT_TEXT: &str = "y/Enter continue | n stay on this step";
const ERROR_HINT_TEXT: &str = "Enter/Esc dismiss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScreen {
    Form,
    ToolboxPicker,
    ResourcePicker,
    ConfirmPopup,
    ErrorPopup,
}

pub const ALL_FORM_SCREENS: [FormScreen; 5] = [
    FormScreen::Form,
    FormScreen::ToolboxPicker,
    FormScreen::ResourcePicker,
    FormScreen::ConfirmPopup,
    FormScreen::ErrorPopup,
];

impl FormScreen {
    fn as_str(self) -> &'static str {
        match self {
            FormScreen::Form => "form",
            FormScreen::ToolboxPicker => "toolbox_picker",
            FormScreen::ResourcePicker => "resource_picker",
            FormScreen::ConfirmPopup => "confirm_popup",
            FormScreen::ErrorPopup => "error_popup",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    MovePrev,
    MoveNext,
    Enter,
    Back,
    Toggle,
    Clear,
    Help,
    Submit,
    Cancel,
    Yes,
    No,
    ReconcileSelection(usize),
}

impl FormAction {
    fn as_str(self) -> &'static str {
        match self {
            FormAction::MovePrev => "move_prev",
            FormAction::MoveNext => "move_next",
            FormAction::Enter => "enter",
            FormAction::Back => "back",
            FormAction::Toggle => "toggle",
            FormAction::Clear => "clear",
            FormAction::Help => "help",
            FormAction::Submit => "submit",
            FormAction::Cancel => "cancel",
            FormAction::Yes => "yes",
            FormAction::No => "no",
            FormAction::ReconcileSelection(_) => "reconcile_selection",
        }
    }
}

/// Rows of the job-details form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRowKind {
    Name,
    Description,
    Toolbox,
    Resources,
    EmailNotification,
}

pub const FORM_ROWS: [FormRowKind; 5] = [
    FormRowKind::Name,
    FormRowKind::Description,
    FormRowKind::Toolbox,
    FormRowKind::Resources,
    FormRowKind::EmailNotification,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub screen: FormScreen,
    pub selected: usize,
    pub status_text: String,
    pub hint_text: String,
}

impl NavState {
    pub fn form() -> Self {
        Self {
            screen: FormScreen::Form,
            selected: 0,
            status_text: FORM_STATUS_TEXT.to_string(),
            hint_text: FORM_HINT_TEXT.to_string(),
        }
    }

    pub fn clamp_selection(&mut self, len: usize) {
        self.selected = clamp_selection(self.selected, len);
    }

    fn open(&mut self, screen: FormScreen) {
        self.screen = screen;
        self.selected = 0;
        match screen {
            FormScreen::Form => {
                self.status_text = FORM_STATUS_TEXT.to_string();
                self.hint_text = FORM_HINT_TEXT.to_string();
            }
            FormScreen::ToolboxPicker | FormScreen::ResourcePicker => {
                self.status_text = PICKER_STATUS_TEXT.to_string();
                self.hint_text = PICKER_HINT_TEXT.to_string();
            }
            FormScreen::ConfirmPopup => {
                self.hint_text = CONFIRM_HINT_TEXT.to_string();
            }
            FormScreen::ErrorPopup => {
                self.hint_text = ERROR_HINT_TEXT.to_string();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNavEffect {
    None,
    EditField(FormRowKind),
    ToggleEmail,
    ClearToolbox,
    ShowHelp(FormRowKind),
    OpenToolboxPicker,
    OpenResourcePicker,
    ChooseToolbox(usize),
    ChooseResource(usize),
    Submit,
    CancelWizard,
    AnswerYes,
    AnswerNo,
    DismissError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormTransition {
    pub effect: FormNavEffect,
    pub feedback: Option<String>,
}

impl FormTransition {
    fn no_op(feedback: Option<String>) -> Self {
        Self {
            effect: FormNavEffect::None,
            feedback,
        }
    }

    fn effect(effect: FormNavEffect) -> Self {
        Self {
            effect,
            feedback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNavError {
    InvalidTransition {
        screen: FormScreen,
        action: FormAction,
    },
}

impl std::fmt::Display for FormNavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormNavError::InvalidTransition { screen, action } => {
                write!(
                    f,
                    "invalid wizard transition: screen={} action={}",
                    screen.as_str(),
                    action.as_str()
                )
            }
        }
    }
}

pub fn clamp_selection(selected: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    selected.min(len - 1)
}

pub fn form_action_from_key(
    screen: FormScreen,
    key: crossterm::event::KeyEvent,
) -> Option<FormAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(FormAction::Cancel);
    }
    match key.code {
        KeyCode::Up => Some(FormAction::MovePrev),
        KeyCode::Down => Some(FormAction::MoveNext),
        KeyCode::Esc => Some(if screen == FormScreen::Form {
            FormAction::Cancel
        } else {
            FormAction::Back
        }),
        KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => Some(FormAction::Enter),
        KeyCode::Char('t') => Some(FormAction::Toggle),
        KeyCode::Char('d') => Some(FormAction::Clear),
        KeyCode::Char('h') => Some(FormAction::Help),
        KeyCode::Char('s') => Some(FormAction::Submit),
        KeyCode::Char('y') => Some(FormAction::Yes),
        KeyCode::Char('n') => Some(FormAction::No),
        _ => None,
    }
}

pub fn parse_scripted_wizard_keys(raw: &str) -> Result<Vec<crossterm::event::KeyEvent>, String> {
    let mut keys = Vec::new();
    for token in raw.split(',') {
        let normalized = token.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            continue;
        }
        let key = match normalized.as_str() {
            "up" => crossterm::event::KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            "down" => crossterm::event::KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            "enter" => crossterm::event::KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            "esc" => crossterm::event::KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            "ctrl-c" => crossterm::event::KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            "t" => crossterm::event::KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE),
            "d" => crossterm::event::KeyEvent::new(KeyCode::Char('d'), KeyModifiers::NONE),
            "h" => crossterm::event::KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE),
            "s" => crossterm::event::KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE),
            "y" => crossterm::event::KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE),
            "n" => crossterm::event::KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE),
            other => {
                return Err(format!(
                    "invalid VGLAUNCH_WIZARD_SCRIPT_KEYS token `{other}`; valid tokens: up,down,enter,esc,ctrl-c,t,d,h,s,y,n"
                ));
            }
        };
        keys.push(key);
    }
    Ok(keys)
}

pub fn form_transition(
    state: &mut NavState,
    action: FormAction,
    item_count: usize,
) -> Result<FormTransition, FormNavError> {
    if let FormAction::ReconcileSelection(len) = action {
        let previous = state.selected;
        state.clamp_selection(len);
        if previous != state.selected {
            return Ok(FormTransition::no_op(Some(
                "selection adjusted".to_string(),
            )));
        }
        return Ok(FormTransition::no_op(None));
    }

    match state.screen {
        FormScreen::Form => match action {
            FormAction::MovePrev => {
                state.selected = state.selected.saturating_sub(1);
                Ok(FormTransition::no_op(None))
            }
            FormAction::MoveNext => {
                let max_index = FORM_ROWS.len().saturating_sub(1);
                state.selected = std::cmp::min(state.selected + 1, max_index);
                Ok(FormTransition::no_op(None))
            }
            FormAction::Enter => {
                let effect = match FORM_ROWS[clamp_selection(state.selected, FORM_ROWS.len())] {
                    FormRowKind::Name => FormNavEffect::EditField(FormRowKind::Name),
                    FormRowKind::Description => FormNavEffect::EditField(FormRowKind::Description),
                    FormRowKind::Toolbox => {
                        state.open(FormScreen::ToolboxPicker);
                        FormNavEffect::OpenToolboxPicker
                    }
                    FormRowKind::Resources => {
                        state.open(FormScreen::ResourcePicker);
                        FormNavEffect::OpenResourcePicker
                    }
                    FormRowKind::EmailNotification => FormNavEffect::ToggleEmail,
                };
                Ok(FormTransition::effect(effect))
            }
            FormAction::Toggle => {
                if FORM_ROWS[clamp_selection(state.selected, FORM_ROWS.len())]
                    == FormRowKind::EmailNotification
                {
                    Ok(FormTransition::effect(FormNavEffect::ToggleEmail))
                } else {
                    Ok(FormTransition::no_op(Some(
                        "Only the email notification row toggles.".to_string(),
                    )))
                }
            }
            FormAction::Clear => {
                if FORM_ROWS[clamp_selection(state.selected, FORM_ROWS.len())]
                    == FormRowKind::Toolbox
                {
                    Ok(FormTransition::effect(FormNavEffect::ClearToolbox))
                } else {
                    Ok(FormTransition::no_op(Some(
                        "Only the toolbox row can be cleared.".to_string(),
                    )))
                }
            }
            FormAction::Help => Ok(FormTransition::effect(FormNavEffect::ShowHelp(
                FORM_ROWS[clamp_selection(state.selected, FORM_ROWS.len())],
            ))),
            FormAction::Submit => Ok(FormTransition::effect(FormNavEffect::Submit)),
            FormAction::Back | FormAction::Cancel => {
                Ok(FormTransition::effect(FormNavEffect::CancelWizard))
            }
            FormAction::Yes | FormAction::No | FormAction::ReconcileSelection(_) => {
                Err(FormNavError::InvalidTransition {
                    screen: state.screen,
                    action,
                })
            }
        },
        FormScreen::ToolboxPicker | FormScreen::ResourcePicker => match action {
            FormAction::MovePrev => {
                state.selected = state.selected.saturating_sub(1);
                Ok(FormTransition::no_op(None))
            }
            FormAction::MoveNext => {
                let max_index = item_count.saturating_sub(1);
                state.selected = std::cmp::min(state.selected + 1, max_index);
                Ok(FormTransition::no_op(None))
            }
            FormAction::Enter => {
                if item_count == 0 {
                    return Ok(FormTransition::no_op(Some(
                        "Nothing to choose from yet.".to_string(),
                    )));
                }
                let chosen = clamp_selection(state.selected, item_count);
                let effect = if state.screen == FormScreen::ToolboxPicker {
                    FormNavEffect::ChooseToolbox(chosen)
                } else {
                    FormNavEffect::ChooseResource(chosen)
                };
                state.open(FormScreen::Form);
                Ok(FormTransition::effect(effect))
            }
            FormAction::Back => {
                state.open(FormScreen::Form);
                Ok(FormTransition::no_op(Some("Closed picker.".to_string())))
            }
            FormAction::Cancel => Ok(FormTransition::effect(FormNavEffect::CancelWizard)),
            FormAction::Toggle
            | FormAction::Clear
            | FormAction::Help
            | FormAction::Submit
            | FormAction::Yes
            | FormAction::No => Ok(FormTransition::no_op(Some(
                "Action is not mapped for this picker.".to_string(),
            ))),
            FormAction::ReconcileSelection(_) => unreachable!(),
        },
        FormScreen::ConfirmPopup => match action {
            FormAction::Yes | FormAction::Enter => {
                state.open(FormScreen::Form);
                Ok(FormTransition::effect(FormNavEffect::AnswerYes))
            }
            FormAction::No | FormAction::Back | FormAction::Cancel => {
                state.open(FormScreen::Form);
                Ok(FormTransition::effect(FormNavEffect::AnswerNo))
            }
            _ => Ok(FormTransition::no_op(Some(
                "Answer y or n to continue.".to_string(),
            ))),
        },
        FormScreen::ErrorPopup => match action {
            FormAction::Enter | FormAction::Back | FormAction::Cancel => {
                state.open(FormScreen::Form);
                Ok(FormTransition::effect(FormNavEffect::DismissError))
            }
            _ => Ok(FormTransition::no_op(None)),
        },
    }
}

pub fn form_screen_item_count(screen: FormScreen, picker_len: usize) -> usize {
    match screen {
        FormScreen::Form => FORM_ROWS.len(),
        FormScreen::ToolboxPicker | FormScreen::ResourcePicker => picker_len,
        FormScreen::ConfirmPopup | FormScreen::ErrorPopup => 0,
    }
}
