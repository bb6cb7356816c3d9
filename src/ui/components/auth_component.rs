//! Login and sign-up screens.
//!
//! Both screens share one component; the mode follows [`Action::SwitchScreen`].
//! Fields are validated locally before anything is sent to the identity
//! provider, and the outcome of a submit is shown on a coloured status line.

use crate::auth::LoginStatus;
use crate::constants::APP_TITLE;
use crate::ui::components::dialogs::common::{create_instructions_paragraph, shortcuts, InstructionShortcut};
use crate::ui::components::text_input::TextInput;
use crate::ui::core::{Action, Component, Screen};
use crate::ui::layout::LayoutManager;
use crate::validation::{validate_login, validate_sign_up, LoginErrors, SignUpErrors};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthField {
    Name,
    Email,
    Password,
}

pub struct AuthComponent {
    mode: Screen,
    pub name: TextInput,
    pub email: TextInput,
    pub password: TextInput,
    focus: AuthField,
    show_password: bool,
    login_errors: LoginErrors,
    signup_errors: SignUpErrors,
    status: Option<(LoginStatus, String)>,
    submitting: bool,
}

impl Default for AuthComponent {
    fn default() -> Self {
        Self::new(Screen::Signup)
    }
}

impl AuthComponent {
    pub fn new(mode: Screen) -> Self {
        let mut component = Self {
            mode: Screen::Signup,
            name: TextInput::default(),
            email: TextInput::default(),
            password: TextInput::default(),
            focus: AuthField::Name,
            show_password: false,
            login_errors: LoginErrors::default(),
            signup_errors: SignUpErrors::default(),
            status: None,
            submitting: false,
        };
        component.set_mode(mode);
        component
    }

    pub fn mode(&self) -> Screen {
        self.mode
    }

    pub fn status(&self) -> Option<&(LoginStatus, String)> {
        self.status.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn set_mode(&mut self, mode: Screen) {
        self.mode = mode;
        self.focus = if mode == Screen::Signup {
            AuthField::Name
        } else {
            AuthField::Email
        };
        self.password.clear();
        self.login_errors = LoginErrors::default();
        self.signup_errors = SignUpErrors::default();
        self.status = None;
        self.submitting = false;
    }

    fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            Screen::Signup => &[AuthField::Name, AuthField::Email, AuthField::Password],
            _ => &[AuthField::Email, AuthField::Password],
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % fields.len()
        } else {
            (index + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    fn submit(&mut self) -> Action {
        if self.submitting {
            return Action::None;
        }

        match self.mode {
            Screen::Login => {
                self.login_errors = validate_login(self.email.value(), self.password.value());
                if !self.login_errors.is_valid() {
                    return Action::None;
                }
                self.submitting = true;
                self.status = None;
                Action::SubmitLogin {
                    email: self.email.value().trim().to_string(),
                    password: self.password.value().to_string(),
                }
            }
            _ => {
                self.signup_errors = validate_sign_up(self.name.value(), self.email.value(), self.password.value());
                if !self.signup_errors.is_valid() {
                    return Action::None;
                }
                self.submitting = true;
                self.status = None;
                Action::SubmitSignUp {
                    name: self.name.value().to_string(),
                    email: self.email.value().to_string(),
                    password: self.password.value().to_string(),
                }
            }
        }
    }

    fn field_error(&self, field: AuthField) -> Option<&'static str> {
        match (self.mode, field) {
            (Screen::Login, AuthField::Email) => self.login_errors.email,
            (Screen::Login, AuthField::Password) => self.login_errors.password,
            (_, AuthField::Name) => self.signup_errors.name,
            (_, AuthField::Email) => self.signup_errors.email,
            (_, AuthField::Password) => self.signup_errors.password,
        }
    }

    fn render_field(&self, f: &mut Frame, area: Rect, field: AuthField) {
        let (title, input) = match field {
            AuthField::Name => ("Name", &self.name),
            AuthField::Email => ("Email", &self.email),
            AuthField::Password => ("Password", &self.password),
        };
        let focused = self.focus == field;
        let shown = if field == AuthField::Password && !self.show_password {
            input.masked('•')
        } else {
            input.value().to_string()
        };
        let text = if focused { format!("{}█", shown) } else { shown };

        let chunks = Layout::vertical([Constraint::Length(3), Constraint::Length(1)]).split(area);
        let border = if focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" {} ", title))
            .border_style(Style::default().fg(border));
        f.render_widget(Paragraph::new(text).block(block), chunks[0]);

        if let Some(error) = self.field_error(field) {
            f.render_widget(
                Paragraph::new(Span::styled(error, Style::default().fg(Color::Red))),
                chunks[1],
            );
        }
    }
}

const LOGIN_SHORTCUTS: [InstructionShortcut; 7] = [
    ("Enter", Color::Green, " Sign in"),
    shortcuts::SEPARATOR,
    ("Tab", Color::Cyan, " Next field"),
    shortcuts::SEPARATOR,
    ("Ctrl+P", Color::Yellow, " Show password"),
    shortcuts::SEPARATOR,
    ("Ctrl+S", Color::Magenta, " Create account"),
];

const SIGNUP_SHORTCUTS: [InstructionShortcut; 7] = [
    ("Enter", Color::Green, " Sign up"),
    shortcuts::SEPARATOR,
    ("Tab", Color::Cyan, " Next field"),
    shortcuts::SEPARATOR,
    ("Ctrl+P", Color::Yellow, " Show password"),
    shortcuts::SEPARATOR,
    ("Ctrl+S", Color::Magenta, " Log in instead"),
];

impl Component for AuthComponent {
    fn handle_key_events(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('p') => {
                    self.show_password = !self.show_password;
                    Action::None
                }
                KeyCode::Char('s') => {
                    let target = if self.mode == Screen::Login {
                        Screen::Signup
                    } else {
                        Screen::Login
                    };
                    Action::SwitchScreen(target)
                }
                KeyCode::Char('c') => Action::Quit,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter => self.submit(),
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                Action::None
            }
            _ => {
                self.focused_input().handle_key(key);
                Action::None
            }
        }
    }

    fn update(&mut self, action: Action) -> Action {
        match action {
            Action::SwitchScreen(screen @ (Screen::Login | Screen::Signup)) => {
                if screen != self.mode {
                    self.set_mode(screen);
                }
                Action::SwitchScreen(screen)
            }
            Action::LoginCompleted { status, ref message } => {
                self.submitting = false;
                self.status = Some((status, message.clone()));
                if status == LoginStatus::Success {
                    self.password.clear();
                }
                action
            }
            Action::SignUpCompleted { success, ref message } => {
                self.submitting = false;
                let status = if success {
                    LoginStatus::Success
                } else {
                    LoginStatus::Failure
                };
                self.status = Some((status, message.clone()));
                action
            }
            _ => action,
        }
    }

    fn render(&mut self, f: &mut Frame, rect: Rect) {
        let fields = self.fields();
        let form_height = 2 + 2 + fields.len() as u16 * 4 + 2 + 2;
        let area = LayoutManager::centered_rect_lines(60, form_height, rect);
        f.render_widget(Clear, area);

        let subtitle = if self.mode == Screen::Login {
            "Sign in"
        } else {
            "Create account"
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!(" {} - {} ", APP_TITLE, subtitle))
            .title_alignment(Alignment::Center)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(fields.iter().map(|_| Constraint::Length(4)));
        constraints.extend([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]);
        let chunks = Layout::vertical(constraints).split(inner);

        for (index, field) in fields.iter().enumerate() {
            self.render_field(f, chunks[index + 1], *field);
        }

        let status_line = if self.submitting {
            Line::from(Span::styled("Please wait...", Style::default().fg(Color::Yellow)))
        } else if let Some((status, message)) = &self.status {
            let color = match status {
                LoginStatus::Success => Color::Green,
                LoginStatus::Failure => Color::Red,
                LoginStatus::Warning => Color::Yellow,
            };
            Line::from(Span::styled(message.as_str(), Style::default().fg(color)))
        } else {
            Line::default()
        };
        f.render_widget(
            Paragraph::new(status_line).alignment(Alignment::Center),
            chunks[fields.len() + 1],
        );

        let instructions = if self.mode == Screen::Login {
            &LOGIN_SHORTCUTS[..]
        } else {
            &SIGNUP_SHORTCUTS[..]
        };
        f.render_widget(create_instructions_paragraph(instructions), chunks[fields.len() + 2]);
    }
}
