//! Login and signup form.
//!
//! Both screens share one view; only the title, the submit label and what the
//! shell does with the credentials differ.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::api::types::Credentials;
use crate::ui::components::{centered_rect, LoadingIndicator, TextInput};
use crate::ui::theme::theme;
use crate::validation::{validate_credentials, CredentialErrors};

/// Which screen the form is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => " Sign In ",
            AuthMode::Signup => " Create Account ",
        }
    }

    fn submit_label(&self) -> &'static str {
        match self {
            AuthMode::Login => "Sign In",
            AuthMode::Signup => "Sign Up",
        }
    }

    fn switch_hint(&self) -> &'static str {
        match self {
            AuthMode::Login => "Don't have an account? Ctrl+N to sign up",
            AuthMode::Signup => "Already have an account? Ctrl+N to sign in",
        }
    }

    fn toggled(&self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }
}

/// Actions returned from the auth form.
#[derive(Debug, Clone)]
pub enum AuthFormAction {
    /// Send credentials for the current mode.
    Submit(AuthMode, Credentials),
    /// Switch to the other mode.
    SwitchMode(AuthMode),
    /// Leave the application.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

/// Username and password form.
#[derive(Debug)]
pub struct AuthFormView {
    mode: AuthMode,
    username: TextInput,
    password: TextInput,
    focus: Field,
    errors: CredentialErrors,
    submitting: bool,
    spinner: LoadingIndicator,
}

impl AuthFormView {
    /// Create an empty form in `mode`.
    pub fn new(mode: AuthMode) -> Self {
        let mut username = TextInput::new();
        username.set_placeholder("Username");
        let mut password = TextInput::masked();
        password.set_placeholder("Password");

        let spinner = LoadingIndicator::with_message(match mode {
            AuthMode::Login => "Signing in...",
            AuthMode::Signup => "Creating account...",
        });

        Self {
            mode,
            username,
            password,
            focus: Field::Username,
            errors: CredentialErrors::default(),
            submitting: false,
            spinner,
        }
    }

    /// Get the mode.
    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Get the current validation errors.
    pub fn errors(&self) -> &CredentialErrors {
        &self.errors
    }

    /// Check if a request is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The backend rejected the credentials; keep what was typed.
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    /// Advance the spinner.
    pub fn tick(&mut self) {
        if self.submitting {
            self.spinner.tick();
        }
    }

    fn submit(&mut self) -> Option<AuthFormAction> {
        let username = self.username.value().trim();
        self.errors = validate_credentials(username, self.password.value());
        if !self.errors.is_empty() {
            return None;
        }
        self.submitting = true;
        Some(AuthFormAction::Submit(
            self.mode,
            Credentials {
                username: username.to_string(),
                password: self.password.value().to_string(),
            },
        ))
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<AuthFormAction> {
        if self.submitting {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Some(AuthFormAction::Quit),
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                Some(AuthFormAction::SwitchMode(self.mode.toggled()))
            }
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) | (KeyCode::Up, _) | (KeyCode::Down, _) => {
                self.focus = match self.focus {
                    Field::Username => Field::Password,
                    Field::Password => Field::Username,
                };
                None
            }
            (KeyCode::Enter, _) if self.focus == Field::Username => {
                self.focus = Field::Password;
                None
            }
            (KeyCode::Enter, _) => self.submit(),
            _ => {
                match self.focus {
                    Field::Username => {
                        if self.username.handle_input(key) {
                            self.errors.username = None;
                        }
                    }
                    Field::Password => {
                        if self.password.handle_input(key) {
                            self.errors.password.clear();
                        }
                    }
                }
                None
            }
        }
    }

    /// Render the form centred in `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let password_rows = self.errors.password.len() as u16;
        let height = 14 + password_rows;
        let form_area = centered_rect(50.min(area.width.saturating_sub(2)), height, area);

        let block = Block::default()
            .title(Span::styled(
                self.mode.title(),
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),             // Username
                Constraint::Length(3),             // Password
                Constraint::Length(password_rows), // Password rules
                Constraint::Length(1),             // Spacer
                Constraint::Length(1),             // Submit
                Constraint::Length(1),             // Switch hint
            ])
            .split(inner);

        let username_error = self.errors.username.as_ref().map(ToString::to_string);
        self.username.render_with_label(
            frame,
            chunks[0],
            "Username",
            self.focus == Field::Username,
            username_error.as_deref(),
        );
        let password_error = (!self.errors.password.is_empty()).then_some("Invalid password");
        self.password.render_with_label(
            frame,
            chunks[1],
            "Password",
            self.focus == Field::Password,
            password_error,
        );

        let rules: Vec<Line> = self
            .errors
            .password
            .iter()
            .map(|e| Line::from(Span::styled(format!("• {}", e), Style::default().fg(t.error))))
            .collect();
        frame.render_widget(Paragraph::new(rules), chunks[2]);

        if self.submitting {
            self.spinner.render(frame, chunks[4]);
        } else {
            let button = Line::from(Span::styled(
                format!(" [Enter] {} ", self.mode.submit_label()),
                Style::default()
                    .fg(t.selection_fg)
                    .bg(t.accent)
                    .add_modifier(Modifier::BOLD),
            ));
            frame.render_widget(Paragraph::new(button).alignment(Alignment::Center), chunks[4]);
        }

        frame.render_widget(
            Paragraph::new(self.mode.switch_hint())
                .style(Style::default().fg(t.muted))
                .alignment(Alignment::Center),
            chunks[5],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(view: &mut AuthFormView, s: &str) {
        for c in s.chars() {
            view.handle_input(key(KeyCode::Char(c)));
        }
    }

    fn fill(view: &mut AuthFormView, username: &str, password: &str) {
        type_str(view, username);
        view.handle_input(key(KeyCode::Tab));
        type_str(view, password);
    }

    #[test]
    fn test_valid_submit() {
        let mut view = AuthFormView::new(AuthMode::Login);
        fill(&mut view, " ferris ", "Crab$hell9");
        match view.handle_input(key(KeyCode::Enter)) {
            Some(AuthFormAction::Submit(AuthMode::Login, creds)) => {
                assert_eq!(creds.username, "ferris");
                assert_eq!(creds.password, "Crab$hell9");
            }
            other => panic!("Expected Submit, got {:?}", other),
        }
        assert!(view.is_submitting());
        // Input ignored while in flight
        assert!(view.handle_input(key(KeyCode::Enter)).is_none());
    }

    #[test]
    fn test_every_failing_password_rule_reported() {
        let mut view = AuthFormView::new(AuthMode::Signup);
        fill(&mut view, "ab", "abc");
        assert!(view.handle_input(key(KeyCode::Enter)).is_none());
        assert_eq!(view.errors().username, Some(ValidationError::UsernameLength));
        assert_eq!(
            view.errors().password,
            vec![
                ValidationError::PasswordTooShort,
                ValidationError::PasswordNoUppercase,
                ValidationError::PasswordNoDigit,
                ValidationError::PasswordNoSpecial,
            ]
        );
        assert!(!view.is_submitting());
    }

    #[test]
    fn test_typing_clears_field_error() {
        let mut view = AuthFormView::new(AuthMode::Login);
        view.handle_input(key(KeyCode::Tab));
        view.handle_input(key(KeyCode::Enter));
        assert!(view.errors().username.is_some());

        view.handle_input(key(KeyCode::Tab));
        type_str(&mut view, "x");
        assert!(view.errors().username.is_none());
        assert!(!view.errors().password.is_empty());
    }

    #[test]
    fn test_enter_on_username_moves_to_password() {
        let mut view = AuthFormView::new(AuthMode::Login);
        type_str(&mut view, "ferris");
        assert!(view.handle_input(key(KeyCode::Enter)).is_none());
        assert!(view.errors().is_empty());
        assert_eq!(view.focus, Field::Password);
    }

    #[test]
    fn test_switch_mode() {
        let mut view = AuthFormView::new(AuthMode::Login);
        assert!(matches!(
            view.handle_input(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(AuthFormAction::SwitchMode(AuthMode::Signup))
        ));
    }

    #[test]
    fn test_submit_failed_keeps_input() {
        let mut view = AuthFormView::new(AuthMode::Login);
        fill(&mut view, "ferris", "Crab$hell9");
        view.handle_input(key(KeyCode::Enter));
        view.submit_failed();
        assert!(!view.is_submitting());
        assert!(matches!(
            view.handle_input(key(KeyCode::Enter)),
            Some(AuthFormAction::Submit(..))
        ));
    }
}
