//! Terminal presentation of the todo list.
//!
//! The loop redraws from a fresh [`TodoView`] whenever a key arrives or the
//! store reduces an action. Key presses are forwarded 1:1 to
//! [`TodoController`] intents; the only state kept here is the list cursor
//! and the live contents of the edit field.

pub mod keys;
mod render;

use crate::controller::TodoController;
use crate::types::{TodoId, TodoPatch};
use crate::view::TodoView;
use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use keys::{map_key, Intent, Mode};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

const TICK: Duration = Duration::from_millis(250);

/// Live contents of the in-place edit field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditBuffer {
    /// Item being edited
    pub id: TodoId,
    /// Title before the edit
    pub original: String,
    /// Current field contents
    pub text: String,
}

/// Presentation state around the latest view
pub struct App {
    controller: TodoController,
    view: TodoView,
    pane: Mode,
    cursor: usize,
    edit: Option<EditBuffer>,
    should_quit: bool,
}

impl App {
    /// Create the presentation for `controller`
    #[must_use]
    pub fn new(controller: TodoController) -> Self {
        Self {
            controller,
            view: TodoView::default(),
            pane: Mode::Input,
            cursor: 0,
            edit: None,
            should_quit: false,
        }
    }

    /// Latest projection
    #[must_use]
    pub const fn view(&self) -> &TodoView {
        &self.view
    }

    /// Selected row index
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Edit field, while an item is in edit mode
    #[must_use]
    pub const fn edit(&self) -> Option<&EditBuffer> {
        self.edit.as_ref()
    }

    /// Which part of the screen receives keys
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.edit.is_some() {
            Mode::Edit
        } else {
            self.pane
        }
    }

    /// True once the user asked to leave
    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Pull a fresh view and reconcile local state with it
    pub async fn refresh(&mut self) {
        self.view = self.controller.view().await;

        if self.edit.is_some() && self.edit.as_ref().map(|edit| edit.id) != self.view.editing {
            self.edit = None;
            self.pane = Mode::Input;
        }

        self.cursor = self.cursor.min(self.view.rows.len().saturating_sub(1));
    }

    fn selected(&self) -> Option<(TodoId, bool, String)> {
        self.view
            .rows
            .get(self.cursor)
            .filter(|row| !row.locked())
            .map(|row| (row.id, row.completed, row.title.clone()))
    }

    /// Apply one intent
    ///
    /// # Errors
    ///
    /// Returns an error if the store no longer accepts intents.
    pub async fn handle(&mut self, intent: Intent) -> Result<()> {
        let controller = &self.controller;
        match intent {
            Intent::Quit => self.should_quit = true,
            Intent::Insert(c) => {
                if let Some(edit) = self.edit.as_mut() {
                    edit.text.push(c);
                } else if !self.view.input_locked {
                    let mut draft = self.view.draft.clone();
                    draft.push(c);
                    controller.set_draft(draft).await?;
                }
            },
            Intent::Backspace => {
                if let Some(edit) = self.edit.as_mut() {
                    edit.text.pop();
                } else if !self.view.input_locked {
                    let mut draft = self.view.draft.clone();
                    draft.pop();
                    controller.set_draft(draft).await?;
                }
            },
            Intent::Submit => {
                if let Some(edit) = self.edit.clone() {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        if let Err(error) =
                            controller.save_edit(edit.id, edit.text, edit.original).await
                        {
                            tracing::debug!(%error, "Save edit abandoned");
                        }
                    });
                } else {
                    controller.add(self.view.draft.clone()).await?;
                }
            },
            Intent::SwitchPane => {
                self.pane = match self.pane {
                    Mode::List => Mode::Input,
                    Mode::Input | Mode::Edit => Mode::List,
                };
            },
            Intent::Up => self.cursor = self.cursor.saturating_sub(1),
            Intent::Down => {
                if self.cursor + 1 < self.view.rows.len() {
                    self.cursor += 1;
                }
            },
            Intent::Toggle => {
                if let Some((id, completed, _)) = self.selected() {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        if let Err(error) =
                            controller.update(id, TodoPatch::completed(!completed)).await
                        {
                            tracing::debug!(%error, "Toggle abandoned");
                        }
                    });
                }
            },
            Intent::Delete => {
                if let Some((id, _, _)) = self.selected() {
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        if let Err(error) = controller.delete(id).await {
                            tracing::debug!(%error, "Delete abandoned");
                        }
                    });
                }
            },
            Intent::BeginEdit => {
                if let Some((id, _, title)) = self.selected() {
                    controller.begin_edit(id).await?;
                    self.edit = Some(EditBuffer {
                        id,
                        original: title.clone(),
                        text: title,
                    });
                }
            },
            Intent::CancelEdit => {
                controller.cancel_edit().await?;
            },
            Intent::ToggleAll => {
                controller.toggle_all().await?;
            },
            Intent::ClearCompleted => {
                controller.clear_completed().await?;
            },
            Intent::Filter(filter) => {
                controller.set_filter(filter).await?;
                self.cursor = 0;
            },
            Intent::DismissError => {
                controller.dismiss_error().await?;
            },
        }
        Ok(())
    }
}

/// Run the terminal UI until the user quits
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to.
pub async fn run(controller: TodoController) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = run_event_loop(&mut terminal, controller).await;

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: TodoController,
) -> Result<()> {
    let mut actions = controller.subscribe();
    controller.load().await?;

    let mut app = App::new(controller);
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        app.refresh().await;
        terminal.draw(|frame| render::draw(frame, &app))?;
        if app.should_quit() {
            break;
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if let Some(intent) = map_key(app.mode(), key) {
                        app.handle(intent).await?;
                    }
                },
                Some(Ok(_)) => {},
                Some(Err(error)) => return Err(error).context("failed to read terminal event"),
                None => break,
            },
            received = actions.recv() => match received {
                Ok(_) | Err(RecvError::Lagged(_)) => {},
                Err(RecvError::Closed) => break,
            },
            _ = tick.tick() => {},
        }
    }

    Ok(())
}
