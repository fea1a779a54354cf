//! The console event loop.
//!
//! The loop owns the router. Log records and control calls arrive on the
//! router's command channel, key presses on a second channel fed by a
//! blocking reader; both are applied on this task only.
use super::commands::{self, Flow};
use super::console::{fit_width, ConsoleSink};
use super::input::InputLine;
use crate::logging::{LogRouter, RouterCommand, FALLBACK_TARGET};
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use std::io::{stdout, Write};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

const PROMPT: &str = "> ";

#[derive(Debug)]
pub enum ConsoleEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Console state around the router: the input line, the last feedback and
/// the terminal size.
pub struct Console {
    router: LogRouter<ConsoleSink>,
    input: InputLine,
    status: String,
    size: (u16, u16),
}

impl Console {
    pub fn new(router: LogRouter<ConsoleSink>, size: (u16, u16)) -> Self {
        Self {
            router,
            input: InputLine::new(),
            status: "Type 'help' for commands, Esc to quit".to_string(),
            size,
        }
    }

    pub fn router(&self) -> &LogRouter<ConsoleSink> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut LogRouter<ConsoleSink> {
        &mut self.router
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn input(&self) -> &InputLine {
        &self.input
    }

    /// Rows available for log lines: everything but the title, status and
    /// prompt rows.
    fn log_rows(&self) -> u16 {
        self.size.1.saturating_sub(3)
    }

    pub fn handle_event(&mut self, event: ConsoleEvent) -> Flow {
        match event {
            ConsoleEvent::Resize(width, height) => {
                self.size = (width, height);
                Flow::Continue(String::new())
            }
            ConsoleEvent::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let page = self.log_rows().max(1) as usize;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if ctrl => return Flow::Quit,
            KeyCode::Enter => {
                if let Some(line) = self.input.submit() {
                    let flow = match commands::parse(&line) {
                        Ok(command) => commands::execute(&mut self.router, command),
                        Err(e) => Flow::Continue(e.to_string()),
                    };
                    match flow {
                        Flow::Continue(feedback) => self.status = feedback,
                        Flow::Quit => return Flow::Quit,
                    }
                }
            }
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => {
                self.input.backspace();
            }
            KeyCode::Delete => {
                self.input.delete();
            }
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End if ctrl => self.router.sink_mut().jump_to_bottom(),
            KeyCode::End => self.input.end(),
            KeyCode::Up if ctrl => self.input.navigate_history(true),
            KeyCode::Down if ctrl => self.input.navigate_history(false),
            KeyCode::Up => self.router.sink_mut().scroll_up(1),
            KeyCode::Down => self.router.sink_mut().scroll_down(1),
            KeyCode::PageUp => self.router.sink_mut().scroll_up(page),
            KeyCode::PageDown => self.router.sink_mut().scroll_down(page),
            _ => {}
        }
        Flow::Continue(self.status.clone())
    }

    /// Stops forwarding before the surface goes away. Returns how many
    /// sources were still attached.
    pub fn shut_down(&mut self) -> usize {
        let detached = self.router.detach_all();
        self.router.sink_mut().close();
        detached
    }

    pub fn draw(&self, out: &mut impl Write) -> Result<()> {
        let (width, height) = self.size;
        if height < 4 {
            return Ok(());
        }

        let display = self.router.display();
        let title = format!(
            " {} | shown: {} | records: {}/{} | autoscroll {} | timestamps {}",
            self.router.title(),
            self.router.checked_sources().join(", "),
            self.router.history().len(),
            self.router.history().capacity(),
            if display.autoscroll { "on" } else { "off" },
            if display.show_timestamps { "on" } else { "off" },
        );
        queue!(
            out,
            cursor::MoveTo(0, 0),
            Clear(ClearType::CurrentLine),
            SetBackgroundColor(Color::DarkGrey),
            SetForegroundColor(Color::White),
            Print(format!("{:<width$}", fit_width(&title, width as usize), width = width as usize)),
            ResetColor
        )?;

        self.router
            .sink()
            .render(&mut *out, (0, 1, width, self.log_rows()))?;

        let status_row = height - 2;
        let prompt_row = height - 1;
        queue!(
            out,
            cursor::MoveTo(0, status_row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Cyan),
            Print(fit_width(&self.status, width as usize)),
            ResetColor,
            cursor::MoveTo(0, prompt_row),
            Clear(ClearType::CurrentLine),
            Print(PROMPT),
            Print(fit_width(self.input.text(), (width as usize).saturating_sub(PROMPT.len()))),
            cursor::MoveTo((PROMPT.len() + self.input.cursor()) as u16, prompt_row)
        )?;

        out.flush()?;
        Ok(())
    }
}

/// Runs the console until the user quits or every router handle is gone.
pub async fn run_console(
    router: LogRouter<ConsoleSink>,
    commands: mpsc::UnboundedReceiver<RouterCommand>,
) -> Result<()> {
    terminal::enable_raw_mode()?;
    execute!(stdout(), terminal::EnterAlternateScreen, cursor::Show)?;

    let size = terminal::size().unwrap_or((80, 24));
    let mut console = Console::new(router, size);

    let result = event_loop(&mut console, commands).await;

    let detached = console.shut_down();

    terminal::disable_raw_mode()?;
    execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
    report_closed(detached);

    result
}

/// The command channel is closed by now, so this goes to stderr.
fn report_closed(detached: usize) {
    info!(target: FALLBACK_TARGET, "Console closed, {} sources detached", detached);
}

async fn event_loop(
    console: &mut Console,
    mut commands: mpsc::UnboundedReceiver<RouterCommand>,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ConsoleEvent>();

    tokio::task::spawn_blocking(move || loop {
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    event_tx.send(ConsoleEvent::Key(key))
                }
                Ok(Event::Resize(width, height)) => {
                    event_tx.send(ConsoleEvent::Resize(width, height))
                }
                _ => Ok(()),
            };
            if let Err(e) = forwarded {
                debug!("Failed to send terminal event: {}", e);
                break;
            }
        } else if event_tx.is_closed() {
            break;
        }
    });

    console.router_mut().welcome_message();
    console.draw(&mut stdout())?;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => {
                    console.router_mut().apply(command);
                    console.router_mut().drain(&mut commands);
                }
                None => break,
            },
            event = event_rx.recv() => match event {
                Some(event) => {
                    if console.handle_event(event) == Flow::Quit {
                        break;
                    }
                }
                None => break,
            },
        }

        console.draw(&mut stdout())?;
    }

    Ok(())
}
