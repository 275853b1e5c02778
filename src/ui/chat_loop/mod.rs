//! Interactive chat loop.
//!
//! The loop owns the terminal, turns key presses into [`UiAction`]s, and
//! carries out accepted turns on spawned tasks. Results come back over a
//! channel tagged with their turn id, so a late answer for a torn-down turn is
//! simply dropped by the controller.

pub mod bindings;
pub mod lifecycle;
pub mod session;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::courses::fetch_course_stats;
use crate::core::config::Config;
use crate::core::controller::{ControllerSettings, PendingTurn};
use crate::core::error::TransportError;
use crate::core::theme_store::{FileStorage, MemoryStorage, PreferenceStorage, ThemeStore};
use crate::core::transport::{build_client, dispatch, ChatTransport, HttpTransport, TurnReply};
use crate::ui::chat_loop::bindings::{resolve, UiAction};
use crate::ui::chat_loop::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use crate::ui::chat_loop::session::{ChatSession, Step, Viewport};
use crate::ui::renderer::{layout_areas, ui};

type TurnResult = (u64, Result<TurnReply, TransportError>);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub async fn run_chat(config: &Config, base_url: &str) -> Result<(), Box<dyn Error>> {
    let client = build_client()?;
    let transport: Arc<dyn ChatTransport> =
        Arc::new(HttpTransport::new(client.clone(), base_url.to_string()));

    let storage: Box<dyn PreferenceStorage> = match FileStorage::default_location() {
        Some(storage) => Box::new(storage),
        None => {
            warn!("no data directory; theme preference will not persist");
            Box::new(MemoryStorage::new())
        }
    };
    let mut session = ChatSession::new(ControllerSettings::from(config), ThemeStore::new(storage));

    let (course_tx, mut course_rx) = mpsc::unbounded_channel::<usize>();
    {
        let base_url = base_url.to_string();
        tokio::spawn(async move {
            match fetch_course_stats(&client, &base_url).await {
                Ok(stats) => {
                    let _ = course_tx.send(stats.total_courses);
                }
                Err(err) => debug!(error = %err, "course stats unavailable"),
            }
        });
    }

    let mut terminal = setup_terminal()?;
    info!(base_url, "chat view started");

    let (tx, mut rx) = mpsc::unbounded_channel::<TurnResult>();
    let result = loop {
        if let Ok(count) = course_rx.try_recv() {
            session.set_course_count(count);
        }
        while let Ok((turn_id, outcome)) = rx.try_recv() {
            session.settle(turn_id, outcome);
        }

        if let Err(err) = terminal.draw(|f| ui(f, &session.view(base_url))) {
            break Err(err.into());
        }

        let step = match next_action(&terminal) {
            Ok(Some((action, viewport))) => session.handle(action, viewport),
            Ok(None) => continue,
            Err(err) => break Err(err),
        };
        match step {
            Step::Continue => {}
            Step::Dispatch(turn) => {
                let timeout = session.controller().settings().request_timeout;
                spawn_turn(&transport, timeout, turn, tx.clone());
            }
            Step::Exit => break Ok(()),
        }
    };

    session.shutdown();
    restore_terminal(&mut terminal)?;
    info!("chat view closed");
    result
}

fn spawn_turn(
    transport: &Arc<dyn ChatTransport>,
    timeout: Option<Duration>,
    turn: PendingTurn,
    tx: mpsc::UnboundedSender<TurnResult>,
) {
    let transport = Arc::clone(transport);
    tokio::spawn(async move {
        if let Some(result) = dispatch(transport.as_ref(), &turn.request, timeout, &turn.cancel).await
        {
            let _ = tx.send((turn.turn_id, result));
        }
    });
}

fn next_action(
    terminal: &ChatTerminal,
) -> Result<Option<(UiAction, Viewport)>, Box<dyn Error>> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(None);
    }
    let size = terminal.size()?;
    let areas = layout_areas(ratatui::layout::Rect::new(0, 0, size.width, size.height));
    let viewport = Viewport {
        width: areas.transcript.width,
        height: areas.transcript.height,
    };

    let action = match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => resolve(&key),
        _ => None,
    };
    Ok(action.map(|action| (action, viewport)))
}
