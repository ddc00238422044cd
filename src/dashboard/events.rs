use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::refresh::StopHandle;

const POLL_TIMEOUT: Duration = Duration::from_millis(200);

pub fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Watch the keyboard on a blocking thread and request a stop when the
/// operator quits. Returns once the loop has been stopped by anyone.
pub fn spawn_key_listener(stop: StopHandle) -> JoinHandle<io::Result<()>> {
    tokio::task::spawn_blocking(move || listen_for_stop(&stop, event::poll, event::read))
}

/// Poll loop behind [`spawn_key_listener`]. If the terminal can no longer be
/// read the loop is stopped too, so the operator is never left without a way
/// out.
fn listen_for_stop<P, R>(stop: &StopHandle, mut poll: P, mut read: R) -> io::Result<()>
where
    P: FnMut(Duration) -> io::Result<bool>,
    R: FnMut() -> io::Result<Event>,
{
    while !stop.is_stopped() {
        let event = match poll(POLL_TIMEOUT) {
            Ok(false) => continue,
            Ok(true) => read(),
            Err(e) => Err(e),
        };

        match event {
            Ok(Event::Key(key)) if is_stop_key(&key) => {
                info!(key = ?key.code, "Operator requested stop");
                stop.stop();
            }
            Ok(Event::Resize(width, height)) => {
                debug!(width, height, "Terminal resized, frame updates on next cycle");
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Terminal input failed, stopping refresh loop");
                stop.stop();
                return Err(e);
            }
        }
    }
    Ok(())
}
