use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::player::api::ApiClient;
use crate::player::config::{PLAYER_COMMAND_CHAN_SIZE, SyncConfig};
use crate::player::errors::PlaybackError;
use crate::player::navigation::Navigator;
use crate::player::surface::SurfaceListener;
use crate::player::types::{SurfaceEvent, SurfaceKind};

mod advance;
pub mod commands;
mod controller;
pub mod events;
mod lifecycle;
pub mod state;
mod sync;
mod time;
mod visibility;


pub use commands::{PlayerCommand, PlayerHandle};
pub use controller::SyncedPlaybackController;
pub use events::{EventSink, NoopEventSink};

/// Starts the dedicated player thread and returns the handle that drives it.
pub fn spawn_player_thread(
    config: SyncConfig,
    navigator: Arc<dyn Navigator>,
    events: Arc<dyn EventSink>,
    api: Option<ApiClient>,
) -> Result<(PlayerHandle, std::thread::JoinHandle<()>), PlaybackError> {
    let (command_tx, command_rx) = mpsc::channel::<PlayerCommand>(PLAYER_COMMAND_CHAN_SIZE);
    let controller = SyncedPlaybackController::new(config, navigator, events);

    let join_handle = std::thread::Builder::new()
        .name("player".to_string())
        .spawn(move || run_player_thread(controller, command_rx))
        .map_err(|e| PlaybackError::RuntimeInit(e.to_string()))?;

    Ok((PlayerHandle::new(command_tx, api), join_handle))
}

// --- Player Thread Implementation ---

pub fn run_player_thread(controller: SyncedPlaybackController, receiver: mpsc::Receiver<PlayerCommand>) {
    log::info!("Player Thread: Starting...");
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Player Thread: Failed to build Tokio runtime: {}", e);
            return;
        }
    };
    rt.block_on(run_player_loop(controller, receiver));
    log::info!("Player thread has stopped.");
}

type SurfaceEventSender = mpsc::UnboundedSender<(SurfaceKind, SurfaceEvent)>;

/// Event loop: commands, surface notifications, the time-update poll and the
/// controller's timers.
///
/// Surface notifications arrive on an unbounded channel that is drained ahead
/// of commands; none of them is ever dropped.
pub async fn run_player_loop(
    mut controller: SyncedPlaybackController,
    mut receiver: mpsc::Receiver<PlayerCommand>,
) {
    log::info!("Player thread entering main loop.");
    let (surface_tx, mut surface_rx) = mpsc::unbounded_channel::<(SurfaceKind, SurfaceEvent)>();
    let mut should_shutdown = false;
    let mut time_update_interval = tokio::time::interval(controller.config().time_update_interval());
    time_update_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    while !should_shutdown {
        let next_deadline = controller.next_deadline();
        let timer_sleep = tokio::time::sleep_until(
            next_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
        );

        tokio::select! {
            biased;

            Some((surface, event)) = surface_rx.recv() => {
                controller.handle_surface_event(surface, event);
            }
            maybe_command = receiver.recv() => {
                match maybe_command {
                    Some(command) => {
                        log::debug!("Player Thread Received: {:?}", command);
                        should_shutdown = dispatch_command(&mut controller, command, &surface_tx);
                    }
                    None => {
                        log::info!("Player Thread: Command channel closed. Exiting loop.");
                        should_shutdown = true;
                    }
                }
            }
            _ = timer_sleep, if next_deadline.is_some() => {
                controller.fire_due_timers();
            }
            _ = time_update_interval.tick() => {
                controller.poll_active_surface();
            }
        }
    }
    controller.dispose();
    log::info!("Player thread loop finished.");
}

fn surface_listener(kind: SurfaceKind, surface_tx: &SurfaceEventSender) -> SurfaceListener {
    let sender = surface_tx.clone();
    Box::new(move |event| {
        if sender.send((kind, event)).is_err() {
            log::trace!("Player gone; dropping {:?} from {} surface", event, kind);
        }
    })
}

/// Applies one command. Returns true once the loop should stop.
fn dispatch_command(
    controller: &mut SyncedPlaybackController,
    command: PlayerCommand,
    surface_tx: &SurfaceEventSender,
) -> bool {
    match command {
        PlayerCommand::AttachSurface { surface, handle } => {
            let listener = surface_listener(surface, surface_tx);
            controller.attach_surface(surface, handle.0, Some(listener));
        }
        PlayerCommand::DetachSurface(surface) => controller.detach_surface(surface),
        PlayerCommand::LoadVideo {
            video,
            playlist,
            start_index,
        } => controller.load_video(video, playlist, start_index),
        PlayerCommand::TogglePlay => controller.toggle_play(),
        PlayerCommand::Play => controller.play(),
        PlayerCommand::Pause => controller.pause(),
        PlayerCommand::Seek { position_seconds } => controller.seek_to(position_seconds),
        PlayerCommand::SetVolume { level } => controller.set_volume_level(level),
        PlayerCommand::ToggleMute => controller.toggle_mute(),
        PlayerCommand::SetPlaybackSpeed { rate } => controller.set_playback_speed(rate),
        PlayerCommand::ActivateMiniPlayer => controller.activate_mini_player(),
        PlayerCommand::DeactivateMiniPlayer => controller.deactivate_mini_player(),
        PlayerCommand::CloseMiniPlayer => controller.close_mini_player(),
        PlayerCommand::ReturnToMainPlayer => controller.return_to_main_player(),
        PlayerCommand::HandleVideoEnd => controller.handle_video_end(),
        PlayerCommand::RegisterMainSurfaceElement(observer) => controller.register_main_surface_element(observer.0),
        PlayerCommand::UnregisterMainSurfaceElement => controller.unregister_main_surface_element(),
        PlayerCommand::MainSurfaceVisibility(visible) => controller.on_main_surface_visibility(visible),
        PlayerCommand::RouteChanged(route) => controller.on_route_change(&route),
        PlayerCommand::SetViewportSize(viewport) => controller.set_viewport_size(viewport),
        PlayerCommand::BeginMiniDrag(pointer) => controller.begin_mini_drag(pointer),
        PlayerCommand::DragMiniTo(pointer) => controller.drag_mini_to(pointer),
        PlayerCommand::BeginMiniResize(pointer) => controller.begin_mini_resize(pointer),
        PlayerCommand::ResizeMiniTo(pointer) => controller.resize_mini_to(pointer),
        PlayerCommand::EndMiniGesture => controller.end_mini_gesture(),
        PlayerCommand::GetPlaybackState(reply) => {
            if reply.send(controller.snapshot()).is_err() {
                log::warn!("Player Thread: state requester went away");
            }
        }
        PlayerCommand::Shutdown(done) => {
            log::info!("Player Thread: Shutdown received. Disposing controller.");
            controller.dispose();
            if done.send(()).is_err() {
                log::error!("Player Thread: Failed to send shutdown completion signal.");
            }
            return true;
        }
    }
    false
}
